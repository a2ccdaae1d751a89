use std::path::{Path, PathBuf};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ModelResolveError {
    #[error("model {name} not found (searched: {})", display_paths(.searched))]
    NotFound { name: String, searched: Vec<PathBuf> },
}

fn display_paths(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Resolve a model file given either a path or a bare file name.
///
/// Resolution order:
/// 1. `name` itself, when it points at an existing file
/// 2. `model_dir` (explicit directory, e.g. from the command line)
/// 3. User cache directory (platform-specific)
pub fn resolve(name: &str, model_dir: Option<&Path>) -> Result<PathBuf, ModelResolveError> {
    let mut searched = Vec::new();

    let direct = PathBuf::from(name);
    if direct.is_file() {
        return Ok(direct);
    }
    searched.push(direct);

    if let Some(dir) = model_dir {
        let candidate = dir.join(name);
        if candidate.is_file() {
            return Ok(candidate);
        }
        searched.push(candidate);
    }

    if let Some(cache_dir) = model_cache_dir() {
        let candidate = cache_dir.join(name);
        if candidate.is_file() {
            return Ok(candidate);
        }
        searched.push(candidate);
    }

    Err(ModelResolveError::NotFound {
        name: name.to_string(),
        searched,
    })
}

/// Platform-specific model cache directory.
///
/// - macOS: `~/Library/Application Support/facetrack/models/`
/// - Linux: `$XDG_CACHE_HOME/facetrack/models/` or `~/.cache/facetrack/models/`
/// - Windows: `%LOCALAPPDATA%/facetrack/models/`
pub fn model_cache_dir() -> Option<PathBuf> {
    #[cfg(target_os = "macos")]
    {
        dirs::data_dir().map(|d| d.join("facetrack").join("models"))
    }
    #[cfg(not(target_os = "macos"))]
    {
        dirs::cache_dir().map(|d| d.join("facetrack").join("models"))
    }
}
