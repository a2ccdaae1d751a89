use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::constants::{
    DEFAULT_DETECTOR_INPUT_SIZE, DEFAULT_SCORE_THRESHOLD, DETECTOR_NMS_IOU, REDETECT_INTERVAL_MS,
};

/// The detector downsamples by 32, so its input must be a multiple of that.
const DETECTOR_STRIDE: u32 = 32;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Tunables for a tracking session.
///
/// Missing fields in a JSON file fall back to the defaults.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackerConfig {
    pub detector_input_size: u32,
    pub score_threshold: f64,
    pub nms_iou_threshold: f64,
    pub redetect_interval_ms: u64,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            detector_input_size: DEFAULT_DETECTOR_INPUT_SIZE,
            score_threshold: DEFAULT_SCORE_THRESHOLD,
            nms_iou_threshold: DETECTOR_NMS_IOU,
            redetect_interval_ms: REDETECT_INTERVAL_MS,
        }
    }
}

impl TrackerConfig {
    pub fn from_json_file(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config: TrackerConfig =
            serde_json::from_str(&text).map_err(|source| ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.detector_input_size == 0 || self.detector_input_size % DETECTOR_STRIDE != 0 {
            return Err(ConfigError::Invalid(format!(
                "detector_input_size must be a positive multiple of {DETECTOR_STRIDE}, got {}",
                self.detector_input_size
            )));
        }
        if !(0.0..=1.0).contains(&self.score_threshold) {
            return Err(ConfigError::Invalid(format!(
                "score_threshold must be within 0.0-1.0, got {}",
                self.score_threshold
            )));
        }
        if !(self.nms_iou_threshold > 0.0 && self.nms_iou_threshold <= 1.0) {
            return Err(ConfigError::Invalid(format!(
                "nms_iou_threshold must be within (0.0, 1.0], got {}",
                self.nms_iou_threshold
            )));
        }
        Ok(())
    }

    pub fn redetect_interval(&self) -> Duration {
        Duration::from_millis(self.redetect_interval_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = TrackerConfig::default();
        assert_eq!(config.detector_input_size, 160);
        assert_eq!(config.score_threshold, 0.5);
        assert_eq!(config.nms_iou_threshold, 0.4);
        assert_eq!(config.redetect_interval(), Duration::from_millis(500));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"score_threshold": 0.7}}"#).unwrap();

        let config = TrackerConfig::from_json_file(file.path()).unwrap();

        assert_eq!(config.score_threshold, 0.7);
        assert_eq!(config.detector_input_size, 160);
        assert_eq!(config.redetect_interval_ms, 500);
    }

    #[test]
    fn test_missing_file_is_read_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = TrackerConfig::from_json_file(&dir.path().join("nope.json"));
        assert!(matches!(result, Err(ConfigError::Read { .. })));
    }

    #[test]
    fn test_bad_json_is_parse_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();
        let result = TrackerConfig::from_json_file(file.path());
        assert!(matches!(result, Err(ConfigError::Parse { .. })));
    }

    #[test]
    fn test_input_size_must_match_stride() {
        let config = TrackerConfig {
            detector_input_size: 150,
            ..TrackerConfig::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_score_threshold_out_of_range() {
        let config = TrackerConfig {
            score_threshold: 1.5,
            ..TrackerConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_zero_iou_threshold_rejected() {
        let config = TrackerConfig {
            nms_iou_threshold: 0.0,
            ..TrackerConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
