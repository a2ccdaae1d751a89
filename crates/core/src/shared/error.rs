use std::path::PathBuf;

use thiserror::Error;

/// Failures raised by the inference path.
///
/// None of these are fatal to a tracking session: the scheduler logs them
/// and reports "no result" for the frame.
#[derive(Error, Debug)]
pub enum TrackingError {
    #[error("model backend failed: {0}")]
    Backend(String),
    #[error("malformed model output: expected {expected} values, got {actual}")]
    MalformedOutput { expected: usize, actual: usize },
    #[error("unexpected model output shape {0:?}")]
    UnexpectedShape(Vec<usize>),
    #[error("invalid frame: {0}")]
    InvalidFrame(String),
    #[error("failed to decode image {}: {source}", .path.display())]
    Image {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
}

impl TrackingError {
    /// Wraps an error from the model runtime.
    pub fn backend(err: impl std::fmt::Display) -> Self {
        TrackingError::Backend(err.to_string())
    }
}
