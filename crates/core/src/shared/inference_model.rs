use ndarray::{Array4, ArrayD};

use super::error::TrackingError;

/// Boundary to an external neural network.
///
/// Takes one normalized NHWC tile and returns the raw output tensor. Weight
/// loading and the network itself live behind this trait.
pub trait InferenceModel: Send {
    fn infer(&mut self, input: Array4<f32>) -> Result<ArrayD<f32>, TrackingError>;
}
