use std::path::{Path, PathBuf};

use ndarray::{Array4, ArrayD};

use crate::shared::error::TrackingError;
use crate::shared::inference_model::InferenceModel;

/// ONNX Runtime session behind the [`InferenceModel`] boundary.
///
/// Feeds the tile as the model's single input and returns its first output.
/// Used for both the detector and the landmark network.
pub struct OnnxModel {
    session: ort::session::Session,
    path: PathBuf,
}

impl OnnxModel {
    pub fn load(model_path: &Path) -> Result<Self, TrackingError> {
        let session = ort::session::Session::builder()
            .map_err(TrackingError::backend)?
            .commit_from_file(model_path)
            .map_err(TrackingError::backend)?;
        log::info!("Loaded model {}", model_path.display());
        Ok(Self {
            session,
            path: model_path.to_path_buf(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl InferenceModel for OnnxModel {
    fn infer(&mut self, input: Array4<f32>) -> Result<ArrayD<f32>, TrackingError> {
        let input_value = ort::value::Tensor::from_array(input).map_err(TrackingError::backend)?;
        let outputs = self
            .session
            .run(ort::inputs![input_value])
            .map_err(TrackingError::backend)?;
        if outputs.len() == 0 {
            return Err(TrackingError::Backend(format!(
                "{} produced no outputs",
                self.path.display()
            )));
        }
        let output = outputs[0]
            .try_extract_array::<f32>()
            .map_err(TrackingError::backend)?
            .to_owned();
        Ok(output)
    }
}
