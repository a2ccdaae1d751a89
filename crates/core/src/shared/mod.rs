pub mod bounding_box;
pub mod config;
pub mod constants;
pub mod error;
pub mod frame;
pub mod geometry;
pub mod image_tensor;
pub mod inference_model;
pub mod model_resolver;
