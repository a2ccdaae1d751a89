pub mod onnx_model;
pub mod tiny_face_detector;
