pub mod detection_decoder;
pub mod face_detector;
