pub mod back_projection;
pub mod face_landmarks;
pub mod landmark_detector;
