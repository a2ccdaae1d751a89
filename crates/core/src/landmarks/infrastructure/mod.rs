pub mod landmark_net68;
