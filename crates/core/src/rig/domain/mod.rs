pub mod avatar_rig;
