pub mod ema_smoother;
pub mod expression_estimator;
pub mod orientation;
pub mod range_tracker;
