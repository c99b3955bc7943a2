pub mod blink_detector;
pub mod exponential_smoother;
pub mod turn_detector;
