use serde::{Deserialize, Serialize};

use crate::detection::domain::turn_detector::TurnDirection;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionPhase {
    /// Constructed but never started.
    #[default]
    Idle,
    Running,
    /// Stopped by the caller; state stays inspectable.
    Stopped,
}

/// Immutable summary of session state at one point in time.
///
/// `passed` is a one-way latch within a session. The smoothed values are
/// informational and `None` until the first face has been seen.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct LivenessSnapshot {
    pub passed: bool,
    pub blink_count: u32,
    pub last_direction: Option<TurnDirection>,
    pub turned_left_ever: bool,
    pub turned_right_ever: bool,
    pub smoothed_left_ear: Option<f64>,
    pub smoothed_right_ear: Option<f64>,
    pub smoothed_yaw: Option<f64>,
    pub session_started_at: Option<u64>,
    pub phase: SessionPhase,
    pub face_present: bool,
    pub window_elapsed: bool,
}
