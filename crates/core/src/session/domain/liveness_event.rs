use crate::detection::domain::blink_detector::BlinkRejection;
use crate::detection::domain::turn_detector::TurnDirection;
use crate::geometry::domain::geometry_error::GeometryError;

/// Structured notifications emitted by a session alongside its snapshots.
///
/// Timestamps are the caller-supplied clock reading of the call that
/// produced the event.
#[derive(Clone, Debug, PartialEq)]
pub enum LivenessEvent {
    Started { at_ms: u64 },
    Reset { at_ms: u64 },
    Stopped,
    FaceLost {
        at_ms: u64,
        discarded_closure: bool,
        discarded_hold: bool,
    },
    FaceFound { at_ms: u64 },
    ExtractionFailed {
        at_ms: u64,
        error: GeometryError,
    },
    EyesClosed { at_ms: u64 },
    BlinkCounted {
        at_ms: u64,
        closed_ms: u64,
        count: u32,
    },
    BlinkRejected {
        at_ms: u64,
        closed_ms: u64,
        reason: BlinkRejection,
    },
    TurnStarted {
        at_ms: u64,
        direction: TurnDirection,
    },
    TurnHeld {
        at_ms: u64,
        direction: TurnDirection,
        held_ms: u64,
    },
    Passed { at_ms: u64 },
    /// `passed` was upgraded by the committed-state check rather than a frame.
    PassedOnReevaluation,
    WindowElapsed {
        at_ms: u64,
        window_ms: u64,
    },
}

impl LivenessEvent {
    /// Short stable name, used as a log/metric key.
    pub fn name(&self) -> &'static str {
        match self {
            LivenessEvent::Started { .. } => "started",
            LivenessEvent::Reset { .. } => "reset",
            LivenessEvent::Stopped => "stopped",
            LivenessEvent::FaceLost { .. } => "face_lost",
            LivenessEvent::FaceFound { .. } => "face_found",
            LivenessEvent::ExtractionFailed { .. } => "extraction_failed",
            LivenessEvent::EyesClosed { .. } => "eyes_closed",
            LivenessEvent::BlinkCounted { .. } => "blink_counted",
            LivenessEvent::BlinkRejected { .. } => "blink_rejected",
            LivenessEvent::TurnStarted { .. } => "turn_started",
            LivenessEvent::TurnHeld { .. } => "turn_held",
            LivenessEvent::Passed { .. } => "passed",
            LivenessEvent::PassedOnReevaluation => "passed_on_reevaluation",
            LivenessEvent::WindowElapsed { .. } => "window_elapsed",
        }
    }

    pub fn is_lifecycle(&self) -> bool {
        matches!(
            self,
            LivenessEvent::Started { .. }
                | LivenessEvent::Reset { .. }
                | LivenessEvent::Stopped
                | LivenessEvent::Passed { .. }
                | LivenessEvent::PassedOnReevaluation
                | LivenessEvent::WindowElapsed { .. }
        )
    }
}
