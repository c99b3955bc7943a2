use std::fmt;

use serde::{Deserialize, Serialize};

pub const DEFAULT_YAW_ABS_THRESHOLD: f64 = 0.55;
pub const DEFAULT_HOLD_MIN_MS: u64 = 250;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TurnDirection {
    Left,
    Right,
}

impl TurnDirection {
    /// Positive yaw is a turn to the right, negative to the left.
    pub fn from_yaw(yaw: f64) -> Self {
        if yaw > 0.0 {
            TurnDirection::Right
        } else {
            TurnDirection::Left
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TurnDirection::Left => "left",
            TurnDirection::Right => "right",
        }
    }
}

impl fmt::Display for TurnDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TurnThresholds {
    pub yaw_abs_threshold: f64,
    pub hold_min_ms: u64,
}

impl Default for TurnThresholds {
    fn default() -> Self {
        Self {
            yaw_abs_threshold: DEFAULT_YAW_ABS_THRESHOLD,
            hold_min_ms: DEFAULT_HOLD_MIN_MS,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TurnState {
    /// Start of the current continuous excursion beyond the threshold.
    pub beyond_since: Option<u64>,
    /// Side of the current excursion; `Some` exactly while `beyond_since` is.
    pub excursion: Option<TurnDirection>,
    /// The current excursion already produced its direction assignment.
    pub hold_reported: bool,
    pub last_direction: Option<TurnDirection>,
    pub turned_left_ever: bool,
    pub turned_right_ever: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TurnOutcome {
    Unchanged,
    /// Also reported when the yaw swings to the other side without dropping
    /// below the threshold; the hold timer restarts for the new side.
    ExcursionStarted(TurnDirection),
    /// The excursion has just been held long enough. Reported once per excursion.
    Held {
        direction: TurnDirection,
        held_ms: u64,
    },
    ExcursionEnded,
}

/// A turn counts once `|yaw|` has stayed at or beyond the threshold for
/// `hold_min_ms` without interruption. The per-direction "ever" flags are
/// sticky for the session.
#[derive(Clone, Debug)]
pub struct TurnDetector {
    thresholds: TurnThresholds,
    state: TurnState,
}

impl TurnDetector {
    pub fn new(thresholds: TurnThresholds) -> Self {
        Self {
            thresholds,
            state: TurnState::default(),
        }
    }

    pub fn state(&self) -> &TurnState {
        &self.state
    }

    /// Advance with one smoothed yaw sample. Flag changes made while
    /// crossing the hold are already visible in `state()` when this returns.
    pub fn update(&mut self, now_ms: u64, yaw: f64) -> TurnOutcome {
        if yaw.abs() < self.thresholds.yaw_abs_threshold {
            return if self.clear_excursion() {
                TurnOutcome::ExcursionEnded
            } else {
                TurnOutcome::Unchanged
            };
        }

        let direction = TurnDirection::from_yaw(yaw);
        let since = match (self.state.beyond_since, self.state.excursion) {
            (Some(since), Some(current)) if current == direction => since,
            // Fresh excursion, or the head swung across without dipping below threshold.
            _ => {
                self.state.beyond_since = Some(now_ms);
                self.state.excursion = Some(direction);
                self.state.hold_reported = false;
                return TurnOutcome::ExcursionStarted(direction);
            }
        };

        let held_ms = now_ms.saturating_sub(since);
        if held_ms < self.thresholds.hold_min_ms || self.state.hold_reported {
            return TurnOutcome::Unchanged;
        }

        self.state.hold_reported = true;
        self.state.last_direction = Some(direction);
        match direction {
            TurnDirection::Left => self.state.turned_left_ever = true,
            TurnDirection::Right => self.state.turned_right_ever = true,
        }
        TurnOutcome::Held { direction, held_ms }
    }

    /// Discard an in-flight hold timer. Returns whether one was running.
    pub fn face_lost(&mut self) -> bool {
        self.clear_excursion()
    }

    pub fn reset(&mut self) {
        self.state = TurnState::default();
    }

    fn clear_excursion(&mut self) -> bool {
        let was_beyond = self.state.beyond_since.is_some();
        self.state.beyond_since = None;
        self.state.excursion = None;
        self.state.hold_reported = false;
        was_beyond
    }
}

impl Default for TurnDetector {
    fn default() -> Self {
        Self::new(TurnThresholds::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::positive(0.7, TurnDirection::Right)]
    #[case::negative(-0.7, TurnDirection::Left)]
    fn test_direction_from_sign(#[case] yaw: f64, #[case] expected: TurnDirection) {
        assert_eq!(TurnDirection::from_yaw(yaw), expected);
    }

    #[test]
    fn test_direction_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&TurnDirection::Right).unwrap(),
            "\"right\""
        );
        assert_eq!(TurnDirection::Left.to_string(), "left");
    }

    #[test]
    fn test_below_threshold_is_idle() {
        let mut detector = TurnDetector::default();
        assert_eq!(detector.update(0, 0.3), TurnOutcome::Unchanged);
        assert_eq!(detector.update(500, -0.54), TurnOutcome::Unchanged);
        assert!(detector.state().beyond_since.is_none());
    }

    #[test]
    fn test_hold_one_ms_short_produces_nothing() {
        let mut detector = TurnDetector::default();
        assert_eq!(
            detector.update(1_000, 0.7),
            TurnOutcome::ExcursionStarted(TurnDirection::Right)
        );
        assert_eq!(detector.update(1_249, 0.7), TurnOutcome::Unchanged);
        assert!(!detector.state().turned_right_ever);
        assert!(detector.state().last_direction.is_none());
    }

    #[test]
    fn test_hold_reaching_minimum_assigns_direction_once() {
        let mut detector = TurnDetector::default();
        detector.update(1_000, 0.7);
        assert_eq!(
            detector.update(1_250, 0.7),
            TurnOutcome::Held {
                direction: TurnDirection::Right,
                held_ms: 250
            }
        );
        assert!(detector.state().turned_right_ever);
        assert_eq!(detector.state().last_direction, Some(TurnDirection::Right));

        assert_eq!(detector.update(1_300, 0.8), TurnOutcome::Unchanged);
        assert_eq!(detector.update(1_600, 0.8), TurnOutcome::Unchanged);
    }

    #[test]
    fn test_exactly_threshold_counts_as_beyond() {
        let mut detector = TurnDetector::default();
        assert_eq!(
            detector.update(0, -0.55),
            TurnOutcome::ExcursionStarted(TurnDirection::Left)
        );
    }

    #[test]
    fn test_dip_below_threshold_restarts_timer() {
        let mut detector = TurnDetector::default();
        detector.update(0, 0.7);
        detector.update(200, 0.7);
        assert_eq!(detector.update(230, 0.4), TurnOutcome::ExcursionEnded);
        detector.update(260, 0.7);
        assert_eq!(detector.update(460, 0.7), TurnOutcome::Unchanged);
        assert!(!detector.state().turned_right_ever);
        assert!(matches!(
            detector.update(510, 0.7),
            TurnOutcome::Held { held_ms: 250, .. }
        ));
    }

    #[test]
    fn test_swing_across_restarts_timer() {
        let mut detector = TurnDetector::default();
        detector.update(0, 0.7);
        assert_eq!(
            detector.update(200, -0.7),
            TurnOutcome::ExcursionStarted(TurnDirection::Left)
        );
        assert_eq!(detector.update(300, -0.7), TurnOutcome::Unchanged);
        assert!(!detector.state().turned_right_ever);
        assert!(!detector.state().turned_left_ever);
    }

    #[test]
    fn test_ever_flags_survive_return_to_centre() {
        let mut detector = TurnDetector::default();
        detector.update(0, 0.7);
        detector.update(300, 0.7);
        detector.update(400, 0.0);
        detector.update(500, -0.7);
        detector.update(800, -0.7);
        detector.update(900, 0.0);

        let state = detector.state();
        assert!(state.turned_left_ever);
        assert!(state.turned_right_ever);
        assert_eq!(state.last_direction, Some(TurnDirection::Left));
        assert!(state.beyond_since.is_none());
    }

    #[test]
    fn test_face_lost_discards_hold() {
        let mut detector = TurnDetector::default();
        detector.update(0, -0.7);
        assert!(detector.face_lost());
        assert!(detector.state().beyond_since.is_none());

        // The excursion restarts from the first frame after the gap.
        assert_eq!(
            detector.update(300, -0.7),
            TurnOutcome::ExcursionStarted(TurnDirection::Left)
        );
        assert!(!detector.state().turned_left_ever);
    }

    #[test]
    fn test_reset_clears_flags() {
        let mut detector = TurnDetector::default();
        detector.update(0, 0.7);
        detector.update(250, 0.7);
        detector.reset();
        assert_eq!(detector.state(), &TurnState::default());
    }
}
