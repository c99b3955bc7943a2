//! Blink + head-turn liveness session.
//!
//! Owns every piece of detector state for one challenge: three EMA
//! smoothers (left EAR, right EAR, yaw), the blink and turn state machines,
//! and the `passed` latch. Frames must be fed one at a time with
//! non-decreasing timestamps; lifecycle calls (`start`, `reset`, `stop`)
//! reinitialise or freeze that state between frames.
//!
//! The pass predicate is evaluated inside `process_frame` against the
//! counters that same call just produced, so the snapshot of the frame that
//! completes the last condition already reports `passed = true`.
//! [`LivenessSession::evaluate_committed`] re-checks the stored counters as an
//! idempotent safety net.

use thiserror::Error;

use super::liveness_config::{ConfigError, LivenessConfig};
use super::liveness_event::LivenessEvent;
use super::liveness_observer::LivenessObserver;
use super::liveness_snapshot::{LivenessSnapshot, SessionPhase};
use crate::detection::domain::blink_detector::{BlinkDetector, BlinkOutcome, BlinkState};
use crate::detection::domain::exponential_smoother::{ExponentialSmoother, ScalarSmoother};
use crate::detection::domain::turn_detector::{TurnDetector, TurnOutcome, TurnState};
use crate::geometry::domain::face_signals::{extract_signals, RawSignals};
use crate::geometry::domain::geometry_error::GeometryError;
use crate::shared::landmark_set::LandmarkSet;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SessionError {
    #[error("session is not running (phase: {0:?})")]
    NotRunning(SessionPhase),

    #[error("frame timestamp {now_ms} ms precedes previous reading {previous_ms} ms")]
    TimestampRegressed { previous_ms: u64, now_ms: u64 },

    #[error("session window of {window_ms} ms has elapsed")]
    WindowExpired { window_ms: u64 },
}

pub struct LivenessSession {
    config: LivenessConfig,
    observer: Box<dyn LivenessObserver>,
    left_ear: ExponentialSmoother,
    right_ear: ExponentialSmoother,
    yaw: ExponentialSmoother,
    blink: BlinkDetector,
    turn: TurnDetector,
    phase: SessionPhase,
    started_at: Option<u64>,
    last_reading_at: Option<u64>,
    face_present: bool,
    window_elapsed: bool,
    passed: bool,
}

impl LivenessSession {
    /// Validates `config` up front: no frame is ever processed with a
    /// configuration the detectors cannot honour.
    pub fn new(
        config: LivenessConfig,
        observer: Box<dyn LivenessObserver>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            left_ear: ExponentialSmoother::new(config.ema_alpha_ear),
            right_ear: ExponentialSmoother::new(config.ema_alpha_ear),
            yaw: ExponentialSmoother::new(config.ema_alpha_yaw),
            blink: BlinkDetector::new(config.blink_thresholds()),
            turn: TurnDetector::new(config.turn_thresholds()),
            config,
            observer,
            phase: SessionPhase::Idle,
            started_at: None,
            last_reading_at: None,
            face_present: false,
            window_elapsed: false,
            passed: false,
        })
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn passed(&self) -> bool {
        self.passed
    }

    pub fn blink_state(&self) -> &BlinkState {
        self.blink.state()
    }

    pub fn turn_state(&self) -> &TurnState {
        self.turn.state()
    }

    /// Begin a fresh challenge at `now_ms`. Calling it on a running session
    /// is a full reset.
    pub fn start(&mut self, now_ms: u64) -> LivenessSnapshot {
        self.reinitialize(now_ms);
        self.emit(LivenessEvent::Started { at_ms: now_ms });
        self.publish()
    }

    /// Same effect as [`LivenessSession::start`]; kept separate so observers
    /// can tell a user-requested restart from the first start.
    pub fn reset(&mut self, now_ms: u64) -> LivenessSnapshot {
        self.reinitialize(now_ms);
        self.emit(LivenessEvent::Reset { at_ms: now_ms });
        self.publish()
    }

    /// Refuse further frames. Accumulated state stays readable.
    pub fn stop(&mut self) -> LivenessSnapshot {
        self.phase = SessionPhase::Stopped;
        self.emit(LivenessEvent::Stopped);
        self.publish()
    }

    /// Process one frame: `None` means no face was detected.
    pub fn process_frame(
        &mut self,
        landmarks: Option<&LandmarkSet>,
        now_ms: u64,
    ) -> Result<LivenessSnapshot, SessionError> {
        if self.phase != SessionPhase::Running {
            return Err(SessionError::NotRunning(self.phase));
        }
        if let Some(previous_ms) = self.last_reading_at.filter(|prev| now_ms < *prev) {
            return Err(SessionError::TimestampRegressed {
                previous_ms,
                now_ms,
            });
        }
        self.check_window(now_ms)?;
        self.last_reading_at = Some(now_ms);

        match landmarks.map(extract_signals) {
            None => self.face_absent(now_ms),
            Some(Err(error)) => {
                self.emit(LivenessEvent::ExtractionFailed {
                    at_ms: now_ms,
                    error,
                });
                self.face_absent(now_ms);
            }
            Some(Ok(raw)) if !signals_finite(&raw) => {
                self.emit(LivenessEvent::ExtractionFailed {
                    at_ms: now_ms,
                    error: GeometryError::Degenerate("non-finite signal"),
                });
                self.face_absent(now_ms);
            }
            Some(Ok(raw)) => self.face_observed(&raw, now_ms),
        }

        if !self.passed && self.predicate_holds() {
            self.passed = true;
            self.emit(LivenessEvent::Passed { at_ms: now_ms });
        }

        Ok(self.publish())
    }

    /// Re-check the pass predicate against committed state.
    ///
    /// Idempotent; only ever upgrades `passed`. Returns the latch value.
    pub fn evaluate_committed(&mut self) -> bool {
        if !self.passed && self.predicate_holds() {
            self.passed = true;
            self.emit(LivenessEvent::PassedOnReevaluation);
            self.publish();
        }
        self.passed
    }

    /// Ask the observer to report what it has accumulated so far.
    pub fn summary(&self) {
        self.observer.summary();
    }

    pub fn snapshot(&self) -> LivenessSnapshot {
        LivenessSnapshot {
            passed: self.passed,
            blink_count: self.blink.blink_count(),
            last_direction: self.turn.state().last_direction,
            turned_left_ever: self.turn.state().turned_left_ever,
            turned_right_ever: self.turn.state().turned_right_ever,
            smoothed_left_ear: self.left_ear.value(),
            smoothed_right_ear: self.right_ear.value(),
            smoothed_yaw: self.yaw.value(),
            session_started_at: self.started_at,
            phase: self.phase,
            face_present: self.face_present,
            window_elapsed: self.window_elapsed,
        }
    }

    fn reinitialize(&mut self, now_ms: u64) {
        self.left_ear.reset();
        self.right_ear.reset();
        self.yaw.reset();
        self.blink.reset();
        self.turn.reset();
        self.phase = SessionPhase::Running;
        self.started_at = Some(now_ms);
        self.last_reading_at = Some(now_ms);
        self.face_present = false;
        self.window_elapsed = false;
        self.passed = false;
    }

    fn check_window(&mut self, now_ms: u64) -> Result<(), SessionError> {
        let window_ms = self.config.session_window_ms;
        let started_at = self.started_at.unwrap_or(now_ms);

        if !self.window_elapsed && now_ms.saturating_sub(started_at) >= window_ms {
            self.window_elapsed = true;
            self.emit(LivenessEvent::WindowElapsed {
                at_ms: now_ms,
                window_ms,
            });
            if self.config.enforce_session_window {
                self.publish();
            }
        }

        if self.window_elapsed && self.config.enforce_session_window {
            return Err(SessionError::WindowExpired { window_ms });
        }
        Ok(())
    }

    /// Previous smoothed values are kept; only the in-flight timers go.
    fn face_absent(&mut self, now_ms: u64) {
        let discarded_closure = self.blink.face_lost();
        let discarded_hold = self.turn.face_lost();
        if self.face_present || discarded_closure || discarded_hold {
            self.emit(LivenessEvent::FaceLost {
                at_ms: now_ms,
                discarded_closure,
                discarded_hold,
            });
        }
        self.face_present = false;
    }

    fn face_observed(&mut self, raw: &RawSignals, now_ms: u64) {
        if !self.face_present {
            self.face_present = true;
            self.emit(LivenessEvent::FaceFound { at_ms: now_ms });
        }

        let left = self.left_ear.update(raw.left_ear);
        let right = self.right_ear.update(raw.right_ear);
        let yaw = self.yaw.update(raw.yaw);

        match self.blink.update(now_ms, (left + right) / 2.0) {
            BlinkOutcome::Unchanged => {}
            BlinkOutcome::Closed => self.emit(LivenessEvent::EyesClosed { at_ms: now_ms }),
            BlinkOutcome::Counted { closed_ms, count } => {
                self.emit(LivenessEvent::BlinkCounted {
                    at_ms: now_ms,
                    closed_ms,
                    count,
                })
            }
            BlinkOutcome::Rejected { closed_ms, reason } => {
                self.emit(LivenessEvent::BlinkRejected {
                    at_ms: now_ms,
                    closed_ms,
                    reason,
                })
            }
        }

        match self.turn.update(now_ms, yaw) {
            TurnOutcome::Unchanged | TurnOutcome::ExcursionEnded => {}
            TurnOutcome::ExcursionStarted(direction) => {
                self.emit(LivenessEvent::TurnStarted {
                    at_ms: now_ms,
                    direction,
                })
            }
            TurnOutcome::Held { direction, held_ms } => self.emit(LivenessEvent::TurnHeld {
                at_ms: now_ms,
                direction,
                held_ms,
            }),
        }
    }

    fn predicate_holds(&self) -> bool {
        let turns = self.turn.state();
        self.blink.blink_count() >= self.config.required_blinks
            && turns.turned_left_ever
            && turns.turned_right_ever
    }

    fn emit(&mut self, event: LivenessEvent) {
        self.observer.event(&event);
    }

    fn publish(&mut self) -> LivenessSnapshot {
        let snapshot = self.snapshot();
        self.observer.snapshot(&snapshot);
        snapshot
    }
}

fn signals_finite(raw: &RawSignals) -> bool {
    raw.left_ear.is_finite() && raw.right_ear.is_finite() && raw.yaw.is_finite()
}
