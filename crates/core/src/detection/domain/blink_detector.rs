//! Debounced blink counting over the smoothed average EAR.
//!
//! Three guards turn a noisy ratio into discrete blinks:
//!
//! - **Hysteresis:** eyes close below `close_threshold` but only reopen at
//!   `close_threshold + open_margin`, so a signal hovering near one boundary
//!   cannot toggle every frame.
//! - **Minimum duration:** closures shorter than `min_close_ms` are noise.
//! - **Refractory period:** a reopening within `refractory_ms` of the last
//!   counted blink is the same physical blink bouncing on the open threshold.
//!
//! All timing is evaluated against caller-supplied millisecond timestamps.

pub const DEFAULT_CLOSE_THRESHOLD: f64 = 0.18;
pub const DEFAULT_OPEN_MARGIN: f64 = 0.03;
pub const DEFAULT_MIN_CLOSE_MS: u64 = 120;
pub const DEFAULT_REFRACTORY_MS: u64 = 250;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BlinkThresholds {
    pub close_threshold: f64,
    pub open_margin: f64,
    pub min_close_ms: u64,
    pub refractory_ms: u64,
}

impl BlinkThresholds {
    pub fn open_threshold(&self) -> f64 {
        self.close_threshold + self.open_margin
    }
}

impl Default for BlinkThresholds {
    fn default() -> Self {
        Self {
            close_threshold: DEFAULT_CLOSE_THRESHOLD,
            open_margin: DEFAULT_OPEN_MARGIN,
            min_close_ms: DEFAULT_MIN_CLOSE_MS,
            refractory_ms: DEFAULT_REFRACTORY_MS,
        }
    }
}

/// `closed_since` is `Some` exactly while `is_closed` is true.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BlinkState {
    pub is_closed: bool,
    pub closed_since: Option<u64>,
    pub last_blink_at: Option<u64>,
    pub blink_count: u32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BlinkRejection {
    TooShort,
    Refractory,
}

/// What a single update did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BlinkOutcome {
    Unchanged,
    Closed,
    Counted {
        closed_ms: u64,
        count: u32,
    },
    Rejected {
        closed_ms: u64,
        reason: BlinkRejection,
    },
}

#[derive(Clone, Debug)]
pub struct BlinkDetector {
    thresholds: BlinkThresholds,
    state: BlinkState,
}

impl BlinkDetector {
    pub fn new(thresholds: BlinkThresholds) -> Self {
        Self {
            thresholds,
            state: BlinkState::default(),
        }
    }

    pub fn state(&self) -> &BlinkState {
        &self.state
    }

    pub fn blink_count(&self) -> u32 {
        self.state.blink_count
    }

    /// Advance the state machine with one smoothed average EAR sample.
    ///
    /// The caller guarantees `ear` is finite; non-finite samples must be
    /// reported through [`BlinkDetector::face_lost`] instead.
    pub fn update(&mut self, now_ms: u64, ear: f64) -> BlinkOutcome {
        let Some(closed_since) = self.state.closed_since.filter(|_| self.state.is_closed) else {
            if ear < self.thresholds.close_threshold {
                self.state.is_closed = true;
                self.state.closed_since = Some(now_ms);
                return BlinkOutcome::Closed;
            }
            return BlinkOutcome::Unchanged;
        };

        if ear < self.thresholds.open_threshold() {
            // Still closed, or inside the hysteresis band.
            return BlinkOutcome::Unchanged;
        }

        self.state.is_closed = false;
        self.state.closed_since = None;
        let closed_ms = now_ms.saturating_sub(closed_since);

        if closed_ms < self.thresholds.min_close_ms {
            return BlinkOutcome::Rejected {
                closed_ms,
                reason: BlinkRejection::TooShort,
            };
        }

        let in_refractory = self
            .state
            .last_blink_at
            .is_some_and(|last| now_ms.saturating_sub(last) < self.thresholds.refractory_ms);
        if in_refractory {
            return BlinkOutcome::Rejected {
                closed_ms,
                reason: BlinkRejection::Refractory,
            };
        }

        self.state.blink_count += 1;
        self.state.last_blink_at = Some(now_ms);
        BlinkOutcome::Counted {
            closed_ms,
            count: self.state.blink_count,
        }
    }

    /// Drop an in-flight closure without credit. Returns whether one was discarded.
    pub fn face_lost(&mut self) -> bool {
        let was_closed = self.state.is_closed;
        self.state.is_closed = false;
        self.state.closed_since = None;
        was_closed
    }

    pub fn reset(&mut self) {
        self.state = BlinkState::default();
    }
}

impl Default for BlinkDetector {
    fn default() -> Self {
        Self::new(BlinkThresholds::default())
    }
}
