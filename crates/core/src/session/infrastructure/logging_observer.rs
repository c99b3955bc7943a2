use std::collections::HashMap;

use crate::session::domain::liveness_event::LivenessEvent;
use crate::session::domain::liveness_observer::LivenessObserver;
use crate::session::domain::liveness_snapshot::LivenessSnapshot;

/// Observer that forwards session output to the `log` facade.
///
/// Lifecycle events go out at `info`, signal events at `debug`, extraction
/// failures at `warn`. Snapshots are logged at `trace`, throttled to every
/// `throttle_snapshots`-th one so a 30 fps stream does not flood the output.
pub struct LoggingObserver {
    throttle_snapshots: usize,
    snapshots_seen: usize,
    event_counts: HashMap<&'static str, usize>,
    last_snapshot: Option<LivenessSnapshot>,
}

impl LoggingObserver {
    pub fn new(throttle_snapshots: usize) -> Self {
        Self {
            throttle_snapshots: throttle_snapshots.max(1),
            snapshots_seen: 0,
            event_counts: HashMap::new(),
            last_snapshot: None,
        }
    }

    /// Returns the formatted summary string, or `None` if nothing was observed.
    pub fn summary_string(&self) -> Option<String> {
        let last = self.last_snapshot.as_ref()?;
        let mut lines = vec![format!(
            "Liveness summary ({} snapshots): passed={} blinks={} left={} right={}",
            self.snapshots_seen,
            last.passed,
            last.blink_count,
            last.turned_left_ever,
            last.turned_right_ever
        )];

        let mut names: Vec<_> = self.event_counts.iter().collect();
        names.sort();
        for (name, count) in names {
            lines.push(format!("  {name:22}: {count}"));
        }

        Some(lines.join("\n"))
    }
}

impl Default for LoggingObserver {
    fn default() -> Self {
        Self::new(30)
    }
}

impl LivenessObserver for LoggingObserver {
    fn snapshot(&mut self, snapshot: &LivenessSnapshot) {
        self.snapshots_seen += 1;
        if self.snapshots_seen % self.throttle_snapshots == 0 {
            log::trace!("{snapshot:?}");
        }
        self.last_snapshot = Some(snapshot.clone());
    }

    fn event(&mut self, event: &LivenessEvent) {
        *self.event_counts.entry(event.name()).or_default() += 1;

        match event {
            LivenessEvent::ExtractionFailed { at_ms, error } => {
                log::warn!("[{at_ms} ms] landmarks unusable, treating frame as faceless: {error}");
            }
            LivenessEvent::BlinkCounted {
                at_ms,
                closed_ms,
                count,
            } => {
                log::debug!("[{at_ms} ms] blink #{count} counted (closed {closed_ms} ms)");
            }
            LivenessEvent::BlinkRejected {
                at_ms,
                closed_ms,
                reason,
            } => {
                log::debug!("[{at_ms} ms] closure of {closed_ms} ms rejected: {reason:?}");
            }
            LivenessEvent::TurnHeld {
                at_ms,
                direction,
                held_ms,
            } => {
                log::debug!("[{at_ms} ms] turn {direction} held for {held_ms} ms");
            }
            e if e.is_lifecycle() => log::info!("liveness {}: {e:?}", e.name()),
            e => log::debug!("liveness {}: {e:?}", e.name()),
        }
    }

    fn summary(&self) {
        match self.summary_string() {
            Some(summary) => log::info!("{summary}"),
            None => log::info!("Liveness summary: no snapshots observed"),
        }
    }
}
