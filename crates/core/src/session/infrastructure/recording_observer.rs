use std::sync::{Arc, Mutex, MutexGuard};

use crate::session::domain::liveness_event::LivenessEvent;
use crate::session::domain::liveness_observer::LivenessObserver;
use crate::session::domain::liveness_snapshot::LivenessSnapshot;

#[derive(Default)]
struct Recorded {
    events: Vec<LivenessEvent>,
    snapshots: Vec<LivenessSnapshot>,
    summary_requests: usize,
}

/// Shared view of everything a [`RecordingObserver`] has seen.
///
/// Stays readable after the observer itself has been moved into a session.
#[derive(Clone, Default)]
pub struct RecordedLog {
    inner: Arc<Mutex<Recorded>>,
}

impl RecordedLog {
    fn lock(&self) -> MutexGuard<'_, Recorded> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn events(&self) -> Vec<LivenessEvent> {
        self.lock().events.clone()
    }

    pub fn event_names(&self) -> Vec<&'static str> {
        self.lock().events.iter().map(LivenessEvent::name).collect()
    }

    pub fn snapshots(&self) -> Vec<LivenessSnapshot> {
        self.lock().snapshots.clone()
    }

    pub fn last_snapshot(&self) -> Option<LivenessSnapshot> {
        self.lock().snapshots.last().cloned()
    }

    pub fn summary_requests(&self) -> usize {
        self.lock().summary_requests
    }
}

/// Observer that keeps every event and snapshot in memory.
#[derive(Default)]
pub struct RecordingObserver {
    log: RecordedLog,
}

impl RecordingObserver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn log(&self) -> RecordedLog {
        self.log.clone()
    }
}

impl LivenessObserver for RecordingObserver {
    fn snapshot(&mut self, snapshot: &LivenessSnapshot) {
        self.log.lock().snapshots.push(snapshot.clone());
    }

    fn event(&mut self, event: &LivenessEvent) {
        self.log.lock().events.push(event.clone());
    }

    fn summary(&self) {
        self.log.lock().summary_requests += 1;
    }
}
