use super::liveness_event::LivenessEvent;
use super::liveness_snapshot::LivenessSnapshot;

/// Observer for session output.
///
/// Decouples the session from where its results go (UI channel, log
/// output, test recorder) so the decision logic stays a pure library.
pub trait LivenessObserver: Send {
    /// Called after every processed frame and every lifecycle transition.
    fn snapshot(&mut self, snapshot: &LivenessSnapshot);

    /// Structured event describing a state change. Default: ignored.
    fn event(&mut self, _event: &LivenessEvent) {}

    /// Report whatever the observer has accumulated. Default: nothing.
    fn summary(&self) {}
}

/// Observer that discards everything.
pub struct NullLivenessObserver;

impl LivenessObserver for NullLivenessObserver {
    fn snapshot(&mut self, _snapshot: &LivenessSnapshot) {}
}
