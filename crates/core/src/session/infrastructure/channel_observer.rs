use crossbeam_channel::Sender;

use crate::session::domain::liveness_event::LivenessEvent;
use crate::session::domain::liveness_observer::LivenessObserver;
use crate::session::domain::liveness_snapshot::LivenessSnapshot;
use crate::session::domain::liveness_session::SessionError;

/// Everything a UI thread can receive from a session running elsewhere.
#[derive(Clone, Debug, PartialEq)]
pub enum LivenessMessage {
    Snapshot(LivenessSnapshot),
    Event(LivenessEvent),
    /// A frame the session refused (not running, clock regression, expired window).
    Rejected(SessionError),
}

/// Observer that forwards snapshots and events over a channel.
///
/// A dropped receiver is not an error: the session keeps running and the
/// output is discarded.
pub struct ChannelObserver {
    tx: Sender<LivenessMessage>,
}

impl ChannelObserver {
    pub fn new(tx: Sender<LivenessMessage>) -> Self {
        Self { tx }
    }
}

impl LivenessObserver for ChannelObserver {
    fn snapshot(&mut self, snapshot: &LivenessSnapshot) {
        let _ = self.tx.send(LivenessMessage::Snapshot(snapshot.clone()));
    }

    fn event(&mut self, event: &LivenessEvent) {
        let _ = self.tx.send(LivenessMessage::Event(event.clone()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_forwards_in_order() {
        let (tx, rx) = crossbeam_channel::unbounded();
        let mut observer = ChannelObserver::new(tx);
        observer.event(&LivenessEvent::Started { at_ms: 5 });
        observer.snapshot(&LivenessSnapshot::default());

        assert_eq!(
            rx.try_recv().unwrap(),
            LivenessMessage::Event(LivenessEvent::Started { at_ms: 5 })
        );
        assert!(matches!(rx.try_recv().unwrap(), LivenessMessage::Snapshot(_)));
    }

    #[test]
    fn test_dropped_receiver_is_ignored() {
        let (tx, rx) = crossbeam_channel::unbounded();
        drop(rx);
        let mut observer = ChannelObserver::new(tx);
        observer.snapshot(&LivenessSnapshot::default());
    }
}
