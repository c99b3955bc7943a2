pub mod channel_observer;
pub mod liveness_worker;
pub mod logging_observer;
pub mod recording_observer;
