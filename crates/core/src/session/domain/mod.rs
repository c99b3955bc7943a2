pub mod liveness_config;
pub mod liveness_event;
pub mod liveness_observer;
pub mod liveness_session;
pub mod liveness_snapshot;
