use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;

use crossbeam_channel::{Receiver, Sender, TrySendError};
use thiserror::Error;

use super::channel_observer::{ChannelObserver, LivenessMessage};
use crate::session::domain::liveness_config::{ConfigError, LivenessConfig};
use crate::session::domain::liveness_session::LivenessSession;
use crate::shared::landmark_set::LandmarkSet;

const DEFAULT_CHANNEL_CAPACITY: usize = 8;

type Spawned = (LivenessWorker, Receiver<LivenessMessage>);

#[derive(Error, Debug)]
pub enum WorkerError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("failed to spawn liveness worker thread: {0}")]
    Spawn(#[source] std::io::Error),
    #[error("frame queue is full, frame at {now_ms} ms dropped")]
    Backlogged { now_ms: u64 },
    #[error("liveness worker has shut down")]
    Disconnected,
    #[error("liveness worker thread panicked")]
    Panicked,
}

enum Lifecycle {
    Start { now_ms: u64 },
    Reset { now_ms: u64 },
    Stop,
}

/// Every command carries the lifecycle generation current when it was sent.
enum WorkerCommand {
    Frame {
        landmarks: Option<LandmarkSet>,
        now_ms: u64,
        generation: u64,
    },
    Lifecycle {
        action: Lifecycle,
        generation: u64,
    },
}

/// Runs a [`LivenessSession`] on a dedicated thread.
///
/// Layout: `caller → [commands] → worker (session) → [messages] → caller`
///
/// Frames go through a bounded queue and are refused rather than blocking
/// when it is full. Lifecycle commands always get through. Each of `start`,
/// `reset` and `stop` opens a new generation; a queued frame from an older
/// generation is discarded, so nothing submitted before a stop is processed
/// after it, even when a reset follows right away.
pub struct LivenessWorker {
    commands: Sender<WorkerCommand>,
    generation: Arc<AtomicU64>,
    handle: JoinHandle<LivenessSession>,
}

impl LivenessWorker {
    pub fn spawn(config: LivenessConfig) -> Result<Spawned, WorkerError> {
        Self::with_capacity(config, DEFAULT_CHANNEL_CAPACITY)
    }

    pub fn with_capacity(config: LivenessConfig, capacity: usize) -> Result<Spawned, WorkerError> {
        let (message_tx, message_rx) = crossbeam_channel::unbounded::<LivenessMessage>();
        let (command_tx, command_rx) = crossbeam_channel::bounded(capacity.max(1));

        let observer = ChannelObserver::new(message_tx.clone());
        let session = LivenessSession::new(config, Box::new(observer))?;
        let generation = Arc::new(AtomicU64::new(0));
        let generation_clone = generation.clone();

        let handle = std::thread::Builder::new()
            .name("liveness-worker".into())
            .spawn(move || run_worker(session, command_rx, message_tx, generation_clone))
            .map_err(WorkerError::Spawn)?;

        Ok((
            Self {
                commands: command_tx,
                generation,
                handle,
            },
            message_rx,
        ))
    }

    pub fn start(&self, now_ms: u64) -> Result<(), WorkerError> {
        self.send_lifecycle(Lifecycle::Start { now_ms })
    }

    pub fn reset(&self, now_ms: u64) -> Result<(), WorkerError> {
        self.send_lifecycle(Lifecycle::Reset { now_ms })
    }

    pub fn stop(&self) -> Result<(), WorkerError> {
        self.send_lifecycle(Lifecycle::Stop)
    }

    /// Queues a frame without blocking. Returns `Backlogged` if the worker
    /// has fallen behind; the caller should move on to its next frame.
    pub fn submit_frame(
        &self,
        landmarks: Option<LandmarkSet>,
        now_ms: u64,
    ) -> Result<(), WorkerError> {
        let command = WorkerCommand::Frame {
            landmarks,
            now_ms,
            generation: self.generation.load(Ordering::SeqCst),
        };
        match self.commands.try_send(command) {
            Ok(()) => Ok(()),
            Err(TrySendError::Full(_)) => Err(WorkerError::Backlogged { now_ms }),
            Err(TrySendError::Disconnected(_)) => Err(WorkerError::Disconnected),
        }
    }

    /// Drains the queue, runs the committed-state check and hands the
    /// session back.
    pub fn join(self) -> Result<LivenessSession, WorkerError> {
        drop(self.commands);
        self.handle.join().map_err(|_| WorkerError::Panicked)
    }

    fn send_lifecycle(&self, action: Lifecycle) -> Result<(), WorkerError> {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        self.commands
            .send(WorkerCommand::Lifecycle { action, generation })
            .map_err(|_| WorkerError::Disconnected)
    }
}

fn run_worker(
    mut session: LivenessSession,
    commands: Receiver<WorkerCommand>,
    messages: Sender<LivenessMessage>,
    current: Arc<AtomicU64>,
) -> LivenessSession {
    log::debug!("liveness worker started");
    let mut applied = 0u64;
    let mut discarded = 0usize;

    for command in commands {
        match command {
            WorkerCommand::Frame {
                landmarks,
                now_ms,
                generation,
            } => {
                // Superseded by a lifecycle call, whether or not it has been applied yet.
                if generation != applied || generation != current.load(Ordering::SeqCst) {
                    discarded += 1;
                    continue;
                }
                if let Err(e) = session.process_frame(landmarks.as_ref(), now_ms) {
                    log::debug!("frame at {now_ms} ms rejected: {e}");
                    let _ = messages.send(LivenessMessage::Rejected(e));
                }
            }
            WorkerCommand::Lifecycle { action, generation } => {
                applied = generation;
                match action {
                    Lifecycle::Start { now_ms } => session.start(now_ms),
                    Lifecycle::Reset { now_ms } => session.reset(now_ms),
                    Lifecycle::Stop => session.stop(),
                };
            }
        }
    }

    session.evaluate_committed();
    log::debug!("liveness worker exiting ({discarded} superseded frames discarded)");
    session
}
