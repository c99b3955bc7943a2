use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use std::process;

use clap::{Parser, Subcommand};
use serde::Deserialize;

use liveguard_core::session::domain::liveness_config::LivenessConfig;
use liveguard_core::session::domain::liveness_session::{LivenessSession, SessionError};
use liveguard_core::session::domain::liveness_snapshot::LivenessSnapshot;
use liveguard_core::session::infrastructure::channel_observer::LivenessMessage;
use liveguard_core::session::infrastructure::liveness_worker::{LivenessWorker, WorkerError};
use liveguard_core::session::infrastructure::logging_observer::LoggingObserver;
use liveguard_core::shared::landmark_set::LandmarkSet;
use liveguard_core::shared::synthetic_face::SyntheticFace;

const EXIT_NOT_PASSED: i32 = 2;

/// Blink and head-turn liveness check over face landmark traces.
#[derive(Parser)]
#[command(name = "liveguard")]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Config JSON file (default: <config dir>/liveguard/config.json if present).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Smoothed EAR below which the eyes count as closed.
    #[arg(long, global = true)]
    ear_close_threshold: Option<f64>,

    /// Absolute smoothed yaw beyond which the head counts as turned (0.0-1.0).
    #[arg(long, global = true)]
    yaw_abs_threshold: Option<f64>,

    /// Blinks required to pass.
    #[arg(long, global = true)]
    required_blinks: Option<u32>,

    /// Reject frames once the session window has elapsed.
    #[arg(long, global = true)]
    enforce_session_window: bool,

    /// Print every snapshot as a JSON line.
    #[arg(long, global = true)]
    json: bool,

    /// Run the session on a background worker thread.
    #[arg(long, global = true)]
    threaded: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Replay a JSON-lines landmark trace.
    Replay {
        /// Trace file, one `{"t_ms": .., "landmarks": [[x, y], ..] | null}` per line.
        trace: PathBuf,
    },
    /// Run a scripted synthetic face: two blinks, a right turn, a left turn.
    Demo {
        /// Milliseconds between synthetic frames.
        #[arg(long, default_value = "33")]
        frame_interval_ms: u64,
    },
}

#[derive(Deserialize)]
struct TraceLine {
    t_ms: u64,
    landmarks: Option<TraceLandmarks>,
}

/// One line uses either `[x, y]` or `[x, y, z]` points throughout.
#[derive(Deserialize)]
#[serde(untagged)]
enum TraceLandmarks {
    Pairs(Vec<[f64; 2]>),
    Triples(Vec<[f64; 3]>),
}

impl TraceLandmarks {
    fn into_landmark_set(self) -> LandmarkSet {
        match self {
            TraceLandmarks::Pairs(pairs) => LandmarkSet::from_pairs(&pairs),
            TraceLandmarks::Triples(triples) => LandmarkSet::from_triples(&triples),
        }
    }
}

type Frame = (u64, Option<LandmarkSet>);

fn main() {
    env_logger::init();

    match run() {
        Ok(true) => {}
        Ok(false) => process::exit(EXIT_NOT_PASSED),
        Err(e) => {
            eprintln!("Error: {e}");
            process::exit(1);
        }
    }
}

fn run() -> Result<bool, Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    validate(&cli)?;

    let config = load_config(&cli)?;
    let frames = match &cli.command {
        Command::Replay { trace } => read_trace(trace)?,
        Command::Demo { frame_interval_ms } => demo_frames(*frame_interval_ms),
    };
    log::info!("Running liveness check over {} frames", frames.len());

    let passed = if cli.threaded {
        run_threaded(config, frames, cli.json)?
    } else {
        run_inline(config, frames, cli.json)?
    };

    if passed {
        log::info!("Liveness check passed");
    } else {
        log::info!("Liveness check not passed");
    }
    Ok(passed)
}

fn run_inline(
    config: LivenessConfig,
    frames: Vec<Frame>,
    json: bool,
) -> Result<bool, Box<dyn std::error::Error>> {
    let start_ms = frames.first().map(|(t, _)| *t).unwrap_or(0);
    let mut session = LivenessSession::new(config, Box::new(LoggingObserver::default()))?;
    let mut printer = SnapshotPrinter::new(json);
    printer.print(Some(start_ms), &session.start(start_ms))?;

    for (t_ms, landmarks) in frames {
        match session.process_frame(landmarks.as_ref(), t_ms) {
            Ok(snapshot) => printer.print(Some(t_ms), &snapshot)?,
            Err(e @ SessionError::TimestampRegressed { .. }) => {
                log::warn!("Skipping frame: {e}");
            }
            Err(e) => {
                log::warn!("Stopping replay: {e}");
                break;
            }
        }
    }

    let passed = session.evaluate_committed();
    session.summary();
    Ok(passed)
}

fn run_threaded(
    config: LivenessConfig,
    frames: Vec<Frame>,
    json: bool,
) -> Result<bool, Box<dyn std::error::Error>> {
    let start_ms = frames.first().map(|(t, _)| *t).unwrap_or(0);
    let (worker, messages) = LivenessWorker::with_capacity(config, frames.len().max(1))?;
    worker.start(start_ms)?;

    let mut printer = SnapshotPrinter::new(json);
    for (t_ms, landmarks) in frames {
        match worker.submit_frame(landmarks, t_ms) {
            Ok(()) => {}
            Err(e @ WorkerError::Backlogged { .. }) => log::warn!("{e}"),
            Err(e) => return Err(e.into()),
        }
        for message in messages.try_iter() {
            print_message(&mut printer, message)?;
        }
    }

    let mut session = worker.join()?;
    for message in messages.try_iter() {
        print_message(&mut printer, message)?;
    }
    let passed = session.evaluate_committed();
    session.summary();
    Ok(passed)
}

fn print_message(
    printer: &mut SnapshotPrinter,
    message: LivenessMessage,
) -> Result<(), Box<dyn std::error::Error>> {
    match message {
        LivenessMessage::Snapshot(snapshot) => printer.print(None, &snapshot)?,
        LivenessMessage::Rejected(e) => log::warn!("Frame rejected: {e}"),
        LivenessMessage::Event(_) => {}
    }
    Ok(())
}

/// Prints every snapshot as JSON, or only the ones that change progress as text.
struct SnapshotPrinter {
    json: bool,
    previous: Option<LivenessSnapshot>,
}

impl SnapshotPrinter {
    fn new(json: bool) -> Self {
        Self {
            json,
            previous: None,
        }
    }

    fn print(
        &mut self,
        t_ms: Option<u64>,
        snapshot: &LivenessSnapshot,
    ) -> Result<(), Box<dyn std::error::Error>> {
        if self.json {
            let line = serde_json::json!({ "t_ms": t_ms, "snapshot": snapshot });
            println!("{}", serde_json::to_string(&line)?);
        } else if self.is_progress(snapshot) {
            let at = t_ms.map(|t| format!("{t:>6} ms")).unwrap_or_default();
            let direction = snapshot
                .last_direction
                .map(|d| d.to_string())
                .unwrap_or_else(|| "-".into());
            println!(
                "{at} phase={:?} face={} blinks={} turn={direction} left={} right={} passed={}",
                snapshot.phase,
                snapshot.face_present,
                snapshot.blink_count,
                snapshot.turned_left_ever,
                snapshot.turned_right_ever,
                snapshot.passed
            );
        }
        self.previous = Some(snapshot.clone());
        Ok(())
    }

    fn is_progress(&self, snapshot: &LivenessSnapshot) -> bool {
        match &self.previous {
            None => true,
            Some(prev) => {
                prev.phase != snapshot.phase
                    || prev.face_present != snapshot.face_present
                    || prev.blink_count != snapshot.blink_count
                    || prev.last_direction != snapshot.last_direction
                    || prev.passed != snapshot.passed
                    || prev.window_elapsed != snapshot.window_elapsed
            }
        }
    }
}

fn load_config(cli: &Cli) -> Result<LivenessConfig, Box<dyn std::error::Error>> {
    let mut config = match &cli.config {
        Some(path) => LivenessConfig::from_json_file(path)?,
        None => match default_config_path() {
            Some(path) if path.exists() => {
                log::info!("Loading config from {}", path.display());
                LivenessConfig::from_json_file(&path)?
            }
            _ => LivenessConfig::default(),
        },
    };

    if let Some(threshold) = cli.ear_close_threshold {
        config.ear_close_threshold = threshold;
    }
    if let Some(threshold) = cli.yaw_abs_threshold {
        config.yaw_abs_threshold = threshold;
    }
    if let Some(blinks) = cli.required_blinks {
        config.required_blinks = blinks;
    }
    if cli.enforce_session_window {
        config.enforce_session_window = true;
    }

    config.validate()?;
    Ok(config)
}

fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("liveguard").join("config.json"))
}

fn validate(cli: &Cli) -> Result<(), Box<dyn std::error::Error>> {
    if let Command::Replay { trace } = &cli.command {
        if !trace.exists() {
            return Err(format!("Trace file not found: {}", trace.display()).into());
        }
    }
    if let Command::Demo { frame_interval_ms } = &cli.command {
        if *frame_interval_ms == 0 {
            return Err("Frame interval must be at least 1 ms".into());
        }
    }
    if let Some(path) = &cli.config {
        if !path.exists() {
            return Err(format!("Config file not found: {}", path.display()).into());
        }
    }
    if let Some(threshold) = cli.yaw_abs_threshold {
        if !(0.0..=1.0).contains(&threshold) {
            return Err(format!(
                "Yaw threshold must be between 0.0 and 1.0, got {threshold}"
            )
            .into());
        }
    }
    Ok(())
}

fn read_trace(path: &Path) -> Result<Vec<Frame>, Box<dyn std::error::Error>> {
    let reader = BufReader::new(File::open(path)?);
    let mut frames = Vec::new();

    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let parsed: TraceLine = serde_json::from_str(&line)
            .map_err(|e| format!("{}:{}: {e}", path.display(), index + 1))?;
        let landmarks = parsed.landmarks.map(TraceLandmarks::into_landmark_set);
        frames.push((parsed.t_ms, landmarks));
    }

    Ok(frames)
}

/// Scripted face: two eye closures a second apart, then a held right turn
/// and a held left turn, then a short dropout.
fn demo_frames(interval_ms: u64) -> Vec<Frame> {
    let neutral = SyntheticFace::new();
    let closed = SyntheticFace::new().with_ear(0.10);
    let right = SyntheticFace::new().with_yaw(0.9);
    let left = SyntheticFace::new().with_yaw(-0.9);

    let script: [(u64, Option<SyntheticFace>); 10] = [
        (1_000, Some(neutral)),
        (300, Some(closed)),
        (1_000, Some(neutral)),
        (300, Some(closed)),
        (700, Some(neutral)),
        (600, Some(right)),
        (600, Some(neutral)),
        (600, Some(left)),
        (600, Some(neutral)),
        (300, None),
    ];

    let mut frames = Vec::new();
    let mut t_ms = 0;
    for (duration_ms, face) in script {
        let end_ms = t_ms + duration_ms;
        while t_ms < end_ms {
            frames.push((t_ms, face.as_ref().map(SyntheticFace::build)));
            t_ms += interval_ms;
        }
    }
    frames
}
