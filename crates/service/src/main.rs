//! vrwheeld - hand-tracked VR wheel daemon
//!
//! Runs the frame loop at a fixed rate: poses in (live idle source or a
//! JSONL recording), virtual controller writes out, feedback signals handed
//! to a logging thread, FFB packets fed from a recording on their own
//! thread.

#![deny(static_mut_refs)]
#![deny(unused_must_use)]
#![deny(clippy::unwrap_used)]

mod feedback;
mod ffb_feed;
mod replay;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use crossbeam::channel;
use tracing::{debug, error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use vrwheel_config::SimConfig;
use vrwheel_engine::{
    ChannelFeedback, ControlMode, DEFAULT_RATE_HZ, FrameEngine, FrameScheduler, LatestRender,
    PoseSource, axes,
};
use vrwheel_errors::VrWheelError;
use vrwheel_ffb::FfbHandle;

use crate::feedback::{TracingController, spawn_logger};
use crate::ffb_feed::{load_packets, spawn_feeder};
use crate::replay::{IdlePoses, ReplayPoses};

const FEEDBACK_QUEUE: usize = 256;

#[derive(Parser, Debug)]
#[command(name = "vrwheeld")]
#[command(about = "Hand-tracked VR steering wheel, H-shifter and FFB frame loop")]
#[command(version)]
struct Cli {
    /// Settings file; created with defaults when missing
    #[arg(long, default_value = "config.json")]
    config: PathBuf,

    /// Frame rate in Hz
    #[arg(long, default_value_t = DEFAULT_RATE_HZ)]
    rate: f64,

    /// Replay poses from a JSONL recording instead of idling
    #[arg(long)]
    replay: Option<PathBuf>,

    /// Feed FFB packets (one hex packet per line) while running
    #[arg(long)]
    ffb: Option<PathBuf>,

    /// Stop after this many frames
    #[arg(long)]
    frames: Option<u64>,

    /// Control surface: wheel or bike
    #[arg(long, default_value = "wheel")]
    mode: ControlMode,

    /// Verbose logging
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level = match cli.verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!("vrwheeld={log_level},vrwheel_engine={log_level},vrwheel_ffb={log_level}")
                    .into()
            }),
        )
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    info!("Starting vrwheeld v{}", env!("CARGO_PKG_VERSION"));
    run(&cli)
}

/// Log a domain error with its classification and hand it to `anyhow`.
fn escalate(err: impl Into<VrWheelError>) -> anyhow::Error {
    let err = err.into();
    error!(
        category = %err.category(),
        severity = %err.severity(),
        recoverable = err.is_recoverable(),
        "{err}"
    );
    anyhow::Error::new(err)
}

fn run(cli: &Cli) -> Result<()> {
    let mut config = SimConfig::load_or_default(&cli.config)
        .map_err(escalate)
        .with_context(|| format!("loading {}", cli.config.display()))?;
    if config.normalize() {
        warn!("config values out of range were clamped");
    }
    let loaded = config.clone();

    let ffb = FfbHandle::default();
    let mut engine = FrameEngine::new(config, cli.mode)
        .map_err(escalate)?
        .with_ffb(ffb.clone());
    let mut scheduler = FrameScheduler::new(cli.rate).map_err(escalate)?;

    let feeder = match &cli.ffb {
        Some(path) => {
            let packets = load_packets(path)?;
            info!(count = packets.len(), path = %path.display(), "replaying FFB packets");
            Some(spawn_feeder(packets, ffb.clone(), scheduler.period())?)
        }
        None => None,
    };

    let mut poses: Box<dyn PoseSource> = match &cli.replay {
        Some(path) => {
            info!(path = %path.display(), "replaying poses");
            Box::new(ReplayPoses::open(path)?)
        }
        None => Box::new(IdlePoses),
    };

    let (tx, rx) = channel::bounded(FEEDBACK_QUEUE);
    let logger = spawn_logger(rx).context("starting feedback thread")?;
    let mut feedback = ChannelFeedback::new(tx);
    let mut controller = TracingController::default();
    let mut render = LatestRender::default();

    info!(
        mode = ?cli.mode,
        rate = cli.rate,
        late_tolerance_us = scheduler.late_tolerance().as_micros(),
        "frame loop running"
    );
    loop {
        if cli.frames.is_some_and(|n| scheduler.tick_count() >= n) {
            break;
        }
        let tick = scheduler.wait_for_tick();
        let Some(frame) = poses.poll() else {
            info!("pose stream ended");
            break;
        };
        let report = engine.tick(&frame, tick.now, &mut controller, &mut feedback, &mut render);
        if !report.changes.is_empty() {
            debug!(frame = report.index, attachments = ?report.attachments, "hands");
        }
    }

    let pose_failure = poses.take_error();

    let dropped = feedback.dropped();
    drop(feedback);
    let tally = logger
        .join()
        .map_err(|panic| anyhow::anyhow!("feedback thread panicked: {panic:?}"))?;
    if let Some(feeder) = feeder {
        let counters = feeder
            .join()
            .map_err(|panic| anyhow::anyhow!("FFB feeder thread panicked: {panic:?}"))?;
        info!(
            packets = counters.packets,
            applied = counters.applied,
            malformed = counters.malformed,
            unhandled = counters.unhandled,
            "FFB replay finished"
        );
    }

    let stats = scheduler.stats();
    info!(
        frames = stats.total_frames,
        late = stats.late_frames,
        p99_jitter_us = stats.p99_jitter_ns() / 1000,
        pulses = tally.pulses,
        gear_changes = tally.gear_changes,
        feedback_dropped = dropped,
        axis = ?controller.state().axis(axes::X),
        "stopped"
    );

    if engine.config() != &loaded {
        engine
            .config()
            .save(&cli.config)
            .map_err(escalate)
            .with_context(|| format!("saving {}", cli.config.display()))?;
        info!(path = %cli.config.display(), "wheel placement saved");
    }

    match pose_failure {
        Some(err) if !err.is_recoverable() => Err(escalate(err)),
        Some(err) => {
            warn!(%err, "pose source stopped");
            Ok(())
        }
        None => Ok(()),
    }
}
