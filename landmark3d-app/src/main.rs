//! landmark3d replay tool
//!
//! Feeds recorded landmark detector output through a tracking session and
//! reports the marker transforms it produces.
//!
//! # Usage
//!
//! ```bash
//! # Face tracking with default settings
//! landmark3d recording.jsonl
//!
//! # Body tracking, wider webcam, final markers written out
//! landmark3d --mode pose --fov 78 --output markers.json recording.jsonl
//!
//! # Packed instance data for a renderer
//! landmark3d --instances markers.bin recording.jsonl
//! ```

mod config;
mod replay;

use anyhow::{Context, Result};
use clap::Parser;
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::PathBuf;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use landmark3d_projection::{TrackingMode, TrackingSession};

use crate::config::AppConfig;
use crate::replay::{read_frames, replay, write_instances, MarkerSnapshot};

/// Replay landmark detector output as 3D markers
#[derive(Parser, Debug)]
#[command(name = "landmark3d")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Recorded detector output, one JSON frame per line
    input: PathBuf,

    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Tracking variant: face or pose
    #[arg(short, long)]
    mode: Option<TrackingMode>,

    /// Webcam field of view in degrees (30-100)
    #[arg(long)]
    fov: Option<f32>,

    /// Depth exaggeration factor (0.05-0.5)
    #[arg(long)]
    depth_scalar: Option<f32>,

    /// Write the final marker transforms to this JSON file
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Write the final marker instances as raw GPU instance data to this file
    #[arg(long)]
    instances: Option<PathBuf>,

    /// Logging verbosity level
    #[arg(short, long)]
    log_level: Option<String>,
}

fn parse_level(level: &str) -> Level {
    match level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => AppConfig::load(path)?,
        None => AppConfig::default(),
    };
    if let Some(mode) = cli.mode {
        config.session.mode = mode;
    }
    if let Some(fov) = cli.fov {
        config.session.projection.fov = fov;
    }
    if let Some(depth_scalar) = cli.depth_scalar {
        config.session.projection.depth_scalar = depth_scalar;
    }

    let level = cli
        .log_level
        .as_deref()
        .or(config.log_level.as_deref())
        .map(parse_level)
        .unwrap_or(Level::INFO);
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    info!("landmark3d v{}", env!("CARGO_PKG_VERSION"));

    let mut session =
        TrackingSession::new(config.session).context("invalid session configuration")?;
    info!(
        mode = %session.mode(),
        fov = config.session.projection.fov,
        depth_scalar = config.session.projection.depth_scalar,
        "tracking session ready"
    );

    let file = File::open(&cli.input)
        .with_context(|| format!("failed to open detector recording {}", cli.input.display()))?;
    let frames = read_frames(BufReader::new(file))?;
    info!("Loaded {} detector frames", frames.len());

    let stats = replay(&mut session, &frames);
    info!(
        drawn = stats.frames_drawn,
        without_subject = stats.frames_without_subject,
        duplicates = stats.duplicate_frames,
        rejected = stats.rejected_frames,
        active_markers = session.buffer().count(),
        "replay finished"
    );

    if let Some(output) = &cli.output {
        MarkerSnapshot::from_session(&session).write(output)?;
        info!("Wrote markers to {}", output.display());
    }

    if let Some(path) = &cli.instances {
        let file = File::create(path)
            .with_context(|| format!("failed to create {}", path.display()))?;
        let written = write_instances(session.buffer(), BufWriter::new(file))?;
        info!("Wrote {} bytes of marker instances to {}", written, path.display());
    }

    Ok(())
}
