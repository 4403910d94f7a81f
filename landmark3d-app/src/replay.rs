//! Recorded detector output playback
//!
//! Detector results are stored one JSON object per line, each a
//! [`DetectorFrame`]. Playback hands them to the session one display refresh
//! at a time.

use anyhow::{Context, Result};
use serde::Serialize;
use std::fs::File;
use std::io::{BufRead, BufWriter, Write};
use std::path::Path;
use tracing::debug;

use landmark3d_core::{instance_bytes, DetectorFrame, MarkerBuffer};
use landmark3d_projection::{FrameStatus, SessionStats, TrackingSession};

/// Parse JSON-lines detector output, skipping blank lines
pub fn read_frames<R: BufRead>(reader: R) -> Result<Vec<DetectorFrame>> {
    let mut frames = Vec::new();
    for (index, line) in reader.lines().enumerate() {
        let line = line.with_context(|| format!("failed to read line {}", index + 1))?;
        if line.trim().is_empty() {
            continue;
        }
        let frame: DetectorFrame = serde_json::from_str(&line)
            .with_context(|| format!("invalid detector frame on line {}", index + 1))?;
        frames.push(frame);
    }
    Ok(frames)
}

/// Run every frame through the session. Rejected frames are logged by the
/// session and do not stop playback.
pub fn replay(session: &mut TrackingSession, frames: &[DetectorFrame]) -> SessionStats {
    for frame in frames {
        if let Ok(FrameStatus::Duplicate) = session.on_frame(frame) {
            debug!(timestamp_ms = frame.timestamp_ms, "duplicate frame");
        }
    }
    session.stats()
}

/// Active markers at the end of playback
#[derive(Debug, Serialize)]
pub struct MarkerSnapshot {
    pub mode: String,
    pub count: usize,
    pub positions: Vec<[f32; 3]>,
    pub transforms: Vec<[[f32; 4]; 4]>,
}

impl MarkerSnapshot {
    pub fn from_session(session: &TrackingSession) -> Self {
        let buffer = session.buffer();
        Self {
            mode: session.mode().to_string(),
            count: buffer.count(),
            positions: buffer.active_positions().iter().map(|p| [p.x, p.y, p.z]).collect(),
            transforms: buffer.instance_data().iter().map(|instance| instance.model).collect(),
        }
    }

    pub fn write<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let file = File::create(path)
            .with_context(|| format!("failed to create {}", path.display()))?;
        serde_json::to_writer_pretty(BufWriter::new(file), self)?;
        Ok(())
    }
}

/// Write the active markers as packed `MarkerInstance` data, returning the byte count
pub fn write_instances<W: Write>(buffer: &MarkerBuffer, mut writer: W) -> Result<usize> {
    let instances = buffer.instance_data();
    let bytes = instance_bytes(&instances);
    writer.write_all(bytes).context("failed to write marker instances")?;
    writer.flush()?;
    Ok(bytes.len())
}
