//! Tracking session
//!
//! Owns the detector camera, the marker buffer and the projector chosen at
//! startup, and runs the projector once per new detector result.

use tracing::{debug, warn};

use landmark3d_core::{DetectorFrame, MarkerBuffer, Result};

use crate::camera::DetectorCamera;
use crate::config::{validate_depth_scalar, validate_fov, SessionConfig, TrackingMode};
use crate::face::FaceProjector;
use crate::frame_guard::FrameGuard;
use crate::pose::PoseProjector;
use crate::projector::{LandmarkProjector, ProjectionOutcome};

/// What happened to one detector frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameStatus {
    /// The video timestamp was already processed
    Duplicate,
    /// The projector ran
    Projected(ProjectionOutcome),
}

/// Frame counters for a session
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionStats {
    pub frames_received: usize,
    pub frames_drawn: usize,
    pub frames_without_subject: usize,
    pub duplicate_frames: usize,
    pub rejected_frames: usize,
}

/// One tracking session with a fixed tracking mode
pub struct TrackingSession {
    config: SessionConfig,
    camera: DetectorCamera,
    buffer: MarkerBuffer,
    projector: Box<dyn LandmarkProjector>,
    guard: FrameGuard,
    stats: SessionStats,
}

impl TrackingSession {
    /// Validate `config` and build the camera, marker buffer and projector
    pub fn new(config: SessionConfig) -> Result<Self> {
        config.validate()?;
        let camera = DetectorCamera::from_config(&config.camera, config.projection.fov)?;
        let buffer = MarkerBuffer::with_capacity(config.marker_capacity());
        let projector: Box<dyn LandmarkProjector> = match config.mode {
            TrackingMode::Face => Box::new(FaceProjector::new(config.markers.scale)),
            TrackingMode::Pose => Box::new(PoseProjector::new(&config.pose, config.markers.scale)),
        };
        debug!(mode = %config.mode, capacity = buffer.capacity(), "tracking session created");

        Ok(Self {
            config,
            camera,
            buffer,
            projector,
            guard: FrameGuard::new(),
            stats: SessionStats::default(),
        })
    }

    /// Run the projector on a detector result.
    ///
    /// Frames with an already processed timestamp are ignored. A frame the
    /// projector rejects leaves the previous markers in place and returns the
    /// error.
    pub fn on_frame(&mut self, frame: &DetectorFrame) -> Result<FrameStatus> {
        self.stats.frames_received += 1;
        if !self.guard.accept(frame.timestamp_ms) {
            self.stats.duplicate_frames += 1;
            return Ok(FrameStatus::Duplicate);
        }

        self.camera.set_fov(self.config.projection.fov);
        let outcome = match self
            .projector
            .project(frame, &self.camera, &self.config.projection, &mut self.buffer)
        {
            Ok(outcome) => outcome,
            Err(e) => {
                self.stats.rejected_frames += 1;
                warn!(timestamp_ms = frame.timestamp_ms, error = %e, "detector frame rejected");
                return Err(e);
            }
        };

        match outcome {
            ProjectionOutcome::Drawn { .. } => self.stats.frames_drawn += 1,
            ProjectionOutcome::Cleared | ProjectionOutcome::Skipped => {
                self.stats.frames_without_subject += 1
            }
        }
        debug!(
            projector = self.projector.name(),
            timestamp_ms = frame.timestamp_ms,
            ?outcome,
            active = self.buffer.count(),
            "frame projected"
        );
        Ok(FrameStatus::Projected(outcome))
    }

    /// Change the webcam field of view used from the next frame on
    pub fn set_fov(&mut self, fov: f32) -> Result<()> {
        validate_fov(fov)?;
        self.config.projection.fov = fov;
        Ok(())
    }

    /// Change the depth exaggeration used from the next frame on
    pub fn set_depth_scalar(&mut self, depth_scalar: f32) -> Result<()> {
        validate_depth_scalar(depth_scalar)?;
        self.config.projection.depth_scalar = depth_scalar;
        Ok(())
    }

    pub fn mode(&self) -> TrackingMode {
        self.config.mode
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn camera(&self) -> &DetectorCamera {
        &self.camera
    }

    pub fn buffer(&self) -> &MarkerBuffer {
        &self.buffer
    }

    pub fn stats(&self) -> SessionStats {
        self.stats
    }
}
