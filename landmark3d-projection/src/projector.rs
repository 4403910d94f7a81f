//! The landmark projector capability shared by both tracking variants

use landmark3d_core::{DetectorFrame, MarkerBuffer, Result};

use crate::camera::DetectorCamera;
use crate::config::ProjectionConfig;

/// What a projector did with one detector frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectionOutcome {
    /// `count` marker transforms were written and activated
    Drawn { count: usize },
    /// No subject; the active count was set to zero
    Cleared,
    /// No subject; buffer and projector state were left untouched
    Skipped,
}

/// Turns a detector frame into marker transforms.
///
/// Implementations run synchronously once per new detector result and own
/// whatever state they carry between frames.
pub trait LandmarkProjector {
    /// Short name used in logs
    fn name(&self) -> &'static str;

    /// Project `frame` through `camera` into `buffer`
    fn project(
        &mut self,
        frame: &DetectorFrame,
        camera: &DetectorCamera,
        config: &ProjectionConfig,
        buffer: &mut MarkerBuffer,
    ) -> Result<ProjectionOutcome>;

    /// Drop any state carried between frames
    fn reset(&mut self) {}
}
