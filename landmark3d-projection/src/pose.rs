//! Body pose projection
//!
//! The pose detector reports every landmark twice: as normalized image
//! coordinates and as a point of its own metric skeleton. The skeleton is
//! translated onto the camera rays through the image coordinates by an
//! [`AlignmentSolver`], and the aligned points are smoothed by a
//! [`PursuitFilter`] before they are written out as markers.

use tracing::{debug, info};

use landmark3d_core::{
    DetectorFrame, Error, Landmark, LandmarkSet, MarkerBuffer, Point3f, Result, Transform3D,
    Vector3f, WorldLandmark,
};

use crate::alignment::{AlignmentReport, AlignmentSolver};
use crate::camera::DetectorCamera;
use crate::config::{PoseConfig, ProjectionConfig};
use crate::filter::PursuitFilter;
use crate::projector::{LandmarkProjector, ProjectionOutcome};

/// Projector for the pose tracking variant.
///
/// Owns the alignment offset and filtered points for the whole tracking
/// session. Both survive frames without a subject unless a reset threshold
/// is configured.
#[derive(Debug, Clone)]
pub struct PoseProjector {
    solver: AlignmentSolver,
    filter: PursuitFilter,
    skeleton_scale: f32,
    marker_scale: f32,
    reset_after_missed_frames: Option<u32>,
    missed_frames: u32,
    last_report: Option<AlignmentReport>,
}

impl PoseProjector {
    pub fn new(config: &PoseConfig, marker_scale: f32) -> Self {
        Self {
            solver: AlignmentSolver::new(config.iterations, config.step_policy),
            filter: PursuitFilter::new(config.pursuit_step),
            skeleton_scale: config.skeleton_scale,
            marker_scale,
            reset_after_missed_frames: config.reset_after_missed_frames,
            missed_frames: 0,
            last_report: None,
        }
    }

    /// Current alignment offset, in the camera's local frame
    pub fn offset(&self) -> Vector3f {
        self.solver.offset()
    }

    /// Filtered points, in the camera's local frame
    pub fn filtered_points(&self) -> &[Point3f] {
        self.filter.points()
    }

    /// Report of the most recent alignment
    pub fn last_report(&self) -> Option<&AlignmentReport> {
        self.last_report.as_ref()
    }

    /// Consecutive frames without a subject, counted only while a reset
    /// threshold is configured
    pub fn missed_frames(&self) -> u32 {
        self.missed_frames
    }

    fn skeleton_point(&self, landmark: &WorldLandmark) -> Point3f {
        // Detector skeletons have +Y down and +Z away from the camera
        let s = self.skeleton_scale;
        Point3f::new(landmark.x * s, -landmark.y * s, -landmark.z * s)
    }

    fn record_miss(&mut self) {
        let Some(limit) = self.reset_after_missed_frames else {
            return;
        };
        self.missed_frames = self.missed_frames.saturating_add(1);
        if self.missed_frames == limit.max(1) {
            info!(missed_frames = self.missed_frames, "subject lost, resetting pose alignment");
            self.reset();
        }
    }
}

/// Unit view-ray directions, in the camera's local frame, through each landmark
pub fn landmark_rays(landmarks: &LandmarkSet<Landmark>, camera: &DetectorCamera) -> Vec<Vector3f> {
    landmarks
        .iter()
        .map(|landmark| {
            camera
                .unproject_local(&DetectorCamera::ndc(landmark.x, landmark.y))
                .coords
                .normalize()
        })
        .collect()
}

impl LandmarkProjector for PoseProjector {
    fn name(&self) -> &'static str {
        "pose"
    }

    fn project(
        &mut self,
        frame: &DetectorFrame,
        camera: &DetectorCamera,
        _config: &ProjectionConfig,
        buffer: &mut MarkerBuffer,
    ) -> Result<ProjectionOutcome> {
        let (Some(landmarks), Some(world)) =
            (frame.primary_landmarks(), frame.primary_world_landmarks())
        else {
            self.record_miss();
            return Ok(ProjectionOutcome::Skipped);
        };
        if landmarks.len() != world.len() {
            return Err(Error::InvalidData(format!(
                "pose frame has {} landmarks but {} world landmarks",
                landmarks.len(),
                world.len()
            )));
        }
        buffer.ensure_capacity(landmarks.len())?;
        self.missed_frames = 0;

        let rays = landmark_rays(landmarks, camera);
        let skeleton: Vec<Point3f> = world.iter().map(|w| self.skeleton_point(w)).collect();
        let report = self.solver.align(&skeleton, &rays)?;
        debug!(
            initial_cost = report.initial_cost,
            final_cost = report.final_cost,
            offset = ?report.offset,
            "pose alignment"
        );

        let filtered = self.filter.update(&report.projected);
        for (index, point) in filtered.iter().enumerate() {
            let position = camera.to_world(point);
            buffer.set_transform_at(index, Transform3D::marker(&position, self.marker_scale))?;
        }
        let count = filtered.len();
        buffer.set_count(count)?;
        self.last_report = Some(report);

        Ok(ProjectionOutcome::Drawn { count })
    }

    fn reset(&mut self) {
        self.solver.reset();
        self.filter.reset();
        self.last_report = None;
    }
}
