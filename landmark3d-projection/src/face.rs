//! Scale-normalized face landmark projection
//!
//! Landmarks are unprojected onto the camera's near plane, pushed along the
//! view axis by their relative depth, and then rescaled so the summed spread
//! of the point cloud is independent of how far the face is from the webcam.
//! The result is a fixed-size point cloud that moves with the face.

use tracing::debug;

use landmark3d_core::{
    DetectorFrame, Landmark, LandmarkSet, MarkerBuffer, Point3f, PointSet, Result, Transform3D,
};

use crate::camera::DetectorCamera;
use crate::config::ProjectionConfig;
use crate::projector::{LandmarkProjector, ProjectionOutcome};

/// Projector for the face tracking variant. Holds no per-frame state.
#[derive(Debug, Clone)]
pub struct FaceProjector {
    marker_scale: f32,
}

impl FaceProjector {
    pub fn new(marker_scale: f32) -> Self {
        Self { marker_scale }
    }
}

/// Compute world positions for a face's landmarks.
///
/// Pure function of the landmarks, the camera and `depth_scalar`. An empty
/// set yields no positions. A set whose depth-adjusted points all coincide
/// has zero spread and produces non-finite positions.
pub fn face_positions(
    landmarks: &LandmarkSet<Landmark>,
    camera: &DetectorCamera,
    depth_scalar: f32,
) -> Vec<Point3f> {
    let rays: Vec<Point3f> = landmarks
        .iter()
        .map(|landmark| camera.unproject_local(&DetectorCamera::ndc(landmark.x, landmark.y)))
        .collect();

    let adjusted: Vec<Point3f> = rays
        .iter()
        .zip(landmarks)
        .map(|(ray, landmark)| depth_adjusted(ray, landmark.depth(), depth_scalar))
        .collect();

    let Some(centroid) = adjusted.centroid() else {
        return Vec::new();
    };
    let scale = adjusted.summed_distance_from(&centroid);
    if !(scale.is_finite() && scale > 0.0) {
        debug!(
            scale,
            count = adjusted.len(),
            "degenerate face landmarks, marker positions will not be finite"
        );
    }

    let normalizer = 1.0 / (scale * depth_scalar);
    rays.iter()
        .zip(&adjusted)
        .map(|(ray, point)| {
            // Rescale the ray so its depth matches the normalized depth
            let z = point.z * normalizer;
            camera.to_world(&(*ray / (ray.z / z)))
        })
        .collect()
}

/// Push a local near-plane point along the view axis by the landmark depth
fn depth_adjusted(point: &Point3f, depth: f32, depth_scalar: f32) -> Point3f {
    Point3f::new(point.x, point.y, point.z - depth * depth_scalar)
}

impl LandmarkProjector for FaceProjector {
    fn name(&self) -> &'static str {
        "face"
    }

    fn project(
        &mut self,
        frame: &DetectorFrame,
        camera: &DetectorCamera,
        config: &ProjectionConfig,
        buffer: &mut MarkerBuffer,
    ) -> Result<ProjectionOutcome> {
        let Some(landmarks) = frame.primary_landmarks() else {
            buffer.set_count(0)?;
            return Ok(ProjectionOutcome::Cleared);
        };
        buffer.ensure_capacity(landmarks.len())?;

        let positions = face_positions(landmarks, camera, config.depth_scalar);
        for (index, position) in positions.iter().enumerate() {
            buffer.set_transform_at(index, Transform3D::marker(position, self.marker_scale))?;
        }
        buffer.set_count(positions.len())?;

        Ok(ProjectionOutcome::Drawn { count: positions.len() })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use landmark3d_core::Error;

    fn square(center: (f32, f32), half_extent: f32, depth: f32) -> LandmarkSet<Landmark> {
        let (cx, cy) = center;
        LandmarkSet::from_landmarks(vec![
            Landmark::with_depth(cx - half_extent, cy - half_extent, depth),
            Landmark::with_depth(cx + half_extent, cy - half_extent, depth),
            Landmark::with_depth(cx - half_extent, cy + half_extent, depth),
            Landmark::with_depth(cx + half_extent, cy + half_extent, depth),
        ])
    }

    fn frame_with(landmarks: LandmarkSet<Landmark>) -> DetectorFrame {
        DetectorFrame {
            timestamp_ms: 0.0,
            landmarks: Some(landmarks),
            world_landmarks: None,
        }
    }

    #[test]
    fn test_square_stays_centered_on_view_axis() {
        let camera = DetectorCamera::default();
        let positions = face_positions(&square((0.5, 0.5), 0.1, 0.0), &camera, 0.2);
        assert_eq!(positions.len(), 4);

        let centroid = positions.centroid().unwrap();
        let offset = centroid - camera.position;
        let along = offset.dot(&camera.view_direction());
        assert!(along > 0.0);
        assert_relative_eq!(offset, camera.view_direction() * along, epsilon = 1e-4);

        // Symmetric about the centroid
        assert_relative_eq!(positions[0] - centroid, -(positions[3] - centroid), epsilon = 1e-4);
        assert_relative_eq!(positions[1] - centroid, -(positions[2] - centroid), epsilon = 1e-4);
        // Left and right columns mirror each other, top row is above the bottom row
        assert_relative_eq!(positions[0].x, -positions[1].x, epsilon = 1e-4);
        assert!(positions[0].y > positions[2].y);
    }

    #[test]
    fn test_spread_is_independent_of_subject_size() {
        let camera = DetectorCamera::default();
        let depth_scalar = 0.2;

        let near = face_positions(&square((0.5, 0.5), 0.2, 0.0), &camera, depth_scalar);
        let far = face_positions(&square((0.5, 0.5), 0.1, 0.0), &camera, depth_scalar);

        let spread = |points: &[Point3f]| points.summed_distance_from(&points.centroid().unwrap());
        assert_relative_eq!(spread(&near[..]), 1.0 / depth_scalar, epsilon = 1e-3);
        assert_relative_eq!(spread(&far[..]), spread(&near[..]), epsilon = 1e-3);

        // The smaller face lands further from the camera
        let distance = |points: &[Point3f]| (points.centroid().unwrap() - camera.position).norm();
        assert!(distance(&far[..]) > distance(&near[..]));
    }

    #[test]
    fn test_depth_hint_changes_marker_depth() {
        let camera = DetectorCamera::default();
        let mut landmarks = square((0.5, 0.5), 0.1, 0.0).landmarks;
        landmarks[0].z = Some(-0.05);
        let positions = face_positions(&LandmarkSet::from_landmarks(landmarks), &camera, 0.2);
        let flat = face_positions(&square((0.5, 0.5), 0.1, 0.0), &camera, 0.2);
        assert!((positions[0].z - flat[0].z).abs() > 1e-4);
    }

    #[test]
    fn test_identical_frames_give_identical_markers() {
        let camera = DetectorCamera::default();
        let config = ProjectionConfig::default();
        let frame = frame_with(square((0.45, 0.55), 0.08, 0.01));
        let mut projector = FaceProjector::new(0.001);

        let mut first = MarkerBuffer::with_capacity(8);
        let mut second = MarkerBuffer::with_capacity(8);
        projector.project(&frame, &camera, &config, &mut first).unwrap();
        projector.project(&frame, &camera, &config, &mut second).unwrap();

        assert_eq!(first.active(), second.active());
    }

    #[test]
    fn test_project_writes_markers() {
        let camera = DetectorCamera::default();
        let mut buffer = MarkerBuffer::with_capacity(468);
        let mut projector = FaceProjector::new(0.001);

        let outcome = projector
            .project(
                &frame_with(square((0.5, 0.5), 0.1, 0.0)),
                &camera,
                &ProjectionConfig::default(),
                &mut buffer,
            )
            .unwrap();

        assert_eq!(outcome, ProjectionOutcome::Drawn { count: 4 });
        assert_eq!(buffer.count(), 4);
        for transform in buffer.active() {
            assert!(transform.is_finite());
            assert_relative_eq!(transform.matrix[(1, 1)], 0.001);
        }
    }

    #[test]
    fn test_missing_face_clears_count() {
        let camera = DetectorCamera::default();
        let config = ProjectionConfig::default();
        let mut buffer = MarkerBuffer::with_capacity(468);
        let mut projector = FaceProjector::new(0.001);

        projector
            .project(&frame_with(square((0.5, 0.5), 0.1, 0.0)), &camera, &config, &mut buffer)
            .unwrap();
        let outcome = projector
            .project(&DetectorFrame::empty(1.0), &camera, &config, &mut buffer)
            .unwrap();
        assert_eq!(outcome, ProjectionOutcome::Cleared);
        assert_eq!(buffer.count(), 0);

        projector.project(&frame_with(LandmarkSet::new()), &camera, &config, &mut buffer).unwrap();
        assert_eq!(buffer.count(), 0);
    }

    #[test]
    fn test_single_landmark_is_not_finite() {
        let camera = DetectorCamera::default();
        let landmarks = LandmarkSet::from_landmarks(vec![Landmark::new(0.3, 0.3)]);
        let positions = face_positions(&landmarks, &camera, 0.2);
        assert_eq!(positions.len(), 1);
        assert!(!positions[0].coords.iter().all(|v| v.is_finite()));
    }

    #[test]
    fn test_too_many_landmarks_rejected_before_writing() {
        let camera = DetectorCamera::default();
        let mut buffer = MarkerBuffer::with_capacity(2);
        let mut projector = FaceProjector::new(0.001);
        let result = projector.project(
            &frame_with(square((0.5, 0.5), 0.1, 0.0)),
            &camera,
            &ProjectionConfig::default(),
            &mut buffer,
        );
        assert_eq!(result, Err(Error::CapacityExceeded { required: 4, capacity: 2 }));
        assert_eq!(buffer.count(), 0);
        assert_eq!(buffer.transform_at(0), Some(&Transform3D::identity()));
    }
}
