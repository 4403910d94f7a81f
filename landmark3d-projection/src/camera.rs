//! Detector-facing virtual camera
//!
//! The camera models the webcam that produced the landmarks. Both projectors
//! unproject normalized image coordinates through it and work in its local
//! frame (eye at the origin, looking down -Z), then map results back to world
//! space with [`DetectorCamera::to_world`].

use nalgebra::{Isometry3, Perspective3, Point3, Vector3};

use landmark3d_core::{Error, Point3f, Result};

use crate::config::CameraConfig;

/// A perspective camera with a fixed pose and a tunable field of view
#[derive(Debug, Clone)]
pub struct DetectorCamera {
    pub position: Point3<f32>,
    pub target: Point3<f32>,
    pub up: Vector3<f32>,
    /// Vertical field of view in degrees
    pub fov: f32,
    pub aspect_ratio: f32,
    pub near: f32,
    pub far: f32,
}

impl DetectorCamera {
    /// Create a new camera
    pub fn new(
        position: Point3<f32>,
        target: Point3<f32>,
        up: Vector3<f32>,
        fov: f32,
        aspect_ratio: f32,
        near: f32,
        far: f32,
    ) -> Result<Self> {
        let camera = Self {
            position,
            target,
            up,
            fov,
            aspect_ratio,
            near,
            far,
        };
        camera.validate()?;
        Ok(camera)
    }

    /// Build the camera described by `config` with the given field of view
    pub fn from_config(config: &CameraConfig, fov: f32) -> Result<Self> {
        Self::new(
            Point3::from(config.position),
            Point3::from(config.target),
            Vector3::from(config.up),
            fov,
            config.aspect_ratio,
            config.near,
            config.far,
        )
    }

    fn validate(&self) -> Result<()> {
        if !(self.fov > 0.0 && self.fov < 180.0) {
            return Err(Error::InvalidConfig(format!(
                "camera fov must be in (0, 180) degrees, got {}",
                self.fov
            )));
        }
        if !(self.aspect_ratio > 0.0) {
            return Err(Error::InvalidConfig("camera aspect ratio must be positive".to_string()));
        }
        if !(self.near > 0.0 && self.far > self.near) {
            return Err(Error::InvalidConfig(format!(
                "camera clip planes must satisfy 0 < near < far, got near={} far={}",
                self.near, self.far
            )));
        }
        let forward = self.target - self.position;
        if forward.norm() == 0.0 || forward.cross(&self.up).norm() == 0.0 {
            return Err(Error::InvalidConfig(
                "camera target and up vector are degenerate".to_string(),
            ));
        }
        Ok(())
    }

    /// Update the field of view (degrees) used for the next unprojection
    pub fn set_fov(&mut self, fov: f32) {
        self.fov = fov;
    }

    /// Camera-from-world rigid transform
    pub fn view_isometry(&self) -> Isometry3<f32> {
        Isometry3::look_at_rh(&self.position, &self.target, &self.up)
    }

    /// World-from-camera rigid transform
    pub fn world_isometry(&self) -> Isometry3<f32> {
        self.view_isometry().inverse()
    }

    fn perspective(&self) -> Perspective3<f32> {
        Perspective3::new(self.aspect_ratio, self.fov.to_radians(), self.near, self.far)
    }

    /// Unit forward vector in world space
    pub fn view_direction(&self) -> Vector3<f32> {
        (self.target - self.position).normalize()
    }

    /// Near-plane NDC point for normalized image coordinates
    pub fn ndc(u: f32, v: f32) -> Point3f {
        Point3f::new(u * 2.0 - 1.0, v * -2.0 + 1.0, -1.0)
    }

    /// Unproject an NDC point into the camera's local frame
    pub fn unproject_local(&self, ndc: &Point3f) -> Point3f {
        self.perspective().unproject_point(ndc)
    }

    /// Unproject an NDC point into world space
    pub fn unproject(&self, ndc: &Point3f) -> Point3f {
        self.to_world(&self.unproject_local(ndc))
    }

    /// Map a point from the camera's local frame to world space
    pub fn to_world(&self, local: &Point3f) -> Point3f {
        self.world_isometry() * local
    }

    /// Normalized image coordinates of a point in the camera's local frame
    pub fn local_to_uv(&self, local: &Point3f) -> (f32, f32) {
        let ndc = self.perspective().project_point(local);
        ((ndc.x + 1.0) / 2.0, (1.0 - ndc.y) / 2.0)
    }
}

impl Default for DetectorCamera {
    fn default() -> Self {
        Self {
            position: Point3::new(0.0, 0.1, 0.2),
            target: Point3::new(0.0, 0.1, -0.8),
            up: Vector3::new(0.0, 1.0, 0.0),
            fov: 60.0,
            aspect_ratio: 1280.0 / 720.0,
            near: 0.1,
            far: 1.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_ndc_mapping() {
        assert_relative_eq!(DetectorCamera::ndc(0.5, 0.5), Point3f::new(0.0, 0.0, -1.0));
        assert_relative_eq!(DetectorCamera::ndc(0.0, 0.0), Point3f::new(-1.0, 1.0, -1.0));
        assert_relative_eq!(DetectorCamera::ndc(1.0, 1.0), Point3f::new(1.0, -1.0, -1.0));
    }

    #[test]
    fn test_center_unprojects_onto_near_plane() {
        let camera = DetectorCamera::default();
        let local = camera.unproject_local(&DetectorCamera::ndc(0.5, 0.5));
        assert_relative_eq!(local, Point3f::new(0.0, 0.0, -camera.near), epsilon = 1e-6);

        let world = camera.unproject(&DetectorCamera::ndc(0.5, 0.5));
        let expected = camera.position + camera.view_direction() * camera.near;
        assert_relative_eq!(world, expected, epsilon = 1e-6);
    }

    #[test]
    fn test_near_plane_extent_follows_fov() {
        let mut camera = DetectorCamera::default();
        camera.set_fov(90.0);
        // Top edge of the image sits at y = near * tan(fov / 2)
        let top = camera.unproject_local(&DetectorCamera::ndc(0.5, 0.0));
        assert_relative_eq!(top.y, camera.near, epsilon = 1e-6);
        let right = camera.unproject_local(&DetectorCamera::ndc(1.0, 0.5));
        assert_relative_eq!(right.x, camera.near * camera.aspect_ratio, epsilon = 1e-6);
    }

    #[test]
    fn test_uv_round_trip() {
        let camera = DetectorCamera::default();
        let local = Point3f::new(0.05, -0.02, -0.5);
        let (u, v) = camera.local_to_uv(&local);
        let ray = camera.unproject_local(&DetectorCamera::ndc(u, v)).coords.normalize();
        assert_relative_eq!(ray, local.coords.normalize(), epsilon = 1e-5);
    }

    #[test]
    fn test_invalid_camera_rejected() {
        let result = DetectorCamera::new(
            Point3::origin(),
            Point3::new(0.0, 0.0, -1.0),
            Vector3::y(),
            60.0,
            1.0,
            1.0,
            0.5,
        );
        assert!(matches!(result, Err(Error::InvalidConfig(_))));
    }
}
