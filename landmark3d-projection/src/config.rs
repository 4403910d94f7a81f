//! Session configuration
//!
//! Every section deserializes with defaults so a partial TOML file (or none
//! at all) yields a working session.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::RangeInclusive;
use std::str::FromStr;

use landmark3d_core::{Error, Result};

/// Accepted webcam field of view, in degrees
pub const FOV_RANGE: RangeInclusive<f32> = 30.0..=100.0;

/// Accepted depth exaggeration factor
pub const DEPTH_SCALAR_RANGE: RangeInclusive<f32> = 0.05..=0.5;

/// Landmarks reported per face by the face mesh detector
pub const FACE_LANDMARK_COUNT: usize = 468;

/// Landmarks reported per body by the pose detector
pub const POSE_LANDMARK_COUNT: usize = 33;

/// Which projector drives the markers; fixed for the lifetime of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrackingMode {
    #[default]
    Face,
    Pose,
}

impl TrackingMode {
    /// Marker capacity needed for this mode's detector
    pub fn landmark_count(&self) -> usize {
        match self {
            TrackingMode::Face => FACE_LANDMARK_COUNT,
            TrackingMode::Pose => POSE_LANDMARK_COUNT,
        }
    }
}

impl fmt::Display for TrackingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TrackingMode::Face => write!(f, "face"),
            TrackingMode::Pose => write!(f, "pose"),
        }
    }
}

impl FromStr for TrackingMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "face" => Ok(TrackingMode::Face),
            "pose" | "body" => Ok(TrackingMode::Pose),
            other => Err(Error::InvalidConfig(format!("unknown tracking mode '{}'", other))),
        }
    }
}

/// User-tunable projection parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectionConfig {
    /// Webcam field of view in degrees
    pub fov: f32,
    /// Depth exaggeration applied to the detector's relative depth
    pub depth_scalar: f32,
}

impl Default for ProjectionConfig {
    fn default() -> Self {
        Self {
            fov: 60.0,
            depth_scalar: 0.2,
        }
    }
}

impl ProjectionConfig {
    pub fn validate(&self) -> Result<()> {
        validate_fov(self.fov)?;
        validate_depth_scalar(self.depth_scalar)
    }
}

pub(crate) fn validate_fov(fov: f32) -> Result<()> {
    if !FOV_RANGE.contains(&fov) {
        return Err(Error::InvalidConfig(format!(
            "fov must be within {:?} degrees, got {}",
            FOV_RANGE, fov
        )));
    }
    Ok(())
}

pub(crate) fn validate_depth_scalar(depth_scalar: f32) -> Result<()> {
    if !DEPTH_SCALAR_RANGE.contains(&depth_scalar) {
        return Err(Error::InvalidConfig(format!(
            "depth_scalar must be within {:?}, got {}",
            DEPTH_SCALAR_RANGE, depth_scalar
        )));
    }
    Ok(())
}

/// Pose of the detector camera in the scene
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub position: [f32; 3],
    pub target: [f32; 3],
    pub up: [f32; 3],
    pub aspect_ratio: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            position: [0.0, 0.1, 0.2],
            target: [0.0, 0.1, -0.8],
            up: [0.0, 1.0, 0.0],
            aspect_ratio: 1280.0 / 720.0,
            near: 0.1,
            far: 1.0,
        }
    }
}

/// Marker instance settings
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MarkerConfig {
    /// Uniform scale of every marker sphere
    pub scale: f32,
    /// Instance capacity; defaults to the tracking mode's landmark count
    pub capacity: Option<usize>,
}

impl Default for MarkerConfig {
    fn default() -> Self {
        Self {
            scale: 0.001,
            capacity: None,
        }
    }
}

/// How the alignment solver scales each offset update
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StepPolicy {
    /// Constant multiplier on every update
    Fixed { multiplier: f32 },
    /// Grow the multiplier while the cost falls, shrink it when the cost rises
    Adaptive {
        grow: f32,
        shrink: f32,
        min: f32,
        max: f32,
    },
}

impl Default for StepPolicy {
    fn default() -> Self {
        StepPolicy::Fixed { multiplier: 1.0 }
    }
}

impl StepPolicy {
    /// Multiplier used by the first iteration of a frame
    pub fn initial(&self) -> f32 {
        match *self {
            StepPolicy::Fixed { multiplier } => multiplier,
            StepPolicy::Adaptive { min, max, .. } => 1.0f32.clamp(min, max),
        }
    }

    /// Multiplier for the next update given the cost change
    pub fn next(&self, current: f32, previous_cost: Option<f32>, cost: f32) -> f32 {
        match *self {
            StepPolicy::Fixed { multiplier } => multiplier,
            StepPolicy::Adaptive { grow, shrink, min, max } => match previous_cost {
                None => current,
                Some(previous) if cost < previous => (current * grow).clamp(min, max),
                Some(_) => (current * shrink).clamp(min, max),
            },
        }
    }

    pub fn validate(&self) -> Result<()> {
        match *self {
            StepPolicy::Fixed { multiplier } => {
                if !(multiplier.is_finite() && multiplier > 0.0) {
                    return Err(Error::InvalidConfig(format!(
                        "fixed step multiplier must be positive, got {}",
                        multiplier
                    )));
                }
            }
            StepPolicy::Adaptive { grow, shrink, min, max } => {
                if !(grow >= 1.0 && shrink > 0.0 && shrink <= 1.0 && min > 0.0 && min <= max) {
                    return Err(Error::InvalidConfig(
                        "adaptive step needs grow >= 1, 0 < shrink <= 1, 0 < min <= max"
                            .to_string(),
                    ));
                }
            }
        }
        Ok(())
    }
}

/// Pose tracking parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PoseConfig {
    /// Multiplier applied to the detector's world landmarks
    pub skeleton_scale: f32,
    /// Alignment iterations run every frame
    pub iterations: usize,
    pub step_policy: StepPolicy,
    /// Maximum distance a filtered point moves per frame
    pub pursuit_step: f32,
    /// Clear the alignment state after this many consecutive frames without a subject
    pub reset_after_missed_frames: Option<u32>,
}

impl Default for PoseConfig {
    fn default() -> Self {
        Self {
            skeleton_scale: 1.0,
            iterations: 1000,
            step_policy: StepPolicy::default(),
            pursuit_step: 0.00125,
            reset_after_missed_frames: None,
        }
    }
}

impl PoseConfig {
    pub fn validate(&self) -> Result<()> {
        if self.iterations == 0 {
            return Err(Error::InvalidConfig("alignment iterations must be positive".to_string()));
        }
        if !(self.skeleton_scale.is_finite() && self.skeleton_scale > 0.0) {
            return Err(Error::InvalidConfig("skeleton_scale must be positive".to_string()));
        }
        if !(self.pursuit_step.is_finite() && self.pursuit_step > 0.0) {
            return Err(Error::InvalidConfig("pursuit_step must be positive".to_string()));
        }
        if self.reset_after_missed_frames == Some(0) {
            return Err(Error::InvalidConfig(
                "reset_after_missed_frames must be at least 1".to_string(),
            ));
        }
        self.step_policy.validate()
    }
}

/// Everything a tracking session is built from
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    pub mode: TrackingMode,
    pub projection: ProjectionConfig,
    pub camera: CameraConfig,
    pub markers: MarkerConfig,
    pub pose: PoseConfig,
}

impl SessionConfig {
    pub fn validate(&self) -> Result<()> {
        self.projection.validate()?;
        if !(self.markers.scale.is_finite() && self.markers.scale > 0.0) {
            return Err(Error::InvalidConfig("marker scale must be positive".to_string()));
        }
        self.pose.validate()
    }

    /// Marker capacity, falling back to the mode's landmark count
    pub fn marker_capacity(&self) -> usize {
        self.markers.capacity.unwrap_or_else(|| self.mode.landmark_count())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = SessionConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.mode, TrackingMode::Face);
        assert_eq!(config.projection.fov, 60.0);
        assert_eq!(config.projection.depth_scalar, 0.2);
        assert_eq!(config.marker_capacity(), FACE_LANDMARK_COUNT);
        assert_eq!(config.pose.iterations, 1000);
        assert_eq!(config.pose.step_policy, StepPolicy::Fixed { multiplier: 1.0 });
    }

    #[test]
    fn test_out_of_range_values_rejected() {
        let mut config = SessionConfig::default();
        config.projection.fov = 120.0;
        assert!(matches!(config.validate(), Err(Error::InvalidConfig(_))));

        let mut config = SessionConfig::default();
        config.projection.depth_scalar = 0.01;
        assert!(config.validate().is_err());

        let mut config = SessionConfig::default();
        config.pose.iterations = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_reset_threshold_must_be_positive() {
        let mut config = SessionConfig::default();
        config.pose.reset_after_missed_frames = Some(0);
        assert!(matches!(config.validate(), Err(Error::InvalidConfig(_))));

        config.pose.reset_after_missed_frames = Some(1);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_mode_parsing() {
        assert_eq!("face".parse::<TrackingMode>().unwrap(), TrackingMode::Face);
        assert_eq!("Pose".parse::<TrackingMode>().unwrap(), TrackingMode::Pose);
        assert_eq!("body".parse::<TrackingMode>().unwrap(), TrackingMode::Pose);
        assert!("hands".parse::<TrackingMode>().is_err());
        assert_eq!(TrackingMode::Pose.to_string(), "pose");
    }

    #[test]
    fn test_pose_capacity_default() {
        let config = SessionConfig {
            mode: TrackingMode::Pose,
            ..Default::default()
        };
        assert_eq!(config.marker_capacity(), POSE_LANDMARK_COUNT);
    }

    #[test]
    fn test_fixed_step_ignores_cost() {
        let policy = StepPolicy::default();
        assert_eq!(policy.initial(), 1.0);
        assert_eq!(policy.next(1.0, Some(1.0), 5.0), 1.0);
        assert_eq!(policy.next(1.0, Some(5.0), 1.0), 1.0);
    }

    #[test]
    fn test_adaptive_step_follows_cost() {
        let policy = StepPolicy::Adaptive { grow: 1.5, shrink: 0.5, min: 0.25, max: 2.0 };
        assert_eq!(policy.initial(), 1.0);
        assert_eq!(policy.next(1.0, None, 3.0), 1.0);
        assert_eq!(policy.next(1.0, Some(3.0), 2.0), 1.5);
        assert_eq!(policy.next(1.5, Some(2.0), 2.5), 0.75);
        assert_eq!(policy.next(1.5, Some(2.0), 1.0), 2.0);
        assert_eq!(policy.next(0.3, Some(1.0), 2.0), 0.25);
    }

    #[test]
    fn test_invalid_adaptive_policy() {
        let policy = StepPolicy::Adaptive { grow: 0.5, shrink: 0.5, min: 0.1, max: 1.0 };
        assert!(policy.validate().is_err());
    }
}
