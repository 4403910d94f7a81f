//! Detector landmark types
//!
//! Landmarks arrive fresh from the external detector every frame. Index `i`
//! of a [`LandmarkSet`] always refers to the same anatomical point for a
//! given detector configuration; the pose projector relies on that to carry
//! per-index state between frames.

use serde::{Deserialize, Serialize};
use std::ops::Index;

use crate::point::Point3f;

/// A detector keypoint in normalized image space.
///
/// `x` and `y` are in `[0, 1]` with the origin at the top-left of the frame.
/// `z` is the detector's relative depth hint, if it reports one.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Landmark {
    pub x: f32,
    pub y: f32,
    #[serde(default)]
    pub z: Option<f32>,
    #[serde(default)]
    pub visibility: Option<f32>,
}

impl Landmark {
    /// Create a landmark without a depth hint
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y, z: None, visibility: None }
    }

    /// Create a landmark carrying a relative depth hint
    pub fn with_depth(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z: Some(z), visibility: None }
    }

    /// Relative depth, treating a missing hint as zero
    pub fn depth(&self) -> f32 {
        self.z.unwrap_or(0.0)
    }
}

/// A keypoint of the detector's own 3D skeleton estimate.
///
/// Units and axes are detector-defined (MediaPipe Pose reports meters with
/// +Y pointing down and +Z pointing away from the camera).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WorldLandmark {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    #[serde(default)]
    pub visibility: Option<f32>,
}

impl WorldLandmark {
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z, visibility: None }
    }

    pub fn to_point(&self) -> Point3f {
        Point3f::new(self.x, self.y, self.z)
    }
}

/// Ordered landmarks for one detected subject in one frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LandmarkSet<T> {
    pub landmarks: Vec<T>,
}

impl<T> LandmarkSet<T> {
    /// Create an empty landmark set
    pub fn new() -> Self {
        Self { landmarks: Vec::new() }
    }

    /// Create a landmark set from a vector of landmarks
    pub fn from_landmarks(landmarks: Vec<T>) -> Self {
        Self { landmarks }
    }

    /// Get the number of landmarks in the set
    pub fn len(&self) -> usize {
        self.landmarks.len()
    }

    /// Check if the set is empty
    pub fn is_empty(&self) -> bool {
        self.landmarks.is_empty()
    }

    /// Get an iterator over the landmarks
    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.landmarks.iter()
    }
}

impl<T> Default for LandmarkSet<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Index<usize> for LandmarkSet<T> {
    type Output = T;

    fn index(&self, index: usize) -> &Self::Output {
        &self.landmarks[index]
    }
}

impl<'a, T> IntoIterator for &'a LandmarkSet<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.landmarks.iter()
    }
}

impl<T> FromIterator<T> for LandmarkSet<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self {
            landmarks: Vec::from_iter(iter),
        }
    }
}

/// Everything the detector reported for one video frame.
///
/// Either list is `None` when the detector found no subject. The face
/// detector only fills `landmarks`; the pose detector fills both lists,
/// index-aligned.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DetectorFrame {
    /// Video timestamp the detection was run on
    pub timestamp_ms: f64,
    #[serde(default)]
    pub landmarks: Option<LandmarkSet<Landmark>>,
    #[serde(default)]
    pub world_landmarks: Option<LandmarkSet<WorldLandmark>>,
}

impl DetectorFrame {
    /// A frame in which the detector found nobody
    pub fn empty(timestamp_ms: f64) -> Self {
        Self {
            timestamp_ms,
            landmarks: None,
            world_landmarks: None,
        }
    }

    /// Landmarks of the primary subject, treating an empty list as absent
    pub fn primary_landmarks(&self) -> Option<&LandmarkSet<Landmark>> {
        self.landmarks.as_ref().filter(|set| !set.is_empty())
    }

    /// World landmarks of the primary subject, treating an empty list as absent
    pub fn primary_world_landmarks(&self) -> Option<&LandmarkSet<WorldLandmark>> {
        self.world_landmarks.as_ref().filter(|set| !set.is_empty())
    }
}
