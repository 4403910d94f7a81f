//! Constant-speed pursuit smoothing
//!
//! Each filtered point moves toward its target by at most `step` per update.
//! Unlike an exponential smoother it never overshoots and lands exactly on a
//! target that stays put.

use landmark3d_core::Point3f;

/// Persistent per-index filtered points
#[derive(Debug, Clone)]
pub struct PursuitFilter {
    step: f32,
    points: Vec<Point3f>,
}

impl PursuitFilter {
    pub fn new(step: f32) -> Self {
        Self {
            step,
            points: Vec::new(),
        }
    }

    /// Filtered points seen so far, including indices not updated last frame
    pub fn points(&self) -> &[Point3f] {
        &self.points
    }

    pub fn reset(&mut self) {
        self.points.clear();
    }

    /// Advance every filtered point toward its target and return the first
    /// `targets.len()` of them. Indices without history start on their target.
    pub fn update(&mut self, targets: &[Point3f]) -> &[Point3f] {
        for (index, target) in targets.iter().enumerate() {
            match self.points.get_mut(index) {
                Some(point) => *point = pursue(point, target, self.step),
                None => self.points.push(*target),
            }
        }
        &self.points[..targets.len()]
    }
}

/// Move `current` toward `target` by at most `step`
pub fn pursue(current: &Point3f, target: &Point3f, step: f32) -> Point3f {
    let delta = target - current;
    let distance = delta.norm();
    if distance <= step {
        return *target;
    }
    current + delta * (step / distance)
}
