//! Skeleton-to-ray alignment
//!
//! Solves for a single translation that moves the detector's 3D skeleton
//! onto the viewing rays through its 2D landmarks. Each iteration projects
//! the offset skeleton onto the rays and shifts the offset by the difference
//! of the two centroids. The iteration count is fixed; there is no
//! convergence test. The offset persists between frames so every frame
//! starts from the previous solution.

use landmark3d_core::{Error, Point3f, PointSet, Result, Vector3f};

use crate::config::StepPolicy;

/// Result of one frame's alignment
#[derive(Debug, Clone)]
pub struct AlignmentReport {
    /// Closest point on each ray to its offset skeleton point, from the last iteration
    pub projected: Vec<Point3f>,
    /// Offset after the final update
    pub offset: Vector3f,
    /// Summed point-to-ray distance of the first iteration
    pub initial_cost: f32,
    /// Summed point-to-ray distance of the last iteration
    pub final_cost: f32,
    /// Number of iterations performed
    pub iterations: usize,
    /// Step multiplier used by the last update
    pub step: f32,
}

/// Warm-started translation solver
#[derive(Debug, Clone)]
pub struct AlignmentSolver {
    offset: Vector3f,
    iterations: usize,
    step_policy: StepPolicy,
}

impl AlignmentSolver {
    pub fn new(iterations: usize, step_policy: StepPolicy) -> Self {
        Self {
            offset: Vector3f::zeros(),
            iterations,
            step_policy,
        }
    }

    /// Current alignment offset
    pub fn offset(&self) -> Vector3f {
        self.offset
    }

    /// Forget the previous solution
    pub fn reset(&mut self) {
        self.offset = Vector3f::zeros();
    }

    /// Align `skeleton` to `rays` (directions through the origin), index by index
    pub fn align(&mut self, skeleton: &[Point3f], rays: &[Vector3f]) -> Result<AlignmentReport> {
        if skeleton.is_empty() {
            return Err(Error::InvalidData("Skeleton is empty".to_string()));
        }
        if skeleton.len() != rays.len() {
            return Err(Error::InvalidData(format!(
                "Skeleton has {} points but {} rays were given",
                skeleton.len(),
                rays.len()
            )));
        }
        if self.iterations == 0 {
            return Err(Error::InvalidData("Iterations must be positive".to_string()));
        }

        let mut candidates = vec![Point3f::origin(); skeleton.len()];
        let mut projected = vec![Point3f::origin(); skeleton.len()];
        let mut step = self.step_policy.initial();
        let mut previous_cost = None;
        let mut initial_cost = 0.0;
        let mut cost = 0.0;

        for iteration in 0..self.iterations {
            for ((candidate, point), (target, ray)) in candidates
                .iter_mut()
                .zip(skeleton)
                .zip(projected.iter_mut().zip(rays))
            {
                *candidate = point + self.offset;
                *target = project_onto_ray(candidate, ray);
            }

            cost = compute_cost(&candidates, &projected);
            if iteration == 0 {
                initial_cost = cost;
            }

            // Both sets are non-empty, so the centroids exist
            let (Some(world_centroid), Some(ray_centroid)) =
                (candidates.centroid(), projected.centroid())
            else {
                return Err(Error::InvalidData("Skeleton is empty".to_string()));
            };

            step = self.step_policy.next(step, previous_cost, cost);
            self.offset += (ray_centroid - world_centroid) * step;
            previous_cost = Some(cost);
        }

        Ok(AlignmentReport {
            projected,
            offset: self.offset,
            initial_cost,
            final_cost: cost,
            iterations: self.iterations,
            step,
        })
    }
}

/// Closest point to `point` on the line through the origin along `ray`
pub fn project_onto_ray(point: &Point3f, ray: &Vector3f) -> Point3f {
    let length_squared = ray.norm_squared();
    if length_squared == 0.0 {
        return Point3f::origin();
    }
    Point3f::from(ray * (point.coords.dot(ray) / length_squared))
}

/// Sum of distances between corresponding points
fn compute_cost(candidates: &[Point3f], projected: &[Point3f]) -> f32 {
    candidates
        .iter()
        .zip(projected)
        .map(|(candidate, target)| (target - candidate).norm())
        .sum()
}
