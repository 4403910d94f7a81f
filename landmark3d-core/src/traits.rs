//! Core traits for landmark3d

use crate::point::Point3f;

/// Summary statistics over a set of 3D points
pub trait PointSet {
    /// Arithmetic mean position, `None` for an empty set
    fn centroid(&self) -> Option<Point3f>;

    /// Sum (not mean) of Euclidean distances from `center`
    fn summed_distance_from(&self, center: &Point3f) -> f32;
}

impl PointSet for [Point3f] {
    fn centroid(&self) -> Option<Point3f> {
        if self.is_empty() {
            return None;
        }
        let sum = self.iter().fold(Point3f::origin(), |acc, p| acc + p.coords);
        Some(sum / self.len() as f32)
    }

    fn summed_distance_from(&self, center: &Point3f) -> f32 {
        self.iter().map(|p| (center - p).norm()).sum()
    }
}
