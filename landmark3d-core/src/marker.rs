//! Instanced marker buffer
//!
//! Mirrors the per-instance transform array of an instanced mesh: a fixed
//! capacity of transforms plus an active count that gates how many of them
//! are drawn. Transforms past the active count are stale and ignored.

use bytemuck::{Pod, Zeroable};

use crate::error::{Error, Result};
use crate::point::Point3f;
use crate::transform::Transform3D;

/// GPU-facing layout of one marker instance
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct MarkerInstance {
    pub model: [[f32; 4]; 4],
}

impl From<&Transform3D> for MarkerInstance {
    fn from(transform: &Transform3D) -> Self {
        Self {
            model: transform.to_cols_array(),
        }
    }
}

/// Per-instance transforms and the active instance count
#[derive(Debug, Clone)]
pub struct MarkerBuffer {
    transforms: Vec<Transform3D>,
    count: usize,
}

impl MarkerBuffer {
    /// Create a buffer holding up to `capacity` markers, none active
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            transforms: vec![Transform3D::identity(); capacity],
            count: 0,
        }
    }

    pub fn capacity(&self) -> usize {
        self.transforms.len()
    }

    /// Number of instances currently drawn
    pub fn count(&self) -> usize {
        self.count
    }

    /// Set the number of instances to draw
    pub fn set_count(&mut self, count: usize) -> Result<()> {
        self.ensure_capacity(count)?;
        self.count = count;
        Ok(())
    }

    /// Write the transform of instance `index`
    pub fn set_transform_at(&mut self, index: usize, transform: Transform3D) -> Result<()> {
        let capacity = self.capacity();
        let slot = self
            .transforms
            .get_mut(index)
            .ok_or(Error::CapacityExceeded { required: index + 1, capacity })?;
        *slot = transform;
        Ok(())
    }

    pub fn transform_at(&self, index: usize) -> Option<&Transform3D> {
        self.transforms.get(index)
    }

    /// Fail before any write when `required` instances do not fit
    pub fn ensure_capacity(&self, required: usize) -> Result<()> {
        if required > self.capacity() {
            return Err(Error::CapacityExceeded {
                required,
                capacity: self.capacity(),
            });
        }
        Ok(())
    }

    /// Transforms of the active instances
    pub fn active(&self) -> &[Transform3D] {
        &self.transforms[..self.count]
    }

    /// Marker centers of the active instances
    pub fn active_positions(&self) -> Vec<Point3f> {
        self.active().iter().map(Transform3D::position).collect()
    }

    /// Instance data for the active markers, ready for upload
    pub fn instance_data(&self) -> Vec<MarkerInstance> {
        self.active().iter().map(MarkerInstance::from).collect()
    }
}

/// Raw bytes of instance data for a vertex buffer
pub fn instance_bytes(instances: &[MarkerInstance]) -> &[u8] {
    bytemuck::cast_slice(instances)
}
