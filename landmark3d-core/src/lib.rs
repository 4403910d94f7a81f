//! Core data structures and traits for landmark3d
//!
//! This crate provides the types shared by the landmark projectors and the
//! application layer: detector landmarks, point aliases, instance transforms,
//! the marker buffer and essential traits.

pub mod point;
pub mod landmark;
pub mod marker;
pub mod traits;
pub mod transform;
pub mod error;

pub use point::*;
pub use landmark::*;
pub use marker::*;
pub use traits::*;
pub use transform::*;
pub use error::*;

/// Re-export commonly used types from nalgebra
pub use nalgebra::{Point3, Vector3, Matrix4};
