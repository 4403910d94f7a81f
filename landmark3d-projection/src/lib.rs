//! # landmark3d Projection
//!
//! Turns per-frame landmark detector output into 3D marker transforms.
//!
//! Two projectors implement [`LandmarkProjector`]:
//! - [`FaceProjector`]: unprojects face landmarks and normalizes their spread
//!   so the point cloud keeps a fixed size at any subject distance.
//! - [`PoseProjector`]: aligns the detector's 3D skeleton with the camera
//!   rays through its 2D landmarks and smooths the result over time.
//!
//! A [`TrackingSession`] picks one of them at startup and feeds it frames.

pub mod alignment;
pub mod camera;
pub mod config;
pub mod face;
pub mod filter;
pub mod frame_guard;
pub mod pose;
pub mod projector;
pub mod session;

// Re-export commonly used items
pub use alignment::*;
pub use camera::*;
pub use config::*;
pub use face::*;
pub use filter::*;
pub use frame_guard::*;
pub use pose::*;
pub use projector::*;
pub use session::*;
