//! Error types for landmark3d

use thiserror::Error;

/// Main error type for landmark3d operations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("Invalid data: {0}")]
    InvalidData(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Marker buffer full: {required} instances requested, capacity is {capacity}")]
    CapacityExceeded { required: usize, capacity: usize },
}

/// Result type alias for landmark3d operations
pub type Result<T> = std::result::Result<T, Error>;
