//! Error types for the voxel world.

use thiserror::Error;

/// Crate-wide error type.
///
/// Pool exhaustion and lookup misses are not errors; they are reported
/// through [`ChunkId::NONE`](crate::ChunkId::NONE).
#[derive(Error, Debug)]
pub enum Error {
    /// Invalid configuration value
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Out of bounds access
    #[error("Out of bounds: {0}")]
    OutOfBounds(String),

    /// Image encoding error
    #[error("Image error: {0}")]
    Image(String),
}

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;
