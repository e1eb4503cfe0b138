//! Core types for the cubeterrain voxel world.
//!
//! This crate provides the foundational types shared by the storage and
//! world crates:
//! - Integer positions and chunk/local address arithmetic
//! - Chunk identifiers with the "no chunk" sentinel
//! - Cube faces, visibility masks and rotations
//! - The static block type registry
//! - The error type

pub mod coords;
pub mod error;
pub mod face;
pub mod types;

pub use coords::{ChunkId, Position};
pub use error::{Error, Result};
pub use face::{Face, FaceMask, Rotation};
pub use types::{BlockType, BlockTypeDescriptor, TextureMapping, BLOCK_TYPES};

/// World-wide constants
pub mod constants {
    /// Bits needed to represent a position within a chunk (4 bits for 0-15)
    pub const CHUNK_BITS: u32 = 4;
    /// Size of a chunk in voxels per axis
    pub const CHUNK_DIM: i32 = 1 << CHUNK_BITS;
    /// Mask extracting the in-chunk part of a world coordinate
    pub const CHUNK_MASK: i32 = CHUNK_DIM - 1;
    /// Total voxels in a chunk (16^3)
    pub const CHUNK_VOLUME: usize = 1 << (3 * CHUNK_BITS);
    /// Linear address step along X
    pub const X_STEP: usize = 1;
    /// Linear address step along Y
    pub const Y_STEP: usize = 1 << CHUNK_BITS;
    /// Linear address step along Z
    pub const Z_STEP: usize = 1 << (2 * CHUNK_BITS);
    /// Marker for "no chunk", both as a lookup miss and as a free slot's coordinate
    pub const SENTINEL: i32 = i32::MIN;
}
