//! Coordinate systems for the voxel world.
//!
//! A single integer [`Position`] type serves as world position (voxel
//! units), chunk coordinate (chunk units) and in-chunk local position. The
//! conversions between them are plain bit operations:
//!
//! - world → chunk: arithmetic shift right by [`CHUNK_BITS`]
//! - world → local: bitwise AND with [`CHUNK_MASK`]

use std::ops::{Add, BitAnd, Shr};

use crate::constants::{CHUNK_BITS, CHUNK_MASK, SENTINEL};
use crate::face::Face;
use bytemuck::{Pod, Zeroable};
use glam::IVec3;
use serde::{Deserialize, Serialize};

/// Integer position triple.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Pod, Zeroable, Serialize, Deserialize,
)]
#[repr(C)]
pub struct Position {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl Position {
    /// The origin.
    pub const ZERO: Self = Self::new(0, 0, 0);

    /// Coordinate stored for a chunk slot that is not allocated.
    pub const SENTINEL: Self = Self::new(SENTINEL, SENTINEL, SENTINEL);

    /// Create a new position
    #[inline]
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    /// Bitwise AND of every axis with `mask`.
    #[inline]
    #[must_use]
    pub const fn mask(self, mask: i32) -> Self {
        Self::new(self.x & mask, self.y & mask, self.z & mask)
    }

    /// Arithmetic shift right of every axis by `count`.
    #[inline]
    #[must_use]
    pub const fn shift_right(self, count: u32) -> Self {
        Self::new(self.x >> count, self.y >> count, self.z >> count)
    }

    /// Shift left of every axis by `count`.
    #[inline]
    #[must_use]
    pub const fn shift_left(self, count: u32) -> Self {
        Self::new(self.x << count, self.y << count, self.z << count)
    }

    /// Returns true if this is the "no chunk" coordinate.
    #[inline]
    pub const fn is_sentinel(self) -> bool {
        self.x == SENTINEL && self.y == SENTINEL && self.z == SENTINEL
    }

    /// Get the chunk containing this world position
    #[inline]
    #[must_use]
    pub const fn chunk_pos(self) -> Self {
        self.shift_right(CHUNK_BITS)
    }

    /// Get the local position within the chunk
    #[inline]
    #[must_use]
    pub const fn local_pos(self) -> Self {
        self.mask(CHUNK_MASK)
    }

    /// Split into chunk and local position
    #[inline]
    pub const fn split(self) -> (Self, Self) {
        (self.chunk_pos(), self.local_pos())
    }

    /// Create a world position from chunk and local position.
    ///
    /// The result must be representable: chunk coordinates are limited to
    /// `i32::MIN >> 4..=i32::MAX >> 4` on every axis. Use
    /// [`Self::checked_from_chunk_local`] for arbitrary chunk coordinates.
    #[inline]
    pub const fn from_chunk_local(chunk: Self, local: Self) -> Self {
        Self::new(
            (chunk.x << CHUNK_BITS) + local.x,
            (chunk.y << CHUNK_BITS) + local.y,
            (chunk.z << CHUNK_BITS) + local.z,
        )
    }

    /// World position of `local` in `chunk`, or `None` if it does not fit
    /// in `i32`.
    pub fn checked_from_chunk_local(chunk: Self, local: Self) -> Option<Self> {
        let axis = |c: i32, l: i32| c.checked_mul(1 << CHUNK_BITS)?.checked_add(l);
        Some(Self::new(
            axis(chunk.x, local.x)?,
            axis(chunk.y, local.y)?,
            axis(chunk.z, local.z)?,
        ))
    }

    /// The adjacent position across `face`.
    ///
    /// Overflows at the `i32` extremes; see [`Self::checked_offset`].
    #[inline]
    #[must_use]
    pub fn offset(self, face: Face) -> Self {
        self + Self::from(face.normal())
    }

    /// The adjacent position across `face`, or `None` past the `i32` range.
    #[inline]
    pub fn checked_offset(self, face: Face) -> Option<Self> {
        let n = face.normal();
        Some(Self::new(
            self.x.checked_add(n.x)?,
            self.y.checked_add(n.y)?,
            self.z.checked_add(n.z)?,
        ))
    }

    /// Component along axis 0 (X), 1 (Y) or 2 (Z).
    #[inline]
    pub const fn axis(self, axis: usize) -> i32 {
        match axis {
            0 => self.x,
            1 => self.y,
            _ => self.z,
        }
    }

    /// Copy with the component along `axis` replaced.
    #[inline]
    #[must_use]
    pub const fn with_axis(self, axis: usize, value: i32) -> Self {
        match axis {
            0 => Self::new(value, self.y, self.z),
            1 => Self::new(self.x, value, self.z),
            _ => Self::new(self.x, self.y, value),
        }
    }

    /// Convert to glam IVec3
    #[inline]
    pub const fn to_ivec3(self) -> IVec3 {
        IVec3::new(self.x, self.y, self.z)
    }
}

impl From<IVec3> for Position {
    fn from(v: IVec3) -> Self {
        Self::new(v.x, v.y, v.z)
    }
}

impl BitAnd<i32> for Position {
    type Output = Self;

    #[inline]
    fn bitand(self, mask: i32) -> Self {
        self.mask(mask)
    }
}

impl Shr<u32> for Position {
    type Output = Self;

    #[inline]
    fn shr(self, count: u32) -> Self {
        self.shift_right(count)
    }
}

impl Add for Position {
    type Output = Self;

    #[inline]
    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

/// Identifier of an allocated chunk slot.
///
/// An id is only meaningful between the allocation that produced it and the
/// matching free. [`ChunkId::NONE`] marks "no chunk": a lookup miss or an
/// exhausted pool.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Pod, Zeroable)]
#[repr(transparent)]
pub struct ChunkId(pub i32);

impl ChunkId {
    /// No chunk
    pub const NONE: Self = Self(SENTINEL);

    /// Create an id from a slot index.
    #[inline]
    #[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
    pub const fn from_index(index: usize) -> Self {
        Self(index as i32)
    }

    /// Returns true if this is the sentinel
    #[inline]
    pub const fn is_none(self) -> bool {
        self.0 == SENTINEL
    }

    /// Returns true if this refers to a slot
    #[inline]
    pub const fn is_some(self) -> bool {
        self.0 >= 0
    }

    /// Slot index, or `None` for the sentinel.
    #[inline]
    #[allow(clippy::cast_sign_loss)]
    pub const fn index(self) -> Option<usize> {
        if self.0 >= 0 {
            Some(self.0 as usize)
        } else {
            None
        }
    }
}

impl Default for ChunkId {
    fn default() -> Self {
        Self::NONE
    }
}
