//! Flat per-voxel storage addressed by chunk id and local position.
//!
//! A field holds one `T` per voxel for every chunk slot, laid out chunk after
//! chunk. Within a chunk, X varies fastest, then Y, then Z:
//!
//! ```text
//! address = chunk_id * 4096 + x + y * 16 + z * 256
//! ```
//!
//! Out-of-range addresses read as zero and writes to them are dropped. Use
//! [`VoxelField::try_get`] / [`VoxelField::try_set`] to observe the miss.

use std::slice::ChunksExactMut;

use bytemuck::Pod;
use cubeterrain_core::constants::{CHUNK_MASK, CHUNK_VOLUME, X_STEP, Y_STEP, Z_STEP};
use cubeterrain_core::{BlockType, ChunkId, Error, Position, Result};

use crate::allocator::ChunkAllocator;
use crate::options::BlockOptions;

/// Offset of `local` within a chunk's slice. Coordinates are wrapped into
/// 0..16.
#[inline]
#[allow(clippy::cast_sign_loss)]
pub const fn local_index(local: Position) -> usize {
    let local = local.mask(CHUNK_MASK);
    local.x as usize * X_STEP + local.y as usize * Y_STEP + local.z as usize * Z_STEP
}

/// Linear address of `local` within `chunk`.
///
/// Local coordinates are wrapped into 0..16. Returns `None` for
/// [`ChunkId::NONE`].
#[inline]
pub const fn block_address(chunk: ChunkId, local: Position) -> Option<usize> {
    match chunk.index() {
        Some(slot) => Some(slot * CHUNK_VOLUME + local_index(local)),
        None => None,
    }
}

/// One value per voxel for a fixed number of chunk slots.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VoxelField<T> {
    data: Vec<T>,
}

/// Per-voxel block type codes.
pub type BlockTypeField = VoxelField<u32>;

/// Per-voxel packed option words.
pub type BlockOptionsField = VoxelField<BlockOptions>;

impl<T: Pod> VoxelField<T> {
    /// Create a zero-initialised field with room for `chunks` chunk slots.
    pub fn new(chunks: usize) -> Self {
        Self {
            data: vec![T::zeroed(); chunks * CHUNK_VOLUME],
        }
    }

    /// Number of chunk slots.
    #[inline]
    pub fn chunk_capacity(&self) -> usize {
        self.data.len() / CHUNK_VOLUME
    }

    /// Number of voxels.
    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Value at a linear address; zero when out of range.
    #[inline]
    pub fn get(&self, address: usize) -> T {
        self.data.get(address).copied().unwrap_or_else(T::zeroed)
    }

    /// Store a value at a linear address; ignored when out of range.
    #[inline]
    pub fn set(&mut self, address: usize, value: T) {
        if let Some(slot) = self.data.get_mut(address) {
            *slot = value;
        }
    }

    /// Read-modify-write at a linear address; ignored when out of range.
    #[inline]
    pub fn update(&mut self, address: usize, f: impl FnOnce(T) -> T) {
        if let Some(slot) = self.data.get_mut(address) {
            *slot = f(*slot);
        }
    }

    /// Checked read.
    pub fn try_get(&self, address: usize) -> Result<T> {
        self.data.get(address).copied().ok_or_else(|| {
            Error::OutOfBounds(format!(
                "voxel address {address} (field holds {})",
                self.data.len()
            ))
        })
    }

    /// Checked write.
    pub fn try_set(&mut self, address: usize, value: T) -> Result<()> {
        let len = self.data.len();
        let slot = self.data.get_mut(address).ok_or_else(|| {
            Error::OutOfBounds(format!("voxel address {address} (field holds {len})"))
        })?;
        *slot = value;
        Ok(())
    }

    /// Value at `local` in `chunk`; zero for [`ChunkId::NONE`].
    #[inline]
    pub fn get_at(&self, chunk: ChunkId, local: Position) -> T {
        block_address(chunk, local).map_or_else(T::zeroed, |address| self.get(address))
    }

    /// Store a value at `local` in `chunk`; ignored for [`ChunkId::NONE`].
    #[inline]
    pub fn set_at(&mut self, chunk: ChunkId, local: Position, value: T) {
        if let Some(address) = block_address(chunk, local) {
            self.set(address, value);
        }
    }

    /// Read-modify-write at `local` in `chunk`.
    #[inline]
    pub fn update_at(&mut self, chunk: ChunkId, local: Position, f: impl FnOnce(T) -> T) {
        if let Some(address) = block_address(chunk, local) {
            self.update(address, f);
        }
    }

    /// Value at a world position, or `None` if its chunk is not allocated.
    pub fn get_world(&self, chunks: &ChunkAllocator, pos: Position) -> Option<T> {
        let (chunk_pos, local) = pos.split();
        let address = block_address(chunks.lookup(chunk_pos), local)?;
        self.data.get(address).copied()
    }

    /// Store a value at a world position, allocating its chunk on demand.
    ///
    /// Returns the chunk id written to, or [`ChunkId::NONE`] when the pool is
    /// exhausted (the write is dropped).
    pub fn set_world(&mut self, chunks: &mut ChunkAllocator, pos: Position, value: T) -> ChunkId {
        let (chunk_pos, local) = pos.split();
        let chunk = chunks.use_chunk(chunk_pos);
        self.set_at(chunk, local, value);
        chunk
    }

    /// Read-modify-write at a world position of an allocated chunk.
    ///
    /// Returns false if the chunk is not allocated.
    pub fn update_world(
        &mut self,
        chunks: &ChunkAllocator,
        pos: Position,
        f: impl FnOnce(T) -> T,
    ) -> bool {
        let (chunk_pos, local) = pos.split();
        match block_address(chunks.lookup(chunk_pos), local) {
            Some(address) if address < self.data.len() => {
                self.update(address, f);
                true
            }
            _ => false,
        }
    }

    /// The voxels of one chunk slot.
    pub fn chunk(&self, chunk: ChunkId) -> Option<&[T]> {
        let start = chunk.index()? * CHUNK_VOLUME;
        self.data.get(start..start + CHUNK_VOLUME)
    }

    /// The voxels of one chunk slot, mutably.
    pub fn chunk_mut(&mut self, chunk: ChunkId) -> Option<&mut [T]> {
        let start = chunk.index()? * CHUNK_VOLUME;
        self.data.get_mut(start..start + CHUNK_VOLUME)
    }

    /// Disjoint per-chunk slices in slot order.
    pub fn chunks_mut(&mut self) -> ChunksExactMut<'_, T> {
        self.data.chunks_exact_mut(CHUNK_VOLUME)
    }

    /// Reset every voxel of `chunk` to zero.
    pub fn clear_chunk(&mut self, chunk: ChunkId) {
        if let Some(voxels) = self.chunk_mut(chunk) {
            voxels.fill(T::zeroed());
        }
    }

    /// Reset the whole field to zero.
    pub fn clear(&mut self) {
        self.data.fill(T::zeroed());
    }

    #[inline]
    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        &mut self.data
    }

    /// Raw little-endian bytes for upload.
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.data)
    }
}

impl BlockTypeField {
    /// Block type at a linear address. Unknown codes read as air.
    #[inline]
    pub fn block_type(&self, address: usize) -> BlockType {
        BlockType::from_code(self.get(address)).unwrap_or_default()
    }

    #[inline]
    pub fn set_block_type(&mut self, address: usize, ty: BlockType) {
        self.set(address, ty.code());
    }

    /// Block type at `local` in `chunk`.
    #[inline]
    pub fn block_type_at(&self, chunk: ChunkId, local: Position) -> BlockType {
        BlockType::from_code(self.get_at(chunk, local)).unwrap_or_default()
    }

    #[inline]
    pub fn set_block_type_at(&mut self, chunk: ChunkId, local: Position, ty: BlockType) {
        self.set_at(chunk, local, ty.code());
    }

    /// Block type at a world position, or `None` if its chunk is not allocated.
    pub fn block_type_world(&self, chunks: &ChunkAllocator, pos: Position) -> Option<BlockType> {
        self.get_world(chunks, pos)
            .map(|code| BlockType::from_code(code).unwrap_or_default())
    }

    /// Store a block type at a world position, allocating its chunk on demand.
    pub fn set_block_type_world(
        &mut self,
        chunks: &mut ChunkAllocator,
        pos: Position,
        ty: BlockType,
    ) -> ChunkId {
        self.set_world(chunks, pos, ty.code())
    }
}
