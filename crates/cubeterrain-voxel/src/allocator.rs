//! Fixed-capacity chunk slot allocator with coordinate indexing.

use bytemuck::{Pod, Zeroable};
use cubeterrain_core::constants::SENTINEL;
use cubeterrain_core::{ChunkId, Position};
use hashbrown::HashMap;
use tracing::trace;

/// GPU chunk descriptor (16 bytes stride).
///
/// The slot index is the chunk id. Free slots hold the sentinel in every
/// field.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Pod, Zeroable)]
pub struct ChunkDescriptor {
    pub x: i32,
    pub y: i32,
    pub z: i32,
    pub _pad: i32,
}

impl ChunkDescriptor {
    /// Descriptor of a free slot.
    pub const FREE: Self = Self {
        x: SENTINEL,
        y: SENTINEL,
        z: SENTINEL,
        _pad: SENTINEL,
    };

    /// Chunk coordinate stored in this slot.
    #[inline]
    pub const fn position(&self) -> Position {
        Position::new(self.x, self.y, self.z)
    }

    #[inline]
    fn write(&mut self, pos: Position) {
        self.x = pos.x;
        self.y = pos.y;
        self.z = pos.z;
    }
}

impl Default for ChunkDescriptor {
    fn default() -> Self {
        Self::FREE
    }
}

/// Maps chunk coordinates to slot ids in a pool of fixed capacity.
///
/// The pool never grows: it mirrors a fixed-size buffer on the consumer
/// side. Every id is either on the free stack or present in the coordinate
/// index, never both.
#[derive(Debug, Clone)]
pub struct ChunkAllocator {
    /// Live chunks indexed by chunk coordinate.
    index: HashMap<Position, ChunkId>,
    /// Coordinate per slot, in the exported buffer layout.
    descriptors: Vec<ChunkDescriptor>,
    /// Free slot ids. The next allocation pops from the end.
    free: Vec<ChunkId>,
}

impl ChunkAllocator {
    /// Create an allocator with `capacity` free slots.
    pub fn new(capacity: usize) -> Self {
        Self {
            index: HashMap::with_capacity(capacity),
            descriptors: vec![ChunkDescriptor::FREE; capacity],
            // Reversed so ids are handed out from 0 upwards.
            free: (0..capacity).rev().map(ChunkId::from_index).collect(),
        }
    }

    /// Total number of slots.
    pub fn capacity(&self) -> usize {
        self.descriptors.len()
    }

    /// Number of allocated chunks.
    pub fn live_count(&self) -> usize {
        self.index.len()
    }

    /// Number of free slots.
    pub fn free_count(&self) -> usize {
        self.free.len()
    }

    /// Allocate the chunk at `pos`, or return its id if already live.
    ///
    /// Returns [`ChunkId::NONE`] when the pool is exhausted. The sentinel
    /// coordinate itself can never be allocated.
    pub fn use_chunk(&mut self, pos: Position) -> ChunkId {
        if let Some(&id) = self.index.get(&pos) {
            return id;
        }
        if pos.is_sentinel() {
            return ChunkId::NONE;
        }
        let Some(id) = self.free.pop() else {
            trace!(?pos, "chunk pool exhausted");
            return ChunkId::NONE;
        };
        if let Some(slot) = id.index() {
            self.descriptors[slot].write(pos);
        }
        self.index.insert(pos, id);
        id
    }

    /// Release a chunk slot. Freeing a free or unknown id is a no-op.
    ///
    /// The caller must drop every copy of `id` afterwards; the slot may be
    /// handed out again by the next allocation.
    pub fn free(&mut self, id: ChunkId) {
        let Some(slot) = id.index().filter(|&slot| slot < self.descriptors.len()) else {
            return;
        };
        let pos = self.descriptors[slot].position();
        if pos.is_sentinel() {
            return;
        }
        if self.index.remove(&pos).is_some() {
            self.descriptors[slot] = ChunkDescriptor::FREE;
            self.free.push(id);
        }
    }

    /// Id of the live chunk at `pos`, or [`ChunkId::NONE`].
    #[inline]
    pub fn lookup(&self, pos: Position) -> ChunkId {
        self.index.get(&pos).copied().unwrap_or(ChunkId::NONE)
    }

    /// Coordinate stored for `id`; the sentinel for free or unknown ids.
    #[inline]
    pub fn position_of(&self, id: ChunkId) -> Position {
        id.index()
            .and_then(|slot| self.descriptors.get(slot))
            .map_or(Position::SENTINEL, ChunkDescriptor::position)
    }

    /// Returns true if `id` is currently allocated.
    pub fn is_live(&self, id: ChunkId) -> bool {
        !self.position_of(id).is_sentinel()
    }

    /// Live chunks as `(id, coordinate)` pairs in id order.
    pub fn live_chunks(&self) -> impl Iterator<Item = (ChunkId, Position)> + '_ {
        self.descriptors
            .iter()
            .enumerate()
            .filter(|(_, d)| !d.position().is_sentinel())
            .map(|(slot, d)| (ChunkId::from_index(slot), d.position()))
    }

    /// Free every chunk.
    pub fn clear(&mut self) {
        let capacity = self.capacity();
        self.index.clear();
        self.descriptors.fill(ChunkDescriptor::FREE);
        self.free.clear();
        self.free
            .extend((0..capacity).rev().map(ChunkId::from_index));
    }

    /// Chunk descriptor buffer, one record per slot.
    pub fn descriptors(&self) -> &[ChunkDescriptor] {
        &self.descriptors
    }

    /// Chunk descriptor buffer as raw bytes.
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.descriptors)
    }
}
