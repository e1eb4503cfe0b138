//! Height map to voxel type fill.
//!
//! Each chunk column (a 16 x 16 footprint) is measured for its lowest and
//! highest surface voxel; every chunk between those two heights is
//! allocated and filled. Allocation is sequential since the allocator has a
//! single writer. Filling touches only the chunk's own slice and runs in
//! parallel.

use std::ops::RangeInclusive;

use cubeterrain_core::constants::{CHUNK_BITS, CHUNK_DIM, CHUNK_VOLUME};
use cubeterrain_core::{BlockType, Position};
use cubeterrain_voxel::{local_index, BlockTypeField, ChunkAllocator};
use rayon::prelude::*;
use tracing::{debug, warn};

use crate::config::TerrainConfig;
use crate::generation::TerrainGenerator;

/// Depth of the sand and dirt layers below the surface.
pub const SURFACE_DEPTH: i32 = 3;
/// Surface heights within this distance of zero are beaches.
pub const BEACH_HEIGHT: i32 = 2;

/// Block type of the voxel at height `y` in a column whose surface is at
/// `height`.
#[inline]
pub const fn block_for_height(y: i32, height: i32) -> BlockType {
    if y > height {
        BlockType::Air
    } else if y >= height - SURFACE_DEPTH && height >= -BEACH_HEIGHT && height <= BEACH_HEIGHT {
        BlockType::Sand
    } else if y >= height - SURFACE_DEPTH && height > BEACH_HEIGHT {
        BlockType::Dirt
    } else {
        BlockType::Stone
    }
}

/// Surface height in voxels at map position `(x, z)`, truncated toward zero.
#[inline]
#[allow(clippy::cast_possible_truncation)]
pub fn surface_height(map: &TerrainGenerator, height_scale: f64, x: i32, z: i32) -> i32 {
    (map.get(x, z) * height_scale) as i32
}

/// Vertical extent of one chunk column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnFill {
    pub chunk_x: i32,
    pub chunk_z: i32,
    /// Lowest surface height in the footprint.
    pub min_height: i32,
    /// Highest surface height in the footprint.
    pub max_height: i32,
}

impl ColumnFill {
    /// Measure the column at chunk coordinates `(chunk_x, chunk_z)`.
    pub fn measure(map: &TerrainGenerator, height_scale: f64, chunk_x: i32, chunk_z: i32) -> Self {
        let x0 = chunk_x << CHUNK_BITS;
        let z0 = chunk_z << CHUNK_BITS;
        let mut min_height = i32::MAX;
        let mut max_height = i32::MIN;
        for z in z0..z0 + CHUNK_DIM {
            for x in x0..x0 + CHUNK_DIM {
                let height = surface_height(map, height_scale, x, z);
                min_height = min_height.min(height);
                max_height = max_height.max(height);
            }
        }
        Self {
            chunk_x,
            chunk_z,
            min_height,
            max_height,
        }
    }

    /// Chunk Y coordinates holding the surface.
    pub const fn chunk_y_range(&self) -> RangeInclusive<i32> {
        (self.min_height >> CHUNK_BITS)..=(self.max_height >> CHUNK_BITS)
    }
}

/// Result of one fill pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FillStats {
    /// Chunk columns measured.
    pub columns: usize,
    /// Chunks allocated and filled.
    pub chunks_filled: usize,
    /// Chunks skipped because the pool was exhausted.
    pub chunks_dropped: usize,
    /// Lowest surface height over the map.
    pub min_height: i32,
    /// Highest surface height over the map.
    pub max_height: i32,
}

/// Fill one chunk's voxel slice from the height map.
pub fn fill_chunk(map: &TerrainGenerator, height_scale: f64, chunk: Position, voxels: &mut [u32]) {
    let base = chunk.shift_left(CHUNK_BITS);
    for lz in 0..CHUNK_DIM {
        for lx in 0..CHUNK_DIM {
            let height = surface_height(map, height_scale, base.x + lx, base.z + lz);
            for ly in 0..CHUNK_DIM {
                let ty = block_for_height(base.y + ly, height);
                if let Some(voxel) = voxels.get_mut(local_index(Position::new(lx, ly, lz))) {
                    *voxel = ty.code();
                }
            }
        }
    }
}

/// Allocate and fill every chunk column covered by `config`.
///
/// Chunks already live at a filled coordinate are reused and overwritten.
/// Columns whose chunks do not fit in the pool are skipped with a warning.
/// `types` must hold exactly one chunk slice per allocator slot.
#[cfg_attr(
    feature = "profiling-tracy",
    tracing::instrument(level = "trace", skip_all)
)]
pub fn fill_from_map(
    map: &TerrainGenerator,
    config: &TerrainConfig,
    chunks: &mut ChunkAllocator,
    types: &mut BlockTypeField,
) -> FillStats {
    debug_assert_eq!(
        types.chunk_capacity(),
        chunks.capacity(),
        "type field and chunk pool differ in capacity"
    );
    let columns = config.chunk_columns();
    let mut stats = FillStats {
        min_height: i32::MAX,
        max_height: i32::MIN,
        ..FillStats::default()
    };
    let mut targets: Vec<Option<Position>> = vec![None; chunks.capacity()];

    for chunk_z in 0..columns {
        for chunk_x in 0..columns {
            let column = ColumnFill::measure(map, config.height_scale, chunk_x, chunk_z);
            stats.columns += 1;
            stats.min_height = stats.min_height.min(column.min_height);
            stats.max_height = stats.max_height.max(column.max_height);

            for chunk_y in column.chunk_y_range() {
                let pos = Position::new(chunk_x, chunk_y, chunk_z);
                match chunks.use_chunk(pos).index().and_then(|slot| targets.get_mut(slot)) {
                    Some(target) => {
                        *target = Some(pos);
                        stats.chunks_filled += 1;
                    }
                    None => stats.chunks_dropped += 1,
                }
            }
        }
    }

    if stats.chunks_dropped > 0 {
        warn!(
            dropped = stats.chunks_dropped,
            capacity = chunks.capacity(),
            "chunk pool exhausted, terrain is incomplete"
        );
    }

    let height_scale = config.height_scale;
    let fill = |(voxels, target): (&mut [u32], &Option<Position>)| {
        if let Some(pos) = target {
            fill_chunk(map, height_scale, *pos, voxels);
        }
    };
    if config.parallel {
        types
            .as_mut_slice()
            .par_chunks_mut(CHUNK_VOLUME)
            .zip(targets.par_iter())
            .for_each(fill);
    } else {
        types.chunks_mut().zip(targets.iter()).for_each(fill);
    }

    debug!(
        columns = stats.columns,
        chunks = stats.chunks_filled,
        min_height = stats.min_height,
        max_height = stats.max_height,
        "terrain filled"
    );
    stats
}
