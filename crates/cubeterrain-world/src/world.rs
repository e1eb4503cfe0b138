//! The voxel world aggregate and its generation pipeline.

use std::time::{Duration, Instant};

use cubeterrain_core::types::descriptor_bytes;
use cubeterrain_core::{BlockType, ChunkId, FaceMask, Position, Result};
use cubeterrain_voxel::{
    edge_templates, BlockOptions, BlockOptionsField, BlockTypeField, ChunkAllocator,
};
use tracing::info;

use crate::config::TerrainConfig;
use crate::culling::{rebuild_culling, rebuild_culling_parallel};
use crate::fill::{fill_from_map, FillStats};
use crate::generation::{HeightStats, TerrainGenerator};

/// Summary of one [`TerrainWorld::regenerate`] run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PipelineStats {
    /// Height map side in samples.
    pub map_size: i32,
    pub heights: HeightStats,
    pub fill: FillStats,
    /// Live chunks after the run.
    pub live_chunks: usize,
    /// Visible faces over all live chunks.
    pub visible_faces: u64,
    pub generate_time: Duration,
    pub fill_time: Duration,
    pub cull_time: Duration,
}

impl PipelineStats {
    pub fn total_time(&self) -> Duration {
        self.generate_time + self.fill_time + self.cull_time
    }
}

/// Byte views of every buffer handed to the renderer.
#[derive(Debug, Clone, Copy)]
pub struct TerrainBuffers<'a> {
    /// 16 bytes per chunk slot.
    pub chunk_descriptors: &'a [u8],
    /// 16 bytes per block type.
    pub block_type_descriptors: &'static [u8],
    /// 4 bytes per voxel.
    pub block_types: &'a [u8],
    /// 4 bytes per voxel.
    pub block_options: &'a [u8],
    /// 8 bytes per visibility mask.
    pub edge_template_index: &'static [u8],
    /// 80 bytes per face quad.
    pub edge_template_geometry: &'static [u8],
}

/// A fixed-capacity chunked voxel world.
///
/// Owns the chunk allocator and both per-voxel fields. Pipeline stages run
/// strictly in order (generate, fill, cull) and must not overlap with
/// readers of [`TerrainWorld::buffers`]; `&mut self` enforces both.
#[derive(Debug, Clone)]
pub struct TerrainWorld {
    chunks: ChunkAllocator,
    types: BlockTypeField,
    options: BlockOptionsField,
    height_map: Option<TerrainGenerator>,
}

impl TerrainWorld {
    /// Create an empty world with `capacity` chunk slots.
    pub fn new(capacity: usize) -> Self {
        Self {
            chunks: ChunkAllocator::new(capacity),
            types: BlockTypeField::new(capacity),
            options: BlockOptionsField::new(capacity),
            height_map: None,
        }
    }

    /// Create an empty world sized for `config`.
    pub fn from_config(config: &TerrainConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::new(config.chunk_capacity))
    }

    pub fn capacity(&self) -> usize {
        self.chunks.capacity()
    }

    pub fn chunks(&self) -> &ChunkAllocator {
        &self.chunks
    }

    pub fn types(&self) -> &BlockTypeField {
        &self.types
    }

    pub fn options(&self) -> &BlockOptionsField {
        &self.options
    }

    /// Height map of the last [`Self::regenerate`] run.
    pub fn height_map(&self) -> Option<&TerrainGenerator> {
        self.height_map.as_ref()
    }

    /// Run the whole pipeline: generate a height map, drop every chunk,
    /// fill the covered columns and rebuild face visibility.
    ///
    /// Storage is resized if `config` asks for a different capacity.
    #[cfg_attr(
        feature = "profiling-tracy",
        tracing::instrument(level = "trace", skip_all)
    )]
    pub fn regenerate(&mut self, config: &TerrainConfig) -> Result<PipelineStats> {
        config.validate()?;
        if config.chunk_capacity != self.capacity() {
            *self = Self::new(config.chunk_capacity);
        }

        let start = Instant::now();
        let mut map = TerrainGenerator::from_config(config)?;
        map.generate();
        if config.apply_filter {
            map.filter();
        }
        let heights = map.statistics();
        let generate_time = start.elapsed();
        info!(
            size = map.size(),
            seed = config.seed,
            min = heights.min,
            max = heights.max,
            ?generate_time,
            "height map generated"
        );

        let start = Instant::now();
        self.reset();
        let fill = self.fill_from_map(&map, config);
        let fill_time = start.elapsed();
        info!(
            chunks = fill.chunks_filled,
            dropped = fill.chunks_dropped,
            ?fill_time,
            "chunks filled"
        );

        // Every fill write has landed before culling reads neighbours.
        let start = Instant::now();
        let visible_faces = self.rebuild_culling(config.parallel);
        let cull_time = start.elapsed();
        info!(visible_faces, ?cull_time, "culling rebuilt");

        let stats = PipelineStats {
            map_size: map.size(),
            heights,
            fill,
            live_chunks: self.chunks.live_count(),
            visible_faces,
            generate_time,
            fill_time,
            cull_time,
        };
        self.height_map = Some(map);
        Ok(stats)
    }

    /// Allocate and fill the chunk columns covered by `map`.
    pub fn fill_from_map(&mut self, map: &TerrainGenerator, config: &TerrainConfig) -> FillStats {
        fill_from_map(map, config, &mut self.chunks, &mut self.types)
    }

    /// Recompute visibility for every live chunk. Returns the number of
    /// visible faces.
    pub fn rebuild_culling(&mut self, parallel: bool) -> u64 {
        if parallel {
            rebuild_culling_parallel(&self.chunks, &self.types, &mut self.options)
        } else {
            rebuild_culling(&self.chunks, &self.types, &mut self.options)
        }
    }

    /// Free every chunk and zero both fields.
    pub fn reset(&mut self) {
        self.chunks.clear();
        self.types.clear();
        self.options.clear();
    }

    /// Free the chunk at chunk coordinate `chunk_pos` and zero its voxels so
    /// a later allocation of the slot starts clean. Returns false if no
    /// chunk is live there.
    pub fn free_chunk(&mut self, chunk_pos: Position) -> bool {
        let id = self.chunks.lookup(chunk_pos);
        if id.is_none() {
            return false;
        }
        self.chunks.free(id);
        self.types.clear_chunk(id);
        self.options.clear_chunk(id);
        true
    }

    /// Store a block at a world position, allocating its chunk on demand.
    ///
    /// Returns [`ChunkId::NONE`] when the pool is exhausted. Visibility is
    /// not updated until the next [`Self::rebuild_culling`].
    pub fn set_block(&mut self, pos: Position, ty: BlockType) -> ChunkId {
        self.types.set_block_type_world(&mut self.chunks, pos, ty)
    }

    /// Block at a world position, or `None` if its chunk is not allocated.
    pub fn block(&self, pos: Position) -> Option<BlockType> {
        self.types.block_type_world(&self.chunks, pos)
    }

    /// Options word at a world position.
    pub fn block_options(&self, pos: Position) -> Option<BlockOptions> {
        self.options.options_world(&self.chunks, pos)
    }

    /// Visible faces of the block at a world position.
    pub fn visible_faces(&self, pos: Position) -> Option<FaceMask> {
        self.block_options(pos).map(BlockOptions::visibility_mask)
    }

    /// Every renderer-facing buffer as raw bytes.
    pub fn buffers(&self) -> TerrainBuffers<'_> {
        let templates = edge_templates();
        TerrainBuffers {
            chunk_descriptors: self.chunks.as_bytes(),
            block_type_descriptors: descriptor_bytes(),
            block_types: self.types.as_bytes(),
            block_options: self.options.as_bytes(),
            edge_template_index: templates.index_bytes(),
            edge_template_geometry: templates.geometry_bytes(),
        }
    }
}
