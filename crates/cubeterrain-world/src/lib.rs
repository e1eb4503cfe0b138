//! Terrain generation, chunk fill and face culling for the cubeterrain
//! voxel world.
//!
//! The pipeline runs in strict order: generate a height map, fill the
//! chunk columns it covers, then rebuild face visibility for every live
//! chunk. [`TerrainWorld`] owns the buffers and drives all three stages.

pub mod config;
pub mod culling;
pub mod fill;
pub mod generation;
pub mod hash;
pub mod world;

pub use config::TerrainConfig;
pub use culling::{cull_chunk, rebuild_culling, rebuild_culling_parallel};
pub use fill::{block_for_height, fill_from_map, ColumnFill, FillStats};
pub use generation::{HeightStats, TerrainGenerator};
pub use world::{PipelineStats, TerrainBuffers, TerrainWorld};

/// World seed for procedural generation.
pub type WorldSeed = u64;
