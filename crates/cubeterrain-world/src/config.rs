//! Terrain pipeline configuration.

use cubeterrain_core::constants::{CHUNK_BITS, CHUNK_VOLUME};
use cubeterrain_core::{Error, Result};

use crate::WorldSeed;

/// Largest supported map: 8192 x 8192 samples (512 MiB of heights).
pub const MAX_SIZE_FACTOR: u32 = 13;

/// Terrain pipeline configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct TerrainConfig {
    /// Map side is `2^size_factor` samples.
    pub size_factor: u32,
    /// Displacement amplitude multiplier.
    pub roughness: f64,
    /// Key material for the displacement hash.
    pub seed: WorldSeed,
    /// Height map value to voxel height multiplier.
    pub height_scale: f64,
    /// Number of chunk slots.
    pub chunk_capacity: usize,
    /// Apply the contour filter after generation.
    pub apply_filter: bool,
    /// Fill and cull on the rayon pool.
    pub parallel: bool,
}

impl Default for TerrainConfig {
    fn default() -> Self {
        Self {
            size_factor: 10,
            roughness: 8.0,
            seed: 1,
            height_scale: 25.0,
            chunk_capacity: 7168,
            apply_filter: false,
            parallel: true,
        }
    }
}

impl TerrainConfig {
    #[must_use]
    pub const fn with_size_factor(mut self, size_factor: u32) -> Self {
        self.size_factor = size_factor;
        self
    }

    #[must_use]
    pub const fn with_roughness(mut self, roughness: f64) -> Self {
        self.roughness = roughness;
        self
    }

    #[must_use]
    pub const fn with_seed(mut self, seed: WorldSeed) -> Self {
        self.seed = seed;
        self
    }

    #[must_use]
    pub const fn with_height_scale(mut self, height_scale: f64) -> Self {
        self.height_scale = height_scale;
        self
    }

    #[must_use]
    pub const fn with_chunk_capacity(mut self, chunk_capacity: usize) -> Self {
        self.chunk_capacity = chunk_capacity;
        self
    }

    #[must_use]
    pub const fn with_filter(mut self, apply_filter: bool) -> Self {
        self.apply_filter = apply_filter;
        self
    }

    #[must_use]
    pub const fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Map side length in samples.
    pub const fn map_size(&self) -> usize {
        1 << self.size_factor
    }

    /// Chunk columns per horizontal axis. Maps smaller than a chunk still
    /// cover one column.
    #[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
    pub const fn chunk_columns(&self) -> i32 {
        let columns = (self.map_size() >> CHUNK_BITS) as i32;
        if columns == 0 {
            1
        } else {
            columns
        }
    }

    /// Check every field for a usable value.
    pub fn validate(&self) -> Result<()> {
        if !(1..=MAX_SIZE_FACTOR).contains(&self.size_factor) {
            return Err(Error::InvalidConfig(format!(
                "size_factor {} outside 1..={MAX_SIZE_FACTOR}",
                self.size_factor
            )));
        }
        if !self.roughness.is_finite() {
            return Err(Error::InvalidConfig(format!(
                "roughness {} is not finite",
                self.roughness
            )));
        }
        if !self.height_scale.is_finite() {
            return Err(Error::InvalidConfig(format!(
                "height_scale {} is not finite",
                self.height_scale
            )));
        }
        let max_chunks = i32::MAX.unsigned_abs() as usize / CHUNK_VOLUME;
        if self.chunk_capacity == 0 || self.chunk_capacity > max_chunks {
            return Err(Error::InvalidConfig(format!(
                "chunk_capacity {} outside 1..={max_chunks}",
                self.chunk_capacity
            )));
        }
        Ok(())
    }
}
