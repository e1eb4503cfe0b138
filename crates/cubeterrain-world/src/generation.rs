//! Procedural height maps using the diamond-square algorithm.
//!
//! The map is a toroidal square grid of side `N = 2^size_factor`: reads and
//! writes outside `0..N` wrap on each axis independently, so the generated
//! field tiles seamlessly. Every stored value is clamped to `[-1, 1]`.

use cubeterrain_core::{Error, Result};
use image::{Rgb, RgbImage};
use tracing::{debug, info};

use crate::config::{TerrainConfig, MAX_SIZE_FACTOR};
use crate::hash::hash01;
use crate::WorldSeed;

/// Summary of a height map.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HeightStats {
    pub min: f64,
    pub max: f64,
    pub mean: f64,
}

/// Diamond-square height map generator.
#[derive(Debug, Clone)]
pub struct TerrainGenerator {
    size_factor: u32,
    size: i32,
    roughness: f64,
    seed: WorldSeed,
    data: Vec<f64>,
}

impl TerrainGenerator {
    /// Create a zeroed map of side `2^size_factor`.
    ///
    /// Roughness and seed are used as given: any finite roughness is valid.
    ///
    /// # Panics
    ///
    /// If `size_factor` exceeds [`MAX_SIZE_FACTOR`].
    pub fn new(size_factor: u32, roughness: f64, seed: WorldSeed) -> Self {
        assert!(
            size_factor <= MAX_SIZE_FACTOR,
            "size_factor {size_factor} exceeds {MAX_SIZE_FACTOR}"
        );
        let side = 1usize << size_factor;
        Self {
            size_factor,
            size: 1 << size_factor,
            roughness,
            seed,
            data: vec![0.0; side * side],
        }
    }

    /// Create a generator from a validated configuration.
    pub fn from_config(config: &TerrainConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::new(config.size_factor, config.roughness, config.seed))
    }

    /// Side length in samples.
    #[inline]
    pub const fn size(&self) -> i32 {
        self.size
    }

    #[inline]
    pub const fn size_factor(&self) -> u32 {
        self.size_factor
    }

    #[inline]
    pub const fn roughness(&self) -> f64 {
        self.roughness
    }

    #[inline]
    pub const fn seed(&self) -> WorldSeed {
        self.seed
    }

    /// Row-major samples (`index = y * size + x`).
    pub fn data(&self) -> &[f64] {
        &self.data
    }

    #[inline]
    #[allow(clippy::cast_sign_loss)]
    fn index(&self, x: i32, y: i32) -> usize {
        let x = x.rem_euclid(self.size) as usize;
        let y = y.rem_euclid(self.size) as usize;
        (y << self.size_factor) + x
    }

    /// Sample at `(x, y)`, wrapping out-of-range coordinates.
    #[inline]
    pub fn get(&self, x: i32, y: i32) -> f64 {
        self.data[self.index(x, y)]
    }

    /// Store a sample at `(x, y)`, wrapping coordinates and clamping the
    /// value to `[-1, 1]`.
    #[inline]
    pub fn set(&mut self, x: i32, y: i32, value: f64) {
        let index = self.index(x, y);
        self.data[index] = value.clamp(-1.0, 1.0);
    }

    /// Fill the map. Repeated calls refine the current contents further.
    #[cfg_attr(
        feature = "profiling-tracy",
        tracing::instrument(level = "trace", skip_all)
    )]
    pub fn generate(&mut self) {
        let mut block_size = self.size >> 1;
        while block_size >= 1 {
            self.square(block_size);
            self.diamond(block_size);
            block_size >>= 1;
        }
        debug!(size = self.size, seed = self.seed, "height map generated");
    }

    /// Centre of every `2 * block_size` cell: average of its four corners.
    fn square(&mut self, block_size: i32) {
        let step = block_size << 1;
        let mut y = block_size;
        while y < self.size {
            let mut x = block_size;
            while x < self.size {
                let average = (self.get(x - block_size, y - block_size)
                    + self.get(x - block_size, y + block_size)
                    + self.get(x + block_size, y + block_size)
                    + self.get(x + block_size, y - block_size))
                    * 0.25;
                let value = self.displace(average, block_size, x, y);
                self.set(x, y, value);
                x += step;
            }
            y += step;
        }
    }

    /// Edge midpoints: average of the four axis neighbours. Rows alternate
    /// between starting at `block_size` and at 0.
    fn diamond(&mut self, block_size: i32) {
        let step = block_size << 1;
        let mut y = 0;
        let mut row_offset = block_size;
        while y < self.size {
            let mut x = row_offset;
            while x < self.size {
                let average = (self.get(x - block_size, y)
                    + self.get(x + block_size, y)
                    + self.get(x, y - block_size)
                    + self.get(x, y + block_size))
                    * 0.25;
                let value = self.displace(average, block_size, x, y);
                self.set(x, y, value);
                x += step;
            }
            row_offset = block_size - row_offset;
            y += block_size;
        }
    }

    #[inline]
    fn displace(&self, value: f64, block_size: i32, x: i32, y: i32) -> f64 {
        let offset = hash01(self.seed, x, y).mul_add(2.0, -1.0);
        value + offset * f64::from(block_size) * 2.0 / f64::from(self.size) * self.roughness
    }

    /// Contour curve: flattens lowlands and deepens the sea.
    ///
    /// Positive values become `v^3.8`, negative values `-(|v|^0.2)`.
    pub fn filter(&mut self) {
        for value in &mut self.data {
            if *value > 0.0 {
                *value = value.powf(3.8);
            } else if *value < 0.0 {
                *value = -(-*value).powf(0.2);
            }
        }
    }

    /// Minimum, maximum and mean sample.
    #[allow(clippy::cast_precision_loss)]
    pub fn statistics(&self) -> HeightStats {
        let (min, max, sum) = self.data.iter().fold(
            (f64::INFINITY, f64::NEG_INFINITY, 0.0),
            |(min, max, sum), &v| (min.min(v), max.max(v), sum + v),
        );
        HeightStats {
            min,
            max,
            mean: sum / self.data.len() as f64,
        }
    }

    /// Render the map as an image: below zero in shades of blue (deeper is
    /// darker), zero and above in grey (higher is lighter).
    #[allow(clippy::cast_sign_loss, clippy::cast_possible_wrap)]
    pub fn preview_image(&self) -> RgbImage {
        let size = self.size as u32;
        RgbImage::from_fn(size, size, |x, y| {
            let v = self.get(x as i32, y as i32);
            if v < 0.0 {
                Rgb([0, 0, shade(1.0 - v.abs())])
            } else {
                let c = shade(v);
                Rgb([c, c, c])
            }
        })
    }

    /// Write [`Self::preview_image`] to `path`; the format follows the
    /// file extension.
    pub fn save_preview(&self, path: impl AsRef<std::path::Path>) -> Result<()> {
        let path = path.as_ref();
        self.preview_image()
            .save(path)
            .map_err(|e| Error::Image(format!("{}: {e}", path.display())))?;
        info!(path = %path.display(), "height map preview saved");
        Ok(())
    }
}

/// Map `[0, 1]` onto `128..=255`.
#[inline]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn shade(v: f64) -> u8 {
    (v * 127.0) as u8 + 128
}
