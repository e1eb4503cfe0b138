//! cubeterrain terrain generator
//!
//! Generates a height map, fills the chunked voxel world from it and
//! rebuilds face visibility, then reports what the renderer would receive.
//!
//! ## Usage
//!
//! ```bash
//! cargo run --release -p cubeterrain-gen -- [OPTIONS]
//! ```
//!
//! ## Examples
//!
//! ```bash
//! # Default 1024x1024 map
//! cargo run --release -p cubeterrain-gen
//!
//! # Rougher terrain with another seed, and a preview of the height map
//! cargo run --release -p cubeterrain-gen -- --roughness 12 --seed 7 --preview map.png
//! ```
//!
//! ## Environment Variables
//!
//! - `RUST_LOG`: Set log level (e.g., info, debug, trace)

use anyhow::{bail, Context};
use cubeterrain_core::BLOCK_TYPES;
use cubeterrain_world::{TerrainConfig, TerrainWorld};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Command line options.
#[derive(Debug, Clone, Default)]
struct Options {
    config: TerrainConfig,
    preview: Option<String>,
    help: bool,
}

impl Options {
    fn from_args(args: impl IntoIterator<Item = String>) -> anyhow::Result<Self> {
        let mut options = Self::default();
        let mut args = args.into_iter();

        while let Some(arg) = args.next() {
            let mut value = || {
                args.next()
                    .with_context(|| format!("{arg} requires a value"))
            };
            match arg.as_str() {
                "--size-factor" => {
                    options.config.size_factor = parse(&value()?, &arg)?;
                }
                "--roughness" => {
                    options.config.roughness = parse(&value()?, &arg)?;
                }
                "--seed" => {
                    options.config.seed = parse(&value()?, &arg)?;
                }
                "--height-scale" => {
                    options.config.height_scale = parse(&value()?, &arg)?;
                }
                "--chunks" => {
                    options.config.chunk_capacity = parse(&value()?, &arg)?;
                }
                "--preview" => options.preview = Some(value()?),
                "--filter" => options.config.apply_filter = true,
                "--sequential" => options.config.parallel = false,
                "-h" | "--help" => options.help = true,
                other => bail!("unknown option {other:?} (see --help)"),
            }
        }

        Ok(options)
    }
}

fn parse<T>(value: &str, name: &str) -> anyhow::Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    value
        .parse()
        .with_context(|| format!("invalid value {value:?} for {name}"))
}

fn init_logging() {
    #[cfg(feature = "profiling-tracy")]
    {
        use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

        let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new("info,cubeterrain_world=trace,cubeterrain_gen=trace")
        });
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer())
            .with(tracing_tracy::TracyLayer::default())
            .init();
    }
    #[cfg(not(feature = "profiling-tracy"))]
    {
        tracing_subscriber::fmt()
            .with_env_filter(
                EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
            )
            .init();
    }
}

fn main() -> anyhow::Result<()> {
    let options = Options::from_args(std::env::args().skip(1))?;
    if options.help {
        print_help();
        return Ok(());
    }
    init_logging();

    let config = options.config;
    config.validate()?;
    info!(
        size_factor = config.size_factor,
        roughness = config.roughness,
        seed = config.seed,
        chunks = config.chunk_capacity,
        parallel = config.parallel,
        "generating terrain"
    );

    let mut world = TerrainWorld::from_config(&config)?;
    let stats = world.regenerate(&config)?;

    info!(
        map_size = stats.map_size,
        live_chunks = stats.live_chunks,
        free_chunks = world.chunks().free_count(),
        visible_faces = stats.visible_faces,
        total = ?stats.total_time(),
        "terrain ready"
    );

    let mut counts = [0usize; BLOCK_TYPES.len()];
    for (id, _) in world.chunks().live_chunks() {
        for &code in world.types().chunk(id).unwrap_or_default() {
            if let Some(count) = counts.get_mut(code as usize) {
                *count += 1;
            }
        }
    }
    for (ty, count) in BLOCK_TYPES.iter().zip(counts) {
        info!(block = ty.name(), count, "voxels");
    }

    let buffers = world.buffers();
    info!(
        chunk_descriptors = buffers.chunk_descriptors.len(),
        block_type_descriptors = buffers.block_type_descriptors.len(),
        block_types = buffers.block_types.len(),
        block_options = buffers.block_options.len(),
        edge_template_index = buffers.edge_template_index.len(),
        edge_template_geometry = buffers.edge_template_geometry.len(),
        "buffer sizes (bytes)"
    );

    if let Some(path) = options.preview {
        if let Some(map) = world.height_map() {
            map.save_preview(&path)?;
        }
    }

    Ok(())
}

fn print_help() {
    eprintln!(
        "cubeterrain terrain generator

USAGE:
    cargo run --release -p cubeterrain-gen -- [OPTIONS]

TERRAIN OPTIONS:
    --size-factor <N>       Height map side is 2^N samples, 1..=13 (default: 10)
    --roughness <F>         Displacement amplitude (default: 8)
    --seed <N>              Hash key for the displacement (default: 1)
    --height-scale <F>      Height map to voxel height multiplier (default: 25)
    --filter                Apply the contour filter after generation

WORLD OPTIONS:
    --chunks <N>            Number of chunk slots (default: 7168)
    --sequential            Fill and cull on the calling thread only

OUTPUT OPTIONS:
    --preview <PATH>        Save the height map as a PNG image

OTHER:
    -h, --help              Print this help message

ENVIRONMENT VARIABLES:
    RUST_LOG                Set log level (e.g., info, debug, trace)"
    );
}
