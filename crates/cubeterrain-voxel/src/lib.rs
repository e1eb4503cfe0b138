//! Chunk allocation and per-voxel storage for the cubeterrain voxel world.
//!
//! Every buffer here has a fixed stride so it can be handed to a renderer
//! as raw bytes:
//! - chunk descriptors (16 bytes per slot)
//! - per-voxel type codes and option words (4 bytes per voxel)
//! - edge template index (8 bytes per mask) and geometry (80 bytes per face)

pub mod allocator;
pub mod field;
pub mod options;
pub mod templates;

pub use allocator::{ChunkAllocator, ChunkDescriptor};
pub use field::{block_address, local_index, BlockOptionsField, BlockTypeField, VoxelField};
pub use options::BlockOptions;
pub use templates::{edge_templates, EdgeTemplate, EdgeTemplateIndex, EdgeTemplateTable};
