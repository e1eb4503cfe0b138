//! Face visibility culling.
//!
//! A face is visible when the voxel across it is air or differs in opacity.
//! Two touching opaque voxels hide their shared face on both sides, as do
//! two touching transparent (non-air) voxels. Air voxels are skipped and
//! their option words are left untouched.
//!
//! Every live chunk is rebuilt from scratch in two phases:
//! 1. interior: neighbours inside the same chunk;
//! 2. boundary: for each of the six outer layers, neighbours in the
//!    adjacent chunk on the mirrored layer, or open space when that chunk
//!    is not allocated.

use cubeterrain_core::constants::{CHUNK_DIM, CHUNK_MASK, CHUNK_VOLUME};
use cubeterrain_core::{BlockType, ChunkId, Face, Position};
use cubeterrain_voxel::{local_index, BlockOptions, BlockOptionsField, BlockTypeField, ChunkAllocator};
use rayon::prelude::*;

#[inline]
fn block(code: u32) -> BlockType {
    BlockType::from_code(code).unwrap_or_default()
}

/// Returns true if a face of `ty` towards `neighbour` must be drawn.
#[inline]
pub fn face_visible(ty: BlockType, neighbour: BlockType) -> bool {
    neighbour.is_air() || neighbour.is_opaque() != ty.is_opaque()
}

/// Local position on the layer `layer` of `axis`; `u` and `v` run over the
/// two remaining axes.
#[inline]
const fn layer_position(axis: usize, layer: i32, u: i32, v: i32) -> Position {
    Position::ZERO
        .with_axis(axis, layer)
        .with_axis((axis + 1) % 3, u)
        .with_axis((axis + 2) % 3, v)
}

/// Recompute the visibility bits of one chunk.
///
/// `options` is the chunk's own slice of the options field. Returns the
/// number of visible faces of non-air voxels in the chunk.
pub fn cull_chunk(
    chunk: ChunkId,
    chunk_pos: Position,
    types: &BlockTypeField,
    chunks: &ChunkAllocator,
    options: &mut [BlockOptions],
) -> u64 {
    let Some(own) = types.chunk(chunk) else {
        return 0;
    };
    if options.len() < CHUNK_VOLUME {
        return 0;
    }

    cull_interior(own, options);
    for face in Face::ALL {
        // No chunk exists past the edge of the coordinate range.
        let neighbour = chunk_pos
            .checked_offset(face)
            .and_then(|pos| types.chunk(chunks.lookup(pos)));
        cull_boundary(face, own, neighbour, options);
    }

    own.iter()
        .zip(options.iter())
        .filter(|&(&code, _)| !block(code).is_air())
        .map(|(_, word)| u64::from(word.visible_face_count()))
        .sum()
}

fn cull_interior(own: &[u32], options: &mut [BlockOptions]) {
    for z in 0..CHUNK_DIM {
        for y in 0..CHUNK_DIM {
            for x in 0..CHUNK_DIM {
                let local = Position::new(x, y, z);
                let index = local_index(local);
                let ty = block(own[index]);
                if ty.is_air() {
                    continue;
                }

                let mut word = options[index];
                for face in Face::ALL {
                    let next = local.offset(face);
                    let along = next.axis(face.axis());
                    if !(0..CHUNK_DIM).contains(&along) {
                        continue;
                    }
                    let visible = face_visible(ty, block(own[local_index(next)]));
                    word.set_face_visible(face, visible);
                }
                options[index] = word;
            }
        }
    }
}

fn cull_boundary(
    face: Face,
    own: &[u32],
    neighbour: Option<&[u32]>,
    options: &mut [BlockOptions],
) {
    let axis = face.axis();
    let layer = if face.is_positive() { CHUNK_MASK } else { 0 };
    let mirrored = CHUNK_MASK - layer;

    for v in 0..CHUNK_DIM {
        for u in 0..CHUNK_DIM {
            let local = layer_position(axis, layer, u, v);
            let index = local_index(local);
            let ty = block(own[index]);
            if ty.is_air() {
                continue;
            }
            let visible = neighbour.map_or(true, |other| {
                let across = local.with_axis(axis, mirrored);
                face_visible(ty, block(other[local_index(across)]))
            });
            options[index].set_face_visible(face, visible);
        }
    }
}

/// Rebuild visibility for every live chunk on the calling thread.
///
/// Returns the total number of visible faces.
#[cfg_attr(
    feature = "profiling-tracy",
    tracing::instrument(level = "trace", skip_all)
)]
pub fn rebuild_culling(
    chunks: &ChunkAllocator,
    types: &BlockTypeField,
    options: &mut BlockOptionsField,
) -> u64 {
    options
        .chunks_mut()
        .enumerate()
        .map(|(slot, out)| cull_slot(slot, chunks, types, out))
        .sum()
}

/// Rebuild visibility for every live chunk on the rayon pool.
///
/// Types are only read and each chunk writes only its own options slice,
/// so chunks proceed independently once filling has finished.
#[cfg_attr(
    feature = "profiling-tracy",
    tracing::instrument(level = "trace", skip_all)
)]
pub fn rebuild_culling_parallel(
    chunks: &ChunkAllocator,
    types: &BlockTypeField,
    options: &mut BlockOptionsField,
) -> u64 {
    options
        .as_mut_slice()
        .par_chunks_mut(CHUNK_VOLUME)
        .enumerate()
        .map(|(slot, out)| cull_slot(slot, chunks, types, out))
        .sum()
}

#[inline]
fn cull_slot(
    slot: usize,
    chunks: &ChunkAllocator,
    types: &BlockTypeField,
    out: &mut [BlockOptions],
) -> u64 {
    let chunk = ChunkId::from_index(slot);
    let pos = chunks.position_of(chunk);
    if pos.is_sentinel() {
        0
    } else {
        cull_chunk(chunk, pos, types, chunks, out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cubeterrain_core::{FaceMask, Rotation};

    struct Fixture {
        chunks: ChunkAllocator,
        types: BlockTypeField,
        options: BlockOptionsField,
    }

    impl Fixture {
        fn new(capacity: usize) -> Self {
            Self {
                chunks: ChunkAllocator::new(capacity),
                types: BlockTypeField::new(capacity),
                options: BlockOptionsField::new(capacity),
            }
        }

        fn set(&mut self, pos: Position, ty: BlockType) {
            let id = self.types.set_block_type_world(&mut self.chunks, pos, ty);
            assert!(id.is_some());
        }

        fn cull(&mut self) -> u64 {
            rebuild_culling(&self.chunks, &self.types, &mut self.options)
        }

        fn mask(&self, pos: Position) -> FaceMask {
            self.options
                .options_world(&self.chunks, pos)
                .unwrap()
                .visibility_mask()
        }
    }

    #[test]
    fn visibility_rule() {
        use BlockType::{Air, Dirt, Stone, Water};
        assert!(face_visible(Stone, Air));
        assert!(face_visible(Water, Air));
        assert!(face_visible(Stone, Water));
        assert!(face_visible(Water, Stone));
        assert!(!face_visible(Stone, Dirt));
        assert!(!face_visible(Water, Water));
    }

    #[test]
    fn layer_positions() {
        assert_eq!(layer_position(0, 15, 1, 2), Position::new(15, 1, 2));
        assert_eq!(layer_position(1, 0, 1, 2), Position::new(2, 0, 1));
        assert_eq!(layer_position(2, 15, 1, 2), Position::new(1, 2, 15));
    }

    #[test]
    fn lone_voxel_shows_all_faces() {
        let mut world = Fixture::new(1);
        let pos = Position::new(5, 5, 5);
        world.set(pos, BlockType::Stone);
        assert_eq!(world.cull(), 6);
        assert_eq!(world.mask(pos), FaceMask::all());
        assert_eq!(world.mask(pos.offset(Face::Top)), FaceMask::empty());
    }

    #[test]
    fn shared_interior_face_is_hidden() {
        let mut world = Fixture::new(1);
        let a = Position::new(5, 5, 5);
        let b = a.offset(Face::Right);
        world.set(a, BlockType::Stone);
        world.set(b, BlockType::Dirt);
        assert_eq!(world.cull(), 10);
        assert!(!world.mask(a).has(Face::Right));
        assert!(!world.mask(b).has(Face::Left));
    }

    #[test]
    fn opacity_boundary_is_visible_both_ways() {
        let mut world = Fixture::new(1);
        let stone = Position::new(2, 2, 2);
        let water = stone.offset(Face::Front);
        world.set(stone, BlockType::Stone);
        world.set(water, BlockType::Water);
        world.cull();
        assert!(world.mask(stone).has(Face::Front));
        assert!(world.mask(water).has(Face::Back));
    }

    #[test]
    fn touching_water_hides_shared_face() {
        let mut world = Fixture::new(1);
        let a = Position::new(2, 2, 2);
        world.set(a, BlockType::Water);
        world.set(a.offset(Face::Top), BlockType::Water);
        world.cull();
        assert!(!world.mask(a).has(Face::Top));
    }

    #[test]
    fn absent_neighbour_chunk_is_open_space() {
        let mut world = Fixture::new(1);
        let corner = Position::new(0, 0, 0);
        world.set(corner, BlockType::Stone);
        world.set(corner.offset(Face::Right), BlockType::Stone);
        world.set(corner.offset(Face::Top), BlockType::Stone);
        world.set(corner.offset(Face::Front), BlockType::Stone);
        world.cull();
        assert_eq!(
            world.mask(corner),
            FaceMask::LEFT | FaceMask::BOTTOM | FaceMask::BACK
        );
    }

    #[test]
    fn chunk_seam_mirrors_one_axis() {
        for face in Face::ALL {
            let mut world = Fixture::new(2);
            // A voxel on the outer layer towards `face`, and one just across
            // the seam in the neighbouring chunk.
            let local = Position::new(7, 9, 3).with_axis(
                face.axis(),
                if face.is_positive() { CHUNK_MASK } else { 0 },
            );
            let across = local.offset(face);
            world.set(local, BlockType::Stone);
            world.set(across, BlockType::Sand);
            assert_ne!(
                world.chunks.lookup(local.chunk_pos()),
                world.chunks.lookup(across.chunk_pos())
            );
            world.cull();
            assert!(!world.mask(local).has(face), "{face:?}");
            assert!(!world.mask(across).has(face.opposite()), "{face:?}");
            assert_eq!(world.mask(local).face_count(), 5);
            assert_eq!(world.mask(across).face_count(), 5);
        }
    }

    #[test]
    fn seam_with_air_is_visible_from_solid_side() {
        let mut world = Fixture::new(2);
        let local = Position::new(15, 4, 4);
        world.set(local, BlockType::Stone);
        world.set(local.offset(Face::Right), BlockType::Air);
        world.cull();
        assert!(world.mask(local).has(Face::Right));
        assert_eq!(world.mask(local.offset(Face::Right)), FaceMask::empty());
    }

    #[test]
    fn air_option_words_are_left_alone() {
        let mut world = Fixture::new(1);
        let stone = Position::new(6, 6, 6);
        let air = stone.offset(Face::Top);
        world.set(stone, BlockType::Stone);
        world.set(air, BlockType::Air);
        let seeded = BlockOptions::EMPTY
            .with_visibility_mask(FaceMask::LEFT | FaceMask::FRONT)
            .with_rotation(Rotation::R180)
            .with_front_direction(Face::Bottom);
        assert!(world.options.update_world(&world.chunks, air, |_| seeded));

        world.cull();
        assert_eq!(world.options.options_world(&world.chunks, air), Some(seeded));
        assert!(world.mask(stone).has(Face::Top));
    }

    #[test]
    fn opacity_seam_across_chunks() {
        let mut world = Fixture::new(2);
        let stone = Position::new(15, 8, 8);
        let water = stone.offset(Face::Right);
        world.set(stone, BlockType::Stone);
        world.set(water, BlockType::Water);
        world.set(water.offset(Face::Right), BlockType::Water);
        assert_ne!(
            world.chunks.lookup(stone.chunk_pos()),
            world.chunks.lookup(water.chunk_pos())
        );
        world.cull();
        assert!(world.mask(stone).has(Face::Right));
        assert!(world.mask(water).has(Face::Left));
        assert!(!world.mask(water).has(Face::Right));
    }

    #[test]
    fn coordinate_range_edge_is_open() {
        let mut world = Fixture::new(2);
        let east = world.chunks.use_chunk(Position::new(i32::MAX, 0, 0));
        let west = world.chunks.use_chunk(Position::new(i32::MIN, 0, 0));
        let east_local = Position::new(15, 3, 3);
        let west_local = Position::new(0, 3, 3);
        world.types.set_block_type_at(east, east_local, BlockType::Stone);
        world.types.set_block_type_at(west, west_local, BlockType::Stone);

        // Both chunks sit at opposite ends of the X range; a wrapped
        // neighbour lookup would pair them up and hide these faces.
        assert_eq!(world.cull(), 12);
        assert!(world.options.is_face_visible_at(east, east_local, Face::Right));
        assert!(world.options.is_face_visible_at(west, west_local, Face::Left));

        world.options.clear();
        let faces = rebuild_culling_parallel(&world.chunks, &world.types, &mut world.options);
        assert_eq!(faces, 12);
        assert!(world.options.is_face_visible_at(east, east_local, Face::Right));
    }

    #[test]
    fn culling_preserves_orientation_bits() {
        let mut world = Fixture::new(1);
        let pos = Position::new(1, 1, 1);
        world.set(pos, BlockType::Stone);
        world
            .options
            .set_rotation_world(&world.chunks, pos, Rotation::R90);
        world
            .options
            .set_front_direction_world(&world.chunks, pos, Face::Top);
        world.cull();
        let word = world.options.options_world(&world.chunks, pos).unwrap();
        assert_eq!(word.rotation(), Rotation::R90);
        assert_eq!(word.front_direction(), Some(Face::Top));
        assert_eq!(word.visibility_mask(), FaceMask::all());
    }

    #[test]
    fn rebuild_clears_stale_bits() {
        let mut world = Fixture::new(1);
        let a = Position::new(3, 3, 3);
        world.set(a, BlockType::Stone);
        world.cull();
        assert!(world.mask(a).has(Face::Top));
        world.set(a.offset(Face::Top), BlockType::Stone);
        world.cull();
        assert!(!world.mask(a).has(Face::Top));
    }

    #[test]
    fn parallel_matches_sequential() {
        let mut world = Fixture::new(27);
        for i in 0..40 {
            let pos = Position::new(i * 3 % 29 - 7, i * 5 % 23 - 3, i * 7 % 31 - 9);
            world.set(pos, if i % 4 == 0 { BlockType::Water } else { BlockType::Stone });
        }
        let sequential_faces = world.cull();
        let sequential = world.options.clone();

        world.options.clear();
        let parallel_faces =
            rebuild_culling_parallel(&world.chunks, &world.types, &mut world.options);
        assert_eq!(sequential_faces, parallel_faces);
        assert_eq!(sequential, world.options);
    }
}
