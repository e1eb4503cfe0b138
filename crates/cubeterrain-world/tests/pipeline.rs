//! End-to-end checks over generated worlds.

use cubeterrain_core::constants::{CHUNK_BITS, CHUNK_DIM, CHUNK_MASK};
use cubeterrain_core::{BlockType, Face, Position};
use cubeterrain_voxel::ChunkDescriptor;
use cubeterrain_world::{TerrainConfig, TerrainGenerator, TerrainWorld};

fn generated_world(seed: u64) -> TerrainWorld {
    let config = TerrainConfig::default()
        .with_size_factor(6)
        .with_chunk_capacity(256)
        .with_seed(seed);
    let mut world = TerrainWorld::new(config.chunk_capacity);
    world.regenerate(&config).unwrap();
    world
}

/// World positions of every voxel on the outer layer of `chunk` facing `face`.
fn boundary_layer(chunk: Position, face: Face) -> impl Iterator<Item = Position> {
    let base = chunk.shift_left(CHUNK_BITS);
    let axis = face.axis();
    let layer = if face.is_positive() { CHUNK_MASK } else { 0 };
    (0..CHUNK_DIM).flat_map(move |u| {
        (0..CHUNK_DIM).map(move |v| {
            base + Position::ZERO
                .with_axis(axis, layer)
                .with_axis((axis + 1) % 3, u)
                .with_axis((axis + 2) % 3, v)
        })
    })
}

#[test]
fn seams_are_symmetric() {
    let world = generated_world(11);
    let mut checked = 0;

    for (_, chunk) in world.chunks().live_chunks() {
        for face in Face::ALL {
            if world.chunks().lookup(chunk.offset(face)).is_none() {
                continue;
            }
            for pos in boundary_layer(chunk, face) {
                let here = world.block(pos).unwrap();
                let there = world.block(pos.offset(face)).unwrap();
                if here.is_air() {
                    continue;
                }
                let visible = world.visible_faces(pos).unwrap().has(face);
                if there.is_air() {
                    assert!(visible, "{pos:?} {face:?} faces air");
                    continue;
                }
                let back = world
                    .visible_faces(pos.offset(face))
                    .unwrap()
                    .has(face.opposite());
                assert_eq!(visible, back, "{pos:?} {face:?}");
                assert_eq!(visible, here.is_opaque() != there.is_opaque());
                checked += 1;
            }
        }
    }
    assert!(checked > 0);
}

#[test]
fn world_edge_is_open() {
    let world = generated_world(5);
    let mut checked = 0;

    for (_, chunk) in world.chunks().live_chunks() {
        for face in Face::ALL {
            if world.chunks().lookup(chunk.offset(face)).is_some() {
                continue;
            }
            for pos in boundary_layer(chunk, face) {
                if world.block(pos).is_some_and(|ty| !ty.is_air()) {
                    assert!(world.visible_faces(pos).unwrap().has(face));
                    checked += 1;
                }
            }
        }
    }
    assert!(checked > 0);
}

#[test]
fn buried_voxels_are_hidden() {
    let world = generated_world(3);
    let map = world.height_map().unwrap();
    let mut checked = 0;

    for z in 1..map.size() - 1 {
        for x in 1..map.size() - 1 {
            let lowest = [(0, 0), (1, 0), (-1, 0), (0, 1), (0, -1)]
                .iter()
                .map(|(dx, dz)| (map.get(x + dx, z + dz) * 25.0) as i32)
                .min()
                .unwrap_or_default();
            // Two below the lowest neighbouring surface is surrounded by
            // solid ground on all sides.
            let pos = Position::new(x, lowest - 2, z);
            let Some(ty) = world.block(pos) else {
                continue;
            };
            if ty.is_air() || Face::ALL.iter().any(|f| world.block(pos.offset(*f)).is_none()) {
                continue;
            }
            assert_eq!(
                world.visible_faces(pos).unwrap().face_count(),
                0,
                "{pos:?} {ty:?}"
            );
            checked += 1;
        }
    }
    assert!(checked > 0);
}

#[test]
fn same_seed_same_world() {
    let a = generated_world(42);
    let b = generated_world(42);
    assert_eq!(a.buffers().block_types, b.buffers().block_types);
    assert_eq!(a.buffers().block_options, b.buffers().block_options);
    assert_eq!(a.buffers().chunk_descriptors, b.buffers().chunk_descriptors);

    let c = generated_world(43);
    assert_ne!(a.buffers().block_types, c.buffers().block_types);
}

#[test]
fn seed_changes_field_but_not_bounds() {
    let mut a = TerrainGenerator::new(7, 8.0, 1);
    let mut b = TerrainGenerator::new(7, 8.0, 2);
    a.generate();
    b.generate();
    assert_ne!(a.data(), b.data());
    assert_eq!(a.data().len(), b.data().len());
    for map in [&a, &b] {
        let stats = map.statistics();
        assert!(stats.min >= -1.0 && stats.max <= 1.0);
    }
}

#[test]
fn small_pool_keeps_partition() {
    let config = TerrainConfig::default()
        .with_size_factor(6)
        .with_chunk_capacity(5);
    let mut world = TerrainWorld::new(5);
    let stats = world.regenerate(&config).unwrap();

    assert_eq!(stats.fill.chunks_filled, 5);
    assert!(stats.fill.chunks_dropped > 0);
    assert_eq!(world.chunks().live_count(), 5);
    assert_eq!(world.chunks().free_count(), 0);
    assert!(world
        .chunks()
        .descriptors()
        .iter()
        .all(|d| *d != ChunkDescriptor::FREE));
}

#[test]
fn filled_types_are_terrain_blocks() {
    let world = generated_world(9);
    let allowed = [BlockType::Air, BlockType::Stone, BlockType::Dirt, BlockType::Sand];
    for (id, _) in world.chunks().live_chunks() {
        for &code in world.types().chunk(id).unwrap() {
            let ty = BlockType::from_code(code).unwrap();
            assert!(allowed.contains(&ty), "{ty:?}");
        }
    }
}
