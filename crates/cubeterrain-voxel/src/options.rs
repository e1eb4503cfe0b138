//! Packed per-voxel option word.
//!
//! ```text
//!  31            11 10     8 7    6 5                0
//! +----------------+--------+------+------------------+
//! |    reserved    | front  | rot  |    visibility    |
//! +----------------+--------+------+------------------+
//!                                   F  B  T  Bm R  L
//! ```
//!
//! Each setter is a read-modify-write that leaves the other fields intact.

use bytemuck::{Pod, Zeroable};
use cubeterrain_core::{ChunkId, Face, FaceMask, Position, Rotation};

use crate::allocator::ChunkAllocator;
use crate::field::BlockOptionsField;

/// Shift of the six visibility bits.
pub const VISIBILITY_SHIFT: u32 = 0;
/// Mask of the visibility bits (before shifting).
pub const VISIBILITY_MASK: u32 = 0b11_1111;
/// Shift of the 2-bit rotation field.
pub const ROTATION_SHIFT: u32 = 6;
/// Mask of the rotation field (before shifting).
pub const ROTATION_MASK: u32 = 0b11;
/// Shift of the 3-bit front direction field.
pub const DIRECTION_SHIFT: u32 = 8;
/// Mask of the front direction field (before shifting).
pub const DIRECTION_MASK: u32 = 0b111;

/// One voxel's option word.
#[repr(transparent)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Pod, Zeroable)]
pub struct BlockOptions(pub u32);

impl BlockOptions {
    /// All fields zero: no visible faces, no rotation, facing front.
    pub const EMPTY: Self = Self(0);

    #[inline]
    const fn field(self, shift: u32, mask: u32) -> u32 {
        (self.0 >> shift) & mask
    }

    #[inline]
    const fn with_field(self, shift: u32, mask: u32, value: u32) -> Self {
        Self((self.0 & !(mask << shift)) | ((value & mask) << shift))
    }

    /// Returns true if `face` is marked visible.
    #[inline]
    pub const fn is_face_visible(self, face: Face) -> bool {
        self.0 & (1 << face.visibility_bit()) != 0
    }

    /// Copy with one visibility bit set or cleared.
    #[inline]
    #[must_use]
    pub const fn with_face_visible(self, face: Face, visible: bool) -> Self {
        self.with_field(face.visibility_bit(), 1, visible as u32)
    }

    #[inline]
    pub fn set_face_visible(&mut self, face: Face, visible: bool) {
        *self = self.with_face_visible(face, visible);
    }

    /// All six visibility bits.
    #[inline]
    #[allow(clippy::cast_possible_truncation)]
    pub const fn visibility_mask(self) -> FaceMask {
        FaceMask::from_bits_truncate(self.field(VISIBILITY_SHIFT, VISIBILITY_MASK) as u8)
    }

    #[inline]
    #[must_use]
    pub const fn with_visibility_mask(self, mask: FaceMask) -> Self {
        self.with_field(VISIBILITY_SHIFT, VISIBILITY_MASK, mask.bits() as u32)
    }

    #[inline]
    pub fn set_visibility_mask(&mut self, mask: FaceMask) {
        *self = self.with_visibility_mask(mask);
    }

    /// Number of visible faces (0..=6).
    #[inline]
    pub const fn visible_face_count(self) -> u32 {
        self.field(VISIBILITY_SHIFT, VISIBILITY_MASK).count_ones()
    }

    #[inline]
    pub const fn rotation(self) -> Rotation {
        Rotation::from_code(self.field(ROTATION_SHIFT, ROTATION_MASK))
    }

    #[inline]
    #[must_use]
    pub const fn with_rotation(self, rotation: Rotation) -> Self {
        self.with_field(ROTATION_SHIFT, ROTATION_MASK, rotation.code())
    }

    #[inline]
    pub fn set_rotation(&mut self, rotation: Rotation) {
        *self = self.with_rotation(rotation);
    }

    /// Face the block points towards. `None` for the unused codes 6 and 7.
    #[inline]
    pub const fn front_direction(self) -> Option<Face> {
        Face::from_direction_code(self.field(DIRECTION_SHIFT, DIRECTION_MASK))
    }

    #[inline]
    #[must_use]
    pub const fn with_front_direction(self, face: Face) -> Self {
        self.with_field(DIRECTION_SHIFT, DIRECTION_MASK, face.direction_code())
    }

    #[inline]
    pub fn set_front_direction(&mut self, face: Face) {
        *self = self.with_front_direction(face);
    }
}

impl BlockOptionsField {
    /// Visibility of `face` at a linear address.
    #[inline]
    pub fn is_face_visible(&self, address: usize, face: Face) -> bool {
        self.get(address).is_face_visible(face)
    }

    #[inline]
    pub fn set_face_visible(&mut self, address: usize, face: Face, visible: bool) {
        self.update(address, |options| options.with_face_visible(face, visible));
    }

    /// Visibility of `face` at `local` in `chunk`.
    #[inline]
    pub fn is_face_visible_at(&self, chunk: ChunkId, local: Position, face: Face) -> bool {
        self.get_at(chunk, local).is_face_visible(face)
    }

    #[inline]
    pub fn set_face_visible_at(&mut self, chunk: ChunkId, local: Position, face: Face, visible: bool) {
        self.update_at(chunk, local, |options| options.with_face_visible(face, visible));
    }

    #[inline]
    pub fn visibility_mask(&self, address: usize) -> FaceMask {
        self.get(address).visibility_mask()
    }

    #[inline]
    pub fn set_visibility_mask(&mut self, address: usize, mask: FaceMask) {
        self.update(address, |options| options.with_visibility_mask(mask));
    }

    #[inline]
    pub fn rotation(&self, address: usize) -> Rotation {
        self.get(address).rotation()
    }

    #[inline]
    pub fn set_rotation(&mut self, address: usize, rotation: Rotation) {
        self.update(address, |options| options.with_rotation(rotation));
    }

    #[inline]
    pub fn front_direction(&self, address: usize) -> Option<Face> {
        self.get(address).front_direction()
    }

    #[inline]
    pub fn set_front_direction(&mut self, address: usize, face: Face) {
        self.update(address, |options| options.with_front_direction(face));
    }

    /// Options word at a world position, or `None` if its chunk is not allocated.
    #[inline]
    pub fn options_world(&self, chunks: &ChunkAllocator, pos: Position) -> Option<BlockOptions> {
        self.get_world(chunks, pos)
    }

    /// Returns false if the chunk at `pos` is not allocated.
    pub fn set_face_visible_world(
        &mut self,
        chunks: &ChunkAllocator,
        pos: Position,
        face: Face,
        visible: bool,
    ) -> bool {
        self.update_world(chunks, pos, |options| options.with_face_visible(face, visible))
    }

    /// Returns false if the chunk at `pos` is not allocated.
    pub fn set_rotation_world(
        &mut self,
        chunks: &ChunkAllocator,
        pos: Position,
        rotation: Rotation,
    ) -> bool {
        self.update_world(chunks, pos, |options| options.with_rotation(rotation))
    }

    /// Returns false if the chunk at `pos` is not allocated.
    pub fn set_front_direction_world(
        &mut self,
        chunks: &ChunkAllocator,
        pos: Position,
        face: Face,
    ) -> bool {
        self.update_world(chunks, pos, |options| options.with_front_direction(face))
    }

    /// Total number of visible faces in the field.
    pub fn visible_face_total(&self) -> u64 {
        self.as_slice()
            .iter()
            .map(|options| u64::from(options.visible_face_count()))
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn visibility_bit_positions() {
        let expected = [
            (Face::Left, 1 << 0),
            (Face::Right, 1 << 1),
            (Face::Bottom, 1 << 2),
            (Face::Top, 1 << 3),
            (Face::Back, 1 << 4),
            (Face::Front, 1 << 5),
        ];
        for (face, bit) in expected {
            assert_eq!(BlockOptions::EMPTY.with_face_visible(face, true).0, bit);
        }
    }

    #[test]
    fn fields_are_independent() {
        let mut options = BlockOptions::EMPTY;
        options.set_face_visible(Face::Top, true);
        options.set_rotation(Rotation::R270);
        options.set_front_direction(Face::Bottom);
        assert_eq!(options.0, (1 << 3) | (3 << 6) | (5 << 8));

        options.set_face_visible(Face::Top, false);
        assert_eq!(options.rotation(), Rotation::R270);
        assert_eq!(options.front_direction(), Some(Face::Bottom));
        assert_eq!(options.visibility_mask(), FaceMask::empty());

        options.set_rotation(Rotation::R90);
        assert_eq!(options.front_direction(), Some(Face::Bottom));
        assert_eq!(options.0, (1 << 6) | (5 << 8));
    }

    #[test]
    fn every_field_combination_reads_back() {
        for bits in 0..64u8 {
            let mask = FaceMask::from_bits_truncate(bits);
            for rotation in Rotation::ALL {
                for face in Face::ALL {
                    let options = BlockOptions::EMPTY
                        .with_front_direction(face)
                        .with_visibility_mask(mask)
                        .with_rotation(rotation);
                    assert_eq!(options.visibility_mask(), mask);
                    assert_eq!(options.rotation(), rotation);
                    assert_eq!(options.front_direction(), Some(face));
                    assert_eq!(options.visible_face_count(), mask.face_count());
                }
            }
        }
    }

    #[test]
    fn reserved_bits_are_preserved() {
        let options = BlockOptions(0xFFFF_F800)
            .with_visibility_mask(FaceMask::all())
            .with_rotation(Rotation::R180)
            .with_front_direction(Face::Right);
        assert_eq!(options.0 & 0xFFFF_F800, 0xFFFF_F800);
    }

    #[test]
    fn unused_direction_codes() {
        assert_eq!(BlockOptions(6 << 8).front_direction(), None);
        assert_eq!(BlockOptions(7 << 8).front_direction(), None);
    }

    #[test]
    fn field_helpers() {
        let mut chunks = ChunkAllocator::new(1);
        let chunk = chunks.use_chunk(Position::ZERO);
        let mut field = BlockOptionsField::new(1);
        let local = Position::new(1, 2, 3);

        field.set_face_visible_at(chunk, local, Face::Front, true);
        field.set_face_visible_at(chunk, local, Face::Left, true);
        assert!(field.is_face_visible_at(chunk, local, Face::Front));
        assert!(!field.is_face_visible_at(chunk, local, Face::Back));

        let address = crate::field::block_address(chunk, local).unwrap();
        field.set_rotation(address, Rotation::R90);
        assert_eq!(field.visibility_mask(address), FaceMask::FRONT | FaceMask::LEFT);
        assert_eq!(field.rotation(address), Rotation::R90);
        assert_eq!(field.front_direction(address), Some(Face::Front));
        assert_eq!(field.visible_face_total(), 2);
    }

    #[test]
    fn world_position_helpers() {
        let mut chunks = ChunkAllocator::new(2);
        let mut field = BlockOptionsField::new(2);
        let pos = Position::new(-5, 3, 40);
        assert!(!field.set_rotation_world(&chunks, pos, Rotation::R180));
        assert_eq!(field.options_world(&chunks, pos), None);

        chunks.use_chunk(pos.chunk_pos());
        assert!(field.set_rotation_world(&chunks, pos, Rotation::R180));
        assert!(field.set_front_direction_world(&chunks, pos, Face::Left));
        assert!(field.set_face_visible_world(&chunks, pos, Face::Top, true));
        let options = field.options_world(&chunks, pos).unwrap();
        assert_eq!(options.rotation(), Rotation::R180);
        assert_eq!(options.front_direction(), Some(Face::Left));
        assert_eq!(options.visibility_mask(), FaceMask::TOP);
    }
}
