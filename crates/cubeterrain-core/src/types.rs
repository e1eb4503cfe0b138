//! Block types and their packed descriptors.
//!
//! The registry is a fixed array indexed by [`BlockType`] ordinal. The
//! ordinal is the type code stored per voxel, and the descriptor array is
//! handed verbatim to the renderer (one 16-byte record per type).

use bytemuck::{Pod, Zeroable};

/// Transparent (0) or opaque (1).
pub const OPAQUE_BIT: u32 = 1 << 0;
/// Texture variants are animation frames.
pub const ANIMATED_BIT: u32 = 1 << 1;
/// Shift of the 2-bit texture mapping field.
pub const TEXTURE_MAPPING_SHIFT: u32 = 2;
/// Mask of the texture mapping field (before shifting).
pub const TEXTURE_MAPPING_MASK: u32 = 0b11;
/// Shift of the 16-bit variant/frame count field.
pub const VARIANTS_SHIFT: u32 = 16;

/// How a block type's texture is laid out over its faces.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum TextureMapping {
    /// All faces share one texture.
    #[default]
    Uniform = 0,
    /// Top face differs from the rest.
    DistinctTop = 1,
    /// Top and bottom faces differ from the sides.
    DistinctTopBottom = 2,
    /// Every face has its own texture.
    AllDistinct = 3,
}

impl TextureMapping {
    /// Decode from the low two bits of `code`.
    #[inline]
    pub const fn from_code(code: u32) -> Self {
        match code & TEXTURE_MAPPING_MASK {
            0 => Self::Uniform,
            1 => Self::DistinctTop,
            2 => Self::DistinctTopBottom,
            _ => Self::AllDistinct,
        }
    }
}

/// GPU block type descriptor (16 bytes stride).
///
/// ```text
///  options word
///  31                16 15           4  3  2  1  0
/// +--------------------+--------------+-----+--+--+
/// |  variants / frames |              | map |an|op|
/// +--------------------+--------------+-----+--+--+
/// ```
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Pod, Zeroable)]
pub struct BlockTypeDescriptor {
    pub options: u32,
    pub texture_size: u32,
    pub texture_x: u32,
    pub texture_y: u32,
}

impl BlockTypeDescriptor {
    /// Pack a descriptor.
    pub const fn new(
        variants: u16,
        opaque: bool,
        animated: bool,
        mapping: TextureMapping,
        texture_size: u32,
        texture_x: u32,
        texture_y: u32,
    ) -> Self {
        let mut options = (variants as u32) << VARIANTS_SHIFT;
        if opaque {
            options |= OPAQUE_BIT;
        }
        if animated {
            options |= ANIMATED_BIT;
        }
        options |= (mapping as u32) << TEXTURE_MAPPING_SHIFT;
        Self {
            options,
            texture_size,
            texture_x,
            texture_y,
        }
    }

    #[inline]
    pub const fn is_opaque(&self) -> bool {
        self.options & OPAQUE_BIT != 0
    }

    #[inline]
    pub const fn is_animated(&self) -> bool {
        self.options & ANIMATED_BIT != 0
    }

    #[inline]
    pub const fn texture_mapping(&self) -> TextureMapping {
        TextureMapping::from_code(self.options >> TEXTURE_MAPPING_SHIFT)
    }

    /// Texture variant count, or animation frame count when animated.
    #[inline]
    #[allow(clippy::cast_possible_truncation)]
    pub const fn variants(&self) -> u16 {
        (self.options >> VARIANTS_SHIFT) as u16
    }
}

/// Voxel type. The discriminant is the stored type code.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum BlockType {
    /// Empty space. Never faced.
    #[default]
    Air = 0,
    Stone = 1,
    Dirt = 2,
    Sand = 3,
    Snow = 4,
    Water = 5,
}

/// All block types in ordinal order.
pub const BLOCK_TYPES: [BlockType; 6] = [
    BlockType::Air,
    BlockType::Stone,
    BlockType::Dirt,
    BlockType::Sand,
    BlockType::Snow,
    BlockType::Water,
];

/// Descriptor table, indexed by type code.
pub static BLOCK_TYPE_DESCRIPTORS: [BlockTypeDescriptor; 6] = [
    BlockTypeDescriptor::new(1, false, false, TextureMapping::Uniform, 128, 0, 0),
    BlockTypeDescriptor::new(1, true, false, TextureMapping::Uniform, 128, 0, 128),
    BlockTypeDescriptor::new(1, true, false, TextureMapping::Uniform, 128, 0, 256),
    BlockTypeDescriptor::new(1, true, false, TextureMapping::Uniform, 128, 0, 384),
    BlockTypeDescriptor::new(1, true, false, TextureMapping::Uniform, 128, 0, 512),
    BlockTypeDescriptor::new(32, false, false, TextureMapping::Uniform, 128, 128, 0),
];

impl BlockType {
    /// Stored type code
    #[inline]
    pub const fn code(self) -> u32 {
        self as u32
    }

    /// Look up a type by its stored code.
    #[inline]
    pub const fn from_code(code: u32) -> Option<Self> {
        if (code as usize) < BLOCK_TYPES.len() {
            Some(BLOCK_TYPES[code as usize])
        } else {
            None
        }
    }

    /// Packed descriptor of this type
    #[inline]
    pub fn descriptor(self) -> &'static BlockTypeDescriptor {
        &BLOCK_TYPE_DESCRIPTORS[self as usize]
    }

    /// Returns true if this block is air (empty)
    #[inline]
    pub const fn is_air(self) -> bool {
        matches!(self, Self::Air)
    }

    #[inline]
    pub fn is_opaque(self) -> bool {
        self.descriptor().is_opaque()
    }

    #[inline]
    pub fn is_transparent(self) -> bool {
        !self.is_opaque()
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::Air => "air",
            Self::Stone => "stone",
            Self::Dirt => "dirt",
            Self::Sand => "sand",
            Self::Snow => "snow",
            Self::Water => "water",
        }
    }
}

/// The descriptor table as raw bytes for the renderer.
pub fn descriptor_bytes() -> &'static [u8] {
    bytemuck::cast_slice(&BLOCK_TYPE_DESCRIPTORS[..])
}
