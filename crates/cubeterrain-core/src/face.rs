//! Cube faces, face visibility masks and block rotations.

use bitflags::bitflags;
use glam::IVec3;

/// One of the six faces of a voxel.
///
/// The discriminant is the front-direction code stored in a block's options
/// word. The visibility bit is a separate, fixed assignment
/// (see [`Face::visibility_bit`]).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Face {
    /// +Z
    Front = 0,
    /// -Z
    Back = 1,
    /// -X
    Left = 2,
    /// +X
    Right = 3,
    /// +Y
    Top = 4,
    /// -Y
    Bottom = 5,
}

impl Face {
    /// All faces in direction-code order.
    pub const ALL: [Self; 6] = [
        Self::Front,
        Self::Back,
        Self::Left,
        Self::Right,
        Self::Top,
        Self::Bottom,
    ];

    /// Bit index of this face in the visibility mask.
    #[inline]
    pub const fn visibility_bit(self) -> u32 {
        match self {
            Self::Left => 0,
            Self::Right => 1,
            Self::Bottom => 2,
            Self::Top => 3,
            Self::Back => 4,
            Self::Front => 5,
        }
    }

    /// Front-direction code (0..=5).
    #[inline]
    pub const fn direction_code(self) -> u32 {
        self as u32
    }

    /// Inverse of [`Face::direction_code`].
    #[inline]
    pub const fn from_direction_code(code: u32) -> Option<Self> {
        match code {
            0 => Some(Self::Front),
            1 => Some(Self::Back),
            2 => Some(Self::Left),
            3 => Some(Self::Right),
            4 => Some(Self::Top),
            5 => Some(Self::Bottom),
            _ => None,
        }
    }

    /// Axis the face is perpendicular to (0 = X, 1 = Y, 2 = Z).
    #[inline]
    pub const fn axis(self) -> usize {
        match self {
            Self::Left | Self::Right => 0,
            Self::Bottom | Self::Top => 1,
            Self::Back | Self::Front => 2,
        }
    }

    /// Returns true if the face normal points along the positive axis.
    #[inline]
    pub const fn is_positive(self) -> bool {
        matches!(self, Self::Right | Self::Top | Self::Front)
    }

    /// Unit outward normal.
    #[inline]
    pub const fn normal(self) -> IVec3 {
        match self {
            Self::Front => IVec3::new(0, 0, 1),
            Self::Back => IVec3::new(0, 0, -1),
            Self::Left => IVec3::new(-1, 0, 0),
            Self::Right => IVec3::new(1, 0, 0),
            Self::Top => IVec3::new(0, 1, 0),
            Self::Bottom => IVec3::new(0, -1, 0),
        }
    }

    /// The face on the other side of the cube.
    #[inline]
    #[must_use]
    pub const fn opposite(self) -> Self {
        match self {
            Self::Front => Self::Back,
            Self::Back => Self::Front,
            Self::Left => Self::Right,
            Self::Right => Self::Left,
            Self::Top => Self::Bottom,
            Self::Bottom => Self::Top,
        }
    }

    /// Single-bit mask for this face.
    #[inline]
    pub const fn mask(self) -> FaceMask {
        FaceMask::from_bits_truncate(1 << self.visibility_bit())
    }
}

bitflags! {
    /// Six-bit face visibility mask.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct FaceMask: u8 {
        /// -X face is visible.
        const LEFT   = 0b00_0001;
        /// +X face is visible.
        const RIGHT  = 0b00_0010;
        /// -Y face is visible.
        const BOTTOM = 0b00_0100;
        /// +Y face is visible.
        const TOP    = 0b00_1000;
        /// -Z face is visible.
        const BACK   = 0b01_0000;
        /// +Z face is visible.
        const FRONT  = 0b10_0000;
    }
}

impl FaceMask {
    /// Number of distinct masks.
    pub const COUNT: usize = 64;

    /// Returns `true` if `face` is set.
    #[inline]
    #[must_use]
    pub const fn has(self, face: Face) -> bool {
        self.contains(face.mask())
    }

    /// Number of visible faces.
    #[inline]
    #[must_use]
    pub const fn face_count(self) -> u32 {
        self.bits().count_ones()
    }

    /// Visible faces in direction-code order.
    pub fn faces(self) -> impl Iterator<Item = Face> {
        Face::ALL.into_iter().filter(move |face| self.has(*face))
    }
}

impl From<Face> for FaceMask {
    fn from(face: Face) -> Self {
        face.mask()
    }
}

/// Block rotation about its front-back axis, clockwise.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Rotation {
    #[default]
    R0 = 0,
    R90 = 1,
    R180 = 2,
    R270 = 3,
}

impl Rotation {
    /// All rotations in code order.
    pub const ALL: [Self; 4] = [Self::R0, Self::R90, Self::R180, Self::R270];

    /// Two-bit rotation code.
    #[inline]
    pub const fn code(self) -> u32 {
        self as u32
    }

    /// Decode a rotation; only the low two bits are used.
    #[inline]
    pub const fn from_code(code: u32) -> Self {
        match code & 0b11 {
            0 => Self::R0,
            1 => Self::R90,
            2 => Self::R180,
            _ => Self::R270,
        }
    }

    /// Rotation angle in degrees.
    #[inline]
    pub const fn degrees(self) -> u32 {
        self.code() * 90
    }
}
