//! Precomputed face geometry for every visibility mask.
//!
//! For each of the 64 masks the table stores the quads of the faces set in
//! that mask, so a renderer can expand a voxel into geometry with one lookup
//! of its visibility bits. Faces appear in direction-code order (front, back,
//! left, right, top, bottom).

use std::sync::OnceLock;

use bytemuck::{Pod, Zeroable};
use cubeterrain_core::{Face, FaceMask};
use glam::Vec3;

/// Location of one mask's faces in the geometry buffer (8 bytes stride).
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Pod, Zeroable)]
pub struct EdgeTemplateIndex {
    /// First entry in the geometry buffer.
    pub address: i32,
    /// Number of faces.
    pub count: i32,
}

/// One face quad: four unit-cube corners and the outward normal (80 bytes
/// stride). Every vector is padded to four floats with a zero `w`.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct EdgeTemplate {
    pub corners: [[f32; 4]; 4],
    pub normal: [f32; 4],
}

impl EdgeTemplate {
    /// Quad for `face` of the unit cube at the origin.
    pub fn for_face(face: Face) -> Self {
        let normal = face.normal().as_vec3();
        Self {
            corners: face_corners(face).map(|c| c.extend(0.0).to_array()),
            normal: normal.extend(0.0).to_array(),
        }
    }

    /// Corner `i` as a vector.
    #[inline]
    pub fn corner(&self, i: usize) -> Vec3 {
        let [x, y, z, _] = self.corners[i];
        Vec3::new(x, y, z)
    }
}

/// Corners of a unit cube face, as a strip ordered so that
/// `(c1 - c0) x (c2 - c0)` points along the outward normal.
fn face_corners(face: Face) -> [Vec3; 4] {
    // (x, y, z): left/right, bottom/top, back/front
    const BK_LT_BM: Vec3 = Vec3::new(0.0, 0.0, 0.0);
    const BK_LT_TP: Vec3 = Vec3::new(0.0, 1.0, 0.0);
    const BK_RT_BM: Vec3 = Vec3::new(1.0, 0.0, 0.0);
    const BK_RT_TP: Vec3 = Vec3::new(1.0, 1.0, 0.0);
    const FT_LT_BM: Vec3 = Vec3::new(0.0, 0.0, 1.0);
    const FT_LT_TP: Vec3 = Vec3::new(0.0, 1.0, 1.0);
    const FT_RT_BM: Vec3 = Vec3::new(1.0, 0.0, 1.0);
    const FT_RT_TP: Vec3 = Vec3::new(1.0, 1.0, 1.0);

    match face {
        Face::Front => [FT_LT_TP, FT_LT_BM, FT_RT_TP, FT_RT_BM],
        Face::Back => [BK_RT_TP, BK_RT_BM, BK_LT_TP, BK_LT_BM],
        Face::Left => [BK_LT_TP, BK_LT_BM, FT_LT_TP, FT_LT_BM],
        Face::Right => [FT_RT_TP, FT_RT_BM, BK_RT_TP, BK_RT_BM],
        Face::Top => [BK_LT_TP, FT_LT_TP, BK_RT_TP, FT_RT_TP],
        Face::Bottom => [BK_RT_BM, FT_RT_BM, BK_LT_BM, FT_LT_BM],
    }
}

/// Index and geometry buffers for all 64 visibility masks.
#[derive(Debug, Clone)]
pub struct EdgeTemplateTable {
    index: [EdgeTemplateIndex; FaceMask::COUNT],
    geometry: Vec<EdgeTemplate>,
}

impl EdgeTemplateTable {
    /// Build the table.
    #[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
    pub fn build() -> Self {
        let mut index = [EdgeTemplateIndex::default(); FaceMask::COUNT];
        // Every face appears in half of the masks.
        let mut geometry = Vec::with_capacity(FaceMask::COUNT / 2 * Face::ALL.len());

        for (bits, entry) in index.iter_mut().enumerate() {
            let mask = FaceMask::from_bits_truncate(bits as u8);
            let address = geometry.len();
            geometry.extend(mask.faces().map(EdgeTemplate::for_face));
            *entry = EdgeTemplateIndex {
                address: address as i32,
                count: (geometry.len() - address) as i32,
            };
        }

        Self { index, geometry }
    }

    /// Index entry of `mask`.
    #[inline]
    pub fn entry(&self, mask: FaceMask) -> EdgeTemplateIndex {
        self.index[usize::from(mask.bits())]
    }

    /// Face quads of `mask` in direction-code order.
    #[allow(clippy::cast_sign_loss)]
    pub fn faces(&self, mask: FaceMask) -> &[EdgeTemplate] {
        let entry = self.entry(mask);
        let start = entry.address as usize;
        &self.geometry[start..start + entry.count as usize]
    }

    pub fn index(&self) -> &[EdgeTemplateIndex] {
        &self.index
    }

    pub fn geometry(&self) -> &[EdgeTemplate] {
        &self.geometry
    }

    /// Index buffer as raw bytes.
    pub fn index_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.index[..])
    }

    /// Geometry buffer as raw bytes.
    pub fn geometry_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.geometry)
    }
}

/// The shared template table, built on first use.
pub fn edge_templates() -> &'static EdgeTemplateTable {
    static TABLE: OnceLock<EdgeTemplateTable> = OnceLock::new();
    TABLE.get_or_init(EdgeTemplateTable::build)
}
