use bevy::math::{Quat, Vec3};
use constants::coordinate_system::{Frame, position_at, quaternion_at};

use super::manifest::ModelManifest;

/// Closed set of geom shapes the physics engine declares. Raw values the
/// viewer does not know degrade to the engine's default shape (a sphere).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GeomKind {
    Plane,
    HeightField,
    Sphere,
    Capsule,
    Ellipsoid,
    Cylinder,
    Box,
    TriangleMesh,
    Unknown(i32),
}

impl GeomKind {
    /// The one shape kind that casts shadows but does not receive them.
    pub const NON_SHADOW_RECEIVING: GeomKind = GeomKind::TriangleMesh;

    pub fn from_raw(raw: i32) -> Self {
        match raw {
            0 => GeomKind::Plane,
            1 => GeomKind::HeightField,
            2 => GeomKind::Sphere,
            3 => GeomKind::Capsule,
            4 => GeomKind::Ellipsoid,
            5 => GeomKind::Cylinder,
            6 => GeomKind::Box,
            7 => GeomKind::TriangleMesh,
            other => GeomKind::Unknown(other),
        }
    }

    pub fn to_raw(self) -> i32 {
        match self {
            GeomKind::Plane => 0,
            GeomKind::HeightField => 1,
            GeomKind::Sphere => 2,
            GeomKind::Capsule => 3,
            GeomKind::Ellipsoid => 4,
            GeomKind::Cylinder => 5,
            GeomKind::Box => 6,
            GeomKind::TriangleMesh => 7,
            GeomKind::Unknown(other) => other,
        }
    }
}

/// Decode a NUL-terminated UTF-8 name starting at `offset` in the shared name
/// table. Malformed entries decode to the empty string rather than failing.
pub fn decode_name(names: &[u8], offset: usize) -> &str {
    let tail = names.get(offset..).unwrap_or(&[]);
    let end = tail.iter().position(|&b| b == 0).unwrap_or(tail.len());
    std::str::from_utf8(&tail[..end]).unwrap_or("")
}

impl ModelManifest {
    pub fn body(&self, id: usize) -> BodyView<'_> {
        BodyView { model: self, id }
    }

    pub fn geom(&self, id: usize) -> GeomView<'_> {
        GeomView { model: self, id }
    }

    pub fn mesh(&self, id: usize) -> MeshView<'_> {
        MeshView { model: self, id }
    }

    pub fn material(&self, id: usize) -> MaterialView<'_> {
        MaterialView { model: self, id }
    }

    pub fn texture(&self, id: usize) -> TextureView<'_> {
        TextureView { model: self, id }
    }

    pub fn light(&self, id: usize) -> LightView<'_> {
        LightView { model: self, id }
    }

    pub fn actuator(&self, id: usize) -> ActuatorView<'_> {
        ActuatorView { model: self, id }
    }

    pub fn keyframe(&self, id: usize) -> KeyframeView<'_> {
        KeyframeView { model: self, id }
    }
}

/// One body record: rest pose, parent link, name.
pub struct BodyView<'m> {
    model: &'m ModelManifest,
    id: usize,
}

impl BodyView<'_> {
    pub fn parent_id(&self) -> i32 {
        self.model.body_parent_id[self.id]
    }

    pub fn rest_position(&self, frame: Frame) -> Vec3 {
        position_at(&self.model.body_pos, self.id, frame)
    }

    pub fn rest_rotation(&self, frame: Frame) -> Quat {
        quaternion_at(&self.model.body_quat, self.id, frame)
    }

    pub fn name(&self) -> &str {
        decode_name(&self.model.names, self.model.body_name_offset[self.id])
    }
}

/// One geom record: shape, owning body, local placement, appearance.
pub struct GeomView<'m> {
    model: &'m ModelManifest,
    id: usize,
}

impl GeomView<'_> {
    pub fn body_id(&self) -> i32 {
        self.model.geom_body_id[self.id]
    }

    pub fn kind(&self) -> GeomKind {
        GeomKind::from_raw(self.model.geom_kind[self.id])
    }

    pub fn group(&self) -> i32 {
        self.model.geom_group[self.id]
    }

    pub fn size(&self) -> [f32; 3] {
        let base = self.id * 3;
        [
            self.model.geom_size[base] as f32,
            self.model.geom_size[base + 1] as f32,
            self.model.geom_size[base + 2] as f32,
        ]
    }

    pub fn position(&self, frame: Frame) -> Vec3 {
        position_at(&self.model.geom_pos, self.id, frame)
    }

    pub fn rotation(&self, frame: Frame) -> Quat {
        quaternion_at(&self.model.geom_quat, self.id, frame)
    }

    pub fn material_id(&self) -> Option<usize> {
        id_or_none(self.model.geom_material_id[self.id])
    }

    pub fn mesh_id(&self) -> Option<usize> {
        id_or_none(self.model.geom_mesh_id[self.id])
    }

    pub fn rgba(&self) -> [f32; 4] {
        let base = self.id * 4;
        self.model.geom_rgba[base..base + 4].try_into().unwrap_or([0.5, 0.5, 0.5, 1.0])
    }
}

/// One mesh record: contiguous sub-ranges of the shared vertex/face blobs.
pub struct MeshView<'m> {
    model: &'m ModelManifest,
    id: usize,
}

impl MeshView<'_> {
    pub fn vertices(&self) -> &[f32] {
        let start = self.model.mesh_vert_offset[self.id] * 3;
        let len = self.model.mesh_vert_count[self.id] * 3;
        &self.model.mesh_vert[start..start + len]
    }

    pub fn normals(&self) -> &[f32] {
        let start = self.model.mesh_vert_offset[self.id] * 3;
        let len = self.model.mesh_vert_count[self.id] * 3;
        &self.model.mesh_normal[start..start + len]
    }

    pub fn uvs(&self) -> &[f32] {
        if self.model.mesh_uv.is_empty() {
            return &[];
        }
        let start = self.model.mesh_uv_offset[self.id] * 2;
        let len = self.model.mesh_vert_count[self.id] * 2;
        &self.model.mesh_uv[start..start + len]
    }

    pub fn faces(&self) -> &[u32] {
        let start = self.model.mesh_face_offset[self.id] * 3;
        let len = self.model.mesh_face_count[self.id] * 3;
        &self.model.mesh_face[start..start + len]
    }

    pub fn name(&self) -> &str {
        decode_name(&self.model.names, self.model.mesh_name_offset[self.id])
    }
}

/// One material record.
pub struct MaterialView<'m> {
    model: &'m ModelManifest,
    id: usize,
}

impl MaterialView<'_> {
    pub fn rgba(&self) -> [f32; 4] {
        let base = self.id * 4;
        self.model.material_rgba[base..base + 4].try_into().unwrap_or([0.5, 0.5, 0.5, 1.0])
    }

    pub fn shininess(&self) -> f32 {
        self.model.material_shininess[self.id]
    }

    pub fn specular(&self) -> f32 {
        self.model.material_specular[self.id]
    }

    pub fn reflectance(&self) -> f32 {
        self.model.material_reflectance[self.id]
    }

    pub fn texture_id(&self) -> Option<usize> {
        id_or_none(self.model.material_texture_id[self.id])
    }

    pub fn texture_repeat(&self) -> [f32; 2] {
        let base = self.id * 2;
        [
            self.model.material_texture_repeat[base],
            self.model.material_texture_repeat[base + 1],
        ]
    }

    pub fn name(&self) -> &str {
        decode_name(&self.model.names, self.model.material_name_offset[self.id])
    }
}

/// One texture record: a row-major RGB window into the shared blob.
pub struct TextureView<'m> {
    model: &'m ModelManifest,
    id: usize,
}

impl TextureView<'_> {
    pub fn width(&self) -> usize {
        self.model.texture_width[self.id]
    }

    pub fn height(&self) -> usize {
        self.model.texture_height[self.id]
    }

    pub fn rgb(&self) -> &[u8] {
        let start = self.model.texture_offset[self.id];
        let len = self.width() * self.height() * 3;
        &self.model.texture_rgb[start..start + len]
    }

    pub fn name(&self) -> &str {
        decode_name(&self.model.names, self.model.texture_name_offset[self.id])
    }
}

/// One light record.
pub struct LightView<'m> {
    model: &'m ModelManifest,
    id: usize,
}

impl LightView<'_> {
    pub fn directional(&self) -> bool {
        self.model.light_directional[self.id]
    }

    /// Constant attenuation term; the linear and quadratic terms stay unread,
    /// matching the reference viewer.
    pub fn attenuation(&self) -> f32 {
        self.model.light_attenuation[self.id * 3] as f32
    }
}

/// One actuator record.
pub struct ActuatorView<'m> {
    model: &'m ModelManifest,
    id: usize,
}

impl ActuatorView<'_> {
    pub fn ctrl_range(&self) -> (f64, f64) {
        let base = self.id * 2;
        (
            self.model.actuator_ctrl_range[base],
            self.model.actuator_ctrl_range[base + 1],
        )
    }

    pub fn ctrl_limited(&self) -> bool {
        self.model.actuator_ctrl_limited[self.id]
    }

    pub fn name(&self) -> &str {
        decode_name(&self.model.names, self.model.actuator_name_offset[self.id])
    }
}

/// One keyframe record: a joint-position snapshot.
pub struct KeyframeView<'m> {
    model: &'m ModelManifest,
    id: usize,
}

impl KeyframeView<'_> {
    pub fn qpos(&self) -> &[f64] {
        let start = self.id * self.model.qpos_dim;
        &self.model.key_qpos[start..start + self.model.qpos_dim]
    }
}

fn id_or_none(raw: i32) -> Option<usize> {
    (raw >= 0).then_some(raw as usize)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::model::manifest::tests::two_body_box_model;

    #[test]
    fn geom_view_hides_stride_arithmetic() {
        let model = two_body_box_model();
        let geom = model.geom(0);
        assert_eq!(geom.body_id(), 1);
        assert_eq!(geom.kind(), GeomKind::Box);
        assert_eq!(geom.size(), [0.2, 0.3, 0.4]);
        assert_eq!(geom.material_id(), None);
        assert_eq!(geom.rgba(), [0.0, 1.0, 0.0, 1.0]);
    }

    #[test]
    fn body_rest_pose_converts_frames_on_read() {
        let model = two_body_box_model();
        let body = model.body(1);
        assert_eq!(body.rest_position(Frame::Physics), Vec3::new(0.0, 0.0, 0.5));
        assert_eq!(body.rest_position(Frame::Render), Vec3::new(0.0, 0.5, 0.0));
    }

    #[test]
    fn names_decode_to_the_nul_terminator() {
        let model = two_body_box_model();
        assert_eq!(model.body(0).name(), "world");
        assert_eq!(model.body(1).name(), "box");
    }

    #[test]
    fn malformed_name_entries_decode_empty() {
        // Offset past the table, and a table with invalid UTF-8.
        assert_eq!(decode_name(b"abc\0", 17), "");
        assert_eq!(decode_name(&[0xff, 0xfe, 0x00], 0), "");
        // Missing terminator still decodes to the end of the table.
        assert_eq!(decode_name(b"tail", 0), "tail");
    }

    #[test]
    fn unknown_geom_kinds_are_preserved_not_collapsed() {
        assert_eq!(GeomKind::from_raw(42), GeomKind::Unknown(42));
        assert_eq!(GeomKind::from_raw(42).to_raw(), 42);
    }
}
