use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Structural inconsistency in a loaded model. Anything else the model can
/// throw at the viewer degrades gracefully; a dangling cross-reference or a
/// short column is the one thing scene synthesis refuses to work with.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ModelError {
    #[error("geom {geom} references body {body}, but the model declares {count} bodies")]
    GeomBodyOutOfRange { geom: usize, body: i32, count: usize },

    #[error("geom {geom} references material {material}, but the model declares {count} materials")]
    GeomMaterialOutOfRange {
        geom: usize,
        material: i32,
        count: usize,
    },

    #[error("geom {geom} references mesh {mesh}, but the model declares {count} meshes")]
    GeomMeshOutOfRange { geom: usize, mesh: i32, count: usize },

    #[error("material {material} references texture {texture}, but the model declares {count} textures")]
    MaterialTextureOutOfRange {
        material: usize,
        texture: i32,
        count: usize,
    },

    #[error("mesh {mesh} sub-range [{offset}..{offset}+{len}] runs past the {column} blob ({available} entries)")]
    MeshRangeOutOfBounds {
        mesh: usize,
        column: &'static str,
        offset: usize,
        len: usize,
        available: usize,
    },

    #[error("texture {texture} data runs past the RGB blob ({available} bytes)")]
    TextureRangeOutOfBounds { texture: usize, available: usize },

    #[error("column {column} holds {actual} entries, expected {expected}")]
    ColumnLength {
        column: &'static str,
        expected: usize,
        actual: usize,
    },
}

/// Flat, column-oriented description of a physics model, mirroring the
/// engine-side layout exactly: counts plus per-entity parallel arrays
/// addressed by `id * stride`. Loaded as a JSON asset.
///
/// Mesh vertex/normal/UV/face data and texture RGB data live in shared blobs
/// indexed through per-entity offset/count columns. Entity names live in one
/// NUL-terminated UTF-8 byte table addressed by per-entity offsets.
#[derive(Asset, TypePath, Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelManifest {
    // Entity counts.
    pub body_count: usize,
    pub geom_count: usize,
    pub mesh_count: usize,
    pub material_count: usize,
    pub texture_count: usize,
    pub light_count: usize,
    pub actuator_count: usize,
    pub keyframe_count: usize,
    /// Length of one joint-position vector (`qpos`).
    pub qpos_dim: usize,

    // Bodies.
    pub body_parent_id: Vec<i32>,
    /// Stride 3. World-frame rest position, physics convention.
    pub body_pos: Vec<f64>,
    /// Stride 4. World-frame rest orientation, physics convention.
    pub body_quat: Vec<f64>,
    pub body_name_offset: Vec<usize>,

    // Geoms.
    pub geom_body_id: Vec<i32>,
    pub geom_kind: Vec<i32>,
    /// Stride 3. Shape-kind specific size parameters.
    pub geom_size: Vec<f64>,
    /// Stride 3. Position local to the owning body, physics convention.
    pub geom_pos: Vec<f64>,
    /// Stride 4. Orientation local to the owning body, physics convention.
    pub geom_quat: Vec<f64>,
    pub geom_group: Vec<i32>,
    /// -1 when the geom carries a literal colour instead of a material.
    pub geom_material_id: Vec<i32>,
    /// Stride 4.
    pub geom_rgba: Vec<f32>,
    /// Mesh id for mesh-kind geoms, -1 otherwise.
    pub geom_mesh_id: Vec<i32>,

    // Meshes. Offsets count entries (vertices, faces), not floats.
    pub mesh_vert_offset: Vec<usize>,
    pub mesh_vert_count: Vec<usize>,
    pub mesh_face_offset: Vec<usize>,
    pub mesh_face_count: Vec<usize>,
    pub mesh_uv_offset: Vec<usize>,
    /// Stride 3, physics convention.
    pub mesh_vert: Vec<f32>,
    /// Stride 3, physics convention.
    pub mesh_normal: Vec<f32>,
    /// Stride 2.
    pub mesh_uv: Vec<f32>,
    /// Stride 3, indices into the mesh's vertex sub-range.
    pub mesh_face: Vec<u32>,
    pub mesh_name_offset: Vec<usize>,

    // Materials.
    /// Stride 4.
    pub material_rgba: Vec<f32>,
    pub material_shininess: Vec<f32>,
    pub material_specular: Vec<f32>,
    pub material_reflectance: Vec<f32>,
    /// -1 when the material is untextured.
    pub material_texture_id: Vec<i32>,
    /// Stride 2.
    pub material_texture_repeat: Vec<f32>,
    pub material_name_offset: Vec<usize>,

    // Textures: row-major RGB bytes in one shared blob.
    pub texture_kind: Vec<i32>,
    pub texture_width: Vec<usize>,
    pub texture_height: Vec<usize>,
    pub texture_offset: Vec<usize>,
    pub texture_rgb: Vec<u8>,
    pub texture_name_offset: Vec<usize>,

    // Lights.
    pub light_directional: Vec<bool>,
    /// Stride 3: constant, linear, quadratic attenuation terms.
    pub light_attenuation: Vec<f64>,

    // Actuators.
    /// Stride 2: low, high.
    pub actuator_ctrl_range: Vec<f64>,
    pub actuator_ctrl_limited: Vec<bool>,
    pub actuator_name_offset: Vec<usize>,

    // Keyframes: stride `qpos_dim` joint-position snapshots.
    pub key_qpos: Vec<f64>,

    /// NUL-terminated UTF-8 name table shared by all entity kinds.
    pub names: Vec<u8>,
}

impl ModelManifest {
    /// Check the manifest for structural consistency: every column sized for
    /// its declared entity count, every cross-reference in range, every
    /// mesh/texture sub-range inside its blob.
    pub fn validate(&self) -> Result<(), ModelError> {
        self.check_column_lengths()?;

        for geom in 0..self.geom_count {
            let body = self.geom_body_id[geom];
            if body < 0 || body as usize >= self.body_count {
                return Err(ModelError::GeomBodyOutOfRange {
                    geom,
                    body,
                    count: self.body_count,
                });
            }

            let material = self.geom_material_id[geom];
            if material != -1 && (material < 0 || material as usize >= self.material_count) {
                return Err(ModelError::GeomMaterialOutOfRange {
                    geom,
                    material,
                    count: self.material_count,
                });
            }

            let mesh = self.geom_mesh_id[geom];
            if mesh != -1 && (mesh < 0 || mesh as usize >= self.mesh_count) {
                return Err(ModelError::GeomMeshOutOfRange {
                    geom,
                    mesh,
                    count: self.mesh_count,
                });
            }
        }

        for material in 0..self.material_count {
            let texture = self.material_texture_id[material];
            if texture != -1 && (texture < 0 || texture as usize >= self.texture_count) {
                return Err(ModelError::MaterialTextureOutOfRange {
                    material,
                    texture,
                    count: self.texture_count,
                });
            }
        }

        for mesh in 0..self.mesh_count {
            self.check_mesh_range(mesh, "mesh_vert", self.mesh_vert_offset[mesh], self.mesh_vert_count[mesh], 3, self.mesh_vert.len())?;
            self.check_mesh_range(mesh, "mesh_normal", self.mesh_vert_offset[mesh], self.mesh_vert_count[mesh], 3, self.mesh_normal.len())?;
            // Texture coordinates are optional; a model without them ships an
            // empty blob.
            if !self.mesh_uv.is_empty() {
                self.check_mesh_range(mesh, "mesh_uv", self.mesh_uv_offset[mesh], self.mesh_vert_count[mesh], 2, self.mesh_uv.len())?;
            }
            self.check_mesh_range(mesh, "mesh_face", self.mesh_face_offset[mesh], self.mesh_face_count[mesh], 3, self.mesh_face.len())?;
        }

        for texture in 0..self.texture_count {
            let len = self.texture_width[texture] * self.texture_height[texture] * 3;
            if self.texture_offset[texture] + len > self.texture_rgb.len() {
                return Err(ModelError::TextureRangeOutOfBounds {
                    texture,
                    available: self.texture_rgb.len(),
                });
            }
        }

        Ok(())
    }

    fn check_mesh_range(
        &self,
        mesh: usize,
        column: &'static str,
        offset: usize,
        count: usize,
        stride: usize,
        available: usize,
    ) -> Result<(), ModelError> {
        if (offset + count) * stride > available {
            return Err(ModelError::MeshRangeOutOfBounds {
                mesh,
                column,
                offset: offset * stride,
                len: count * stride,
                available,
            });
        }
        Ok(())
    }

    fn check_column_lengths(&self) -> Result<(), ModelError> {
        let expectations: &[(&'static str, usize, usize)] = &[
            ("body_parent_id", self.body_parent_id.len(), self.body_count),
            ("body_pos", self.body_pos.len(), self.body_count * 3),
            ("body_quat", self.body_quat.len(), self.body_count * 4),
            ("body_name_offset", self.body_name_offset.len(), self.body_count),
            ("geom_body_id", self.geom_body_id.len(), self.geom_count),
            ("geom_kind", self.geom_kind.len(), self.geom_count),
            ("geom_size", self.geom_size.len(), self.geom_count * 3),
            ("geom_pos", self.geom_pos.len(), self.geom_count * 3),
            ("geom_quat", self.geom_quat.len(), self.geom_count * 4),
            ("geom_group", self.geom_group.len(), self.geom_count),
            ("geom_material_id", self.geom_material_id.len(), self.geom_count),
            ("geom_rgba", self.geom_rgba.len(), self.geom_count * 4),
            ("geom_mesh_id", self.geom_mesh_id.len(), self.geom_count),
            ("mesh_vert_offset", self.mesh_vert_offset.len(), self.mesh_count),
            ("mesh_vert_count", self.mesh_vert_count.len(), self.mesh_count),
            ("mesh_face_offset", self.mesh_face_offset.len(), self.mesh_count),
            ("mesh_face_count", self.mesh_face_count.len(), self.mesh_count),
            ("mesh_uv_offset", self.mesh_uv_offset.len(), self.mesh_count),
            ("mesh_name_offset", self.mesh_name_offset.len(), self.mesh_count),
            ("material_rgba", self.material_rgba.len(), self.material_count * 4),
            ("material_shininess", self.material_shininess.len(), self.material_count),
            ("material_specular", self.material_specular.len(), self.material_count),
            ("material_reflectance", self.material_reflectance.len(), self.material_count),
            ("material_texture_id", self.material_texture_id.len(), self.material_count),
            ("material_texture_repeat", self.material_texture_repeat.len(), self.material_count * 2),
            ("material_name_offset", self.material_name_offset.len(), self.material_count),
            ("texture_kind", self.texture_kind.len(), self.texture_count),
            ("texture_width", self.texture_width.len(), self.texture_count),
            ("texture_height", self.texture_height.len(), self.texture_count),
            ("texture_offset", self.texture_offset.len(), self.texture_count),
            ("texture_name_offset", self.texture_name_offset.len(), self.texture_count),
            ("light_directional", self.light_directional.len(), self.light_count),
            ("light_attenuation", self.light_attenuation.len(), self.light_count * 3),
            ("actuator_ctrl_range", self.actuator_ctrl_range.len(), self.actuator_count * 2),
            ("actuator_ctrl_limited", self.actuator_ctrl_limited.len(), self.actuator_count),
            ("actuator_name_offset", self.actuator_name_offset.len(), self.actuator_count),
            ("key_qpos", self.key_qpos.len(), self.keyframe_count * self.qpos_dim),
        ];

        for &(column, actual, expected) in expectations {
            if actual != expected {
                return Err(ModelError::ColumnLength {
                    column,
                    expected,
                    actual,
                });
            }
        }
        Ok(())
    }
}
