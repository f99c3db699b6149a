use bevy::asset::RenderAssetUsages;
use bevy::prelude::*;
use bevy::render::mesh::{Indices, PrimitiveTopology};
use std::collections::HashMap;

use constants::coordinate_system::swizzle_triples_in_place;
use constants::render_settings::GROUND_PLANE_FALLBACK_SIZE;

use crate::engine::model::manifest::ModelManifest;
use crate::engine::model::views::GeomKind;

/// Per-model cache of constructed mesh resources, keyed by mesh id.
///
/// Construction copies the model's vertex/normal sub-ranges and swizzles them
/// into the render frame once; every later geom referencing the same mesh id
/// receives the already-built handle, never a re-swizzled rebuild.
#[derive(Default)]
pub struct MeshCache {
    built: HashMap<usize, Handle<Mesh>>,
}

impl MeshCache {
    pub fn resolve(
        &mut self,
        model: &ModelManifest,
        mesh_id: usize,
        meshes: &mut Assets<Mesh>,
    ) -> Handle<Mesh> {
        if let Some(handle) = self.built.get(&mesh_id) {
            return handle.clone();
        }
        let handle = meshes.add(build_model_mesh(model, mesh_id));
        self.built.insert(mesh_id, handle.clone());
        handle
    }

    pub fn len(&self) -> usize {
        self.built.len()
    }

    pub fn is_empty(&self) -> bool {
        self.built.is_empty()
    }
}

/// Build a renderable mesh from the model's packed vertex data. Face topology
/// is re-expressed as plain index triples.
fn build_model_mesh(model: &ModelManifest, mesh_id: usize) -> Mesh {
    let view = model.mesh(mesh_id);

    let mut positions = view.vertices().to_vec();
    swizzle_triples_in_place(&mut positions);
    let mut normals = view.normals().to_vec();
    swizzle_triples_in_place(&mut normals);

    let positions: Vec<[f32; 3]> = positions.chunks_exact(3).map(|v| [v[0], v[1], v[2]]).collect();
    let normals: Vec<[f32; 3]> = normals.chunks_exact(3).map(|n| [n[0], n[1], n[2]]).collect();
    let uvs: Vec<[f32; 2]> = view.uvs().chunks_exact(2).map(|uv| [uv[0], uv[1]]).collect();

    let mut mesh = Mesh::new(
        PrimitiveTopology::TriangleList,
        RenderAssetUsages::default(),
    );
    mesh.insert_attribute(Mesh::ATTRIBUTE_POSITION, positions);
    mesh.insert_attribute(Mesh::ATTRIBUTE_NORMAL, normals);
    if !uvs.is_empty() {
        mesh.insert_attribute(Mesh::ATTRIBUTE_UV_0, uvs);
    }
    mesh.insert_indices(Indices::U32(view.faces().to_vec()));
    mesh
}

/// Translate a geom's shape into a render primitive using its size
/// parameters. Shapes the viewer does not know degrade to the engine's
/// default (a sphere at half the first size component); height fields are
/// not implemented and take the same path.
pub fn resolve_geometry(
    model: &ModelManifest,
    geom_id: usize,
    mesh_cache: &mut MeshCache,
    meshes: &mut Assets<Mesh>,
) -> Handle<Mesh> {
    let geom = model.geom(geom_id);
    let size = geom.size();

    match geom.kind() {
        GeomKind::Plane => {
            // Zero extent means "infinite"; expand to a large finite sheet
            // instead of the far clipping distance.
            let x = if size[0] == 0.0 { GROUND_PLANE_FALLBACK_SIZE } else { size[0] * 2.0 };
            let y = if size[1] == 0.0 { GROUND_PLANE_FALLBACK_SIZE } else { size[1] * 2.0 };
            meshes.add(Rectangle::new(x, y))
        }
        GeomKind::Sphere => meshes.add(Sphere::new(size[0])),
        GeomKind::Capsule => meshes.add(Capsule3d::new(size[0], size[1] * 2.0)),
        GeomKind::Ellipsoid => {
            // Stretch a unit sphere; the y/z components swap across the
            // frame boundary.
            let mesh = Mesh::from(Sphere::new(1.0)).scaled_by(Vec3::new(size[0], size[2], size[1]));
            meshes.add(mesh)
        }
        GeomKind::Cylinder => meshes.add(Cylinder::new(size[0], size[1] * 2.0)),
        GeomKind::Box => meshes.add(Cuboid::new(size[0] * 2.0, size[2] * 2.0, size[1] * 2.0)),
        GeomKind::TriangleMesh => match geom.mesh_id() {
            Some(mesh_id) => mesh_cache.resolve(model, mesh_id, meshes),
            None => meshes.add(Sphere::new(size[0] * 0.5)),
        },
        GeomKind::HeightField | GeomKind::Unknown(_) => meshes.add(Sphere::new(size[0] * 0.5)),
    }
}
