use bevy::pbr::{NotShadowCaster, NotShadowReceiver};
use bevy::prelude::*;
use std::collections::HashMap;
use std::f32::consts::FRAC_PI_2;

use constants::coordinate_system::Frame;
use constants::render_settings::{MIRROR_ROUGHNESS, SIM_ROOT_NAME, VISIBLE_GEOM_GROUP_MAX};

use crate::engine::model::manifest::{ModelError, ModelManifest};
use crate::engine::model::views::GeomKind;
use crate::engine::scene::geometry::{MeshCache, resolve_geometry};
use crate::engine::scene::lights::spawn_lights;
use crate::engine::scene::material::{MaterialCache, TextureCache};

/// Handles to the synthesized scene graph for one loaded model. Replaced
/// wholesale on reload.
#[derive(Resource)]
pub struct SimScene {
    pub root: Entity,
    pub bodies: HashMap<i32, Entity>,
    pub lights: Vec<Entity>,
}

/// Body attribution tag carried by every body node and renderable. The drag
/// tool treats ids > 0 as draggable; the world body (id 0) is not.
#[derive(Component, Clone, Copy, Debug, PartialEq, Eq)]
pub struct BodyTag(pub i32);

/// Request to tear down the current scene and rebuild it from the model.
#[derive(Event)]
pub struct ReloadSceneEvent;

/// Build the scene graph for `model`: one node per body, renderables under
/// their owning bodies, lights on the world body, everything parented under a
/// fresh root. Fails only when the model is structurally inconsistent;
/// everything else degrades (unknown shapes fall back to spheres, bodies
/// without geometry are materialized empty).
pub fn synthesize_scene(
    commands: &mut Commands,
    model: &ModelManifest,
    meshes: &mut Assets<Mesh>,
    materials: &mut Assets<StandardMaterial>,
    images: &mut Assets<Image>,
) -> Result<SimScene, ModelError> {
    model.validate()?;

    let root = commands
        .spawn((
            Name::new(SIM_ROOT_NAME),
            Transform::default(),
            Visibility::default(),
        ))
        .id();

    let mut bodies = HashMap::new();
    let mut mesh_cache = MeshCache::default();
    let mut material_cache = MaterialCache::default();
    let mut texture_cache = TextureCache::default();

    for geom_id in 0..model.geom_count {
        let geom = model.geom(geom_id);
        // Same visibility default as the native viewer: higher groups are
        // debug/collision content.
        if geom.group() > VISIBLE_GEOM_GROUP_MAX {
            continue;
        }

        let body = resolve_body(commands, model, geom.body_id(), &mut bodies);
        let mesh = resolve_geometry(model, geom_id, &mut mesh_cache, meshes);
        let material = material_cache.resolve(model, geom_id, &mut texture_cache, materials, images);
        spawn_renderable(commands, model, geom_id, body, mesh, material, materials);
    }

    let lights = spawn_lights(commands, model, root, &bodies);

    attach_bodies(commands, model, root, &mut bodies);

    Ok(SimScene {
        root,
        bodies,
        lights,
    })
}

/// Body node for a geom's owner, created on first reference.
fn resolve_body(
    commands: &mut Commands,
    model: &ModelManifest,
    body_id: i32,
    bodies: &mut HashMap<i32, Entity>,
) -> Entity {
    match bodies.get(&body_id) {
        Some(entity) => *entity,
        None => create_body(commands, model, body_id, bodies),
    }
}

fn create_body(
    commands: &mut Commands,
    model: &ModelManifest,
    body_id: i32,
    bodies: &mut HashMap<i32, Entity>,
) -> Entity {
    let name = model.body(body_id as usize).name().to_owned();
    let entity = commands
        .spawn((
            Name::new(name),
            BodyTag(body_id),
            Transform::default(),
            Visibility::default(),
        ))
        .id();
    bodies.insert(body_id, entity);
    entity
}

fn spawn_renderable(
    commands: &mut Commands,
    model: &ModelManifest,
    geom_id: usize,
    body: Entity,
    mesh: Handle<Mesh>,
    material: Handle<StandardMaterial>,
    materials: &mut Assets<StandardMaterial>,
) {
    let geom = model.geom(geom_id);
    let mut transform = Transform::from_translation(geom.position(Frame::Render));

    let mut entity = match geom.kind() {
        GeomKind::Plane => {
            // Ground planes lie flat and mirror the scene; they receive
            // shadows but cast none.
            transform.rotation = Quat::from_rotation_x(-FRAC_PI_2);
            let mirror = mirror_variant(materials, &material);
            commands.spawn((
                Mesh3d(mesh),
                MeshMaterial3d(mirror),
                transform,
                NotShadowCaster,
            ))
        }
        kind => {
            transform.rotation = geom.rotation(Frame::Render);
            let mut entity = commands.spawn((Mesh3d(mesh), MeshMaterial3d(material), transform));
            if kind == GeomKind::NON_SHADOW_RECEIVING {
                entity.insert(NotShadowReceiver);
            }
            entity
        }
    };

    entity.insert((BodyTag(geom.body_id()), ChildOf(body)));
}

/// Mirror-style stand-in for a planar reflector: the source material's colour
/// and texture on a fully metallic, near-smooth surface.
fn mirror_variant(
    materials: &mut Assets<StandardMaterial>,
    source: &Handle<StandardMaterial>,
) -> Handle<StandardMaterial> {
    let mut mirror = materials.get(source).cloned().unwrap_or_default();
    mirror.metallic = 1.0;
    mirror.perceptual_roughness = MIRROR_ROUGHNESS;
    materials.add(mirror)
}

/// Parent every body into the hierarchy: body 0 becomes the world anchor
/// under the root, every other body hangs under it. Bodies that never got a
/// node (no geometry in a visible group) are materialized empty so consumers
/// can still reference them.
fn attach_bodies(
    commands: &mut Commands,
    model: &ModelManifest,
    root: Entity,
    bodies: &mut HashMap<i32, Entity>,
) {
    if model.body_count == 0 {
        return;
    }

    let world = materialize_body(commands, model, 0, bodies);
    commands.entity(root).add_child(world);

    for body_id in 1..model.body_count as i32 {
        let body = materialize_body(commands, model, body_id, bodies);
        commands.entity(world).add_child(body);
    }
}

fn materialize_body(
    commands: &mut Commands,
    model: &ModelManifest,
    body_id: i32,
    bodies: &mut HashMap<i32, Entity>,
) -> Entity {
    match bodies.get(&body_id) {
        Some(entity) => *entity,
        None => {
            warn!(
                "body {} (\"{}\") has no geometry; materializing an empty node",
                body_id,
                model.body(body_id as usize).name()
            );
            create_body(commands, model, body_id, bodies)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::model::manifest::tests::two_body_box_model;
    use bevy::ecs::system::RunSystemOnce;
    use bevy::render::mesh::MeshAabb;

    fn synthesize_in_world(world: &mut World, model: ModelManifest) -> SimScene {
        world.init_resource::<Assets<Mesh>>();
        world.init_resource::<Assets<StandardMaterial>>();
        world.init_resource::<Assets<Image>>();
        world
            .run_system_once(
                move |mut commands: Commands,
                      mut meshes: ResMut<Assets<Mesh>>,
                      mut materials: ResMut<Assets<StandardMaterial>>,
                      mut images: ResMut<Assets<Image>>| {
                    synthesize_scene(
                        &mut commands,
                        &model,
                        &mut meshes,
                        &mut materials,
                        &mut images,
                    )
                },
            )
            .unwrap()
            .unwrap()
    }

    /// One body, one box geom of size (1, 1, 1), no material, green RGBA:
    /// expect a single renderable under the body with the colour-keyed green
    /// material and doubled box dimensions.
    #[test]
    fn green_box_synthesizes_end_to_end() {
        let mut model = two_body_box_model();
        model.geom_size = vec![1.0, 1.0, 1.0];
        let mut world = World::new();
        let scene = synthesize_in_world(&mut world, model);

        assert_eq!(scene.bodies.len(), 2);

        let mut renderables = world.query::<(&Mesh3d, &MeshMaterial3d<StandardMaterial>, &BodyTag, &ChildOf)>();
        let collected: Vec<_> = renderables.iter(&world).collect();
        assert_eq!(collected.len(), 1);
        let (mesh, material, tag, child_of) = collected[0];
        assert_eq!(tag.0, 1);
        assert_eq!(child_of.parent(), scene.bodies[&1]);

        let meshes = world.resource::<Assets<Mesh>>();
        let aabb = meshes.get(&mesh.0).unwrap().compute_aabb().unwrap();
        assert!(Vec3::from(aabb.half_extents).abs_diff_eq(Vec3::ONE, 1e-6));

        let materials = world.resource::<Assets<StandardMaterial>>();
        let material = materials.get(&material.0).unwrap();
        assert_eq!(material.base_color, Color::srgba(0.0, 1.0, 0.0, 1.0));
    }

    #[test]
    fn bodies_without_geometry_materialize_under_the_world_anchor() {
        let mut model = two_body_box_model();
        model.body_count = 3;
        model.body_parent_id = vec![0, 0, 1];
        model.body_pos = vec![0.0; 9];
        model.body_quat = vec![1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0];
        model.body_name_offset = vec![0, 6, 6];
        // Geom on body 1 only; bodies 0 and 2 have no geometry.
        let mut world = World::new();
        let scene = synthesize_in_world(&mut world, model);

        assert_eq!(scene.bodies.len(), 3);
        let world_anchor = scene.bodies[&0];
        assert_eq!(
            world.entity(world_anchor).get::<ChildOf>().unwrap().parent(),
            scene.root
        );
        for body_id in [1, 2] {
            assert_eq!(
                world
                    .entity(scene.bodies[&body_id])
                    .get::<ChildOf>()
                    .unwrap()
                    .parent(),
                world_anchor
            );
        }
    }

    #[test]
    fn invisible_groups_are_skipped() {
        let mut model = two_body_box_model();
        model.geom_group = vec![VISIBLE_GEOM_GROUP_MAX + 1];
        let mut world = World::new();
        let _scene = synthesize_in_world(&mut world, model);

        let mut renderables = world.query::<&Mesh3d>();
        assert_eq!(renderables.iter(&world).count(), 0);
    }

    #[test]
    fn inconsistent_model_fails_synthesis() {
        let mut model = two_body_box_model();
        model.geom_body_id = vec![9];
        let mut world = World::new();
        world.init_resource::<Assets<Mesh>>();
        world.init_resource::<Assets<StandardMaterial>>();
        world.init_resource::<Assets<Image>>();
        let result = world
            .run_system_once(
                move |mut commands: Commands,
                      mut meshes: ResMut<Assets<Mesh>>,
                      mut materials: ResMut<Assets<StandardMaterial>>,
                      mut images: ResMut<Assets<Image>>| {
                    synthesize_scene(
                        &mut commands,
                        &model,
                        &mut meshes,
                        &mut materials,
                        &mut images,
                    )
                },
            )
            .unwrap();
        assert!(result.is_err());
    }

    #[test]
    fn plane_geoms_lie_flat_and_cast_no_shadows() {
        let mut model = two_body_box_model();
        model.geom_kind[0] = GeomKind::Plane.to_raw();
        model.geom_body_id = vec![0];
        model.geom_size = vec![0.0, 0.0, 0.05];
        let mut world = World::new();
        let _scene = synthesize_in_world(&mut world, model);

        let mut q = world.query_filtered::<&Transform, With<NotShadowCaster>>();
        let transforms: Vec<_> = q.iter(&world).collect();
        assert_eq!(transforms.len(), 1);
        assert!(transforms[0]
            .rotation
            .abs_diff_eq(Quat::from_rotation_x(-FRAC_PI_2), 1e-6));
    }

    #[test]
    fn default_light_appears_when_the_model_declares_none() {
        let model = two_body_box_model();
        let mut world = World::new();
        let scene = synthesize_in_world(&mut world, model);
        assert!(scene.lights.is_empty());

        let mut q = world.query::<&DirectionalLight>();
        assert_eq!(q.iter(&world).count(), 1);
    }
}
