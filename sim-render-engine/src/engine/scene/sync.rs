use bevy::prelude::*;

use constants::coordinate_system::Frame;

use crate::engine::core::app_state::PausedState;
use crate::engine::model::simulation::Simulation;
use crate::engine::scene::synthesize::{BodyTag, SimScene};

/// Step the simulation (unless paused) and copy every body's live world pose
/// into its scene node. Each pose is rebuilt from the physics-side buffers on
/// every read; the frame conversion is applied per read, never accumulated
/// onto a previously converted transform.
pub fn sync_body_transforms(
    paused: Res<PausedState>,
    simulation: Option<ResMut<Simulation>>,
    scene: Option<Res<SimScene>>,
    mut transforms: Query<&mut Transform, With<BodyTag>>,
) {
    let (Some(mut simulation), Some(scene)) = (simulation, scene) else {
        return;
    };
    if simulation.is_released() {
        return;
    }
    if !paused.paused {
        simulation.forward();
    }

    for (&body_id, &entity) in &scene.bodies {
        let Ok(mut transform) = transforms.get_mut(entity) else {
            continue;
        };
        transform.translation = simulation.body_position(body_id as usize, Frame::Render);
        transform.rotation = simulation.body_rotation(body_id as usize, Frame::Render);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::model::manifest::tests::two_body_box_model;
    use crate::engine::scene::synthesize::synthesize_scene;
    use bevy::ecs::system::RunSystemOnce;

    #[test]
    fn body_transforms_follow_the_simulation_pose() {
        let model = two_body_box_model();
        let mut world = World::new();
        world.init_resource::<Assets<Mesh>>();
        world.init_resource::<Assets<StandardMaterial>>();
        world.init_resource::<Assets<Image>>();
        world.init_resource::<PausedState>();

        let scene_model = model.clone();
        let scene = world
            .run_system_once(
                move |mut commands: Commands,
                      mut meshes: ResMut<Assets<Mesh>>,
                      mut materials: ResMut<Assets<StandardMaterial>>,
                      mut images: ResMut<Assets<Image>>| {
                    synthesize_scene(
                        &mut commands,
                        &scene_model,
                        &mut meshes,
                        &mut materials,
                        &mut images,
                    )
                },
            )
            .unwrap()
            .unwrap();

        let body = scene.bodies[&1];
        world.insert_resource(scene);
        world.insert_resource(Simulation::new(model));

        // Run twice: the conversion must not accumulate across frames.
        world.run_system_once(sync_body_transforms).unwrap();
        world.run_system_once(sync_body_transforms).unwrap();

        let transform = world.entity(body).get::<Transform>().unwrap();
        // Physics (0, 0, 0.5) reads as render (0, 0.5, 0).
        assert!(transform.translation.abs_diff_eq(Vec3::new(0.0, 0.5, 0.0), 1e-6));
    }
}
