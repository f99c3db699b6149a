use bevy::prelude::*;

use constants::render_settings::LIGHT_BASE_RANGE;

use crate::engine::model::manifest::ModelManifest;
use std::collections::HashMap;

/// Spawn one light per declaration in the model, parented to body 0 when it
/// exists, else to the root. A model with no lights still gets a single
/// directional default so the scene is never black.
pub fn spawn_lights(
    commands: &mut Commands,
    model: &ModelManifest,
    root: Entity,
    bodies: &HashMap<i32, Entity>,
) -> Vec<Entity> {
    let anchor = bodies.get(&0).copied().unwrap_or(root);

    let mut lights = Vec::with_capacity(model.light_count);
    for id in 0..model.light_count {
        let view = model.light(id);
        let entity = if view.directional() {
            commands
                .spawn((
                    DirectionalLight {
                        shadows_enabled: true,
                        ..default()
                    },
                    ChildOf(anchor),
                ))
                .id()
        } else {
            // Bevy lights have no decay term; attenuation shortens the range.
            let range = LIGHT_BASE_RANGE / (1.0 + 100.0 * view.attenuation());
            commands
                .spawn((
                    SpotLight {
                        shadows_enabled: true,
                        range,
                        ..default()
                    },
                    ChildOf(anchor),
                ))
                .id()
        };
        lights.push(entity);
    }

    if model.light_count == 0 {
        commands.spawn((DirectionalLight::default(), ChildOf(root)));
    }

    lights
}
