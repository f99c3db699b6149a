use bevy::prelude::*;

use crate::engine::core::app_state::PausedState;
use crate::engine::model::simulation::Simulation;
use crate::engine::scene::synthesize::ReloadSceneEvent;

/// Keyframe the PageUp/PageDown shortcuts last applied.
#[derive(Resource, Default)]
pub struct KeyframeCursor {
    pub index: usize,
}

/// Keyboard actions: Space pauses stepping, Backspace resets the simulation,
/// Ctrl+L reloads the scene, PageUp/PageDown cycle keyframes. (Camera reset
/// on Ctrl+A lives with the camera controller.)
pub fn handle_keyboard_shortcuts(
    keyboard: Res<ButtonInput<KeyCode>>,
    mut paused: ResMut<PausedState>,
    mut cursor: ResMut<KeyframeCursor>,
    mut simulation: Option<ResMut<Simulation>>,
    mut reloads: EventWriter<ReloadSceneEvent>,
) {
    if keyboard.just_pressed(KeyCode::Space) {
        paused.paused = !paused.paused;
        info!("simulation {}", if paused.paused { "paused" } else { "running" });
    }

    if keyboard.just_pressed(KeyCode::Backspace) {
        if let Some(simulation) = simulation.as_mut() {
            simulation.reset();
            cursor.index = 0;
            info!("simulation reset");
        }
    }

    let ctrl = keyboard.pressed(KeyCode::ControlLeft) || keyboard.pressed(KeyCode::ControlRight);
    if ctrl && keyboard.just_pressed(KeyCode::KeyL) {
        reloads.write(ReloadSceneEvent);
    }

    let Some(simulation) = simulation.as_mut() else {
        return;
    };
    let keyframes = simulation.model().keyframe_count;
    if keyframes == 0 {
        return;
    }
    if keyboard.just_pressed(KeyCode::PageUp) {
        cursor.index = (cursor.index + 1) % keyframes;
        if simulation.load_keyframe(cursor.index) {
            info!("loaded keyframe {}", cursor.index);
        }
    }
    if keyboard.just_pressed(KeyCode::PageDown) {
        cursor.index = cursor.index.checked_sub(1).unwrap_or(keyframes - 1);
        if simulation.load_keyframe(cursor.index) {
            info!("loaded keyframe {}", cursor.index);
        }
    }
}
