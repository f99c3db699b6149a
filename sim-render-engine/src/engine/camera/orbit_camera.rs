use bevy::input::mouse::{MouseMotion, MouseWheel};
use bevy::prelude::*;

use constants::render_settings::{
    CAMERA_DEFAULT_POSITION, CAMERA_DEFAULT_TARGET, CAMERA_MAX_DISTANCE, CAMERA_MIN_DISTANCE,
    CAMERA_ORBIT_SENSITIVITY, CAMERA_PAN_SENSITIVITY, CAMERA_ZOOM_SENSITIVITY,
};

/// Orbit camera state around a focus point.
#[derive(Resource)]
pub struct OrbitCamera {
    pub focus: Vec3,
    pub distance: f32,
    pub yaw: f32,
    pub pitch: f32,
}

impl Default for OrbitCamera {
    fn default() -> Self {
        let offset = CAMERA_DEFAULT_POSITION - CAMERA_DEFAULT_TARGET;
        Self {
            focus: CAMERA_DEFAULT_TARGET,
            distance: offset.length(),
            yaw: offset.x.atan2(offset.z),
            pitch: (offset.y / offset.length()).asin(),
        }
    }
}

/// Held by the drag tool while a session owns the pointer; the camera
/// controller stands down until it clears.
#[derive(Resource, Default)]
pub struct CameraControlsLock {
    pub active: bool,
}

fn camera_offset(orbit: &OrbitCamera) -> Vec3 {
    let (sin_yaw, cos_yaw) = orbit.yaw.sin_cos();
    let (sin_pitch, cos_pitch) = orbit.pitch.sin_cos();
    Vec3::new(sin_yaw * cos_pitch, sin_pitch, cos_yaw * cos_pitch) * orbit.distance
}

/// Left-drag orbits, middle-drag pans, scroll zooms, Ctrl+A resets.
pub fn camera_controller(
    lock: Res<CameraControlsLock>,
    buttons: Res<ButtonInput<MouseButton>>,
    keyboard: Res<ButtonInput<KeyCode>>,
    mut motion: EventReader<MouseMotion>,
    mut wheel: EventReader<MouseWheel>,
    mut orbit: ResMut<OrbitCamera>,
    mut cameras: Query<&mut Transform, With<Camera3d>>,
) {
    let ctrl = keyboard.pressed(KeyCode::ControlLeft) || keyboard.pressed(KeyCode::ControlRight);
    if ctrl && keyboard.just_pressed(KeyCode::KeyA) {
        *orbit = OrbitCamera::default();
    }

    if lock.active {
        // Drain the events so a drag doesn't spill into camera motion when
        // the lock lifts.
        motion.clear();
        wheel.clear();
    } else {
        let mut delta = Vec2::ZERO;
        for ev in motion.read() {
            delta += ev.delta;
        }
        let mut scroll = 0.0;
        for ev in wheel.read() {
            scroll += ev.y;
        }

        if buttons.pressed(MouseButton::Left) && delta != Vec2::ZERO {
            orbit.yaw -= delta.x * CAMERA_ORBIT_SENSITIVITY;
            orbit.pitch = (orbit.pitch + delta.y * CAMERA_ORBIT_SENSITIVITY).clamp(-1.54, 1.54);
        }

        if buttons.pressed(MouseButton::Middle) && delta != Vec2::ZERO {
            let (sin_yaw, cos_yaw) = orbit.yaw.sin_cos();
            let right = Vec3::new(cos_yaw, 0.0, -sin_yaw);
            let forward = -camera_offset(&orbit).normalize_or_zero();
            let up = right.cross(forward);
            let scale = orbit.distance * CAMERA_PAN_SENSITIVITY;
            let pan = (-right * delta.x + up * delta.y) * scale;
            orbit.focus += pan;
        }

        if scroll != 0.0 {
            orbit.distance = (orbit.distance * (1.0 - scroll * CAMERA_ZOOM_SENSITIVITY))
                .clamp(CAMERA_MIN_DISTANCE, CAMERA_MAX_DISTANCE);
        }
    }

    for mut transform in &mut cameras {
        let eye = orbit.focus + camera_offset(&orbit);
        *transform = Transform::from_translation(eye).looking_at(orbit.focus, Vec3::Y);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_orbit_reconstructs_the_default_pose() {
        let orbit = OrbitCamera::default();
        let eye = orbit.focus + camera_offset(&orbit);
        assert!(eye.abs_diff_eq(CAMERA_DEFAULT_POSITION, 1e-5));
    }
}
