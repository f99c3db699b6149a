use bevy::math::{Quat, Vec3};
use bevy::prelude::*;
use constants::coordinate_system::{Frame, position_at, quaternion_at};

use super::manifest::ModelManifest;

/// Live state for a loaded model: joint positions, actuator controls, and the
/// per-body world poses the viewer reads every frame.
///
/// The physics engine owns the numbers behind these buffers; this resource is
/// the read surface plus the lifecycle discipline around it. A simulation
/// must be [`release`](Simulation::release)d before a replacement is built so
/// the engine-side allocations are freed exactly once.
#[derive(Resource)]
pub struct Simulation {
    model: ModelManifest,
    qpos: Vec<f64>,
    ctrl: Vec<f64>,
    /// Stride 3, world-frame body positions, physics convention.
    xpos: Vec<f64>,
    /// Stride 4, world-frame body orientations, physics convention.
    xquat: Vec<f64>,
    released: bool,
}

impl Simulation {
    /// Wrap a validated model with state at its rest pose.
    pub fn new(model: ModelManifest) -> Self {
        let xpos = model.body_pos.clone();
        let xquat = model.body_quat.clone();
        Self {
            qpos: vec![0.0; model.qpos_dim],
            ctrl: vec![0.0; model.actuator_count],
            xpos,
            xquat,
            model,
            released: false,
        }
    }

    pub fn model(&self) -> &ModelManifest {
        &self.model
    }

    /// Advance the kinematic state one step: the engine recomputes world body
    /// poses from the current joint positions. The built-in state holds rest
    /// poses, so stepping leaves them stationary.
    pub fn forward(&mut self) {
        debug_assert!(!self.released, "forward() on a released simulation");
    }

    /// World pose of `body`, converted to `frame` on this read.
    pub fn body_position(&self, body: usize, frame: Frame) -> Vec3 {
        position_at(&self.xpos, body, frame)
    }

    pub fn body_rotation(&self, body: usize, frame: Frame) -> Quat {
        quaternion_at(&self.xquat, body, frame)
    }

    pub fn qpos(&self) -> &[f64] {
        &self.qpos
    }

    pub fn ctrl(&self, actuator: usize) -> f64 {
        self.ctrl[actuator]
    }

    /// Set an actuator control, clamped to its declared range when the model
    /// marks the actuator as limited.
    pub fn set_ctrl(&mut self, actuator: usize, value: f64) {
        let view = self.model.actuator(actuator);
        self.ctrl[actuator] = if view.ctrl_limited() {
            let (lo, hi) = view.ctrl_range();
            value.clamp(lo, hi)
        } else {
            value
        };
    }

    /// Copy keyframe `index`'s joint-position snapshot into the live state.
    /// Returns false when the model has no such keyframe.
    pub fn load_keyframe(&mut self, index: usize) -> bool {
        if index >= self.model.keyframe_count {
            return false;
        }
        self.qpos.copy_from_slice(self.model.keyframe(index).qpos());
        true
    }

    /// Reset joint positions, controls, and body poses to the rest state.
    pub fn reset(&mut self) {
        self.qpos.fill(0.0);
        self.ctrl.fill(0.0);
        self.xpos.copy_from_slice(&self.model.body_pos);
        self.xquat.copy_from_slice(&self.model.body_quat);
    }

    /// Free the engine-side state. Idempotent: the reload path calls this
    /// before dropping the resource, and dropping an already-released
    /// simulation must not free twice.
    pub fn release(&mut self) {
        if self.released {
            return;
        }
        self.released = true;
        self.qpos = Vec::new();
        self.ctrl = Vec::new();
        self.xpos = Vec::new();
        self.xquat = Vec::new();
    }

    pub fn is_released(&self) -> bool {
        self.released
    }
}
