use bevy::prelude::*;

use constants::coordinate_system::to_physics_vec;

/// Transient state for one grab; exists from the pointer-down hit until
/// pointer-up.
#[derive(Debug, Clone)]
pub struct DragSession {
    /// Renderable the session grabbed.
    pub target: Entity,
    /// Grab point in the target's local frame, fixed at drag start.
    pub local_anchor: Vec3,
    /// Camera distance of the grab hit, held constant for the whole session.
    pub grab_distance: f32,
    /// The anchor re-projected through the target's live transform.
    pub world_anchor: Vec3,
    /// Point on the camera ray at `grab_distance`, under the pointer.
    pub pointer_target: Vec3,
}

impl DragSession {
    /// Pending displacement from anchor to pointer target.
    pub fn displacement(&self) -> Vec3 {
        self.pointer_target - self.world_anchor
    }

    /// The displacement converted back across the coordinate boundary, in
    /// the form the physics engine takes an applied force.
    pub fn displacement_physics(&self) -> Vec3 {
        to_physics_vec(self.displacement())
    }
}

/// Pointer interaction phase.
#[derive(Debug, Clone, Default)]
pub enum DragPhase {
    /// No pointer button held.
    #[default]
    Idle,
    /// Button held, nothing draggable under the pointer.
    Armed,
    /// A draggable renderable is grabbed.
    Dragging(DragSession),
}

#[derive(Resource, Default)]
pub struct DragState {
    pub phase: DragPhase,
    /// Time and cursor position of the previous pointer-down, for
    /// double-click detection.
    pub last_press: Option<(f32, Vec2)>,
}

impl DragState {
    pub fn is_dragging(&self) -> bool {
        matches!(self.phase, DragPhase::Dragging(_))
    }

    pub fn session(&self) -> Option<&DragSession> {
        match &self.phase {
            DragPhase::Dragging(session) => Some(session),
            _ => None,
        }
    }
}

/// Capability state for a highlight-toggled renderable: remembers the
/// material to restore.
#[derive(Component)]
pub struct Highlighted {
    pub original: Handle<StandardMaterial>,
}
