//! Pointer-driven drag and highlight tool.
//!
//! Hit-tests pointer gestures against the synthesized scene, grabs draggable
//! renderables, and draws the pending displacement while the pointer moves.
//!
//! ## States
//!
//! - **Idle**: no pointer button held.
//! - **Armed**: button down, but the ray hit nothing draggable.
//! - **Dragging**: a renderable with a positive body id is grabbed.
//!
//! ## Grab session
//!
//! On a valid pointer-down hit the session records the grab point in the
//! target's local frame and the camera distance of the hit. Both stay fixed
//! for the whole session:
//!
//! - the **anchor** re-projects through the target's live transform every
//!   frame, so it rides along with a moving body;
//! - the **pointer target** is recomputed on the camera ray at the original
//!   grab distance, so pointer motion swings it at a fixed radius instead of
//!   tracking object depth.
//!
//! An arrow gizmo from anchor to pointer target visualizes the pending
//! displacement; the full system feeds it back to the physics engine as a
//! force. Camera controls are locked for the duration of the session.
//!
//! ## Raycasting
//!
//! The camera ray tests against every tagged renderable's local-space AABB
//! under its world transform (slab method). Hits are walked near-to-far and
//! the first with body id > 0 wins; the world body and untagged scenery are
//! never draggable.
//!
//! ## Highlight
//!
//! Double-click re-runs the hit test and toggles a highlight on the hit
//! renderable: its material is swapped for an emissive clone, and restored
//! (same handle, clone disposed) on the next toggle. At most one renderable
//! holds the highlight at a time.

pub mod controller;
pub mod highlight;
pub mod ray;
pub mod state;

use bevy::prelude::*;

use crate::engine::core::app_state::AppState;
use controller::{handle_drag_input, reset_drag_tool, update_drag_feedback};
use highlight::{HighlightToggleEvent, apply_highlight_toggles};
use state::DragState;

/// Registers the drag tool's state, events, and systems.
pub struct DragToolPlugin;

impl Plugin for DragToolPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<DragState>()
            .add_event::<HighlightToggleEvent>()
            .add_systems(
                Update,
                (handle_drag_input, update_drag_feedback, apply_highlight_toggles)
                    .chain()
                    .run_if(in_state(AppState::Running)),
            )
            .add_systems(OnExit(AppState::Running), reset_drag_tool);
    }
}
