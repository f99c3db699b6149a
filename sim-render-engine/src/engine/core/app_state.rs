use bevy::prelude::*;

/// Top-level application phases. The viewer sits in `Loading` until the
/// model manifest is in and the scene graph is built.
#[derive(States, Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum AppState {
    #[default]
    Loading,
    Running,
}

/// Simulation stepping control; Space toggles it.
#[derive(Resource, Default)]
pub struct PausedState {
    pub paused: bool,
}

/// Marker for the FPS overlay text node.
#[derive(Component)]
pub struct FpsText;
