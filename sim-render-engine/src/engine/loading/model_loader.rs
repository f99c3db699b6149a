use bevy::prelude::*;

use crate::engine::core::app_state::AppState;
use crate::engine::model::manifest::ModelManifest;
use crate::engine::model::simulation::Simulation;
use crate::engine::scene::synthesize::{ReloadSceneEvent, SimScene, synthesize_scene};

/// Model file resolved under the asset root.
const MODEL_ASSET_PATH: &'static str = "models/simple.json";

#[derive(Resource, Default)]
pub struct ManifestLoader {
    handle: Option<Handle<ModelManifest>>,
}

/// Kick off the manifest load.
pub fn start_loading(mut loader: ResMut<ManifestLoader>, asset_server: Res<AssetServer>) {
    println!("Loading model from: {MODEL_ASSET_PATH}");
    loader.handle = Some(asset_server.load(MODEL_ASSET_PATH));
}

/// Once the manifest asset is in, synthesize the scene, stand up the
/// simulation state, and advance it one kinematic step before any consumer
/// system runs in the `Running` state.
pub fn build_scene_when_ready(
    mut commands: Commands,
    mut loader: ResMut<ManifestLoader>,
    manifests: Res<Assets<ModelManifest>>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    mut images: ResMut<Assets<Image>>,
    mut next_state: ResMut<NextState<AppState>>,
) {
    let Some(handle) = loader.handle.as_ref() else {
        return;
    };
    let Some(manifest) = manifests.get(handle) else {
        return;
    };

    match synthesize_scene(
        &mut commands,
        manifest,
        &mut meshes,
        &mut materials,
        &mut images,
    ) {
        Ok(scene) => {
            println!(
                "✓ Scene synthesized: {} bodies, {} geoms, {} lights",
                manifest.body_count, manifest.geom_count, manifest.light_count
            );
            let mut simulation = Simulation::new(manifest.clone());
            simulation.forward();
            commands.insert_resource(scene);
            commands.insert_resource(simulation);
            next_state.set(AppState::Running);
        }
        Err(err) => {
            error!("model rejected: {err}");
            loader.handle = None;
        }
    }
}

/// Tear down and rebuild in one synchronous sequence: the old root leaves the
/// graph, the old simulation is released, and only then does the next load
/// begin. Consumers never observe a half-built scene.
pub fn handle_reload_events(
    mut events: EventReader<ReloadSceneEvent>,
    mut commands: Commands,
    scene: Option<Res<SimScene>>,
    mut simulation: Option<ResMut<Simulation>>,
    mut loader: ResMut<ManifestLoader>,
    asset_server: Res<AssetServer>,
    mut next_state: ResMut<NextState<AppState>>,
) {
    if events.is_empty() {
        return;
    }
    events.clear();

    if let Some(scene) = scene.as_ref() {
        commands.entity(scene.root).despawn();
    }
    commands.remove_resource::<SimScene>();

    // The previous physics state must be freed before a replacement exists.
    if let Some(simulation) = simulation.as_mut() {
        simulation.release();
    }
    commands.remove_resource::<Simulation>();

    loader.handle = Some(asset_server.load(MODEL_ASSET_PATH));
    next_state.set(AppState::Loading);
}
