use bevy::asset::AssetMetaCheck;
use bevy::diagnostic::{DiagnosticsStore, FrameTimeDiagnosticsPlugin};
use bevy::pbr::DirectionalLightShadowMap;
use bevy::prelude::*;
use bevy_common_assets::json::JsonAssetPlugin;

use constants::render_settings::{
    CAMERA_DEFAULT_POSITION, CAMERA_DEFAULT_TARGET, LIGHT_SHADOW_MAP_SIZE,
};

// Crate engine modules
use crate::engine::camera::orbit_camera::{CameraControlsLock, OrbitCamera, camera_controller};
use crate::engine::core::app_state::{AppState, FpsText, PausedState};
use crate::engine::core::window_config::create_window_config;
use crate::engine::loading::model_loader::{
    ManifestLoader, build_scene_when_ready, handle_reload_events, start_loading,
};
use crate::engine::model::manifest::ModelManifest;
use crate::engine::scene::synthesize::ReloadSceneEvent;
use crate::engine::scene::sync::sync_body_transforms;
// Crate tools modules
use crate::tools::drag::DragToolPlugin;
use crate::tools::drag::controller::handle_drag_input;
use crate::tools::shortcuts::{KeyframeCursor, handle_keyboard_shortcuts};

pub fn create_app() -> App {
    let mut app = App::new();

    app.add_plugins(create_default_plugins())
        .init_state::<AppState>()
        // Registers ModelManifest as a loadable asset type from JSON files.
        .add_plugins(JsonAssetPlugin::<ModelManifest>::new(&["json"]))
        .add_plugins(FrameTimeDiagnosticsPlugin::default())
        .add_plugins(DragToolPlugin)
        .insert_resource(DirectionalLightShadowMap {
            size: LIGHT_SHADOW_MAP_SIZE,
        });

    // Initialise resources early
    app.init_resource::<ManifestLoader>()
        .init_resource::<PausedState>()
        .init_resource::<OrbitCamera>()
        .init_resource::<CameraControlsLock>()
        .init_resource::<KeyframeCursor>()
        .add_event::<ReloadSceneEvent>();

    app.add_systems(Startup, (setup, start_loading).chain())
        .add_systems(
            Update,
            build_scene_when_ready.run_if(in_state(AppState::Loading)),
        )
        .add_systems(
            Update,
            (
                sync_body_transforms,
                // The drag tool owns the camera lock; decide it first.
                camera_controller.after(handle_drag_input),
                handle_keyboard_shortcuts,
                handle_reload_events,
                fps_text_update_system,
            )
                .run_if(in_state(AppState::Running)),
        );

    app
}

fn create_default_plugins() -> impl PluginGroup {
    let window_config = WindowPlugin {
        primary_window: Some(create_window_config()),
        ..default()
    };

    let asset_config = AssetPlugin {
        meta_check: AssetMetaCheck::Never,
        ..default()
    };

    DefaultPlugins.set(window_config).set(asset_config)
}

// Startup system that only handles basic initialisation
fn setup(mut commands: Commands) {
    spawn_viewport_camera(&mut commands);
    spawn_overlay(&mut commands);
}

fn spawn_viewport_camera(commands: &mut Commands) {
    commands.spawn((
        Camera3d::default(),
        Transform::from_translation(CAMERA_DEFAULT_POSITION)
            .looking_at(CAMERA_DEFAULT_TARGET, Vec3::Y),
    ));
}

fn spawn_overlay(commands: &mut Commands) {
    commands
        .spawn(Node {
            width: Val::Percent(100.0),
            height: Val::Percent(100.0),
            ..default()
        })
        .with_children(|parent| {
            parent.spawn((
                Text::new("FPS: "),
                TextFont {
                    font_size: 16.0,
                    ..default()
                },
                TextColor(Color::srgb(1., 0., 0.)),
                Node {
                    position_type: PositionType::Absolute,
                    bottom: Val::Px(12.0),
                    right: Val::Px(12.0),
                    ..default()
                },
                FpsText,
            ));
        });
}

fn fps_text_update_system(
    diagnostics: Res<DiagnosticsStore>,
    mut query: Query<&mut Text, With<FpsText>>,
) {
    for mut text in &mut query {
        if let Some(fps) = diagnostics.get(&FrameTimeDiagnosticsPlugin::FPS) {
            if let Some(value) = fps.smoothed() {
                text.0 = format!("FPS: {value:.1}");
            }
        }
    }
}
