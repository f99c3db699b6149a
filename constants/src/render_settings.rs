use bevy::color::LinearRgba;
use bevy::math::Vec3;

/// Name carried by the scene root node; reloads replace it wholesale.
pub const SIM_ROOT_NAME: &'static str = "Simulation Root";

/// Geom visualization groups above this value are not rendered (same default
/// behaviour as the native viewer).
pub const VISIBLE_GEOM_GROUP_MAX: i32 = 2;

/// A ground plane declared with zero extent expands to this finite size
/// rather than the camera's far clipping distance.
pub const GROUND_PLANE_FALLBACK_SIZE: f32 = 100.0;

/// Fixed metalness for model materials; the model columns carry none.
pub const MATERIAL_METALNESS: f32 = 0.1;

/// Roughness of the mirror-style material used for ground planes.
pub const MIRROR_ROUGHNESS: f32 = 0.08;

/// Emissive colour swapped in while a renderable is highlight-toggled.
pub const HIGHLIGHT_EMISSIVE: LinearRgba = LinearRgba {
    red: 1.0,
    green: 0.0,
    blue: 0.0,
    alpha: 1.0,
};

/// Colour of the drag feedback arrow.
pub const DRAG_ARROW_COLOR: LinearRgba = LinearRgba {
    red: 0.4,
    green: 0.4,
    blue: 0.4,
    alpha: 0.5,
};

/// Two pointer presses within this window (seconds)...
pub const DOUBLE_CLICK_WINDOW: f32 = 0.3;
/// ...and within this cursor distance (pixels) count as a double-click.
pub const DOUBLE_CLICK_SLOP_PX: f32 = 6.0;

/// Default camera pose when a scene loads.
pub const CAMERA_DEFAULT_POSITION: Vec3 = Vec3::new(2.0, 1.7, 1.7);
pub const CAMERA_DEFAULT_TARGET: Vec3 = Vec3::new(0.0, 0.7, 0.0);

pub const CAMERA_ORBIT_SENSITIVITY: f32 = 0.005;
pub const CAMERA_PAN_SENSITIVITY: f32 = 0.002;
pub const CAMERA_ZOOM_SENSITIVITY: f32 = 0.1;
pub const CAMERA_MIN_DISTANCE: f32 = 0.2;
pub const CAMERA_MAX_DISTANCE: f32 = 200.0;

/// Spot light range baseline; the model's attenuation column shortens it.
pub const LIGHT_BASE_RANGE: f32 = 30.0;

/// Shadow map resolution for model lights.
pub const LIGHT_SHADOW_MAP_SIZE: usize = 1024;
