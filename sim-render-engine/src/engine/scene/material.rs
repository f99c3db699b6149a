use bevy::asset::RenderAssetUsages;
use bevy::image::{ImageAddressMode, ImageSampler, ImageSamplerDescriptor};
use bevy::math::Affine2;
use bevy::prelude::*;
use bevy::render::render_resource::{Extent3d, TextureDimension, TextureFormat};
use std::collections::HashMap;

use constants::render_settings::MATERIAL_METALNESS;

use crate::engine::model::manifest::ModelManifest;

/// Hex key for a literal RGBA colour, e.g. `(1, 0, 0, 1)` -> `#ff0000ff`.
/// Geoms without a material share one instance per distinct colour.
pub fn rgba_to_key(rgba: [f32; 4]) -> String {
    let mut key = String::from("#");
    for c in rgba {
        let byte = (c * 255.0).round().clamp(0.0, 255.0) as u8;
        key.push_str(&format!("{byte:02x}"));
    }
    key
}

/// Expand a row-major RGB payload to RGBA. The model carries no alpha
/// channel; expanded texels are opaque.
pub fn expand_rgb_to_rgba(rgb: &[u8]) -> Vec<u8> {
    let mut rgba = Vec::with_capacity(rgb.len() / 3 * 4);
    for px in rgb.chunks_exact(3) {
        rgba.extend_from_slice(px);
        rgba.push(u8::MAX);
    }
    rgba
}

/// Per-model cache of constructed texture resources, keyed by texture id.
#[derive(Default)]
pub struct TextureCache {
    built: HashMap<usize, Handle<Image>>,
}

impl TextureCache {
    pub fn resolve(
        &mut self,
        model: &ModelManifest,
        texture_id: usize,
        images: &mut Assets<Image>,
    ) -> Handle<Image> {
        if let Some(handle) = self.built.get(&texture_id) {
            return handle.clone();
        }
        let handle = images.add(build_texture(model, texture_id));
        self.built.insert(texture_id, handle.clone());
        handle
    }

    pub fn len(&self) -> usize {
        self.built.len()
    }
}

fn build_texture(model: &ModelManifest, texture_id: usize) -> Image {
    let view = model.texture(texture_id);
    let rgba = expand_rgb_to_rgba(view.rgb());

    let mut image = Image::new(
        Extent3d {
            width: view.width() as u32,
            height: view.height() as u32,
            depth_or_array_layers: 1,
        },
        TextureDimension::D2,
        rgba,
        TextureFormat::Rgba8UnormSrgb,
        RenderAssetUsages::default(),
    );
    // Repeat addressing so material-declared texture repeats tile.
    image.sampler = ImageSampler::Descriptor(ImageSamplerDescriptor {
        address_mode_u: ImageAddressMode::Repeat,
        address_mode_v: ImageAddressMode::Repeat,
        ..default()
    });
    image
}

/// Per-model caches of constructed material resources: model materials by
/// id, ad-hoc geom colours by their hex key.
#[derive(Default)]
pub struct MaterialCache {
    by_id: HashMap<usize, Handle<StandardMaterial>>,
    by_color: HashMap<String, Handle<StandardMaterial>>,
}

impl MaterialCache {
    /// Reuse-or-build the material for a geom: by the geom's material id when
    /// it names one (building the texture transitively), else by its literal
    /// colour key.
    pub fn resolve(
        &mut self,
        model: &ModelManifest,
        geom_id: usize,
        textures: &mut TextureCache,
        materials: &mut Assets<StandardMaterial>,
        images: &mut Assets<Image>,
    ) -> Handle<StandardMaterial> {
        let geom = model.geom(geom_id);
        match geom.material_id() {
            Some(material_id) => {
                if let Some(handle) = self.by_id.get(&material_id) {
                    return handle.clone();
                }
                let handle = materials.add(build_material(model, material_id, textures, images));
                self.by_id.insert(material_id, handle.clone());
                handle
            }
            None => {
                let key = rgba_to_key(geom.rgba());
                if let Some(handle) = self.by_color.get(&key) {
                    return handle.clone();
                }
                let handle = materials.add(base_properties(geom.rgba()));
                self.by_color.insert(key, handle.clone());
                handle
            }
        }
    }

    pub fn color_keys(&self) -> impl Iterator<Item = &str> {
        self.by_color.keys().map(String::as_str)
    }
}

fn base_properties(rgba: [f32; 4]) -> StandardMaterial {
    StandardMaterial {
        base_color: Color::srgba(rgba[0], rgba[1], rgba[2], rgba[3]),
        alpha_mode: if rgba[3] < 1.0 {
            AlphaMode::Blend
        } else {
            AlphaMode::Opaque
        },
        ..default()
    }
}

fn build_material(
    model: &ModelManifest,
    material_id: usize,
    textures: &mut TextureCache,
    images: &mut Assets<Image>,
) -> StandardMaterial {
    let view = model.material(material_id);
    let mut material = base_properties(view.rgba());
    material.perceptual_roughness = (1.0 - view.shininess()).clamp(0.0, 1.0);
    material.metallic = MATERIAL_METALNESS;
    // One non-metal F0 scalar here; the model's reflectance and specular
    // intensity columns both land on it.
    material.reflectance = (view.reflectance() + view.specular() * 0.5).min(1.0);

    if let Some(texture_id) = view.texture_id() {
        material.base_color_texture = Some(textures.resolve(model, texture_id, images));
        let repeat = view.texture_repeat();
        if repeat != [1.0, 1.0] {
            material.uv_transform = Affine2::from_scale(Vec2::new(repeat[0], repeat[1]));
        }
    }
    material
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::model::manifest::tests::two_body_box_model;

    fn model_with_material_and_texture() -> ModelManifest {
        let mut model = two_body_box_model();
        model.geom_count = 2;
        model.geom_body_id = vec![1, 1];
        model.geom_kind = vec![6, 6];
        model.geom_size = vec![0.2, 0.2, 0.2, 0.1, 0.1, 0.1];
        model.geom_pos = vec![0.0; 6];
        model.geom_quat = vec![1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0];
        model.geom_group = vec![0, 0];
        model.geom_material_id = vec![0, 0];
        model.geom_rgba = vec![1.0; 8];
        model.geom_mesh_id = vec![-1, -1];

        model.material_count = 1;
        model.material_rgba = vec![0.8, 0.2, 0.2, 1.0];
        model.material_shininess = vec![0.7];
        model.material_specular = vec![0.4];
        model.material_reflectance = vec![0.3];
        model.material_texture_id = vec![0];
        model.material_texture_repeat = vec![2.0, 3.0];
        model.material_name_offset = vec![0];

        model.texture_count = 1;
        model.texture_kind = vec![0];
        model.texture_width = vec![2];
        model.texture_height = vec![1];
        model.texture_offset = vec![0];
        model.texture_rgb = vec![10, 20, 30, 40, 50, 60];
        model.texture_name_offset = vec![0];
        model
    }

    #[test]
    fn geoms_sharing_a_material_id_share_one_instance() {
        let model = model_with_material_and_texture();
        let mut materials = Assets::<StandardMaterial>::default();
        let mut images = Assets::<Image>::default();
        let mut material_cache = MaterialCache::default();
        let mut texture_cache = TextureCache::default();

        let first = material_cache.resolve(&model, 0, &mut texture_cache, &mut materials, &mut images);
        let second = material_cache.resolve(&model, 1, &mut texture_cache, &mut materials, &mut images);

        assert_eq!(first, second);
        assert_eq!(materials.iter().count(), 1);
        assert_eq!(texture_cache.len(), 1);
    }

    #[test]
    fn material_properties_derive_from_the_model_columns() {
        let model = model_with_material_and_texture();
        let mut materials = Assets::<StandardMaterial>::default();
        let mut images = Assets::<Image>::default();
        let mut material_cache = MaterialCache::default();
        let mut texture_cache = TextureCache::default();

        let handle = material_cache.resolve(&model, 0, &mut texture_cache, &mut materials, &mut images);
        let material = materials.get(&handle).unwrap();
        assert!((material.perceptual_roughness - 0.3).abs() < 1e-6);
        assert_eq!(material.metallic, MATERIAL_METALNESS);
        assert!((material.reflectance - 0.5).abs() < 1e-6);
        assert!(material.base_color_texture.is_some());
        assert_eq!(material.uv_transform.matrix2.x_axis.x, 2.0);
        assert_eq!(material.uv_transform.matrix2.y_axis.y, 3.0);
    }

    #[test]
    fn colorless_geoms_with_equal_rgba_share_one_keyed_instance() {
        let mut model = model_with_material_and_texture();
        model.geom_material_id = vec![-1, -1];
        model.geom_rgba = vec![0.0, 1.0, 0.0, 1.0, 0.0, 1.0, 0.0, 1.0];

        let mut materials = Assets::<StandardMaterial>::default();
        let mut images = Assets::<Image>::default();
        let mut material_cache = MaterialCache::default();
        let mut texture_cache = TextureCache::default();

        let first = material_cache.resolve(&model, 0, &mut texture_cache, &mut materials, &mut images);
        let second = material_cache.resolve(&model, 1, &mut texture_cache, &mut materials, &mut images);

        assert_eq!(first, second);
        assert_eq!(materials.iter().count(), 1);
        assert_eq!(material_cache.color_keys().collect::<Vec<_>>(), vec!["#00ff00ff"]);
    }

    #[test]
    fn rgba_keys_are_two_digit_hex_per_channel() {
        assert_eq!(rgba_to_key([1.0, 0.0, 0.0, 1.0]), "#ff0000ff");
        assert_eq!(rgba_to_key([0.0, 1.0, 0.0, 1.0]), "#00ff00ff");
        assert_eq!(rgba_to_key([0.0, 0.0, 0.0, 0.0]), "#00000000");
        // Values outside [0, 1] clamp instead of wrapping.
        assert_eq!(rgba_to_key([2.0, -1.0, 0.5, 1.0]), "#ff0080ff");
    }

    #[test]
    fn rgb_expansion_forces_opaque_alpha() {
        let rgba = expand_rgb_to_rgba(&[10, 20, 30, 40, 50, 60]);
        assert_eq!(rgba, vec![10, 20, 30, 255, 40, 50, 60, 255]);
    }
}
