use bevy::prelude::*;
use bevy::render::render_resource::Face as CullFace;

use crate::types::Layer;

/// Texels at or below this alpha are discarded on the base layer.
pub const BASE_ALPHA_CUTOFF: f32 = 0.5;

/// Opaque, single-sided, alpha-tested.
pub fn base_layer_material() -> StandardMaterial {
    StandardMaterial {
        base_color: Color::WHITE,
        base_color_texture: None,
        alpha_mode: AlphaMode::Mask(BASE_ALPHA_CUTOFF),
        cull_mode: Some(CullFace::Back),
        double_sided: false,
        unlit: true,
        perceptual_roughness: 1.0,
        metallic: 0.0,
        ..Default::default()
    }
}

/// Double-sided, alpha-blended. Bevy's blended pass has no discard threshold of its own, so
/// fully transparent overlay texels are hidden by blending rather than a 0.01 cutoff.
pub fn overlay_layer_material() -> StandardMaterial {
    StandardMaterial {
        base_color: Color::WHITE,
        base_color_texture: None,
        alpha_mode: AlphaMode::Blend,
        cull_mode: None,
        double_sided: true,
        unlit: true,
        perceptual_roughness: 1.0,
        metallic: 0.0,
        ..Default::default()
    }
}

/// The two materials every base and overlay mesh of a model share.
#[derive(Debug, Clone)]
pub struct LayerMaterials {
    pub base: Handle<StandardMaterial>,
    pub overlay: Handle<StandardMaterial>,
}

impl LayerMaterials {
    pub fn new(materials: &mut Assets<StandardMaterial>) -> Self {
        Self {
            base: materials.add(base_layer_material()),
            overlay: materials.add(overlay_layer_material()),
        }
    }

    /// A single material used for both layers.
    pub fn single(material: Handle<StandardMaterial>) -> Self {
        Self {
            base: material.clone(),
            overlay: material,
        }
    }

    pub fn for_layer(&self, layer: Layer) -> &Handle<StandardMaterial> {
        match layer {
            Layer::Base => &self.base,
            Layer::Overlay => &self.overlay,
        }
    }
}

/// Texture currently bound to a material, if the material is still alive.
pub fn bound_texture(
    materials: &Assets<StandardMaterial>,
    material: &Handle<StandardMaterial>,
) -> Option<Handle<Image>> {
    materials
        .get(material)
        .and_then(|m| m.base_color_texture.clone())
}

/// Replace the texture of `material`, dropping the handle it held before.
///
/// Returns `false` when the material no longer exists.
pub fn bind_texture(
    materials: &mut Assets<StandardMaterial>,
    material: &Handle<StandardMaterial>,
    texture: Option<Handle<Image>>,
) -> bool {
    let Some(material) = materials.get_mut(material) else {
        return false;
    };
    material.base_color_texture = texture;
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layers_follow_the_material_contract() {
        let base = base_layer_material();
        assert_eq!(base.alpha_mode, AlphaMode::Mask(0.5));
        assert!(!base.double_sided);
        assert_eq!(base.cull_mode, Some(CullFace::Back));

        let overlay = overlay_layer_material();
        assert_eq!(overlay.alpha_mode, AlphaMode::Blend);
        assert!(overlay.double_sided);
        assert_eq!(overlay.cull_mode, None);
        assert!(base.base_color_texture.is_none() && overlay.base_color_texture.is_none());
    }

    #[test]
    fn binding_to_a_released_material_is_refused() {
        let mut materials = Assets::<StandardMaterial>::default();
        let layers = LayerMaterials::new(&mut materials);
        materials.remove(&layers.base);
        assert!(!bind_texture(&mut materials, &layers.base, None));
        assert!(bind_texture(&mut materials, &layers.overlay, None));
    }
}
