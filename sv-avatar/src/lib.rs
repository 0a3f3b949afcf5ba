//! Blocky player avatars for Bevy: cuboid skin models, capes and runtime texture loading.
//!
//! Key constraints:
//! - Models are hardcoded as Rust static data (parts + cuboids), in skin pixel units.
//! - Only textures are loaded at runtime, from `http(s)://`, `file://` or plain paths.

use bevy::prelude::*;

pub mod atlas;
pub mod cape;
pub mod config;
pub mod decode;
mod dispose;
pub mod error;
pub mod material;
pub mod mesh;
pub mod player;
pub mod textures;
pub mod types;
pub mod uv;

#[cfg(test)]
mod test_support;

pub use cape::{CapeModel, create_cape_model};
pub use config::AvatarSettings;
pub use error::{ConfigError, LoadError};
pub use player::{PlayerModel, PlayerParts, create_player_model};
pub use textures::{LoadId, LoadKind, LoadOutcome, SkinTextureLoader, TextureLoadFinished};
pub use types::{CuboidDef, Layer, ModelDef, ModelVariant, PartDef};

#[macro_export]
macro_rules! cuboid {
    (
        size: ($w:expr, $h:expr, $d:expr),
        faces: $faces:expr,
        offset: ($x:expr, $y:expr, $z:expr),
        scale: $scale:expr,
        layer: $layer:ident $(,)?
    ) => {
        $crate::CuboidDef {
            size: [$w as f32, $h as f32, $d as f32],
            faces: $faces,
            offset: [$x as f32, $y as f32, $z as f32],
            scale: $scale as f32,
            layer: $crate::Layer::$layer,
        }
    };
}

#[macro_export]
macro_rules! part {
    (@tilt) => { 0.0 };
    (@tilt $tilt:expr) => { $tilt as f32 };
    (
        name: $name:expr,
        parent: $parent:expr,
        pivot: ($x:expr, $y:expr, $z:expr),
        $(tilt: $tilt:expr,)?
        cuboids: [ $($cuboid:expr),* $(,)? ] $(,)?
    ) => {
        $crate::PartDef {
            name: $name,
            parent: $parent,
            pivot: [$x as f32, $y as f32, $z as f32],
            tilt: $crate::part!(@tilt $($tilt)?),
            cuboids: &[$($cuboid),*],
        }
    };
}

/// Registers the texture loader and applies finished loads every frame.
#[derive(Default)]
pub struct AvatarPlugin {
    pub settings: AvatarSettings,
}

impl Plugin for AvatarPlugin {
    fn build(&self, app: &mut App) {
        app.insert_resource(self.settings.clone())
            .init_resource::<SkinTextureLoader>()
            .add_event::<TextureLoadFinished>()
            .add_systems(Startup, textures::preload_configured_capes)
            .add_systems(Update, textures::apply_texture_loads);
    }
}
