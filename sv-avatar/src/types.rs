use std::fmt;
use std::str::FromStr;

use bevy::prelude::Component;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::atlas::{Atlas, BodyPartSpec, FaceRects};

/// Arm shape of a skin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelVariant {
    /// 4px arms ("Steve").
    #[default]
    Classic,
    /// 3px arms ("Alex").
    Slim,
}

impl ModelVariant {
    pub const fn arm_width(self) -> u32 {
        match self {
            ModelVariant::Classic => 4,
            ModelVariant::Slim => 3,
        }
    }

    pub const fn toggled(self) -> Self {
        match self {
            ModelVariant::Classic => ModelVariant::Slim,
            ModelVariant::Slim => ModelVariant::Classic,
        }
    }
}

impl fmt::Display for ModelVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModelVariant::Classic => write!(f, "classic"),
            ModelVariant::Slim => write!(f, "slim"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid skin variant: {0} (expected 'classic' or 'slim')")]
pub struct ParseVariantError(pub String);

impl FromStr for ModelVariant {
    type Err = ParseVariantError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "classic" | "steve" | "default" => Ok(ModelVariant::Classic),
            "slim" | "alex" => Ok(ModelVariant::Slim),
            _ => Err(ParseVariantError(s.to_string())),
        }
    }
}

/// Which shared material a cuboid is drawn with.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Layer {
    /// Opaque, alpha-tested inner layer.
    Base,
    /// Enlarged, double-sided, alpha-blended outer layer (hat, jacket, sleeves, pants).
    Overlay,
}

#[derive(Debug, Clone, Copy)]
pub struct CuboidDef {
    /// Dimensions (w, h, d) in skin pixels, before `scale`.
    pub size: [f32; 3],
    pub faces: FaceRects,
    /// Mesh-local translation relative to the owning part's pivot.
    pub offset: [f32; 3],
    /// Uniform scale baked into the vertex positions.
    pub scale: f32,
    pub layer: Layer,
}

impl CuboidDef {
    pub const fn base(spec: &BodyPartSpec, offset: [f32; 3]) -> Self {
        Self {
            size: [
                spec.size[0] as f32,
                spec.size[1] as f32,
                spec.size[2] as f32,
            ],
            faces: spec.base,
            offset,
            scale: 1.0,
            layer: Layer::Base,
        }
    }

    pub const fn overlay(spec: &BodyPartSpec, offset: [f32; 3], scale: f32) -> Self {
        let mut cuboid = Self::base(spec, offset);
        cuboid.faces = spec.overlay;
        cuboid.scale = scale;
        cuboid.layer = Layer::Overlay;
        cuboid
    }
}

#[derive(Debug, Clone, Copy)]
pub struct PartDef {
    pub name: &'static str,
    /// Index of the parent part; `None` attaches to the model root.
    pub parent: Option<usize>,
    /// Pivot relative to the parent, in skin pixels (+Y up).
    pub pivot: [f32; 3],
    /// Fixed rotation about the X axis, in radians.
    pub tilt: f32,
    pub cuboids: &'static [CuboidDef],
}

#[derive(Debug, Clone, Copy)]
pub struct ModelDef {
    pub atlas: Atlas,
    /// Parents always precede their children.
    pub parts: &'static [PartDef],
}
