use std::f32::consts::PI;

use bevy::prelude::*;
use tracing::debug;

use crate::atlas::{CAPE_ATLAS, CAPE_FACES, CAPE_SIZE};
use crate::material::{LayerMaterials, base_layer_material};
use crate::mesh::spawn_model;
use crate::types::ModelDef;
use crate::{cuboid, part};

pub const CAPE_PIVOT: usize = 0;

/// Static lean away from the back; there is no cloth simulation.
pub const CAPE_TILT: f32 = 0.1 * PI;

pub static CAPE_MODEL: ModelDef = ModelDef {
    atlas: CAPE_ATLAS,
    parts: &[
        // Top-back of the player, half a pixel behind the 4px deep torso.
        part! {
            name: "cape",
            parent: None,
            pivot: (0.0, 24.0, -2.5),
            tilt: CAPE_TILT,
            cuboids: [
                cuboid! {
                    size: (CAPE_SIZE[0], CAPE_SIZE[1], CAPE_SIZE[2]),
                    faces: CAPE_FACES,
                    offset: (0.0, -8.0, 0.0),
                    scale: 1.0,
                    layer: Base,
                },
            ],
        },
    ],
};

#[derive(Component, Debug, Clone, Copy)]
pub struct CapeModelRoot;

#[derive(Debug)]
pub struct CapeModel {
    /// Root node; place it at the player root or hand it to [`PlayerModel::attach_cape`].
    ///
    /// [`PlayerModel::attach_cape`]: crate::player::PlayerModel::attach_cape
    pub root: Entity,
    pub pivot: Entity,
    pub material: Handle<StandardMaterial>,
    pub(crate) meshes: Vec<Handle<Mesh>>,
    pub(crate) released: bool,
}

impl CapeModel {
    pub fn is_released(&self) -> bool {
        self.released
    }
}

pub fn create_cape_model(
    commands: &mut Commands,
    meshes: &mut Assets<Mesh>,
    materials: &mut Assets<StandardMaterial>,
) -> CapeModel {
    let material = materials.add(base_layer_material());
    let spawned = spawn_model(
        commands,
        meshes,
        &LayerMaterials::single(material.clone()),
        &CAPE_MODEL,
        "Cape",
    );
    commands.entity(spawned.root).insert(CapeModelRoot);
    debug!("spawned cape model");

    CapeModel {
        root: spawned.root,
        pivot: spawned.parts[CAPE_PIVOT],
        material,
        meshes: spawned.meshes,
        released: false,
    }
}
