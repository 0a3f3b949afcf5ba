use bevy::prelude::*;
use tracing::debug;

use crate::cape::CapeModel;
use crate::atlas::{
    BODY, BodyPartSpec, HEAD, LEFT_ARM, LEFT_ARM_SLIM, LEFT_LEG, RIGHT_ARM, RIGHT_ARM_SLIM,
    RIGHT_LEG, SKIN_ATLAS,
};
use crate::material::LayerMaterials;
use crate::mesh::spawn_model;
use crate::types::{CuboidDef, ModelDef, ModelVariant};
use crate::part;

// Part indices for `PLAYER_MODEL_CLASSIC` and `PLAYER_MODEL_SLIM`.
pub const PLAYER_BODY: usize = 0;
pub const PLAYER_HEAD: usize = 1;
pub const PLAYER_RIGHT_ARM: usize = 2;
pub const PLAYER_LEFT_ARM: usize = 3;
pub const PLAYER_RIGHT_LEG: usize = 4;
pub const PLAYER_LEFT_LEG: usize = 5;

pub const OVERLAY_SCALE: f32 = 1.05;
/// The hat sits further out so it clears the enlarged jacket at the neck.
pub const HEAD_OVERLAY_SCALE: f32 = 1.10;

const TORSO_HALF_WIDTH: f32 = BODY.size[0] as f32 / 2.0;
const ORIGIN: [f32; 3] = [0.0, 0.0, 0.0];
/// Limb meshes hang below their pivot so rotations swing from the shoulder or hip.
const LIMB_DROP: [f32; 3] = [0.0, -6.0, 0.0];

/// Shoulder pivot x that keeps the arm against the side of the torso whatever its width.
const fn shoulder_x(arm: &BodyPartSpec) -> f32 {
    TORSO_HALF_WIDTH + arm.width() / 2.0
}

macro_rules! player_model {
    ($right_arm:expr, $left_arm:expr) => {
        ModelDef {
            atlas: SKIN_ATLAS,
            parts: &[
                part! {
                    name: "body",
                    parent: None,
                    pivot: (0.0, 18.0, 0.0),
                    cuboids: [
                        CuboidDef::base(&BODY, ORIGIN),
                        CuboidDef::overlay(&BODY, ORIGIN, OVERLAY_SCALE),
                    ],
                },
                // Half torso height + half head height above the body pivot.
                part! {
                    name: "head",
                    parent: Some(PLAYER_BODY),
                    pivot: (0.0, 10.0, 0.0),
                    cuboids: [
                        CuboidDef::base(&HEAD, ORIGIN),
                        CuboidDef::overlay(&HEAD, ORIGIN, HEAD_OVERLAY_SCALE),
                    ],
                },
                part! {
                    name: "right_arm",
                    parent: Some(PLAYER_BODY),
                    pivot: (-shoulder_x(&$right_arm), 6.0, 0.0),
                    cuboids: [
                        CuboidDef::base(&$right_arm, LIMB_DROP),
                        CuboidDef::overlay(&$right_arm, LIMB_DROP, OVERLAY_SCALE),
                    ],
                },
                part! {
                    name: "left_arm",
                    parent: Some(PLAYER_BODY),
                    pivot: (shoulder_x(&$left_arm), 6.0, 0.0),
                    cuboids: [
                        CuboidDef::base(&$left_arm, LIMB_DROP),
                        CuboidDef::overlay(&$left_arm, LIMB_DROP, OVERLAY_SCALE),
                    ],
                },
                // Legs hang off the root so torso rotations leave them planted.
                part! {
                    name: "right_leg",
                    parent: None,
                    pivot: (-2.0, 12.0, 0.0),
                    cuboids: [
                        CuboidDef::base(&RIGHT_LEG, LIMB_DROP),
                        CuboidDef::overlay(&RIGHT_LEG, LIMB_DROP, OVERLAY_SCALE),
                    ],
                },
                part! {
                    name: "left_leg",
                    parent: None,
                    pivot: (2.0, 12.0, 0.0),
                    cuboids: [
                        CuboidDef::base(&LEFT_LEG, LIMB_DROP),
                        CuboidDef::overlay(&LEFT_LEG, LIMB_DROP, OVERLAY_SCALE),
                    ],
                },
            ],
        }
    };
}

pub static PLAYER_MODEL_CLASSIC: ModelDef = player_model!(RIGHT_ARM, LEFT_ARM);
pub static PLAYER_MODEL_SLIM: ModelDef = player_model!(RIGHT_ARM_SLIM, LEFT_ARM_SLIM);

pub fn player_model_def(variant: ModelVariant) -> &'static ModelDef {
    match variant {
        ModelVariant::Classic => &PLAYER_MODEL_CLASSIC,
        ModelVariant::Slim => &PLAYER_MODEL_SLIM,
    }
}

/// Marker on the root entity of a spawned player model.
#[derive(Component, Debug, Clone, Copy)]
pub struct PlayerModelRoot {
    pub variant: ModelVariant,
}

/// Pivot entities external pose code may rotate.
#[derive(Debug, Clone, Copy)]
pub struct PlayerParts {
    pub body: Entity,
    pub head: Entity,
    pub right_arm: Entity,
    pub left_arm: Entity,
    pub right_leg: Entity,
    pub left_leg: Entity,
}

#[derive(Debug)]
pub struct PlayerModel {
    pub variant: ModelVariant,
    pub root: Entity,
    pub parts: PlayerParts,
    pub materials: LayerMaterials,
    pub(crate) meshes: Vec<Handle<Mesh>>,
    /// Cape roots parented under `root`; detached again before the player is despawned.
    pub(crate) capes: Vec<Entity>,
    pub(crate) released: bool,
}

impl PlayerModel {
    /// Parent `cape` under the player root. The cape keeps its own lifecycle: disposing the
    /// player detaches it instead of despawning it.
    pub fn attach_cape(&mut self, commands: &mut Commands, cape: &CapeModel) {
        if self.released || cape.is_released() {
            return;
        }
        commands.entity(self.root).add_child(cape.root);
        if !self.capes.contains(&cape.root) {
            self.capes.push(cape.root);
        }
    }

    pub fn is_released(&self) -> bool {
        self.released
    }
}

pub fn create_player_model(
    commands: &mut Commands,
    meshes: &mut Assets<Mesh>,
    materials: &mut Assets<StandardMaterial>,
    variant: ModelVariant,
) -> PlayerModel {
    let layers = LayerMaterials::new(materials);
    let spawned = spawn_model(
        commands,
        meshes,
        &layers,
        player_model_def(variant),
        "Player",
    );
    commands
        .entity(spawned.root)
        .insert(PlayerModelRoot { variant });
    debug!(
        "spawned {variant} player model with {} meshes",
        spawned.meshes.len()
    );

    PlayerModel {
        variant,
        root: spawned.root,
        parts: PlayerParts {
            body: spawned.parts[PLAYER_BODY],
            head: spawned.parts[PLAYER_HEAD],
            right_arm: spawned.parts[PLAYER_RIGHT_ARM],
            left_arm: spawned.parts[PLAYER_LEFT_ARM],
            right_leg: spawned.parts[PLAYER_RIGHT_LEG],
            left_leg: spawned.parts[PLAYER_LEFT_LEG],
        },
        materials: layers,
        meshes: spawned.meshes,
        capes: Vec::new(),
        released: false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Layer;

    fn pivot(variant: ModelVariant, part: usize) -> Vec3 {
        Vec3::from_array(player_model_def(variant).parts[part].pivot)
    }

    #[test]
    fn arm_offsets_follow_variant() {
        assert_eq!(pivot(ModelVariant::Classic, PLAYER_RIGHT_ARM).x, -6.0);
        assert_eq!(pivot(ModelVariant::Classic, PLAYER_LEFT_ARM).x, 6.0);
        assert_eq!(pivot(ModelVariant::Slim, PLAYER_RIGHT_ARM).x, -5.5);
        assert_eq!(pivot(ModelVariant::Slim, PLAYER_LEFT_ARM).x, 5.5);
    }

    #[test]
    fn non_arm_parts_match_between_variants() {
        for part in [PLAYER_BODY, PLAYER_HEAD, PLAYER_RIGHT_LEG, PLAYER_LEFT_LEG] {
            assert_eq!(
                pivot(ModelVariant::Classic, part),
                pivot(ModelVariant::Slim, part)
            );
            let classic = &PLAYER_MODEL_CLASSIC.parts[part].cuboids[0];
            let slim = &PLAYER_MODEL_SLIM.parts[part].cuboids[0];
            assert_eq!(classic.faces, slim.faces);
            assert_eq!(classic.size, slim.size);
        }
        assert_eq!(pivot(ModelVariant::Classic, PLAYER_BODY), Vec3::new(0.0, 18.0, 0.0));
        assert_eq!(pivot(ModelVariant::Classic, PLAYER_HEAD), Vec3::new(0.0, 10.0, 0.0));
        assert_eq!(pivot(ModelVariant::Classic, PLAYER_RIGHT_LEG), Vec3::new(-2.0, 12.0, 0.0));
        assert_eq!(pivot(ModelVariant::Classic, PLAYER_LEFT_LEG), Vec3::new(2.0, 12.0, 0.0));
    }

    #[test]
    fn arm_outer_edge_stays_flush_with_torso() {
        for variant in [ModelVariant::Classic, ModelVariant::Slim] {
            let def = player_model_def(variant);
            let arm = &def.parts[PLAYER_RIGHT_ARM];
            let width = arm.cuboids[0].size[0];
            assert_eq!(width, variant.arm_width() as f32);
            // Inner edge of the right arm touches the torso side at x = -4.
            assert_eq!(arm.pivot[0] + width / 2.0, -4.0);
        }
    }

    #[test]
    fn hierarchy_parents_upper_body_to_torso_and_legs_to_root() {
        let parts = PLAYER_MODEL_CLASSIC.parts;
        assert_eq!(parts[PLAYER_BODY].parent, None);
        assert_eq!(parts[PLAYER_HEAD].parent, Some(PLAYER_BODY));
        assert_eq!(parts[PLAYER_RIGHT_ARM].parent, Some(PLAYER_BODY));
        assert_eq!(parts[PLAYER_LEFT_ARM].parent, Some(PLAYER_BODY));
        assert_eq!(parts[PLAYER_RIGHT_LEG].parent, None);
        assert_eq!(parts[PLAYER_LEFT_LEG].parent, None);
        for (idx, part) in parts.iter().enumerate() {
            if let Some(parent) = part.parent {
                assert!(parent < idx, "{} listed before its parent", part.name);
            }
        }
    }

    #[test]
    fn every_surface_pairs_a_base_with_a_larger_overlay() {
        for def in [&PLAYER_MODEL_CLASSIC, &PLAYER_MODEL_SLIM] {
            for part in def.parts {
                let [base, overlay] = part.cuboids else {
                    panic!("{} should have exactly two layers", part.name);
                };
                assert_eq!(base.layer, Layer::Base);
                assert_eq!(overlay.layer, Layer::Overlay);
                assert!(overlay.scale > base.scale);
                assert_eq!(base.offset, overlay.offset);
                assert_eq!(base.size, overlay.size);
            }
            assert_eq!(def.parts[PLAYER_HEAD].cuboids[1].scale, HEAD_OVERLAY_SCALE);
            assert_eq!(def.parts[PLAYER_BODY].cuboids[1].scale, OVERLAY_SCALE);
        }
    }

    #[test]
    fn limbs_hang_below_their_pivot() {
        for part in [PLAYER_RIGHT_ARM, PLAYER_LEFT_ARM, PLAYER_RIGHT_LEG, PLAYER_LEFT_LEG] {
            assert_eq!(PLAYER_MODEL_SLIM.parts[part].cuboids[0].offset, [0.0, -6.0, 0.0]);
        }
        assert_eq!(PLAYER_MODEL_SLIM.parts[PLAYER_HEAD].cuboids[0].offset, [0.0; 3]);
    }
}
