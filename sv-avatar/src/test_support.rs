use std::path::PathBuf;

use bevy::ecs::system::RunSystemOnce;
use bevy::prelude::*;
use image::{Rgba, RgbaImage};

use crate::cape::{CapeModel, create_cape_model};
use crate::player::{PlayerModel, create_player_model};
use crate::types::ModelVariant;

pub fn test_world() -> World {
    let mut world = World::new();
    world.init_resource::<Assets<Mesh>>();
    world.init_resource::<Assets<StandardMaterial>>();
    world.init_resource::<Assets<Image>>();
    world
}

pub fn spawn_player(world: &mut World, variant: ModelVariant) -> PlayerModel {
    world
        .run_system_once(
            move |mut commands: Commands,
                  mut meshes: ResMut<Assets<Mesh>>,
                  mut materials: ResMut<Assets<StandardMaterial>>| {
                create_player_model(&mut commands, &mut meshes, &mut materials, variant)
            },
        )
        .expect("spawn player")
}

pub fn spawn_cape(world: &mut World) -> CapeModel {
    world
        .run_system_once(
            |mut commands: Commands,
             mut meshes: ResMut<Assets<Mesh>>,
             mut materials: ResMut<Assets<StandardMaterial>>| {
                create_cape_model(&mut commands, &mut meshes, &mut materials)
            },
        )
        .expect("spawn cape")
}

pub fn attach_cape(
    world: &mut World,
    player: PlayerModel,
    cape: CapeModel,
) -> (PlayerModel, CapeModel) {
    let mut models = Some((player, cape));
    world
        .run_system_once(move |mut commands: Commands| {
            let (mut player, cape) = models.take().expect("system runs once");
            player.attach_cape(&mut commands, &cape);
            (player, cape)
        })
        .expect("attach cape")
}

pub fn dispose_player(world: &mut World, model: PlayerModel) -> PlayerModel {
    let mut model = Some(model);
    world
        .run_system_once(
            move |mut commands: Commands,
                  mut meshes: ResMut<Assets<Mesh>>,
                  mut materials: ResMut<Assets<StandardMaterial>>| {
                let mut model = model.take().expect("system runs once");
                model.dispose(&mut commands, &mut meshes, &mut materials);
                model
            },
        )
        .expect("dispose player")
}

pub fn dispose_cape(world: &mut World, cape: CapeModel) -> CapeModel {
    let mut cape = Some(cape);
    world
        .run_system_once(
            move |mut commands: Commands,
                  mut meshes: ResMut<Assets<Mesh>>,
                  mut materials: ResMut<Assets<StandardMaterial>>| {
                let mut cape = cape.take().expect("system runs once");
                cape.dispose(&mut commands, &mut meshes, &mut materials);
                cape
            },
        )
        .expect("dispose cape")
}

/// Write a gradient PNG into a per-process temp directory and return it as a `file://` URL.
pub fn write_png(name: &str, width: u32, height: u32) -> String {
    let dir: PathBuf = std::env::temp_dir().join(format!("sv-avatar-tests-{}", std::process::id()));
    std::fs::create_dir_all(&dir).expect("create temp dir");
    let path = dir.join(name);
    RgbaImage::from_fn(width, height, |x, y| {
        Rgba([(x * 4) as u8, (y * 4) as u8, 128, 255])
    })
    .save(&path)
    .expect("write png");
    format!("file://{}", path.display())
}
