use std::path::PathBuf;

use bevy::log::LogPlugin;
use bevy::prelude::*;
use clap::Parser;
use sv_avatar::material::{bind_texture, bound_texture};
use sv_avatar::player::PlayerModelRoot;
use sv_avatar::{
    AvatarPlugin, AvatarSettings, CapeModel, LoadId, LoadKind, ModelVariant, PlayerModel,
    SkinTextureLoader, TextureLoadFinished, create_cape_model, create_player_model,
};
use tracing::{error, info, warn};

#[derive(Parser, Debug)]
#[command(name = "sv-viewer", about = "Preview a player skin and cape")]
struct Args {
    /// Skin URL or file path.
    #[arg(long)]
    skin: Option<String>,
    /// Cape URL or file path.
    #[arg(long)]
    cape: Option<String>,
    /// classic/steve or slim/alex.
    #[arg(long, default_value_t = ModelVariant::Classic)]
    variant: ModelVariant,
    /// JSON settings file; falls back to $SV_AVATAR_CONFIG.
    #[arg(long)]
    config: Option<PathBuf>,
}

#[derive(Resource, Debug, Clone)]
struct ViewerRequest {
    skin: Option<String>,
    cape: Option<String>,
    variant: ModelVariant,
}

#[derive(Resource)]
struct Avatar {
    player: PlayerModel,
    cape: Option<CapeModel>,
    /// Skin load not yet reported back, with the URL it was issued for.
    pending_skin: Option<(LoadId, String)>,
    used_fallback: bool,
}

fn main() -> AppExit {
    tracing_subscriber::fmt().without_time().compact().init();

    let args = Args::parse();
    let settings = match AvatarSettings::resolve(args.config.as_deref()) {
        Ok(settings) => settings,
        Err(err) => {
            error!("failed to load settings: {err}");
            return AppExit::error();
        }
    };

    info!("Starting sv-viewer");
    App::new()
        .add_plugins(
            DefaultPlugins
                .set(WindowPlugin {
                    primary_window: Some(Window {
                        title: "sv-viewer".into(),
                        ..default()
                    }),
                    ..default()
                })
                .disable::<LogPlugin>(),
        )
        .add_plugins(AvatarPlugin { settings })
        .insert_resource(ViewerRequest {
            skin: args.skin,
            cape: args.cape,
            variant: args.variant,
        })
        .insert_resource(AmbientLight {
            brightness: 400.0,
            ..default()
        })
        .add_systems(Startup, setup_scene)
        .add_systems(
            Update,
            (fall_back_on_skin_error, toggle_variant, spin_avatar),
        )
        .run()
}

fn setup_scene(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    mut loader: ResMut<SkinTextureLoader>,
    request: Res<ViewerRequest>,
    settings: Res<AvatarSettings>,
) {
    commands.spawn((
        Camera3d::default(),
        Transform::from_xyz(0.0, 22.0, 56.0).looking_at(Vec3::new(0.0, 16.0, 0.0), Vec3::Y),
    ));
    commands.spawn((
        DirectionalLight {
            illuminance: 6000.0,
            ..default()
        },
        Transform::from_xyz(20.0, 40.0, 30.0).looking_at(Vec3::ZERO, Vec3::Y),
    ));

    let mut player = create_player_model(
        &mut commands,
        &mut meshes,
        &mut materials,
        request.variant,
    );

    let cape = request.cape.as_deref().map(|url| {
        let cape = create_cape_model(&mut commands, &mut meshes, &mut materials);
        player.attach_cape(&mut commands, &cape);
        loader.load_cape_texture(&cape, url, &mut materials);
        cape
    });

    let skin_url = request
        .skin
        .as_deref()
        .or(settings.fallback_skin.as_deref());
    let pending_skin =
        skin_url.map(|url| (loader.load_skin_texture(&player, url), url.to_string()));
    if pending_skin.is_none() {
        warn!("no skin given; showing an untextured model");
    }

    commands.insert_resource(Avatar {
        player,
        cape,
        used_fallback: request.skin.is_none(),
        pending_skin,
    });
}

fn fall_back_on_skin_error(
    mut finished: EventReader<TextureLoadFinished>,
    mut loader: ResMut<SkinTextureLoader>,
    mut avatar: ResMut<Avatar>,
    settings: Res<AvatarSettings>,
) {
    for TextureLoadFinished(outcome) in finished.read() {
        let current = avatar.pending_skin.as_ref().map(|(id, _)| *id);
        if outcome.kind != LoadKind::Skin || Some(outcome.id) != current {
            continue;
        }
        avatar.pending_skin = None;
        let Err(err) = &outcome.result else {
            continue;
        };
        if avatar.used_fallback {
            continue;
        }
        let Some(fallback) = settings.fallback_skin.as_deref() else {
            continue;
        };
        warn!("skin failed ({err}); loading fallback {fallback}");
        let id = loader.load_skin_texture(&avatar.player, fallback);
        avatar.used_fallback = true;
        avatar.pending_skin = Some((id, fallback.to_string()));
    }
}

/// Space swaps classic and slim arms, carrying the current skin over to the new model.
fn toggle_variant(
    keys: Res<ButtonInput<KeyCode>>,
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    mut loader: ResMut<SkinTextureLoader>,
    mut avatar: ResMut<Avatar>,
    roots: Query<&Transform, With<PlayerModelRoot>>,
) {
    if !keys.just_pressed(KeyCode::Space) {
        return;
    }
    let avatar = &mut *avatar;

    let variant = avatar.player.variant.toggled();
    let texture = bound_texture(&materials, &avatar.player.materials.base);
    let transform = roots
        .get(avatar.player.root)
        .copied()
        .unwrap_or_default();

    avatar
        .player
        .dispose(&mut commands, &mut meshes, &mut materials);

    let mut player = create_player_model(&mut commands, &mut meshes, &mut materials, variant);
    commands.entity(player.root).insert(transform);
    if let Some(texture) = texture {
        bind_texture(&mut materials, &player.materials.base, Some(texture.clone()));
        bind_texture(&mut materials, &player.materials.overlay, Some(texture));
    }
    // The old request would land on disposed materials; point it at the new model.
    if let Some((id, url)) = &mut avatar.pending_skin {
        *id = loader.load_skin_texture(&player, url);
    }
    if let Some(cape) = &avatar.cape {
        player.attach_cape(&mut commands, cape);
    }
    info!("switched to {variant} model");
    avatar.player = player;
}

fn spin_avatar(time: Res<Time>, mut roots: Query<&mut Transform, With<PlayerModelRoot>>) {
    for mut transform in &mut roots {
        transform.rotate_y(0.5 * time.delta_secs());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bevy::ecs::system::RunSystemOnce;
    use image::{Rgba, RgbaImage};
    use sv_avatar::LoadError;

    fn write_skin(name: &str) -> String {
        let dir = std::env::temp_dir().join(format!("sv-viewer-tests-{}", std::process::id()));
        std::fs::create_dir_all(&dir).expect("create temp dir");
        let path = dir.join(name);
        RgbaImage::from_pixel(64, 64, Rgba([90, 60, 30, 255]))
            .save(&path)
            .expect("write png");
        path.display().to_string()
    }

    #[test]
    fn toggle_reissues_pending_skin_for_rebuilt_model() {
        let mut world = World::new();
        world.init_resource::<Assets<Mesh>>();
        world.init_resource::<Assets<StandardMaterial>>();
        world.init_resource::<Assets<Image>>();
        world.insert_resource(AvatarSettings {
            worker_threads: 1,
            ..default()
        });
        world.init_resource::<SkinTextureLoader>();

        let url = write_skin("toggle_pending.png");
        let avatar = world
            .run_system_once(
                move |mut commands: Commands,
                      mut meshes: ResMut<Assets<Mesh>>,
                      mut materials: ResMut<Assets<StandardMaterial>>,
                      mut loader: ResMut<SkinTextureLoader>| {
                    let player = create_player_model(
                        &mut commands,
                        &mut meshes,
                        &mut materials,
                        ModelVariant::Classic,
                    );
                    let id = loader.load_skin_texture(&player, &url);
                    Avatar {
                        player,
                        cape: None,
                        pending_skin: Some((id, url.clone())),
                        used_fallback: true,
                    }
                },
            )
            .expect("spawn avatar");
        let stale = avatar.pending_skin.as_ref().map(|(id, _)| *id).unwrap();
        world.insert_resource(avatar);

        let mut keys = ButtonInput::<KeyCode>::default();
        keys.press(KeyCode::Space);
        world.insert_resource(keys);
        world.run_system_once(toggle_variant).expect("toggle");

        let avatar = world.resource::<Avatar>();
        assert_eq!(avatar.player.variant, ModelVariant::Slim);
        let fresh = avatar.pending_skin.as_ref().map(|(id, _)| *id).unwrap();
        assert_ne!(fresh, stale);
        let base = avatar.player.materials.base.clone();
        let overlay = avatar.player.materials.overlay.clone();

        let mut loader = world.remove_resource::<SkinTextureLoader>().unwrap();
        let mut images = world.remove_resource::<Assets<Image>>().unwrap();
        let mut materials = world
            .remove_resource::<Assets<StandardMaterial>>()
            .unwrap();
        let outcomes = loader.wait(&mut images, &mut materials);

        let stale_outcome = outcomes.iter().find(|o| o.id == stale).unwrap();
        assert!(matches!(stale_outcome.result, Err(LoadError::Released)));
        assert!(outcomes.iter().any(|o| o.id == fresh && o.is_ok()));
        assert!(bound_texture(&materials, &base).is_some());
        assert!(bound_texture(&materials, &overlay).is_some());
    }
}
