use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use bevy::prelude::*;
use image::RgbaImage;
use tokio::runtime::Runtime;
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender, unbounded_channel};
use tracing::{debug, info, warn};

use crate::cape::CapeModel;
use crate::config::AvatarSettings;
use crate::decode::{TextureKind, decode_texture, fetch_bytes, pixel_art_image};
use crate::error::LoadError;
use crate::material::{LayerMaterials, bind_texture};
use crate::player::PlayerModel;

/// Handle for one texture request; returned immediately, matched by its [`LoadOutcome`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LoadId(u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadKind {
    Skin,
    Cape,
    Preload,
}

#[derive(Debug)]
pub struct LoadOutcome {
    pub id: LoadId,
    pub kind: LoadKind,
    pub result: Result<(), LoadError>,
}

impl LoadOutcome {
    pub fn is_ok(&self) -> bool {
        self.result.is_ok()
    }
}

#[derive(Event, Debug)]
pub struct TextureLoadFinished(pub LoadOutcome);

enum Target {
    Skin(LayerMaterials),
    Cape(Handle<StandardMaterial>),
    Preload(LoadId),
}

struct DecodeResult {
    id: LoadId,
    url: String,
    result: Result<RgbaImage, LoadError>,
}

/// Fetches and decodes textures off the main thread, binds them to model materials when
/// they arrive and keeps one shared image per cape URL.
#[derive(Resource)]
pub struct SkinTextureLoader {
    runtime: Arc<Runtime>,
    client: reqwest::Client,
    result_tx: UnboundedSender<DecodeResult>,
    result_rx: Mutex<UnboundedReceiver<DecodeResult>>,
    cape_cache: HashMap<String, Handle<Image>>,
    in_flight: HashMap<LoadId, Target>,
    /// Preload batch id -> requests still outstanding.
    batches: HashMap<LoadId, usize>,
    ready: Vec<LoadOutcome>,
    next_id: u64,
    decodes: u64,
}

impl FromWorld for SkinTextureLoader {
    fn from_world(world: &mut World) -> Self {
        let settings = world
            .get_resource::<AvatarSettings>()
            .cloned()
            .unwrap_or_default();
        Self::new(&settings).expect("Failed to start texture loader")
    }
}

impl SkinTextureLoader {
    pub fn new(settings: &AvatarSettings) -> Result<Self, LoadError> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(settings.worker_threads.max(1))
            .thread_name("sv-avatar-textures")
            .enable_all()
            .build()
            .map_err(LoadError::Runtime)?;
        let client = reqwest::Client::builder()
            .user_agent(settings.user_agent.clone())
            .build()?;
        let (result_tx, result_rx) = unbounded_channel();

        Ok(Self {
            runtime: Arc::new(runtime),
            client,
            result_tx,
            result_rx: Mutex::new(result_rx),
            cape_cache: HashMap::new(),
            in_flight: HashMap::new(),
            batches: HashMap::new(),
            ready: Vec::new(),
            next_id: 0,
            decodes: 0,
        })
    }

    /// Start loading a skin for `model`. On success the decoded texture replaces whatever
    /// both layer materials held before; on failure they are left alone.
    pub fn load_skin_texture(&mut self, model: &PlayerModel, url: &str) -> LoadId {
        let id = self.allocate_id();
        self.in_flight
            .insert(id, Target::Skin(model.materials.clone()));
        self.spawn_decode(id, url.to_string(), TextureKind::Skin);
        id
    }

    /// Start loading a cape for `cape`. A URL already in the cache is bound right away and
    /// its outcome is reported by the next [`poll`](Self::poll).
    pub fn load_cape_texture(
        &mut self,
        cape: &CapeModel,
        url: &str,
        materials: &mut Assets<StandardMaterial>,
    ) -> LoadId {
        let id = self.allocate_id();
        if let Some(cached) = self.cape_cache.get(url) {
            debug!("cape cache hit for {url}");
            let result = if bind_texture(materials, &cape.material, Some(cached.clone())) {
                Ok(())
            } else {
                Err(LoadError::Released)
            };
            self.ready.push(LoadOutcome {
                id,
                kind: LoadKind::Cape,
                result,
            });
            return id;
        }

        self.in_flight
            .insert(id, Target::Cape(cape.material.clone()));
        self.spawn_decode(id, url.to_string(), TextureKind::Cape);
        id
    }

    /// Warm the cape cache. The batch always resolves `Ok`; individual failures are logged.
    pub fn preload_cape_textures<I, S>(&mut self, urls: I) -> LoadId
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let batch = self.allocate_id();
        let mut outstanding = 0;
        for url in urls {
            let url = url.into();
            if self.cape_cache.contains_key(&url) {
                continue;
            }
            let id = self.allocate_id();
            self.in_flight.insert(id, Target::Preload(batch));
            self.spawn_decode(id, url, TextureKind::Cape);
            outstanding += 1;
        }

        if outstanding == 0 {
            self.ready.push(LoadOutcome {
                id: batch,
                kind: LoadKind::Preload,
                result: Ok(()),
            });
        } else {
            self.batches.insert(batch, outstanding);
        }
        batch
    }

    /// Apply every finished request without blocking.
    pub fn poll(
        &mut self,
        images: &mut Assets<Image>,
        materials: &mut Assets<StandardMaterial>,
    ) -> Vec<LoadOutcome> {
        let mut outcomes = std::mem::take(&mut self.ready);
        let mut finished = Vec::new();
        {
            let rx = self
                .result_rx
                .get_mut()
                .unwrap_or_else(PoisonError::into_inner);
            while let Ok(result) = rx.try_recv() {
                finished.push(result);
            }
        }
        for result in finished {
            self.apply(result, images, materials, &mut outcomes);
        }
        outcomes
    }

    /// Block until no request is in flight. Must not be called from inside an async task.
    pub fn wait(
        &mut self,
        images: &mut Assets<Image>,
        materials: &mut Assets<StandardMaterial>,
    ) -> Vec<LoadOutcome> {
        let mut outcomes = std::mem::take(&mut self.ready);
        while !self.in_flight.is_empty() {
            let received = self
                .result_rx
                .get_mut()
                .unwrap_or_else(PoisonError::into_inner)
                .blocking_recv();
            let Some(result) = received else {
                break;
            };
            self.apply(result, images, materials, &mut outcomes);
        }
        outcomes
    }

    pub fn pending(&self) -> usize {
        self.in_flight.len()
    }

    /// Number of fetch/decode jobs started so far.
    pub fn decode_count(&self) -> u64 {
        self.decodes
    }

    pub fn cached_cape(&self, url: &str) -> Option<&Handle<Image>> {
        self.cape_cache.get(url)
    }

    pub fn cape_cache_len(&self) -> usize {
        self.cape_cache.len()
    }

    fn allocate_id(&mut self) -> LoadId {
        self.next_id += 1;
        LoadId(self.next_id)
    }

    fn spawn_decode(&mut self, id: LoadId, url: String, kind: TextureKind) {
        self.decodes += 1;
        debug!("fetching {kind:?} texture {url}");
        let client = self.client.clone();
        let result_tx = self.result_tx.clone();
        self.runtime.spawn(async move {
            let result = match fetch_bytes(&client, &url).await {
                Ok(bytes) => tokio::task::spawn_blocking(move || decode_texture(&bytes, kind))
                    .await
                    .unwrap_or_else(|err| Err(LoadError::Worker(err.to_string()))),
                Err(err) => Err(err),
            };
            let _ = result_tx.send(DecodeResult { id, url, result });
        });
    }

    fn apply(
        &mut self,
        finished: DecodeResult,
        images: &mut Assets<Image>,
        materials: &mut Assets<StandardMaterial>,
        outcomes: &mut Vec<LoadOutcome>,
    ) {
        let DecodeResult { id, url, result } = finished;
        let Some(target) = self.in_flight.remove(&id) else {
            return;
        };

        match target {
            Target::Skin(layers) => {
                let result = result.and_then(|decoded| {
                    if !materials.contains(&layers.base) || !materials.contains(&layers.overlay)
                    {
                        return Err(LoadError::Released);
                    }
                    let texture = images.add(pixel_art_image(decoded));
                    bind_texture(materials, &layers.base, Some(texture.clone()));
                    bind_texture(materials, &layers.overlay, Some(texture));
                    Ok(())
                });
                match &result {
                    Ok(()) => info!("bound skin texture {url}"),
                    Err(err) => warn!("skin texture {url} rejected: {err}"),
                }
                outcomes.push(LoadOutcome {
                    id,
                    kind: LoadKind::Skin,
                    result,
                });
            }
            Target::Cape(material) => {
                let result = result.and_then(|decoded| {
                    let texture = self.insert_cape(url.clone(), decoded, images);
                    if bind_texture(materials, &material, Some(texture)) {
                        Ok(())
                    } else {
                        Err(LoadError::Released)
                    }
                });
                match &result {
                    Ok(()) => info!("bound cape texture {url}"),
                    Err(err) => warn!("cape texture {url} rejected: {err}"),
                }
                outcomes.push(LoadOutcome {
                    id,
                    kind: LoadKind::Cape,
                    result,
                });
            }
            Target::Preload(batch) => {
                match result {
                    Ok(decoded) => {
                        self.insert_cape(url, decoded, images);
                    }
                    Err(err) => debug!("skipping cape preload {url}: {err}"),
                }
                if let Some(outstanding) = self.batches.get_mut(&batch) {
                    *outstanding -= 1;
                    if *outstanding == 0 {
                        self.batches.remove(&batch);
                        outcomes.push(LoadOutcome {
                            id: batch,
                            kind: LoadKind::Preload,
                            result: Ok(()),
                        });
                    }
                }
            }
        }
    }

    /// First completion for a URL wins; later duplicates reuse its image.
    fn insert_cape(
        &mut self,
        url: String,
        decoded: RgbaImage,
        images: &mut Assets<Image>,
    ) -> Handle<Image> {
        self.cape_cache
            .entry(url)
            .or_insert_with(|| images.add(pixel_art_image(decoded)))
            .clone()
    }
}

pub fn apply_texture_loads(
    mut loader: ResMut<SkinTextureLoader>,
    mut images: ResMut<Assets<Image>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    mut finished: EventWriter<TextureLoadFinished>,
) {
    for outcome in loader.poll(&mut images, &mut materials) {
        finished.write(TextureLoadFinished(outcome));
    }
}

pub fn preload_configured_capes(
    settings: Res<AvatarSettings>,
    mut loader: ResMut<SkinTextureLoader>,
) {
    if settings.preload_capes.is_empty() {
        return;
    }
    info!("preloading {} cape textures", settings.preload_capes.len());
    loader.preload_cape_textures(settings.preload_capes.iter().cloned());
}
