use bevy::image::{ImageAddressMode, ImageSampler, ImageSamplerDescriptor};
use bevy::prelude::*;
use bevy::render::render_asset::RenderAssetUsages;
use bevy::render::render_resource::{Extent3d, TextureDimension, TextureFormat};
use image::{RgbaImage, imageops};

use crate::atlas::PixelRect;
use crate::error::LoadError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextureKind {
    Skin,
    Cape,
}

/// Legacy right limbs mirrored into the 1.8 left limb slots: (source, dest x, dest y).
const LEGACY_LIMB_COPIES: [(PixelRect, u32, u32); 12] = [
    (PixelRect::new(4, 16, 4, 4), 20, 48),
    (PixelRect::new(8, 16, 4, 4), 24, 48),
    (PixelRect::new(0, 20, 4, 12), 24, 52),
    (PixelRect::new(4, 20, 4, 12), 20, 52),
    (PixelRect::new(8, 20, 4, 12), 16, 52),
    (PixelRect::new(12, 20, 4, 12), 28, 52),
    (PixelRect::new(44, 16, 4, 4), 36, 48),
    (PixelRect::new(48, 16, 4, 4), 40, 48),
    (PixelRect::new(40, 20, 4, 12), 40, 52),
    (PixelRect::new(44, 20, 4, 12), 36, 52),
    (PixelRect::new(48, 20, 4, 12), 32, 52),
    (PixelRect::new(52, 20, 4, 12), 44, 52),
];

const HAT: PixelRect = PixelRect::new(32, 0, 32, 16);

/// Read the raw bytes behind `url`: `http(s)://` goes over the network, `file://` and bare
/// paths are read from disk.
pub async fn fetch_bytes(client: &reqwest::Client, url: &str) -> Result<Vec<u8>, LoadError> {
    if url.starts_with("http://") || url.starts_with("https://") {
        let response = client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(LoadError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }
        return Ok(response.bytes().await?.to_vec());
    }

    let path = url.strip_prefix("file://").unwrap_or(url);
    tokio::fs::read(path).await.map_err(|source| LoadError::Io {
        path: path.to_string(),
        source,
    })
}

/// Decode and bring an image into the modern atlas layout for its kind.
pub fn decode_texture(bytes: &[u8], kind: TextureKind) -> Result<RgbaImage, LoadError> {
    let rgba = image::load_from_memory(bytes)?.to_rgba8();
    match kind {
        TextureKind::Skin => normalize_skin(rgba),
        TextureKind::Cape => normalize_cape(rgba),
    }
}

fn normalize_skin(rgba: RgbaImage) -> Result<RgbaImage, LoadError> {
    let (width, height) = rgba.dimensions();
    if width == 0 || width % 64 != 0 {
        return Err(LoadError::UnexpectedSize {
            kind: "skin",
            width,
            height,
        });
    }
    if height == width {
        Ok(rgba)
    } else if height * 2 == width {
        Ok(convert_legacy_skin(&rgba))
    } else {
        Err(LoadError::UnexpectedSize {
            kind: "skin",
            width,
            height,
        })
    }
}

fn normalize_cape(rgba: RgbaImage) -> Result<RgbaImage, LoadError> {
    let (width, height) = rgba.dimensions();
    if width > 0 && width == height * 2 {
        return Ok(rgba);
    }
    // Old 22x17 capes are drawn onto a 64x32 canvas at the same scale.
    if width > 0 && width % 22 == 0 && width * 17 == height * 22 {
        let scale = width / 22;
        let mut canvas = RgbaImage::new(64 * scale, 32 * scale);
        imageops::replace(&mut canvas, &rgba, 0, 0);
        return Ok(canvas);
    }
    Err(LoadError::UnexpectedSize {
        kind: "cape",
        width,
        height,
    })
}

/// Expand a 64x32 (or scaled) pre-1.8 skin to the square layout.
pub fn convert_legacy_skin(legacy: &RgbaImage) -> RgbaImage {
    let scale = legacy.width() / 64;
    let mut skin = RgbaImage::new(legacy.width(), legacy.width());
    imageops::replace(&mut skin, legacy, 0, 0);

    for (source, dx, dy) in LEGACY_LIMB_COPIES {
        let region = imageops::crop_imm(
            legacy,
            source.x * scale,
            source.y * scale,
            source.width * scale,
            source.height * scale,
        )
        .to_image();
        let mirrored = imageops::flip_horizontal(&region);
        imageops::replace(
            &mut skin,
            &mirrored,
            (dx * scale) as i64,
            (dy * scale) as i64,
        );
    }

    clear_opaque_hat(&mut skin, scale);
    skin
}

/// Legacy skins often fill the hat area with a solid color that was never meant to render.
fn clear_opaque_hat(skin: &mut RgbaImage, scale: u32) {
    let xs = HAT.x * scale..(HAT.x + HAT.width) * scale;
    let ys = HAT.y * scale..(HAT.y + HAT.height) * scale;
    let opaque = ys
        .clone()
        .all(|y| xs.clone().all(|x| skin.get_pixel(x, y)[3] == 255));
    if !opaque {
        return;
    }
    for y in ys {
        for x in xs.clone() {
            skin.put_pixel(x, y, image::Rgba([0, 0, 0, 0]));
        }
    }
}

/// GPU image with pixel-art sampling: nearest filtering, clamped edges, no mip chain.
pub fn pixel_art_image(rgba: RgbaImage) -> Image {
    let (width, height) = rgba.dimensions();
    let mut image = Image::new(
        Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        },
        TextureDimension::D2,
        rgba.into_raw(),
        TextureFormat::Rgba8UnormSrgb,
        RenderAssetUsages::default(),
    );

    let mut sampler = ImageSamplerDescriptor::nearest();
    sampler.address_mode_u = ImageAddressMode::ClampToEdge;
    sampler.address_mode_v = ImageAddressMode::ClampToEdge;
    sampler.address_mode_w = ImageAddressMode::ClampToEdge;
    image.sampler = ImageSampler::Descriptor(sampler);
    image.texture_descriptor.mip_level_count = 1;
    image
}
