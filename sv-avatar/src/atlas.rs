//! Fixed pixel layout of the skin and cape atlases.
//!
//! Every region is a compile-time constant. Faces are named from the point of view of someone
//! standing in front of the model: `Face::Right` is the +X side of a box, which is the
//! *player's* left.

/// A fixed-size source image convention.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Atlas {
    pub width: u32,
    pub height: u32,
}

/// Skin layout introduced in 1.8 (with overlay layers for every part).
pub const SKIN_ATLAS: Atlas = Atlas {
    width: 64,
    height: 64,
};

pub const CAPE_ATLAS: Atlas = Atlas {
    width: 64,
    height: 32,
};

/// Pixel rectangle inside an atlas; origin is the top-left corner of the image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl PixelRect {
    pub const fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub const fn fits(self, atlas: Atlas) -> bool {
        self.x + self.width <= atlas.width && self.y + self.height <= atlas.height
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Face {
    /// +X
    Right,
    /// -X
    Left,
    /// +Y
    Top,
    /// -Y
    Bottom,
    /// +Z, the side the avatar looks towards.
    Front,
    /// -Z
    Back,
}

impl Face {
    /// Order in which the geometry builder emits faces.
    pub const ALL: [Face; 6] = [
        Face::Right,
        Face::Left,
        Face::Top,
        Face::Bottom,
        Face::Front,
        Face::Back,
    ];

    pub const fn normal(self) -> [f32; 3] {
        match self {
            Face::Right => [1.0, 0.0, 0.0],
            Face::Left => [-1.0, 0.0, 0.0],
            Face::Top => [0.0, 1.0, 0.0],
            Face::Bottom => [0.0, -1.0, 0.0],
            Face::Front => [0.0, 0.0, 1.0],
            Face::Back => [0.0, 0.0, -1.0],
        }
    }
}

/// One pixel rectangle per box face.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FaceRects {
    pub right: PixelRect,
    pub left: PixelRect,
    pub top: PixelRect,
    pub bottom: PixelRect,
    pub front: PixelRect,
    pub back: PixelRect,
}

impl FaceRects {
    /// Standard Minecraft unwrap of a `w × h × d` box whose texture block starts at `(u, v)`.
    ///
    /// ```text
    ///          d     w     w
    ///       +-----+-----+-----+
    ///    d  |     | top | bot |
    ///       +-----+-----+-----+-----+
    ///    h  | lft | frt | rgt | bck |
    ///       +-----+-----+-----+-----+
    ///          d     w     d     w
    /// ```
    pub const fn cuboid(u: u32, v: u32, w: u32, h: u32, d: u32) -> Self {
        Self {
            top: PixelRect::new(u + d, v, w, d),
            bottom: PixelRect::new(u + d + w, v, w, d),
            left: PixelRect::new(u, v + d, d, h),
            front: PixelRect::new(u + d, v + d, w, h),
            right: PixelRect::new(u + d + w, v + d, d, h),
            back: PixelRect::new(u + d + w + d, v + d, w, h),
        }
    }

    /// The same regions applied to a box turned around to face -Z.
    pub const fn reversed(self) -> Self {
        Self {
            right: self.left,
            left: self.right,
            top: self.top,
            bottom: self.bottom,
            front: self.back,
            back: self.front,
        }
    }

    pub const fn rect(&self, face: Face) -> PixelRect {
        match face {
            Face::Right => self.right,
            Face::Left => self.left,
            Face::Top => self.top,
            Face::Bottom => self.bottom,
            Face::Front => self.front,
            Face::Back => self.back,
        }
    }

    pub fn fits(&self, atlas: Atlas) -> bool {
        Face::ALL.iter().all(|face| self.rect(*face).fits(atlas))
    }
}

/// Box dimensions plus the base and overlay regions of one body part.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BodyPartSpec {
    /// Width, height, depth in skin pixels.
    pub size: [u32; 3],
    pub base: FaceRects,
    pub overlay: FaceRects,
}

impl BodyPartSpec {
    const fn new(size: [u32; 3], base_uv: (u32, u32), overlay_uv: (u32, u32)) -> Self {
        let [w, h, d] = size;
        Self {
            size,
            base: FaceRects::cuboid(base_uv.0, base_uv.1, w, h, d),
            overlay: FaceRects::cuboid(overlay_uv.0, overlay_uv.1, w, h, d),
        }
    }

    pub const fn width(&self) -> f32 {
        self.size[0] as f32
    }
}

pub const HEAD: BodyPartSpec = BodyPartSpec::new([8, 8, 8], (0, 0), (32, 0));
pub const BODY: BodyPartSpec = BodyPartSpec::new([8, 12, 4], (16, 16), (16, 32));
pub const RIGHT_ARM: BodyPartSpec = BodyPartSpec::new([4, 12, 4], (40, 16), (40, 32));
pub const LEFT_ARM: BodyPartSpec = BodyPartSpec::new([4, 12, 4], (32, 48), (48, 48));
pub const RIGHT_ARM_SLIM: BodyPartSpec = BodyPartSpec::new([3, 12, 4], (40, 16), (40, 32));
pub const LEFT_ARM_SLIM: BodyPartSpec = BodyPartSpec::new([3, 12, 4], (32, 48), (48, 48));
pub const RIGHT_LEG: BodyPartSpec = BodyPartSpec::new([4, 12, 4], (0, 16), (0, 32));
pub const LEFT_LEG: BodyPartSpec = BodyPartSpec::new([4, 12, 4], (16, 48), (0, 48));

pub const CAPE_SIZE: [u32; 3] = [10, 16, 1];

/// The cape hangs behind the avatar with its printed side facing away, so the +Z face of the
/// box carries the atlas "back" region and the -Z face the "front" region.
pub const CAPE_FACES: FaceRects = FaceRects::cuboid(0, 0, 10, 16, 1).reversed();

#[cfg(test)]
mod tests {
    use super::*;

    const SKIN_PARTS: [BodyPartSpec; 8] = [
        HEAD,
        BODY,
        RIGHT_ARM,
        LEFT_ARM,
        RIGHT_ARM_SLIM,
        LEFT_ARM_SLIM,
        RIGHT_LEG,
        LEFT_LEG,
    ];

    #[test]
    fn every_region_fits_its_atlas() {
        for part in SKIN_PARTS {
            assert!(part.base.fits(SKIN_ATLAS), "{part:?}");
            assert!(part.overlay.fits(SKIN_ATLAS), "{part:?}");
        }
        assert!(CAPE_FACES.fits(CAPE_ATLAS));
    }

    #[test]
    fn head_regions_match_standard_layout() {
        assert_eq!(HEAD.base.front, PixelRect::new(8, 8, 8, 8));
        assert_eq!(HEAD.base.top, PixelRect::new(8, 0, 8, 8));
        assert_eq!(HEAD.base.bottom, PixelRect::new(16, 0, 8, 8));
        assert_eq!(HEAD.base.back, PixelRect::new(24, 8, 8, 8));
        assert_eq!(HEAD.overlay.front, PixelRect::new(40, 8, 8, 8));
    }

    #[test]
    fn slim_arms_only_narrow_the_width() {
        assert_eq!(RIGHT_ARM_SLIM.size, [3, 12, 4]);
        assert_eq!(RIGHT_ARM_SLIM.base.front, PixelRect::new(44, 20, 3, 12));
        assert_eq!(RIGHT_ARM_SLIM.base.right, PixelRect::new(47, 20, 4, 12));
        assert_eq!(RIGHT_ARM_SLIM.base.back, PixelRect::new(51, 20, 3, 12));
        assert_eq!(LEFT_ARM_SLIM.base.left, LEFT_ARM.base.left);
    }

    #[test]
    fn cape_front_and_back_are_swapped() {
        assert_eq!(CAPE_FACES.front, PixelRect::new(12, 1, 10, 16));
        assert_eq!(CAPE_FACES.back, PixelRect::new(1, 1, 10, 16));
        assert_eq!(CAPE_FACES.rect(Face::Right), PixelRect::new(0, 1, 1, 16));
    }

    #[test]
    fn rect_lookup_follows_face_names() {
        let faces = BODY.base;
        assert_eq!(faces.rect(Face::Front), faces.front);
        assert_eq!(faces.rect(Face::Back), faces.back);
        assert_eq!(faces.rect(Face::Left), PixelRect::new(16, 20, 4, 12));
        assert_eq!(faces.rect(Face::Right), PixelRect::new(28, 20, 4, 12));
    }
}
