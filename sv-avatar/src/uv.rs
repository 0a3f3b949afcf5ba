use crate::atlas::{Atlas, PixelRect};

/// Normalized atlas rectangle with its origin at the bottom-left of the image.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UvRect {
    pub u: f32,
    pub v: f32,
    pub width: f32,
    pub height: f32,
}

/// Quad corners in the order the geometry builder writes them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Corner {
    TopRight,
    TopLeft,
    BottomRight,
    BottomLeft,
}

impl Corner {
    pub const ALL: [Corner; 4] = [
        Corner::TopRight,
        Corner::TopLeft,
        Corner::BottomRight,
        Corner::BottomLeft,
    ];
}

/// Pixel space grows down from the top edge, UV space grows up from the bottom edge.
pub fn pixel_to_uv(rect: PixelRect, atlas: Atlas) -> UvRect {
    let w = atlas.width as f32;
    let h = atlas.height as f32;
    UvRect {
        u: rect.x as f32 / w,
        v: 1.0 - (rect.y + rect.height) as f32 / h,
        width: rect.width as f32 / w,
        height: rect.height as f32 / h,
    }
}

impl UvRect {
    pub fn corner(self, corner: Corner) -> [f32; 2] {
        match corner {
            Corner::TopRight => [self.u + self.width, self.v + self.height],
            Corner::TopLeft => [self.u, self.v + self.height],
            Corner::BottomRight => [self.u + self.width, self.v],
            Corner::BottomLeft => [self.u, self.v],
        }
    }

    /// Same corner in wgpu texture space, where V runs down from the top of the image.
    pub fn texture_corner(self, corner: Corner) -> [f32; 2] {
        let [u, v] = self.corner(corner);
        [u, 1.0 - v]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::atlas::{CAPE_ATLAS, SKIN_ATLAS};

    fn close(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-6
    }

    #[test]
    fn head_front_maps_to_known_uv() {
        let uv = pixel_to_uv(PixelRect::new(8, 8, 8, 8), SKIN_ATLAS);
        assert!(close(uv.u, 0.125));
        assert!(close(uv.v, 0.75));
        assert!(close(uv.width, 0.125));
        assert!(close(uv.height, 0.125));
    }

    #[test]
    fn top_rows_map_near_v_one() {
        let uv = pixel_to_uv(PixelRect::new(0, 0, 4, 1), SKIN_ATLAS);
        assert!(close(uv.v + uv.height, 1.0));
        let bottom = pixel_to_uv(PixelRect::new(0, 63, 4, 1), SKIN_ATLAS);
        assert!(close(bottom.v, 0.0));
    }

    #[test]
    fn in_bounds_rects_stay_in_unit_square() {
        for atlas in [SKIN_ATLAS, CAPE_ATLAS] {
            for y in (0..atlas.height).step_by(5) {
                for x in (0..atlas.width).step_by(7) {
                    let rect = PixelRect::new(x, y, atlas.width - x, atlas.height - y);
                    let uv = pixel_to_uv(rect, atlas);
                    for value in [uv.u, uv.v, uv.u + uv.width, uv.v + uv.height] {
                        assert!((0.0..=1.0).contains(&value), "{rect:?} -> {uv:?}");
                    }
                }
            }
        }
    }

    #[test]
    fn texture_corner_undoes_the_flip() {
        let rect = PixelRect::new(20, 20, 8, 12);
        let uv = pixel_to_uv(rect, SKIN_ATLAS);
        let [u, v] = uv.texture_corner(Corner::TopLeft);
        assert!(close(u, 20.0 / 64.0));
        assert!(close(v, 20.0 / 64.0));
        let [u, v] = uv.texture_corner(Corner::BottomRight);
        assert!(close(u, 28.0 / 64.0));
        assert!(close(v, 32.0 / 64.0));
    }
}
