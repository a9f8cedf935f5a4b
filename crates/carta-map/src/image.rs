//! RGBA raster with src-over compositing.

use carta_palette::Rgba;

/// Output raster, one pixel per column. Pixels start as the palette
/// fallback at a compressed alpha (`127 - opacity/2`) reserved for
/// unrendered background; column writes then alpha-blend on top in
/// bottom-to-top order.
#[derive(Clone, Debug)]
pub struct MapImage {
    width: usize,
    height: usize,
    data: Vec<u8>,
}

impl MapImage {
    pub fn new(width: usize, height: usize, fallback: Rgba) -> Self {
        let background = Rgba::new(fallback.r, fallback.g, fallback.b, 127 - fallback.a / 2);
        let mut data = vec![0u8; width * height * 4];
        for px in data.chunks_exact_mut(4) {
            px.copy_from_slice(&[background.r, background.g, background.b, background.a]);
        }
        Self {
            width,
            height,
            data,
        }
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    #[inline]
    fn idx(&self, x: usize, y: usize) -> usize {
        (y * self.width + x) * 4
    }

    #[inline]
    pub fn pixel(&self, x: usize, y: usize) -> Rgba {
        let i = self.idx(x, y);
        Rgba::new(
            self.data[i],
            self.data[i + 1],
            self.data[i + 2],
            self.data[i + 3],
        )
    }

    /// Src-over composite of `src` onto the stored pixel, integer math.
    /// A fully opaque source replaces the pixel exactly.
    pub fn blend_pixel(&mut self, x: usize, y: usize, src: Rgba) {
        let i = self.idx(x, y);
        let dst = self.pixel(x, y);
        let sa = src.a as u32;
        let da = dst.a as u32 * (255 - sa) / 255;
        let out_a = sa + da;
        let (r, g, b) = if out_a == 0 {
            (0, 0, 0)
        } else {
            (
                (src.r as u32 * sa + dst.r as u32 * da) / out_a,
                (src.g as u32 * sa + dst.g as u32 * da) / out_a,
                (src.b as u32 * sa + dst.b as u32 * da) / out_a,
            )
        };
        self.data[i] = r as u8;
        self.data[i + 1] = g as u8;
        self.data[i + 2] = b as u8;
        self.data[i + 3] = out_a as u8;
    }

    /// Raw RGBA8 bytes, row-major.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn into_raw(self) -> Vec<u8> {
        self.data
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn background_uses_compressed_alpha() {
        let img = MapImage::new(2, 2, Rgba::new(9, 8, 7, 100));
        assert_eq!(img.pixel(1, 1), Rgba::new(9, 8, 7, 127 - 50));
    }

    #[test]
    fn opaque_write_replaces_pixel() {
        let mut img = MapImage::new(1, 1, Rgba::new(0, 0, 0, 0));
        img.blend_pixel(0, 0, Rgba::new(10, 20, 30, 255));
        assert_eq!(img.pixel(0, 0), Rgba::new(10, 20, 30, 255));
    }

    #[test]
    fn translucent_write_blends_over_opaque() {
        let mut img = MapImage::new(1, 1, Rgba::new(0, 0, 0, 0));
        img.blend_pixel(0, 0, Rgba::new(200, 0, 0, 255));
        img.blend_pixel(0, 0, Rgba::new(0, 0, 200, 128));
        let px = img.pixel(0, 0);
        assert_eq!(px.a, 255);
        // Both source layers contribute.
        assert!(px.r > 0 && px.r < 200, "r = {}", px.r);
        assert!(px.b > 0 && px.b < 200, "b = {}", px.b);
    }
}
