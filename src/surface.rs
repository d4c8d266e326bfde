use image::{Rgb, RgbImage};

use crate::texture::Texture;

#[inline]
pub fn pack_rgb(r: u8, g: u8, b: u8) -> u32 {
    // BGRA8 in little-endian memory
    (b as u32) | ((g as u32) << 8) | ((r as u32) << 16)
    // Alpha at 0
}

#[inline]
pub fn unpack_rgb(c: u32) -> (u8, u8, u8) {
    ((c >> 16) as u8, (c >> 8) as u8, c as u8)
}

/// Drawing primitives the scene renderer needs from a display.
/// Destination rectangles may extend past the edges and are clipped.
pub trait Surface {
    fn width(&self) -> usize;
    fn height(&self) -> usize;

    fn clear(&mut self);

    fn fill_rect(&mut self, x: i32, y: i32, w: i32, h: i32, color: u32);

    /// Nearest-neighbour scale of a source rectangle onto a destination one.
    #[allow(clippy::too_many_arguments)]
    fn blit_scaled_column(
        &mut self,
        src: &Texture,
        src_x: usize,
        src_y: usize,
        src_w: usize,
        src_h: usize,
        dst_x: i32,
        dst_y: i32,
        dst_w: i32,
        dst_h: i32,
    );
}

/// CPU pixel buffer in the packed format softbuffer presents.
pub struct Framebuffer {
    pixels: Vec<u32>,
    width: usize,
    height: usize,
}

impl Framebuffer {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            pixels: vec![0; width * height],
            width,
            height,
        }
    }

    #[inline]
    pub fn pixels(&self) -> &[u32] {
        &self.pixels
    }

    #[inline]
    pub fn pixel(&self, x: usize, y: usize) -> u32 {
        self.pixels[y * self.width + x]
    }

    pub fn to_image(&self) -> RgbImage {
        RgbImage::from_fn(self.width as u32, self.height as u32, |x, y| {
            let (r, g, b) = unpack_rgb(self.pixel(x as usize, y as usize));
            Rgb([r, g, b])
        })
    }

    // Intersect [start, start + len) with [0, bound).
    fn clip_span(start: i32, len: i32, bound: usize) -> Option<(usize, usize)> {
        let lo = start.max(0);
        let hi = start.saturating_add(len).min(bound as i32);
        (lo < hi).then_some((lo as usize, hi as usize))
    }
}

impl Surface for Framebuffer {
    #[inline]
    fn width(&self) -> usize {
        self.width
    }

    #[inline]
    fn height(&self) -> usize {
        self.height
    }

    fn clear(&mut self) {
        self.pixels.fill(0);
    }

    fn fill_rect(&mut self, x: i32, y: i32, w: i32, h: i32, color: u32) {
        let (Some((x0, x1)), Some((y0, y1))) = (
            Self::clip_span(x, w, self.width),
            Self::clip_span(y, h, self.height),
        ) else {
            return;
        };
        for row in y0..y1 {
            let start = row * self.width;
            self.pixels[start + x0..start + x1].fill(color);
        }
    }

    fn blit_scaled_column(
        &mut self,
        src: &Texture,
        src_x: usize,
        src_y: usize,
        src_w: usize,
        src_h: usize,
        dst_x: i32,
        dst_y: i32,
        dst_w: i32,
        dst_h: i32,
    ) {
        if src_w == 0 || src_h == 0 || dst_w <= 0 || dst_h <= 0 {
            return;
        }
        let (Some((x0, x1)), Some((y0, y1))) = (
            Self::clip_span(dst_x, dst_w, self.width),
            Self::clip_span(dst_y, dst_h, self.height),
        ) else {
            return;
        };

        for y in y0..y1 {
            // offset into the unclipped destination rect
            let dy = (y as i64 - dst_y as i64) as usize;
            let sy = src_y + dy * src_h / dst_h as usize;
            let row = y * self.width;
            for x in x0..x1 {
                let dx = (x as i64 - dst_x as i64) as usize;
                let sx = src_x + dx * src_w / dst_w as usize;
                self.pixels[row + x] = src.pixel(sx, sy);
            }
        }
    }
}
