use std::f32::consts::TAU;

use crate::raycaster::RayHit;
use crate::surface::{Surface, pack_rgb};
use crate::texture::TextureSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ShadeMode {
    /// Wall texture column picked by the hit's texture fraction.
    #[default]
    Textured,
    /// Uniform grey darkening with distance.
    Flat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FloorMode {
    #[default]
    Textured,
    Flat,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SceneStyle {
    pub shade: ShadeMode,
    pub floor: FloorMode,
    pub floor_color: u32,
    /// Brightness lost per world unit in flat mode.
    pub attenuation: f32,
    pub fov: f32,
}

/// Grey level for a wall `distance` away: `max(0, 255 - distance * attenuation)`.
#[inline]
pub fn flat_shade(distance: f32, attenuation: f32) -> u32 {
    let v = (255.0 - distance * attenuation).clamp(0.0, 255.0) as u8;
    pack_rgb(v, v, v)
}

/// Paint one frame: sky over the top half, floor under it, then a wall strip
/// for every column whose ray hit something.
///
/// `hits[i]` covers screen columns `[i * w / n, (i + 1) * w / n)`, so the
/// ray count does not need to match the surface width.
pub fn render_scene<S: Surface>(
    surface: &mut S,
    hits: &[Option<RayHit>],
    textures: &TextureSet,
    view_angle: f32,
    style: &SceneStyle,
) {
    let width = surface.width();
    let height = surface.height();
    let mid = (height / 2) as i32;

    surface.clear();
    if width == 0 || height == 0 {
        return;
    }

    draw_sky(surface, textures, view_angle, style.fov, mid);
    draw_floor(surface, textures, style, mid);

    let n = hits.len();
    for (i, hit) in hits.iter().enumerate() {
        let Some(hit) = hit else {
            continue; // sky and floor show through
        };
        let x0 = (i * width / n) as i32;
        let x1 = ((i + 1) * width / n) as i32;
        let col_w = (x1 - x0).max(1);

        let wall_h = hit.wall_height as i32;
        let top = (height as f32 / 2.0 - hit.wall_height / 2.0) as i32;

        match style.shade {
            ShadeMode::Flat => {
                let color = flat_shade(hit.distance, style.attenuation);
                surface.fill_rect(x0, top, col_w, wall_h, color);
            }
            ShadeMode::Textured => {
                let tex = &textures.wall;
                let tex_x = ((hit.texture_fraction * tex.width() as f32) as usize)
                    .min(tex.width() - 1);
                surface.blit_scaled_column(
                    tex,
                    tex_x,
                    0,
                    1,
                    tex.height(),
                    x0,
                    top,
                    col_w,
                    wall_h,
                );
            }
        }
    }
}

// The sky texture wraps once around the full turn and pans with the view.
fn draw_sky<S: Surface>(
    surface: &mut S,
    textures: &TextureSet,
    view_angle: f32,
    fov: f32,
    mid: i32,
) {
    let sky = &textures.sky;
    let width = surface.width();
    let left = view_angle - fov / 2.0;

    for x in 0..width {
        let angle = left + (x as f32 / width as f32) * fov;
        let turn = angle.rem_euclid(TAU) / TAU;
        let sx = ((turn * sky.width() as f32) as usize).min(sky.width() - 1);
        surface.blit_scaled_column(sky, sx, 0, 1, sky.height(), x as i32, 0, 1, mid);
    }
}

fn draw_floor<S: Surface>(surface: &mut S, textures: &TextureSet, style: &SceneStyle, mid: i32) {
    let width = surface.width() as i32;
    let floor_h = surface.height() as i32 - mid;

    match style.floor {
        FloorMode::Flat => surface.fill_rect(0, mid, width, floor_h, style.floor_color),
        FloorMode::Textured => {
            let tex = &textures.floor;
            for x in 0..width {
                let sx = x as usize % tex.width();
                surface.blit_scaled_column(tex, sx, 0, 1, tex.height(), x, mid, 1, floor_h);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::Framebuffer;
    use crate::texture::Texture;

    const SKY: u32 = 0x0000_00AA;
    const FLOOR: u32 = 0x0000_BB00;
    const WALL: u32 = 0x00CC_0000;

    fn textures() -> TextureSet {
        TextureSet {
            wall: Texture::from_fn(4, 4, |_, _| WALL),
            floor: Texture::from_fn(4, 4, |_, _| FLOOR),
            sky: Texture::from_fn(8, 4, |_, _| SKY),
        }
    }

    fn style(shade: ShadeMode) -> SceneStyle {
        SceneStyle {
            shade,
            floor: FloorMode::Textured,
            floor_color: 0x0011_1111,
            attenuation: 0.5,
            fov: std::f32::consts::FRAC_PI_4,
        }
    }

    fn hit(column: usize, distance: f32, wall_height: f32) -> Option<RayHit> {
        Some(RayHit {
            column,
            distance,
            point: [0.0, 0.0],
            wall_height,
            texture_fraction: 0.25,
            tile: 1,
        })
    }

    #[test]
    fn flat_shade_fades_to_black() {
        assert_eq!(flat_shade(0.0, 0.5), pack_rgb(255, 255, 255));
        assert_eq!(flat_shade(100.0, 0.5), pack_rgb(205, 205, 205));
        assert_eq!(flat_shade(600.0, 0.5), 0);
    }

    #[test]
    fn miss_column_shows_sky_and_floor() {
        let mut fb = Framebuffer::new(2, 10);
        let hits = [None, hit(1, 10.0, 4.0)];
        render_scene(&mut fb, &hits, &textures(), 0.0, &style(ShadeMode::Textured));

        for y in 0..5 {
            assert_eq!(fb.pixel(0, y), SKY);
        }
        for y in 5..10 {
            assert_eq!(fb.pixel(0, y), FLOOR);
        }
    }

    #[test]
    fn wall_strip_is_vertically_centred() {
        let mut fb = Framebuffer::new(2, 10);
        let hits = [None, hit(1, 10.0, 4.0)];
        render_scene(&mut fb, &hits, &textures(), 0.0, &style(ShadeMode::Textured));

        let column: Vec<u32> = (0..10).map(|y| fb.pixel(1, y)).collect();
        assert_eq!(&column[..3], &[SKY; 3]);
        assert_eq!(&column[3..7], &[WALL; 4]);
        assert_eq!(&column[7..], &[FLOOR; 3]);
    }

    #[test]
    fn wall_taller_than_screen_fills_column() {
        let mut fb = Framebuffer::new(1, 6);
        let hits = [hit(0, 1.0, 19200.0)];
        render_scene(&mut fb, &hits, &textures(), 0.0, &style(ShadeMode::Textured));
        assert!((0..6).all(|y| fb.pixel(0, y) == WALL));
    }

    #[test]
    fn flat_mode_uses_distance_shade() {
        let mut fb = Framebuffer::new(1, 10);
        let hits = [hit(0, 100.0, 2.0)];
        render_scene(&mut fb, &hits, &textures(), 0.0, &style(ShadeMode::Flat));
        assert_eq!(fb.pixel(0, 4), pack_rgb(205, 205, 205));
        assert_eq!(fb.pixel(0, 5), pack_rgb(205, 205, 205));
        assert_eq!(fb.pixel(0, 3), SKY);
    }

    #[test]
    fn flat_floor_fill() {
        let mut fb = Framebuffer::new(3, 4);
        let s = SceneStyle {
            floor: FloorMode::Flat,
            ..style(ShadeMode::Textured)
        };
        render_scene(&mut fb, &[None, None, None], &textures(), 0.0, &s);
        assert!((0..3).all(|x| fb.pixel(x, 3) == 0x0011_1111));
    }

    #[test]
    fn fewer_rays_than_columns_widen_strips() {
        let mut fb = Framebuffer::new(4, 10);
        let hits = [None, hit(1, 10.0, 4.0)];
        render_scene(&mut fb, &hits, &textures(), 0.0, &style(ShadeMode::Textured));
        assert_eq!(fb.pixel(1, 5), FLOOR);
        assert_eq!(fb.pixel(2, 5), WALL);
        assert_eq!(fb.pixel(3, 5), WALL);
    }
}
