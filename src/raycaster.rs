use rayon::iter::{IntoParallelIterator, ParallelIterator};

use crate::player::Player;
use crate::world::{GridMap, OPEN};

/// Tile type reported for rays that leave the grid.
const BOUNDARY_TILE: u8 = 1;

/// Projection parameters shared by every column of a frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CastSettings {
    pub fov: f32,
    pub num_rays: usize,
    pub max_depth: f32,
    pub projection: f32, // stands in for a focal length
}

/// Nearest wall struck by one column's ray.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayHit {
    pub column: usize,
    /// Raw Euclidean distance along the ray, not corrected for fisheye.
    pub distance: f32,
    pub point: [f32; 2],
    pub wall_height: f32,
    /// Position across the struck tile in [0, 1), picks the texture column.
    pub texture_fraction: f32,
    pub tile: u8,
}

/// Angle of ray `column`, sweeping the FOV left edge first.
#[inline]
pub fn ray_angle(player_angle: f32, fov: f32, column: usize, num_rays: usize) -> f32 {
    player_angle - fov / 2.0 + (column as f32 / num_rays as f32) * fov
}

/// On-screen wall height. Distance is clamped to one unit.
#[inline]
pub fn wall_height(distance: f32, tile_size: f32, projection: f32) -> f32 {
    (tile_size / distance.max(1.0)) * projection
}

#[inline]
pub fn texture_fraction(hit_x: f32, tile_size: f32) -> f32 {
    hit_x.rem_euclid(tile_size) / tile_size
}

/// March a ray in unit steps until it enters a solid or out-of-grid tile, or
/// `max_depth` is reached.
pub fn cast_ray(
    grid: &GridMap,
    origin: [f32; 2],
    angle: f32,
    column: usize,
    settings: &CastSettings,
) -> Option<RayHit> {
    let (dx, dy) = (angle.cos(), angle.sin());
    let tile_size = grid.tile_size();

    let mut distance = 0.0f32;
    while distance < settings.max_depth {
        distance += 1.0;
        let x = origin[0] + dx * distance;
        let y = origin[1] + dy * distance;

        let (tx, ty) = grid.world_to_tile(x, y);
        let tile = match grid.tile_at(tx, ty) {
            Some(OPEN) => continue,
            Some(tile) => tile,
            None => BOUNDARY_TILE,
        };

        return Some(RayHit {
            column,
            distance,
            point: [x, y],
            wall_height: wall_height(distance, tile_size, settings.projection),
            texture_fraction: texture_fraction(x, tile_size),
            tile,
        });
    }

    None
}

/// Cast one ray per screen column. Index `i` of the result is column `i`;
/// `None` means the ray escaped and only sky and floor show there.
pub fn cast_rays(grid: &GridMap, player: &Player, settings: &CastSettings) -> Vec<Option<RayHit>> {
    (0..settings.num_rays)
        .into_par_iter()
        .map(|i| {
            let angle = ray_angle(player.angle, settings.fov, i, settings.num_rays);
            cast_ray(grid, player.pos, angle, i, settings)
        })
        .collect()
}
