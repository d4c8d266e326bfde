use std::f32::consts::FRAC_PI_4;
use std::path::PathBuf;

use crate::raycaster::CastSettings;
use crate::renderer::{FloorMode, SceneStyle, ShadeMode};
use crate::surface::pack_rgb;

/// Which level to build at start-up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Level {
    /// Fixed 8x5 map.
    Demo,
    /// Randomly carved maze.
    Maze { width: usize, height: usize, seed: u64 },
    /// Text grid read from disk, see `GridMap::parse`.
    File(PathBuf),
}

/// Demo tuning. Speeds are per tick, not per second.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub screen_width: usize,
    pub screen_height: usize,
    pub tile_size: f32,
    pub fov: f32,
    pub num_rays: usize,
    pub max_depth: f32,
    pub projection: f32,
    pub move_speed: f32,
    pub turn_speed: f32,
    pub attenuation: f32,
    pub shade: ShadeMode,
    pub floor: FloorMode,
    pub floor_color: u32,
    pub level: Level,
    pub spawn_tile: (usize, usize),
    pub spawn_angle: f32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            screen_width: 800,
            screen_height: 600,
            tile_size: 64.0,
            fov: FRAC_PI_4,
            num_rays: 800,
            max_depth: 600.0,
            projection: 300.0,
            move_speed: 2.0,
            turn_speed: 0.05,
            attenuation: 0.5,
            shade: ShadeMode::Textured,
            floor: FloorMode::Textured,
            floor_color: pack_rgb(40, 40, 40),
            level: Level::Demo,
            spawn_tile: (1, 1),
            spawn_angle: 0.0,
        }
    }
}

impl Config {
    pub fn cast_settings(&self) -> CastSettings {
        CastSettings {
            fov: self.fov,
            num_rays: self.num_rays,
            max_depth: self.max_depth,
            projection: self.projection,
        }
    }

    pub fn scene_style(&self) -> SceneStyle {
        SceneStyle {
            shade: self.shade,
            floor: self.floor,
            floor_color: self.floor_color,
            attenuation: self.attenuation,
            fov: self.fov,
        }
    }
}
