use crate::config::Config;
use crate::input::HeldKeys;
use crate::movement;
use crate::player::Player;
use crate::raycaster::{CastSettings, cast_rays};
use crate::renderer::{SceneStyle, render_scene};
use crate::surface::Surface;
use crate::texture::TextureSet;
use crate::world::GridMap;

/// Host hook asked once per finished frame whether another should follow.
pub trait FrameScheduler {
    fn request_next_frame(&mut self) -> bool;
}

impl<F: FnMut() -> bool> FrameScheduler for F {
    fn request_next_frame(&mut self) -> bool {
        self()
    }
}

/// Owns all game state and runs move -> cast -> draw once per frame.
///
/// Construction takes a [`TextureSet`], so no frame can run before every
/// texture is ready.
pub struct FrameDriver {
    grid: GridMap,
    player: Player,
    textures: TextureSet,
    settings: CastSettings,
    style: SceneStyle,
    frames: u64,
}

impl FrameDriver {
    pub fn new(config: &Config, grid: GridMap, textures: TextureSet) -> Self {
        let tile = grid.tile_size();
        let (mut tx, mut ty) = config.spawn_tile;
        let spawn_open = grid.tile_at(tx as i64, ty as i64) == Some(crate::world::OPEN);
        if !spawn_open {
            match grid.first_open() {
                Some(open) => {
                    log::warn!("spawn tile ({tx}, {ty}) is solid, moving to {open:?}");
                    (tx, ty) = open;
                }
                None => log::warn!("level has no open tiles"),
            }
        }

        let mut player = Player::at_tile_center(tx, ty, tile, config.spawn_angle);
        player.move_speed = config.move_speed;
        player.turn_speed = config.turn_speed;
        log::info!(
            "starting on {}x{} grid at ({:.1}, {:.1})",
            grid.width(),
            grid.height(),
            player.pos[0],
            player.pos[1]
        );

        Self {
            grid,
            player,
            textures,
            settings: config.cast_settings(),
            style: config.scene_style(),
            frames: 0,
        }
    }

    #[inline]
    pub fn player(&self) -> &Player {
        &self.player
    }

    #[inline]
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Cast one ray per column of a resized view.
    pub fn set_num_rays(&mut self, num_rays: usize) {
        self.settings.num_rays = num_rays;
    }

    /// One full cycle. Runs to completion.
    pub fn frame<S: Surface>(&mut self, keys: &HeldKeys, surface: &mut S) {
        movement::step(&mut self.player, keys, &self.grid);
        let hits = cast_rays(&self.grid, &self.player, &self.settings);
        render_scene(surface, &hits, &self.textures, self.player.angle, &self.style);
        self.frames += 1;
    }

    /// Run frames until the scheduler declines the next one. Input is polled
    /// at the start of every frame.
    pub fn run<S, Sch, I>(&mut self, scheduler: &mut Sch, mut input: I, surface: &mut S)
    where
        S: Surface,
        Sch: FrameScheduler,
        I: FnMut() -> HeldKeys,
    {
        loop {
            let keys = input();
            self.frame(&keys, surface);
            if !scheduler.request_next_frame() {
                break;
            }
        }
        log::debug!("frame loop stopped after {} frames", self.frames);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::Key;
    use crate::surface::Framebuffer;
    use crate::texture::Texture;

    fn small_config() -> Config {
        Config {
            screen_width: 40,
            screen_height: 30,
            num_rays: 40,
            ..Config::default()
        }
    }

    fn driver() -> FrameDriver {
        let textures = TextureSet {
            wall: Texture::brick(),
            floor: Texture::stone(),
            sky: Texture::sky(),
        };
        FrameDriver::new(&small_config(), GridMap::demo(64.0), textures)
    }

    #[test]
    fn scheduler_controls_frame_count() {
        let mut d = driver();
        let mut fb = Framebuffer::new(40, 30);
        let mut remaining = 4;
        let mut sched = || {
            remaining -= 1;
            remaining > 0
        };
        d.run(&mut sched, HeldKeys::default, &mut fb);
        assert_eq!(d.frames(), 4);
    }

    #[test]
    fn first_frame_runs_before_scheduler_is_asked() {
        let mut d = driver();
        let mut fb = Framebuffer::new(40, 30);
        d.run(&mut || false, HeldKeys::default, &mut fb);
        assert_eq!(d.frames(), 1);
    }

    #[test]
    fn input_is_applied_each_frame() {
        let mut d = driver();
        let mut fb = Framebuffer::new(40, 30);
        let start = d.player().pos;
        let mut ticks = 0;
        let mut sched = || {
            ticks += 1;
            ticks < 3
        };
        let keys = || [Key::Forward].into_iter().collect::<HeldKeys>();
        d.run(&mut sched, keys, &mut fb);
        assert_eq!(d.player().pos, [start[0] + 6.0, start[1]]);
    }

    #[test]
    fn unchanged_state_renders_identical_frames() {
        let mut d = driver();
        let mut a = Framebuffer::new(40, 30);
        let mut b = Framebuffer::new(40, 30);
        d.frame(&HeldKeys::default(), &mut a);
        d.frame(&HeldKeys::default(), &mut b);
        assert_eq!(a.pixels(), b.pixels());
    }

    #[test]
    fn walls_cover_the_horizon() {
        let mut d = driver();
        let mut fb = Framebuffer::new(40, 30);
        d.frame(&HeldKeys::default(), &mut fb);
        // the demo level is closed, so every column has a wall at mid height
        let brick = Texture::brick();
        for x in 0..40 {
            let p = fb.pixel(x, 15);
            assert!((0..64).any(|tx| (0..64).any(|ty| brick.pixel(tx, ty) == p)));
        }
    }

    #[test]
    fn wider_view_casts_one_ray_per_new_column() {
        let mut d = driver();
        d.set_num_rays(80);
        let mut fb = Framebuffer::new(80, 30);
        d.frame(&HeldKeys::default(), &mut fb);
        // the rightmost column is covered by its own ray, not a stretched one
        let brick = Texture::brick();
        let p = fb.pixel(79, 15);
        assert!((0..64).any(|tx| (0..64).any(|ty| brick.pixel(tx, ty) == p)));
        assert_eq!(d.settings.num_rays, 80);
    }

    #[test]
    fn solid_spawn_moves_to_open_tile() {
        let config = Config {
            spawn_tile: (0, 0),
            ..small_config()
        };
        let textures = TextureSet {
            wall: Texture::brick(),
            floor: Texture::stone(),
            sky: Texture::sky(),
        };
        let d = FrameDriver::new(&config, GridMap::demo(64.0), textures);
        assert_eq!(d.player().pos, [96.0, 96.0]);
    }
}
