use std::num::NonZeroU32;
use std::path::PathBuf;
use std::rc::Rc;
use std::time::Instant;

use anyhow::{Context, Result, anyhow};
use clap::Parser;
use winit::application::ApplicationHandler;
use winit::dpi::LogicalSize;
use winit::event::{ElementState, KeyEvent, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{Window, WindowId};

use crate::config::{Config, Level};
use crate::frame::FrameDriver;
use crate::input::{HeldKeys, Key};
use crate::renderer::{FloorMode, ShadeMode};
use crate::scaler::{ScaleLut, blit_nearest_stretch, build_scale_lut, internal_size};
use crate::surface::{Framebuffer, Surface};
use crate::texture::{PendingTextures, Texture, TextureSlot};
use crate::world::GridMap;

mod config;
mod frame;
mod input;
mod movement;
mod player;
mod raycaster;
mod renderer;
mod scaler;
mod surface;
mod texture;
mod world;

#[derive(Parser)]
#[command(name = "raycast-maze", about = "First-person raycasting maze demo")]
struct Cli {
    /// Shade walls by distance instead of texturing them
    #[arg(long)]
    flat: bool,

    /// Fill the floor with a solid colour
    #[arg(long)]
    flat_floor: bool,

    /// Play a randomly carved maze instead of the built-in level
    #[arg(long, conflicts_with = "level")]
    maze: bool,

    /// Load the level from a text file of digit rows (0 = open)
    #[arg(long)]
    level: Option<PathBuf>,

    /// Maze RNG seed
    #[arg(long, default_value = "42")]
    seed: u64,

    /// Maze width in tiles
    #[arg(long, default_value = "15")]
    maze_width: usize,

    /// Maze height in tiles
    #[arg(long, default_value = "15")]
    maze_height: usize,

    /// Wall texture image
    #[arg(long)]
    wall: Option<PathBuf>,

    /// Floor texture image
    #[arg(long)]
    floor: Option<PathBuf>,

    /// Sky texture image
    #[arg(long)]
    sky: Option<PathBuf>,

    /// Render this many frames without a window and save the last one
    #[arg(long)]
    headless: Option<u64>,

    /// Output image for --headless
    #[arg(short, long, default_value = "frame.png")]
    output: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    fn config(&self) -> Config {
        let mut config = Config::default();
        if self.flat {
            config.shade = ShadeMode::Flat;
        }
        if self.flat_floor {
            config.floor = FloorMode::Flat;
        }
        if let Some(path) = &self.level {
            config.level = Level::File(path.clone());
        } else if self.maze {
            config.level = Level::Maze {
                width: self.maze_width,
                height: self.maze_height,
                seed: self.seed,
            };
        }
        config
    }

    fn textures(&self) -> PendingTextures {
        PendingTextures {
            wall: TextureSlot::from_option(self.wall.clone(), Texture::brick),
            floor: TextureSlot::from_option(self.floor.clone(), Texture::stone),
            sky: TextureSlot::from_option(self.sky.clone(), Texture::sky),
        }
    }
}

fn build_level(config: &Config) -> Result<GridMap> {
    let grid = match &config.level {
        Level::Demo => GridMap::demo(config.tile_size),
        Level::Maze {
            width,
            height,
            seed,
        } => GridMap::carve_maze(*width, *height, config.tile_size, *seed),
        Level::File(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("reading level {}", path.display()))?;
            GridMap::parse(&text, config.tile_size)
                .with_context(|| format!("parsing level {}", path.display()))?
        }
    };
    Ok(grid)
}

enum Stage {
    /// Textures still decoding; nothing is drawn yet.
    Loading(PendingTextures, GridMap),
    Running(FrameDriver),
}

struct App {
    window: Option<Rc<Window>>,
    surface: Option<softbuffer::Surface<Rc<Window>, Rc<Window>>>,
    config: Config,
    stage: Option<Stage>,

    // HUD
    frame_counter: u32,
    last_fps_print: Instant,

    // Internal buffer, one column per ray
    fb: Framebuffer,
    scale_lut: ScaleLut,

    keys: HeldKeys,
}

impl App {
    fn new(config: Config, pending: PendingTextures, grid: GridMap) -> Self {
        Self {
            window: None,
            surface: None,
            fb: Framebuffer::new(config.screen_width, config.screen_height),
            config,
            stage: Some(Stage::Loading(pending, grid)),
            frame_counter: 0,
            last_fps_print: Instant::now(),
            scale_lut: ScaleLut::empty(),
            keys: HeldKeys::default(),
        }
    }

    fn init_window(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
        let attributes = Window::default_attributes()
            .with_title("Raycast Maze")
            .with_inner_size(LogicalSize::new(
                self.config.screen_width as f64,
                self.config.screen_height as f64,
            ));

        let window = Rc::new(
            event_loop
                .create_window(attributes)
                .map_err(|e| anyhow!("create window: {e}"))?,
        );

        let context = softbuffer::Context::new(window.clone())
            .map_err(|e| anyhow!("softbuffer context: {e}"))?;
        let surface = softbuffer::Surface::new(&context, window.clone())
            .map_err(|e| anyhow!("softbuffer surface: {e}"))?;

        let size = window.inner_size();
        self.rebuild_internal_fb_and_lut(size.width as usize, size.height as usize);

        window.request_redraw();
        self.surface = Some(surface);
        self.window = Some(window);
        Ok(())
    }

    /// Promote to running once every texture is ready.
    fn advance_loading(&mut self) {
        self.stage = self.stage.take().map(|stage| match stage {
            Stage::Loading(pending, grid) => match pending.try_ready() {
                Ok(textures) => {
                    log::info!("textures ready, starting frame loop");
                    let mut driver = FrameDriver::new(&self.config, grid, textures);
                    driver.set_num_rays(self.fb.width());
                    Stage::Running(driver)
                }
                Err(pending) => Stage::Loading(pending, grid),
            },
            running => running,
        });
    }

    fn redraw(&mut self, id: WindowId) -> Result<()> {
        self.advance_loading();

        let size = match &self.window {
            Some(w) if w.id() == id => w.inner_size(),
            _ => return Ok(()),
        };
        let (dw, dh) = (size.width as usize, size.height as usize);
        let (Some(w), Some(h)) = (NonZeroU32::new(size.width), NonZeroU32::new(size.height))
        else {
            return Ok(()); // Minimized window, skip drawing
        };

        if self.scale_lut.dims() != (dw, dh) {
            self.rebuild_internal_fb_and_lut(dw, dh);
        }

        let (Some(window), Some(surface)) = (&self.window, &mut self.surface) else {
            return Ok(());
        };

        surface
            .resize(w, h)
            .map_err(|e| anyhow!("resize surface: {e}"))?;

        match &mut self.stage {
            Some(Stage::Running(driver)) => driver.frame(&self.keys, &mut self.fb),
            _ => self.fb.clear(),
        }

        let mut buf = surface
            .buffer_mut()
            .map_err(|e| anyhow!("buffer_mut: {e}"))?;
        blit_nearest_stretch(&mut buf, dw, self.fb.pixels(), self.fb.width(), &self.scale_lut);
        buf.present().map_err(|e| anyhow!("present: {e}"))?;

        // Print FPS
        self.frame_counter += 1;
        let now = Instant::now();
        let elapsed = now.duration_since(self.last_fps_print).as_secs_f32();
        if elapsed >= 1.0 {
            log::info!("FPS: {:.1}", self.frame_counter as f32 / elapsed);
            self.frame_counter = 0;
            self.last_fps_print = now;
        }

        window.request_redraw();
        Ok(())
    }

    /// Keep the internal height, match the window aspect, one ray per column.
    fn rebuild_internal_fb_and_lut(&mut self, dst_w: usize, dst_h: usize) {
        let (fb_w, fb_h) = internal_size(dst_w, dst_h, self.config.screen_height);
        if (fb_w, fb_h) != (self.fb.width(), self.fb.height()) {
            self.fb = Framebuffer::new(fb_w, fb_h);
            if let Some(Stage::Running(driver)) = &mut self.stage {
                driver.set_num_rays(fb_w);
            }
        }

        self.scale_lut = build_scale_lut(dst_w, dst_h, fb_w, fb_h);
        log::debug!("scaling {fb_w}x{fb_h} to {dst_w}x{dst_h}");
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }
        if let Err(e) = self.init_window(event_loop) {
            log::error!("failed to open window: {e:#}");
            event_loop.exit();
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => {
                log::info!("close requested; stopping");
                event_loop.exit();
            }

            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(code),
                        state,
                        ..
                    },
                ..
            } => {
                if code == KeyCode::Escape {
                    event_loop.exit();
                    return;
                }
                if let Some(key) = Key::from_key_code(code) {
                    match state {
                        ElementState::Pressed => self.keys.press(key),
                        ElementState::Released => self.keys.release(key),
                    }
                }
            }

            WindowEvent::Focused(false) => self.keys.clear(),

            WindowEvent::RedrawRequested => {
                if let Err(e) = self.redraw(id) {
                    log::error!("redraw failed: {e:#}");
                    event_loop.exit();
                }
            }

            WindowEvent::Resized(new_size) => {
                self.rebuild_internal_fb_and_lut(new_size.width as usize, new_size.height as usize);
            }
            _ => (),
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }
}

fn run_headless(cli: &Cli, config: &Config, grid: GridMap, frames: u64) -> Result<()> {
    let textures = cli.textures().wait();
    let mut driver = FrameDriver::new(config, grid, textures);
    let mut fb = Framebuffer::new(config.screen_width, config.screen_height);

    let mut remaining = frames.max(1);
    let mut scheduler = || {
        remaining -= 1;
        remaining > 0
    };
    let t0 = Instant::now();
    driver.run(&mut scheduler, HeldKeys::default, &mut fb);
    log::info!("rendered {} frames in {:?}", driver.frames(), t0.elapsed());
    log::debug!("player at {:?}", driver.player().pos);

    fb.to_image()
        .save(&cli.output)
        .with_context(|| format!("saving frame to {}", cli.output.display()))?;
    log::info!("wrote {}", cli.output.display());
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(filter)).init();

    let config = cli.config();
    let grid = build_level(&config)?;

    if let Some(frames) = cli.headless {
        return run_headless(&cli, &config, grid, frames);
    }

    let event_loop = EventLoop::new().map_err(|e| anyhow!("creating event loop: {e}"))?;

    // Redraw continuously; movement is per frame, not per second.
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = App::new(config, cli.textures(), grid);
    event_loop
        .run_app(&mut app)
        .map_err(|e| anyhow!("event loop: {e}"))
}
