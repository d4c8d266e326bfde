use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver, TryRecvError};

use crate::surface::pack_rgb;

#[derive(Debug, thiserror::Error)]
pub enum AssetError {
    #[error("failed to decode {path:?}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
    #[error("texture {0:?} has no pixels")]
    Empty(PathBuf),
    #[error("loader for {0:?} went away before finishing")]
    Abandoned(PathBuf),
}

/// Immutable decoded image, packed `0RGB` like the framebuffer.
#[derive(Debug, Clone, PartialEq)]
pub struct Texture {
    width: usize,
    height: usize,
    pixels: Vec<u32>,
}

impl Texture {
    pub fn from_fn(width: usize, height: usize, f: impl Fn(usize, usize) -> u32) -> Self {
        let mut pixels = Vec::with_capacity(width * height);
        for y in 0..height {
            for x in 0..width {
                pixels.push(f(x, y));
            }
        }
        Self {
            width,
            height,
            pixels,
        }
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, AssetError> {
        let path = path.as_ref();
        let img = image::open(path)
            .map_err(|source| AssetError::Decode {
                path: path.to_owned(),
                source,
            })?
            .to_rgb8();

        if img.width() == 0 || img.height() == 0 {
            return Err(AssetError::Empty(path.to_owned()));
        }

        let (w, h) = (img.width() as usize, img.height() as usize);
        let pixels = img.pixels().map(|p| pack_rgb(p[0], p[1], p[2])).collect();
        log::info!("loaded texture {path:?} ({w}x{h})");

        Ok(Self {
            width: w,
            height: h,
            pixels,
        })
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    /// Nearest texel, coordinates wrap.
    #[inline]
    pub fn pixel(&self, x: usize, y: usize) -> u32 {
        self.pixels[(y % self.height) * self.width + (x % self.width)]
    }

    /// Red brick courses with mortar lines, half-brick offset per course.
    pub fn brick() -> Self {
        let mortar = pack_rgb(170, 165, 150);
        Self::from_fn(64, 64, |x, y| {
            let course = y / 16;
            let shifted = (x + if course % 2 == 1 { 16 } else { 0 }) % 64;
            if y % 16 == 0 || shifted % 32 == 0 {
                mortar
            } else {
                let grain = ((x * 7 + y * 13) % 5) as u8 * 6;
                pack_rgb(150 + grain, 50 + grain / 2, 40)
            }
        })
    }

    /// Grey flagstones.
    pub fn stone() -> Self {
        Self::from_fn(64, 64, |x, y| {
            if x % 32 == 0 || y % 32 == 0 {
                pack_rgb(45, 45, 45)
            } else {
                let v = 90 + ((x * 3 + y * 5) % 7) as u8 * 4;
                pack_rgb(v, v, v)
            }
        })
    }

    /// Vertical blue gradient, wide enough to pan across.
    pub fn sky() -> Self {
        Self::from_fn(256, 64, |_, y| {
            let t = y as u32 * 255 / 63;
            pack_rgb((30 + t / 3) as u8, (60 + t / 3) as u8, (140 + t / 3) as u8)
        })
    }
}

/// Loading state of one texture.
pub enum TextureSlot {
    Pending {
        path: PathBuf,
        rx: Receiver<Result<Texture, AssetError>>,
        fallback: fn() -> Texture,
    },
    Ready(Texture),
}

impl TextureSlot {
    /// Decode `path` on the rayon pool. The slot turns ready when the
    /// result arrives; a failed load is replaced by `fallback()`.
    pub fn load(path: PathBuf, fallback: fn() -> Texture) -> Self {
        let (tx, rx) = mpsc::channel();
        let job_path = path.clone();
        rayon::spawn(move || {
            let _ = tx.send(Texture::load(&job_path));
        });
        TextureSlot::Pending { path, rx, fallback }
    }

    /// Either the file at `path` or the procedural texture.
    pub fn from_option(path: Option<PathBuf>, fallback: fn() -> Texture) -> Self {
        match path {
            Some(path) => Self::load(path, fallback),
            None => TextureSlot::Ready(fallback()),
        }
    }

    /// Non-blocking check for a finished load.
    pub fn poll(&mut self) -> bool {
        if let TextureSlot::Pending { path, rx, fallback } = self {
            let fallback = *fallback;
            let result = match rx.try_recv() {
                Ok(result) => result,
                Err(TryRecvError::Empty) => return false,
                Err(TryRecvError::Disconnected) => Err(AssetError::Abandoned(path.clone())),
            };
            *self = TextureSlot::Ready(settle(result, fallback));
        }
        true
    }

    /// Block until the load finishes.
    pub fn wait(self) -> Texture {
        match self {
            TextureSlot::Ready(tex) => tex,
            TextureSlot::Pending { path, rx, fallback } => {
                let result = rx
                    .recv()
                    .unwrap_or_else(|_| Err(AssetError::Abandoned(path)));
                settle(result, fallback)
            }
        }
    }

    fn take_ready(self) -> Option<Texture> {
        match self {
            TextureSlot::Ready(tex) => Some(tex),
            TextureSlot::Pending { .. } => None,
        }
    }
}

fn settle(result: Result<Texture, AssetError>, fallback: fn() -> Texture) -> Texture {
    result.unwrap_or_else(|err| {
        log::warn!("{err}; using built-in texture");
        fallback()
    })
}

/// Every texture the scene needs, all decoded.
pub struct TextureSet {
    pub wall: Texture,
    pub floor: Texture,
    pub sky: Texture,
}

/// Textures still being loaded. Only converts into a [`TextureSet`] once
/// every slot reports ready.
pub struct PendingTextures {
    pub wall: TextureSlot,
    pub floor: TextureSlot,
    pub sky: TextureSlot,
}

impl PendingTextures {
    pub fn poll(&mut self) -> bool {
        // poll all three so each slot gets a chance to settle
        let wall = self.wall.poll();
        let floor = self.floor.poll();
        let sky = self.sky.poll();
        wall && floor && sky
    }

    pub fn try_ready(mut self) -> Result<TextureSet, Self> {
        if !self.poll() {
            return Err(self);
        }
        match (
            self.wall.take_ready(),
            self.floor.take_ready(),
            self.sky.take_ready(),
        ) {
            (Some(wall), Some(floor), Some(sky)) => Ok(TextureSet { wall, floor, sky }),
            _ => unreachable!("every slot polled ready"),
        }
    }

    pub fn wait(self) -> TextureSet {
        TextureSet {
            wall: self.wall.wait(),
            floor: self.floor.wait(),
            sky: self.sky.wait(),
        }
    }
}
