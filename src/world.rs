use rand::SeedableRng;
use rand::seq::SliceRandom;
use rand_pcg::Pcg32;

/// Cell value for walkable space. Anything above it is a solid tile type.
pub const OPEN: u8 = 0;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum GridError {
    #[error("grid has no cells")]
    Empty,
    #[error("row {row} has {len} cells, expected {expected}")]
    Ragged {
        row: usize,
        len: usize,
        expected: usize,
    },
    #[error("unexpected {ch:?} at row {row}, column {col}")]
    BadCell { row: usize, col: usize, ch: char },
}

/// Rectangular tile grid. Row-major, `cells[y * width + x]`.
#[derive(Debug, Clone, PartialEq)]
pub struct GridMap {
    cells: Vec<u8>,
    width: usize,
    height: usize,
    tile_size: f32,
}

impl GridMap {
    pub fn from_rows<R: AsRef<[u8]>>(rows: &[R], tile_size: f32) -> Result<Self, GridError> {
        let expected = rows.first().map(|r| r.as_ref().len()).unwrap_or(0);
        if expected == 0 {
            return Err(GridError::Empty);
        }

        let mut cells = Vec::with_capacity(expected * rows.len());
        for (row, r) in rows.iter().enumerate() {
            let r = r.as_ref();
            if r.len() != expected {
                return Err(GridError::Ragged {
                    row,
                    len: r.len(),
                    expected,
                });
            }
            cells.extend_from_slice(r);
        }

        Ok(Self {
            cells,
            width: expected,
            height: rows.len(),
            tile_size,
        })
    }

    /// Parse rows of digits, one tile per character. Blank lines are skipped;
    /// spaces and short rows are padded out as solid.
    pub fn parse(text: &str, tile_size: f32) -> Result<Self, GridError> {
        let mut rows = Vec::new();
        for (row, line) in text.lines().filter(|l| !l.trim().is_empty()).enumerate() {
            let cells = line
                .trim_end()
                .chars()
                .enumerate()
                .map(|(col, ch)| match ch {
                    ' ' => Ok(1),
                    '0'..='9' => Ok(ch as u8 - b'0'),
                    _ => Err(GridError::BadCell { row, col, ch }),
                })
                .collect::<Result<Vec<u8>, _>>()?;
            rows.push(cells);
        }
        let width = rows.iter().map(Vec::len).max().unwrap_or(0);
        for row in &mut rows {
            row.resize(width, 1);
        }
        Self::from_rows(&rows, tile_size)
    }

    /// Built-in 8x5 level: solid border with one interior wall run.
    pub fn demo(tile_size: f32) -> Self {
        const ROWS: [[u8; 8]; 5] = [
            [1, 1, 1, 1, 1, 1, 1, 1],
            [1, 0, 0, 0, 0, 0, 0, 1],
            [1, 0, 1, 1, 1, 1, 0, 1],
            [1, 0, 0, 0, 0, 0, 0, 1],
            [1, 1, 1, 1, 1, 1, 1, 1],
        ];
        Self {
            cells: ROWS.iter().flatten().copied().collect(),
            width: 8,
            height: 5,
            tile_size,
        }
    }

    /// One-tile solid border around an open interior.
    pub fn bordered(width: usize, height: usize, tile_size: f32) -> Self {
        let mut cells = vec![OPEN; width * height];
        for y in 0..height {
            for x in 0..width {
                if x == 0 || y == 0 || x + 1 == width || y + 1 == height {
                    cells[y * width + x] = 1;
                }
            }
        }
        Self {
            cells,
            width,
            height,
            tile_size,
        }
    }

    /// Recursive-backtracker carve. Dimensions are rounded up to odd so that
    /// every corridor sits on an odd coordinate and the border stays solid.
    /// Tile (1, 1) is always open.
    pub fn carve_maze(width: usize, height: usize, tile_size: f32, seed: u64) -> Self {
        let width = width.max(5) | 1;
        let height = height.max(5) | 1;
        let mut cells = vec![1u8; width * height];
        let mut rng = Pcg32::seed_from_u64(seed);

        let mut stack = vec![(1usize, 1usize)];
        cells[width + 1] = OPEN;

        while let Some(&(x, y)) = stack.last() {
            let mut dirs: [(isize, isize); 4] = [(2, 0), (-2, 0), (0, 2), (0, -2)];
            dirs.shuffle(&mut rng);

            let next = dirs.iter().find_map(|&(dx, dy)| {
                let nx = x as isize + dx;
                let ny = y as isize + dy;
                if nx <= 0 || ny <= 0 || nx >= width as isize - 1 || ny >= height as isize - 1 {
                    return None;
                }
                let (nx, ny) = (nx as usize, ny as usize);
                (cells[ny * width + nx] != OPEN).then_some((nx, ny))
            });

            match next {
                Some((nx, ny)) => {
                    // knock out the wall between the two cells
                    cells[((y + ny) / 2) * width + (x + nx) / 2] = OPEN;
                    cells[ny * width + nx] = OPEN;
                    stack.push((nx, ny));
                }
                None => {
                    stack.pop();
                }
            }
        }

        log::debug!("carved {width}x{height} maze from seed {seed}");

        Self {
            cells,
            width,
            height,
            tile_size,
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
    pub fn tile_size(&self) -> f32 {
        self.tile_size
    }

    /// Cell value at tile indices, `None` outside the grid.
    #[inline]
    pub fn tile_at(&self, tx: i64, ty: i64) -> Option<u8> {
        if tx < 0 || ty < 0 || tx >= self.width as i64 || ty >= self.height as i64 {
            return None;
        }
        Some(self.cells[ty as usize * self.width + tx as usize])
    }

    /// First open tile in row-major order.
    pub fn first_open(&self) -> Option<(usize, usize)> {
        self.cells
            .iter()
            .position(|&c| c == OPEN)
            .map(|i| (i % self.width, i / self.width))
    }

    /// Tile indices containing a world point.
    #[inline]
    pub fn world_to_tile(&self, x: f32, y: f32) -> (i64, i64) {
        (
            (x / self.tile_size).floor() as i64,
            (y / self.tile_size).floor() as i64,
        )
    }

    /// True for solid cells and for anything outside the grid.
    #[inline]
    pub fn is_blocked(&self, x: f32, y: f32) -> bool {
        if !x.is_finite() || !y.is_finite() {
            return true;
        }
        let (tx, ty) = self.world_to_tile(x, y);
        self.tile_at(tx, ty).is_none_or(|cell| cell != OPEN)
    }
}
