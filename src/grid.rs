//! Cell space and the doubled pixel space the maze is carved into

use std::collections::VecDeque;
use std::fmt;

use crate::error::{MazeError, Result};

/// Largest accepted width or height, in cells
pub const MAX_DIMENSION: usize = 16384;

/// Location of a room in the maze
#[derive(PartialEq, Eq, Clone, Copy, Debug, Hash)]
pub struct Cell {
    pub x: usize,
    pub y: usize,
}

impl Cell {
    pub const fn new(x: usize, y: usize) -> Self {
        Self { x, y }
    }

    /// Pixel coordinates `(px, py)` of the room itself
    pub const fn pixel(self) -> (usize, usize) {
        (1 + 2 * self.x, 1 + 2 * self.y)
    }

    /// Neighbour at signed offset `(dx, dy)`, if it does not underflow
    pub fn offset(self, dx: i64, dy: i64) -> Option<Cell> {
        let x = usize::try_from(self.x as i64 + dx).ok()?;
        let y = usize::try_from(self.y as i64 + dy).ok()?;
        Some(Cell { x, y })
    }

    /// Whether `other` is directly up, right, down or left of `self`
    pub fn is_adjacent(self, other: Cell) -> bool {
        self.x.abs_diff(other.x) + self.y.abs_diff(other.y) == 1
    }
}

/// Single bitmap value
#[derive(PartialEq, Eq, Clone, Copy, Debug)]
#[repr(u8)]
pub enum Pixel {
    Passage = 0,
    Wall = 1,
}

impl fmt::Display for Pixel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", *self as u8)
    }
}

/// Row-major matrix of pixels
///
/// Pixel `(px, py)` is stored at offset `py * width + px`, so iterating the
/// buffer in order yields rows top to bottom, each left to right. This is
/// the order in which the PBM body is written and read.
#[derive(PartialEq, Eq, Clone, Debug)]
pub struct PixelGrid {
    width: usize,
    height: usize,
    pixels: Vec<Pixel>,
}

impl PixelGrid {
    /// Allocate a `width` x `height` matrix with every pixel set to `fill`.
    pub fn try_filled(width: usize, height: usize, fill: Pixel) -> Result<Self> {
        let pixels = filled_buffer(width * height, fill, "the pixels of the maze")?;
        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    /// Wrap an existing row-major buffer.
    pub(crate) fn from_raw(width: usize, height: usize, pixels: Vec<Pixel>) -> Self {
        debug_assert_eq!(pixels.len(), width * height);
        Self {
            width,
            height,
            pixels,
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    #[inline]
    fn offset(&self, px: usize, py: usize) -> usize {
        debug_assert!(
            px < self.width && py < self.height,
            "pixel ({}, {}) outside {}x{} bitmap",
            px,
            py,
            self.width,
            self.height
        );
        py * self.width + px
    }

    pub fn get(&self, px: usize, py: usize) -> Pixel {
        self.pixels[self.offset(px, py)]
    }

    pub fn set(&mut self, px: usize, py: usize, value: Pixel) {
        let offset = self.offset(px, py);
        self.pixels[offset] = value;
    }

    /// Rows from top to bottom
    pub fn rows(&self) -> impl Iterator<Item = &[Pixel]> {
        // `chunks` rejects a zero size; a zero-width bitmap has no pixels anyway
        self.pixels.chunks(self.width.max(1))
    }

    /// Whether every pixel on the outer frame is a wall
    pub fn has_closed_border(&self) -> bool {
        if self.width == 0 || self.height == 0 {
            return true;
        }
        let (right, bottom) = (self.width - 1, self.height - 1);
        (0..self.width)
            .all(|px| self.get(px, 0) == Pixel::Wall && self.get(px, bottom) == Pixel::Wall)
            && (0..self.height)
                .all(|py| self.get(0, py) == Pixel::Wall && self.get(right, py) == Pixel::Wall)
    }

    /// Logical cell dimensions of a `(2w+1) x (2h+1)` bitmap
    pub fn cell_dimensions(&self) -> (usize, usize) {
        (
            self.width.saturating_sub(1) / 2,
            self.height.saturating_sub(1) / 2,
        )
    }

    /// Number of open walls between two cells
    pub fn opened_walls(&self) -> usize {
        let (width, height) = self.cell_dimensions();
        let mut opened = 0;
        for y in 0..height {
            for x in 0..width {
                let (px, py) = Cell::new(x, y).pixel();
                if x + 1 < width && self.get(px + 1, py) == Pixel::Passage {
                    opened += 1;
                }
                if y + 1 < height && self.get(px, py + 1) == Pixel::Passage {
                    opened += 1;
                }
            }
        }
        opened
    }

    /// Number of cells connected to cell `(0, 0)` through passages
    ///
    /// Zero if the bitmap has no cells or the first cell is walled in.
    pub fn reachable_cells(&self) -> usize {
        let (width, height) = self.cell_dimensions();
        if width == 0 || height == 0 || self.get(1, 1) == Pixel::Wall {
            return 0;
        }

        let mut seen = vec![false; width * height];
        let mut queue = VecDeque::from([Cell::new(0, 0)]);
        seen[0] = true;
        let mut count = 0;

        while let Some(cell) = queue.pop_front() {
            count += 1;
            let (px, py) = cell.pixel();
            for (dx, dy) in NEIGHBOUR_OFFSETS {
                let Some(next) = cell.offset(dx, dy) else {
                    continue;
                };
                if next.x >= width || next.y >= height || seen[next.y * width + next.x] {
                    continue;
                }
                let wall_x = (px as i64 + dx) as usize;
                let wall_y = (py as i64 + dy) as usize;
                let (nx, ny) = next.pixel();
                if self.get(wall_x, wall_y) == Pixel::Passage
                    && self.get(nx, ny) == Pixel::Passage
                {
                    seen[next.y * width + next.x] = true;
                    queue.push_back(next);
                }
            }
        }
        count
    }
}

/// Neighbour offsets in the order they are considered: up, right, down, left
pub const NEIGHBOUR_OFFSETS: [(i64, i64); 4] = [(0, -1), (1, 0), (0, 1), (-1, 0)];

/// Cell space of the maze together with its bitmap and visited flags
#[derive(Debug)]
pub struct Grid {
    width: usize,
    height: usize,
    pixels: PixelGrid,
    /// Row-major, `visited[y * width + x]`
    visited: Vec<bool>,
}

impl Grid {
    /// Allocate a `width` x `height` maze with every pixel walled.
    ///
    /// Fails on negative dimensions, on dimensions above
    /// [MAX_DIMENSION], and when the buffers cannot be reserved.
    pub fn new(width: i64, height: i64) -> Result<Self> {
        let width = validate_dimension("width", width)?;
        let height = validate_dimension("height", height)?;

        let pixels = PixelGrid::try_filled(2 * width + 1, 2 * height + 1, Pixel::Wall)?;
        let visited = filled_buffer(width * height, false, "the visited cells of the maze")?;

        Ok(Self {
            width,
            height,
            pixels,
            visited,
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Bitmap of walls and passages
    pub fn pixels(&self) -> &PixelGrid {
        &self.pixels
    }

    pub fn into_pixels(self) -> PixelGrid {
        self.pixels
    }

    pub fn is_in_bounds(&self, x: i64, y: i64) -> bool {
        x >= 0 && y >= 0 && (x as u64) < self.width as u64 && (y as u64) < self.height as u64
    }

    pub fn is_visited(&self, cell: Cell) -> bool {
        self.visited[cell.y * self.width + cell.x]
    }

    /// Flag `cell` as entered. Flags are never cleared.
    pub fn mark_visited(&mut self, cell: Cell) {
        let offset = cell.y * self.width + cell.x;
        self.visited[offset] = true;
    }

    pub fn mark_passage(&mut self, cell: Cell) {
        let (px, py) = cell.pixel();
        self.pixels.set(px, py, Pixel::Passage);
    }

    /// Open the wall pixel between two adjacent cells.
    pub fn mark_wall_open(&mut self, a: Cell, b: Cell) {
        debug_assert!(a.is_adjacent(b), "{a:?} and {b:?} are not adjacent");
        let (ax, ay) = a.pixel();
        let (bx, by) = b.pixel();
        self.pixels.set((ax + bx) / 2, (ay + by) / 2, Pixel::Passage);
    }
}

fn validate_dimension(axis: &'static str, value: i64) -> Result<usize> {
    if value < 0 {
        return Err(MazeError::NegativeDimension { axis, value });
    }
    match usize::try_from(value) {
        Ok(size) if size <= MAX_DIMENSION => Ok(size),
        _ => Err(MazeError::DimensionTooLarge {
            axis,
            value,
            max: MAX_DIMENSION,
        }),
    }
}

/// `vec![fill; len]` that reports allocation failure instead of aborting
fn filled_buffer<T: Clone>(len: usize, fill: T, what: &'static str) -> Result<Vec<T>> {
    let mut buffer = Vec::new();
    buffer
        .try_reserve_exact(len)
        .map_err(|source| MazeError::Allocation { what, source })?;
    buffer.resize(len, fill);
    Ok(buffer)
}
