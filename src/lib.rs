//! Generate perfect mazes and store them as plain PBM bitmaps
//!
//! A maze of `width` x `height` cells is carved into a bitmap of
//! `(2 * width + 1)` x `(2 * height + 1)` pixels. Cell `(x, y)` sits at
//! pixel `(1 + 2x, 1 + 2y)`, the pixels between neighbouring cells are the
//! walls, and the outer frame is always closed. Walls are opened by a
//! randomized depth-first walk, so there is exactly one path between any
//! two cells.
//!
//! # Examples
//! ## A 3x2 maze
//! ```
//! use pbm_maze::{pbm, MazeGenerator};
//!
//! let mut generator = MazeGenerator::with_seed(0);
//! let grid = generator.generate(3, 2).unwrap();
//! assert_eq!(generator.walls_opened(), 3 * 2 - 1);
//!
//! let mut out = Vec::new();
//! pbm::write(grid.pixels(), &mut out).unwrap();
//! let text = String::from_utf8(out).unwrap();
//! assert!(text.starts_with("P1\n7 5\n"));
//! ```
//!
//! ## Reproducing mazes of tools built on C `rand()`
//! ```
//! use pbm_maze::{GlibcSequence, MazeGenerator};
//!
//! let grid = MazeGenerator::new(GlibcSequence::new(0)).generate(10, 10).unwrap();
//! assert_eq!(grid.pixels().reachable_cells(), 100);
//! ```

pub mod error;
pub mod grid;
pub mod maze_generator;
pub mod pbm;
pub mod random;

pub use error::MazeError;
pub use grid::{Cell, Grid, Pixel, PixelGrid, MAX_DIMENSION};
pub use maze_generator::{MazeGenerator, Phase};
pub use random::{GlibcSequence, RandomSequence, SeededSequence, DEFAULT_SEED};
