//! Maze generation

use std::mem;

use log::debug;

use crate::error::{MazeError, Result};
use crate::grid::{Cell, Grid, NEIGHBOUR_OFFSETS};
use crate::random::{RandomSequence, SeededSequence};

/// Progress of the backtracking walk
#[derive(PartialEq, Eq, Clone, Copy, Debug)]
pub enum Phase {
    /// Nothing carved yet
    Start,
    /// Walking; the stack holds the current path
    Exploring,
    /// Stack drained, every reachable cell visited
    Done,
}

/// Perfect maze generator using randomized depth-first backtracking.
///
/// The walk starts from cell `(0, 0)`. At each step the cell on top of the
/// stack is popped; if it still has unvisited neighbours it is pushed back,
/// one neighbour is chosen with [RandomSequence::next_below] and the wall
/// towards it is opened. A cell without unvisited neighbours is dropped
/// for good. Since every cell is entered exactly once through exactly one
/// opened wall, the opened walls form a spanning tree of the grid.
pub struct MazeGenerator<R> {
    random: R,
    stack: Vec<Cell>,
    phase: Phase,
    walls_opened: usize,
}

impl MazeGenerator<SeededSequence> {
    /// Generator drawing from [SeededSequence] with the given seed
    pub fn with_seed(seed: u64) -> Self {
        Self::new(SeededSequence::new(seed))
    }
}

impl<R: RandomSequence> MazeGenerator<R> {
    pub fn new(random: R) -> Self {
        Self {
            random,
            stack: Vec::new(),
            phase: Phase::Start,
            walls_opened: 0,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Walls opened since the last [Self::carve] started
    pub fn walls_opened(&self) -> usize {
        self.walls_opened
    }

    /// Cells currently on the backtracking stack, bottom first
    pub fn path(&self) -> &[Cell] {
        &self.stack
    }

    /// Allocate a `width` x `height` grid and carve a maze into it.
    pub fn generate(&mut self, width: i64, height: i64) -> Result<Grid> {
        let mut grid = Grid::new(width, height)?;
        self.carve(&mut grid)?;
        Ok(grid)
    }

    /// Carve a maze into a freshly allocated grid, running until [Phase::Done].
    ///
    /// On failure the backtracking stack is released and the generator
    /// returns to [Phase::Start]; the grid contents are unspecified.
    pub fn carve(&mut self, grid: &mut Grid) -> Result<()> {
        self.reset();
        debug!("Carving a {}x{} maze", grid.width(), grid.height());

        loop {
            match self.step(grid) {
                Ok(Phase::Done) => break,
                Ok(_) => (),
                Err(err) => {
                    self.reset();
                    return Err(err);
                }
            }
        }

        debug!("Maze complete, {} walls opened", self.walls_opened);
        Ok(())
    }

    /// Advance the walk by one transition and return the new phase.
    ///
    /// Calling this in [Phase::Done] does nothing.
    pub fn step(&mut self, grid: &mut Grid) -> Result<Phase> {
        match self.phase {
            Phase::Start => self.start(grid)?,
            Phase::Exploring => self.explore(grid)?,
            Phase::Done => (),
        }
        Ok(self.phase)
    }

    /// Drop the stack and any progress, keeping the random sequence as is
    fn reset(&mut self) {
        drop(mem::take(&mut self.stack));
        self.phase = Phase::Start;
        self.walls_opened = 0;
    }

    fn start(&mut self, grid: &mut Grid) -> Result<()> {
        if grid.width() == 0 || grid.height() == 0 {
            debug!("Maze has no cells, nothing to carve");
            self.phase = Phase::Done;
            return Ok(());
        }

        let origin = Cell::new(0, 0);
        grid.mark_visited(origin);
        grid.mark_passage(origin);
        self.push(origin)?;
        self.phase = Phase::Exploring;
        Ok(())
    }

    fn explore(&mut self, grid: &mut Grid) -> Result<()> {
        let Some(current) = self.stack.pop() else {
            self.phase = Phase::Done;
            return Ok(());
        };

        let (candidates, count) = Self::unvisited_neighbours(grid, current);
        if count > 0 {
            // Capacity freed by the pop above, so this cannot reallocate
            self.stack.push(current);

            let next = candidates[self.random.next_below(count)];
            grid.mark_visited(next);
            grid.mark_passage(next);
            grid.mark_wall_open(current, next);
            self.walls_opened += 1;
            self.push(next)?;
        }

        if self.stack.is_empty() {
            drop(mem::take(&mut self.stack));
            self.phase = Phase::Done;
        }
        Ok(())
    }

    /// In-bounds, unvisited neighbours of `cell` in up, right, down, left order
    fn unvisited_neighbours(grid: &Grid, cell: Cell) -> ([Cell; 4], usize) {
        let mut candidates = [cell; 4];
        let mut count = 0;
        for (dx, dy) in NEIGHBOUR_OFFSETS {
            let (x, y) = (cell.x as i64 + dx, cell.y as i64 + dy);
            if !grid.is_in_bounds(x, y) {
                continue;
            }
            let next = Cell::new(x as usize, y as usize);
            if !grid.is_visited(next) {
                candidates[count] = next;
                count += 1;
            }
        }
        (candidates, count)
    }

    fn push(&mut self, cell: Cell) -> Result<()> {
        self.stack
            .try_reserve(1)
            .map_err(|source| MazeError::Allocation {
                what: "the backtracking stack",
                source,
            })?;
        self.stack.push(cell);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use itertools::Itertools;
    use proptest::prelude::*;

    use super::{MazeGenerator, Phase};
    use crate::grid::{Cell, Grid, Pixel};
    use crate::random::{GlibcSequence, RandomSequence, SeededSequence};

    /// Replays fixed draws, repeating the last one
    struct Scripted {
        draws: Vec<usize>,
        calls: usize,
    }

    impl RandomSequence for Scripted {
        fn next_below(&mut self, bound: usize) -> usize {
            let draw = self.draws[self.calls.min(self.draws.len() - 1)];
            self.calls += 1;
            draw % bound
        }
    }

    fn render(grid: &Grid) -> String {
        grid.pixels()
            .rows()
            .map(|row| row.iter().join(""))
            .join("\n")
    }

    fn assert_perfect(grid: &Grid) {
        let cells = grid.width() * grid.height();
        let pixels = grid.pixels();
        assert_eq!(pixels.opened_walls(), cells.saturating_sub(1));
        assert_eq!(pixels.reachable_cells(), cells);
        assert!(pixels.has_closed_border());
    }

    #[test]
    fn two_by_one_snapshot() {
        let grid = MazeGenerator::with_seed(0).generate(2, 1).unwrap();
        assert_eq!(render(&grid), "11111\n10001\n11111");
    }

    #[test]
    fn single_cell_is_open_with_no_walls_removed() {
        let mut gen = MazeGenerator::with_seed(0);
        let grid = gen.generate(1, 1).unwrap();
        assert_eq!(render(&grid), "111\n101\n111");
        assert_eq!(gen.walls_opened(), 0);
        assert_eq!(gen.phase(), Phase::Done);
    }

    #[test]
    fn degenerate_grids_stay_walled() {
        for (width, height) in [(0, 0), (0, 4), (5, 0)] {
            let mut gen = MazeGenerator::with_seed(0);
            let grid = gen.generate(width, height).unwrap();
            assert_eq!(gen.phase(), Phase::Done);
            assert_eq!(gen.walls_opened(), 0);
            assert!(grid.pixels().rows().flatten().all(|p| *p == Pixel::Wall));
        }
    }

    #[test]
    fn scripted_draws_pick_candidates_in_fixed_order() {
        // From (0, 0) in a 2x2 grid the candidates are right then down.
        // Always drawing 0 walks right, down, left.
        let mut gen = MazeGenerator::new(Scripted {
            draws: vec![0],
            calls: 0,
        });
        let grid = gen.generate(2, 2).unwrap();
        assert_eq!(render(&grid), "11111\n10001\n11101\n10001\n11111");

        // Always drawing 1 walks down first, then right, then up.
        let mut gen = MazeGenerator::new(Scripted {
            draws: vec![1],
            calls: 0,
        });
        let grid = gen.generate(2, 2).unwrap();
        assert_eq!(render(&grid), "11111\n10101\n10101\n10001\n11111");
    }

    #[test]
    fn stepping_walks_through_phases() {
        let mut gen = MazeGenerator::with_seed(3);
        let mut grid = Grid::new(3, 3).unwrap();
        assert_eq!(gen.phase(), Phase::Start);

        assert_eq!(gen.step(&mut grid).unwrap(), Phase::Exploring);
        assert_eq!(gen.path(), &[Cell::new(0, 0)]);

        let mut steps = 1;
        while gen.step(&mut grid).unwrap() != Phase::Done {
            steps += 1;
            // Every cell on the path is adjacent to the one below it
            for pair in gen.path().windows(2) {
                assert!(pair[0].is_adjacent(pair[1]));
            }
        }
        // Each cell is pushed once and popped without refill once
        assert!(steps <= 2 * 9);
        assert!(gen.path().is_empty());
        assert_eq!(gen.step(&mut grid).unwrap(), Phase::Done);
        assert_perfect(&grid);
    }

    #[test]
    fn drained_stack_is_released() {
        let mut gen = MazeGenerator::with_seed(2);
        gen.generate(9, 6).unwrap();
        assert_eq!(gen.phase(), Phase::Done);
        assert_eq!(gen.stack.capacity(), 0);

        let mut gen = MazeGenerator::with_seed(2);
        let mut grid = Grid::new(4, 4).unwrap();
        while gen.step(&mut grid).unwrap() != Phase::Done {
            assert!(gen.stack.capacity() > 0);
        }
        assert_eq!(gen.stack.capacity(), 0);
    }

    #[test]
    fn borrowed_sequence_keeps_advancing() {
        let mut sequence = SeededSequence::new(4);
        let borrowed = MazeGenerator::new(&mut sequence).generate(5, 3).unwrap();

        let mut owned = MazeGenerator::with_seed(4);
        let grid = owned.generate(5, 3).unwrap();
        assert_eq!(borrowed.pixels(), grid.pixels());
        assert_eq!(sequence.next_below(1000), owned.random.next_below(1000));
    }

    #[test]
    fn every_cell_visited() {
        let grid = MazeGenerator::with_seed(11).generate(7, 5).unwrap();
        for y in 0..5 {
            for x in 0..7 {
                assert!(grid.is_visited(Cell::new(x, y)));
            }
        }
    }

    #[test]
    fn glibc_sequence_produces_perfect_maze() {
        let grid = MazeGenerator::new(GlibcSequence::new(0))
            .generate(16, 9)
            .unwrap();
        assert_perfect(&grid);
    }

    #[test]
    fn reused_generator_starts_over() {
        let mut gen = MazeGenerator::with_seed(5);
        gen.generate(4, 4).unwrap();
        let grid = gen.generate(3, 2).unwrap();
        assert_eq!(gen.walls_opened(), 5);
        assert_perfect(&grid);
    }

    #[test]
    fn invalid_dimensions_are_reported() {
        let mut gen = MazeGenerator::with_seed(0);
        assert!(gen.generate(-2, 2).unwrap_err().is_dimension());
        assert_eq!(gen.phase(), Phase::Start);
    }

    proptest! {
        #[test]
        fn generated_mazes_are_perfect(width in 1i64..24, height in 1i64..24, seed in any::<u64>()) {
            let grid = MazeGenerator::with_seed(seed).generate(width, height).unwrap();
            let cells = (width * height) as usize;
            prop_assert_eq!(grid.pixels().opened_walls(), cells - 1);
            prop_assert_eq!(grid.pixels().reachable_cells(), cells);
            prop_assert!(grid.pixels().has_closed_border());
        }

        #[test]
        fn generation_is_deterministic(width in 0i64..16, height in 0i64..16, seed in any::<u64>()) {
            let a = MazeGenerator::with_seed(seed).generate(width, height).unwrap();
            let b = MazeGenerator::with_seed(seed).generate(width, height).unwrap();
            prop_assert_eq!(a.pixels(), b.pixels());
        }
    }
}
