//! Deterministic random sequences used to pick the next cell

use rand::{rngs::StdRng, Rng, SeedableRng};

/// Seed used when none is given, so that repeated runs produce the same maze
pub const DEFAULT_SEED: u64 = 0;

/// Source of bounded random integers for neighbour selection.
pub trait RandomSequence {
    /// Draw an integer in `[0, bound)`.
    ///
    /// `bound` must be positive.
    fn next_below(&mut self, bound: usize) -> usize;
}

impl<R: RandomSequence + ?Sized> RandomSequence for &mut R {
    fn next_below(&mut self, bound: usize) -> usize {
        (**self).next_below(bound)
    }
}

/// Sequence backed by the standard seeded generator of `rand`
pub struct SeededSequence {
    random: StdRng,
}

impl SeededSequence {
    pub fn new(seed: u64) -> Self {
        Self {
            random: StdRng::seed_from_u64(seed),
        }
    }
}

impl Default for SeededSequence {
    fn default() -> Self {
        Self::new(DEFAULT_SEED)
    }
}

impl RandomSequence for SeededSequence {
    fn next_below(&mut self, bound: usize) -> usize {
        debug_assert!(bound > 0, "next_below requires a positive bound");
        self.random.gen_range(0..bound)
    }
}

/// Additive feedback generator compatible with glibc `srand`/`rand`
///
/// Reproduces the TYPE_3 generator (degree 31, separation 3) that glibc
/// uses by default, including its quirk of treating seed 0 as seed 1.
/// Draws are reduced with `rand() % bound`, which makes mazes produced
/// with this sequence identical to those of C tools built on `rand()`.
pub struct GlibcSequence {
    state: [u32; Self::DEGREE],
    front: usize,
    rear: usize,
}

impl GlibcSequence {
    const DEGREE: usize = 31;
    const SEPARATION: usize = 3;
    /// glibc discards `10 * DEGREE` outputs after seeding
    const WARM_UP: usize = 10 * Self::DEGREE;

    pub fn new(seed: u32) -> Self {
        let mut state = [0u32; Self::DEGREE];
        let seed = if seed == 0 { 1 } else { seed };
        state[0] = seed;

        // Park-Miller "minimal standard" step, computed on a signed 32-bit word
        let mut word = seed as i32 as i64;
        for slot in state.iter_mut().skip(1) {
            let hi = word / 127_773;
            let lo = word % 127_773;
            word = 16_807 * lo - 2_836 * hi;
            if word < 0 {
                word += 2_147_483_647;
            }
            *slot = word as u32;
        }

        let mut sequence = Self {
            state,
            front: Self::SEPARATION,
            rear: 0,
        };
        for _ in 0..Self::WARM_UP {
            sequence.next_raw();
        }
        sequence
    }

    /// Next value in `[0, 2^31)`, as returned by glibc `rand()`
    pub fn next_raw(&mut self) -> u32 {
        self.state[self.front] = self.state[self.front].wrapping_add(self.state[self.rear]);
        let result = self.state[self.front] >> 1;

        self.front += 1;
        if self.front >= Self::DEGREE {
            self.front = 0;
            self.rear += 1;
        } else {
            self.rear += 1;
            if self.rear >= Self::DEGREE {
                self.rear = 0;
            }
        }
        result
    }
}

impl RandomSequence for GlibcSequence {
    fn next_below(&mut self, bound: usize) -> usize {
        debug_assert!(bound > 0, "next_below requires a positive bound");
        self.next_raw() as usize % bound
    }
}
