// src/utils/rng.rs

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// The single random source of a generation pass.
///
/// Wraps a ChaCha8 stream so that a seed reproduces the same layout on every
/// platform. A pass owns exactly one of these and threads it by `&mut` through
/// every stage; a second pass builds its own from its own seed.
#[derive(Debug, Clone)]
pub struct DungeonRng {
    inner: ChaCha8Rng,
}

impl DungeonRng {
    pub fn from_seed(seed: u64) -> Self {
        DungeonRng {
            inner: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// Uniform in `[0, 1)`.
    pub fn next_f64(&mut self) -> f64 {
        self.inner.random::<f64>()
    }

    /// Uniform in `[min, max)`. Returns `min` when the range is empty.
    pub fn range(&mut self, min: i32, max_exclusive: i32) -> i32 {
        if max_exclusive <= min {
            return min;
        }
        self.inner.random_range(min..max_exclusive)
    }

    /// Uniform in `[min, max]`. Returns `min` when `max < min`.
    pub fn range_inclusive(&mut self, min: i32, max: i32) -> i32 {
        if max <= min {
            return min;
        }
        self.inner.random_range(min..=max)
    }

    pub fn index(&mut self, len: usize) -> usize {
        if len <= 1 {
            return 0;
        }
        self.inner.random_range(0..len)
    }

    pub fn chance(&mut self, probability: f64) -> bool {
        self.next_f64() < probability
    }

    pub fn coin_flip(&mut self) -> bool {
        self.chance(0.5)
    }

    /// Random element, `None` for an empty slice.
    pub fn pick<'a, T>(&mut self, items: &'a [T]) -> Option<&'a T> {
        if items.is_empty() {
            return None;
        }
        let i = self.index(items.len());
        items.get(i)
    }

    /// Linear interpolation between `a` and `b` at a random point.
    pub fn lerp(&mut self, a: f64, b: f64) -> f64 {
        a + (b - a) * self.next_f64()
    }
}
