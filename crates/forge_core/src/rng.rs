//! Synchronized random number generator.
//!
//! Every peer runs the same draws in the same order, so the generator state
//! is part of the saved game and the state hash.

use std::hash::{Hash, Hasher};

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

/// Seeded generator shared by all simulation code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncRng {
    seed: u64,
    draws: u64,
    rng: ChaCha8Rng,
}

impl SyncRng {
    /// Create a generator from a seed.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            draws: 0,
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// Seed the generator was created with.
    #[must_use]
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Number of draws taken so far.
    #[must_use]
    pub fn draws(&self) -> u64 {
        self.draws
    }

    /// Draw a uniform index in `0..len`, or `None` (without drawing) when
    /// `len` is zero.
    pub fn draw_index(&mut self, len: usize) -> Option<usize> {
        if len == 0 {
            return None;
        }
        self.draws += 1;
        Some(self.rng.gen_range(0..len))
    }
}

impl Default for SyncRng {
    fn default() -> Self {
        Self::new(0)
    }
}

impl Hash for SyncRng {
    fn hash<H: Hasher>(&self, state: &mut H) {
        // Seed plus draw count pins down the generator position.
        self.seed.hash(state);
        self.draws.hash(state);
    }
}
