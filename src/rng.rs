//! Explicit, reseedable noise generator
//!
//! Every transform threads one `NoiseRng` through its draws. Reseeding
//! restarts the stream, which is how a routine derives a fixed permutation
//! from seed 0 and then switches to the caller's seed.

use rand::distributions::Bernoulli;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rand_distr::{Distribution, Normal};

/// Seed used for the fixed symbol and category relabelings.
pub const PERMUTATION_SEED: u64 = 0;

#[derive(Debug, Clone)]
pub struct NoiseRng {
    inner: ChaCha8Rng,
}

impl NoiseRng {
    pub fn new(seed: u64) -> Self {
        Self {
            inner: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    pub fn reseed(&mut self, seed: u64) {
        self.inner = ChaCha8Rng::seed_from_u64(seed);
    }

    pub fn normal(&mut self, noise: &Normal<f64>) -> f64 {
        noise.sample(&mut self.inner)
    }

    pub fn bernoulli(&mut self, coin: &Bernoulli) -> bool {
        coin.sample(&mut self.inner)
    }

    /// Uniform pick from `items`; `None` when empty.
    pub fn choose<'a, T>(&mut self, items: &'a [T]) -> Option<&'a T> {
        items.choose(&mut self.inner)
    }

    /// Random ordering of `0..n` drawn from the current stream.
    pub fn permutation(&mut self, n: usize) -> Vec<usize> {
        let mut order: Vec<usize> = (0..n).collect();
        order.shuffle(&mut self.inner);
        order
    }
}

/// Rank of each index under a fixed seed-0 relabeling of `0..n`.
///
/// `ranks[i]` is the position of original index `i` in the shuffled order.
/// The generator is reseeded with [`PERMUTATION_SEED`] first, so the result
/// never depends on the perturbation seed.
pub fn fixed_ranks(rng: &mut NoiseRng, n: usize) -> Vec<usize> {
    rng.reseed(PERMUTATION_SEED);
    let order = rng.permutation(n);
    let mut ranks = vec![0; n];
    for (rank, &original) in order.iter().enumerate() {
        ranks[original] = rank;
    }
    ranks
}
