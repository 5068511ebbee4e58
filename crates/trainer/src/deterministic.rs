//! Deterministic utilities for reproducible training
//!
//! Seeded sampling and split tie-breaking so that a given seed produces the
//! same model on every run, regardless of worker thread count.

use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

/// Portable seeded generator used for all subsampling
pub fn seeded_rng(seed: u64) -> ChaCha8Rng {
    ChaCha8Rng::seed_from_u64(seed)
}

/// Number of items kept when sampling `fraction` of `total`; at least one
/// when `total > 0`
pub fn sample_size(total: usize, fraction: f64) -> usize {
    if total == 0 {
        return 0;
    }
    ((total as f64 * fraction).round() as usize).clamp(1, total)
}

/// Sample `fraction` of `0..total` without replacement, returned ascending
pub fn sample_indices(rng: &mut ChaCha8Rng, total: usize, fraction: f64) -> Vec<usize> {
    let keep = sample_size(total, fraction);
    let mut indices: Vec<usize> = (0..total).collect();
    if keep < total {
        indices.shuffle(rng);
        indices.truncate(keep);
        indices.sort_unstable();
    }
    indices
}

/// Deterministic tie-breaker for split selection
/// Lower `(feature_idx, bin)` wins between equal gains
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct SplitTieBreaker {
    pub feature_idx: usize,
    pub bin: usize,
}

impl SplitTieBreaker {
    pub fn new(feature_idx: usize, bin: usize) -> Self {
        Self { feature_idx, bin }
    }
}
