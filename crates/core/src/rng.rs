//! Seeded random helpers shared by maze generation and hazard patrol.

use rand_chacha::{ChaCha8Rng, rand_core::Rng};

pub(crate) fn random_below(rng: &mut ChaCha8Rng, bound: usize) -> usize {
    debug_assert!(bound > 0);
    (rng.next_u64() % bound as u64) as usize
}

/// Uniform sample in `[0, 1)` with 24 bits of precision.
pub(crate) fn random_unit(rng: &mut ChaCha8Rng) -> f32 {
    (rng.next_u64() >> 40) as f32 / (1u64 << 24) as f32
}
