//! Randomness sources for the outcome engines
//!
//! Engines never touch a global RNG. They draw through `RandomSource`, which the
//! session manager obtains from an `RngProvider` per request. Production uses
//! `EntropyProvider`; unit tests inject `ScriptedRandom` to pin exact draws.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Uniform draws consumed by the outcome engines
pub trait RandomSource: Send {
    /// Uniform value in `[0, 100)`
    fn percent(&mut self) -> f64;

    /// Uniform integer in `[lo, hi]`
    fn range_inclusive(&mut self, lo: u32, hi: u32) -> u32;
}

/// Hands out a fresh `RandomSource` for each engine call
pub trait RngProvider: Send + Sync {
    fn source(&self) -> Box<dyn RandomSource>;
}

/// Fisher-Yates shuffle driven by a `RandomSource`
pub fn shuffle<T>(rng: &mut dyn RandomSource, items: &mut [T]) {
    for i in (1..items.len()).rev() {
        let j = rng.range_inclusive(0, i as u32) as usize;
        items.swap(i, j);
    }
}

/// OS-seeded `StdRng`
pub struct SystemRandom {
    rng: StdRng,
}

impl SystemRandom {
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Default for SystemRandom {
    fn default() -> Self {
        Self::new()
    }
}

impl RandomSource for SystemRandom {
    fn percent(&mut self) -> f64 {
        self.rng.gen_range(0.0..100.0)
    }

    fn range_inclusive(&mut self, lo: u32, hi: u32) -> u32 {
        self.rng.gen_range(lo..=hi)
    }
}

/// Provider that seeds every source from the operating system
#[derive(Debug, Default, Clone, Copy)]
pub struct EntropyProvider;

impl RngProvider for EntropyProvider {
    fn source(&self) -> Box<dyn RandomSource> {
        Box::new(SystemRandom::new())
    }
}

#[cfg(test)]
pub use scripted::ScriptedRandom;
