use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Source of uniform indices. Injected into the controller so selections can be pinned.
pub trait RandomSource {
    /// Return an index in `0..len`. `len` is always non-zero.
    fn next_index(&mut self, len: usize) -> usize;
}

/// Uniformly pick one entry of a non-empty catalog.
pub fn pick(source: &mut dyn RandomSource, catalog: &'static [&'static str]) -> &'static str {
    let idx = source.next_index(catalog.len());
    // Out-of-range indices from a misbehaving source wrap instead of panicking.
    catalog[idx % catalog.len()]
}

/// Thread-local RNG from `rand::rng()`.
#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadRandom;

impl RandomSource for ThreadRandom {
    fn next_index(&mut self, len: usize) -> usize {
        rand::rng().random_range(0..len)
    }
}

/// Reproducible RNG for demos and tests.
#[derive(Debug, Clone)]
pub struct SeededRandom {
    rng: StdRng,
}

impl SeededRandom {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl RandomSource for SeededRandom {
    fn next_index(&mut self, len: usize) -> usize {
        self.rng.random_range(0..len)
    }
}

/// Test double: replays a fixed sequence of indices, cycling when exhausted.
#[doc(hidden)]
#[derive(Debug, Clone)]
pub struct ScriptedRandom {
    script: Vec<usize>,
    pos: usize,
}

impl ScriptedRandom {
    pub fn new(script: Vec<usize>) -> Self {
        Self { script, pos: 0 }
    }
}

impl RandomSource for ScriptedRandom {
    fn next_index(&mut self, len: usize) -> usize {
        if self.script.is_empty() {
            return 0;
        }
        let value = self.script[self.pos % self.script.len()];
        self.pos += 1;
        value % len
    }
}
