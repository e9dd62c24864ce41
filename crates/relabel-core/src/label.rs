//! Random label generation.
//!
//! Labels are drawn uniformly, with replacement, from the 52 ASCII letters.
//! The generator is injected into the transformer through [`LabelSource`] so
//! tests can substitute a deterministic sequence.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::time::{SystemTime, UNIX_EPOCH};

/// The characters a generated label is drawn from (a-z, A-Z).
pub const LABEL_ALPHABET: &[u8; 52] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// Default length of a generated label.
pub const DEFAULT_LABEL_LENGTH: usize = 8;

/// A source of replacement labels.
pub trait LabelSource {
    /// Produce the next label. Every call yields a fresh value; nothing is
    /// memoized between calls.
    fn next_label(&mut self) -> String;
}

/// Pseudo-random fixed-length alphabetic labels.
///
/// Not cryptographically secure. With 8 characters the chance that two
/// labels in one batch collide is negligible but not zero.
#[derive(Debug, Clone)]
pub struct RandomLabels {
    rng: StdRng,
    length: usize,
}

impl RandomLabels {
    /// Create a generator seeded from the wall clock (nanosecond resolution).
    pub fn new(length: usize) -> Self {
        Self::with_seed(length, clock_seed())
    }

    /// Create a generator with a fixed seed, for reproducible runs.
    pub fn with_seed(length: usize, seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            length,
        }
    }

    /// The length of every label this generator produces.
    pub fn length(&self) -> usize {
        self.length
    }
}

impl Default for RandomLabels {
    fn default() -> Self {
        Self::new(DEFAULT_LABEL_LENGTH)
    }
}

impl LabelSource for RandomLabels {
    fn next_label(&mut self) -> String {
        let rng = &mut self.rng;
        (0..self.length)
            .map(|_| LABEL_ALPHABET[rng.random_range(0..LABEL_ALPHABET.len())] as char)
            .collect()
    }
}

fn clock_seed() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_nanos() as u64)
        .unwrap_or_default()
}
