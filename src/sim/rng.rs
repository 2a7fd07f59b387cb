//! Injectable randomness
//!
//! Everything in `sim` draws through [`RandomSource`] so a run can be
//! replayed from its seed and tests can script exact draws.

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

/// A source of uniform floats in `[0, 1)`
pub trait RandomSource {
    fn next_f64(&mut self) -> f64;

    /// Uniform integer in `[min, max]` (inclusive). Returns `min` if the range is empty.
    fn range_i32(&mut self, min: i32, max: i32) -> i32 {
        if max <= min {
            return min;
        }
        let span = (max as i64 - min as i64 + 1) as f64;
        let offset = (self.next_f64() * span).floor() as i64;
        (min as i64 + offset).min(max as i64) as i32
    }

    /// Uniform float in `[min, max)`
    fn range_f32(&mut self, min: f32, max: f32) -> f32 {
        min + (max - min) * self.next_f64() as f32
    }

    /// True with probability `p`
    fn chance(&mut self, p: f64) -> bool {
        self.next_f64() < p
    }

    /// Random index into a collection of `len` items
    fn index(&mut self, len: usize) -> Option<usize> {
        if len == 0 {
            return None;
        }
        Some(((self.next_f64() * len as f64) as usize).min(len - 1))
    }

    /// +1.0 or -1.0 with equal odds
    fn sign(&mut self) -> f32 {
        if self.chance(0.5) { 1.0 } else { -1.0 }
    }
}

impl RandomSource for Pcg32 {
    fn next_f64(&mut self) -> f64 {
        self.random::<f64>()
    }
}

/// Build the run RNG from a seed
pub fn seeded(seed: u64) -> Pcg32 {
    Pcg32::seed_from_u64(seed)
}

/// Replays a fixed list of draws, cycling when exhausted
#[cfg(test)]
pub struct ScriptedRng {
    values: Vec<f64>,
    cursor: usize,
}

#[cfg(test)]
impl ScriptedRng {
    pub fn new(values: &[f64]) -> Self {
        Self {
            values: values.to_vec(),
            cursor: 0,
        }
    }
}

#[cfg(test)]
impl RandomSource for ScriptedRng {
    fn next_f64(&mut self) -> f64 {
        let v = self.values[self.cursor % self.values.len()];
        self.cursor += 1;
        v
    }
}
