//! Pluggable randomness for world generation, AI target choice and combat.
//!
//! Every random draw in the simulation goes through a [`RandomSource`]
//! passed in by the caller. Production code uses [`StdRandom`], seeded from
//! the operating system. Tests substitute [`SequenceRandom`] to script the
//! exact values a scenario needs.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// A source of uniform random numbers.
pub trait RandomSource: Send {
    /// Uniform float in `[0, 1)`.
    fn next_f64(&mut self) -> f64;

    /// Uniform integer in `[0, n)`. Returns 0 when `n` is 0.
    fn below(&mut self, n: usize) -> usize {
        if n == 0 {
            return 0;
        }
        #[allow(clippy::cast_precision_loss)]
        let scaled = (self.next_f64() * n as f64).floor();
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let index = scaled as usize;
        index.min(n.saturating_sub(1))
    }

    /// Uniform float in `[low, high)`.
    fn uniform(&mut self, low: f64, high: f64) -> f64 {
        (high - low).mul_add(self.next_f64(), low)
    }
}

// ---------------------------------------------------------------------------
// StdRandom
// ---------------------------------------------------------------------------

/// [`RandomSource`] backed by [`StdRng`].
#[derive(Debug, Clone)]
pub struct StdRandom {
    rng: StdRng,
}

impl StdRandom {
    /// Seed from operating-system entropy.
    pub fn from_entropy() -> Self {
        Self {
            rng: StdRng::from_os_rng(),
        }
    }

    /// Seed from a fixed value.
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Default for StdRandom {
    fn default() -> Self {
        Self::from_entropy()
    }
}

impl RandomSource for StdRandom {
    fn next_f64(&mut self) -> f64 {
        self.rng.random::<f64>()
    }

    fn below(&mut self, n: usize) -> usize {
        if n == 0 {
            return 0;
        }
        self.rng.random_range(0..n)
    }
}

// ---------------------------------------------------------------------------
// SequenceRandom
// ---------------------------------------------------------------------------

/// Scripted [`RandomSource`] that replays a fixed list of values in a loop.
///
/// Values are clamped into `[0, 1)`. An empty script always yields 0.
#[derive(Debug, Clone, Default)]
pub struct SequenceRandom {
    values: Vec<f64>,
    cursor: usize,
}

impl SequenceRandom {
    /// Replay `values` in order, wrapping around at the end.
    pub fn new(values: Vec<f64>) -> Self {
        Self { values, cursor: 0 }
    }

    /// Always yield the same value.
    pub fn constant(value: f64) -> Self {
        Self::new(vec![value])
    }

    /// Number of draws taken so far.
    pub const fn draws(&self) -> usize {
        self.cursor
    }
}

impl RandomSource for SequenceRandom {
    fn next_f64(&mut self) -> f64 {
        let value = match self.values.len() {
            0 => 0.0,
            len => self
                .values
                .get(self.cursor.checked_rem(len).unwrap_or(0))
                .copied()
                .unwrap_or(0.0),
        };
        self.cursor = self.cursor.saturating_add(1);
        value.clamp(0.0, 1.0 - f64::EPSILON)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sequence_replays_in_order_and_wraps() {
        let mut rng = SequenceRandom::new(vec![0.1, 0.2]);
        assert!((rng.next_f64() - 0.1).abs() < f64::EPSILON);
        assert!((rng.next_f64() - 0.2).abs() < f64::EPSILON);
        assert!((rng.next_f64() - 0.1).abs() < f64::EPSILON);
        assert_eq!(rng.draws(), 3);
    }

    #[test]
    fn below_maps_unit_interval_onto_indices() {
        let mut rng = SequenceRandom::new(vec![0.0, 0.49, 0.5, 0.999]);
        assert_eq!(rng.below(2), 0);
        assert_eq!(rng.below(2), 0);
        assert_eq!(rng.below(2), 1);
        assert_eq!(rng.below(2), 1);
    }

    #[test]
    fn below_zero_is_zero() {
        let mut rng = SequenceRandom::constant(0.7);
        assert_eq!(rng.below(0), 0);
        let mut std_rng = StdRandom::seeded(7);
        assert_eq!(std_rng.below(0), 0);
    }

    #[test]
    fn uniform_scales_into_range() {
        let mut rng = SequenceRandom::constant(0.5);
        assert!((rng.uniform(0.8, 1.2) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn empty_sequence_yields_zero() {
        let mut rng = SequenceRandom::default();
        assert!(rng.next_f64().abs() < f64::EPSILON);
    }

    #[test]
    fn std_random_stays_in_range() {
        let mut rng = StdRandom::seeded(42);
        for _ in 0..1000 {
            let v = rng.next_f64();
            assert!((0.0..1.0).contains(&v));
            assert!(rng.below(7) < 7);
        }
    }
}
