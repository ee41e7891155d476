//! Random sources for variant selection.

use rand::{rngs::SmallRng, Rng, SeedableRng};

/// Yields uniform draws in `[0, 1)`.
pub trait RandomSource {
    fn next_unit(&mut self) -> f32;
}

/// Default source backed by a [`SmallRng`].
pub struct RngSource {
    rng: SmallRng,
}

impl RngSource {
    pub fn from_entropy() -> Self {
        Self {
            rng: SmallRng::from_entropy(),
        }
    }

    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: SmallRng::seed_from_u64(seed),
        }
    }
}

impl Default for RngSource {
    fn default() -> Self {
        Self::from_entropy()
    }
}

impl RandomSource for RngSource {
    fn next_unit(&mut self) -> f32 {
        self.rng.gen::<f32>()
    }
}

/// Replays a fixed list of draws, wrapping around at the end.
#[derive(Debug, Clone)]
pub struct SequenceRandom {
    values: Vec<f32>,
    cursor: usize,
}

impl SequenceRandom {
    pub fn new(values: impl Into<Vec<f32>>) -> Self {
        let values = values.into();
        assert!(!values.is_empty(), "random sequence is empty");
        assert!(
            values.iter().all(|value| (0.0..1.0).contains(value)),
            "random sequence {:?} leaves [0, 1)",
            values
        );
        Self { values, cursor: 0 }
    }
}

impl RandomSource for SequenceRandom {
    fn next_unit(&mut self) -> f32 {
        let value = self.values[self.cursor];
        self.cursor = (self.cursor + 1) % self.values.len();
        value
    }
}
