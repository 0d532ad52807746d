//! Random rolls used by the resolver and bail flows.
//!
//! All randomness goes through [`Dice`] so that tests can replay exact outcomes.

use rand::{Rng, SeedableRng, rngs::StdRng};

/// Source of uniform rolls in `[0, 1)`.
pub trait Dice: Send + Sync {
    /// Draws a uniform value in `[0, 1)`.
    fn roll(&mut self) -> f64;

    /// Draws a uniform integer in `[min, max]` (inclusive). Returns `min` when `max <= min`.
    fn between(&mut self, min: i64, max: i64) -> i64 {
        if max <= min {
            return min;
        }
        let span = (max - min + 1) as f64;
        #[allow(clippy::cast_possible_truncation)]
        let offset = (self.roll() * span).floor() as i64;
        min + offset.min(max - min)
    }

    /// Returns true with probability `p`.
    fn chance(&mut self, p: f64) -> bool {
        self.roll() < p
    }
}

/// Production dice backed by a seeded-from-entropy `StdRng`.
#[derive(Debug)]
pub struct RandomDice {
    rng: StdRng,
}

impl RandomDice {
    /// Seeds a new generator from OS entropy.
    #[must_use]
    pub fn from_entropy() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    /// Deterministic generator for reproducible runs.
    #[must_use]
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Dice for RandomDice {
    fn roll(&mut self) -> f64 {
        self.rng.r#gen::<f64>()
    }
}

/// Replays a fixed list of rolls, then repeats the last one.
#[cfg(test)]
#[derive(Debug, Clone)]
pub struct ScriptedDice {
    rolls: std::collections::VecDeque<f64>,
    last: f64,
}

#[cfg(test)]
impl ScriptedDice {
    pub fn new(rolls: &[f64]) -> Self {
        Self {
            rolls: rolls.iter().copied().collect(),
            last: rolls.last().copied().unwrap_or(0.0),
        }
    }
}

#[cfg(test)]
impl Dice for ScriptedDice {
    fn roll(&mut self) -> f64 {
        self.rolls.pop_front().unwrap_or(self.last)
    }
}
