use std::convert::Infallible;

use rand::Rng;
use rand_chacha::ChaCha8Rng;
use rand_distr::{Distribution, Normal};

use crate::env::{Action, ActionSpace};

/// Proposes actions for the walkers being stepped.
///
/// `predict` sees the observations of every walker advanced in the current
/// iteration, so population-level heuristics are possible. It must return
/// exactly one action per observation.
pub trait Model<O> {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Capability tag, read once when the planner is built.
    fn action_space(&self) -> &ActionSpace;

    fn predict(
        &mut self,
        observations: &[&O],
        rng: &mut ChaCha8Rng,
    ) -> Result<Vec<Action>, Self::Error>;
}

/// Samples actions uniformly from its action space, ignoring observations.
#[derive(Debug, Clone)]
pub struct RandomModel {
    space: ActionSpace,
}

impl RandomModel {
    pub fn new(space: ActionSpace) -> Self {
        RandomModel { space }
    }

    /// Uniform choice among `n` discrete actions.
    pub fn discrete(n: usize) -> Self {
        Self::new(ActionSpace::Discrete { n })
    }

    /// Uniform sampling inside the box `low..=high`.
    pub fn continuous(low: Vec<f64>, high: Vec<f64>) -> Self {
        Self::new(ActionSpace::Continuous { low, high })
    }

    fn sample(&self, rng: &mut ChaCha8Rng) -> Action {
        match &self.space {
            ActionSpace::Discrete { n } => Action::Discrete(rng.gen_range(0..*n)),
            ActionSpace::Continuous { low, high } => Action::Continuous(
                low.iter()
                    .zip(high)
                    .map(|(lo, hi)| rng.gen_range(*lo..=*hi))
                    .collect(),
            ),
        }
    }
}

impl<O> Model<O> for RandomModel {
    type Error = Infallible;

    fn action_space(&self) -> &ActionSpace {
        &self.space
    }

    fn predict(
        &mut self,
        observations: &[&O],
        rng: &mut ChaCha8Rng,
    ) -> Result<Vec<Action>, Self::Error> {
        Ok(observations.iter().map(|_| self.sample(rng)).collect())
    }
}

/// Draws how many times a walker repeats its action ("skipframe").
#[derive(Debug, Clone, Copy)]
pub struct RepeatSampler {
    normal: Option<Normal<f64>>,
    min: u32,
}

impl RepeatSampler {
    /// Always repeat `min` times.
    pub fn fixed(min: u32) -> Self {
        RepeatSampler { normal: None, min }
    }

    /// Normal draws around `mean`, rounded and never below `min`.
    /// Returns `None` for a non-finite mean or a negative/non-finite std.
    pub fn normal(mean: f64, std: f64, min: u32) -> Option<Self> {
        if !mean.is_finite() {
            return None;
        }
        let normal = Normal::new(mean, std).ok()?;
        Some(RepeatSampler {
            normal: Some(normal),
            min,
        })
    }

    pub fn min(&self) -> u32 {
        self.min
    }

    pub fn sample(&self, rng: &mut ChaCha8Rng) -> u32 {
        match self.normal {
            None => self.min,
            Some(normal) => {
                let drawn = normal.sample(rng).round();
                if drawn <= self.min as f64 {
                    self.min
                } else {
                    drawn.min(u32::MAX as f64) as u32
                }
            }
        }
    }
}
