use std::fmt;

use serde::{Deserialize, Serialize};

/// Action handed to an environment: an index into a discrete set or a
/// point in a continuous box.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    Discrete(usize),
    Continuous(Vec<f64>),
}

impl Action {
    /// Index of a discrete action, `None` for continuous ones.
    pub fn index(&self) -> Option<usize> {
        match self {
            Action::Discrete(index) => Some(*index),
            Action::Continuous(_) => None,
        }
    }

    /// Components of a continuous action, `None` for discrete ones.
    pub fn as_vector(&self) -> Option<&[f64]> {
        match self {
            Action::Discrete(_) => None,
            Action::Continuous(values) => Some(values),
        }
    }
}

/// Capability tag shared by environments and models.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionSpace {
    /// `n` actions labelled `0..n`.
    Discrete { n: usize },
    /// Box bounded per dimension by `low[i]..=high[i]`.
    Continuous { low: Vec<f64>, high: Vec<f64> },
}

impl ActionSpace {
    /// Number of discrete actions, `None` for continuous spaces.
    pub fn n_actions(&self) -> Option<usize> {
        match self {
            ActionSpace::Discrete { n } => Some(*n),
            ActionSpace::Continuous { .. } => None,
        }
    }

    pub fn is_discrete(&self) -> bool {
        matches!(self, ActionSpace::Discrete { .. })
    }

    /// The action used for warm-up frames: index 0 or the zero vector.
    pub fn noop(&self) -> Action {
        match self {
            ActionSpace::Discrete { .. } => Action::Discrete(0),
            ActionSpace::Continuous { low, .. } => Action::Continuous(vec![0.0; low.len()]),
        }
    }

    /// Whether an action is a member of this space.
    pub fn contains(&self, action: &Action) -> bool {
        match (self, action) {
            (ActionSpace::Discrete { n }, Action::Discrete(index)) => index < n,
            (ActionSpace::Continuous { low, high }, Action::Continuous(values)) => {
                values.len() == low.len()
                    && values
                        .iter()
                        .zip(low.iter().zip(high))
                        .all(|(v, (lo, hi))| v >= lo && v <= hi)
            }
            _ => false,
        }
    }

    /// Check the space is usable for sampling.
    pub fn validate(&self) -> Result<(), String> {
        match self {
            ActionSpace::Discrete { n } => {
                if *n == 0 {
                    return Err("discrete action space needs at least one action".to_string());
                }
            }
            ActionSpace::Continuous { low, high } => {
                if low.is_empty() || low.len() != high.len() {
                    return Err(format!(
                        "continuous bounds must be non-empty and of equal length, got {} and {}",
                        low.len(),
                        high.len()
                    ));
                }
                for (i, (lo, hi)) in low.iter().zip(high).enumerate() {
                    if !lo.is_finite() || !hi.is_finite() || lo > hi {
                        return Err(format!("invalid bounds [{lo}, {hi}] on dimension {i}"));
                    }
                }
            }
        }
        Ok(())
    }

    /// Whether actions produced for `other` can be fed to an environment using `self`.
    pub fn is_compatible_with(&self, other: &ActionSpace) -> bool {
        match (self, other) {
            (ActionSpace::Discrete { n: a }, ActionSpace::Discrete { n: b }) => a == b,
            (
                ActionSpace::Continuous { low: a, .. },
                ActionSpace::Continuous { low: b, .. },
            ) => a.len() == b.len(),
            _ => false,
        }
    }
}

impl fmt::Display for ActionSpace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ActionSpace::Discrete { n } => write!(f, "discrete({n})"),
            ActionSpace::Continuous { low, .. } => write!(f, "continuous({})", low.len()),
        }
    }
}

/// Extra data reported by a step.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StepInfo {
    /// Overrides the raw terminal flag when set (e.g. life lost vs game over).
    pub terminal: Option<bool>,
}

/// Outcome of `Environment::step`.
#[derive(Debug, Clone, PartialEq)]
pub struct Transition<S, O> {
    pub state: S,
    pub observation: O,
    pub reward: f64,
    pub terminal: bool,
    pub info: StepInfo,
}

impl<S, O> Transition<S, O> {
    pub fn new(state: S, observation: O, reward: f64, terminal: bool) -> Self {
        Transition {
            state,
            observation,
            reward,
            terminal,
            info: StepInfo::default(),
        }
    }

    /// Attach step info to the transition.
    pub fn with_info(mut self, info: StepInfo) -> Self {
        self.info = info;
        self
    }

    /// Terminal flag after applying the info override.
    pub fn is_terminal(&self) -> bool {
        self.info.terminal.unwrap_or(self.terminal)
    }
}

/// Steppable environment the planner simulates.
///
/// Stepping is state-passing: the planner hands in the state to start from,
/// so one environment serves every walker.
pub trait Environment {
    type State: Clone;
    /// Observations double as the feature vector walkers are compared by.
    type Observation: Clone + AsRef<[f64]>;
    type Error: std::error::Error + Send + Sync + 'static;

    /// Actions accepted by `step`.
    fn action_space(&self) -> ActionSpace;

    /// Start a new episode.
    fn reset(&mut self) -> Result<(Self::State, Self::Observation), Self::Error>;

    /// Apply `action` `repeat` times starting from `state`.
    fn step(
        &mut self,
        state: &Self::State,
        action: &Action,
        repeat: u32,
    ) -> Result<Transition<Self::State, Self::Observation>, Self::Error>;

    /// Draw the last stepped state.
    fn render(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }
}
