use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::{CompiledMdp, MdpError, compiled::PROB_TOLERANCE};

#[derive(Debug, Clone, Serialize, Deserialize)]
/// Serializable MDP schema used for YAML IO and validation.
pub struct MdpSpec {
    /// Schema version for future compatibility checks.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<u32>,
    /// String id of the start state.
    pub start: String,
    pub states: Vec<StateSpec>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
/// A single state declaration in the MDP schema.
pub struct StateSpec {
    pub id: String,
    #[serde(default, skip_serializing_if = "is_false")]
    pub terminal: bool,
    /// Observation the planner sees in this state. When any state declares
    /// features, every state must, all with the same length.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub features: Option<Vec<f64>>,
    /// Actions in declaration order; the position is the discrete action index.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub actions: Vec<ActionSpec>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
/// A named action and its stochastic outcomes.
pub struct ActionSpec {
    pub id: String,
    pub outcomes: Vec<OutcomeSpec>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
/// One probabilistic transition for an action.
pub struct OutcomeSpec {
    pub next: String,
    pub prob: f64,
    pub reward: f64,
}

fn is_false(value: &bool) -> bool {
    !*value
}

impl StateSpec {
    /// Non-terminal state without actions or features.
    pub fn new(id: impl Into<String>) -> Self {
        StateSpec {
            id: id.into(),
            terminal: false,
            features: None,
            actions: Vec::new(),
        }
    }
}

impl MdpSpec {
    /// Validate schema invariants using the crate default tolerance.
    pub fn validate(&self) -> Result<(), MdpError> {
        self.validate_with_tolerance(PROB_TOLERANCE)
    }

    /// Validate ids, transitions, features and probability constraints.
    pub fn validate_with_tolerance(&self, tolerance: f64) -> Result<(), MdpError> {
        if self.start.trim().is_empty() {
            return Err(MdpError::MissingStart);
        }

        let mut known = HashSet::with_capacity(self.states.len());
        for state in &self.states {
            if !known.insert(state.id.as_str()) {
                return Err(MdpError::DuplicateStateId {
                    id: state.id.clone(),
                });
            }
        }
        if !known.contains(self.start.as_str()) {
            return Err(MdpError::UnknownStartState {
                start: self.start.clone(),
            });
        }

        self.validate_features()?;
        for state in &self.states {
            validate_state(state, &known, tolerance)?;
        }
        Ok(())
    }

    /// Feature vectors are all-or-nothing, equally sized and finite.
    fn validate_features(&self) -> Result<(), MdpError> {
        let Some(dims) = self
            .states
            .iter()
            .find_map(|state| state.features.as_ref().map(Vec::len))
        else {
            return Ok(());
        };

        for state in &self.states {
            let features = state
                .features
                .as_ref()
                .ok_or_else(|| MdpError::MissingFeatures {
                    state: state.id.clone(),
                })?;

            if features.len() != dims {
                return Err(MdpError::FeatureDimension {
                    state: state.id.clone(),
                    expected: dims,
                    actual: features.len(),
                });
            }

            if let Some((index, value)) = features
                .iter()
                .copied()
                .enumerate()
                .find(|(_, v)| !v.is_finite())
            {
                return Err(MdpError::InvalidFeature {
                    state: state.id.clone(),
                    index,
                    value,
                });
            }
        }

        Ok(())
    }

    /// Compile this spec into the runtime representation.
    pub fn compile(&self) -> Result<CompiledMdp, MdpError> {
        CompiledMdp::from_spec(self)
    }
}

fn validate_state(
    state: &StateSpec,
    known: &HashSet<&str>,
    tolerance: f64,
) -> Result<(), MdpError> {
    if state.terminal && !state.actions.is_empty() {
        return Err(MdpError::TerminalStateHasActions {
            state: state.id.clone(),
        });
    }

    let mut action_ids = HashSet::with_capacity(state.actions.len());
    for action in &state.actions {
        if !action_ids.insert(action.id.as_str()) {
            return Err(MdpError::DuplicateActionId {
                state: state.id.clone(),
                action: action.id.clone(),
            });
        }
        validate_action(&state.id, action, known, tolerance)?;
    }
    Ok(())
}

fn validate_action(
    state: &str,
    action: &ActionSpec,
    known: &HashSet<&str>,
    tolerance: f64,
) -> Result<(), MdpError> {
    if action.outcomes.is_empty() {
        return Err(MdpError::EmptyOutcomes {
            state: state.to_string(),
            action: action.id.clone(),
        });
    }

    let mut sum = 0.0_f64;
    for (outcome_index, outcome) in action.outcomes.iter().enumerate() {
        if !outcome.prob.is_finite() || outcome.prob < 0.0 {
            return Err(MdpError::InvalidProbability {
                state: state.to_string(),
                action: action.id.clone(),
                outcome_index,
                value: outcome.prob,
            });
        }
        if !outcome.reward.is_finite() {
            return Err(MdpError::InvalidReward {
                state: state.to_string(),
                action: action.id.clone(),
                outcome_index,
                value: outcome.reward,
            });
        }
        if !known.contains(outcome.next.as_str()) {
            return Err(MdpError::UnknownNextState {
                state: state.to_string(),
                action: action.id.clone(),
                next: outcome.next.clone(),
            });
        }
        sum += outcome.prob;
    }

    if (sum - 1.0).abs() > tolerance {
        return Err(MdpError::ProbabilitySum {
            state: state.to_string(),
            action: action.id.clone(),
            sum,
            tolerance,
        });
    }
    Ok(())
}
