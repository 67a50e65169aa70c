use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::{ActionSpec, MdpError, MdpSpec};

/// Floating point tolerance used when validating probability sums.
pub(crate) const PROB_TOLERANCE: f64 = 1e-9;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
/// Dense index for states in a compiled MDP; this is the planner's state type.
pub struct StateKey(usize);

impl StateKey {
    /// Return the underlying state index.
    pub fn index(self) -> usize {
        self.0
    }
}

impl From<usize> for StateKey {
    fn from(value: usize) -> Self {
        Self(value)
    }
}

#[derive(Debug, Clone)]
/// Runtime form of an MDP with resolved state references and cumulative
/// outcome weights.
pub struct CompiledMdp {
    start: StateKey,
    states: Vec<CompiledState>,
    keys: HashMap<String, StateKey>,
}

#[derive(Debug, Clone)]
struct CompiledState {
    id: String,
    terminal: bool,
    observation: Vec<f64>,
    actions: Vec<CompiledAction>,
}

#[derive(Debug, Clone)]
struct CompiledAction {
    /// `(cumulative probability, next state, reward)`, cumulative ascending.
    outcomes: Vec<(f64, StateKey, f64)>,
}

impl CompiledAction {
    fn pick(&self, sample: f64) -> Option<(StateKey, f64)> {
        let chosen = self
            .outcomes
            .partition_point(|(cumulative, _, _)| *cumulative < sample)
            .min(self.outcomes.len().checked_sub(1)?);
        let (_, next, reward) = self.outcomes[chosen];
        Some((next, reward))
    }
}

impl CompiledMdp {
    /// Compile and validate a spec into a fast runtime representation.
    pub(crate) fn from_spec(spec: &MdpSpec) -> Result<Self, MdpError> {
        spec.validate_with_tolerance(PROB_TOLERANCE)?;

        let keys: HashMap<String, StateKey> = spec
            .states
            .iter()
            .enumerate()
            .map(|(index, state)| (state.id.clone(), StateKey::from(index)))
            .collect();
        let resolve = |id: &str| {
            keys.get(id).copied().ok_or_else(|| MdpError::UnknownStartState {
                start: id.to_string(),
            })
        };
        let start = resolve(&spec.start)?;

        let mut states = Vec::with_capacity(spec.states.len());
        for (index, state) in spec.states.iter().enumerate() {
            let actions = state
                .actions
                .iter()
                .map(|action| compile_action(&state.id, action, &keys))
                .collect::<Result<Vec<_>, _>>()?;
            states.push(CompiledState {
                id: state.id.clone(),
                terminal: state.terminal,
                observation: state
                    .features
                    .clone()
                    .unwrap_or_else(|| vec![index as f64]),
                actions,
            });
        }

        Ok(Self {
            start,
            states,
            keys,
        })
    }

    /// Return the start state key.
    pub fn start(&self) -> StateKey {
        self.start
    }

    /// Return the number of compiled states.
    pub fn state_count(&self) -> usize {
        self.states.len()
    }

    /// Check whether a state is terminal.
    pub fn is_terminal(&self, key: StateKey) -> Option<bool> {
        self.states.get(key.index()).map(|state| state.terminal)
    }

    /// Return the number of actions available from a state.
    pub fn num_actions(&self, key: StateKey) -> Option<usize> {
        self.states
            .get(key.index())
            .map(|state| state.actions.len())
    }

    /// Largest action count of any state; the width of the action space.
    pub fn max_actions(&self) -> usize {
        self.states
            .iter()
            .map(|state| state.actions.len())
            .max()
            .unwrap_or(0)
    }

    /// Observation vector of a state: its declared features, or its index.
    pub fn observation(&self, key: StateKey) -> Option<Vec<f64>> {
        self.states
            .get(key.index())
            .map(|state| state.observation.clone())
    }

    /// Convert a state key back to its original string id.
    pub fn state_id(&self, key: StateKey) -> Option<&str> {
        self.states.get(key.index()).map(|state| state.id.as_str())
    }

    /// Convert a string id into a compiled state key.
    pub fn state_key(&self, id: &str) -> Option<StateKey> {
        self.keys.get(id).copied()
    }

    /// Sample one transition for `(state_key, action_id)` using a uniform sample in `[0, 1)`.
    /// Terminal states absorb every action with zero reward.
    pub(crate) fn sample_transition(
        &self,
        state_key: StateKey,
        action_id: usize,
        sample: f64,
    ) -> Option<(StateKey, f64, bool)> {
        let state = self.states.get(state_key.index())?;
        if state.terminal {
            return Some((state_key, 0.0, true));
        }

        let (next, reward) = state.actions.get(action_id)?.pick(sample)?;
        let next_terminal = self.states.get(next.index())?.terminal;
        Some((next, reward, next_terminal))
    }
}

fn compile_action(
    state: &str,
    action: &ActionSpec,
    keys: &HashMap<String, StateKey>,
) -> Result<CompiledAction, MdpError> {
    let mut cumulative = 0.0_f64;
    let mut outcomes = Vec::with_capacity(action.outcomes.len());
    for outcome in &action.outcomes {
        let next = keys
            .get(&outcome.next)
            .copied()
            .ok_or_else(|| MdpError::UnknownNextState {
                state: state.to_string(),
                action: action.id.clone(),
                next: outcome.next.clone(),
            })?;
        cumulative += outcome.prob;
        outcomes.push((cumulative, next, outcome.reward));
    }
    Ok(CompiledAction { outcomes })
}
