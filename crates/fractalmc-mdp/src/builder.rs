use crate::{ActionSpec, CompiledMdp, MdpError, MdpSpec, OutcomeSpec, StateSpec};

#[derive(Debug, Clone, Default)]
/// Incremental construction of an `MdpSpec` from code.
pub struct MdpBuilder {
    start: Option<String>,
    states: Vec<StateSpec>,
}

impl MdpBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_start(&mut self, state: impl Into<String>) -> &mut Self {
        self.start = Some(state.into());
        self
    }

    /// Declare a state; `terminal` states absorb every action.
    pub fn add_state(&mut self, id: impl Into<String>, terminal: bool) -> &mut Self {
        self.states.push(StateSpec {
            terminal,
            ..StateSpec::new(id)
        });
        self
    }

    /// Attach the observation features of a declared state.
    pub fn set_features(
        &mut self,
        state_id: impl AsRef<str>,
        features: Vec<f64>,
    ) -> Result<&mut Self, MdpError> {
        self.state_mut(state_id.as_ref())?.features = Some(features);
        Ok(self)
    }

    /// Append an action to a state; its index is the number of actions before it.
    pub fn add_action(
        &mut self,
        state_id: impl AsRef<str>,
        action_id: impl Into<String>,
    ) -> Result<&mut Self, MdpError> {
        self.state_mut(state_id.as_ref())?.actions.push(ActionSpec {
            id: action_id.into(),
            outcomes: Vec::new(),
        });
        Ok(self)
    }

    /// Add one stochastic outcome to a declared action.
    pub fn add_outcome(
        &mut self,
        state_id: impl AsRef<str>,
        action_id: impl AsRef<str>,
        next: impl Into<String>,
        prob: f64,
        reward: f64,
    ) -> Result<&mut Self, MdpError> {
        let state_id = state_id.as_ref();
        let action_id = action_id.as_ref();
        let action = self
            .state_mut(state_id)?
            .actions
            .iter_mut()
            .find(|action| action.id == action_id)
            .ok_or_else(|| MdpError::BuilderUnknownAction {
                state: state_id.to_string(),
                action: action_id.to_string(),
            })?;

        action.outcomes.push(OutcomeSpec {
            next: next.into(),
            prob,
            reward,
        });
        Ok(self)
    }

    /// Finish and validate the spec.
    pub fn build_spec(self) -> Result<MdpSpec, MdpError> {
        let spec = MdpSpec {
            version: Some(1),
            start: self.start.ok_or(MdpError::MissingStart)?,
            states: self.states,
        };
        spec.validate()?;
        Ok(spec)
    }

    pub fn compile(self) -> Result<CompiledMdp, MdpError> {
        self.build_spec()?.compile()
    }

    fn state_mut(&mut self, state_id: &str) -> Result<&mut StateSpec, MdpError> {
        self.states
            .iter_mut()
            .find(|state| state.id == state_id)
            .ok_or_else(|| MdpError::BuilderUnknownState {
                state: state_id.to_string(),
            })
    }
}
