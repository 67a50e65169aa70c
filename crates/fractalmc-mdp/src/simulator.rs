use fractalmc_core::{Action, ActionSpace, Environment, Transition};
use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::info;

use crate::{CompiledMdp, MdpError, StateKey};

#[derive(Debug, Clone)]
/// Seeded simulator over a compiled MDP.
pub struct MdpSimulator {
    mdp: CompiledMdp,
    rng: ChaCha8Rng,
    /// State reached by the latest `reset` or `step`, shown by `render`.
    current: StateKey,
}

impl MdpSimulator {
    /// Create a simulator with deterministic RNG seed.
    pub fn new(mdp: CompiledMdp, seed: u64) -> Self {
        let current = mdp.start();
        Self {
            mdp,
            rng: ChaCha8Rng::seed_from_u64(seed),
            current,
        }
    }

    /// Borrow the underlying compiled MDP.
    pub fn mdp(&self) -> &CompiledMdp {
        &self.mdp
    }

    /// Return how many actions are available for a state.
    pub fn num_actions(&self, state_key: StateKey) -> usize {
        self.mdp.num_actions(state_key).unwrap_or(0)
    }

    /// Sample one `(next_state, reward, terminal)` transition.
    /// Invalid state/action inputs are treated as a no-op terminal transition.
    pub fn sample_step(&mut self, state_key: StateKey, action_id: usize) -> (StateKey, f64, bool) {
        let sample = (self.rng.next_u64() as f64) / ((u64::MAX as f64) + 1.0);
        self.mdp
            .sample_transition(state_key, action_id, sample)
            .unwrap_or((state_key, 0.0, true))
    }

    fn observe(&self, key: StateKey) -> Result<Vec<f64>, MdpError> {
        self.mdp
            .observation(key)
            .ok_or(MdpError::UnknownStateKey { key: key.index() })
    }
}

impl Environment for MdpSimulator {
    type State = StateKey;
    type Observation = Vec<f64>;
    type Error = MdpError;

    /// One discrete action per slot of the widest state. States with fewer
    /// actions treat the extra slots as a no-op terminal transition.
    fn action_space(&self) -> ActionSpace {
        ActionSpace::Discrete {
            n: self.mdp.max_actions().max(1),
        }
    }

    fn reset(&mut self) -> Result<(StateKey, Vec<f64>), MdpError> {
        self.current = self.mdp.start();
        Ok((self.current, self.observe(self.current)?))
    }

    /// Apply `action` up to `repeat` times, stopping early at a terminal state.
    fn step(
        &mut self,
        state: &StateKey,
        action: &Action,
        repeat: u32,
    ) -> Result<Transition<StateKey, Vec<f64>>, MdpError> {
        let action_id = match action {
            Action::Discrete(index) => *index,
            Action::Continuous(values) => {
                return Err(MdpError::ContinuousAction {
                    action: values.clone(),
                });
            }
        };
        let mut key = *state;
        let mut terminal = self
            .mdp
            .is_terminal(key)
            .ok_or(MdpError::UnknownStateKey { key: key.index() })?;
        let mut reward = 0.0;

        for _ in 0..repeat {
            if terminal {
                break;
            }
            let (next, step_reward, next_terminal) = self.sample_step(key, action_id);
            key = next;
            reward += step_reward;
            terminal = next_terminal;
        }

        self.current = key;
        let observation = self.observe(key)?;
        Ok(Transition::new(key, observation, reward, terminal))
    }

    fn render(&mut self) -> Result<(), MdpError> {
        info!(
            state = self.mdp.state_id(self.current).unwrap_or("?"),
            key = self.current.index(),
            "mdp state"
        );
        Ok(())
    }
}
