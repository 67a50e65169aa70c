use crate::tree::ids::NodeId;

#[derive(Debug, Clone, PartialEq)]
/// One hypothetical trajectory of the population.
pub struct Walker<S, O> {
    pub(crate) state: S,
    pub(crate) observation: O,
    pub(crate) reward: f64,
    pub(crate) elapsed: u64,
    pub(crate) node: NodeId,
    pub(crate) origin: Option<NodeId>,
    pub(crate) terminal: bool,
}

impl<S, O> Walker<S, O> {
    /// Fresh walker sitting on the cycle root.
    pub(crate) fn new(state: S, observation: O, node: NodeId) -> Self {
        Walker {
            state,
            observation,
            reward: 0.0,
            elapsed: 0,
            node,
            origin: None,
            terminal: false,
        }
    }

    pub fn state(&self) -> &S {
        &self.state
    }

    pub fn observation(&self) -> &O {
        &self.observation
    }

    /// Score along this lineage.
    pub fn reward(&self) -> f64 {
        self.reward
    }

    /// Repeat-steps consumed since the cycle started.
    pub fn elapsed(&self) -> u64 {
        self.elapsed
    }

    /// Tree node holding the walker's current state.
    pub fn node(&self) -> NodeId {
        self.node
    }

    /// First-level node this lineage descends from, once fixed.
    pub fn origin(&self) -> Option<NodeId> {
        self.origin
    }

    pub fn is_terminal(&self) -> bool {
        self.terminal
    }
}
