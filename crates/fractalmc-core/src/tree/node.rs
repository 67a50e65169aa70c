use crate::{env::Action, tree::ids::NodeId};

#[derive(Debug, Clone)]
/// One recorded transition: the state reached by applying `action`
/// `repeat` times from the parent's state.
pub struct TrajectoryNode<S> {
    id: NodeId,
    parent: Option<NodeId>,
    depth: u64,
    state: S,
    action: Action,
    repeat: u32,
}

impl<S> TrajectoryNode<S> {
    /// Create a new node instance
    pub(crate) fn new(
        id: NodeId,
        parent: Option<NodeId>,
        depth: u64,
        state: S,
        action: Action,
        repeat: u32,
    ) -> Self {
        TrajectoryNode {
            id,
            parent,
            depth,
            state,
            action,
            repeat,
        }
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    /// Return the parent of a given node, `None` for roots
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Number of transitions between this node and its root
    pub fn depth(&self) -> u64 {
        self.depth
    }

    pub fn state(&self) -> &S {
        &self.state
    }

    /// Action that produced this node
    pub fn action(&self) -> &Action {
        &self.action
    }

    /// How many times the action was repeated
    pub fn repeat(&self) -> u32 {
        self.repeat
    }

    /// Check function to see if a node starts a branch
    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }
}
