use std::collections::HashMap;

use crate::{
    env::Action,
    tree::{arena::Arena, error::TreeError, ids::NodeId, node::TrajectoryNode},
};

/// One step of a recovered branch, ordered root to leaf.
#[derive(Debug, Clone, PartialEq)]
pub struct BranchStep<S> {
    pub node_id: NodeId,
    pub state: S,
    pub action: Action,
    pub repeat: u32,
}

#[derive(Debug, Clone)]
/// Append-only record of every transition of an episode.
/// Owns the arena; node ids are chosen by the caller or allocated in order,
/// and nodes are never mutated or removed until `reset`.
pub struct TrajectoryTree<S> {
    arena: Arena<TrajectoryNode<S>>,
    slots: HashMap<NodeId, usize>,
    next_id: NodeId,
    /// Largest id in use.
    last_id: Option<NodeId>,
}

impl<S> Default for TrajectoryTree<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S> TrajectoryTree<S> {
    /// Create an empty tree.
    pub fn new() -> Self {
        TrajectoryTree {
            arena: Arena::new(),
            slots: HashMap::new(),
            next_id: NodeId::from(0),
            last_id: None,
        }
    }

    /// Return how many nodes exist in the tree.
    pub fn node_count(&self) -> usize {
        self.arena.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arena.is_empty()
    }

    /// Check whether a node id has been recorded.
    pub fn contains(&self, node_id: NodeId) -> bool {
        self.slots.contains_key(&node_id)
    }

    /// Return an immutable node handle.
    pub fn node(&self, node_id: NodeId) -> Result<&TrajectoryNode<S>, TreeError> {
        self.slots
            .get(&node_id)
            .and_then(|slot| self.arena.get(*slot))
            .ok_or(TreeError::UnknownNode { node_id })
    }

    /// Id of the most recently created node (the largest id in use).
    pub fn last_node(&self) -> Option<NodeId> {
        self.last_id
    }

    /// Id the next call to `append_child` will use.
    pub fn next_id(&self) -> NodeId {
        self.next_id
    }

    /// Iterate nodes in the order they were appended.
    pub fn nodes(&self) -> impl Iterator<Item = &TrajectoryNode<S>> {
        self.arena.iter()
    }

    /// Record a transition under an explicit id.
    ///
    /// `parent_id = None` starts a new root.
    pub fn append_leaf(
        &mut self,
        node_id: NodeId,
        parent_id: Option<NodeId>,
        state: S,
        action: Action,
        repeat: u32,
    ) -> Result<NodeId, TreeError> {
        if self.contains(node_id) {
            return Err(TreeError::DuplicateNode { node_id });
        }

        let depth = match parent_id {
            None => 0,
            Some(parent_id) => {
                let parent = self
                    .node(parent_id)
                    .map_err(|_| TreeError::DanglingParent { node_id, parent_id })?;
                parent.depth() + 1
            }
        };

        let slot = self.arena.allocate(TrajectoryNode::new(
            node_id, parent_id, depth, state, action, repeat,
        ));
        self.slots.insert(node_id, slot);
        if node_id >= self.next_id {
            self.next_id = node_id.next();
            self.last_id = Some(node_id);
        }

        Ok(node_id)
    }

    /// Record a transition under the next free id.
    pub fn append_child(
        &mut self,
        parent_id: Option<NodeId>,
        state: S,
        action: Action,
        repeat: u32,
    ) -> Result<NodeId, TreeError> {
        self.append_leaf(self.next_id, parent_id, state, action, repeat)
    }

    /// Ids from `node_id` back to its root, leaf first.
    pub fn ancestry(&self, node_id: NodeId) -> Result<Vec<NodeId>, TreeError> {
        let mut path = Vec::new();
        let mut current = Some(node_id);

        while let Some(id) = current {
            let node = self.node(id)?;
            path.push(id);
            current = node.parent();
        }

        Ok(path)
    }

    /// Drop every node. Called once per episode.
    pub fn reset(&mut self) {
        self.arena.clear();
        self.slots.clear();
        self.next_id = NodeId::from(0);
        self.last_id = None;
    }
}

impl<S: Clone> TrajectoryTree<S> {
    /// Recover the `(state, action, repeat)` sequence from the root down to `node_id`.
    pub fn get_branch(&self, node_id: NodeId) -> Result<Vec<BranchStep<S>>, TreeError> {
        let mut branch = Vec::new();
        for id in self.ancestry(node_id)?.into_iter().rev() {
            let node = self.node(id)?;
            branch.push(BranchStep {
                node_id: id,
                state: node.state().clone(),
                action: node.action().clone(),
                repeat: node.repeat(),
            });
        }
        Ok(branch)
    }
}
