use thiserror::Error;

use crate::tree::ids::NodeId;

/// Integrity violations of the trajectory tree.
///
/// The tree is the only source of replayable history, so none of these can be
/// recovered locally; callers are expected to propagate them.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TreeError {
    /// Attempted to append a node id that is already present.
    #[error("node {} already exists", .node_id.index())]
    DuplicateNode { node_id: NodeId },

    /// Attempted to append a node below a parent that was never recorded.
    #[error("node {} references missing parent {}", .node_id.index(), .parent_id.index())]
    DanglingParent { node_id: NodeId, parent_id: NodeId },

    /// Attempted to access a node id that does not exist in the tree.
    #[error("unknown node with id {}", .node_id.index())]
    UnknownNode { node_id: NodeId },
}
