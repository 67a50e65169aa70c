use serde::Serialize;

use crate::{env::Action, tree::trajectory::TrajectoryTree};

pub const SNAPSHOT_SCHEMA_VERSION: u32 = 1;

#[derive(Debug, Clone, Serialize)]
pub struct TreeSnapshot<'a, S> {
    pub schema_version: u32,
    pub node_count: usize,
    pub nodes: Vec<NodeSnapshot<'a, S>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct NodeSnapshot<'a, S> {
    pub node_id: usize,
    pub parent_node_id: Option<usize>,
    pub depth: u64,
    pub action: &'a Action,
    pub repeat: u32,
    pub state: &'a S,
}

impl<S> TrajectoryTree<S> {
    /// Borrowing view of the tree suitable for serialization, in append order.
    pub fn snapshot(&self) -> TreeSnapshot<'_, S> {
        let nodes: Vec<NodeSnapshot<'_, S>> = self
            .nodes()
            .map(|node| NodeSnapshot {
                node_id: node.id().index(),
                parent_node_id: node.parent().map(|parent| parent.index()),
                depth: node.depth(),
                action: node.action(),
                repeat: node.repeat(),
                state: node.state(),
            })
            .collect();

        TreeSnapshot {
            schema_version: SNAPSHOT_SCHEMA_VERSION,
            node_count: nodes.len(),
            nodes,
        }
    }
}

impl<S: Serialize> TrajectoryTree<S> {
    /// Serialize the whole tree as JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(&self.snapshot())
    }
}
