use serde::{Deserialize, Serialize};

/// A wraper for the integer id used to address nodes of the trajectory tree
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(usize);

impl NodeId {
    /// Get the value of the actual node without having to access and risk overiding the internal value
    pub fn index(&self) -> usize {
        self.0
    }

    /// Id that directly follows this one.
    pub(crate) fn next(&self) -> NodeId {
        NodeId(self.0 + 1)
    }
}

impl From<usize> for NodeId {
    /// Allow for explicit conversion from usize to NodeId
    fn from(value: usize) -> Self {
        NodeId(value)
    }
}
