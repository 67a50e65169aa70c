use std::fmt;

use crate::{swarm::stats::CycleStats, tree::ids::NodeId};

/// Why a planning cycle is (or is not yet) over. Diagnostic only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleStatus {
    Playing,
    /// Samples consumed reached the cycle budget.
    SampleLimit,
    /// A walker reached the reward ceiling.
    ScoreLimit,
    /// Every walker is terminal.
    Extinct,
}

impl CycleStatus {
    pub fn is_stopped(&self) -> bool {
        !matches!(self, CycleStatus::Playing)
    }

    pub fn message(&self) -> &'static str {
        match self {
            CycleStatus::Playing => "Playing...",
            CycleStatus::SampleLimit => "Sample limit reached.",
            CycleStatus::ScoreLimit => "Score limit reached.",
            CycleStatus::Extinct => "All the walkers died.",
        }
    }
}

impl fmt::Display for CycleStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

/// Outcome of one planning cycle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CycleReport {
    /// Tree node of the real state the cycle planned from.
    pub root: NodeId,
    pub status: CycleStatus,
    pub stats: CycleStats,
}
