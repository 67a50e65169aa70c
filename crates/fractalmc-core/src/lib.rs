mod config;
mod env;
mod error;
mod model;
mod planner;
mod swarm;
mod tree;

pub use config::{ConfigError, PlannerConfig};
pub use env::{Action, ActionSpace, Environment, StepInfo, Transition};
pub use error::PlanError;
pub use model::{Model, RandomModel, RepeatSampler};
pub use planner::EpisodeReport;
pub use planner::controller::{ActionDistribution, BestWalker, FractalMc, plurality};
pub use planner::resources::{Adjustment, ResourceLimits, Resources};
pub use planner::status::{CycleReport, CycleStatus};
pub use swarm::Walker;
pub use swarm::population::{ClonePlan, PopulationSettings, RewardMode, WalkerPopulation};
pub use swarm::stats::CycleStats;
pub use swarm::virtual_reward::{clone_probability, distance, relativize, virtual_rewards};
pub use tree::TrajectoryNode;
pub use tree::error::TreeError;
pub use tree::ids::NodeId;
pub use tree::snapshot::{NodeSnapshot, TreeSnapshot};
pub use tree::trajectory::{BranchStep, TrajectoryTree};

#[cfg(test)]
mod test_support;
