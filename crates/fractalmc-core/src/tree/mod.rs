mod arena;
pub mod error;
pub mod ids;
mod node;
pub mod snapshot;
pub mod trajectory;

pub use node::TrajectoryNode;
