pub mod population;
pub mod stats;
pub mod virtual_reward;
mod walker;

pub use walker::Walker;
