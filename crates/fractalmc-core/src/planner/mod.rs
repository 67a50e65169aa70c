mod agent;
pub mod controller;
pub mod resources;
pub mod status;

pub use agent::EpisodeReport;

#[cfg(test)]
mod tests;
