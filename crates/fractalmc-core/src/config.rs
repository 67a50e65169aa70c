use std::{fs, path::Path};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    model::RepeatSampler,
    swarm::population::{PopulationSettings, RewardMode},
};

const DEFAULT_PLANNER_CONFIG_YAML: &str = include_str!("../config/planner.default.yaml");

/// Planner configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlannerConfig {
    /// Population cap; also the starting population size.
    pub n_walkers: usize,
    /// Starting exploration/exploitation exponent.
    pub balance: f64,
    /// Reward ceiling for a cycle (best walker) and for the episode.
    pub reward_limit: Option<f64>,
    /// Sample ceiling for a whole episode.
    pub samples_limit: Option<usize>,
    /// Render the environment every this many evolution iterations.
    pub render_every: Option<usize>,
    pub reward_mode: RewardMode,
    /// Mean repeat-count; `None` always uses `min_dt`.
    pub dt_mean: Option<f64>,
    pub dt_std: Option<f64>,
    pub min_dt: u32,
    /// Track the best walker seen during a cycle.
    pub keep_best: bool,
    /// Terminal walkers that reach `reward_limit` won instead of dying.
    pub can_win: bool,
    /// No-op steps taken at the start of an episode.
    pub skip_initial_frames: usize,
    /// Upper bound for the per-cycle sampling budget.
    pub max_samples_step: Option<usize>,
    /// Mean trajectory depth the adaptive controller aims for.
    pub time_horizon: usize,
    /// Smallest depth per walker the sampling budget must allow.
    pub min_horizon: usize,
    /// Re-tune population size and budget after every decision.
    pub update_parameters: bool,
    pub seed: u64,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        PlannerConfig {
            n_walkers: 100,
            balance: 1.0,
            reward_limit: None,
            samples_limit: None,
            render_every: None,
            reward_mode: RewardMode::Accumulate,
            dt_mean: None,
            dt_std: None,
            min_dt: 1,
            keep_best: false,
            can_win: false,
            skip_initial_frames: 0,
            max_samples_step: None,
            time_horizon: 40,
            min_horizon: 1,
            update_parameters: false,
            seed: 12345,
        }
    }
}

impl PlannerConfig {
    /// Parse a planner config from YAML text.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        let config: PlannerConfig = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse a planner config from a YAML file path.
    pub fn from_yaml_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let yaml = fs::read_to_string(path)?;
        Self::from_yaml_str(&yaml)
    }

    /// Return the default YAML config included with this crate.
    pub fn default_yaml() -> &'static str {
        DEFAULT_PLANNER_CONFIG_YAML
    }

    /// Parse the default YAML config included with this crate.
    pub fn from_default_yaml() -> Result<Self, ConfigError> {
        Self::from_yaml_str(Self::default_yaml())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.n_walkers < 2 {
            return Err(ConfigError::Invalid(
                "n_walkers must be at least 2".to_string(),
            ));
        }
        if !self.balance.is_finite() || self.balance < 0.0 {
            return Err(ConfigError::Invalid(
                "balance must be finite and >= 0".to_string(),
            ));
        }
        if matches!(self.reward_limit, Some(limit) if limit.is_nan()) {
            return Err(ConfigError::Invalid(
                "reward_limit must not be NaN".to_string(),
            ));
        }
        if self.render_every == Some(0) {
            return Err(ConfigError::Invalid(
                "render_every must be greater than 0".to_string(),
            ));
        }
        if self.min_dt == 0 {
            return Err(ConfigError::Invalid(
                "min_dt must be greater than 0".to_string(),
            ));
        }
        if matches!(self.dt_mean, Some(mean) if !mean.is_finite()) {
            return Err(ConfigError::Invalid("dt_mean must be finite".to_string()));
        }
        if matches!(self.dt_std, Some(std) if !std.is_finite() || std < 0.0) {
            return Err(ConfigError::Invalid(
                "dt_std must be finite and >= 0".to_string(),
            ));
        }
        if matches!(self.max_samples_step, Some(cap) if cap < 2) {
            return Err(ConfigError::Invalid(
                "max_samples_step must be at least 2".to_string(),
            ));
        }
        if self.time_horizon == 0 {
            return Err(ConfigError::Invalid(
                "time_horizon must be greater than 0".to_string(),
            ));
        }
        if self.min_horizon == 0 {
            return Err(ConfigError::Invalid(
                "min_horizon must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }

    /// Repeat-count sampler described by `dt_mean`, `dt_std` and `min_dt`.
    pub fn repeat_sampler(&self) -> Result<RepeatSampler, ConfigError> {
        match self.dt_mean {
            None => Ok(RepeatSampler::fixed(self.min_dt)),
            Some(mean) => RepeatSampler::normal(mean, self.dt_std.unwrap_or(0.0), self.min_dt)
                .ok_or_else(|| {
                    ConfigError::Invalid(format!(
                        "cannot sample repeat counts from mean {mean} and std {:?}",
                        self.dt_std
                    ))
                }),
        }
    }

    pub(crate) fn population_settings(&self) -> Result<PopulationSettings, ConfigError> {
        Ok(PopulationSettings {
            reward_mode: self.reward_mode,
            repeat: self.repeat_sampler()?,
            win_threshold: if self.can_win { self.reward_limit } else { None },
        })
    }
}

/// Error type for loading and validating `PlannerConfig`.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("invalid planner config: {0}")]
    Invalid(String),
}
