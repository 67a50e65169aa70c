use thiserror::Error;

use crate::{config::ConfigError, tree::error::TreeError};

type BoxedError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Error type for planning cycles and episodes.
#[derive(Debug, Error)]
pub enum PlanError {
    #[error("invalid state: {0}")]
    InvalidState(String),

    #[error(transparent)]
    Tree(#[from] TreeError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("environment failure: {0}")]
    Environment(#[source] BoxedError),

    #[error("model failure: {0}")]
    Model(#[source] BoxedError),

    #[error("model returned {actual} actions for {expected} walkers")]
    ModelOutput { expected: usize, actual: usize },

    #[error("invalid action space: {0}")]
    ActionSpace(String),

    #[error("model action space {model} does not match environment action space {env}")]
    ActionSpaceMismatch { env: String, model: String },

    #[error("no walker carries an origin action; run a planning cycle first")]
    EmptyPlan,
}
