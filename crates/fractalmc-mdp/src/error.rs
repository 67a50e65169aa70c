use thiserror::Error;

#[derive(Debug, Error)]
/// Error type for loading, validating, building and simulating MDPs.
pub enum MdpError {
    #[error("failed to read MDP file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse MDP YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("MDP has no start state")]
    MissingStart,

    #[error("start state '{start}' is not declared")]
    UnknownStartState { start: String },

    #[error("state '{id}' is declared twice")]
    DuplicateStateId { id: String },

    #[error("state '{state}' declares action '{action}' twice")]
    DuplicateActionId { state: String, action: String },

    #[error("terminal state '{state}' cannot declare actions")]
    TerminalStateHasActions { state: String },

    #[error("action '{action}' of state '{state}' leads to undeclared state '{next}'")]
    UnknownNextState {
        state: String,
        action: String,
        next: String,
    },

    #[error("action '{action}' of state '{state}' has no outcomes")]
    EmptyOutcomes { state: String, action: String },

    #[error(
        "outcome {outcome_index} of action '{action}' in state '{state}' has invalid probability {value}"
    )]
    InvalidProbability {
        state: String,
        action: String,
        outcome_index: usize,
        value: f64,
    },

    #[error(
        "outcome {outcome_index} of action '{action}' in state '{state}' has invalid reward {value}"
    )]
    InvalidReward {
        state: String,
        action: String,
        outcome_index: usize,
        value: f64,
    },

    #[error(
        "outcome probabilities of action '{action}' in state '{state}' sum to {sum}, not 1.0 within {tolerance}"
    )]
    ProbabilitySum {
        state: String,
        action: String,
        sum: f64,
        tolerance: f64,
    },

    #[error("state '{state}' declares no features while other states do")]
    MissingFeatures { state: String },

    #[error("state '{state}' has {actual} features, expected {expected}")]
    FeatureDimension {
        state: String,
        expected: usize,
        actual: usize,
    },

    #[error("feature {index} of state '{state}' is not finite: {value}")]
    InvalidFeature {
        state: String,
        index: usize,
        value: f64,
    },

    #[error("builder has no state '{state}'")]
    BuilderUnknownState { state: String },

    #[error("builder has no action '{action}' in state '{state}'")]
    BuilderUnknownAction { state: String, action: String },

    #[error("state key {key} is not part of the compiled MDP")]
    UnknownStateKey { key: usize },

    #[error("MDP simulator only accepts discrete actions, got {action:?}")]
    ContinuousAction { action: Vec<f64> },
}
