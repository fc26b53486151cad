//! Error taxonomy for the route learner.

use thiserror::Error;

/// Errors raised while loading instances, training the policy or scoring routes.
#[derive(Debug, Error)]
pub enum SolverError {
    /// A decision was requested before `receive_instance` was called.
    #[error("no instance loaded, call receive_instance first")]
    NoInstanceLoaded,

    /// A REINFORCE loss was requested with no recorded log-probabilities.
    #[error("no log-probabilities recorded for the current trajectory")]
    EmptyTrajectory,

    /// A table does not match the declared port/good counts.
    #[error("dimension mismatch for {field}: expected {expected}, found {found}")]
    DimensionMismatch {
        field: String,
        expected: usize,
        found: usize,
    },

    #[error("invalid instance: {0}")]
    InvalidInstance(String),

    #[error("invalid solver configuration: {0}")]
    InvalidConfig(String),

    #[error("evaluator {0} is not available in this build")]
    UnsupportedEvaluator(String),

    #[error("checkpoint error: {0}")]
    Checkpoint(String),

    #[error("tensor error: {0}")]
    Tensor(String),

    #[error("sampling error: {0}")]
    Sampling(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Csv(#[from] csv::Error),
}

impl SolverError {
    pub(crate) fn mismatch(field: impl Into<String>, expected: usize, found: usize) -> Self {
        SolverError::DimensionMismatch {
            field: field.into(),
            expected,
            found,
        }
    }
}

pub type Result<T> = std::result::Result<T, SolverError>;
