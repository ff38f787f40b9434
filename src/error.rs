//! Error type shared by the optimizer.

/// Errors raised by genetic operators, configuration and evaluation.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("IndexOutOfBounds: gene index out of bound. index={index}, length={length}")]
    GeneIndexOutOfBounds { index: usize, length: usize },
    #[error("IndexOutOfBounds: individual index out of bound. index={index}, length={length}")]
    IndividualIndexOutOfBounds { index: usize, length: usize },
    #[error("UnevaluatedFitness: individuals must be evaluated before they are compared")]
    UnevaluatedFitness,
    #[error("ChromosomeLengthMismatch: expected={expected}, actual={actual}")]
    ChromosomeLengthMismatch { expected: usize, actual: usize },
    #[error("InvalidParameters: {0}")]
    InvalidParameters(String),
    #[error("EvaluationError: {0}")]
    Evaluation(#[from] anyhow::Error),
    #[error("ConfigError: {0}")]
    Config(#[from] serde_json::Error),
}

impl Error {
    pub(crate) fn out_of_bounds(index: usize, length: usize) -> Self {
        Self::GeneIndexOutOfBounds { index, length }
    }

    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidParameters(message.into())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
