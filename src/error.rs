use thiserror::Error;

#[derive(Error, Debug)]
pub enum PeakError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Insufficient data: need {needed} {what}, have {available}")]
    InsufficientData {
        what: &'static str,
        needed: usize,
        available: usize,
    },

    #[error("Fit did not converge after {iterations} iterations")]
    FitDidNotConverge { iterations: usize },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, PeakError>;

/// Shorthand for building an `InvalidArgument` error
pub(crate) fn invalid(message: impl Into<String>) -> PeakError {
    PeakError::InvalidArgument(message.into())
}
