//! Error types for the audit engine

/// Errors raised by engine components.
///
/// Components return these through `Result`; the task dispatcher turns every
/// variant into a `{ success: false, error }` response, so none of them ever
/// crosses the engine boundary as a panic.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EngineError {
    #[error("Missing input: {0}")]
    MissingInput(String),

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Insufficient data: {0}")]
    InsufficientData(String),

    #[error("Unknown task: {0}")]
    UnknownTask(String),
}

impl EngineError {
    pub fn missing(what: impl Into<String>) -> Self {
        Self::MissingInput(what.into())
    }

    pub fn invalid(what: impl Into<String>) -> Self {
        Self::InvalidParameter(what.into())
    }

    /// Stable machine-readable code for the error category.
    pub fn code(&self) -> &'static str {
        match self {
            Self::MissingInput(_) => "MISSING_INPUT",
            Self::InvalidParameter(_) => "INVALID_PARAMETER",
            Self::InsufficientData(_) => "INSUFFICIENT_DATA",
            Self::UnknownTask(_) => "UNKNOWN_TASK",
        }
    }
}

/// Result alias used throughout the engine.
pub type EngineResult<T> = Result<T, EngineError>;
