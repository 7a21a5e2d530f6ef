use std::fmt;
use thiserror::Error;

// Errors raised by the evaluator
#[derive(Debug, Error)]
pub enum ConditionError {
    // Bad shape of the condition list, raised while constructing
    #[error("{0}")]
    InvalidArgument(String),

    // A predicate check failed while evaluating
    #[error("Error evaluating condition '{name}': {source}")]
    Evaluation {
        name: String,
        #[source]
        source: PredicateError,
    },
}

/// Failure reported by a predicate check.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct PredicateError {
    message: String,
}

impl PredicateError {
    pub fn new(message: impl fmt::Display) -> Self {
        Self { message: message.to_string() }
    }

    /// Wrap any error, keeping only its message.
    pub fn from_error<E: std::error::Error>(err: E) -> Self {
        Self::new(err)
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<&str> for PredicateError {
    fn from(msg: &str) -> Self {
        Self::new(msg)
    }
}

impl From<String> for PredicateError {
    fn from(message: String) -> Self {
        Self { message }
    }
}

// Type alias for results that use `ConditionError` as the error type
pub type Result<T> = std::result::Result<T, ConditionError>;
