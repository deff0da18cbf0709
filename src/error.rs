//! Error handling for rendafixa
//!
//! Domain failures are typed with thiserror so callers can tell a rejected
//! input apart from plumbing failures; everything else flows through anyhow
//! with context chaining.

use thiserror::Error;

/// Core error types for simulation and rate retrieval
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SimulatorError {
    #[error("invalid input: {field}: {reason}")]
    InvalidInput { field: &'static str, reason: String },

    #[error("rate fetch failed: {0}")]
    RateFetch(String),

    #[error("config error: {0}")]
    Config(String),
}

impl SimulatorError {
    pub fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        SimulatorError::InvalidInput {
            field,
            reason: reason.into(),
        }
    }

    pub fn is_invalid_input(&self) -> bool {
        matches!(self, SimulatorError::InvalidInput { .. })
    }
}

/// Result type alias for fallible plumbing (HTTP, config, parsing)
pub type Result<T> = anyhow::Result<T>;
