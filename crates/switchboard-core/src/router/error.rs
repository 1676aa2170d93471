//! Router error types

use serde::Serialize;
use thiserror::Error;

use crate::providers::ProviderErrorKind;
use crate::types::ModelTarget;

/// One failed attempt along a fallback chain
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AttemptFailure {
    pub target: ModelTarget,
    pub kind: ProviderErrorKind,
    pub message: String,
}

/// Errors that can occur while routing or executing a completion
#[derive(Error, Debug)]
pub enum RouterError {
    /// No registered model offers the required capabilities
    #[error("No model supports: {required}")]
    NoCapableModel { required: String },

    /// The primary and every fallback failed
    #[error("All providers failed ({} attempts)", attempts.len())]
    AllProvidersExhausted { attempts: Vec<AttemptFailure> },

    /// The caller cancelled the request
    #[error("Request cancelled")]
    Cancelled,
}

impl RouterError {
    /// Failed attempts, empty for errors raised before any call
    pub fn attempts(&self) -> &[AttemptFailure] {
        match self {
            Self::AllProvidersExhausted { attempts } => attempts,
            _ => &[],
        }
    }
}

pub type RouterResult<T> = Result<T, RouterError>;
