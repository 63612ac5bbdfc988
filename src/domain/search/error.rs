//! Search-specific errors

use thiserror::Error;

use crate::domain::rate_limit::RateLimitDecision;
use crate::domain::DomainError;

/// Failures surfaced by a resolve call
///
/// Store failures never appear here: caches degrade to misses and the
/// limiter fails open.
#[derive(Debug, Error)]
pub enum SearchError {
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Rate limit exceeded: {}", .0.reason)]
    RateLimited(RateLimitDecision),

    #[error("Upstream provider error: {provider} - {message}")]
    Upstream { provider: String, message: String },

    #[error("Internal error: {0}")]
    Internal(String),
}

impl SearchError {
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::InvalidRequest(message.into())
    }

    pub fn upstream(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Upstream {
            provider: provider.into(),
            message: message.into(),
        }
    }
}

impl From<DomainError> for SearchError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::Validation { message } => Self::InvalidRequest(message),
            DomainError::Provider { provider, message } => Self::Upstream { provider, message },
            other => Self::Internal(other.to_string()),
        }
    }
}
