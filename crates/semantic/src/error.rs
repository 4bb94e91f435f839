use thiserror::Error;

/// Errors surfaced by embedding providers.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SemanticError {
    /// Configuration is inconsistent (unknown provider, missing URL, zero dimension).
    #[error("invalid semantic config: {0}")]
    InvalidConfig(String),
    /// The request could not be sent or the provider answered with an error status.
    #[error("embedding request failed: {0}")]
    Request(String),
    /// The provider did not answer within the configured timeout.
    #[error("embedding request timed out: {0}")]
    Timeout(String),
    /// The provider answered, but not with embeddings we can read.
    #[error("invalid embedding response: {0}")]
    InvalidResponse(String),
}

impl SemanticError {
    /// Transient failures worth another attempt.
    pub fn is_retryable(&self) -> bool {
        match self {
            SemanticError::Timeout(_) => true,
            SemanticError::Request(msg) => crate::retry::is_retryable_error(msg),
            SemanticError::InvalidConfig(_) | SemanticError::InvalidResponse(_) => false,
        }
    }
}

impl From<reqwest::Error> for SemanticError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            SemanticError::Timeout(err.to_string())
        } else if err.is_decode() {
            SemanticError::InvalidResponse(err.to_string())
        } else {
            SemanticError::Request(err.to_string())
        }
    }
}
