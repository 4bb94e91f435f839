use thiserror::Error;

/// Errors surfaced by generative providers and the generator.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum GenerationError {
    #[error("invalid generation config: {0}")]
    InvalidConfig(String),
    /// Transport failure or error status from the provider.
    #[error("generation request failed: {0}")]
    Request(String),
    #[error("generation request timed out: {0}")]
    Timeout(String),
    /// The provider answered without a usable message.
    #[error("malformed generation response: {0}")]
    MalformedResponse(String),
}

impl From<reqwest::Error> for GenerationError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            GenerationError::Timeout(err.to_string())
        } else if err.is_decode() {
            GenerationError::MalformedResponse(err.to_string())
        } else {
            GenerationError::Request(err.to_string())
        }
    }
}
