use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::retry::RetryConfig;
use crate::SemanticError;

/// Which wire format the embedding backend speaks.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    /// `POST {base}/api/embed` with `{model, input}`.
    #[default]
    Ollama,
    /// `POST {base}/v1/embeddings` with `{model, input}`.
    OpenAI,
    /// `POST {url}` with `{text}` or `{texts}`.
    Custom,
    /// Deterministic local vectors, no network.
    Stub,
}

impl FromStr for ProviderKind {
    type Err = SemanticError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ollama" => Ok(ProviderKind::Ollama),
            "openai" | "gpt" => Ok(ProviderKind::OpenAI),
            "custom" => Ok(ProviderKind::Custom),
            "stub" | "fast" => Ok(ProviderKind::Stub),
            other => Err(SemanticError::InvalidConfig(format!(
                "unknown embedding provider `{other}`"
            ))),
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ProviderKind::Ollama => "ollama",
            ProviderKind::OpenAI => "openai",
            ProviderKind::Custom => "custom",
            ProviderKind::Stub => "stub",
        })
    }
}

/// Runtime configuration for an embedding provider.
///
/// # Example
/// ```
/// use semantic::{ProviderKind, SemanticConfig};
///
/// let cfg = SemanticConfig {
///     provider: ProviderKind::Ollama,
///     model_name: "granite-embedding:30m".into(),
///     api_url: Some("http://localhost:11434".into()),
///     ..Default::default()
/// };
/// assert!(cfg.validate().is_ok());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SemanticConfig {
    pub provider: ProviderKind,
    /// Model identifier sent to the backend and recorded next to the index.
    pub model_name: String,
    /// Base URL (Ollama, OpenAI) or full endpoint (custom).
    pub api_url: Option<String>,
    /// Sent verbatim as the `Authorization` header (e.g. `"Bearer sk-..."`).
    pub api_auth_header: Option<String>,
    /// Per-request timeout in seconds.
    pub api_timeout_secs: u64,
    /// Scale vectors to unit length. Off by default: the index ranks by raw Euclidean distance.
    pub normalize: bool,
    /// Vector length produced by the stub provider.
    pub stub_dimension: usize,
    pub retry: RetryConfig,
}

impl Default for SemanticConfig {
    fn default() -> Self {
        Self {
            provider: ProviderKind::Ollama,
            model_name: "granite-embedding:30m".into(),
            api_url: Some("http://localhost:11434".into()),
            api_auth_header: None,
            api_timeout_secs: 60,
            normalize: false,
            stub_dimension: 384,
            retry: RetryConfig::disabled(),
        }
    }
}

impl SemanticConfig {
    pub fn validate(&self) -> Result<(), SemanticError> {
        if self.model_name.trim().is_empty() {
            return Err(SemanticError::InvalidConfig(
                "model_name must not be empty".into(),
            ));
        }
        match self.provider {
            ProviderKind::Stub => {
                if self.stub_dimension == 0 {
                    return Err(SemanticError::InvalidConfig(
                        "stub_dimension must be at least 1".into(),
                    ));
                }
            }
            _ => {
                if self.api_url.as_deref().map_or(true, |u| u.trim().is_empty()) {
                    return Err(SemanticError::InvalidConfig(format!(
                        "api_url is required for the {} provider",
                        self.provider
                    )));
                }
                if self.api_timeout_secs == 0 {
                    return Err(SemanticError::InvalidConfig(
                        "api_timeout_secs must be at least 1".into(),
                    ));
                }
            }
        }
        Ok(())
    }
}
