use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::GenerationError;

/// Chat wire format spoken by the generation backend.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatProviderKind {
    /// `POST {base}/api/chat` with `stream: false`.
    #[default]
    Ollama,
    /// `POST {base}/v1/chat/completions`.
    OpenAI,
}

impl FromStr for ChatProviderKind {
    type Err = GenerationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ollama" => Ok(ChatProviderKind::Ollama),
            "openai" | "gpt" => Ok(ChatProviderKind::OpenAI),
            other => Err(GenerationError::InvalidConfig(format!(
                "unknown generation provider `{other}`"
            ))),
        }
    }
}

impl fmt::Display for ChatProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ChatProviderKind::Ollama => "ollama",
            ChatProviderKind::OpenAI => "openai",
        })
    }
}

/// Runtime configuration for the chat model.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct GenerationConfig {
    pub provider: ChatProviderKind,
    pub model_name: String,
    pub api_url: String,
    /// Sent verbatim as the `Authorization` header.
    pub api_auth_header: Option<String>,
    pub api_timeout_secs: u64,
    pub temperature: f32,
    /// Upper bound on generated tokens (`num_predict` for Ollama).
    pub max_tokens: u32,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            provider: ChatProviderKind::Ollama,
            model_name: "gemma3:4b".into(),
            api_url: "http://localhost:11434".into(),
            api_auth_header: None,
            api_timeout_secs: 60,
            temperature: 0.5,
            max_tokens: 300,
        }
    }
}

impl GenerationConfig {
    pub fn validate(&self) -> Result<(), GenerationError> {
        if self.model_name.trim().is_empty() {
            return Err(GenerationError::InvalidConfig(
                "model_name must not be empty".into(),
            ));
        }
        if self.api_url.trim().is_empty() {
            return Err(GenerationError::InvalidConfig(
                "api_url must not be empty".into(),
            ));
        }
        if !(0.0..=2.0).contains(&self.temperature) {
            return Err(GenerationError::InvalidConfig(format!(
                "temperature must be within [0, 2], got {}",
                self.temperature
            )));
        }
        if self.max_tokens == 0 {
            return Err(GenerationError::InvalidConfig(
                "max_tokens must be at least 1".into(),
            ));
        }
        if self.api_timeout_secs == 0 {
            return Err(GenerationError::InvalidConfig(
                "api_timeout_secs must be at least 1".into(),
            ));
        }
        Ok(())
    }
}
