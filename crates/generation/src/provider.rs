use async_trait::async_trait;

use crate::GenerationError;

/// Text returned by a chat model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Completion {
    pub text: String,
    /// Model name as reported by the provider, when it reports one.
    pub model: Option<String>,
}

/// A chat model that completes a single user prompt.
#[async_trait]
pub trait GenerationProvider: Send + Sync {
    /// Configured model identifier.
    fn model_name(&self) -> &str;

    async fn complete(&self, prompt: &str) -> Result<Completion, GenerationError>;
}
