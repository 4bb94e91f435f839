use serde::Serialize;
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

use crate::{render_prompt, GenerationError, GenerationProvider};

/// One generated answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnswerResult {
    /// Fresh UUID v4 per answer.
    pub id: String,
    pub text: String,
    pub model_used: String,
}

/// Turns retrieved context plus a question into an answer.
#[derive(Clone)]
pub struct Generator {
    provider: Arc<dyn GenerationProvider>,
}

impl Generator {
    pub fn new(provider: Arc<dyn GenerationProvider>) -> Self {
        Self { provider }
    }

    pub fn model_name(&self) -> &str {
        self.provider.model_name()
    }

    pub async fn generate(&self, context: &str, query: &str) -> Result<AnswerResult, GenerationError> {
        let prompt = render_prompt(context, query);
        let completion = self.provider.complete(&prompt).await?;
        let answer = AnswerResult {
            id: Uuid::new_v4().to_string(),
            text: completion.text,
            model_used: self.provider.model_name().to_string(),
        };
        info!(
            id = %answer.id,
            model = %answer.model_used,
            reported_model = completion.model.as_deref().unwrap_or("-"),
            "answer_generated"
        );
        Ok(answer)
    }
}

impl std::fmt::Debug for Generator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Generator")
            .field("model", &self.provider.model_name())
            .finish()
    }
}
