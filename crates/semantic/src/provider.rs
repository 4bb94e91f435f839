use async_trait::async_trait;

use crate::SemanticError;

/// A backend that turns text into fixed-length vectors.
///
/// All vectors returned by one provider have the same length; callers probe
/// it once with [`embed`](EmbeddingProvider::embed) rather than trusting a
/// declared dimension.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Model identifier, recorded alongside a built index.
    fn model_name(&self) -> &str;

    async fn embed(&self, text: &str) -> Result<Vec<f32>, SemanticError>;

    /// Embed several inputs, preserving order.
    ///
    /// The default calls [`embed`](EmbeddingProvider::embed) once per input.
    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, SemanticError> {
        let mut out = Vec::with_capacity(texts.len());
        for text in texts {
            out.push(self.embed(text).await?);
        }
        Ok(out)
    }
}
