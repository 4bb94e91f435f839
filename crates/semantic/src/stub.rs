use async_trait::async_trait;
use fxhash::hash64;

use crate::normalize::l2_normalize_in_place;
use crate::{EmbeddingProvider, SemanticError};

/// Deterministic offline embedder.
///
/// Values are sinusoids of a hash of the input, so equal texts always map to
/// equal vectors. Useful for wiring tests and dry runs without a model server.
#[derive(Debug, Clone)]
pub struct StubEmbedder {
    model_name: String,
    dimension: usize,
    normalize: bool,
}

impl StubEmbedder {
    pub fn new(model_name: impl Into<String>, dimension: usize) -> Self {
        Self {
            model_name: model_name.into(),
            dimension,
            normalize: false,
        }
    }

    pub fn normalized(mut self, normalize: bool) -> Self {
        self.normalize = normalize;
        self
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }
}

/// Hash-derived vector of length `dim` for `text`.
pub fn make_stub_vector(text: &str, dim: usize) -> Vec<f32> {
    let h = hash64(text.as_bytes());
    (0..dim)
        .map(|idx| ((h >> (idx % 32)) as f32 * 0.0001).sin())
        .collect()
}

#[async_trait]
impl EmbeddingProvider for StubEmbedder {
    fn model_name(&self) -> &str {
        &self.model_name
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>, SemanticError> {
        let mut v = make_stub_vector(text, self.dimension);
        if self.normalize {
            l2_normalize_in_place(&mut v);
        }
        Ok(v)
    }
}
