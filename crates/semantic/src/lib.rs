//! Embedding providers for the IPL stats RAG service.
//!
//! Everything that needs vectors (the index builder and the retriever) talks
//! to an [`EmbeddingProvider`]. Two implementations ship here:
//!
//! - [`ApiEmbedder`] - HTTP client for Ollama (`/api/embed`), OpenAI-compatible
//!   (`/v1/embeddings`) or a custom endpoint. Responses are parsed leniently
//!   across those shapes, requests carry a timeout, and transient failures can
//!   be retried with exponential backoff.
//! - [`StubEmbedder`] - deterministic hash-derived vectors for offline runs.
//!
//! Pick one from configuration with [`build_embedder`]:
//!
//! ```
//! use semantic::{build_embedder, ProviderKind, SemanticConfig};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let cfg = SemanticConfig {
//!     provider: ProviderKind::Stub,
//!     model_name: "stub-embed".into(),
//!     stub_dimension: 8,
//!     ..Default::default()
//! };
//! let embedder = build_embedder(&cfg).unwrap();
//! let v = embedder.embed("Hello World!").await.unwrap();
//! assert_eq!(v.len(), 8);
//! # }
//! ```

use std::sync::Arc;

use tracing::info;

mod api;
mod config;
mod error;
mod normalize;
mod provider;
pub mod retry;
mod stub;

pub use crate::api::ApiEmbedder;
pub use crate::config::{ProviderKind, SemanticConfig};
pub use crate::error::SemanticError;
pub use crate::normalize::l2_normalize_in_place;
pub use crate::provider::EmbeddingProvider;
pub use crate::retry::RetryConfig;
pub use crate::stub::{make_stub_vector, StubEmbedder};

/// Construct the provider selected by `cfg.provider`.
pub fn build_embedder(cfg: &SemanticConfig) -> Result<Arc<dyn EmbeddingProvider>, SemanticError> {
    cfg.validate()?;
    let provider: Arc<dyn EmbeddingProvider> = match cfg.provider {
        ProviderKind::Stub => Arc::new(
            StubEmbedder::new(cfg.model_name.clone(), cfg.stub_dimension).normalized(cfg.normalize),
        ),
        _ => Arc::new(ApiEmbedder::new(cfg.clone())?),
    };
    info!(
        provider = %cfg.provider,
        model = %cfg.model_name,
        "embedding_provider_ready"
    );
    Ok(provider)
}
