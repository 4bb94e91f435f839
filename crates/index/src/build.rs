use std::time::Instant;

use log::{debug, info};
use uuid::Uuid;

use semantic::EmbeddingProvider;

use crate::{Chunk, IndexError, IndexLocation, ParagraphSplitter, VectorStore};

/// Text embedded once to learn the provider's vector length.
pub const DIMENSION_PROBE: &str = "Hello World!";

/// Settings for [`build_index`].
#[derive(Debug, Clone)]
pub struct IndexBuildConfig {
    pub splitter: ParagraphSplitter,
    /// Chunks sent per `embed_batch` call.
    pub batch_size: usize,
    /// Persist here when set.
    pub output: Option<IndexLocation>,
}

impl Default for IndexBuildConfig {
    fn default() -> Self {
        Self {
            splitter: ParagraphSplitter::default(),
            batch_size: 32,
            output: None,
        }
    }
}

impl IndexBuildConfig {
    pub fn with_output(mut self, output: IndexLocation) -> Self {
        self.output = Some(output);
        self
    }

    pub fn with_splitter(mut self, splitter: ParagraphSplitter) -> Self {
        self.splitter = splitter;
        self
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }
}

/// Chunk `document`, embed every chunk, and build a fresh [`VectorStore`].
///
/// Every chunk gets a new UUID v4 id. The store is saved to `cfg.output` when
/// set; previous artifacts at that location are replaced atomically.
pub async fn build_index(
    document: &str,
    embedder: &dyn EmbeddingProvider,
    cfg: &IndexBuildConfig,
) -> Result<VectorStore, IndexError> {
    cfg.splitter.validate()?;
    if cfg.batch_size == 0 {
        return Err(IndexError::InvalidConfig("batch_size must be at least 1".into()));
    }
    let start = Instant::now();

    let texts = cfg.splitter.split(document);
    debug!("document split into {} chunks", texts.len());

    let probe = embedder.embed(DIMENSION_PROBE).await?;
    if probe.is_empty() {
        return Err(IndexError::DimensionMismatch {
            expected: 1,
            actual: 0,
        });
    }
    let dimension = probe.len();
    let mut store = VectorStore::new(dimension, embedder.model_name())?;

    for batch in texts.chunks(cfg.batch_size) {
        let refs: Vec<&str> = batch.iter().map(String::as_str).collect();
        let vectors = embedder.embed_batch(&refs).await?;
        if vectors.len() != batch.len() {
            return Err(IndexError::Embedding(semantic::SemanticError::InvalidResponse(
                format!("{} vectors for {} chunks", vectors.len(), batch.len()),
            )));
        }
        for (text, vector) in batch.iter().zip(vectors) {
            if vector.len() != dimension {
                return Err(IndexError::DimensionMismatch {
                    expected: dimension,
                    actual: vector.len(),
                });
            }
            let chunk = Chunk {
                id: Uuid::new_v4().to_string(),
                text: text.clone(),
            };
            store.insert(chunk, &vector)?;
        }
    }

    if let Some(loc) = &cfg.output {
        store.save(loc)?;
    }

    info!(
        "index built: chunks={} dim={} model={} elapsed_ms={}",
        store.len(),
        dimension,
        embedder.model_name(),
        start.elapsed().as_millis()
    );
    Ok(store)
}
