use futures::future::try_join_all;
use hashbrown::HashSet;
use std::sync::Arc;
use tracing::{info, warn};

use generation::GenerationProvider;
use index::{IndexLocation, SearchHit, VectorStore};
use semantic::EmbeddingProvider;

use crate::{ExpandedQuerySet, QueryExpander, RetrievalConfig, RetrievalError};

/// Chunks gathered for one user query.
#[derive(Debug, Clone, PartialEq)]
pub struct RetrievedContext {
    /// Queries that were actually searched, in search order.
    pub queries: Vec<String>,
    /// Unique chunks in first-seen order.
    pub chunks: Vec<SearchHit>,
}

impl RetrievedContext {
    /// Chunk texts joined by a blank line.
    pub fn text(&self) -> String {
        self.chunks
            .iter()
            .map(|c| c.text.as_str())
            .collect::<Vec<_>>()
            .join("\n\n")
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }
}

/// Multi-query retriever over an immutable [`VectorStore`].
#[derive(Clone)]
pub struct Retriever {
    store: Arc<VectorStore>,
    embedder: Arc<dyn EmbeddingProvider>,
    expander: QueryExpander,
    config: RetrievalConfig,
}

impl Retriever {
    pub fn new(
        store: Arc<VectorStore>,
        embedder: Arc<dyn EmbeddingProvider>,
        chat: Arc<dyn GenerationProvider>,
        config: RetrievalConfig,
    ) -> Result<Self, RetrievalError> {
        config.validate()?;
        store.warn_on_model_mismatch(embedder.model_name());
        Ok(Self {
            expander: QueryExpander::new(chat, config.num_variants),
            store,
            embedder,
            config,
        })
    }

    /// Load the persisted store at `loc` and wrap it. Blocks on disk I/O.
    pub fn open(
        loc: &IndexLocation,
        embedder: Arc<dyn EmbeddingProvider>,
        chat: Arc<dyn GenerationProvider>,
        config: RetrievalConfig,
    ) -> Result<Self, RetrievalError> {
        let store = VectorStore::load(loc)
            .map_err(|e| RetrievalError::NotInitialized(e.to_string()))?;
        info!(
            dir = %loc.dir.display(),
            name = %loc.name,
            chunks = store.len(),
            dimension = store.dimension(),
            "vector_store_loaded"
        );
        Self::new(Arc::new(store), embedder, chat, config)
    }

    pub fn store(&self) -> &VectorStore {
        &self.store
    }

    pub fn config(&self) -> &RetrievalConfig {
        &self.config
    }

    /// Retrieve with the configured `top_k`.
    pub async fn retrieve_default(&self, query: &str) -> Result<RetrievedContext, RetrievalError> {
        self.retrieve(query, self.config.top_k).await
    }

    pub async fn retrieve(&self, query: &str, k: usize) -> Result<RetrievedContext, RetrievalError> {
        let query = query.trim();
        if query.is_empty() {
            return Err(RetrievalError::EmptyQuery);
        }
        if k == 0 {
            return Err(RetrievalError::InvalidTopK(k));
        }

        let expanded = match self.expander.expand(query).await {
            Ok(set) => set,
            Err(err) if self.config.fallback_to_single_query => {
                warn!(error = %err, "query_expansion_failed_falling_back");
                ExpandedQuerySet::single(query)
            }
            Err(err) => return Err(RetrievalError::Expansion(err)),
        };
        let queries = expanded.queries(self.config.include_original);

        let per_query = try_join_all(queries.iter().map(|q| self.search_one(q, k))).await?;

        let mut seen = HashSet::new();
        let chunks: Vec<SearchHit> = per_query
            .into_iter()
            .flatten()
            .filter(|hit| seen.insert(hit.id.clone()))
            .collect();

        info!(
            queries = queries.len(),
            chunks = chunks.len(),
            top_k = k,
            "context_retrieved"
        );
        Ok(RetrievedContext {
            queries: queries.into_iter().map(str::to_string).collect(),
            chunks,
        })
    }

    async fn search_one(&self, query: &str, k: usize) -> Result<Vec<SearchHit>, RetrievalError> {
        let vector = self.embedder.embed(query).await?;
        self.store.search(&vector, k).map_err(RetrievalError::Index)
    }
}

impl std::fmt::Debug for Retriever {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Retriever")
            .field("chunks", &self.store.len())
            .field("embedding_model", &self.embedder.model_name())
            .field("expander", &self.expander)
            .field("config", &self.config)
            .finish()
    }
}
