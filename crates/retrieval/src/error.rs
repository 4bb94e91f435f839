use thiserror::Error;

use generation::GenerationError;
use index::IndexError;
use semantic::SemanticError;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum RetrievalError {
    #[error("query cannot be empty")]
    EmptyQuery,
    #[error("top_k must be at least 1, got {0}")]
    InvalidTopK(usize),
    #[error("invalid retrieval config: {0}")]
    InvalidConfig(String),
    /// The chat model failed while generating query variants.
    #[error("query expansion failed: {0}")]
    Expansion(#[source] GenerationError),
    #[error("query embedding failed: {0}")]
    Embedding(#[from] SemanticError),
    #[error("index search failed: {0}")]
    Index(#[source] IndexError),
    /// The persisted index is missing or unreadable.
    #[error("vector store is not initialized: {0}")]
    NotInitialized(String),
}

impl From<IndexError> for RetrievalError {
    fn from(err: IndexError) -> Self {
        if err.is_unavailable() {
            RetrievalError::NotInitialized(err.to_string())
        } else {
            RetrievalError::Index(err)
        }
    }
}

impl RetrievalError {
    /// Caller-side mistakes, as opposed to backend failures.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            RetrievalError::EmptyQuery | RetrievalError::InvalidTopK(_)
        )
    }
}
