use bincode::error::{DecodeError, EncodeError};
use std::path::Path;
use thiserror::Error;

use semantic::SemanticError;

/// Errors raised while building, persisting, loading or searching an index.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum IndexError {
    #[error("invalid index config: {0}")]
    InvalidConfig(String),
    #[error("embedding failed: {0}")]
    Embedding(#[from] SemanticError),
    #[error("duplicate chunk id: {0}")]
    DuplicateId(String),
    #[error("dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },
    #[error("serialization encode error: {0}")]
    Encode(String),
    #[error("serialization decode error: {0}")]
    Decode(String),
    #[error("compression error: {0}")]
    Compression(String),
    #[error("io error: {0}")]
    Io(String),
    #[error("index artifact not found: {0}")]
    NotFound(String),
    #[error("index artifacts are inconsistent: {0}")]
    Corrupt(String),
}

impl From<EncodeError> for IndexError {
    fn from(e: EncodeError) -> Self {
        IndexError::Encode(e.to_string())
    }
}

impl From<DecodeError> for IndexError {
    fn from(e: DecodeError) -> Self {
        IndexError::Decode(e.to_string())
    }
}

impl IndexError {
    pub(crate) fn io(path: &Path, err: std::io::Error) -> Self {
        IndexError::Io(format!("{}: {err}", path.display()))
    }

    /// True when the persisted index cannot be served (missing or unreadable).
    pub fn is_unavailable(&self) -> bool {
        matches!(
            self,
            IndexError::NotFound(_)
                | IndexError::Corrupt(_)
                | IndexError::Decode(_)
                | IndexError::Compression(_)
                | IndexError::Io(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dimension_mismatch_message() {
        let err = IndexError::DimensionMismatch {
            expected: 384,
            actual: 3,
        };
        assert_eq!(err.to_string(), "dimension mismatch: expected 384, got 3");
        assert!(!err.is_unavailable());
    }

    #[test]
    fn io_error_names_path() {
        let err = IndexError::io(
            Path::new("/tmp/x.index"),
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        );
        assert!(err.to_string().contains("/tmp/x.index"));
        assert!(err.is_unavailable());
    }

    #[test]
    fn embedding_error_converts() {
        let err: IndexError = SemanticError::Timeout("60s".into()).into();
        assert!(matches!(err, IndexError::Embedding(SemanticError::Timeout(_))));
    }
}
