use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while turning a statistics table into a corpus document.
#[derive(Debug, Error)]
pub enum CorpusError {
    /// A required column is absent or blank.
    #[error("missing required field `{field}`")]
    MissingField { field: &'static str },
    /// A numeric column could not be parsed.
    #[error("field `{field}` has value {value:?}, expected {expected}")]
    InvalidField {
        field: &'static str,
        value: String,
        expected: &'static str,
    },
    /// Validation failure tagged with the 1-based data row it came from.
    #[error("row {row}: {source}")]
    Row {
        row: usize,
        source: Box<CorpusError>,
    },
    /// The input table does not exist.
    #[error("input table not found: {}", .0.display())]
    InputNotFound(PathBuf),
    /// The CSV reader rejected the input.
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    /// Reading or writing the corpus file failed.
    #[error("io error on {}: {source}", .path.display())]
    Io { path: PathBuf, source: io::Error },
}

impl CorpusError {
    pub(crate) fn at_row(self, row: usize) -> Self {
        CorpusError::Row {
            row,
            source: Box::new(self),
        }
    }

    /// True for errors caused by bad record content rather than storage.
    pub fn is_validation(&self) -> bool {
        match self {
            CorpusError::MissingField { .. } | CorpusError::InvalidField { .. } => true,
            CorpusError::Row { source, .. } => source.is_validation(),
            _ => false,
        }
    }
}
