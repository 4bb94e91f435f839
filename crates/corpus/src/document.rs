use std::fs;
use std::path::Path;
use std::time::Instant;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::{CorpusError, PlayerRecord};

/// Separator placed between consecutive summary paragraphs.
pub const PARAGRAPH_SEPARATOR: &str = "\n\n";

/// The whole season rendered as text, one paragraph per record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CorpusDocument {
    pub text: String,
}

impl CorpusDocument {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Paragraphs in document order.
    pub fn paragraphs(&self) -> impl Iterator<Item = &str> {
        self.text
            .split(PARAGRAPH_SEPARATOR)
            .filter(|p| !p.trim().is_empty())
    }
}

impl AsRef<str> for CorpusDocument {
    fn as_ref(&self) -> &str {
        &self.text
    }
}

/// Render every record and join the paragraphs with a blank line.
pub fn preprocess(records: &[PlayerRecord]) -> CorpusDocument {
    let start = Instant::now();
    let text = records
        .iter()
        .map(PlayerRecord::summary)
        .collect::<Vec<_>>()
        .join(PARAGRAPH_SEPARATOR);
    info!(
        records = records.len(),
        bytes = text.len(),
        elapsed_micros = start.elapsed().as_micros(),
        "corpus_preprocessed"
    );
    CorpusDocument { text }
}

/// Write the document to `dest`, replacing any existing file.
pub fn write_corpus(doc: &CorpusDocument, dest: impl AsRef<Path>) -> Result<(), CorpusError> {
    let dest = dest.as_ref();
    fs::write(dest, doc.text.as_bytes()).map_err(|source| CorpusError::Io {
        path: dest.to_path_buf(),
        source,
    })?;
    debug!(path = %dest.display(), bytes = doc.text.len(), "corpus_written");
    Ok(())
}

/// Read a previously written corpus file.
pub fn read_corpus(src: impl AsRef<Path>) -> Result<CorpusDocument, CorpusError> {
    let src = src.as_ref();
    if !src.exists() {
        return Err(CorpusError::InputNotFound(src.to_path_buf()));
    }
    let text = fs::read_to_string(src).map_err(|source| CorpusError::Io {
        path: src.to_path_buf(),
        source,
    })?;
    Ok(CorpusDocument { text })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(name: &str, runs: u32) -> PlayerRecord {
        PlayerRecord {
            player: name.into(),
            team: "GT".into(),
            year: 2022,
            role: "Batsman".into(),
            matches: 16,
            innings: 16,
            not_out: 2,
            runs,
            highest_score: "87*".into(),
            average: "34.5".into(),
            balls_faced: 400,
            strike_rate: "131.2".into(),
            fours: 40,
            sixes: 20,
            centuries: 0,
            half_centuries: 4,
        }
    }

    #[test]
    fn empty_input_gives_empty_document() {
        let doc = preprocess(&[]);
        assert!(doc.is_empty());
        assert_eq!(doc.paragraphs().count(), 0);
    }

    #[test]
    fn paragraphs_are_joined_by_blank_line() {
        let doc = preprocess(&[record("A", 10), record("B", 20)]);
        let parts: Vec<&str> = doc.text.split("\n\n").collect();
        assert_eq!(parts.len(), 2);
        assert!(parts[0].starts_with("A played"));
        assert!(parts[1].starts_with("B played"));
        assert!(!doc.text.ends_with('\n'));
    }

    #[test]
    fn single_record_has_no_separator() {
        let doc = preprocess(&[record("A", 10)]);
        assert!(!doc.text.contains("\n\n"));
        assert_eq!(doc.paragraphs().count(), 1);
    }

    #[test]
    fn unwritable_destination_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("missing").join("out.txt");
        let err = write_corpus(&CorpusDocument::new("x"), &dest).unwrap_err();
        assert!(matches!(err, CorpusError::Io { .. }));
    }

    #[test]
    fn write_then_read() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("summary.txt");
        let doc = preprocess(&[record("A", 10)]);
        write_corpus(&doc, &dest).unwrap();
        assert_eq!(read_corpus(&dest).unwrap(), doc);
    }
}
