use log::warn;

use crate::IndexError;

/// Splits text on a separator and greedily merges the pieces into chunks.
///
/// Pieces are never cut: a single piece longer than `chunk_size` becomes a
/// chunk of its own. Consecutive chunks may repeat trailing pieces of the
/// previous chunk, up to `chunk_overlap` characters. Lengths are counted in
/// characters, separators included.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParagraphSplitter {
    pub separator: String,
    pub chunk_size: usize,
    pub chunk_overlap: usize,
}

impl Default for ParagraphSplitter {
    fn default() -> Self {
        Self {
            separator: "\n\n".into(),
            chunk_size: 400,
            chunk_overlap: 200,
        }
    }
}

impl ParagraphSplitter {
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Self {
        Self {
            chunk_size,
            chunk_overlap,
            ..Self::default()
        }
    }

    pub fn with_separator(mut self, separator: impl Into<String>) -> Self {
        self.separator = separator.into();
        self
    }

    pub fn validate(&self) -> Result<(), IndexError> {
        if self.separator.is_empty() {
            return Err(IndexError::InvalidConfig("separator must not be empty".into()));
        }
        if self.chunk_size == 0 {
            return Err(IndexError::InvalidConfig("chunk_size must be at least 1".into()));
        }
        if self.chunk_overlap > self.chunk_size {
            return Err(IndexError::InvalidConfig(format!(
                "chunk_overlap ({}) is larger than chunk_size ({})",
                self.chunk_overlap, self.chunk_size
            )));
        }
        Ok(())
    }

    /// Split `text` into trimmed, non-empty chunks in document order.
    pub fn split(&self, text: &str) -> Vec<String> {
        let pieces: Vec<&str> = text
            .split(self.separator.as_str())
            .filter(|s| !s.is_empty())
            .collect();
        self.merge(&pieces)
    }

    fn merge(&self, pieces: &[&str]) -> Vec<String> {
        let sep_len = self.separator.chars().count();
        let mut chunks = Vec::new();
        // (piece, char length)
        let mut current: Vec<(&str, usize)> = Vec::new();
        let mut total = 0usize;

        for &piece in pieces {
            let len = piece.chars().count();
            let joined_len = |current: &[(&str, usize)], total: usize| {
                total + len + if current.is_empty() { 0 } else { sep_len }
            };

            if joined_len(&current, total) > self.chunk_size {
                if total > self.chunk_size {
                    warn!(
                        "created a chunk of size {total}, which is longer than the specified {}",
                        self.chunk_size
                    );
                }
                if !current.is_empty() {
                    if let Some(chunk) = self.join(&current) {
                        chunks.push(chunk);
                    }
                    while total > self.chunk_overlap
                        || (total > 0 && joined_len(&current, total) > self.chunk_size)
                    {
                        let (_, first_len) = current.remove(0);
                        total -= first_len + if current.is_empty() { 0 } else { sep_len };
                    }
                }
            }

            current.push((piece, len));
            total += len + if current.len() > 1 { sep_len } else { 0 };
        }

        if total > self.chunk_size {
            warn!(
                "created a chunk of size {total}, which is longer than the specified {}",
                self.chunk_size
            );
        }
        if let Some(chunk) = self.join(&current) {
            chunks.push(chunk);
        }
        chunks
    }

    fn join(&self, pieces: &[(&str, usize)]) -> Option<String> {
        let text = pieces
            .iter()
            .map(|(p, _)| *p)
            .collect::<Vec<_>>()
            .join(&self.separator);
        let trimmed = text.trim();
        (!trimmed.is_empty()).then(|| trimmed.to_string())
    }
}
