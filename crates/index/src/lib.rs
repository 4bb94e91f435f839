//! # Vector index for the IPL stats corpus
//!
//! Turns a corpus document into a searchable [`VectorStore`]:
//!
//! - **Chunking** - [`ParagraphSplitter`] splits on blank lines and greedily
//!   merges paragraphs up to a character budget, never cutting one in half.
//! - **Flat search** - [`FlatIndex`] is an exact scan by squared Euclidean
//!   distance. Ties keep insertion order.
//! - **Docstore** - chunk id to text, so search hits come back as text.
//! - **Persistence** - [`VectorStore::save`] writes `<name>.index` and
//!   `<name>.docstore` (bincode, then zstd) through a staging directory and
//!   renames them into place. A shared generation id lets
//!   [`VectorStore::load`] reject a half-replaced pair.
//!
//! ## Example
//!
//! ```
//! use index::{build_index, IndexBuildConfig};
//! use semantic::StubEmbedder;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let embedder = StubEmbedder::new("stub", 16);
//! let doc = "Jos Buttler played for the RR in 2022.\n\nKL Rahul played for the LSG in 2022.";
//! let store = build_index(doc, &embedder, &IndexBuildConfig::default()).await.unwrap();
//! assert_eq!(store.len(), 1); // both paragraphs fit in one 400-char chunk
//! # }
//! ```

mod build;
mod codec;
mod docstore;
mod error;
mod flat;
mod splitter;
mod store;

pub use crate::build::{build_index, IndexBuildConfig, DIMENSION_PROBE};
pub use crate::codec::ZSTD_LEVEL;
pub use crate::docstore::{Chunk, Docstore};
pub use crate::error::IndexError;
pub use crate::flat::{squared_l2, DistanceMetric, FlatIndex};
pub use crate::splitter::ParagraphSplitter;
pub use crate::store::{IndexLocation, SearchHit, VectorStore};

/// Bump this value whenever the on-disk artifact layout changes.
pub const INDEX_SCHEMA_VERSION: u16 = 1;
