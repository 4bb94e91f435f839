//! Multi-query retrieval over a persisted IPL stats index.
//!
//! A user question is rephrased by the chat model ([`QueryExpander`]), each
//! phrasing is embedded and searched for its `k` nearest chunks, and the hits
//! are unioned in first-seen order into a [`RetrievedContext`].

mod config;
mod error;
mod expand;
mod retriever;

pub use config::RetrievalConfig;
pub use error::RetrievalError;
pub use expand::{expansion_prompt, parse_variants, ExpandedQuerySet, QueryExpander};
pub use retriever::{RetrievedContext, Retriever};
