//! Answer generation for the IPL stats RAG service.
//!
//! [`GenerationProvider`] is the narrow seam to a chat model. [`ChatClient`]
//! implements it over HTTP for Ollama (`/api/chat`) and OpenAI-compatible
//! (`/v1/chat/completions`) backends. [`Generator`] wraps a provider with the
//! fixed answer prompt and stamps every answer with a fresh id.
//!
//! ```
//! use generation::render_prompt;
//!
//! let prompt = render_prompt("Jos Buttler ... 863 runs", "Total runs of Buttler?");
//! assert!(prompt.ends_with("Total runs of Buttler?\n"));
//! ```

mod chat;
mod config;
mod error;
mod generator;
mod prompt;
mod provider;

pub use chat::ChatClient;
pub use config::{ChatProviderKind, GenerationConfig};
pub use error::GenerationError;
pub use generator::{AnswerResult, Generator};
pub use prompt::render_prompt;
pub use provider::{Completion, GenerationProvider};
