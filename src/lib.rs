//! Workspace umbrella crate for the IPL 2022 stats RAG service.
//!
//! This crate stitches the stage crates into the two flows callers need:
//!
//! - **Offline**: [`preprocess_file`] turns the batting-stats CSV into the
//!   corpus document, and [`build_index_from_file`] chunks, embeds and persists
//!   it as a vector store.
//! - **Online**: [`RagPipeline`] expands a question, retrieves context from the
//!   persisted store and asks the chat model for an answer.

pub use corpus::{
    CorpusDocument, CorpusError, PlayerRecord, preprocess, read_corpus, read_player_records,
    render_summary, write_corpus,
};
pub use generation::{
    AnswerResult, ChatClient, ChatProviderKind, Completion, GenerationConfig, GenerationError,
    GenerationProvider, Generator, render_prompt,
};
pub use index::{
    IndexBuildConfig, IndexError, IndexLocation, ParagraphSplitter, SearchHit, VectorStore,
    build_index,
};
pub use retrieval::{RetrievalConfig, RetrievalError, RetrievedContext, Retriever};
pub use semantic::{
    EmbeddingProvider, ProviderKind, RetryConfig, SemanticConfig, SemanticError, StubEmbedder,
    build_embedder,
};

use std::error::Error;
use std::fmt;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// Errors that can occur while running either pipeline flow.
#[derive(Debug)]
pub enum PipelineError {
    Corpus(CorpusError),
    Embedding(SemanticError),
    Index(IndexError),
    Retrieval(RetrievalError),
    Generation(GenerationError),
}

impl fmt::Display for PipelineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PipelineError::Corpus(err) => write!(f, "corpus failure: {err}"),
            PipelineError::Embedding(err) => write!(f, "embedding provider failure: {err}"),
            PipelineError::Index(err) => write!(f, "index failure: {err}"),
            PipelineError::Retrieval(err) => write!(f, "retrieval failure: {err}"),
            PipelineError::Generation(err) => write!(f, "generation failure: {err}"),
        }
    }
}

impl Error for PipelineError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            PipelineError::Corpus(err) => Some(err),
            PipelineError::Embedding(err) => Some(err),
            PipelineError::Index(err) => Some(err),
            PipelineError::Retrieval(err) => Some(err),
            PipelineError::Generation(err) => Some(err),
        }
    }
}

impl From<CorpusError> for PipelineError {
    fn from(value: CorpusError) -> Self {
        PipelineError::Corpus(value)
    }
}

impl From<SemanticError> for PipelineError {
    fn from(value: SemanticError) -> Self {
        PipelineError::Embedding(value)
    }
}

impl From<IndexError> for PipelineError {
    fn from(value: IndexError) -> Self {
        PipelineError::Index(value)
    }
}

impl From<RetrievalError> for PipelineError {
    fn from(value: RetrievalError) -> Self {
        PipelineError::Retrieval(value)
    }
}

impl From<GenerationError> for PipelineError {
    fn from(value: GenerationError) -> Self {
        PipelineError::Generation(value)
    }
}

/// Everything needed to open a [`RagPipeline`] against a persisted store.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineSettings {
    pub embedding: SemanticConfig,
    pub generation: GenerationConfig,
    pub retrieval: RetrievalConfig,
    pub vector_store_path: std::path::PathBuf,
    pub vector_store_index: String,
}

impl PipelineSettings {
    pub fn location(&self) -> IndexLocation {
        IndexLocation::new(&self.vector_store_path, &self.vector_store_index)
    }
}

/// Read the stats CSV at `input_csv`, write the corpus document to `output_text`.
pub fn preprocess_file(
    input_csv: impl AsRef<Path>,
    output_text: impl AsRef<Path>,
) -> Result<CorpusDocument, PipelineError> {
    let records = read_player_records(input_csv.as_ref())?;
    if records.is_empty() {
        warn!(input = %input_csv.as_ref().display(), "no player rows, writing empty corpus");
    }
    let doc = preprocess(&records);
    write_corpus(&doc, output_text.as_ref())?;
    info!(
        players = records.len(),
        output = %output_text.as_ref().display(),
        "corpus_written"
    );
    Ok(doc)
}

/// Build and persist a vector store from a corpus document on disk.
pub async fn build_index_from_file(
    input_summary: impl AsRef<Path>,
    embedder: &dyn EmbeddingProvider,
    cfg: &IndexBuildConfig,
) -> Result<VectorStore, PipelineError> {
    let doc = read_corpus(input_summary)?;
    Ok(build_index(doc.as_ref(), embedder, cfg).await?)
}

/// Retrieval followed by generation over one shared chat model.
#[derive(Debug, Clone)]
pub struct RagPipeline {
    retriever: Retriever,
    generator: Generator,
}

/// An answer together with the context it was generated from.
#[derive(Debug, Clone)]
pub struct RagAnswer {
    pub answer: AnswerResult,
    pub context: RetrievedContext,
}

impl RagPipeline {
    pub fn new(retriever: Retriever, generator: Generator) -> Self {
        Self {
            retriever,
            generator,
        }
    }

    /// Connect the HTTP providers and load the persisted store. Blocks on disk I/O.
    pub fn open(settings: &PipelineSettings) -> Result<Self, PipelineError> {
        let embedder = build_embedder(&settings.embedding)?;
        let chat: Arc<dyn GenerationProvider> =
            Arc::new(ChatClient::new(settings.generation.clone())?);
        let retriever = Retriever::open(
            &settings.location(),
            embedder,
            chat.clone(),
            settings.retrieval.clone(),
        )?;
        Ok(Self::new(retriever, Generator::new(chat)))
    }

    pub fn retriever(&self) -> &Retriever {
        &self.retriever
    }

    pub fn generator(&self) -> &Generator {
        &self.generator
    }

    pub async fn answer(&self, query: &str) -> Result<AnswerResult, PipelineError> {
        Ok(self.answer_with_context(query).await?.answer)
    }

    pub async fn answer_with_context(&self, query: &str) -> Result<RagAnswer, PipelineError> {
        let start = Instant::now();
        let context = self.retriever.retrieve_default(query).await?;
        let answer = self.generator.generate(&context.text(), query.trim()).await?;
        info!(
            id = %answer.id,
            chunks = context.chunks.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "query_answered"
        );
        Ok(RagAnswer { answer, context })
    }
}
