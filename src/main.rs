//! `iplrag` - offline tooling and one-shot queries for the IPL 2022 RAG service.
//!
//! ```bash
//! iplrag preprocess --input-csv data/IPL_2022.csv --output-text data/IPL_2022_summary.txt
//! iplrag build-index --input-summary data/IPL_2022_summary.txt --output-path ./vector_store
//! iplrag query --user-query "what is the total run scored by Jos Buttler?"
//! ```

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use iplrag::{
    ChatProviderKind, GenerationConfig, IndexBuildConfig, IndexLocation, ParagraphSplitter,
    PipelineSettings, ProviderKind, RagPipeline, RetrievalConfig, RetryConfig, SemanticConfig,
    build_embedder, build_index_from_file, preprocess_file,
};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "iplrag")]
#[command(about = "Question answering over IPL 2022 batting statistics")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert the batting-stats CSV into the paragraph corpus
    Preprocess {
        #[arg(long, default_value = "data/IPL_2022.csv")]
        input_csv: PathBuf,

        #[arg(long, default_value = "data/IPL_2022_summary.txt")]
        output_text: PathBuf,
    },

    /// Chunk, embed and persist the corpus as a vector store
    BuildIndex {
        #[arg(long, default_value = "data/IPL_2022_summary.txt")]
        input_summary: PathBuf,

        #[command(flatten)]
        store: StoreArgs,

        #[command(flatten)]
        embedding: EmbeddingArgs,

        /// Target chunk length in characters
        #[arg(long, default_value = "400")]
        chunk_size: usize,

        /// Characters carried over between neighbouring chunks
        #[arg(long, default_value = "200")]
        chunk_overlap: usize,

        /// Retries per embedding request (0 disables retry)
        #[arg(long, default_value = "0")]
        retries: u32,
    },

    /// Answer one question against a persisted vector store
    Query {
        #[arg(long, default_value = "what is the total run scored by Jos Buttler?")]
        user_query: String,

        #[command(flatten)]
        store: StoreArgs,

        #[command(flatten)]
        embedding: EmbeddingArgs,

        #[arg(long, default_value = "gemma3:4b")]
        chat_model: String,

        /// Chat provider: "ollama" or "openai"
        #[arg(long, default_value = "ollama")]
        chat_provider: String,

        #[arg(long, default_value = "http://localhost:11434")]
        chat_api_url: String,

        #[arg(long, default_value = "4")]
        top_k: usize,

        /// Print the answer and retrieved context as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Args)]
struct StoreArgs {
    /// Directory holding the index artifacts
    #[arg(long, default_value = "./vector_store")]
    output_path: PathBuf,

    #[arg(long, default_value = "ipl_2022")]
    index_name: String,
}

#[derive(Args)]
struct EmbeddingArgs {
    #[arg(long, default_value = "granite-embedding:30m")]
    embedding_model: String,

    /// Embedding provider: "ollama", "openai", "custom" or "stub"
    #[arg(long, default_value = "ollama")]
    provider: String,

    #[arg(long, default_value = "http://localhost:11434")]
    api_url: String,
}

impl EmbeddingArgs {
    fn config(&self, retry: RetryConfig) -> Result<SemanticConfig> {
        Ok(SemanticConfig {
            provider: self.provider.parse::<ProviderKind>()?,
            model_name: self.embedding_model.clone(),
            api_url: Some(self.api_url.clone()),
            retry,
            ..Default::default()
        })
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .compact()
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Preprocess {
            input_csv,
            output_text,
        } => {
            let doc = preprocess_file(&input_csv, &output_text)
                .with_context(|| format!("preprocessing {}", input_csv.display()))?;
            println!(
                "Wrote {} player summaries to {}",
                doc.paragraphs().count(),
                output_text.display()
            );
        }

        Commands::BuildIndex {
            input_summary,
            store,
            embedding,
            chunk_size,
            chunk_overlap,
            retries,
        } => {
            let retry = if retries == 0 {
                RetryConfig::disabled()
            } else {
                RetryConfig::default().with_max_retries(retries)
            };
            let embedder = build_embedder(&embedding.config(retry)?)?;
            let cfg = IndexBuildConfig::default()
                .with_splitter(ParagraphSplitter::new(chunk_size, chunk_overlap))
                .with_output(IndexLocation::new(&store.output_path, &store.index_name));
            let built = build_index_from_file(&input_summary, embedder.as_ref(), &cfg)
                .await
                .with_context(|| format!("building index from {}", input_summary.display()))?;
            println!(
                "Indexed {} chunks (dimension {}) into {}",
                built.len(),
                built.dimension(),
                store.output_path.display()
            );
        }

        Commands::Query {
            user_query,
            store,
            embedding,
            chat_model,
            chat_provider,
            chat_api_url,
            top_k,
            json,
        } => {
            let settings = PipelineSettings {
                embedding: embedding.config(RetryConfig::disabled())?,
                generation: GenerationConfig {
                    provider: chat_provider.parse::<ChatProviderKind>()?,
                    model_name: chat_model,
                    api_url: chat_api_url,
                    ..Default::default()
                },
                retrieval: RetrievalConfig {
                    top_k,
                    ..Default::default()
                },
                vector_store_path: store.output_path,
                vector_store_index: store.index_name,
            };
            let pipeline = RagPipeline::open(&settings).context("opening the RAG pipeline")?;
            let result = pipeline
                .answer_with_context(&user_query)
                .await
                .context("answering the query")?;

            if json {
                let chunks: Vec<&str> = result
                    .context
                    .chunks
                    .iter()
                    .map(|c| c.text.as_str())
                    .collect();
                let out = serde_json::json!({
                    "id": result.answer.id,
                    "user_query": user_query,
                    "rag_result": result.answer.text,
                    "model_used": result.answer.model_used,
                    "queries": result.context.queries,
                    "context": chunks,
                });
                println!("{}", serde_json::to_string_pretty(&out)?);
            } else {
                println!("{}", result.answer.text);
            }
        }
    }

    Ok(())
}
