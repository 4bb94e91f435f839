use crate::config::ServerConfig;
use crate::error::{ServerResult, ServiceError};
use async_trait::async_trait;
use iplrag::{PipelineError, PipelineSettings, RagPipeline};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::OnceCell;

/// Builds the pipeline on first use.
#[async_trait]
pub trait PipelineFactory: Send + Sync {
    async fn build(&self, settings: &PipelineSettings) -> Result<RagPipeline, String>;
}

/// Connects the HTTP providers and loads the persisted store.
#[derive(Debug, Default, Clone, Copy)]
pub struct ProviderPipelineFactory;

#[async_trait]
impl PipelineFactory for ProviderPipelineFactory {
    async fn build(&self, settings: &PipelineSettings) -> Result<RagPipeline, String> {
        let settings = settings.clone();
        tokio::task::spawn_blocking(move || RagPipeline::open(&settings))
            .await
            .map_err(|e| format!("initialization task failed: {e}"))?
            .map_err(|e: PipelineError| e.to_string())
    }
}

/// Lifecycle of the lazily built pipeline. `Failed` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ServiceStatus {
    Uninitialized,
    Initializing,
    Ready,
    Failed,
}

/// `GET /info` body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InfoResponse {
    pub embedding_model: String,
    pub generation_model: String,
    pub vector_store_path: String,
    pub vector_store_index: String,
}

/// `POST /ragit` success body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RagitResponse {
    pub id: String,
    pub user_query: String,
    pub rag_result: String,
    pub model_used: String,
}

type PipelineOutcome = Result<Arc<RagPipeline>, String>;

/// Question answering facade with one-time lazy initialization.
///
/// The build runs on a detached task, so a caller that is dropped mid-build
/// (client disconnect, request timeout) never cancels it.
pub struct RagService {
    config: Arc<ServerConfig>,
    settings: Arc<PipelineSettings>,
    factory: Arc<dyn PipelineFactory>,
    pipeline: Arc<OnceCell<PipelineOutcome>>,
    initializing: Arc<AtomicBool>,
}

impl RagService {
    pub fn new(config: Arc<ServerConfig>, factory: Arc<dyn PipelineFactory>) -> ServerResult<Self> {
        let settings = config.pipeline_settings()?;
        Ok(Self {
            config,
            settings: Arc::new(settings),
            factory,
            pipeline: Arc::new(OnceCell::new()),
            initializing: Arc::new(AtomicBool::new(false)),
        })
    }

    pub fn status(&self) -> ServiceStatus {
        match self.pipeline.get() {
            Some(Ok(_)) => ServiceStatus::Ready,
            Some(Err(_)) => ServiceStatus::Failed,
            None if self.initializing.load(Ordering::Acquire) => ServiceStatus::Initializing,
            None => ServiceStatus::Uninitialized,
        }
    }

    /// Configured models and store location. Never touches the providers.
    pub fn config_info(&self) -> InfoResponse {
        InfoResponse {
            embedding_model: self.config.embedding_model.clone(),
            generation_model: self.config.generation_model.clone(),
            vector_store_path: self.config.vector_store_path.clone(),
            vector_store_index: self.config.vector_store_index.clone(),
        }
    }

    async fn pipeline(&self) -> Result<Arc<RagPipeline>, ServiceError> {
        if let Some(outcome) = self.pipeline.get() {
            return outcome.clone().map_err(ServiceError::Initialization);
        }

        let cell = self.pipeline.clone();
        let factory = self.factory.clone();
        let settings = self.settings.clone();
        let initializing = self.initializing.clone();
        let task = tokio::spawn(async move {
            cell.get_or_init(|| build_pipeline(factory, settings, initializing))
                .await
                .clone()
        });

        task.await
            .map_err(|e| ServiceError::Initialization(format!("initialization task failed: {e}")))?
            .map_err(ServiceError::Initialization)
    }

    pub async fn answer_query(&self, query: &str) -> Result<RagitResponse, ServiceError> {
        if query.trim().is_empty() {
            return Err(ServiceError::InvalidInput("Query cannot be empty".into()));
        }
        let pipeline = self.pipeline().await?;
        let answer = pipeline.answer(query).await.map_err(|e| {
            tracing::error!(error = %e, "RAG query failed");
            ServiceError::Query(e.to_string())
        })?;
        Ok(RagitResponse {
            id: answer.id,
            user_query: query.to_string(),
            rag_result: answer.text,
            model_used: answer.model_used,
        })
    }
}

async fn build_pipeline(
    factory: Arc<dyn PipelineFactory>,
    settings: Arc<PipelineSettings>,
    initializing: Arc<AtomicBool>,
) -> PipelineOutcome {
    initializing.store(true, Ordering::Release);
    tracing::info!("Initializing RAG service components");
    match factory.build(&settings).await {
        Ok(pipeline) => {
            tracing::info!("RAG service initialized successfully");
            Ok(Arc::new(pipeline))
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to initialize RAG service");
            Err(e)
        }
    }
}

/// Shared application state
#[derive(Clone)]
pub struct ServerState {
    /// Server configuration
    pub config: Arc<ServerConfig>,

    pub rag: Arc<RagService>,
}

impl ServerState {
    /// State wired to the real HTTP providers.
    pub fn new(config: ServerConfig) -> ServerResult<Self> {
        Self::with_factory(config, Arc::new(ProviderPipelineFactory))
    }

    pub fn with_factory(
        config: ServerConfig,
        factory: Arc<dyn PipelineFactory>,
    ) -> ServerResult<Self> {
        let config = Arc::new(config);
        let rag = Arc::new(RagService::new(config.clone(), factory)?);
        Ok(Self { config, rag })
    }
}
