//! IPL 2022 RAG Service - HTTP API for question answering over season stats
//!
//! # Endpoints
//!
//! - `GET /info` - configured embedding model, generation model and store location
//! - `POST /ragit` - `{"query": "..."}` -> `{id, user_query, rag_result, model_used}`
//! - `GET /health` - liveness probe
//! - `GET /ready` - readiness probe, 503 once initialization has failed
//!
//! Errors are returned as `{"error": {"code": "...", "message": "..."}}`.
//!
//! # Initialization
//!
//! Configuration is loaded and validated at startup ([`ServerConfig::load`]).
//! The pipeline (providers plus the persisted vector store) is built on the
//! first `/ragit` request, exactly once; a failed build is cached and reported
//! on every later request.

pub mod config;
pub mod error;
pub mod middleware;
pub mod routes;
pub mod server;
pub mod state;

pub use config::ServerConfig;
pub use error::{ServerError, ServerResult, ServiceError};
pub use server::{build_router, init_tracing, start_server};
pub use state::{
    InfoResponse, PipelineFactory, ProviderPipelineFactory, RagService, RagitResponse,
    ServerState, ServiceStatus,
};
