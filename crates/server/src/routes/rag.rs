use crate::error::{ServerError, ServerResult};
use crate::state::{InfoResponse, RagitResponse, ServerState};
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// `POST /ragit` body.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RagitRequest {
    pub query: String,
}

/// Return the current configuration of the RAG pipeline
pub async fn info(State(state): State<Arc<ServerState>>) -> Json<InfoResponse> {
    Json(state.rag.config_info())
}

/// Answer a question from the indexed season statistics
pub async fn ragit(
    State(state): State<Arc<ServerState>>,
    payload: Result<Json<RagitRequest>, JsonRejection>,
) -> ServerResult<Json<RagitResponse>> {
    let Json(request) = payload.map_err(ServerError::from)?;
    let response = state.rag.answer_query(&request.query).await?;
    Ok(Json(response))
}
