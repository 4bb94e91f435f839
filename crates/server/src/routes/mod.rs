//! API route handlers
//!
//! - `rag`: configuration info and question answering
//! - `health`: liveness and readiness probes

pub mod health;
pub mod rag;

use crate::error::ServerError;

/// 404 Not Found handler
pub async fn not_found() -> ServerError {
    ServerError::NotFound
}
