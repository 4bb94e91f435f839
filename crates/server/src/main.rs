//! IPL 2022 RAG Service - HTTP API over the persisted stats index.

use server::ServerConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Before config, so `.env` warnings and config errors are logged
    server::init_tracing(
        &std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
    );

    let config = ServerConfig::load()?;

    server::start_server(config).await?;

    Ok(())
}
