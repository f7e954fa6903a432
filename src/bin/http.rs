use std::net::SocketAddr;

use anyhow::Context;
use attendance_tool::{ProjectionConfig, Projector, http_api, load_book_from_json, logging};
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    logging::init(1).context("failed to initialise logging")?;

    let addr: SocketAddr = std::env::var("ATTENDANCE_TOOL_HTTP_ADDR")
        .unwrap_or_else(|_| "0.0.0.0:3000".to_string())
        .parse()
        .context("invalid ATTENDANCE_TOOL_HTTP_ADDR")?;

    let snapshot = std::env::var("ATTENDANCE_TOOL_SNAPSHOT")
        .context("ATTENDANCE_TOOL_SNAPSHOT must point at a session snapshot")?;
    let book = load_book_from_json(&snapshot)
        .with_context(|| format!("failed to load snapshot: {snapshot}"))?;

    let config = match std::env::var("ATTENDANCE_TOOL_CONFIG") {
        Ok(path) => ProjectionConfig::from_path(&path)
            .with_context(|| format!("failed to load config: {path}"))?,
        Err(_) => ProjectionConfig::default(),
    };

    info!(%addr, session = %book.name(), "attendance-tool HTTP API listening");
    let state = http_api::AppState::new(book, Projector::new(config));
    http_api::serve(addr, state).await?;
    Ok(())
}
