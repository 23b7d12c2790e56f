mod analysis;
mod config;
mod errors;
mod extract;
mod llm_client;
mod prompts;
mod routes;
mod state;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::analysis::analyzer::LlmAnalyzer;
use crate::config::Config;
use crate::llm_client::LlmClient;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails fast on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging; RUST_LOG wins over LOG_LEVEL
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "{}={},tower_http={}",
                env!("CARGO_PKG_NAME"),
                config.log_level,
                config.log_level
            ))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting organizer v{}", env!("CARGO_PKG_VERSION"));

    let llm = LlmClient::new(
        config.anthropic_api_key.clone(),
        config.anthropic_model.clone(),
    )?;
    info!("LLM client initialized (model: {})", llm.model());

    let state = AppState {
        config: config.clone(),
        analyzer: Arc::new(LlmAnalyzer::new(llm)),
    };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr = SocketAddr::new(config.api_host, config.api_port);
    info!(
        "Listening on {addr} (max upload {} MB)",
        config.max_file_size_mb
    );

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
