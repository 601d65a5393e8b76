mod chat;
mod config;
mod errors;
mod generation;
mod llm_client;
mod routes;
mod state;

use anyhow::Result;
use std::net::SocketAddr;
use std::time::Duration;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::llm_client::CompletionClient;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first; provider keys are optional
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_CRATE_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Resume Builder API v{}", env!("CARGO_PKG_VERSION"));

    let missing = config.missing_keys();
    if !missing.is_empty() {
        warn!(
            "No API key for {}; those providers will fail at call time",
            missing.join(", ")
        );
    }

    // Initialize the fallback chain: Groq, then OpenAI, then Gemini
    let llm = CompletionClient::from_config(&config);
    for status in llm.providers() {
        info!(
            "Provider {} (model: {}, configured: {})",
            status.provider, status.model, status.configured
        );
    }

    let state = AppState::new(llm);

    // Expire abandoned chat sessions
    let idle = chrono::Duration::minutes(i64::from(config.chat_idle_minutes));
    state.sessions.spawn_idle_sweeper(idle, Duration::from_secs(60));
    info!("Chat sessions expire after {} idle minutes", config.chat_idle_minutes);

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: restrict origins once the frontend host is fixed

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
