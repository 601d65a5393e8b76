use axum::{extract::State, Json};
use serde_json::{json, Value};

use crate::state::AppState;

/// GET /health
/// Returns service status, version, and how many providers have credentials.
pub async fn health_handler(State(state): State<AppState>) -> Json<Value> {
    let providers = state.llm.providers();
    let configured = providers.iter().filter(|p| p.configured).count();

    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "service": "resume-builder-api",
        "providers_configured": configured,
        "providers_total": providers.len(),
        "chat_sessions": state.sessions.len(),
    }))
}
