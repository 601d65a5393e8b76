//! Direct access to the completion client.

use axum::{
    extract::{Path, State},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::llm_client::{ProviderId, ProviderStatus};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct GenerateRequest {
    pub prompt: String,
}

#[derive(Debug, Serialize)]
pub struct GenerateResponse {
    pub text: String,
}

#[derive(Debug, Serialize)]
pub struct ProviderGenerateResponse {
    pub text: String,
    pub provider: ProviderId,
}

fn require_prompt(prompt: &str) -> Result<(), AppError> {
    if prompt.trim().is_empty() {
        return Err(AppError::Validation("prompt cannot be empty".to_string()));
    }
    Ok(())
}

/// GET /api/v1/ai/providers
/// The fallback chain in call order.
pub async fn handle_list_providers(State(state): State<AppState>) -> Json<Vec<ProviderStatus>> {
    Json(state.llm.providers())
}

/// POST /api/v1/ai/generate
/// One-shot completion through the full fallback chain; returns cleaned text.
pub async fn handle_generate(
    State(state): State<AppState>,
    Json(request): Json<GenerateRequest>,
) -> Result<Json<GenerateResponse>, AppError> {
    require_prompt(&request.prompt)?;
    let text = state.llm.generate_text(&request.prompt).await?;
    Ok(Json(GenerateResponse { text }))
}

/// POST /api/v1/ai/providers/:provider/generate
/// Calls a single provider with no fallback; returns its raw text.
pub async fn handle_generate_with(
    State(state): State<AppState>,
    Path(provider): Path<String>,
    Json(request): Json<GenerateRequest>,
) -> Result<Json<ProviderGenerateResponse>, AppError> {
    let id = ProviderId::parse(&provider)
        .ok_or_else(|| AppError::NotFound(format!("Unknown provider '{provider}'")))?;
    require_prompt(&request.prompt)?;

    let text = state.llm.generate_with(id, &request.prompt).await?;
    Ok(Json(ProviderGenerateResponse { text, provider: id }))
}
