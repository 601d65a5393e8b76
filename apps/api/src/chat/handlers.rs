//! Axum route handlers for the Chat API.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::chat::store::SessionInfo;
use crate::errors::AppError;
use crate::llm_client::ProviderId;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct SendMessageRequest {
    pub prompt: String,
}

#[derive(Debug, Serialize)]
pub struct SendMessageResponse {
    pub text: String,
    pub provider: ProviderId,
    pub session: SessionInfo,
}

/// POST /api/v1/chat/sessions
pub async fn handle_create_session(
    State(state): State<AppState>,
) -> (StatusCode, Json<SessionInfo>) {
    let info = state.sessions.insert(state.llm.create_chat_session());
    (StatusCode::CREATED, Json(info))
}

/// POST /api/v1/chat/sessions/:id/messages
///
/// Sends one prompt through the session's fallback chain. A second request
/// for the same session while this one is running gets 409.
pub async fn handle_send_message(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
    Json(request): Json<SendMessageRequest>,
) -> Result<Json<SendMessageResponse>, AppError> {
    if request.prompt.trim().is_empty() {
        return Err(AppError::Validation("prompt cannot be empty".to_string()));
    }

    let mut lease = state.sessions.lease(session_id)?;
    let reply = lease.session_mut().send_message(&request.prompt).await?;
    lease.touch();

    Ok(Json(SendMessageResponse {
        text: reply.text,
        provider: reply.provider,
        session: lease.info(),
    }))
}

/// DELETE /api/v1/chat/sessions/:id/history
pub async fn handle_clear_history(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> Result<Json<SessionInfo>, AppError> {
    Ok(Json(state.sessions.clear_history(session_id)?))
}

/// DELETE /api/v1/chat/sessions/:id
pub async fn handle_delete_session(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    state.sessions.remove(session_id)?;
    Ok(StatusCode::NO_CONTENT)
}
