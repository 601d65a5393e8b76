pub mod ai;
pub mod health;

use axum::{
    routing::{delete, get, post},
    Router,
};

use crate::chat::handlers as chat;
use crate::generation::handlers as generation;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Completion API
        .route("/api/v1/ai/providers", get(ai::handle_list_providers))
        .route("/api/v1/ai/generate", post(ai::handle_generate))
        .route(
            "/api/v1/ai/providers/:provider/generate",
            post(ai::handle_generate_with),
        )
        // Chat API
        .route("/api/v1/chat/sessions", post(chat::handle_create_session))
        .route(
            "/api/v1/chat/sessions/:id",
            delete(chat::handle_delete_session),
        )
        .route(
            "/api/v1/chat/sessions/:id/messages",
            post(chat::handle_send_message),
        )
        .route(
            "/api/v1/chat/sessions/:id/history",
            delete(chat::handle_clear_history),
        )
        // Generation API
        .route("/api/v1/resumes/summaries", post(generation::handle_summaries))
        .route(
            "/api/v1/resumes/experience",
            post(generation::handle_experience),
        )
        .route("/api/v1/resumes/score", post(generation::handle_score))
        .route(
            "/api/v1/resumes/interview-prep",
            post(generation::handle_interview_prep),
        )
        .route("/api/v1/cover-letters", post(generation::handle_cover_letter))
        .with_state(state)
}
