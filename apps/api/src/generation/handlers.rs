//! Axum route handlers for the Generation API.

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::AppError;
use crate::generation::generator::{
    generate_cover_letter, generate_experience, generate_summaries, interview_questions,
    score_resume, CoverLetter, CoverLetterRequest, ExperienceSuggestion, InterviewQuestion,
    ResumeScore, SummarySuggestion,
};
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct SummaryRequest {
    pub job_title: String,
}

#[derive(Debug, Serialize)]
pub struct SummaryResponse {
    pub suggestions: Vec<SummarySuggestion>,
}

#[derive(Debug, Deserialize)]
pub struct ExperienceRequest {
    pub position_title: String,
}

#[derive(Debug, Deserialize)]
pub struct ScoreRequest {
    pub resume: Value,
    pub job_description: String,
}

#[derive(Debug, Deserialize)]
pub struct InterviewPrepRequest {
    pub resume: Value,
}

#[derive(Debug, Serialize)]
pub struct InterviewPrepResponse {
    pub questions: Vec<InterviewQuestion>,
}

fn require(field: &str, value: &str) -> Result<(), AppError> {
    if value.trim().is_empty() {
        return Err(AppError::Validation(format!("{field} cannot be empty")));
    }
    Ok(())
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/resumes/summaries
pub async fn handle_summaries(
    State(state): State<AppState>,
    Json(request): Json<SummaryRequest>,
) -> Result<Json<SummaryResponse>, AppError> {
    require("job_title", &request.job_title)?;
    let suggestions = generate_summaries(&state.llm, request.job_title.trim()).await?;
    Ok(Json(SummaryResponse { suggestions }))
}

/// POST /api/v1/resumes/experience
pub async fn handle_experience(
    State(state): State<AppState>,
    Json(request): Json<ExperienceRequest>,
) -> Result<Json<ExperienceSuggestion>, AppError> {
    require("position_title", &request.position_title)?;
    let suggestion = generate_experience(&state.llm, request.position_title.trim()).await?;
    Ok(Json(suggestion))
}

/// POST /api/v1/cover-letters
///
/// Only `job_title` and `company_name` are required; blank optional fields
/// fall back to generic phrasing.
pub async fn handle_cover_letter(
    State(state): State<AppState>,
    Json(request): Json<CoverLetterRequest>,
) -> Result<Json<CoverLetter>, AppError> {
    if request.job_title.trim().is_empty() || request.company_name.trim().is_empty() {
        return Err(AppError::Validation(
            "Please fill in job_title and company_name".to_string(),
        ));
    }
    let letter = generate_cover_letter(&state.llm, &request).await?;
    Ok(Json(letter))
}

/// POST /api/v1/resumes/score
pub async fn handle_score(
    State(state): State<AppState>,
    Json(request): Json<ScoreRequest>,
) -> Result<Json<ResumeScore>, AppError> {
    require("job_description", &request.job_description)?;
    if request.resume.is_null() {
        return Err(AppError::Validation("resume is required".to_string()));
    }
    let score = score_resume(&state.llm, &request.resume, &request.job_description).await?;
    Ok(Json(score))
}

/// POST /api/v1/resumes/interview-prep
pub async fn handle_interview_prep(
    State(state): State<AppState>,
    Json(request): Json<InterviewPrepRequest>,
) -> Result<Json<InterviewPrepResponse>, AppError> {
    if request.resume.is_null() {
        return Err(AppError::Validation("resume is required".to_string()));
    }
    let questions = interview_questions(&state.llm, &request.resume).await?;
    Ok(Json(InterviewPrepResponse { questions }))
}
