//! Résumé content generation: summaries, experience bullets, cover letters,
//! ATS scoring and interview questions.
//!
//! Every operation fills a template, runs it through the completion client's
//! fallback chain, narrows the reply to its JSON block and parses it. The
//! client only promises cleaned text, so a reply that still fails to parse is
//! reported here as an LLM error.

use std::sync::OnceLock;

use regex::{Captures, Regex};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::Value;
use tracing::{info, warn};

use crate::errors::AppError;
use crate::generation::moderation::{contains_inappropriate_content, redact_sensitive};
use crate::generation::prompts::{
    COVER_LETTER_PROMPT_TEMPLATE, EXPERIENCE_PROMPT_TEMPLATE, INTERVIEW_PREP_PROMPT_TEMPLATE,
    RESUME_SCORE_PROMPT_TEMPLATE, SUMMARY_PROMPT_TEMPLATE,
};
use crate::llm_client::clean::extract_json;
use crate::llm_client::prompts::{JSON_ONLY_INSTRUCTION, PROFESSIONAL_ONLY_INSTRUCTION};
use crate::llm_client::CompletionClient;

const INPUT_REJECTED: &str = "Please enter professional information only";
const OUTPUT_REJECTED: &str = "Generated content is not appropriate. Please try different details.";

// ────────────────────────────────────────────────────────────────────────────
// Data models
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummarySuggestion {
    pub summary: String,
    #[serde(alias = "experienceLevel")]
    pub experience_level: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExperienceSuggestion {
    #[serde(alias = "position_Title", alias = "positionTitle", default)]
    pub position_title: String,
    /// HTML bullet points.
    #[serde(alias = "experience_bullets", default)]
    pub experience: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CoverLetterRequest {
    pub candidate_name: Option<String>,
    pub job_title: String,
    pub company_name: String,
    pub background: Option<String>,
    pub experience: Option<String>,
    pub skills: Option<String>,
    pub tone: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoverLetter {
    #[serde(alias = "coverLetter")]
    pub cover_letter: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MatchLevel {
    High,
    Medium,
    Low,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResumeScore {
    /// 0 – 100
    pub score: f64,
    #[serde(alias = "matchLevel")]
    pub match_level: MatchLevel,
    #[serde(alias = "missingKeywords", default)]
    pub missing_keywords: Vec<String>,
    #[serde(default)]
    pub tips: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum QuestionType {
    Technical,
    Behavioral,
    Situational,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InterviewQuestion {
    pub question: String,
    #[serde(alias = "type")]
    pub question_type: QuestionType,
    #[serde(alias = "suggestedAnswer")]
    pub suggested_answer: String,
}

// ────────────────────────────────────────────────────────────────────────────
// Operations
// ────────────────────────────────────────────────────────────────────────────

/// Three summaries for the job title: Mid-Level, Senior and Fresher.
pub async fn generate_summaries(
    llm: &CompletionClient,
    job_title: &str,
) -> Result<Vec<SummarySuggestion>, AppError> {
    reject_inappropriate_input(&[job_title])?;

    let prompt = with_footer(&fill_template(
        SUMMARY_PROMPT_TEMPLATE,
        &[("job_title", job_title)],
    ));
    let suggestions: Vec<SummarySuggestion> = generate_json(llm, &prompt).await?;

    info!("Generated {} summary suggestions", suggestions.len());
    Ok(suggestions)
}

/// 5–7 HTML experience bullets for a position title, with secrets redacted.
pub async fn generate_experience(
    llm: &CompletionClient,
    position_title: &str,
) -> Result<ExperienceSuggestion, AppError> {
    reject_inappropriate_input(&[position_title])?;

    let prompt = with_footer(&fill_template(
        EXPERIENCE_PROMPT_TEMPLATE,
        &[("position_title", position_title)],
    ));
    let mut suggestion: ExperienceSuggestion = generate_json(llm, &prompt).await?;

    suggestion.experience = suggestion
        .experience
        .iter()
        .map(|bullet| redact_sensitive(bullet))
        .collect();

    if suggestion.experience.is_empty() {
        return Err(AppError::Llm("No experience data generated".to_string()));
    }
    if suggestion
        .experience
        .iter()
        .any(|b| contains_inappropriate_content(b))
    {
        warn!("Rejected generated experience bullets for moderation");
        return Err(AppError::UnprocessableEntity(OUTPUT_REJECTED.to_string()));
    }
    if suggestion.position_title.is_empty() {
        suggestion.position_title = position_title.to_string();
    }

    Ok(suggestion)
}

pub async fn generate_cover_letter(
    llm: &CompletionClient,
    request: &CoverLetterRequest,
) -> Result<CoverLetter, AppError> {
    reject_inappropriate_input(&[
        request.job_title.as_str(),
        request.company_name.as_str(),
        request.background.as_deref().unwrap_or_default(),
        request.experience.as_deref().unwrap_or_default(),
    ])?;

    let prompt = build_cover_letter_prompt(request);
    let letter: CoverLetter = generate_json(llm, &prompt).await?;

    if letter.cover_letter.trim().is_empty() {
        return Err(AppError::Llm(
            "Invalid response format. Missing \"coverLetter\" field.".to_string(),
        ));
    }
    if contains_inappropriate_content(&letter.cover_letter) {
        warn!("Rejected generated cover letter for moderation");
        return Err(AppError::UnprocessableEntity(OUTPUT_REJECTED.to_string()));
    }

    Ok(letter)
}

/// Scores a résumé (any JSON shape) against a job description.
pub async fn score_resume(
    llm: &CompletionClient,
    resume: &Value,
    job_description: &str,
) -> Result<ResumeScore, AppError> {
    let resume_json = serde_json::to_string(resume)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Failed to serialize resume: {e}")))?;

    let prompt = fill_template(
        RESUME_SCORE_PROMPT_TEMPLATE,
        &[
            ("resume_json", resume_json.as_str()),
            ("job_description", job_description),
        ],
    );

    let mut score: ResumeScore = generate_json(llm, &prompt).await?;
    score.score = score.score.clamp(0.0, 100.0);
    Ok(score)
}

pub async fn interview_questions(
    llm: &CompletionClient,
    resume: &Value,
) -> Result<Vec<InterviewQuestion>, AppError> {
    let resume_json = serde_json::to_string(resume)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Failed to serialize resume: {e}")))?;

    let prompt = fill_template(
        INTERVIEW_PREP_PROMPT_TEMPLATE,
        &[("resume_json", resume_json.as_str())],
    );
    generate_json(llm, &prompt).await
}

// ────────────────────────────────────────────────────────────────────────────
// Helpers
// ────────────────────────────────────────────────────────────────────────────

/// Runs the prompt through the fallback chain and parses the reply's JSON block.
async fn generate_json<T: DeserializeOwned>(
    llm: &CompletionClient,
    prompt: &str,
) -> Result<T, AppError> {
    let text = llm.generate_text(prompt).await?;
    let json = extract_json(&text);

    serde_json::from_str(&json).map_err(|e| {
        warn!(
            "Unparseable AI response: {:?}",
            json.chars().take(120).collect::<String>()
        );
        AppError::Llm(format!("AI returned an invalid response format: {e}"))
    })
}

fn with_footer(prompt: &str) -> String {
    format!("{prompt}\n{JSON_ONLY_INSTRUCTION} {PROFESSIONAL_ONLY_INSTRUCTION}")
}

fn reject_inappropriate_input(fields: &[&str]) -> Result<(), AppError> {
    if fields.iter().any(|f| contains_inappropriate_content(f)) {
        return Err(AppError::Validation(INPUT_REJECTED.to_string()));
    }
    Ok(())
}

/// Fills the cover letter template, substituting the defaults for blank fields.
fn build_cover_letter_prompt(request: &CoverLetterRequest) -> String {
    fn or_default<'a>(value: &'a Option<String>, default: &'a str) -> &'a str {
        value
            .as_deref()
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .unwrap_or(default)
    }

    fill_template(
        COVER_LETTER_PROMPT_TEMPLATE,
        &[
            ("candidate_name", or_default(&request.candidate_name, "Applicant")),
            ("job_title", request.job_title.as_str()),
            ("company_name", request.company_name.as_str()),
            ("background", or_default(&request.background, "your background")),
            ("experience", or_default(&request.experience, "relevant experience")),
            ("skills", or_default(&request.skills, "technical skills")),
            ("tone", or_default(&request.tone, "professional")),
        ],
    )
}

/// Fills `{name}` placeholders in a single pass, so text inside a
/// substituted value is never treated as a placeholder. Unknown names are
/// left as written.
fn fill_template(template: &str, values: &[(&str, &str)]) -> String {
    static PLACEHOLDER: OnceLock<Regex> = OnceLock::new();
    let placeholder = PLACEHOLDER
        .get_or_init(|| Regex::new(r"\{(\w+)\}").expect("placeholder regex must compile"));

    placeholder
        .replace_all(template, |caps: &Captures<'_>| {
            values
                .iter()
                .find(|(name, _)| *name == &caps[1])
                .map_or_else(|| caps[0].to_string(), |(_, value)| value.to_string())
        })
        .into_owned()
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
