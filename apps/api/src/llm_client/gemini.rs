//! Google Gemini `generateContent` backend.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::provider::{
    CompletionProvider, ProviderError, ProviderId, Role, Turn, MAX_TOKENS, TEMPERATURE,
};

pub const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/models";
pub const GEMINI_DEFAULT_MODEL: &str = "gemini-pro";

const TOP_P: f32 = 0.95;
const TOP_K: u32 = 64;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    contents: Vec<Content<'a>>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    role: &'a str,
    parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    top_p: f32,
    top_k: u32,
    max_output_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: CandidateContent,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: String,
}

#[derive(Debug, Deserialize)]
struct GeminiErrorBody {
    error: GeminiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct GeminiErrorDetail {
    message: String,
}

#[derive(Clone)]
pub struct GeminiProvider {
    endpoint: String,
    model: String,
    api_key: Option<String>,
    client: Client,
}

impl GeminiProvider {
    pub fn new(model: impl Into<String>, api_key: Option<String>, client: Client) -> Self {
        Self {
            endpoint: GEMINI_API_BASE.to_string(),
            model: model.into(),
            api_key: api_key.filter(|k| !k.trim().is_empty()),
            client,
        }
    }

    fn url(&self) -> String {
        format!("{}/{}:generateContent", self.endpoint, self.model)
    }
}

/// Gemini names the assistant side of a conversation `model`.
fn gemini_role(role: Role) -> &'static str {
    match role {
        Role::User => "user",
        Role::Assistant => "model",
    }
}

fn build_request(turns: &[Turn]) -> GenerateContentRequest<'_> {
    GenerateContentRequest {
        contents: turns
            .iter()
            .map(|t| Content {
                role: gemini_role(t.role),
                parts: vec![Part { text: &t.content }],
            })
            .collect(),
        generation_config: GenerationConfig {
            temperature: TEMPERATURE,
            top_p: TOP_P,
            top_k: TOP_K,
            max_output_tokens: MAX_TOKENS,
        },
    }
}

/// Joins the text parts of the first candidate.
fn extract_text(body: &str) -> Result<String, ProviderError> {
    let parsed: GenerateContentResponse =
        serde_json::from_str(body).map_err(|e| ProviderError::MalformedResponse {
            provider: ProviderId::Gemini,
            message: e.to_string(),
        })?;

    parsed
        .candidates
        .into_iter()
        .next()
        .map(|c| {
            c.content
                .parts
                .into_iter()
                .map(|p| p.text)
                .collect::<String>()
        })
        .ok_or_else(|| ProviderError::MalformedResponse {
            provider: ProviderId::Gemini,
            message: "empty candidates".to_string(),
        })
}

#[async_trait]
impl CompletionProvider for GeminiProvider {
    fn id(&self) -> ProviderId {
        ProviderId::Gemini
    }

    fn model(&self) -> &str {
        &self.model
    }

    fn has_credentials(&self) -> bool {
        self.api_key.is_some()
    }

    async fn complete(&self, turns: &[Turn]) -> Result<String, ProviderError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| ProviderError::missing_key(ProviderId::Gemini))?;

        let network = |e: reqwest::Error| ProviderError::Network {
            provider: ProviderId::Gemini,
            message: e.to_string(),
        };

        let response = self
            .client
            .post(self.url())
            .header("x-goog-api-key", api_key)
            .json(&build_request(turns))
            .send()
            .await
            .map_err(network)?;

        let status = response.status();
        let body = response.text().await.map_err(network)?;

        if !status.is_success() {
            let message = serde_json::from_str::<GeminiErrorBody>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);
            return Err(ProviderError::from_status(
                ProviderId::Gemini,
                status.as_u16(),
                message,
            ));
        }

        let text = extract_text(&body)?;
        debug!("gemini ({}) returned {} chars", self.model, text.len());
        Ok(text)
    }
}
