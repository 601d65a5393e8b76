//! Chat-completions backend for OpenAI and OpenAI-compatible APIs (Groq).

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::provider::{CompletionProvider, ProviderError, ProviderId, Turn, MAX_TOKENS, TEMPERATURE};

pub const GROQ_API_URL: &str = "https://api.groq.com/openai/v1/chat/completions";
pub const GROQ_DEFAULT_MODEL: &str = "llama-3.3-70b-versatile";

pub const OPENAI_API_URL: &str = "https://api.openai.com/v1/chat/completions";
pub const OPENAI_DEFAULT_MODEL: &str = "gpt-3.5-turbo";

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    message: String,
}

/// A chat-completions endpoint authenticated with a bearer token.
#[derive(Clone)]
pub struct OpenAiCompatible {
    id: ProviderId,
    endpoint: String,
    model: String,
    api_key: Option<String>,
    client: Client,
}

impl OpenAiCompatible {
    pub fn new(
        id: ProviderId,
        endpoint: impl Into<String>,
        model: impl Into<String>,
        api_key: Option<String>,
        client: Client,
    ) -> Self {
        Self {
            id,
            endpoint: endpoint.into(),
            model: model.into(),
            api_key: api_key.filter(|k| !k.trim().is_empty()),
            client,
        }
    }

    pub fn groq(model: impl Into<String>, api_key: Option<String>, client: Client) -> Self {
        Self::new(ProviderId::Groq, GROQ_API_URL, model, api_key, client)
    }

    pub fn openai(model: impl Into<String>, api_key: Option<String>, client: Client) -> Self {
        Self::new(ProviderId::OpenAi, OPENAI_API_URL, model, api_key, client)
    }

    fn build_request<'a>(&'a self, turns: &'a [Turn]) -> ChatCompletionRequest<'a> {
        ChatCompletionRequest {
            model: &self.model,
            messages: turns
                .iter()
                .map(|t| ChatMessage {
                    role: t.role.as_str(),
                    content: &t.content,
                })
                .collect(),
            temperature: TEMPERATURE,
            max_tokens: MAX_TOKENS,
        }
    }
}

/// Unwraps `choices[0].message.content`. A null content is an empty reply,
/// not a failure.
fn extract_text(id: ProviderId, body: &str) -> Result<String, ProviderError> {
    let parsed: ChatCompletionResponse =
        serde_json::from_str(body).map_err(|e| ProviderError::MalformedResponse {
            provider: id,
            message: e.to_string(),
        })?;

    parsed
        .choices
        .into_iter()
        .next()
        .map(|c| c.message.content.unwrap_or_default())
        .ok_or_else(|| ProviderError::MalformedResponse {
            provider: id,
            message: "empty choices array".to_string(),
        })
}

fn error_message(body: String) -> String {
    serde_json::from_str::<ApiErrorBody>(&body)
        .map(|e| e.error.message)
        .unwrap_or(body)
}

#[async_trait]
impl CompletionProvider for OpenAiCompatible {
    fn id(&self) -> ProviderId {
        self.id
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
            .ok_or_else(|| ProviderError::missing_key(self.id))?;

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(api_key)
            .json(&self.build_request(turns))
            .send()
            .await
            .map_err(|e| ProviderError::Network {
                provider: self.id,
                message: e.to_string(),
            })?;

        let status = response.status();
        let body = response.text().await.map_err(|e| ProviderError::Network {
            provider: self.id,
            message: e.to_string(),
        })?;

        if !status.is_success() {
            return Err(ProviderError::from_status(
                self.id,
                status.as_u16(),
                error_message(body),
            ));
        }

        let text = extract_text(self.id, &body)?;
        debug!("{} ({}) returned {} chars", self.id, self.model, text.len());
        Ok(text)
    }
}
