/// LLM Client: the single point of entry for every completion call in the service.
///
/// No other module talks to a provider API directly. Requests run through a
/// fixed fallback chain (Groq, then OpenAI, then Gemini): each provider is
/// tried once, in order, and the first success wins. Only when every provider
/// has failed does the caller see an error, and that error names each
/// provider's failure in call order.
use std::sync::Arc;

use reqwest::Client;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, error, warn};

pub mod clean;
pub mod gemini;
pub mod openai_compat;
pub mod prompts;
pub mod provider;
pub mod session;

#[cfg(test)]
pub mod testing;

use crate::config::Config;
use clean::clean_response;
use gemini::GeminiProvider;
use openai_compat::OpenAiCompatible;
pub use provider::{CompletionProvider, ProviderError, ProviderId, Turn};
pub use session::ChatSession;

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("AI Error: All providers failed. {}", join_failures(.0))]
    AllProvidersFailed(Vec<ProviderError>),

    #[error("provider {0} is not part of the fallback chain")]
    UnknownProvider(ProviderId),

    #[error(transparent)]
    Provider(#[from] ProviderError),
}

fn join_failures(failures: &[ProviderError]) -> String {
    if failures.is_empty() {
        return "No providers configured".to_string();
    }
    failures
        .iter()
        .map(ProviderError::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Public view of one link in the chain.
#[derive(Debug, Clone, Serialize)]
pub struct ProviderStatus {
    pub provider: ProviderId,
    pub model: String,
    pub configured: bool,
}

/// An ordered list of providers shared by the client and its chat sessions.
pub(crate) type ProviderChain = Arc<[Arc<dyn CompletionProvider>]>;

/// Runs `turns` through the chain. Returns the first reply (cleaned) with the
/// provider that produced it. Empty text is a success.
pub(crate) async fn run_chain(
    providers: &[Arc<dyn CompletionProvider>],
    turns: &[Turn],
) -> Result<(String, ProviderId), LlmError> {
    let mut failures = Vec::with_capacity(providers.len());

    for provider in providers {
        match provider.complete(turns).await {
            Ok(raw) => {
                debug!(
                    "{} answered after {} failed provider(s)",
                    provider.id(),
                    failures.len()
                );
                return Ok((clean_response(&raw), provider.id()));
            }
            Err(e) => {
                warn!("{} failed, trying next provider: {e}", provider.id());
                failures.push(e);
            }
        }
    }

    let err = LlmError::AllProvidersFailed(failures);
    error!("{err}");
    Err(err)
}

/// The completion client used by every feature in the service.
#[derive(Clone)]
pub struct CompletionClient {
    providers: ProviderChain,
}

impl CompletionClient {
    /// Builds a client that tries `providers` in the given order.
    pub fn new(providers: Vec<Arc<dyn CompletionProvider>>) -> Self {
        Self {
            providers: providers.into(),
        }
    }

    /// Builds the production chain: Groq, OpenAI, Gemini.
    pub fn from_config(config: &Config) -> Self {
        let http = Client::new();
        Self::new(vec![
            Arc::new(OpenAiCompatible::groq(
                config.groq.model.clone(),
                config.groq.api_key.clone(),
                http.clone(),
            )),
            Arc::new(OpenAiCompatible::openai(
                config.openai.model.clone(),
                config.openai.api_key.clone(),
                http.clone(),
            )),
            Arc::new(GeminiProvider::new(
                config.gemini.model.clone(),
                config.gemini.api_key.clone(),
                http,
            )),
        ])
    }

    /// One-shot completion for a single prompt, cleaned.
    pub async fn generate_text(&self, prompt: &str) -> Result<String, LlmError> {
        let turns = [Turn::user(prompt)];
        run_chain(&self.providers, &turns)
            .await
            .map(|(text, _)| text)
    }

    /// Starts an empty conversation backed by this client's chain.
    pub fn create_chat_session(&self) -> ChatSession {
        ChatSession::new(Arc::clone(&self.providers))
    }

    /// Calls one named provider directly: no fallback, no cleaning.
    pub async fn generate_with(&self, id: ProviderId, prompt: &str) -> Result<String, LlmError> {
        let provider = self
            .providers
            .iter()
            .find(|p| p.id() == id)
            .ok_or(LlmError::UnknownProvider(id))?;

        Ok(provider.complete(&[Turn::user(prompt)]).await?)
    }

    pub fn providers(&self) -> Vec<ProviderStatus> {
        self.providers
            .iter()
            .map(|p| ProviderStatus {
                provider: p.id(),
                model: p.model().to_string(),
                configured: p.has_credentials(),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::testing::{network_error, ScriptedProvider};
    use super::*;

    fn client(providers: &[&Arc<ScriptedProvider>]) -> CompletionClient {
        CompletionClient::new(
            providers
                .iter()
                .map(|p| Arc::clone(p) as Arc<dyn CompletionProvider>)
                .collect(),
        )
    }

    #[tokio::test]
    async fn test_first_provider_success_skips_the_rest() {
        let groq = ScriptedProvider::ok(ProviderId::Groq, "```json\n{\"a\":1}\n```");
        let openai = ScriptedProvider::ok(ProviderId::OpenAi, "unused");
        let gemini = ScriptedProvider::ok(ProviderId::Gemini, "unused");

        let text = client(&[&groq, &openai, &gemini])
            .generate_text("Generate a summary")
            .await
            .unwrap();

        assert_eq!(text, "{\"a\":1}");
        assert_eq!(groq.calls(), 1);
        assert_eq!(openai.calls(), 0);
        assert_eq!(gemini.calls(), 0);
    }

    #[tokio::test]
    async fn test_falls_back_to_second_provider() {
        let groq = ScriptedProvider::failing(ProviderId::Groq, network_error(ProviderId::Groq, "timeout"));
        let openai = ScriptedProvider::ok(ProviderId::OpenAi, "```json\n[\"x\",\"y\"]\n```");
        let gemini = ScriptedProvider::ok(ProviderId::Gemini, "unused");

        let text = client(&[&groq, &openai, &gemini])
            .generate_text("Generate a summary")
            .await
            .unwrap();

        assert_eq!(text, "[\"x\",\"y\"]");
        assert_eq!(groq.calls(), 1);
        assert_eq!(openai.calls(), 1);
        assert_eq!(gemini.calls(), 0);
    }

    #[tokio::test]
    async fn test_falls_back_to_third_provider() {
        let groq = ScriptedProvider::failing(ProviderId::Groq, ProviderError::missing_key(ProviderId::Groq));
        let openai = ScriptedProvider::failing(
            ProviderId::OpenAi,
            ProviderError::from_status(ProviderId::OpenAi, 429, "quota".into()),
        );
        let gemini = ScriptedProvider::ok(ProviderId::Gemini, "  Seasoned engineer.\n");

        let text = client(&[&groq, &openai, &gemini])
            .generate_text("prompt")
            .await
            .unwrap();

        assert_eq!(text, "Seasoned engineer.");
        assert_eq!(gemini.calls(), 1);
    }

    #[tokio::test]
    async fn test_all_failures_reported_in_call_order() {
        let groq = ScriptedProvider::failing(ProviderId::Groq, network_error(ProviderId::Groq, "timeout"));
        let openai = ScriptedProvider::failing(
            ProviderId::OpenAi,
            ProviderError::from_status(ProviderId::OpenAi, 401, "Incorrect API key".into()),
        );
        let gemini = ScriptedProvider::failing(
            ProviderId::Gemini,
            ProviderError::MalformedResponse {
                provider: ProviderId::Gemini,
                message: "empty candidates".into(),
            },
        );

        let err = client(&[&groq, &openai, &gemini])
            .generate_text("prompt")
            .await
            .unwrap_err();

        let message = err.to_string();
        assert!(message.starts_with("AI Error: All providers failed."));
        let a = message.find("timeout").unwrap();
        let b = message.find("Incorrect API key").unwrap();
        let c = message.find("empty candidates").unwrap();
        assert!(a < b && b < c, "failures out of order: {message}");

        match err {
            LlmError::AllProvidersFailed(failures) => {
                let ids: Vec<_> = failures.iter().map(ProviderError::provider).collect();
                assert_eq!(ids, vec![ProviderId::Groq, ProviderId::OpenAi, ProviderId::Gemini]);
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!((groq.calls(), openai.calls(), gemini.calls()), (1, 1, 1));
    }

    #[tokio::test]
    async fn test_empty_reply_is_a_success() {
        let groq = ScriptedProvider::ok(ProviderId::Groq, "   ");
        let openai = ScriptedProvider::ok(ProviderId::OpenAi, "unused");

        let text = client(&[&groq, &openai]).generate_text("prompt").await.unwrap();

        assert_eq!(text, "");
        assert_eq!(openai.calls(), 0);
    }

    #[tokio::test]
    async fn test_generate_text_sends_single_user_turn() {
        let groq = ScriptedProvider::ok(ProviderId::Groq, "ok");
        client(&[&groq]).generate_text("hello").await.unwrap();
        assert_eq!(groq.last_turns(), vec![Turn::user("hello")]);
    }

    #[tokio::test]
    async fn test_failed_chain_can_be_restarted_from_first_provider() {
        let groq = ScriptedProvider::scripted(
            ProviderId::Groq,
            vec![Err(network_error(ProviderId::Groq, "down")), Ok("back".into())],
        );
        let openai = ScriptedProvider::failing(ProviderId::OpenAi, network_error(ProviderId::OpenAi, "down"));
        let client = client(&[&groq, &openai]);

        assert!(client.generate_text("p").await.is_err());
        assert_eq!(client.generate_text("p").await.unwrap(), "back");
        assert_eq!(groq.calls(), 2);
        assert_eq!(openai.calls(), 1);
    }

    #[tokio::test]
    async fn test_generate_with_returns_raw_text_without_fallback() {
        let groq = ScriptedProvider::failing(ProviderId::Groq, network_error(ProviderId::Groq, "down"));
        let openai = ScriptedProvider::ok(ProviderId::OpenAi, "```json\n[]\n```");
        let client = client(&[&groq, &openai]);

        let raw = client.generate_with(ProviderId::OpenAi, "p").await.unwrap();
        assert_eq!(raw, "```json\n[]\n```");
        assert_eq!(groq.calls(), 0);

        let err = client.generate_with(ProviderId::Groq, "p").await.unwrap_err();
        assert!(matches!(err, LlmError::Provider(ProviderError::Network { .. })));

        let err = client.generate_with(ProviderId::Gemini, "p").await.unwrap_err();
        assert!(matches!(err, LlmError::UnknownProvider(ProviderId::Gemini)));
    }

    #[tokio::test]
    async fn test_empty_chain_fails() {
        let err = CompletionClient::new(vec![]).generate_text("p").await.unwrap_err();
        assert!(matches!(err, LlmError::AllProvidersFailed(ref f) if f.is_empty()));
    }

    #[test]
    fn test_from_config_builds_chain_in_priority_order() {
        let config = Config::for_tests();
        let statuses = CompletionClient::from_config(&config).providers();
        let ids: Vec<_> = statuses.iter().map(|s| s.provider).collect();

        assert_eq!(ids, vec![ProviderId::Groq, ProviderId::OpenAi, ProviderId::Gemini]);
        assert_eq!(statuses[0].model, "llama-3.3-70b-versatile");
        assert!(statuses[0].configured);
        assert!(!statuses[2].configured);
    }
}
