//! Provider abstraction shared by every completion backend.
//!
//! A provider turns an ordered list of chat turns into a single text reply.
//! Vendor request/response shapes stay inside each implementation; the
//! fallback chain only ever sees `CompletionProvider`.

use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Sampling temperature sent to every provider.
pub const TEMPERATURE: f32 = 1.0;
/// Output token ceiling sent to every provider.
pub const MAX_TOKENS: u32 = 8192;

/// Identity of a provider in the fallback chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderId {
    Groq,
    OpenAi,
    Gemini,
}

impl ProviderId {
    pub fn as_str(self) -> &'static str {
        match self {
            ProviderId::Groq => "groq",
            ProviderId::OpenAi => "openai",
            ProviderId::Gemini => "gemini",
        }
    }

    /// Parses a path segment such as `groq` or `OpenAI`.
    pub fn parse(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "groq" => Some(ProviderId::Groq),
            "openai" => Some(ProviderId::OpenAi),
            "gemini" => Some(ProviderId::Gemini),
            _ => None,
        }
    }
}

impl fmt::Display for ProviderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

/// One entry of a conversation transcript.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    pub role: Role,
    pub content: String,
}

impl Turn {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// A single provider's failure. The fallback chain treats every variant the
/// same way: record it and move on to the next provider.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("{provider}: authentication failed: {message}")]
    Auth { provider: ProviderId, message: String },

    #[error("{provider}: rate limited: {message}")]
    RateLimited { provider: ProviderId, message: String },

    #[error("{provider}: network error: {message}")]
    Network { provider: ProviderId, message: String },

    #[error("{provider}: API error (status {status}): {message}")]
    Api {
        provider: ProviderId,
        status: u16,
        message: String,
    },

    #[error("{provider}: malformed response: {message}")]
    MalformedResponse { provider: ProviderId, message: String },
}

impl ProviderError {
    pub fn provider(&self) -> ProviderId {
        match self {
            ProviderError::Auth { provider, .. }
            | ProviderError::RateLimited { provider, .. }
            | ProviderError::Network { provider, .. }
            | ProviderError::Api { provider, .. }
            | ProviderError::MalformedResponse { provider, .. } => *provider,
        }
    }

    pub fn missing_key(provider: ProviderId) -> Self {
        ProviderError::Auth {
            provider,
            message: "no API key configured".to_string(),
        }
    }

    /// Classifies a non-success HTTP status returned by a provider.
    pub fn from_status(provider: ProviderId, status: u16, message: String) -> Self {
        match status {
            401 | 403 => ProviderError::Auth { provider, message },
            429 => ProviderError::RateLimited { provider, message },
            _ => ProviderError::Api {
                provider,
                status,
                message,
            },
        }
    }
}

/// The single capability every backend implements.
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    fn id(&self) -> ProviderId;

    fn model(&self) -> &str;

    /// Whether a credential is present. Calls without one fail with `Auth`.
    fn has_credentials(&self) -> bool;

    /// Sends `turns` in order and returns the reply text, unmodified.
    async fn complete(&self, turns: &[Turn]) -> Result<String, ProviderError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_id_parse_is_case_insensitive() {
        assert_eq!(ProviderId::parse("OpenAI"), Some(ProviderId::OpenAi));
        assert_eq!(ProviderId::parse("groq"), Some(ProviderId::Groq));
        assert_eq!(ProviderId::parse("GEMINI"), Some(ProviderId::Gemini));
        assert_eq!(ProviderId::parse("anthropic"), None);
    }

    #[test]
    fn test_status_classification() {
        let auth = ProviderError::from_status(ProviderId::Groq, 401, "bad key".into());
        assert!(matches!(auth, ProviderError::Auth { .. }));

        let limited = ProviderError::from_status(ProviderId::OpenAi, 429, "slow down".into());
        assert!(matches!(limited, ProviderError::RateLimited { .. }));

        let other = ProviderError::from_status(ProviderId::Gemini, 500, "boom".into());
        assert!(matches!(other, ProviderError::Api { status: 500, .. }));
        assert_eq!(other.provider(), ProviderId::Gemini);
    }

    #[test]
    fn test_error_message_names_provider() {
        let err = ProviderError::Network {
            provider: ProviderId::Groq,
            message: "timeout".into(),
        };
        assert_eq!(err.to_string(), "groq: network error: timeout");
    }

    #[test]
    fn test_turn_serializes_lowercase_role() {
        let json = serde_json::to_value(Turn::assistant("hi")).unwrap();
        assert_eq!(json["role"], "assistant");
        assert_eq!(json["content"], "hi");
    }
}
