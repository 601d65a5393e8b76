use anyhow::{Context, Result};

use crate::llm_client::gemini::GEMINI_DEFAULT_MODEL;
use crate::llm_client::openai_compat::{GROQ_DEFAULT_MODEL, OPENAI_DEFAULT_MODEL};

/// Credentials and model for one provider. A missing key is not a startup
/// error: that provider just fails every call with an auth error.
#[derive(Debug, Clone)]
pub struct ProviderConfig {
    pub api_key: Option<String>,
    pub model: String,
}

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    pub groq: ProviderConfig,
    pub openai: ProviderConfig,
    pub gemini: ProviderConfig,
    pub port: u16,
    pub rust_log: String,
    /// Chat sessions untouched for this long are dropped.
    pub chat_idle_minutes: u32,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            groq: provider_from_env("GROQ_API_KEY", "GROQ_MODEL", GROQ_DEFAULT_MODEL),
            openai: provider_from_env("OPENAI_API_KEY", "OPENAI_MODEL", OPENAI_DEFAULT_MODEL),
            gemini: provider_from_env("GEMINI_API_KEY", "GEMINI_MODEL", GEMINI_DEFAULT_MODEL),
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            chat_idle_minutes: optional_env("CHAT_IDLE_MINUTES")
                .unwrap_or_else(|| "60".to_string())
                .parse::<u32>()
                .context("CHAT_IDLE_MINUTES must be a whole number of minutes")?,
        })
    }

    /// Names of the key variables that are unset, in chain order.
    pub fn missing_keys(&self) -> Vec<&'static str> {
        [
            ("GROQ_API_KEY", &self.groq),
            ("OPENAI_API_KEY", &self.openai),
            ("GEMINI_API_KEY", &self.gemini),
        ]
        .into_iter()
        .filter(|(_, p)| p.api_key.is_none())
        .map(|(name, _)| name)
        .collect()
    }

    #[cfg(test)]
    pub fn for_tests() -> Self {
        Config {
            groq: ProviderConfig {
                api_key: Some("gsk_test".to_string()),
                model: GROQ_DEFAULT_MODEL.to_string(),
            },
            openai: ProviderConfig {
                api_key: Some("sk-test".to_string()),
                model: OPENAI_DEFAULT_MODEL.to_string(),
            },
            gemini: ProviderConfig {
                api_key: None,
                model: GEMINI_DEFAULT_MODEL.to_string(),
            },
            port: 0,
            rust_log: "debug".to_string(),
            chat_idle_minutes: 60,
        }
    }
}

fn provider_from_env(key_var: &str, model_var: &str, default_model: &str) -> ProviderConfig {
    ProviderConfig {
        api_key: optional_env(key_var),
        model: optional_env(model_var).unwrap_or_else(|| default_model.to_string()),
    }
}

/// Reads `key`, treating an empty or whitespace-only value as unset.
fn optional_env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
