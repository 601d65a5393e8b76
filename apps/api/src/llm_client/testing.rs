//! Test doubles used by unit tests across the crate.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::{http::StatusCode, Router};

use super::provider::{CompletionProvider, ProviderError, ProviderId, Turn};

/// Replays a fixed sequence of results and records every call. Once the
/// script runs out, the last result is repeated.
pub struct ScriptedProvider {
    id: ProviderId,
    script: Mutex<VecDeque<Result<String, ProviderError>>>,
    fallback: Result<String, (u16, String)>,
    calls: Mutex<Vec<Vec<Turn>>>,
}

impl ScriptedProvider {
    pub fn scripted(id: ProviderId, script: Vec<Result<String, ProviderError>>) -> Arc<Self> {
        let fallback = match script.last() {
            Some(Ok(text)) => Ok(text.clone()),
            Some(Err(e)) => Err((500, e.to_string())),
            None => Ok(String::new()),
        };
        Arc::new(Self {
            id,
            script: Mutex::new(script.into()),
            fallback,
            calls: Mutex::new(Vec::new()),
        })
    }

    pub fn ok(id: ProviderId, text: &str) -> Arc<Self> {
        Self::scripted(id, vec![Ok(text.to_string())])
    }

    pub fn failing(id: ProviderId, error: ProviderError) -> Arc<Self> {
        Self::scripted(id, vec![Err(error)])
    }

    pub fn calls(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn last_turns(&self) -> Vec<Turn> {
        self.calls.lock().unwrap().last().cloned().unwrap_or_default()
    }
}

pub fn network_error(id: ProviderId, message: &str) -> ProviderError {
    ProviderError::Network {
        provider: id,
        message: message.to_string(),
    }
}

#[async_trait]
impl CompletionProvider for ScriptedProvider {
    fn id(&self) -> ProviderId {
        self.id
    }

    fn model(&self) -> &str {
        "scripted"
    }

    fn has_credentials(&self) -> bool {
        true
    }

    async fn complete(&self, turns: &[Turn]) -> Result<String, ProviderError> {
        self.calls.lock().unwrap().push(turns.to_vec());

        let next = self.script.lock().unwrap().pop_front();
        match next {
            Some(result) => result,
            None => self.fallback.clone().map_err(|(status, message)| ProviderError::Api {
                provider: self.id,
                status,
                message,
            }),
        }
    }
}

/// Answers every request with `status` and `body` from a local port.
/// Returns the server's base URL.
pub async fn serve_fixed(status: u16, body: &'static str) -> String {
    let status = StatusCode::from_u16(status).unwrap();
    let app = Router::new().fallback(move || async move { (status, body) });

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move { axum::serve(listener, app).await.unwrap() });

    format!("http://{addr}")
}
