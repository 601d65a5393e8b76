use std::sync::Arc;

use crate::chat::store::SessionStore;
use crate::llm_client::CompletionClient;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub llm: Arc<CompletionClient>,
    /// Chat sessions created through the API. In-memory only.
    pub sessions: SessionStore,
}

impl AppState {
    pub fn new(llm: CompletionClient) -> Self {
        Self {
            llm: Arc::new(llm),
            sessions: SessionStore::new(),
        }
    }
}
