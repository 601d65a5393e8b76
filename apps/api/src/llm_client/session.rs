//! Stateful chat on top of the fallback chain.
//!
//! A session owns one transcript and sends the whole of it, plus the new
//! prompt, to whichever provider is being tried. The transcript is shared by
//! every provider: if the chain falls back mid-conversation, the answering
//! provider sees assistant turns written by a different provider. That mix is
//! kept as-is.
//!
//! `send_message` takes `&mut self`, so one session has exactly one writer.
//! Callers that share a session across tasks must hand it over rather than
//! lock around it (see `chat::store`).

use serde::Serialize;
use tracing::info;

use super::provider::{ProviderId, Turn};
use super::{run_chain, LlmError, ProviderChain};

/// A successful chat exchange.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatReply {
    pub text: String,
    pub provider: ProviderId,
}

pub struct ChatSession {
    providers: ProviderChain,
    transcript: Vec<Turn>,
}

impl ChatSession {
    pub(crate) fn new(providers: ProviderChain) -> Self {
        Self {
            providers,
            transcript: Vec::new(),
        }
    }

    /// Sends `prompt` with the full transcript. On success both the prompt and
    /// the cleaned reply are appended; on failure the transcript is unchanged.
    pub async fn send_message(&mut self, prompt: &str) -> Result<ChatReply, LlmError> {
        let mut turns = Vec::with_capacity(self.transcript.len() + 1);
        turns.extend_from_slice(&self.transcript);
        turns.push(Turn::user(prompt));

        let (text, provider) = run_chain(&self.providers, &turns).await?;

        self.transcript.push(Turn::user(prompt));
        self.transcript.push(Turn::assistant(text.clone()));
        info!(
            "chat reply from {provider}; transcript now {} turns",
            self.transcript.len()
        );

        Ok(ChatReply { text, provider })
    }

    /// Forgets every turn. The next message is sent on its own.
    pub fn clear_history(&mut self) {
        self.transcript.clear();
    }

    pub fn transcript(&self) -> &[Turn] {
        &self.transcript
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::super::provider::{CompletionProvider, ProviderError, Role};
    use super::super::testing::{network_error, ScriptedProvider};
    use super::super::CompletionClient;
    use super::*;

    fn session(providers: &[&Arc<ScriptedProvider>]) -> ChatSession {
        CompletionClient::new(
            providers
                .iter()
                .map(|p| Arc::clone(p) as Arc<dyn CompletionProvider>)
                .collect(),
        )
        .create_chat_session()
    }

    #[tokio::test]
    async fn test_successful_exchange_appends_two_turns() {
        let groq = ScriptedProvider::ok(ProviderId::Groq, "```json\n[\"a\"]\n```");
        let mut chat = session(&[&groq]);

        let reply = chat.send_message("Job Title: Engineer").await.unwrap();

        assert_eq!(reply.text, "[\"a\"]");
        assert_eq!(reply.provider, ProviderId::Groq);
        assert_eq!(
            chat.transcript(),
            &[Turn::user("Job Title: Engineer"), Turn::assistant("[\"a\"]")]
        );
    }

    #[tokio::test]
    async fn test_history_is_sent_with_each_message() {
        let groq = ScriptedProvider::scripted(
            ProviderId::Groq,
            vec![Ok("first".into()), Ok("second".into())],
        );
        let mut chat = session(&[&groq]);

        chat.send_message("one").await.unwrap();
        chat.send_message("two").await.unwrap();

        let sent = groq.last_turns();
        assert_eq!(sent.len(), 3);
        assert_eq!(sent[0], Turn::user("one"));
        assert_eq!(sent[1], Turn::assistant("first"));
        assert_eq!(sent[2], Turn::user("two"));
        assert_eq!(chat.transcript().len(), 4);
    }

    #[tokio::test]
    async fn test_clear_history_sends_single_turn_next() {
        let groq = ScriptedProvider::ok(ProviderId::Groq, "reply");
        let mut chat = session(&[&groq]);

        chat.send_message("one").await.unwrap();
        chat.send_message("two").await.unwrap();
        chat.clear_history();
        assert!(chat.transcript().is_empty());

        chat.send_message("three").await.unwrap();
        assert_eq!(groq.last_turns(), vec![Turn::user("three")]);
    }

    #[tokio::test]
    async fn test_fallback_provider_sees_shared_transcript() {
        let groq = ScriptedProvider::scripted(
            ProviderId::Groq,
            vec![Ok("from groq".into()), Err(network_error(ProviderId::Groq, "timeout"))],
        );
        let openai = ScriptedProvider::ok(ProviderId::OpenAi, "from openai");
        let mut chat = session(&[&groq, &openai]);

        chat.send_message("one").await.unwrap();
        let reply = chat.send_message("two").await.unwrap();

        assert_eq!(reply.provider, ProviderId::OpenAi);
        let sent = openai.last_turns();
        assert_eq!(sent.len(), 3);
        assert_eq!(sent[1], Turn::assistant("from groq"));
        // Turns from both providers now sit in one transcript.
        let assistants: Vec<_> = chat
            .transcript()
            .iter()
            .filter(|t| t.role == Role::Assistant)
            .map(|t| t.content.as_str())
            .collect();
        assert_eq!(assistants, vec!["from groq", "from openai"]);
    }

    #[tokio::test]
    async fn test_total_failure_leaves_transcript_unchanged() {
        let groq = ScriptedProvider::scripted(
            ProviderId::Groq,
            vec![Ok("ok".into()), Err(network_error(ProviderId::Groq, "down"))],
        );
        let gemini = ScriptedProvider::failing(ProviderId::Gemini, ProviderError::missing_key(ProviderId::Gemini));
        let mut chat = session(&[&groq, &gemini]);

        chat.send_message("one").await.unwrap();
        let err = chat.send_message("two").await.unwrap_err();

        assert!(matches!(err, LlmError::AllProvidersFailed(ref f) if f.len() == 2));
        assert_eq!(chat.transcript().len(), 2);
    }

    #[tokio::test]
    async fn test_sessions_from_one_client_are_independent() {
        let groq = ScriptedProvider::ok(ProviderId::Groq, "reply");
        let client = CompletionClient::new(vec![Arc::clone(&groq) as Arc<dyn CompletionProvider>]);

        let mut first = client.create_chat_session();
        let mut second = client.create_chat_session();
        first.send_message("a").await.unwrap();
        second.send_message("b").await.unwrap();

        assert_eq!(groq.last_turns(), vec![Turn::user("b")]);
        assert_eq!(first.transcript().len(), 2);
    }
}
