// Résumé generation features: summaries, experience bullets, cover letters,
// ATS scoring, interview prep.
// All LLM calls go through llm_client; nothing here talks to a provider directly.

pub mod generator;
pub mod handlers;
pub mod moderation;
pub mod prompts;
