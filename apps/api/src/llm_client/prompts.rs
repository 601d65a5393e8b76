// Shared prompt fragments. Each feature that calls the LLM keeps its own
// prompts.rs alongside it; this file holds the cross-cutting pieces.

/// Appended to prompts whose reply is parsed as JSON.
pub const JSON_ONLY_INSTRUCTION: &str = "IMPORTANT: Return ONLY valid JSON without any \
    markdown formatting or code blocks. Do NOT include explanations or apologies.";

/// Appended to every generation prompt.
pub const PROFESSIONAL_ONLY_INSTRUCTION: &str =
    "Only generate professional, legal, and ethical content.";
