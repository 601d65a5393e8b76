//! Content moderation for generation inputs and outputs.
//!
//! Two independent checks:
//! - `contains_inappropriate_content`: blocks job titles and letters that
//!   reference criminal or adult roles, checked both before and after the LLM call.
//! - `redact_sensitive`: scrubs anything shaped like an API key or token out
//!   of generated text before it is returned.

use std::sync::OnceLock;

use regex::Regex;

const BLOCKED_KEYWORDS: &[&str] = &[
    "robber",
    "thief",
    "burglar",
    "criminal",
    "scammer",
    "fraud",
    "sex worker",
    "prostitute",
    "escort",
    "stripper",
    "drug dealer",
    "smuggler",
    "hitman",
    "assassin",
    "hacker",
    "terrorist",
    "trafficker",
    "pimp",
    "killer",
    "murderer",
    "gangster",
    "mafia",
];

/// Case-insensitive substring match against the blocked keyword list.
pub fn contains_inappropriate_content(text: &str) -> bool {
    let lower = text.to_lowercase();
    BLOCKED_KEYWORDS.iter().any(|k| lower.contains(k))
}

/// `(pattern, replacement)` pairs, applied in order.
fn redaction_rules() -> &'static [(Regex, &'static str)] {
    static RULES: OnceLock<Vec<(Regex, &'static str)>> = OnceLock::new();
    RULES.get_or_init(|| {
        [
            // Long opaque runs first, then known key prefixes, then JWTs.
            (r"[A-Za-z0-9_-]{30,}", "[REDACTED]"),
            (r"\bsk-[A-Za-z0-9_-]+", "[API_KEY_REDACTED]"),
            (r"\bAIza[A-Za-z0-9_-]+", "[API_KEY_REDACTED]"),
            (r"\bgsk_[A-Za-z0-9_-]+", "[API_KEY_REDACTED]"),
            (
                r"\beyJ[A-Za-z0-9_-]+\.[A-Za-z0-9_-]+\.[A-Za-z0-9_-]+",
                "[TOKEN_REDACTED]",
            ),
        ]
        .into_iter()
        // Static patterns; compiling them cannot fail.
        .map(|(pattern, replacement)| {
            (
                Regex::new(pattern).expect("moderation: static regex pattern must compile"),
                replacement,
            )
        })
        .collect()
    })
}

/// Replaces key- and token-shaped substrings with placeholders.
pub fn redact_sensitive(text: &str) -> String {
    redaction_rules()
        .iter()
        .fold(text.to_string(), |acc, (re, replacement)| {
            re.replace_all(&acc, *replacement).into_owned()
        })
}
