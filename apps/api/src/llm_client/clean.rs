//! Output cleaning for provider replies.
//!
//! Models wrap JSON in markdown fences often enough that every reply is run
//! through `clean_response` before it reaches a caller. `extract_json` is the
//! optional second step for callers that expect a JSON document. Neither is a
//! parser: the result is cleaned text, not validated JSON.

use std::sync::OnceLock;

use regex::Regex;

const FENCE: &str = "```";

fn json_fence() -> &'static Regex {
    static JSON_FENCE: OnceLock<Regex> = OnceLock::new();
    // Static pattern; compiling it cannot fail.
    JSON_FENCE.get_or_init(|| Regex::new(r"(?i)```json").expect("json fence regex must compile"))
}

/// Removes ```` ```json ```` (any case) and ```` ``` ```` fences, then trims
/// surrounding whitespace. Idempotent: after the bare-fence pass no run of
/// three backticks survives.
pub fn clean_response(text: &str) -> String {
    json_fence()
        .replace_all(text, "")
        .replace(FENCE, "")
        .trim()
        .to_string()
}

/// Cleans `text` and narrows it to the first balanced `{...}` or `[...]`
/// block. Falls back to the whole cleaned string when no block balances.
pub fn extract_json(text: &str) -> String {
    let cleaned = clean_response(text);
    match find_balanced_block(&cleaned) {
        Some(block) => block.to_string(),
        None => cleaned,
    }
}

fn find_balanced_block(text: &str) -> Option<&str> {
    text.char_indices()
        .filter(|(_, c)| *c == '{' || *c == '[')
        .find_map(|(start, _)| balanced_end(&text[start..]).map(|len| &text[start..start + len]))
}

/// Byte length of the balanced block opening at the start of `text`.
/// Brackets inside string literals are ignored.
fn balanced_end(text: &str) -> Option<usize> {
    let mut closers: Vec<char> = Vec::new();
    let mut in_string = false;
    let mut escaped = false;

    for (i, c) in text.char_indices() {
        if in_string {
            match c {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }

        match c {
            '"' => in_string = true,
            '{' => closers.push('}'),
            '[' => closers.push(']'),
            '}' | ']' => {
                if closers.pop() != Some(c) {
                    return None;
                }
                if closers.is_empty() {
                    return Some(i + c.len_utf8());
                }
            }
            _ => {}
        }
    }

    None
}
