//! Best-effort recovery of a JSON object from loosely structured model output.
//!
//! Models are told to answer with JSON only, but they still prepend commentary,
//! wrap the answer in code fences, or stop mid-object when they run out of
//! tokens. Recovery tries, in order:
//!
//! 1. strip a leading/trailing code fence and whitespace;
//! 2. parse the whole remainder;
//! 3. scan for bracket-balanced `{...}` candidates and parse each in turn.
//!
//! Step 3 is a heuristic, not a parser: the scanner tracks brace depth and
//! skips braces inside JSON strings, which is enough for the objects models
//! emit. `None` means nothing usable was found; the caller picks the fallback.

use serde_json::Value;

/// Returns the first JSON object recoverable from `text`.
pub fn recover_json(text: &str) -> Option<Value> {
    let text = strip_json_fences(text);
    if text.is_empty() {
        return None;
    }

    if let Some(value) = parse_object(text) {
        return Some(value);
    }

    brace_candidates(text).into_iter().find_map(parse_object)
}

fn parse_object(candidate: &str) -> Option<Value> {
    match serde_json::from_str::<Value>(candidate) {
        Ok(value @ Value::Object(_)) => Some(value),
        _ => None,
    }
}

/// Strips ```json ... ``` or ``` ... ``` code fences from LLM output.
/// Leading and trailing markers are handled independently so a truncated
/// reply that lost its closing fence still gets its opening one removed.
pub fn strip_json_fences(text: &str) -> &str {
    let mut text = text.trim();
    if let Some(rest) = text.strip_prefix("```") {
        text = rest
            .strip_prefix("json")
            .or_else(|| rest.strip_prefix("JSON"))
            .unwrap_or(rest);
    }
    if let Some(rest) = text.strip_suffix("```") {
        text = rest;
    }
    text.trim()
}

/// Non-overlapping balanced `{...}` slices, in order of appearance.
///
/// An opening brace that never closes (truncated output) is skipped so that
/// complete objects nested after it can still be found.
fn brace_candidates(text: &str) -> Vec<&str> {
    let bytes = text.as_bytes();
    let mut candidates = Vec::new();
    let mut pos = 0;

    while let Some(offset) = text[pos..].find('{') {
        let start = pos + offset;
        match balanced_len(&bytes[start..]) {
            Some(len) => {
                candidates.push(&text[start..start + len]);
                pos = start + len;
            }
            None => pos = start + 1,
        }
    }

    candidates
}

/// Length of the object opening at `bytes[0]`, or `None` if it never closes.
/// Byte-level scanning is UTF-8 safe: every byte we react to is ASCII.
fn balanced_len(bytes: &[u8]) -> Option<usize> {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (i, &b) in bytes.iter().enumerate() {
        if in_string {
            if escaped {
                escaped = false;
            } else if b == b'\\' {
                escaped = true;
            } else if b == b'"' {
                in_string = false;
            }
            continue;
        }

        match b {
            b'"' => in_string = true,
            b'{' => depth += 1,
            b'}' => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    return Some(i + 1);
                }
            }
            _ => {}
        }
    }

    None
}
