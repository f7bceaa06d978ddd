//! JSON extraction from model output.
//!
//! Models asked for "only JSON" still wrap it in markdown fences or lead
//! with a sentence of prose. Extraction accepts both, and only reports
//! failure when no JSON object is present at all.

use serde_json::Value;

/// Remove a surrounding markdown code fence, if any.
///
/// Handles ```` ```json ```` and bare ```` ``` ```` fences. A missing
/// closing fence (output cut off by the token limit) still strips the
/// opening one.
pub fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };

    // Skip the info string (`json`, `JSON`, ...) up to the end of the line.
    let body = match rest.find('\n') {
        Some(newline) => &rest[newline + 1..],
        None => rest.trim_start_matches(|c: char| c.is_ascii_alphabetic()),
    };

    body.trim_end()
        .strip_suffix("```")
        .unwrap_or(body)
        .trim()
}

/// Locate the JSON object in a model response.
///
/// Tries, in order:
/// 1. The fence-stripped text, if it parses as JSON
/// 2. The first balanced `{...}` that parses, scanning past leading prose
///
/// Returns `None` when neither yields valid JSON.
pub fn extract_json(response: &str) -> Option<&str> {
    let unfenced = strip_code_fence(response);
    if serde_json::from_str::<Value>(unfenced).is_ok() {
        return Some(unfenced);
    }

    find_json_object(response, None)
}

/// Like [`extract_json`], but when prose holds several objects, prefer the
/// first one with a top-level `key`. Models quote examples before answering.
pub fn extract_json_with_key<'a>(response: &'a str, key: &str) -> Option<&'a str> {
    let unfenced = strip_code_fence(response);
    if serde_json::from_str::<Value>(unfenced).is_ok() {
        return Some(unfenced);
    }

    find_json_object(response, Some(key))
}

/// First top-level balanced object in `text` that parses. With `key`, the
/// first such object containing it wins, falling back to the first object.
fn find_json_object<'a>(text: &'a str, key: Option<&str>) -> Option<&'a str> {
    let mut first = None;
    let mut from = 0;

    while let Some(offset) = text[from..].find('{') {
        let start = from + offset;
        let parsed = balanced_braces(&text[start..]).and_then(|candidate| {
            serde_json::from_str::<Value>(candidate)
                .ok()
                .map(|value| (candidate, value))
        });

        let Some((candidate, value)) = parsed else {
            from = start + 1;
            continue;
        };

        match key {
            Some(key) if value.get(key).is_none() => {
                first.get_or_insert(candidate);
            }
            _ => return Some(candidate),
        }
        // Nested objects belong to this one; resume after it.
        from = start + candidate.len();
    }

    first
}

/// Prefix of `text` (starting at `{`) up to its matching `}`.
///
/// Braces inside JSON string literals, escaped quotes included, do not
/// count toward the depth.
fn balanced_braces(text: &str) -> Option<&str> {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escape_next = false;

    for (idx, ch) in text.char_indices() {
        if escape_next {
            escape_next = false;
            continue;
        }

        match ch {
            '\\' if in_string => escape_next = true,
            '"' => in_string = !in_string,
            '{' if !in_string => depth += 1,
            '}' if !in_string => {
                depth = depth.checked_sub(1)?;
                if depth == 0 {
                    return Some(&text[..=idx]);
                }
            }
            _ => {}
        }
    }

    None
}
