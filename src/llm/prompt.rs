//! Prompt construction for commit message suggestion and verification.

/// Commit types accepted by the verifier.
pub const COMMIT_TYPES: [&str; 10] = [
    "feat", "fix", "docs", "style", "refactor", "perf", "test", "build", "ci", "chore",
];

/// Maximum subject line length requested from the model.
pub const MAX_SUBJECT_LENGTH: usize = 72;

const SUGGESTION_PREAMBLE: &str = "You are an expert developer writing a Git commit message for the staged changes below.

Rules:
- Follow the Conventional Commits format: type(scope): description
- Do not use markdown. No code fences, no bold, no headings.
- The subject line must be at most 72 characters.
- Use the imperative mood (\"add\", \"fix\", \"remove\").
- For significant changes, add a body after a blank line explaining why the change was made.
- Respond with the commit message only, nothing else.";

/// A prompt ready to send: instructions, a marker line, then the payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptRequest {
    pub instruction_template: String,
    pub marker: &'static str,
    pub payload: String,
    /// Length of `payload` in characters, after truncation.
    pub truncated_payload_length: usize,
    /// Whether the payload was cut to fit.
    pub truncated: bool,
}

impl PromptRequest {
    /// Render the full prompt text.
    pub fn render(&self) -> String {
        format!("{}\n\n{}\n{}", self.instruction_template, self.marker, self.payload)
    }
}

/// Build the suggestion prompt from a staged diff.
///
/// The diff is cut at `max_diff_length` characters. The cut is a hard
/// count and may land mid-line or mid-token.
pub fn build_suggestion_prompt(diff: &str, max_diff_length: usize) -> PromptRequest {
    let (payload, truncated) = truncate_chars(diff, max_diff_length);
    PromptRequest {
        instruction_template: SUGGESTION_PREAMBLE.to_string(),
        marker: "Diff:",
        truncated_payload_length: payload.chars().count(),
        payload,
        truncated,
    }
}

/// Build the verification prompt for a pending commit message.
///
/// Commit messages are short, so the payload is sent whole.
pub fn build_verification_prompt(message: &str) -> PromptRequest {
    let instructions = format!(
        r#"You are an expert developer reviewing a Git commit message.

Check that the message follows the Conventional Commits format: type(scope): description
- type must be one of: {types}
- scope is optional and goes in parentheses
- the description follows ": " and is not empty
- the subject line is at most {max} characters

Respond ONLY with a JSON object, no markdown, no explanation:
{{"valid": true or false, "reason": "short explanation when invalid, otherwise null"}}"#,
        types = COMMIT_TYPES.join(", "),
        max = MAX_SUBJECT_LENGTH,
    );

    PromptRequest {
        instruction_template: instructions,
        marker: "Message to evaluate:",
        truncated_payload_length: message.chars().count(),
        payload: message.to_string(),
        truncated: false,
    }
}

/// First `max_chars` characters of `text`, and whether anything was cut.
fn truncate_chars(text: &str, max_chars: usize) -> (String, bool) {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => (text[..byte_idx].to_string(), true),
        None => (text.to_string(), false),
    }
}
