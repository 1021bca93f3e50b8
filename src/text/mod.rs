//! Response text extraction
//!
//! Pulls the first candidate's text out of a `generateContent` reply and
//! strips the lightweight markup the model likes to emit:
//! - Bold (`**text**`)
//! - Italic (`*text*`)
//! - Inline code (`` `text` ``)
//! - Links (`[label](url)`)
//!
//! Each rule is one global, non-recursive pass, applied in that order.
//! Nested or overlapping markup may keep some delimiters.

use regex::Regex;
use serde_json::Value;
use std::sync::OnceLock;

/// Prefix of the text returned when a reply cannot be read
pub const EXTRACTION_ERROR_PREFIX: &str = "Error extracting response: ";

/// Extract and clean the answer text from a raw response body
///
/// Never fails: an unreadable body yields a message starting with
/// [`EXTRACTION_ERROR_PREFIX`].
pub fn extract(raw_body: &str) -> String {
    match candidate_text(raw_body) {
        Ok(text) => strip_markup(&text),
        Err(cause) => {
            tracing::warn!("Could not extract response text: {}", cause);
            format!("{}{}", EXTRACTION_ERROR_PREFIX, cause)
        }
    }
}

/// `candidates[0].content.parts[0].text`, trimmed
///
/// Only that path is looked at; later candidates and parts may have any shape.
fn candidate_text(raw_body: &str) -> Result<String, String> {
    let response: Value = serde_json::from_str(raw_body).map_err(|e| e.to_string())?;

    let candidates = response
        .get("candidates")
        .and_then(Value::as_array)
        .ok_or_else(|| "response has no candidates field".to_string())?;
    let candidate = candidates
        .first()
        .ok_or_else(|| "response has no candidates".to_string())?;

    let parts = candidate
        .get("content")
        .and_then(|content| content.get("parts"))
        .and_then(Value::as_array)
        .ok_or_else(|| "first candidate has no content parts".to_string())?;
    let part = parts
        .first()
        .ok_or_else(|| "first candidate has no parts".to_string())?;

    let text = part
        .get("text")
        .and_then(Value::as_str)
        .ok_or_else(|| "first part has no text".to_string())?;

    Ok(text.trim().to_string())
}

fn markup_rules() -> &'static [(Regex, &'static str); 4] {
    static RULES: OnceLock<[(Regex, &'static str); 4]> = OnceLock::new();
    RULES.get_or_init(|| {
        let rule = |pattern: &str, replacement| {
            (
                Regex::new(pattern).expect("markup pattern is valid"),
                replacement,
            )
        };
        // Bold before italic so `**` pairs are consumed first
        [
            rule(r"\*\*(.*?)\*\*", "${1}"),
            rule(r"\*(.*?)\*", "${1}"),
            rule(r"`(.*?)`", "${1}"),
            rule(r"\[(.*?)\]\(.*?\)", "${1}"),
        ]
    })
}

/// Apply the four markup passes in order
pub fn strip_markup(text: &str) -> String {
    markup_rules()
        .iter()
        .fold(text.to_string(), |acc, (re, replacement)| {
            re.replace_all(&acc, *replacement).into_owned()
        })
}
