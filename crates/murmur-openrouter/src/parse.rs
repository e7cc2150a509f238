// SPDX-FileCopyrightText: 2026 Murmur Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Lenient extraction of `{subject, message}` from a model reply.
//!
//! Models wrap JSON in code fences, leave trailing commas, or skip JSON
//! altogether. Strict parsing is tried on the cleaned reply first, then a
//! field-by-field regex scan. A reply without both fields is a parse error,
//! which the caller retries.

use std::sync::LazyLock;

use murmur_core::{GeneratedDraft, MurmurError};
use regex::Regex;
use serde::Deserialize;

static FENCE_OPEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^```(?:json)?\s*").expect("fence pattern is valid"));
static FENCE_CLOSE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s*```$").expect("fence pattern is valid"));
static TRAILING_COMMA: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r",(\s*[}\]])").expect("comma pattern is valid"));
static EM_DASH: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s*\u{2014}\s*").expect("dash pattern is valid"));

static SUBJECT_FIELD: LazyLock<FieldPatterns> = LazyLock::new(|| FieldPatterns::new("subject"));
static MESSAGE_FIELD: LazyLock<FieldPatterns> = LazyLock::new(|| FieldPatterns::new("message"));

const SIGN_OFFS: &[&str] = &[
    "best",
    "best regards",
    "kind regards",
    "regards",
    "thanks",
    "thank you",
    "many thanks",
    "cheers",
    "sincerely",
    "warmly",
    "all the best",
];

#[derive(Deserialize)]
struct RawDraft {
    subject: Option<String>,
    message: Option<String>,
}

struct FieldPatterns {
    double_quoted: Regex,
    single_quoted: Regex,
    bare: Regex,
}

impl FieldPatterns {
    fn new(field: &str) -> Self {
        let key = format!(r#"(?is)["']?{field}["']?\s*:\s*"#);
        Self {
            double_quoted: Regex::new(&format!(r#"{key}"((?:[^"\\]|\\.)*)""#))
                .expect("field pattern is valid"),
            single_quoted: Regex::new(&format!(r#"{key}'((?:[^'\\]|\\.)*)'"#))
                .expect("field pattern is valid"),
            bare: Regex::new(&format!(r#"(?i)["']?{field}["']?\s*:\s*([^,\n\r{{}}]+)"#))
                .expect("field pattern is valid"),
        }
    }

    fn extract(&self, text: &str) -> Option<String> {
        [&self.double_quoted, &self.single_quoted, &self.bare]
            .into_iter()
            .find_map(|re| re.captures(text))
            .map(|caps| decode_escapes(&caps[1]))
            .filter(|v| !v.is_empty())
    }
}

/// Parse a raw model reply into a draft for a sender named `sender_name`.
pub fn parse_draft_response(raw: &str, sender_name: &str) -> Result<GeneratedDraft, MurmurError> {
    let (subject, message) = match parse_json(raw) {
        Some(draft) => (draft.subject, draft.message),
        None => {
            let normalized = normalize_punctuation(raw);
            let message = MESSAGE_FIELD
                .extract(&normalized)
                .unwrap_or_else(|| raw.trim().to_string());
            (SUBJECT_FIELD.extract(&normalized), Some(message))
        }
    };

    let subject = subject
        .map(|s| remove_em_dashes(s.trim()))
        .filter(|s| !s.is_empty());
    let message = message
        .map(|m| strip_signature(&remove_em_dashes(&m), sender_name))
        .filter(|m| !m.is_empty());

    match (subject, message) {
        (Some(subject), Some(message)) => Ok(GeneratedDraft { subject, message }),
        _ => Err(MurmurError::Parse(
            "reply is missing a subject or message".into(),
        )),
    }
}

fn parse_json(raw: &str) -> Option<RawDraft> {
    let cleaned = FENCE_OPEN.replace(raw.trim(), "");
    let cleaned = FENCE_CLOSE.replace(&cleaned, "");
    let cleaned = TRAILING_COMMA.replace_all(&cleaned, "$1");
    let start = cleaned.find('{')?;
    let end = cleaned.rfind('}')?;
    if end < start {
        return None;
    }
    serde_json::from_str(&cleaned[start..=end]).ok()
}

fn normalize_punctuation(text: &str) -> String {
    text.chars()
        .map(|c| match c {
            '\u{201C}' | '\u{201D}' => '"',
            '\u{2018}' | '\u{2019}' => '\'',
            '\u{2010}'..='\u{2015}' => '-',
            other => other,
        })
        .collect()
}

fn decode_escapes(value: &str) -> String {
    value
        .replace("\\n", "\n")
        .replace("\\r", "")
        .replace("\\t", "\t")
        .replace("\\\"", "\"")
        .replace("\\\\", "\\")
        .trim()
        .to_string()
}

fn remove_em_dashes(text: &str) -> String {
    EM_DASH.replace_all(text, ", ").into_owned()
}

/// Drop a trailing sender-name line and the sign-off right above it.
fn strip_signature(message: &str, sender_name: &str) -> String {
    let mut lines: Vec<&str> = message.trim_end().lines().collect();
    let sender = sender_name.trim().to_lowercase();

    if !sender.is_empty()
        && lines
            .last()
            .is_some_and(|l| bare(l).to_lowercase() == sender)
    {
        lines.pop();
        while lines.last().is_some_and(|l| l.trim().is_empty()) {
            lines.pop();
        }
        if lines
            .last()
            .is_some_and(|l| SIGN_OFFS.contains(&bare(l).to_lowercase().as_str()))
        {
            lines.pop();
        }
    }
    lines.join("\n").trim().to_string()
}

fn bare(line: &str) -> &str {
    line.trim().trim_end_matches([',', '.', '!'])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_json() {
        let draft =
            parse_draft_response(r#"{"subject": "Hi", "message": "Body text"}"#, "Sam").unwrap();
        assert_eq!(draft.subject, "Hi");
        assert_eq!(draft.message, "Body text");
    }

    #[test]
    fn fenced_json_with_trailing_comma() {
        let raw = "```json\n{\"subject\": \"Show in May\", \"message\": \"Hello there\",}\n```";
        let draft = parse_draft_response(raw, "Sam").unwrap();
        assert_eq!(draft.subject, "Show in May");
        assert_eq!(draft.message, "Hello there");
    }

    #[test]
    fn json_surrounded_by_chatter() {
        let raw = "Sure! Here it is:\n{\"subject\": \"A\", \"message\": \"B\"}\nHope that helps.";
        let draft = parse_draft_response(raw, "Sam").unwrap();
        assert_eq!(draft.subject, "A");
        assert_eq!(draft.message, "B");
    }

    #[test]
    fn regex_fallback_on_broken_json() {
        let raw = "subject: \u{201C}Quick question\u{201D}\nmessage: \"Line one\\nLine two\" and then {";
        let draft = parse_draft_response(raw, "Sam").unwrap();
        assert_eq!(draft.subject, "Quick question");
        assert_eq!(draft.message, "Line one\nLine two");
    }

    #[test]
    fn bare_subject_uses_whole_reply_as_message() {
        let raw = "Subject: Hello Ada\n\nI loved your last record";
        let draft = parse_draft_response(raw, "Sam").unwrap();
        assert_eq!(draft.subject, "Hello Ada");
        assert!(draft.message.contains("I loved your last record"));
    }

    #[test]
    fn missing_subject_is_a_parse_error() {
        let err = parse_draft_response("just some prose", "Sam").unwrap_err();
        assert!(matches!(err, MurmurError::Parse(_)));
        assert!(err.is_transient());
    }

    #[test]
    fn em_dashes_become_commas() {
        let raw = r#"{"subject": "One — two", "message": "We play loud—and late."}"#;
        let draft = parse_draft_response(raw, "Sam").unwrap();
        assert_eq!(draft.subject, "One, two");
        assert_eq!(draft.message, "We play loud, and late.");
    }

    #[test]
    fn echoed_signature_is_removed() {
        let raw = r#"{"subject": "Hi", "message": "Would love to play.\n\nBest,\nSam Sender"}"#;
        let draft = parse_draft_response(raw, "Sam Sender").unwrap();
        assert_eq!(draft.message, "Would love to play.");
    }

    #[test]
    fn sign_off_without_name_is_kept() {
        let raw = r#"{"subject": "Hi", "message": "Would love to play.\n\nThanks,"}"#;
        let draft = parse_draft_response(raw, "Sam").unwrap();
        assert_eq!(draft.message, "Would love to play.\n\nThanks,");
    }
}
