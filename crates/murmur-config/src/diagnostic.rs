// SPDX-FileCopyrightText: 2026 Murmur Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Turns figment errors into miette diagnostics.
//!
//! Unknown keys get a "did you mean" hint (Jaro-Winkler via `strsim`) and,
//! when the offending file is known, a labelled span pointing at the key.

#![allow(unused_assignments)] // miette's Diagnostic derive generates code triggering this lint

use figment::error::{Error as FigmentError, Kind};
use miette::{Diagnostic, GraphicalReportHandler, NamedSource, SourceSpan};
use thiserror::Error;

/// Suggestions below this similarity are noise.
const SUGGESTION_THRESHOLD: f64 = 0.75;

/// A TOML document the configuration was (or may have been) loaded from.
#[derive(Debug, Clone)]
pub struct ConfigSource {
    pub name: String,
    pub content: String,
}

impl ConfigSource {
    pub fn new(name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            content: content.into(),
        }
    }

    /// Read `path`, or `None` if it does not exist or is unreadable.
    pub fn read(path: &std::path::Path) -> Option<Self> {
        let content = std::fs::read_to_string(path).ok()?;
        Some(Self::new(path.display().to_string(), content))
    }
}

#[derive(Debug, Error, Diagnostic)]
pub enum ConfigError {
    #[error("unknown configuration key `{key}`")]
    #[diagnostic(
        code(murmur::config::unknown_key),
        help("{}", unknown_key_help(suggestion.as_deref(), valid_keys))
    )]
    UnknownKey {
        key: String,
        suggestion: Option<String>,
        valid_keys: String,
        #[label("not a recognized key here")]
        span: Option<SourceSpan>,
        #[source_code]
        src: Option<NamedSource<String>>,
    },

    #[error("invalid type for `{key}`: found {found}")]
    #[diagnostic(code(murmur::config::invalid_type), help("expected {expected}"))]
    InvalidType {
        key: String,
        found: String,
        expected: String,
    },

    #[error("missing required key `{key}`")]
    #[diagnostic(code(murmur::config::missing_key), help("set `{key}` in murmur.toml"))]
    MissingKey { key: String },

    /// Parsed fine but breaks a constraint checked after loading.
    #[error("validation error: {message}")]
    #[diagnostic(code(murmur::config::validation))]
    Validation { message: String },

    #[error("configuration error: {0}")]
    #[diagnostic(code(murmur::config::other))]
    Other(String),
}

fn unknown_key_help(suggestion: Option<&str>, valid_keys: &str) -> String {
    match suggestion {
        Some(s) => format!("did you mean `{s}`? Valid keys: {valid_keys}"),
        None => format!("valid keys: {valid_keys}"),
    }
}

impl ConfigError {
    fn from_figment(error: &FigmentError, sources: &[ConfigSource]) -> Self {
        match &error.kind {
            Kind::UnknownField(field, expected) => {
                let (span, src) = match source_for(error, sources) {
                    Some(source) => {
                        let section = error.path.first().map(String::as_str);
                        let span = locate_key(&source.content, section, field)
                            .map(|offset| SourceSpan::new(offset.into(), field.len()));
                        let src = span.map(|_| {
                            NamedSource::new(source.name.clone(), source.content.clone())
                        });
                        (span, src)
                    }
                    None => (None, None),
                };
                ConfigError::UnknownKey {
                    key: field.clone(),
                    suggestion: suggest_key(field, expected),
                    valid_keys: expected.join(", "),
                    span,
                    src,
                }
            }
            Kind::MissingField(field) => ConfigError::MissingKey {
                key: dotted(&error.path, field),
            },
            Kind::InvalidType(found, expected) => ConfigError::InvalidType {
                key: error.path.join("."),
                found: found.to_string(),
                expected: expected.clone(),
            },
            _ => ConfigError::Other(error.to_string()),
        }
    }
}

/// Convert every error figment collected into a diagnostic.
pub fn figment_to_config_errors(err: FigmentError, sources: &[ConfigSource]) -> Vec<ConfigError> {
    err.into_iter()
        .map(|e| ConfigError::from_figment(&e, sources))
        .collect()
}

fn dotted(path: &[String], field: &str) -> String {
    if path.is_empty() {
        field.to_string()
    } else {
        format!("{}.{field}", path.join("."))
    }
}

/// The source an error came from. Inline strings have no path, so a lone source is assumed.
fn source_for<'a>(error: &FigmentError, sources: &'a [ConfigSource]) -> Option<&'a ConfigSource> {
    let file = error
        .metadata
        .as_ref()
        .and_then(|m| m.source.as_ref())
        .and_then(|s| match s {
            figment::Source::File(path) => Some(path.display().to_string()),
            _ => None,
        });
    match file {
        Some(name) => sources.iter().find(|s| s.name == name),
        None if sources.len() == 1 => sources.first(),
        None => None,
    }
}

/// Byte offset of `key` in `content`.
///
/// With a `section`, only lines between `[section]` and the next header are
/// searched. Without one, a top-level `key = ...` line or a `[key]` header
/// both count.
pub fn locate_key(content: &str, section: Option<&str>, key: &str) -> Option<usize> {
    let mut in_scope = section.is_none();
    let mut offset = 0;
    for line in content.split_inclusive('\n') {
        let indent = line.len() - line.trim_start().len();
        let trimmed = line.trim();
        if let Some(header) = trimmed.strip_prefix('[').and_then(|h| h.strip_suffix(']')) {
            let header = header.trim();
            match section {
                Some(wanted) => in_scope = header == wanted,
                None if header == key => {
                    let bracket = line.find(key).unwrap_or(indent);
                    return Some(offset + bracket);
                }
                None => in_scope = false,
            }
        } else if in_scope
            && let Some(rest) = trimmed.strip_prefix(key)
            && rest.trim_start().starts_with('=')
        {
            return Some(offset + indent);
        }
        offset += line.len();
    }
    None
}

/// Closest valid key to `unknown`, if any is similar enough.
pub fn suggest_key(unknown: &str, valid_keys: &[&str]) -> Option<String> {
    valid_keys
        .iter()
        .map(|key| (strsim::jaro_winkler(unknown, key), *key))
        .filter(|(score, _)| *score > SUGGESTION_THRESHOLD)
        .max_by(|a, b| a.0.total_cmp(&b.0))
        .map(|(_, key)| key.to_string())
}

/// Print each error to stderr with miette's graphical report handler.
pub fn render_errors(errors: &[ConfigError]) {
    let handler = GraphicalReportHandler::new();
    for error in errors {
        let mut out = String::new();
        match handler.render_report(&mut out, error as &dyn Diagnostic) {
            Ok(()) => eprint!("{out}"),
            Err(_) => eprintln!("error: {error}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn suggests_close_key() {
        let valid = ["batch_size", "max_retries", "backoff_base_ms"];
        assert_eq!(suggest_key("bacth_size", &valid).as_deref(), Some("batch_size"));
        assert_eq!(suggest_key("zzzzzz", &valid), None);
    }

    #[test]
    fn locates_key_inside_its_section_only() {
        let content = "[agent]\nbacth_size = 1\n\n[engine]\nmax_retries = 2\nbacth_size = 4\n";
        let offset = locate_key(content, Some("engine"), "bacth_size").unwrap();
        assert_eq!(&content[offset..offset + 14], "bacth_size = 4");
        assert_eq!(locate_key(content, Some("preview"), "bacth_size"), None);
    }

    #[test]
    fn locates_unknown_section_header() {
        let content = "[engine]\nbatch_size = 3\n\n[telegram]\nbot_token = \"x\"\n";
        let offset = locate_key(content, None, "telegram").unwrap();
        assert_eq!(&content[offset..offset + 8], "telegram");
    }

    #[test]
    fn crlf_offsets_are_byte_accurate() {
        let content = "[engine]\r\nmax_retries = 2\r\n  bacth_size = 4\r\n";
        let offset = locate_key(content, Some("engine"), "bacth_size").unwrap();
        assert_eq!(&content[offset..offset + 10], "bacth_size");
    }

    #[test]
    fn dotted_key_names() {
        assert_eq!(dotted(&[], "agent"), "agent");
        assert_eq!(dotted(&["engine".into()], "batch_size"), "engine.batch_size");
    }
}
