// SPDX-FileCopyrightText: 2026 Murmur Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Integration tests for the Murmur configuration system.

use murmur_config::diagnostic::ConfigError;
use murmur_config::model::MurmurConfig;
use murmur_config::{load_and_validate_path, load_and_validate_str, load_config_from_str};

#[test]
fn full_toml_deserializes() {
    let toml = r#"
[agent]
name = "drafting-box"
log_level = "debug"

[engine]
batch_size = 4
max_retries = 2
backoff_base_ms = 250
attempt_timeout_secs = 30
slow_attempt_timeout_secs = 90

[credits]
base_unit_cost = 2.0
long_form_unit_cost = 3.0
long_form_threshold = 4

[models]
rotation = ["a/fast", "b/slow-70b"]
slow_markers = ["70b"]

[preview]
enabled = false
min_chars_per_sec = 10.0
max_chars_per_sec = 50.0

[openrouter]
api_key = "sk-or-test"
base_url = "http://localhost:9999/v1"

[storage]
database_path = "/tmp/murmur-test.db"
wal_mode = false
"#;

    let config = load_config_from_str(toml).expect("valid TOML should deserialize");
    assert_eq!(config.agent.name, "drafting-box");
    assert_eq!(config.engine.batch_size, 4);
    assert_eq!(config.engine.max_retries, 2);
    assert_eq!(config.engine.backoff_base_ms, 250);
    assert_eq!(config.credits.long_form_threshold, 4);
    assert_eq!(config.models.rotation, vec!["a/fast", "b/slow-70b"]);
    assert!(!config.preview.enabled);
    assert_eq!(config.openrouter.api_key.as_deref(), Some("sk-or-test"));
    assert!(!config.storage.wal_mode);
}

#[test]
fn empty_toml_uses_defaults() {
    let config = load_and_validate_str("").expect("defaults validate");
    let defaults = MurmurConfig::default();
    assert_eq!(config.engine.batch_size, 3);
    assert_eq!(config.engine.max_retries, 5);
    assert_eq!(config.engine.backoff_base_ms, 1000);
    assert_eq!(config.credits.base_unit_cost, 1.0);
    assert_eq!(config.credits.long_form_unit_cost, 1.5);
    assert_eq!(config.models.rotation, defaults.models.rotation);
}

#[test]
fn unknown_key_gets_suggestion_and_span() {
    let toml = "[engine]\nbacth_size = 4\n";
    let errors = load_and_validate_str(toml).expect_err("unknown key");
    let unknown = errors
        .iter()
        .find_map(|e| match e {
            ConfigError::UnknownKey {
                key,
                suggestion,
                span,
                ..
            } => Some((key.clone(), suggestion.clone(), *span)),
            _ => None,
        })
        .expect("an UnknownKey error");
    assert_eq!(unknown.0, "bacth_size");
    assert_eq!(unknown.1.as_deref(), Some("batch_size"));
    assert!(unknown.2.is_some(), "inline source should resolve a span");
}

#[test]
fn unknown_section_is_rejected() {
    let errors = load_and_validate_str("[telegram]\nbot_token = \"x\"\n").expect_err("unknown");
    assert!(
        errors
            .iter()
            .any(|e| matches!(e, ConfigError::UnknownKey { key, .. } if key == "telegram"))
    );
}

#[test]
fn wrong_type_is_reported() {
    let errors =
        load_and_validate_str("[engine]\nbatch_size = \"three\"\n").expect_err("wrong type");
    assert!(
        errors
            .iter()
            .any(|e| matches!(e, ConfigError::InvalidType { key, .. } if key.contains("batch_size")))
    );
}

#[test]
fn validation_runs_after_successful_parse() {
    let errors = load_and_validate_str("[engine]\nbatch_size = 0\n").expect_err("invalid");
    assert!(
        errors
            .iter()
            .any(|e| matches!(e, ConfigError::Validation { message } if message.contains("batch_size")))
    );
}

#[test]
fn loads_from_explicit_path() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("murmur.toml");
    std::fs::write(&path, "[credits]\nbase_unit_cost = 0.5\n").expect("write");
    let config = load_and_validate_path(&path).expect("valid file");
    assert_eq!(config.credits.base_unit_cost, 0.5);
}
