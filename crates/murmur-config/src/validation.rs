// SPDX-FileCopyrightText: 2026 Murmur Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Collects every violation instead of failing on the first one.

use crate::diagnostic::ConfigError;
use crate::model::MurmurConfig;

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Validate a deserialized configuration for semantic correctness.
pub fn validate_config(config: &MurmurConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();
    let mut fail = |message: String| errors.push(ConfigError::Validation { message });

    if !LOG_LEVELS.contains(&config.agent.log_level.as_str()) {
        fail(format!(
            "agent.log_level `{}` must be one of {}",
            config.agent.log_level,
            LOG_LEVELS.join(", ")
        ));
    }

    let engine = &config.engine;
    if engine.batch_size == 0 {
        fail("engine.batch_size must be at least 1".to_string());
    }
    if engine.attempt_timeout_secs == 0 || engine.slow_attempt_timeout_secs == 0 {
        fail("engine attempt timeouts must be greater than zero".to_string());
    }
    if engine.slow_attempt_timeout_secs < engine.attempt_timeout_secs {
        fail(format!(
            "engine.slow_attempt_timeout_secs ({}) must not be shorter than engine.attempt_timeout_secs ({})",
            engine.slow_attempt_timeout_secs, engine.attempt_timeout_secs
        ));
    }
    // 2^(max_retries-1) * base must stay representable.
    if engine.max_retries > 20 {
        fail(format!(
            "engine.max_retries must be at most 20, got {}",
            engine.max_retries
        ));
    }

    let credits = &config.credits;
    for (key, value) in [
        ("credits.base_unit_cost", credits.base_unit_cost),
        ("credits.long_form_unit_cost", credits.long_form_unit_cost),
    ] {
        if !value.is_finite() || value <= 0.0 {
            fail(format!("{key} must be a positive number, got {value}"));
        }
    }
    if credits.low_balance_warning_units < 0.0 {
        fail(format!(
            "credits.low_balance_warning_units must be non-negative, got {}",
            credits.low_balance_warning_units
        ));
    }

    if config.models.rotation.iter().any(|m| m.trim().is_empty()) {
        fail("models.rotation must not contain empty model names".to_string());
    }

    let preview = &config.preview;
    if preview.min_chars_per_sec <= 0.0 || preview.max_chars_per_sec < preview.min_chars_per_sec
    {
        fail(format!(
            "preview speeds must satisfy 0 < min_chars_per_sec <= max_chars_per_sec, got {}..{}",
            preview.min_chars_per_sec, preview.max_chars_per_sec
        ));
    }

    if !(0.0..=2.0).contains(&config.openrouter.temperature) {
        fail(format!(
            "openrouter.temperature must be within 0.0..=2.0, got {}",
            config.openrouter.temperature
        ));
    }
    if !config.openrouter.base_url.starts_with("http://")
        && !config.openrouter.base_url.starts_with("https://")
    {
        fail(format!(
            "openrouter.base_url `{}` must be an http(s) URL",
            config.openrouter.base_url
        ));
    }

    if config.storage.database_path.trim().is_empty() {
        fail("storage.database_path must not be empty".to_string());
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn messages(config: &MurmurConfig) -> Vec<String> {
        validate_config(config)
            .unwrap_err()
            .into_iter()
            .map(|e| e.to_string())
            .collect()
    }

    #[test]
    fn default_config_validates() {
        assert!(validate_config(&MurmurConfig::default()).is_ok());
    }

    #[test]
    fn zero_batch_size_fails() {
        let mut config = MurmurConfig::default();
        config.engine.batch_size = 0;
        assert!(messages(&config).iter().any(|m| m.contains("batch_size")));
    }

    #[test]
    fn non_positive_cost_fails() {
        let mut config = MurmurConfig::default();
        config.credits.long_form_unit_cost = 0.0;
        assert!(
            messages(&config)
                .iter()
                .any(|m| m.contains("long_form_unit_cost"))
        );
    }

    #[test]
    fn collects_all_errors() {
        let mut config = MurmurConfig::default();
        config.engine.batch_size = 0;
        config.storage.database_path = " ".to_string();
        config.agent.log_level = "loud".to_string();
        assert_eq!(messages(&config).len(), 3);
    }

    #[test]
    fn parsed_partial_config_validates() {
        let toml_str = r#"
[engine]
batch_size = 5

[models]
rotation = ["model-a", "model-b"]
"#;
        let config: MurmurConfig = toml::from_str(toml_str).unwrap();
        assert!(validate_config(&config).is_ok());
        assert_eq!(config.engine.batch_size, 5);
        assert_eq!(config.engine.max_retries, 5);
    }

    #[test]
    fn blank_model_name_from_toml_fails() {
        let toml_str = r#"
[models]
rotation = ["model-a", "  "]
"#;
        let config: MurmurConfig = toml::from_str(toml_str).unwrap();
        assert!(messages(&config).iter().any(|m| m.contains("models.rotation")));
    }

    #[test]
    fn unknown_section_is_rejected_by_parser() {
        let result = toml::from_str::<MurmurConfig>("[telemetry]\nenabled = true\n");
        assert!(result.is_err());
    }

    #[test]
    fn inverted_preview_speeds_fail() {
        let mut config = MurmurConfig::default();
        config.preview.min_chars_per_sec = 200.0;
        assert!(messages(&config).iter().any(|m| m.contains("preview")));
    }
}
