// SPDX-FileCopyrightText: 2026 Murmur Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the Murmur drafting engine.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use serde::{Deserialize, Serialize};

/// Top-level Murmur configuration.
///
/// Every section is optional and defaults to the values the engine was tuned with.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct MurmurConfig {
    /// Process identity and logging.
    #[serde(default)]
    pub agent: AgentConfig,

    /// Batch runner and retry tuning.
    #[serde(default)]
    pub engine: EngineConfig,

    /// Credit pricing.
    #[serde(default)]
    pub credits: CreditsConfig,

    /// Upstream model rotation.
    #[serde(default)]
    pub models: ModelsConfig,

    /// Live preview typing cadence.
    #[serde(default)]
    pub preview: PreviewConfig,

    /// OpenRouter generation backend.
    #[serde(default)]
    pub openrouter: OpenRouterConfig,

    /// SQLite storage.
    #[serde(default)]
    pub storage: StorageConfig,
}

/// Process identity and logging configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AgentConfig {
    /// Display name used in logs.
    #[serde(default = "default_agent_name")]
    pub name: String,

    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            name: default_agent_name(),
            log_level: default_log_level(),
        }
    }
}

fn default_agent_name() -> String {
    "murmur".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Batch runner configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct EngineConfig {
    /// Number of targets dispatched concurrently per batch.
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    /// Retries after the first attempt before a target is recorded as failed.
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Delay before the first retry; doubles for each subsequent retry.
    #[serde(default = "default_backoff_base_ms")]
    pub backoff_base_ms: u64,

    /// Time budget of a single attempt against a regular model.
    #[serde(default = "default_attempt_timeout_secs")]
    pub attempt_timeout_secs: u64,

    /// Time budget of a single attempt against a model matching `models.slow_markers`.
    #[serde(default = "default_slow_attempt_timeout_secs")]
    pub slow_attempt_timeout_secs: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            batch_size: default_batch_size(),
            max_retries: default_max_retries(),
            backoff_base_ms: default_backoff_base_ms(),
            attempt_timeout_secs: default_attempt_timeout_secs(),
            slow_attempt_timeout_secs: default_slow_attempt_timeout_secs(),
        }
    }
}

fn default_batch_size() -> usize {
    3
}

fn default_max_retries() -> u32 {
    5
}

fn default_backoff_base_ms() -> u64 {
    1000
}

fn default_attempt_timeout_secs() -> u64 {
    45
}

fn default_slow_attempt_timeout_secs() -> u64 {
    110
}

/// Credit pricing configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct CreditsConfig {
    /// Cost of one draft of up to `long_form_threshold` paragraphs.
    #[serde(default = "default_base_unit_cost")]
    pub base_unit_cost: f64,

    /// Cost of one draft longer than `long_form_threshold` paragraphs.
    #[serde(default = "default_long_form_unit_cost")]
    pub long_form_unit_cost: f64,

    /// Paragraph count above which the long-form price applies.
    #[serde(default = "default_long_form_threshold")]
    pub long_form_threshold: u8,

    /// Warn once the balance drops below this many units.
    #[serde(default = "default_low_balance_warning_units")]
    pub low_balance_warning_units: f64,
}

impl Default for CreditsConfig {
    fn default() -> Self {
        Self {
            base_unit_cost: default_base_unit_cost(),
            long_form_unit_cost: default_long_form_unit_cost(),
            long_form_threshold: default_long_form_threshold(),
            low_balance_warning_units: default_low_balance_warning_units(),
        }
    }
}

fn default_base_unit_cost() -> f64 {
    1.0
}

fn default_long_form_unit_cost() -> f64 {
    1.5
}

fn default_long_form_threshold() -> u8 {
    3
}

fn default_low_balance_warning_units() -> f64 {
    5.0
}

/// Upstream model rotation configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ModelsConfig {
    /// Models tried in turn; attempt `k` of target `i` uses `rotation[(i + k) % len]`.
    #[serde(default = "default_rotation")]
    pub rotation: Vec<String>,

    /// Substrings marking a model as slow, granting it the longer attempt timeout.
    #[serde(default = "default_slow_markers")]
    pub slow_markers: Vec<String>,
}

impl Default for ModelsConfig {
    fn default() -> Self {
        Self {
            rotation: default_rotation(),
            slow_markers: default_slow_markers(),
        }
    }
}

fn default_rotation() -> Vec<String> {
    [
        "x-ai/grok-4-fast",
        "openai/gpt-4.1-mini",
        "meta-llama/llama-3.3-70b-instruct",
        "deepseek/deepseek-chat-v3.1",
        "qwen/qwen3-235b-a22b-2507",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

fn default_slow_markers() -> Vec<String> {
    ["gpt", "deepseek", "qwen", "235b", "70b", "gemini", "pro"]
        .into_iter()
        .map(String::from)
        .collect()
}

/// Live preview configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct PreviewConfig {
    /// Render the typing preview at all.
    #[serde(default = "default_preview_enabled")]
    pub enabled: bool,

    /// Slowest typing speed of a cadence segment.
    #[serde(default = "default_min_chars_per_sec")]
    pub min_chars_per_sec: f64,

    /// Fastest typing speed of a cadence segment.
    #[serde(default = "default_max_chars_per_sec")]
    pub max_chars_per_sec: f64,

    /// Pauses at least this long render the "thinking" ellipsis.
    #[serde(default = "default_thinking_threshold_ms")]
    pub thinking_threshold_ms: u64,
}

impl Default for PreviewConfig {
    fn default() -> Self {
        Self {
            enabled: default_preview_enabled(),
            min_chars_per_sec: default_min_chars_per_sec(),
            max_chars_per_sec: default_max_chars_per_sec(),
            thinking_threshold_ms: default_thinking_threshold_ms(),
        }
    }
}

fn default_preview_enabled() -> bool {
    true
}

fn default_min_chars_per_sec() -> f64 {
    20.0
}

fn default_max_chars_per_sec() -> f64 {
    125.0
}

fn default_thinking_threshold_ms() -> u64 {
    450
}

/// OpenRouter backend configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct OpenRouterConfig {
    /// API key. `None` falls back to the `OPENROUTER_API_KEY` environment variable.
    #[serde(default)]
    pub api_key: Option<String>,

    /// Base URL of the OpenAI-compatible API.
    #[serde(default = "default_openrouter_base_url")]
    pub base_url: String,

    /// Sampling temperature, clamped to `0.0..=2.0`.
    #[serde(default = "default_temperature")]
    pub temperature: f64,

    /// Completion token cap per draft.
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
}

impl Default for OpenRouterConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_openrouter_base_url(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
        }
    }
}

fn default_openrouter_base_url() -> String {
    "https://openrouter.ai/api/v1".to_string()
}

fn default_temperature() -> f64 {
    0.8
}

fn default_max_tokens() -> u32 {
    1200
}

/// Storage backend configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_database_path")]
    pub database_path: String,

    /// Enable WAL journal mode.
    #[serde(default = "default_wal_mode")]
    pub wal_mode: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            wal_mode: default_wal_mode(),
        }
    }
}

fn default_database_path() -> String {
    dirs::data_local_dir()
        .map(|d| d.join("murmur").join("murmur.db"))
        .unwrap_or_else(|| std::path::PathBuf::from("murmur.db"))
        .display()
        .to_string()
}

fn default_wal_mode() -> bool {
    true
}
