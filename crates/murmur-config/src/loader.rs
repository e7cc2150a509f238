// SPDX-FileCopyrightText: 2026 Murmur Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Layered config loading with Figment.
//!
//! Lookup order: `/etc/murmur/murmur.toml`, then `~/.config/murmur/murmur.toml`,
//! then `./murmur.toml`, with `MURMUR_` environment variables applied last.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::Path;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};

use crate::model::MurmurConfig;

pub(crate) const SYSTEM_CONFIG_PATH: &str = "/etc/murmur/murmur.toml";

/// Sections whose env var prefix maps onto a dotted figment key.
const SECTIONS: &[&str] = &[
    "agent",
    "engine",
    "credits",
    "models",
    "preview",
    "openrouter",
    "storage",
];

/// Load configuration from the standard XDG hierarchy with env var overrides.
pub fn load_config() -> Result<MurmurConfig, figment::Error> {
    build_figment().extract()
}

/// Load configuration from a TOML string only (no XDG lookup, no env).
pub fn load_config_from_str(toml_content: &str) -> Result<MurmurConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(MurmurConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<MurmurConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(MurmurConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// The full layered Figment, before extraction.
pub fn build_figment() -> Figment {
    Figment::new()
        .merge(Serialized::defaults(MurmurConfig::default()))
        .merge(Toml::file(SYSTEM_CONFIG_PATH))
        .merge(Toml::file(
            dirs::config_dir()
                .map(|d| d.join("murmur/murmur.toml"))
                .unwrap_or_default(),
        ))
        .merge(Toml::file("murmur.toml"))
        .merge(env_provider())
}

/// Environment provider mapping `MURMUR_<SECTION>_<KEY>` to `section.key`.
///
/// Uses `Env::map()` rather than `Env::split("_")` because keys themselves
/// contain underscores (`MURMUR_ENGINE_BACKOFF_BASE_MS` is `engine.backoff_base_ms`).
fn env_provider() -> Env {
    Env::prefixed("MURMUR_").map(|key| map_env_key(key.as_str()).into())
}

fn map_env_key(key: &str) -> String {
    for section in SECTIONS {
        if let Some(rest) = key
            .strip_prefix(section)
            .and_then(|r| r.strip_prefix('_'))
        {
            return format!("{section}.{rest}");
        }
    }
    key.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn env_keys_map_onto_sections() {
        assert_eq!(map_env_key("engine_batch_size"), "engine.batch_size");
        assert_eq!(
            map_env_key("engine_backoff_base_ms"),
            "engine.backoff_base_ms"
        );
        assert_eq!(map_env_key("openrouter_api_key"), "openrouter.api_key");
        assert_eq!(map_env_key("unrelated"), "unrelated");
    }

    #[test]
    fn env_override_wins_over_file() {
        figment::Jail::expect_with(|jail| {
            jail.create_file("murmur.toml", "[engine]\nbatch_size = 4\n")?;
            jail.set_env("MURMUR_ENGINE_BATCH_SIZE", "6");
            let config = load_config_from_path(Path::new("murmur.toml"))?;
            assert_eq!(config.engine.batch_size, 6);
            Ok(())
        });
    }
}
