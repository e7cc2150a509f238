// SPDX-FileCopyrightText: 2026 Murmur Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration for the Murmur drafting engine.
//!
//! Layered TOML loading through figment (defaults, system file, user file,
//! working directory, `MURMUR_*` environment), strict key checking, a
//! semantic validation pass, and miette diagnostics for everything that
//! goes wrong.
//!
//! ```no_run
//! match murmur_config::load_and_validate() {
//!     Ok(config) => println!("batch size {}", config.engine.batch_size),
//!     Err(errors) => murmur_config::render_errors(&errors),
//! }
//! ```

pub mod diagnostic;
pub mod loader;
pub mod model;
pub mod validation;

use std::path::Path;

pub use diagnostic::{ConfigError, ConfigSource, render_errors};
pub use loader::{load_config, load_config_from_path, load_config_from_str};
pub use model::MurmurConfig;

/// Load from the standard locations and validate.
pub fn load_and_validate() -> Result<MurmurConfig, Vec<ConfigError>> {
    finish(loader::load_config(), standard_sources)
}

/// Load from an explicit file (environment overrides still apply) and validate.
pub fn load_and_validate_path(path: &Path) -> Result<MurmurConfig, Vec<ConfigError>> {
    finish(loader::load_config_from_path(path), || {
        ConfigSource::read(path).into_iter().collect()
    })
}

/// Load from a TOML string and validate.
pub fn load_and_validate_str(toml_content: &str) -> Result<MurmurConfig, Vec<ConfigError>> {
    finish(loader::load_config_from_str(toml_content), || {
        vec![ConfigSource::new("<inline>", toml_content)]
    })
}

/// Validate a loaded config, or turn the load error into diagnostics.
///
/// Sources are only read when there is an error to point into.
fn finish(
    loaded: Result<MurmurConfig, figment::Error>,
    sources: impl FnOnce() -> Vec<ConfigSource>,
) -> Result<MurmurConfig, Vec<ConfigError>> {
    let config = loaded.map_err(|err| diagnostic::figment_to_config_errors(err, &sources()))?;
    validation::validate_config(&config)?;
    Ok(config)
}

/// Every config file the standard lookup may have merged.
fn standard_sources() -> Vec<ConfigSource> {
    let mut candidates = vec![Path::new(loader::SYSTEM_CONFIG_PATH).to_path_buf()];
    if let Some(dir) = dirs::config_dir() {
        candidates.push(dir.join("murmur").join("murmur.toml"));
    }
    if let Ok(cwd) = std::env::current_dir() {
        candidates.push(cwd.join("murmur.toml"));
    }
    candidates.iter().filter_map(|p| ConfigSource::read(p)).collect()
}
