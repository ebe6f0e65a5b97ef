//! vmconsole configuration system.
//!
//! TOML-based configuration for the console multiplexer: where the proxy
//! lives, how sessions authenticate, and the lifecycle timings. All
//! sections use `serde(default)` so partial configs work out of the box.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use vmconsole_config::{load_config, config_to_json};
//!
//! let config = load_config().expect("failed to load config");
//! let json = config_to_json(&config);
//! println!("{json}");
//! ```

pub mod schema;
pub mod toml_loader;
pub mod validation;

pub use schema::{ConsoleConfig, CONFIG_SCHEMA_VERSION};

use std::path::Path;

use vmconsole_common::ConfigError;

/// Load config from the platform default path.
///
/// Creates a commented default `config.toml` if none exists, then validates
/// the result.
pub fn load_config() -> Result<ConsoleConfig, ConfigError> {
    let config = toml_loader::load_default()?;
    validation::validate(&config)?;
    Ok(config)
}

/// Load config from an explicit path (the `--config` override).
pub fn load_config_from(path: &Path) -> Result<ConsoleConfig, ConfigError> {
    let config = toml_loader::read_config(path)?;
    validation::validate(&config)?;
    Ok(config)
}

/// Serialize a config to a pretty-printed JSON string, secrets redacted.
pub fn config_to_json(config: &ConsoleConfig) -> String {
    let mut redacted = config.clone();
    if !redacted.proxy.token.is_empty() {
        redacted.proxy.token = "[REDACTED]".into();
    }
    if !redacted.display.credential.is_empty() {
        redacted.display.credential = "[REDACTED]".into();
    }
    serde_json::to_string_pretty(&redacted)
        .unwrap_or_else(|e| format!("{{\"error\": \"failed to serialize config: {e}\"}}"))
}
