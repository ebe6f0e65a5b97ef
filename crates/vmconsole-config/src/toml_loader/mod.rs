//! Reading `config.toml`, and writing the commented default on first run.

mod template;

#[cfg(test)]
mod tests;

use std::fs::OpenOptions;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use tracing::{debug, info};
use vmconsole_common::ConfigError;

use crate::schema::ConsoleConfig;

use template::default_config_toml;

/// `~/.config/vmconsole/config.toml` on Linux, the platform equivalent
/// elsewhere.
pub fn default_config_path() -> Result<PathBuf, ConfigError> {
    dirs::config_dir()
        .map(|dir| dir.join("vmconsole").join("config.toml"))
        .ok_or_else(|| ConfigError::ParseError("no config directory on this platform".into()))
}

/// Parse one config file. Absent keys take their defaults; range checks
/// are left to [`crate::validation`].
pub fn read_config(path: &Path) -> Result<ConsoleConfig, ConfigError> {
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            return Err(ConfigError::FileNotFound(path.to_path_buf()))
        }
        Err(e) => {
            return Err(ConfigError::ParseError(format!(
                "cannot read {}: {e}",
                path.display()
            )))
        }
    };

    let config = toml::from_str(&content)
        .map_err(|e| ConfigError::ParseError(format!("{}: {e}", path.display())))?;
    debug!(path = %path.display(), "config read");
    Ok(config)
}

/// Write the default config unless a file is already there. Returns whether
/// a file was written; an existing one is never touched.
pub fn write_default_if_missing(path: &Path) -> Result<bool, ConfigError> {
    let io_err = |e: std::io::Error| {
        ConfigError::ParseError(format!("cannot write {}: {e}", path.display()))
    };

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(io_err)?;
    }
    let mut file = match OpenOptions::new().write(true).create_new(true).open(path) {
        Ok(file) => file,
        Err(e) if e.kind() == ErrorKind::AlreadyExists => return Ok(false),
        Err(e) => return Err(io_err(e)),
    };
    file.write_all(default_config_toml().as_bytes()).map_err(io_err)?;

    info!(path = %path.display(), "wrote default config");
    Ok(true)
}

/// Read the config at the default path, creating it first if needed.
pub fn load_default() -> Result<ConsoleConfig, ConfigError> {
    let path = default_config_path()?;
    if write_default_if_missing(&path)? {
        return Ok(ConsoleConfig::default());
    }
    read_config(&path)
}
