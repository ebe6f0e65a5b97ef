//! Full configuration validation.
//!
//! Validates URL schemes, numeric ranges and the logging level, collecting
//! every problem into a single `ConfigError`.

mod helpers;


use crate::schema::ConsoleConfig;
use vmconsole_common::ConfigError;

use helpers::{validate_one_of, validate_range, validate_scheme};

const LOG_LEVELS: &[&str] = &["error", "warn", "info", "debug", "trace"];

/// Run all validations on a config, collecting all errors.
pub fn validate(config: &ConsoleConfig) -> Result<(), ConfigError> {
    let mut errors: Vec<String> = Vec::new();

    validate_proxy(&mut errors, config);
    validate_timing(&mut errors, config);
    validate_one_of(
        &mut errors,
        "logging.level",
        &config.logging.level.to_ascii_lowercase(),
        LOG_LEVELS,
    );

    if errors.is_empty() {
        Ok(())
    } else {
        Err(ConfigError::ValidationError(errors.join("; ")))
    }
}

fn validate_proxy(errors: &mut Vec<String>, config: &ConsoleConfig) {
    validate_scheme(errors, "proxy.ws_url", &config.proxy.ws_url, &["ws://", "wss://"]);
    validate_scheme(
        errors,
        "proxy.api_url",
        &config.proxy.api_url,
        &["http://", "https://"],
    );
}

fn validate_timing(errors: &mut Vec<String>, config: &ConsoleConfig) {
    validate_range(
        errors,
        "timing.error_close_delay_ms",
        config.timing.error_close_delay_ms,
        100,
        60_000,
    );
    validate_range(
        errors,
        "timing.control_grace_delay_ms",
        config.timing.control_grace_delay_ms,
        100,
        60_000,
    );
    validate_range(
        errors,
        "timing.connect_timeout_secs",
        config.timing.connect_timeout_secs,
        1,
        300,
    );
}
