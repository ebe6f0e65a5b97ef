//! Configuration schema types for vmconsole.
//!
//! All structs use `serde(default)` so partial configs work correctly.

mod display;
mod logging;
mod proxy;
mod timing;

pub use display::*;
pub use logging::*;
pub use proxy::*;
pub use timing::*;

use serde::{Deserialize, Serialize};

/// Current config schema version.
pub const CONFIG_SCHEMA_VERSION: u32 = 1;

/// Root configuration for vmconsole.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ConsoleConfig {
    pub proxy: ProxyConfig,
    pub display: DisplayConfig,
    pub timing: TimingConfig,
    pub logging: LoggingConfig,
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_proxy_points_at_local_backend() {
        let config = ConsoleConfig::default();
        assert_eq!(config.proxy.ws_url, "ws://127.0.0.1:5000");
        assert_eq!(config.proxy.api_url, "http://127.0.0.1:5000");
        assert!(config.proxy.token.is_empty());
        assert_eq!(config.proxy.privileged_user, "root");
    }

    #[test]
    fn default_timings_match_grace_delay() {
        let config = ConsoleConfig::default();
        assert_eq!(config.timing.error_close_delay_ms, 2000);
        assert_eq!(config.timing.control_grace_delay_ms, 2000);
        assert_eq!(config.timing.connect_timeout_secs, 15);
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let toml_str = r#"
[proxy]
ws_url = "wss://console.example.net"
"#;
        let config: ConsoleConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.proxy.ws_url, "wss://console.example.net");
        assert_eq!(config.proxy.api_url, "http://127.0.0.1:5000");
        assert_eq!(config.timing.error_close_delay_ms, 2000);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn empty_toml_is_default() {
        let config: ConsoleConfig = toml::from_str("").unwrap();
        assert_eq!(config.timing.connect_timeout_secs, 15);
        assert!(config.display.credential.is_empty());
    }

    #[test]
    fn debug_output_redacts_token() {
        let mut config = ConsoleConfig::default();
        config.proxy.token = "super-secret-jwt".into();
        config.display.credential = "vncpass".into();
        let debug = format!("{config:?}");
        assert!(!debug.contains("super-secret-jwt"));
        assert!(!debug.contains("vncpass"));
        assert!(debug.contains("[REDACTED]"));
    }
}
