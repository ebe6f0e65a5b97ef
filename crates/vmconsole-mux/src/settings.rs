//! Runtime knobs for the multiplexer, resolved from the loaded config.

use std::fmt;
use std::time::Duration;

use vmconsole_config::schema::ConsoleConfig;

#[derive(Clone)]
pub struct MuxSettings {
    /// Base WebSocket URL of the console proxy.
    pub ws_url: String,
    pub token: String,
    /// Stored display password, answered to VNC credential prompts.
    pub credential: String,
    /// Whether the operator may open a shell on the host.
    pub host_shell_allowed: bool,
    /// How long an error stays visible before the session auto-closes.
    pub error_close_delay: Duration,
    /// How long a session lingers after a successful stop/delete.
    pub control_grace_delay: Duration,
    pub connect_timeout: Duration,
}

impl From<&ConsoleConfig> for MuxSettings {
    fn from(config: &ConsoleConfig) -> Self {
        Self {
            ws_url: config.proxy.ws_url.clone(),
            token: config.proxy.token.clone(),
            credential: config.display.credential.clone(),
            host_shell_allowed: config.proxy.operator_is_privileged(),
            error_close_delay: config.timing.error_close_delay(),
            control_grace_delay: config.timing.control_grace_delay(),
            connect_timeout: config.timing.connect_timeout(),
        }
    }
}

impl Default for MuxSettings {
    fn default() -> Self {
        Self::from(&ConsoleConfig::default())
    }
}

impl fmt::Debug for MuxSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MuxSettings")
            .field("ws_url", &self.ws_url)
            .field("token", &if self.token.is_empty() { "" } else { "[redacted]" })
            .field("credential", &if self.credential.is_empty() { "" } else { "[redacted]" })
            .field("host_shell_allowed", &self.host_shell_allowed)
            .field("error_close_delay", &self.error_close_delay)
            .field("control_grace_delay", &self.control_grace_delay)
            .field("connect_timeout", &self.connect_timeout)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_follow_config() {
        let settings = MuxSettings::default();
        assert_eq!(settings.ws_url, "ws://127.0.0.1:5000");
        assert_eq!(settings.error_close_delay, Duration::from_secs(2));
        assert_eq!(settings.control_grace_delay, Duration::from_secs(2));
        assert_eq!(settings.connect_timeout, Duration::from_secs(15));
        assert!(settings.host_shell_allowed);
    }

    #[test]
    fn unprivileged_operator_loses_host_shell() {
        let mut config = ConsoleConfig::default();
        config.proxy.operator = "alice".into();
        let settings = MuxSettings::from(&config);
        assert!(!settings.host_shell_allowed);
    }

    #[test]
    fn debug_redacts_secrets() {
        let mut config = ConsoleConfig::default();
        config.proxy.token = "tok-123".into();
        config.display.credential = "vncpass".into();
        let debug = format!("{:?}", MuxSettings::from(&config));
        assert!(!debug.contains("tok-123"));
        assert!(!debug.contains("vncpass"));
        assert!(debug.contains("[redacted]"));
    }
}
