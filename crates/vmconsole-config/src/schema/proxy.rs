use serde::{Deserialize, Serialize};

/// Where the console proxy and the management API live, and how to
/// authenticate against them.
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProxyConfig {
    /// Base WebSocket URL of the console proxy (`ws://` or `wss://`).
    pub ws_url: String,
    /// Base HTTP URL of the management API.
    pub api_url: String,
    /// Auth token attached to every proxy connection and API request.
    pub token: String,
    /// Operator identity this console runs as.
    pub operator: String,
    /// The only identity allowed to open a host shell.
    pub privileged_user: String,
}

impl std::fmt::Debug for ProxyConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProxyConfig")
            .field("ws_url", &self.ws_url)
            .field("api_url", &self.api_url)
            .field("token", &"[REDACTED]")
            .field("operator", &self.operator)
            .field("privileged_user", &self.privileged_user)
            .finish()
    }
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self {
            ws_url: "ws://127.0.0.1:5000".into(),
            api_url: "http://127.0.0.1:5000".into(),
            token: String::new(),
            operator: "root".into(),
            privileged_user: "root".into(),
        }
    }
}

impl ProxyConfig {
    /// Whether the configured operator may open the host shell.
    pub fn operator_is_privileged(&self) -> bool {
        !self.privileged_user.is_empty() && self.operator == self.privileged_user
    }
}
