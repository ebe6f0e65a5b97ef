use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Session lifecycle timings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingConfig {
    /// Delay between a session entering `Error` (or a text session's remote
    /// close) and its automatic teardown.
    pub error_close_delay_ms: u32,
    /// Delay between a successful stop/force-stop and session teardown.
    pub control_grace_delay_ms: u32,
    /// Upper bound on `Connecting` before the session fails.
    pub connect_timeout_secs: u32,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            error_close_delay_ms: 2000,
            control_grace_delay_ms: 2000,
            connect_timeout_secs: 15,
        }
    }
}

impl TimingConfig {
    pub fn error_close_delay(&self) -> Duration {
        Duration::from_millis(u64::from(self.error_close_delay_ms))
    }

    pub fn control_grace_delay(&self) -> Duration {
        Duration::from_millis(u64::from(self.control_grace_delay_ms))
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(u64::from(self.connect_timeout_secs))
    }
}
