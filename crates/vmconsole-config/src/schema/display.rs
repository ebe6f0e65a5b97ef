use serde::{Deserialize, Serialize};

/// Graphical session settings.
#[derive(Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// Password handed to the display protocol when it asks for one.
    /// Empty means "no password".
    pub credential: String,
}

impl std::fmt::Debug for DisplayConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DisplayConfig")
            .field(
                "credential",
                &if self.credential.is_empty() { "" } else { "[REDACTED]" },
            )
            .finish()
    }
}
