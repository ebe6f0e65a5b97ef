use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default level for the `vmconsole` log targets: error, warn, info,
    /// debug or trace.
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".into(),
        }
    }
}

impl LoggingConfig {
    /// Build an `EnvFilter`-style directive covering every vmconsole crate.
    pub fn directive(&self) -> String {
        let level = self.level.to_ascii_lowercase();
        format!("vmconsole_app={level},vmconsole_mux={level},vmconsole_config={level}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn directive_covers_all_crates() {
        let logging = LoggingConfig {
            level: "DEBUG".into(),
        };
        let directive = logging.directive();
        assert!(directive.contains("vmconsole_app=debug"));
        assert!(directive.contains("vmconsole_mux=debug"));
        assert!(directive.contains("vmconsole_config=debug"));
    }
}
