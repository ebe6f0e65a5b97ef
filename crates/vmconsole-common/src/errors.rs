use std::path::PathBuf;

use crate::id::SessionId;
use crate::types::LifecycleState;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("config file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("config parse error: {0}")]
    ParseError(String),

    #[error("config validation error: {0}")]
    ValidationError(String),
}

/// Everything that can end or refuse a console session.
///
/// `TargetUnavailable`, `TransportError`, `AuthRejected` and `UserCancelled`
/// are terminal for the session they belong to and are never retried.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConsoleError {
    #[error("target unavailable: {0}")]
    TargetUnavailable(String),

    #[error("transport error: {0}")]
    TransportError(String),

    #[error("authentication rejected: {0}")]
    AuthRejected(String),

    #[error("closed by user")]
    UserCancelled,

    #[error("no such session: {0}")]
    SessionNotFound(SessionId),

    #[error("invalid lifecycle transition {from} -> {to}")]
    InvalidTransition {
        from: LifecycleState,
        to: LifecycleState,
    },

    #[error("control action failed: {0}")]
    ControlFailed(String),

    #[error("clipboard error: {0}")]
    Clipboard(String),
}

impl ConsoleError {
    /// Whether the failure is shown to the operator (status change plus a
    /// delayed auto-close) instead of closing the session silently.
    pub fn is_visible(&self) -> bool {
        matches!(
            self,
            ConsoleError::TargetUnavailable(_)
                | ConsoleError::TransportError(_)
                | ConsoleError::AuthRejected(_)
        )
    }
}

#[derive(Debug, thiserror::Error)]
pub enum VmConsoleError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Console(#[from] ConsoleError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_error_display() {
        let err = ConfigError::FileNotFound(PathBuf::from("/tmp/missing.toml"));
        assert_eq!(err.to_string(), "config file not found: /tmp/missing.toml");

        let err = ConfigError::ParseError("unexpected token".into());
        assert_eq!(err.to_string(), "config parse error: unexpected token");

        let err = ConfigError::ValidationError("timing.connect_timeout_secs".into());
        assert_eq!(
            err.to_string(),
            "config validation error: timing.connect_timeout_secs"
        );
    }

    #[test]
    fn console_error_display() {
        let err = ConsoleError::TargetUnavailable("vm1 has no display port".into());
        assert_eq!(err.to_string(), "target unavailable: vm1 has no display port");

        let err = ConsoleError::AuthRejected("HTTP 403".into());
        assert_eq!(err.to_string(), "authentication rejected: HTTP 403");

        let err = ConsoleError::InvalidTransition {
            from: LifecycleState::Closed,
            to: LifecycleState::Connected,
        };
        assert_eq!(
            err.to_string(),
            "invalid lifecycle transition closed -> connected"
        );

        assert_eq!(ConsoleError::UserCancelled.to_string(), "closed by user");
    }

    #[test]
    fn visible_errors() {
        assert!(ConsoleError::TransportError("reset".into()).is_visible());
        assert!(ConsoleError::AuthRejected("401".into()).is_visible());
        assert!(ConsoleError::TargetUnavailable("no port".into()).is_visible());
        assert!(!ConsoleError::UserCancelled.is_visible());
    }

    #[test]
    fn umbrella_from_config() {
        let err: VmConsoleError = ConfigError::ParseError("bad toml".into()).into();
        assert!(matches!(err, VmConsoleError::Config(_)));
        assert!(err.to_string().contains("bad toml"));
    }

    #[test]
    fn umbrella_from_console() {
        let err: VmConsoleError = ConsoleError::UserCancelled.into();
        assert!(matches!(err, VmConsoleError::Console(_)));
    }

    #[test]
    fn umbrella_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file missing");
        let err: VmConsoleError = io_err.into();
        assert!(matches!(err, VmConsoleError::Io(_)));
        assert!(err.to_string().contains("file missing"));
    }
}
