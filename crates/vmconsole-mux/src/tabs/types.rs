use std::fmt;

use serde::Serialize;
use vmconsole_common::{ConsoleError, LifecycleState, SessionId};

/// Status indicator shown on a tab, derived from its session's state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "detail", rename_all = "snake_case")]
pub enum TabStatus {
    Connecting,
    Connected,
    Error(String),
    /// A delayed close is pending.
    Closing,
}

impl TabStatus {
    pub fn for_state(state: LifecycleState, error: Option<&ConsoleError>) -> Self {
        match state {
            LifecycleState::Created | LifecycleState::Connecting => TabStatus::Connecting,
            LifecycleState::Connected => TabStatus::Connected,
            LifecycleState::Error => TabStatus::Error(
                error.map(|e| e.to_string()).unwrap_or_else(|| "unknown error".into()),
            ),
            LifecycleState::Closed => TabStatus::Closing,
        }
    }
}

impl fmt::Display for TabStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TabStatus::Connecting => f.write_str("connecting"),
            TabStatus::Connected => f.write_str("connected"),
            TabStatus::Error(msg) => write!(f, "error: {msg}"),
            TabStatus::Closing => f.write_str("closing"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Tab {
    pub session: SessionId,
    pub title: String,
    pub icon: Option<String>,
    pub status: TabStatus,
}

impl Tab {
    pub fn new(session: SessionId, title: impl Into<String>, icon: Option<String>) -> Self {
        Self {
            session,
            title: title.into(),
            icon,
            status: TabStatus::Connecting,
        }
    }
}

/// Ordered tabs (creation order) plus the foreground selection.
#[derive(Debug, Clone, Default)]
pub struct TabStrip {
    pub(super) tabs: Vec<Tab>,
    /// Index into `tabs`; `None` exactly when `tabs` is empty.
    pub(super) foreground: Option<usize>,
}

impl TabStrip {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.tabs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tabs.is_empty()
    }

    /// The console surface is shown while any tab exists.
    pub fn is_visible(&self) -> bool {
        !self.tabs.is_empty()
    }

    pub fn tabs(&self) -> &[Tab] {
        &self.tabs
    }

    pub fn ids(&self) -> Vec<SessionId> {
        self.tabs.iter().map(|t| t.session.clone()).collect()
    }

    pub fn get(&self, session: &SessionId) -> Option<&Tab> {
        self.tabs.iter().find(|t| t.session == *session)
    }

    pub fn contains(&self, session: &SessionId) -> bool {
        self.get(session).is_some()
    }

    pub fn foreground(&self) -> Option<&SessionId> {
        self.foreground
            .and_then(|idx| self.tabs.get(idx))
            .map(|t| &t.session)
    }

    pub(super) fn position(&self, session: &SessionId) -> Option<usize> {
        self.tabs.iter().position(|t| t.session == *session)
    }
}
