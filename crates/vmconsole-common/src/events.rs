use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use crate::id::SessionId;
use crate::types::{ControlVerb, LifecycleState, SessionKind};

/// Notifications published by the console multiplexer for the UI shell.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum ConsoleEvent {
    SessionOpened {
        session: SessionId,
        target: String,
        kind: SessionKind,
    },
    StateChanged {
        session: SessionId,
        state: LifecycleState,
    },
    ForegroundChanged(Option<SessionId>),
    SurfaceShown,
    SurfaceHidden,
    SessionClosed {
        session: SessionId,
        target: String,
    },
    ControlCompleted {
        session: SessionId,
        verb: ControlVerb,
        message: String,
    },
    ControlFailed {
        session: SessionId,
        verb: ControlVerb,
        message: String,
    },
    #[serde(other)]
    Unknown,
}

pub struct EventBus {
    sender: broadcast::Sender<ConsoleEvent>,
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ConsoleEvent> {
        self.sender.subscribe()
    }

    pub fn publish(&self, event: ConsoleEvent) -> usize {
        self.sender.send(event).unwrap_or(0)
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(256)
    }
}
