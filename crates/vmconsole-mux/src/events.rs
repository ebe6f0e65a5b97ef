//! Events flowing from background tasks back into the registry.
//!
//! Everything that happens off the consumer loop (transport activity, timers,
//! control calls) is reported here, tagged with the session it belongs to.
//! The registry drops events whose session no longer exists.

use vmconsole_common::{ConsoleError, ControlVerb, SessionId};

use crate::bridge::BridgeEvent;

/// Why a delayed close was scheduled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TeardownReason {
    /// An error was shown and the grace period ran out.
    Failed,
    /// The remote side ended a text session.
    RemoteClosed,
    /// A stop/force-stop/delete took the target away.
    Control(ControlVerb),
}

#[derive(Debug)]
pub enum SessionEvent {
    Bridge {
        session: SessionId,
        event: BridgeEvent,
    },
    TeardownDue {
        session: SessionId,
        reason: TeardownReason,
    },
    ControlFinished {
        session: SessionId,
        verb: ControlVerb,
        result: Result<String, ConsoleError>,
    },
}

impl SessionEvent {
    pub fn session(&self) -> &SessionId {
        match self {
            SessionEvent::Bridge { session, .. }
            | SessionEvent::TeardownDue { session, .. }
            | SessionEvent::ControlFinished { session, .. } => session,
        }
    }
}
