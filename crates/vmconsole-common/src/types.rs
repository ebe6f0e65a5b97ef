//! Shared vocabulary: session kinds, endpoints, lifecycle states, control verbs.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

// =============================================================================
// SESSION KIND
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionKind {
    /// Remote pixel framebuffer (VNC).
    Graphical,
    /// Remote character-grid shell.
    Text,
}

impl fmt::Display for SessionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionKind::Graphical => write!(f, "graphical"),
            SessionKind::Text => write!(f, "text"),
        }
    }
}

// =============================================================================
// ENDPOINT HINT
// =============================================================================

/// Kind-specific addressing data supplied by whoever calls `open`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EndpointHint {
    /// VNC display of a VM. `None` or `Some(0)` means the VM has no display
    /// (usually because it is not running).
    Display { port: Option<u16> },
    /// Shell inside a container, addressed by the target name alone.
    Shell,
    /// Privileged shell on the host itself.
    HostShell,
}

impl EndpointHint {
    pub fn kind(&self) -> SessionKind {
        match self {
            EndpointHint::Display { .. } => SessionKind::Graphical,
            EndpointHint::Shell | EndpointHint::HostShell => SessionKind::Text,
        }
    }

    /// The usable display port, if any.
    pub fn display_port(&self) -> Option<u16> {
        match self {
            EndpointHint::Display { port: Some(p) } if *p != 0 => Some(*p),
            _ => None,
        }
    }
}

// =============================================================================
// LIFECYCLE STATE
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LifecycleState {
    Created,
    Connecting,
    Connected,
    Error,
    Closed,
}

impl LifecycleState {
    /// Whether `self -> to` is a legal edge of the session state machine.
    pub fn can_transition_to(self, to: LifecycleState) -> bool {
        use LifecycleState::*;
        matches!(
            (self, to),
            (Created, Connecting)
                | (Created, Closed)
                | (Connecting, Connected)
                | (Connecting, Error)
                | (Connecting, Closed)
                | (Connected, Error)
                | (Connected, Closed)
                | (Error, Closed)
        )
    }
}

impl fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            LifecycleState::Created => "created",
            LifecycleState::Connecting => "connecting",
            LifecycleState::Connected => "connected",
            LifecycleState::Error => "error",
            LifecycleState::Closed => "closed",
        };
        f.write_str(s)
    }
}

// =============================================================================
// CONTROL VERB
// =============================================================================

/// Management command sent through the request/response API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ControlVerb {
    Start,
    Stop,
    ForceStop,
    Delete,
}

impl ControlVerb {
    /// Path segment understood by the management API.
    pub fn as_action(&self) -> &'static str {
        match self {
            ControlVerb::Start => "start",
            ControlVerb::Stop => "stop",
            ControlVerb::ForceStop => "destroy",
            ControlVerb::Delete => "delete",
        }
    }

    /// Whether a successful run takes the target's console away.
    pub fn tears_down(&self) -> bool {
        !matches!(self, ControlVerb::Start)
    }
}

impl fmt::Display for ControlVerb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ControlVerb::Start => "start",
            ControlVerb::Stop => "stop",
            ControlVerb::ForceStop => "force-stop",
            ControlVerb::Delete => "delete",
        };
        f.write_str(s)
    }
}

impl FromStr for ControlVerb {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "start" => Ok(ControlVerb::Start),
            "stop" | "shutdown" => Ok(ControlVerb::Stop),
            "force-stop" | "force_stop" | "destroy" => Ok(ControlVerb::ForceStop),
            "delete" => Ok(ControlVerb::Delete),
            other => Err(format!("unknown control verb: {other}")),
        }
    }
}
