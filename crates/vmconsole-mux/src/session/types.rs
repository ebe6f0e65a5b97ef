use std::fmt;
use std::time::Instant;

use vmconsole_common::{ConsoleError, EndpointHint, LifecycleState, SessionId, SessionKind};

use super::SessionState;
use crate::bridge::{flavor_for, TransportHandle};
use crate::events::TeardownReason;
use crate::render::Renderer;
use crate::transport::Frame;

/// Target name used for the host shell.
pub const HOST_TARGET: &str = "host";

// ---------------------------------------------------------------------------
// Open request
// ---------------------------------------------------------------------------

/// Everything needed to open a console for one target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenRequest {
    pub target: String,
    pub endpoint: EndpointHint,
    pub icon: Option<String>,
}

impl OpenRequest {
    /// VNC display of a VM. Pass the port reported by the hypervisor, which
    /// is `None` (or 0) when the VM is not running.
    pub fn graphical(target: impl Into<String>, port: Option<u16>) -> Self {
        Self {
            target: target.into(),
            endpoint: EndpointHint::Display { port },
            icon: None,
        }
    }

    /// Shell inside a container.
    pub fn shell(target: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            endpoint: EndpointHint::Shell,
            icon: None,
        }
    }

    pub fn host() -> Self {
        Self {
            target: HOST_TARGET.to_string(),
            endpoint: EndpointHint::HostShell,
            icon: None,
        }
    }

    pub fn with_icon(mut self, icon: impl Into<String>) -> Self {
        self.icon = Some(icon.into());
        self
    }

    pub fn kind(&self) -> SessionKind {
        self.endpoint.kind()
    }
}

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

/// One live console. Owned by the registry; the transport and renderer are
/// owned by the session and released with it.
pub struct ConsoleSession {
    id: SessionId,
    target: String,
    endpoint: EndpointHint,
    icon: Option<String>,
    state: SessionState,
    pub(crate) transport: Option<TransportHandle>,
    pub(crate) renderer: Box<dyn Renderer>,
    credential: String,
    last_error: Option<ConsoleError>,
    pub(crate) teardown: Option<TeardownReason>,
    pending_input: Vec<u8>,
    created_at: Instant,
    bytes_in: u64,
    bytes_out: u64,
}

impl ConsoleSession {
    pub(crate) fn new(
        id: SessionId,
        request: OpenRequest,
        renderer: Box<dyn Renderer>,
        credential: String,
    ) -> Self {
        Self {
            id,
            target: request.target,
            endpoint: request.endpoint,
            icon: request.icon,
            state: SessionState::new(),
            transport: None,
            renderer,
            credential,
            last_error: None,
            teardown: None,
            pending_input: Vec::new(),
            created_at: Instant::now(),
            bytes_in: 0,
            bytes_out: 0,
        }
    }

    pub fn id(&self) -> &SessionId {
        &self.id
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    pub fn kind(&self) -> SessionKind {
        self.endpoint.kind()
    }

    pub fn endpoint(&self) -> EndpointHint {
        self.endpoint
    }

    pub fn icon(&self) -> Option<&str> {
        self.icon.as_deref()
    }

    pub fn state(&self) -> LifecycleState {
        self.state.current()
    }

    pub fn history(&self) -> &[LifecycleState] {
        self.state.history()
    }

    pub fn last_error(&self) -> Option<&ConsoleError> {
        self.last_error.as_ref()
    }

    pub fn has_transport(&self) -> bool {
        self.transport.is_some()
    }

    /// Why a delayed close is pending, if one is.
    pub fn teardown(&self) -> Option<TeardownReason> {
        self.teardown
    }

    pub fn created_at(&self) -> Instant {
        self.created_at
    }

    pub fn bytes_in(&self) -> u64 {
        self.bytes_in
    }

    pub fn bytes_out(&self) -> u64 {
        self.bytes_out
    }

    pub(crate) fn credential(&self) -> &str {
        &self.credential
    }

    /// Validate and apply a state change, then tell the renderer.
    pub(crate) fn transition(&mut self, to: LifecycleState) -> Result<LifecycleState, ConsoleError> {
        let from = self.state.transition(to)?;
        self.renderer.show_state(to, self.last_error.as_ref());
        Ok(from)
    }

    pub(crate) fn record_error(&mut self, err: ConsoleError) {
        self.last_error = Some(err);
    }

    pub(crate) fn record_inbound(&mut self, len: usize) {
        self.bytes_in += len as u64;
    }

    /// Queue a frame on the transport without waiting.
    pub(crate) fn send(&mut self, frame: Frame) -> Result<(), ConsoleError> {
        let len = frame.len();
        let transport = self
            .transport
            .as_ref()
            .ok_or_else(|| ConsoleError::TransportError("transport released".into()))?;
        transport.send(frame)?;
        self.bytes_out += len as u64;
        Ok(())
    }

    /// Encode operator input for this console and queue it. Input that does
    /// not yet form a whole unit stays buffered until the next call.
    pub(crate) fn send_input(&mut self, bytes: &[u8]) -> Result<(), ConsoleError> {
        match flavor_for(self.kind()).encode_input(&mut self.pending_input, bytes) {
            Some(frame) => self.send(frame),
            None => Ok(()),
        }
    }

    /// Drop the transport, if any. Never waits.
    pub(crate) fn release_transport(&mut self) {
        if let Some(handle) = self.transport.take() {
            handle.release();
        }
    }
}

impl fmt::Debug for ConsoleSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConsoleSession")
            .field("id", &self.id)
            .field("target", &self.target)
            .field("endpoint", &self.endpoint)
            .field("state", &self.state.current())
            .field("transport", &self.transport.is_some())
            .field("last_error", &self.last_error)
            .field("teardown", &self.teardown)
            .field("bytes_in", &self.bytes_in)
            .field("bytes_out", &self.bytes_out)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_kinds() {
        assert_eq!(OpenRequest::graphical("vm1", Some(5901)).kind(), SessionKind::Graphical);
        assert_eq!(OpenRequest::shell("lxc1").kind(), SessionKind::Text);

        let host = OpenRequest::host();
        assert_eq!(host.target, HOST_TARGET);
        assert_eq!(host.endpoint, EndpointHint::HostShell);
    }

    #[test]
    fn request_icon() {
        let req = OpenRequest::shell("lxc1").with_icon("container");
        assert_eq!(req.icon.as_deref(), Some("container"));
    }
}
