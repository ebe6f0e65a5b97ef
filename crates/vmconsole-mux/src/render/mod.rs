//! Renderer seam.
//!
//! A renderer turns a session's inbound payloads into something visible: a
//! pixel surface for graphical sessions, a character grid for text ones.
//! Renderers read session state; they never change it. The only way back
//! is a [`RenderOutput`] asking the session to send something.

mod recording;

use vmconsole_common::{ConsoleError, LifecycleState, SessionId, SessionKind};

pub use recording::{RecordingFactory, RecordingRenderer, Transcript, TranscriptData};

/// What the renderer wants done after consuming a payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderOutput {
    Idle,
    /// Protocol reply to send back on the transport.
    Reply(Vec<u8>),
    /// The remote protocol asked for the display password.
    NeedsCredentials,
}

pub trait Renderer: Send {
    /// Consume one inbound payload. Called in receipt order.
    fn render(&mut self, payload: &[u8]) -> RenderOutput;

    /// Lifecycle change of the owning session.
    fn show_state(&mut self, state: LifecycleState, error: Option<&ConsoleError>);

    /// Informational line inside the console output (text sessions).
    fn write_banner(&mut self, _line: &str) {}

    /// Answer a credential prompt. Returns the bytes to send, if any.
    fn supply_credentials(&mut self, _credential: &str) -> Vec<u8> {
        Vec::new()
    }
}

/// Builds a renderer for each new session.
pub trait RendererFactory: Send + Sync {
    fn create(&self, session: &SessionId, kind: SessionKind, target: &str) -> Box<dyn Renderer>;
}
