//! The console multiplexer facade handed to the UI shell.
//!
//! Owns the registry, the event channel that every background task reports
//! into, the control dispatcher and the clipboard. All session mutation
//! happens on whichever loop calls [`ConsoleMux::process_next`]; every other
//! method returns without waiting on the network.


use std::sync::Arc;

use tokio::sync::{broadcast, mpsc};
use tracing::{debug, info};
use vmconsole_common::{ConsoleError, ConsoleEvent, ControlVerb, LifecycleState, SessionId};

use crate::clipboard::ClipboardSource;
use crate::control::ControlDispatcher;
use crate::events::SessionEvent;
use crate::registry::SessionRegistry;
use crate::render::RendererFactory;
use crate::session::{ConsoleSession, OpenRequest};
use crate::settings::MuxSettings;
use crate::tabs::TabStrip;
use crate::transport::Connector;

pub struct ConsoleMux {
    registry: SessionRegistry,
    events: mpsc::UnboundedReceiver<SessionEvent>,
    events_tx: mpsc::UnboundedSender<SessionEvent>,
    control: Arc<dyn ControlDispatcher>,
    clipboard: Option<Box<dyn ClipboardSource>>,
}

impl ConsoleMux {
    pub fn new(
        settings: MuxSettings,
        connector: Arc<dyn Connector>,
        renderers: Arc<dyn RendererFactory>,
        control: Arc<dyn ControlDispatcher>,
    ) -> Self {
        let (events_tx, events) = mpsc::unbounded_channel();
        let registry = SessionRegistry::new(settings, connector, renderers, events_tx.clone());
        Self {
            registry,
            events,
            events_tx,
            control,
            clipboard: None,
        }
    }

    pub fn with_clipboard(mut self, clipboard: Box<dyn ClipboardSource>) -> Self {
        self.clipboard = Some(clipboard);
        self
    }

    // -----------------------------------------------------------------------
    // Sessions
    // -----------------------------------------------------------------------

    /// Open (or focus) a console. Must be called inside a tokio runtime.
    pub fn open(&mut self, request: OpenRequest) -> SessionId {
        self.registry.open(request)
    }

    pub fn close(&mut self, id: &SessionId) -> bool {
        self.registry.close(id)
    }

    pub fn close_all(&mut self) {
        self.registry.close_all();
    }

    pub fn find_by_target(&self, target: &str) -> Option<SessionId> {
        self.registry.find_by_target(target)
    }

    pub fn session(&self, id: &SessionId) -> Option<&ConsoleSession> {
        self.registry.get(id)
    }

    pub fn state(&self, id: &SessionId) -> Option<LifecycleState> {
        self.registry.get(id).map(|s| s.state())
    }

    pub fn sessions(&self) -> impl Iterator<Item = &ConsoleSession> {
        self.registry.sessions()
    }

    pub fn len(&self) -> usize {
        self.registry.len()
    }

    pub fn is_empty(&self) -> bool {
        self.registry.is_empty()
    }

    pub fn tabs(&self) -> &TabStrip {
        self.registry.tabs()
    }

    pub fn registry(&self) -> &SessionRegistry {
        &self.registry
    }

    pub fn set_foreground(&mut self, id: &SessionId) -> bool {
        self.registry.set_foreground(id)
    }

    pub fn cycle_next(&mut self) {
        self.registry.cycle_next();
    }

    pub fn cycle_prev(&mut self) {
        self.registry.cycle_prev();
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ConsoleEvent> {
        self.registry.subscribe()
    }

    // -----------------------------------------------------------------------
    // Input
    // -----------------------------------------------------------------------

    pub fn send_input(&mut self, id: &SessionId, bytes: &[u8]) -> Result<(), ConsoleError> {
        self.registry.send_input(id, bytes)
    }

    /// Read the host clipboard and push it into the session.
    pub fn paste_clipboard(&mut self, id: &SessionId) -> Result<(), ConsoleError> {
        let clipboard = self
            .clipboard
            .as_mut()
            .ok_or_else(|| ConsoleError::Clipboard("no clipboard available".into()))?;
        let text = clipboard.read_text()?;
        if text.is_empty() {
            debug!(session = %id.short(), "clipboard empty, nothing to paste");
            return Ok(());
        }
        self.registry.paste(id, &text)
    }

    // -----------------------------------------------------------------------
    // Control
    // -----------------------------------------------------------------------

    /// Run a management action against the session's target. The result
    /// arrives later through [`ConsoleMux::process_next`].
    pub fn send_control_action(&mut self, id: &SessionId, verb: ControlVerb) -> Result<(), ConsoleError> {
        let target = self
            .registry
            .get(id)
            .map(|s| s.target().to_string())
            .ok_or_else(|| ConsoleError::SessionNotFound(id.clone()))?;

        info!(session = %id.short(), target = %target, verb = %verb, "dispatching control action");
        let control = Arc::clone(&self.control);
        let events = self.events_tx.clone();
        let session = id.clone();
        tokio::spawn(async move {
            let result = control.dispatch(&target, verb).await;
            let _ = events.send(SessionEvent::ControlFinished {
                session,
                verb,
                result,
            });
        });
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Event loop
    // -----------------------------------------------------------------------

    /// Wait for the next background event and apply it. Cancel-safe, so it
    /// can sit in a `select!` next to the UI's own input.
    pub async fn process_next(&mut self) {
        // The mux holds a sender itself, so the channel never closes.
        if let Some(event) = self.events.recv().await {
            self.registry.handle_event(event);
        }
    }

    /// Apply every event already queued, without waiting. Returns how many.
    pub fn process_pending(&mut self) -> usize {
        let mut applied = 0;
        while let Ok(event) = self.events.try_recv() {
            self.registry.handle_event(event);
            applied += 1;
        }
        applied
    }
}

impl Drop for ConsoleMux {
    fn drop(&mut self) {
        if !self.registry.is_empty() {
            debug!(sessions = self.registry.len(), "closing remaining sessions");
            self.registry.close_all();
        }
    }
}
