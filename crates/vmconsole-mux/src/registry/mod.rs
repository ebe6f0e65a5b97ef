//! Session registry: the single owner of every console session.
//!
//! At most one session exists per target. Opening an already-open target
//! brings its tab forward instead of creating a second session. Closing
//! releases the transport, removes the tab, and forgets the session; the id
//! is never handed out again, so late events for it are simply dropped.

mod lifecycle;

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{broadcast, mpsc};
use tracing::{debug, info, warn};
use vmconsole_common::{ConsoleError, ConsoleEvent, EventBus, LifecycleState, SessionId};

use crate::bridge::{flavor_for, spawn_bridge};
use crate::events::SessionEvent;
use crate::render::RendererFactory;
use crate::session::{ConsoleSession, OpenRequest};
use crate::settings::MuxSettings;
use crate::tabs::{Tab, TabStatus, TabStrip};
use crate::transport::Connector;

pub struct SessionRegistry {
    sessions: HashMap<SessionId, ConsoleSession>,
    by_target: HashMap<String, SessionId>,
    tabs: TabStrip,
    settings: MuxSettings,
    connector: Arc<dyn Connector>,
    renderers: Arc<dyn RendererFactory>,
    events: mpsc::UnboundedSender<SessionEvent>,
    bus: EventBus,
}

impl SessionRegistry {
    pub fn new(
        settings: MuxSettings,
        connector: Arc<dyn Connector>,
        renderers: Arc<dyn RendererFactory>,
        events: mpsc::UnboundedSender<SessionEvent>,
    ) -> Self {
        Self {
            sessions: HashMap::new(),
            by_target: HashMap::new(),
            tabs: TabStrip::new(),
            settings,
            connector,
            renderers,
            events,
            bus: EventBus::default(),
        }
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    pub fn find_by_target(&self, target: &str) -> Option<SessionId> {
        self.by_target.get(target).cloned()
    }

    pub fn get(&self, id: &SessionId) -> Option<&ConsoleSession> {
        self.sessions.get(id)
    }

    /// Sessions in tab order.
    pub fn sessions(&self) -> impl Iterator<Item = &ConsoleSession> {
        self.tabs
            .tabs()
            .iter()
            .filter_map(|tab| self.sessions.get(&tab.session))
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    pub fn tabs(&self) -> &TabStrip {
        &self.tabs
    }

    pub fn settings(&self) -> &MuxSettings {
        &self.settings
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ConsoleEvent> {
        self.bus.subscribe()
    }

    // -----------------------------------------------------------------------
    // Open / close
    // -----------------------------------------------------------------------

    /// Open a console for `request.target`, or focus the one already open.
    ///
    /// Returns immediately; the connection is made by a spawned task.
    pub fn open(&mut self, request: OpenRequest) -> SessionId {
        if let Some(existing) = self.find_by_target(&request.target) {
            debug!(session = %existing.short(), target = %request.target, "console already open");
            self.set_foreground(&existing);
            return existing;
        }

        let id = SessionId::new();
        let kind = request.kind();
        let target = request.target.clone();
        let title = request.target.clone();
        let icon = request.icon.clone();

        let renderer = self.renderers.create(&id, kind, &target);
        let session = ConsoleSession::new(id.clone(), request, renderer, self.settings.credential.clone());

        let was_visible = self.tabs.is_visible();
        self.sessions.insert(id.clone(), session);
        self.by_target.insert(target.clone(), id.clone());
        self.tabs.open(Tab::new(id.clone(), title, icon));

        info!(session = %id.short(), target = %target, kind = %kind, "console session opened");
        self.bus.publish(ConsoleEvent::SessionOpened {
            session: id.clone(),
            target,
            kind,
        });
        if !was_visible {
            self.bus.publish(ConsoleEvent::SurfaceShown);
        }
        self.bus.publish(ConsoleEvent::ForegroundChanged(Some(id.clone())));

        self.connect(&id);
        id
    }

    /// Close a session at the operator's request. Safe to call more than
    /// once; returns whether anything was closed.
    pub fn close(&mut self, id: &SessionId) -> bool {
        self.close_with(id, Some(ConsoleError::UserCancelled))
    }

    pub(crate) fn close_with(&mut self, id: &SessionId, cause: Option<ConsoleError>) -> bool {
        let Some(mut session) = self.sessions.remove(id) else {
            debug!(session = %id.short(), "close of unknown session ignored");
            return false;
        };
        self.by_target.remove(session.target());
        session.release_transport();

        let cause = cause.or_else(|| session.last_error().cloned());
        if let Some(err) = cause {
            session.record_error(err);
        }
        if let Err(e) = session.transition(LifecycleState::Closed) {
            warn!(session = %id.short(), error = %e, "close from unexpected state");
        }

        info!(
            session = %id.short(),
            target = %session.target(),
            bytes_in = session.bytes_in(),
            bytes_out = session.bytes_out(),
            "console session closed"
        );

        let previous_fg = self.tabs.foreground().cloned();
        self.tabs.close(id);
        let current_fg = self.tabs.foreground().cloned();

        self.bus.publish(ConsoleEvent::StateChanged {
            session: id.clone(),
            state: LifecycleState::Closed,
        });
        self.bus.publish(ConsoleEvent::SessionClosed {
            session: id.clone(),
            target: session.target().to_string(),
        });
        if previous_fg != current_fg {
            self.bus.publish(ConsoleEvent::ForegroundChanged(current_fg));
        }
        if !self.tabs.is_visible() {
            self.bus.publish(ConsoleEvent::SurfaceHidden);
        }
        true
    }

    /// Close every session, newest first.
    pub fn close_all(&mut self) {
        for id in self.tabs.ids().into_iter().rev() {
            self.close_with(&id, Some(ConsoleError::UserCancelled));
        }
    }

    // -----------------------------------------------------------------------
    // Foreground
    // -----------------------------------------------------------------------

    /// Bring a session's tab to the front. Background transports are untouched.
    pub fn set_foreground(&mut self, id: &SessionId) -> bool {
        if self.tabs.foreground() == Some(id) {
            return true;
        }
        if !self.tabs.set_foreground(id) {
            return false;
        }
        self.bus.publish(ConsoleEvent::ForegroundChanged(Some(id.clone())));
        true
    }

    pub fn cycle_next(&mut self) {
        self.cycle_with(TabStrip::cycle_next);
    }

    pub fn cycle_prev(&mut self) {
        self.cycle_with(TabStrip::cycle_prev);
    }

    fn cycle_with(&mut self, step: fn(&mut TabStrip)) {
        let previous = self.tabs.foreground().cloned();
        step(&mut self.tabs);
        let current = self.tabs.foreground().cloned();
        if previous != current {
            self.bus.publish(ConsoleEvent::ForegroundChanged(current));
        }
    }

    // -----------------------------------------------------------------------
    // Input
    // -----------------------------------------------------------------------

    /// Forward operator input to the session's transport without waiting.
    pub fn send_input(&mut self, id: &SessionId, bytes: &[u8]) -> Result<(), ConsoleError> {
        self.connected_session(id)?.send_input(bytes)
    }

    /// Push text into the session as if pasted.
    pub fn paste(&mut self, id: &SessionId, text: &str) -> Result<(), ConsoleError> {
        let session = self.connected_session(id)?;
        let frame = flavor_for(session.kind()).encode_paste(text);
        session.send(frame)
    }

    fn connected_session(&mut self, id: &SessionId) -> Result<&mut ConsoleSession, ConsoleError> {
        let session = self
            .sessions
            .get_mut(id)
            .ok_or_else(|| ConsoleError::SessionNotFound(id.clone()))?;
        if session.state() != LifecycleState::Connected {
            return Err(ConsoleError::TransportError(format!(
                "session is {}",
                session.state()
            )));
        }
        Ok(session)
    }

    // -----------------------------------------------------------------------
    // Connect
    // -----------------------------------------------------------------------

    fn connect(&mut self, id: &SessionId) {
        let Some(session) = self.sessions.get(id) else {
            return;
        };
        let endpoint = flavor_for(session.kind()).endpoint(
            &self.settings,
            session.target(),
            session.endpoint(),
        );

        if let Err(e) = self.transition(id, LifecycleState::Connecting) {
            warn!(session = %id.short(), error = %e, "cannot start connecting");
            return;
        }

        match endpoint {
            Ok(endpoint) => {
                let handle = spawn_bridge(
                    id.clone(),
                    endpoint,
                    Arc::clone(&self.connector),
                    self.settings.connect_timeout,
                    self.events.clone(),
                );
                if let Some(session) = self.sessions.get_mut(id) {
                    session.transport = Some(handle);
                }
            }
            Err(err) => self.fail(id, err),
        }
    }

    /// Apply a validated state change and publish it. Illegal edges are
    /// logged and refused.
    fn transition(&mut self, id: &SessionId, to: LifecycleState) -> Result<(), ConsoleError> {
        let session = self
            .sessions
            .get_mut(id)
            .ok_or_else(|| ConsoleError::SessionNotFound(id.clone()))?;
        if let Err(e) = session.transition(to) {
            warn!(session = %id.short(), error = %e, "rejected lifecycle transition");
            return Err(e);
        }
        let status = TabStatus::for_state(to, session.last_error());
        self.tabs.set_status(id, status);
        self.bus.publish(ConsoleEvent::StateChanged {
            session: id.clone(),
            state: to,
        });
        Ok(())
    }
}
