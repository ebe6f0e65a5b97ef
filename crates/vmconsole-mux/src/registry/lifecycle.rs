//! Applying background events to sessions: transport activity, timers and
//! control results.

use std::time::Duration;

use tracing::{debug, info, warn};
use vmconsole_common::{ConsoleError, ConsoleEvent, ControlVerb, LifecycleState, SessionId};

use super::SessionRegistry;
use crate::bridge::{flavor_for, BridgeEvent, RemoteClosePolicy};
use crate::events::{SessionEvent, TeardownReason};
use crate::render::RenderOutput;
use crate::tabs::TabStatus;
use crate::transport::CloseOutcome;

impl SessionRegistry {
    /// Apply one event. Events for sessions that no longer exist are dropped.
    pub fn handle_event(&mut self, event: SessionEvent) {
        let id = event.session().clone();
        if !self.sessions.contains_key(&id) {
            debug!(session = %id.short(), "dropping event for closed session");
            return;
        }

        match event {
            SessionEvent::Bridge { event, .. } => self.on_bridge_event(&id, event),
            SessionEvent::TeardownDue { reason, .. } => {
                debug!(session = %id.short(), reason = ?reason, "delayed close due");
                self.close_with(&id, None);
            }
            SessionEvent::ControlFinished { verb, result, .. } => {
                self.on_control_finished(&id, verb, result)
            }
        }
    }

    fn on_bridge_event(&mut self, id: &SessionId, event: BridgeEvent) {
        match event {
            BridgeEvent::Connected => {
                if self.transition(id, LifecycleState::Connected).is_ok() {
                    info!(session = %id.short(), "console connected");
                }
            }
            BridgeEvent::Received(payload) => self.on_payload(id, payload),
            BridgeEvent::Closed(outcome) => self.on_remote_close(id, outcome),
            BridgeEvent::Failed(err) => self.fail(id, err),
        }
    }

    fn on_payload(&mut self, id: &SessionId, payload: Vec<u8>) {
        let Some(session) = self.sessions.get_mut(id) else {
            return;
        };
        if session.state() != LifecycleState::Connected {
            debug!(session = %id.short(), state = %session.state(), "payload outside connected state dropped");
            return;
        }
        session.record_inbound(payload.len());

        let reply = match session.renderer.render(&payload) {
            RenderOutput::Idle => return,
            RenderOutput::Reply(bytes) => bytes,
            RenderOutput::NeedsCredentials => {
                debug!(session = %id.short(), "answering credential request");
                let credential = session.credential().to_string();
                session.renderer.supply_credentials(&credential)
            }
        };
        if reply.is_empty() {
            return;
        }

        if let Err(e) = session.send_input(&reply) {
            warn!(session = %id.short(), error = %e, "could not send protocol reply");
        }
    }

    fn on_remote_close(&mut self, id: &SessionId, outcome: CloseOutcome) {
        let Some(session) = self.sessions.get_mut(id) else {
            return;
        };
        session.release_transport();

        // A control action already decided when this session goes away.
        if session.teardown().is_some() {
            debug!(session = %id.short(), outcome = ?outcome, "transport ended during pending close");
            return;
        }

        match flavor_for(session.kind()).on_remote_close(&outcome) {
            RemoteClosePolicy::CloseNow => {
                self.close_with(id, None);
            }
            RemoteClosePolicy::Linger { banner } => {
                session.renderer.write_banner(&banner);
                let delay = self.settings.error_close_delay;
                self.schedule_teardown(id, delay, TeardownReason::RemoteClosed);
            }
            RemoteClosePolicy::Fail(err) => self.fail(id, err),
        }
    }

    /// Show `err` on the session, drop its transport, and close it after the
    /// error delay.
    pub(crate) fn fail(&mut self, id: &SessionId, err: ConsoleError) {
        let Some(session) = self.sessions.get_mut(id) else {
            return;
        };
        session.release_transport();
        if session.teardown().is_some() {
            debug!(session = %id.short(), error = %err, "error during pending close ignored");
            return;
        }

        warn!(session = %id.short(), target = %session.target(), error = %err, "console session failed");
        session.record_error(err.clone());
        if self.transition(id, LifecycleState::Error).is_err() {
            return;
        }

        if let Some(session) = self.sessions.get_mut(id) {
            if let Some(banner) = flavor_for(session.kind()).error_banner(&err) {
                session.renderer.write_banner(&banner);
            }
        }
        let delay = self.settings.error_close_delay;
        self.schedule_teardown(id, delay, TeardownReason::Failed);
    }

    fn on_control_finished(
        &mut self,
        id: &SessionId,
        verb: ControlVerb,
        result: Result<String, ConsoleError>,
    ) {
        match result {
            Ok(message) => {
                info!(session = %id.short(), verb = %verb, message = %message, "control action succeeded");
                self.bus.publish(ConsoleEvent::ControlCompleted {
                    session: id.clone(),
                    verb,
                    message,
                });
                if verb.tears_down() {
                    let delay = self.settings.control_grace_delay;
                    self.schedule_teardown(id, delay, TeardownReason::Control(verb));
                }
            }
            Err(err) => {
                warn!(session = %id.short(), verb = %verb, error = %err, "control action failed");
                self.bus.publish(ConsoleEvent::ControlFailed {
                    session: id.clone(),
                    verb,
                    message: err.to_string(),
                });
            }
        }
    }

    /// Close the session once `delay` has passed. Only the first schedule
    /// counts.
    fn schedule_teardown(&mut self, id: &SessionId, delay: Duration, reason: TeardownReason) {
        let Some(session) = self.sessions.get_mut(id) else {
            return;
        };
        if session.teardown().is_some() {
            return;
        }
        session.teardown = Some(reason);
        if session.state() != LifecycleState::Error {
            self.tabs.set_status(id, TabStatus::Closing);
        }

        debug!(session = %id.short(), reason = ?reason, delay_ms = delay.as_millis() as u64, "close scheduled");
        let events = self.events.clone();
        let session = id.clone();
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let _ = events.send(SessionEvent::TeardownDue { session, reason });
        });
    }
}
