//! The bridge task: connect, then pump frames until cancelled or closed.

use std::sync::Arc;
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use vmconsole_common::{ConsoleError, SessionId};

use super::BridgeEvent;
use crate::events::SessionEvent;
use crate::transport::{CloseOutcome, Connector, Endpoint, Frame};

/// Upper bound on flushing the close frame during release.
const CLOSE_FLUSH_TIMEOUT: Duration = Duration::from_millis(250);

pub(super) struct BridgeTask {
    pub session: SessionId,
    pub endpoint: Endpoint,
    pub connector: Arc<dyn Connector>,
    pub connect_timeout: Duration,
    pub events: mpsc::UnboundedSender<SessionEvent>,
}

impl BridgeTask {
    fn emit(&self, event: BridgeEvent) {
        // The receiver is gone only when the whole mux is.
        let _ = self.events.send(SessionEvent::Bridge {
            session: self.session.clone(),
            event,
        });
    }
}

pub(super) async fn run_bridge(
    task: BridgeTask,
    mut outbound: mpsc::UnboundedReceiver<Frame>,
    cancel: CancellationToken,
) {
    let session = task.session.short().to_string();
    debug!(session = %session, endpoint = task.endpoint.redacted(), "connecting");

    let connect = tokio::time::timeout(task.connect_timeout, task.connector.connect(&task.endpoint));
    let (mut sink, mut stream) = tokio::select! {
        _ = cancel.cancelled() => {
            debug!(session = %session, "released while connecting");
            return;
        }
        result = connect => match result {
            Ok(Ok(pair)) => pair,
            Ok(Err(e)) => {
                warn!(session = %session, error = %e, "connect failed");
                task.emit(BridgeEvent::Failed(e));
                return;
            }
            Err(_elapsed) => {
                let secs = task.connect_timeout.as_secs();
                warn!(session = %session, "connect timed out after {secs}s");
                task.emit(BridgeEvent::Failed(ConsoleError::TransportError(format!(
                    "connection timed out after {secs}s"
                ))));
                return;
            }
        }
    };

    info!(session = %session, endpoint = task.endpoint.redacted(), "transport connected");
    task.emit(BridgeEvent::Connected);

    let outcome = loop {
        tokio::select! {
            biased;

            _ = cancel.cancelled() => {
                let _ = tokio::time::timeout(CLOSE_FLUSH_TIMEOUT, sink.send(Frame::close_normal())).await;
                debug!(session = %session, "transport released");
                return;
            }

            Some(frame) = outbound.recv() => {
                // A peer that stops reading must not hold the release up.
                tokio::select! {
                    biased;

                    _ = cancel.cancelled() => {
                        debug!(session = %session, "transport released with a send pending");
                        return;
                    }
                    sent = sink.send(frame) => {
                        if let Err(e) = sent {
                            break CloseOutcome::Abnormal(reason_of(e));
                        }
                    }
                }
            }

            inbound = stream.next() => match inbound {
                Some(Ok(Frame::Binary(bytes))) => task.emit(BridgeEvent::Received(bytes)),
                Some(Ok(Frame::Text(text))) => task.emit(BridgeEvent::Received(text.into_bytes())),
                Some(Ok(Frame::Close { code, reason })) => {
                    break CloseOutcome::from_close_code(code, &reason);
                }
                Some(Err(e)) => break CloseOutcome::Abnormal(reason_of(e)),
                None => break CloseOutcome::Abnormal("connection dropped".into()),
            },
        }
    };

    match &outcome {
        CloseOutcome::Clean => info!(session = %session, "remote closed transport"),
        CloseOutcome::Abnormal(reason) => {
            warn!(session = %session, reason = %reason, "transport lost")
        }
    }
    task.emit(BridgeEvent::Closed(outcome));
}

fn reason_of(err: ConsoleError) -> String {
    match err {
        ConsoleError::TransportError(reason) => reason,
        other => other.to_string(),
    }
}
