//! Per-session transport bridges.
//!
//! Each session gets one background task ([`spawn_bridge`]) that owns the
//! transport: it connects under a timeout, forwards outbound frames as soon
//! as they are queued, and reports inbound payloads in receipt order. The
//! session keeps only a [`TransportHandle`]; dropping it cancels the task,
//! whether it is still connecting or already streaming.
//!
//! What differs between consoles lives behind [`BridgeFlavor`]:
//! [`GraphicalBridge`] relays an opaque binary protocol, [`TextBridge`] a
//! character stream.

mod graphical;
mod task;
mod text;

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use vmconsole_common::{ConsoleError, EndpointHint, SessionId, SessionKind};

use crate::events::SessionEvent;
use crate::settings::MuxSettings;
use crate::transport::{CloseOutcome, Connector, Endpoint, Frame};

pub use graphical::{client_cut_text, GraphicalBridge};
pub use text::TextBridge;

// ---------------------------------------------------------------------------
// Events
// ---------------------------------------------------------------------------

/// What the bridge task reports about its transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BridgeEvent {
    Connected,
    /// One inbound payload, exactly as received.
    Received(Vec<u8>),
    /// The transport ended without being asked to.
    Closed(CloseOutcome),
    /// The transport never came up.
    Failed(ConsoleError),
}

// ---------------------------------------------------------------------------
// Flavor
// ---------------------------------------------------------------------------

/// What the registry does when a transport ends on its own.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoteClosePolicy {
    /// Close the session right away, without any message.
    CloseNow,
    /// Keep the session visible with a banner, then close after the error delay.
    Linger { banner: String },
    /// Enter the error state, then close after the error delay.
    Fail(ConsoleError),
}

/// Console-kind specific behavior of a bridge.
pub trait BridgeFlavor: Send + Sync {
    fn kind(&self) -> SessionKind;

    /// Resolve the proxy endpoint, or refuse before any transport exists.
    fn endpoint(
        &self,
        settings: &MuxSettings,
        target: &str,
        hint: EndpointHint,
    ) -> Result<Endpoint, ConsoleError>;

    /// Wrap operator input (keystrokes, pointer events) for the wire.
    ///
    /// `pending` is the session's carry-over between calls; a flavor that
    /// cannot send a partial unit yet keeps it there and may return `None`.
    fn encode_input(&self, pending: &mut Vec<u8>, bytes: &[u8]) -> Option<Frame>;

    /// Wrap pasted clipboard text for the wire.
    fn encode_paste(&self, text: &str) -> Frame;

    fn on_remote_close(&self, outcome: &CloseOutcome) -> RemoteClosePolicy;

    /// Line written into the session's own output when it fails, if the
    /// console has a place to show one.
    fn error_banner(&self, err: &ConsoleError) -> Option<String>;
}

pub fn flavor_for(kind: SessionKind) -> &'static dyn BridgeFlavor {
    match kind {
        SessionKind::Graphical => &GraphicalBridge,
        SessionKind::Text => &TextBridge,
    }
}

// ---------------------------------------------------------------------------
// Handle
// ---------------------------------------------------------------------------

/// Exclusive ownership of one session's transport.
///
/// Dropping the handle releases the transport: the task is cancelled
/// and sends a best-effort close frame if it got that far. Release never
/// waits for the remote side.
#[derive(Debug)]
pub struct TransportHandle {
    outbound: mpsc::UnboundedSender<Frame>,
    cancel: CancellationToken,
}

impl TransportHandle {
    /// Queue a frame. Fails only once the task has stopped.
    pub fn send(&self, frame: Frame) -> Result<(), ConsoleError> {
        self.outbound
            .send(frame)
            .map_err(|_| ConsoleError::TransportError("transport is closed".into()))
    }

    pub fn release(self) {
        drop(self);
    }
}

impl Drop for TransportHandle {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

/// Start the bridge task for `session`. Events come back on `events`.
pub fn spawn_bridge(
    session: SessionId,
    endpoint: Endpoint,
    connector: Arc<dyn Connector>,
    connect_timeout: Duration,
    events: mpsc::UnboundedSender<SessionEvent>,
) -> TransportHandle {
    let (outbound, outbound_rx) = mpsc::unbounded_channel();
    let cancel = CancellationToken::new();

    tokio::spawn(task::run_bridge(
        task::BridgeTask {
            session,
            endpoint,
            connector,
            connect_timeout,
            events,
        },
        outbound_rx,
        cancel.clone(),
    ));

    TransportHandle { outbound, cancel }
}

#[cfg(test)]
mod tests {
    use std::pin::Pin;
    use std::sync::Mutex;
    use std::task::{Context, Poll};

    use async_trait::async_trait;
    use futures_util::{stream, Sink};
    use tokio::sync::oneshot;

    use super::*;
    use crate::transport::{ChannelConnector, FrameSink, FrameStream};

    /// Accepts the connection, then never reads another frame.
    struct StalledConnector {
        guard: Mutex<Option<oneshot::Sender<()>>>,
    }

    /// Dropping the sink drops the guard, which is how tests see the
    /// transport being let go.
    struct StalledSink {
        _guard: Option<oneshot::Sender<()>>,
    }

    impl Sink<Frame> for StalledSink {
        type Error = ConsoleError;

        fn poll_ready(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<Result<(), ConsoleError>> {
            Poll::Pending
        }

        fn start_send(self: Pin<&mut Self>, _item: Frame) -> Result<(), ConsoleError> {
            Ok(())
        }

        fn poll_flush(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<Result<(), ConsoleError>> {
            Poll::Pending
        }

        fn poll_close(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<Result<(), ConsoleError>> {
            Poll::Pending
        }
    }

    #[async_trait]
    impl Connector for StalledConnector {
        async fn connect(&self, _endpoint: &Endpoint) -> Result<(FrameSink, FrameStream), ConsoleError> {
            let guard = self.guard.lock().unwrap().take();
            let sink: FrameSink = Box::pin(StalledSink { _guard: guard });
            let stream: FrameStream = Box::pin(stream::pending::<Result<Frame, ConsoleError>>());
            Ok((sink, stream))
        }
    }

    fn endpoint() -> Endpoint {
        Endpoint::container_shell("ws://127.0.0.1:5000", "lxc1", "")
    }

    async fn next_bridge_event(rx: &mut mpsc::UnboundedReceiver<SessionEvent>) -> BridgeEvent {
        match rx.recv().await {
            Some(SessionEvent::Bridge { event, .. }) => event,
            other => panic!("expected bridge event, got {other:?}"),
        }
    }

    #[test]
    fn flavors_match_kinds() {
        assert_eq!(flavor_for(SessionKind::Graphical).kind(), SessionKind::Graphical);
        assert_eq!(flavor_for(SessionKind::Text).kind(), SessionKind::Text);
    }

    #[tokio::test]
    async fn frames_flow_both_ways() {
        let (connector, mut remotes) = ChannelConnector::new();
        let (events_tx, mut events) = mpsc::unbounded_channel();
        let handle = spawn_bridge(
            SessionId::new(),
            endpoint(),
            Arc::new(connector),
            Duration::from_secs(15),
            events_tx,
        );

        let mut remote = remotes.recv().await.unwrap();
        assert_eq!(next_bridge_event(&mut events).await, BridgeEvent::Connected);

        handle.send(Frame::Text("uptime\r".into())).unwrap();
        assert_eq!(remote.from_local.recv().await, Some(Frame::Text("uptime\r".into())));

        remote.push(Frame::Text("up 3 days".into()));
        assert_eq!(
            next_bridge_event(&mut events).await,
            BridgeEvent::Received(b"up 3 days".to_vec())
        );
    }

    #[tokio::test]
    async fn release_closes_and_drops_transport() {
        let (connector, mut remotes) = ChannelConnector::new();
        let (events_tx, mut events) = mpsc::unbounded_channel();
        let handle = spawn_bridge(
            SessionId::new(),
            endpoint(),
            Arc::new(connector),
            Duration::from_secs(15),
            events_tx,
        );
        let mut remote = remotes.recv().await.unwrap();
        assert_eq!(next_bridge_event(&mut events).await, BridgeEvent::Connected);

        handle.release();

        assert_eq!(remote.from_local.recv().await, Some(Frame::close_normal()));
        assert_eq!(remote.from_local.recv().await, None);
    }

    #[tokio::test(start_paused = true)]
    async fn release_does_not_wait_for_a_stalled_peer() {
        let (guard, dropped) = oneshot::channel::<()>();
        let connector = StalledConnector {
            guard: Mutex::new(Some(guard)),
        };
        let (events_tx, mut events) = mpsc::unbounded_channel();
        let handle = spawn_bridge(
            SessionId::new(),
            endpoint(),
            Arc::new(connector),
            Duration::from_secs(15),
            events_tx,
        );
        assert_eq!(next_bridge_event(&mut events).await, BridgeEvent::Connected);

        handle.send(Frame::Text("x".into())).unwrap();
        tokio::task::yield_now().await;
        handle.release();

        let released = tokio::time::timeout(Duration::from_secs(3600), dropped).await;
        assert!(matches!(released, Ok(Err(_))), "transport still held after release");
    }

    #[tokio::test]
    async fn remote_error_reports_abnormal_close() {
        let (connector, mut remotes) = ChannelConnector::new();
        let (events_tx, mut events) = mpsc::unbounded_channel();
        let _handle = spawn_bridge(
            SessionId::new(),
            endpoint(),
            Arc::new(connector),
            Duration::from_secs(15),
            events_tx,
        );
        let remote = remotes.recv().await.unwrap();
        assert_eq!(next_bridge_event(&mut events).await, BridgeEvent::Connected);

        remote.fail(ConsoleError::TransportError("connection reset".into()));
        assert_eq!(
            next_bridge_event(&mut events).await,
            BridgeEvent::Closed(CloseOutcome::Abnormal("connection reset".into()))
        );
    }

    #[tokio::test(start_paused = true)]
    async fn connect_timeout_fails() {
        let (connector, _remotes) = ChannelConnector::new();
        let _guard = connector.hang_next();
        let (events_tx, mut events) = mpsc::unbounded_channel();
        let _handle = spawn_bridge(
            SessionId::new(),
            endpoint(),
            Arc::new(connector),
            Duration::from_secs(15),
            events_tx,
        );

        let started = tokio::time::Instant::now();
        match next_bridge_event(&mut events).await {
            BridgeEvent::Failed(ConsoleError::TransportError(msg)) => {
                assert!(msg.contains("timed out"))
            }
            other => panic!("unexpected: {other:?}"),
        }
        assert!(started.elapsed() >= Duration::from_secs(15));
    }

    #[tokio::test]
    async fn release_while_connecting_abandons_attempt() {
        let (connector, _remotes) = ChannelConnector::new();
        let abandoned = connector.hang_next();
        let connector = Arc::new(connector);
        let (events_tx, mut events) = mpsc::unbounded_channel();
        let handle = spawn_bridge(
            SessionId::new(),
            endpoint(),
            connector.clone(),
            Duration::from_secs(15),
            events_tx,
        );

        while connector.attempts() == 0 {
            tokio::task::yield_now().await;
        }
        handle.release();

        assert!(abandoned.await.is_err());
        // Nothing is reported for a released transport.
        assert!(events.recv().await.is_none());
    }
}
