//! In-process connector: each accepted connection hands the far end to
//! whoever holds the receiver returned by [`ChannelConnector::new`].

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use futures_util::{sink, stream};
use tokio::sync::{mpsc, oneshot};
use vmconsole_common::ConsoleError;

use super::{Connector, Endpoint, Frame, FrameSink, FrameStream};

enum Plan {
    Reject(ConsoleError),
    /// Never completes; the sender is dropped when the attempt is abandoned.
    Hang(oneshot::Sender<()>),
}

/// The proxy side of one accepted connection.
#[derive(Debug)]
pub struct RemoteEnd {
    pub endpoint: Endpoint,
    /// Frames (or errors) delivered to the local session, in order.
    pub to_local: mpsc::UnboundedSender<Result<Frame, ConsoleError>>,
    /// Frames the local session sent.
    pub from_local: mpsc::UnboundedReceiver<Frame>,
}

impl RemoteEnd {
    pub fn push(&self, frame: Frame) -> bool {
        self.to_local.send(Ok(frame)).is_ok()
    }

    pub fn fail(&self, err: ConsoleError) -> bool {
        self.to_local.send(Err(err)).is_ok()
    }
}

pub struct ChannelConnector {
    remotes: mpsc::UnboundedSender<RemoteEnd>,
    plans: Mutex<VecDeque<Plan>>,
    attempts: AtomicUsize,
}

impl ChannelConnector {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<RemoteEnd>) {
        let (remotes, remotes_rx) = mpsc::unbounded_channel();
        let connector = Self {
            remotes,
            plans: Mutex::new(VecDeque::new()),
            attempts: AtomicUsize::new(0),
        };
        (connector, remotes_rx)
    }

    /// Make the next connect attempt fail with `err`.
    pub fn reject_next(&self, err: ConsoleError) {
        self.push_plan(Plan::Reject(err));
    }

    /// Make the next connect attempt hang. The returned receiver resolves
    /// (with an error) once the attempt has been dropped.
    pub fn hang_next(&self) -> oneshot::Receiver<()> {
        let (tx, rx) = oneshot::channel();
        self.push_plan(Plan::Hang(tx));
        rx
    }

    /// Number of connect attempts made so far.
    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }

    fn push_plan(&self, plan: Plan) {
        self.plans
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push_back(plan);
    }

    fn next_plan(&self) -> Option<Plan> {
        self.plans
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .pop_front()
    }
}

#[async_trait]
impl Connector for ChannelConnector {
    async fn connect(&self, endpoint: &Endpoint) -> Result<(FrameSink, FrameStream), ConsoleError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);

        match self.next_plan() {
            Some(Plan::Reject(err)) => return Err(err),
            Some(Plan::Hang(guard)) => {
                let _guard = guard;
                return std::future::pending().await;
            }
            None => {}
        }

        let (to_local, inbound) = mpsc::unbounded_channel::<Result<Frame, ConsoleError>>();
        let (outbound, from_local) = mpsc::unbounded_channel::<Frame>();

        let remote = RemoteEnd {
            endpoint: endpoint.clone(),
            to_local,
            from_local,
        };
        self.remotes
            .send(remote)
            .map_err(|_| ConsoleError::TransportError("no remote listening".into()))?;

        let frame_sink = sink::unfold(outbound, |outbound, frame: Frame| async move {
            outbound
                .send(frame)
                .map_err(|_| ConsoleError::TransportError("remote end dropped".into()))?;
            Ok::<_, ConsoleError>(outbound)
        });
        let frame_stream = stream::unfold(inbound, |mut inbound| async move {
            inbound.recv().await.map(|item| (item, inbound))
        });

        Ok((Box::pin(frame_sink), Box::pin(frame_stream)))
    }
}
