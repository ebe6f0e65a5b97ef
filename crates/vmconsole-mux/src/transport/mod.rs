//! Message-oriented duplex transport to the console proxy.
//!
//! A [`Connector`] turns an [`Endpoint`] into a sink/stream pair of
//! [`Frame`]s. The production connector speaks WebSocket; tests plug in
//! [`ChannelConnector`] instead.

mod channel;
mod endpoint;
mod websocket;

use std::pin::Pin;

use async_trait::async_trait;
use futures_util::{Sink, Stream};
use vmconsole_common::ConsoleError;

pub use channel::{ChannelConnector, RemoteEnd};
pub use endpoint::Endpoint;
pub use websocket::WsConnector;

/// Close code for a normal, completed closing handshake.
pub const CLOSE_NORMAL: u16 = 1000;
/// The peer is going away (server shutdown, VM powered off).
pub const CLOSE_GOING_AWAY: u16 = 1001;
/// A close frame arrived without a status code.
pub const CLOSE_NO_STATUS: u16 = 1005;

// ---------------------------------------------------------------------------
// Frame
// ---------------------------------------------------------------------------

/// One discrete message on the transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Frame {
    Binary(Vec<u8>),
    Text(String),
    Close { code: u16, reason: String },
}

impl Frame {
    pub fn close_normal() -> Self {
        Frame::Close {
            code: CLOSE_NORMAL,
            reason: String::new(),
        }
    }

    /// Payload size in bytes; close frames count as empty.
    pub fn len(&self) -> usize {
        match self {
            Frame::Binary(bytes) => bytes.len(),
            Frame::Text(text) => text.len(),
            Frame::Close { .. } => 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

// ---------------------------------------------------------------------------
// Close outcome
// ---------------------------------------------------------------------------

/// How a transport ended when the local side did not ask it to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CloseOutcome {
    /// Closing handshake completed normally.
    Clean,
    /// Dropped, reset, or closed with an error code.
    Abnormal(String),
}

impl CloseOutcome {
    pub fn from_close_code(code: u16, reason: &str) -> Self {
        match code {
            CLOSE_NORMAL | CLOSE_GOING_AWAY | CLOSE_NO_STATUS => CloseOutcome::Clean,
            _ if reason.is_empty() => CloseOutcome::Abnormal(format!("closed with code {code}")),
            _ => CloseOutcome::Abnormal(format!("closed with code {code}: {reason}")),
        }
    }

    pub fn is_clean(&self) -> bool {
        matches!(self, CloseOutcome::Clean)
    }
}

// ---------------------------------------------------------------------------
// Connector
// ---------------------------------------------------------------------------

pub type FrameSink = Pin<Box<dyn Sink<Frame, Error = ConsoleError> + Send>>;
pub type FrameStream = Pin<Box<dyn Stream<Item = Result<Frame, ConsoleError>> + Send>>;

/// Opens transports. One call per session; never retried by the caller.
#[async_trait]
pub trait Connector: Send + Sync {
    async fn connect(&self, endpoint: &Endpoint) -> Result<(FrameSink, FrameStream), ConsoleError>;
}
