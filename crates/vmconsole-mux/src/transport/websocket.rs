//! WebSocket connector backed by tokio-tungstenite.

use async_trait::async_trait;
use futures_util::{future, SinkExt, StreamExt};
use tokio_tungstenite::tungstenite::protocol::frame::coding::CloseCode;
use tokio_tungstenite::tungstenite::protocol::CloseFrame;
use tokio_tungstenite::tungstenite::{Error as WsError, Message as WsMessage};
use tracing::debug;
use vmconsole_common::ConsoleError;

use super::{Connector, Endpoint, Frame, FrameSink, FrameStream, CLOSE_NO_STATUS};

/// Connects to the console proxy over `ws://` or `wss://`.
///
/// Ping/pong is handled inside tungstenite and never surfaces as a frame.
#[derive(Debug, Clone, Copy, Default)]
pub struct WsConnector;

#[async_trait]
impl Connector for WsConnector {
    async fn connect(&self, endpoint: &Endpoint) -> Result<(FrameSink, FrameStream), ConsoleError> {
        debug!(endpoint = %endpoint, "opening websocket");
        let (ws_stream, _response) = tokio_tungstenite::connect_async(endpoint.url())
            .await
            .map_err(map_connect_error)?;

        let (ws_write, ws_read) = ws_stream.split();

        let sink = ws_write
            .sink_map_err(|e| ConsoleError::TransportError(e.to_string()))
            .with(|frame: Frame| future::ready(Ok::<_, ConsoleError>(to_message(frame))));
        let stream = ws_read.filter_map(|msg| future::ready(from_message(msg)));

        Ok((Box::pin(sink), Box::pin(stream)))
    }
}

/// The proxy answers the upgrade with 401/403 when the token is wrong or the
/// operator may not open this console.
fn map_connect_error(err: WsError) -> ConsoleError {
    match err {
        WsError::Http(response) => {
            let status = response.status();
            if status.as_u16() == 401 || status.as_u16() == 403 {
                ConsoleError::AuthRejected(format!("proxy answered HTTP {}", status.as_u16()))
            } else {
                ConsoleError::TransportError(format!("proxy answered HTTP {}", status.as_u16()))
            }
        }
        other => ConsoleError::TransportError(other.to_string()),
    }
}

fn to_message(frame: Frame) -> WsMessage {
    match frame {
        Frame::Binary(bytes) => WsMessage::Binary(bytes.into()),
        Frame::Text(text) => WsMessage::Text(text.into()),
        Frame::Close { code, reason } => WsMessage::Close(Some(CloseFrame {
            code: CloseCode::from(code),
            reason: reason.into(),
        })),
    }
}

fn from_message(msg: Result<WsMessage, WsError>) -> Option<Result<Frame, ConsoleError>> {
    match msg {
        Ok(WsMessage::Binary(bytes)) => Some(Ok(Frame::Binary(bytes.to_vec()))),
        Ok(WsMessage::Text(text)) => Some(Ok(Frame::Text(text.to_string()))),
        Ok(WsMessage::Close(Some(close))) => Some(Ok(Frame::Close {
            code: u16::from(close.code),
            reason: close.reason.to_string(),
        })),
        Ok(WsMessage::Close(None)) => Some(Ok(Frame::Close {
            code: CLOSE_NO_STATUS,
            reason: String::new(),
        })),
        Ok(WsMessage::Ping(_)) | Ok(WsMessage::Pong(_)) | Ok(WsMessage::Frame(_)) => None,
        Err(WsError::ConnectionClosed) | Err(WsError::AlreadyClosed) => None,
        Err(e) => Some(Err(ConsoleError::TransportError(e.to_string()))),
    }
}
