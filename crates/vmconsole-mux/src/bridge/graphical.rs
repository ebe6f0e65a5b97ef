//! Graphical (VNC) consoles. The framebuffer protocol is opaque here:
//! payloads go to the renderer untouched, input goes out untouched.

use vmconsole_common::{ConsoleError, EndpointHint, SessionKind};

use super::{BridgeFlavor, RemoteClosePolicy};
use crate::settings::MuxSettings;
use crate::transport::{CloseOutcome, Endpoint, Frame};

/// RFB client-to-server message type for clipboard text.
const CLIENT_CUT_TEXT: u8 = 6;

pub struct GraphicalBridge;

impl BridgeFlavor for GraphicalBridge {
    fn kind(&self) -> SessionKind {
        SessionKind::Graphical
    }

    fn endpoint(
        &self,
        settings: &MuxSettings,
        target: &str,
        hint: EndpointHint,
    ) -> Result<Endpoint, ConsoleError> {
        match hint.display_port() {
            Some(port) => Ok(Endpoint::display(&settings.ws_url, port, &settings.token)),
            None => Err(ConsoleError::TargetUnavailable(format!(
                "{target} has no display port (is it running?)"
            ))),
        }
    }

    fn encode_input(&self, _pending: &mut Vec<u8>, bytes: &[u8]) -> Option<Frame> {
        Some(Frame::Binary(bytes.to_vec()))
    }

    fn encode_paste(&self, text: &str) -> Frame {
        Frame::Binary(client_cut_text(text))
    }

    fn on_remote_close(&self, outcome: &CloseOutcome) -> RemoteClosePolicy {
        match outcome {
            CloseOutcome::Clean => RemoteClosePolicy::CloseNow,
            CloseOutcome::Abnormal(reason) => {
                RemoteClosePolicy::Fail(ConsoleError::TransportError(reason.clone()))
            }
        }
    }

    fn error_banner(&self, _err: &ConsoleError) -> Option<String> {
        None
    }
}

/// Encode an RFB ClientCutText message.
///
/// Layout: type (1), padding (3), length (u32 BE), Latin-1 text. Characters
/// outside Latin-1 are sent as `?`.
pub fn client_cut_text(text: &str) -> Vec<u8> {
    let latin1: Vec<u8> = text
        .chars()
        .map(|c| u8::try_from(u32::from(c)).unwrap_or(b'?'))
        .collect();

    let mut msg = Vec::with_capacity(8 + latin1.len());
    msg.push(CLIENT_CUT_TEXT);
    msg.extend_from_slice(&[0, 0, 0]);
    msg.extend_from_slice(&(latin1.len() as u32).to_be_bytes());
    msg.extend_from_slice(&latin1);
    msg
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_or_zero_port_is_unavailable() {
        let settings = MuxSettings::default();
        for hint in [
            EndpointHint::Display { port: None },
            EndpointHint::Display { port: Some(0) },
        ] {
            let err = GraphicalBridge.endpoint(&settings, "vm1", hint).unwrap_err();
            assert!(matches!(err, ConsoleError::TargetUnavailable(ref m) if m.contains("vm1")));
        }
    }

    #[test]
    fn display_endpoint_uses_port() {
        let settings = MuxSettings::default();
        let ep = GraphicalBridge
            .endpoint(&settings, "vm1", EndpointHint::Display { port: Some(5901) })
            .unwrap();
        assert_eq!(ep.url(), "ws://127.0.0.1:5000/vnc-proxy/5901");
    }

    #[test]
    fn input_is_forwarded_verbatim() {
        let pointer = [5u8, 0, 0x01, 0x00, 0x00, 0x20];
        let mut pending = Vec::new();
        assert_eq!(
            GraphicalBridge.encode_input(&mut pending, &pointer),
            Some(Frame::Binary(pointer.to_vec()))
        );
        assert!(pending.is_empty());
    }

    #[test]
    fn cut_text_layout() {
        assert_eq!(
            client_cut_text("hi"),
            vec![6, 0, 0, 0, 0, 0, 0, 2, b'h', b'i']
        );
    }

    #[test]
    fn cut_text_latin1() {
        let msg = client_cut_text("caf\u{e9} \u{2603}");
        assert_eq!(&msg[4..8], &6u32.to_be_bytes());
        assert_eq!(&msg[8..], &[b'c', b'a', b'f', 0xe9, b' ', b'?']);
    }

    #[test]
    fn clean_close_is_silent() {
        assert_eq!(
            GraphicalBridge.on_remote_close(&CloseOutcome::Clean),
            RemoteClosePolicy::CloseNow
        );
        assert!(GraphicalBridge
            .error_banner(&ConsoleError::TransportError("reset".into()))
            .is_none());
    }

    #[test]
    fn abnormal_close_fails() {
        let policy = GraphicalBridge.on_remote_close(&CloseOutcome::Abnormal("reset".into()));
        assert_eq!(
            policy,
            RemoteClosePolicy::Fail(ConsoleError::TransportError("reset".into()))
        );
    }
}
