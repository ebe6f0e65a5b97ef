//! Text consoles: container shells and the host shell.

use vmconsole_common::{ConsoleError, EndpointHint, SessionKind};

use super::{BridgeFlavor, RemoteClosePolicy};
use crate::settings::MuxSettings;
use crate::transport::{CloseOutcome, Endpoint, Frame};

pub struct TextBridge;

impl BridgeFlavor for TextBridge {
    fn kind(&self) -> SessionKind {
        SessionKind::Text
    }

    fn endpoint(
        &self,
        settings: &MuxSettings,
        target: &str,
        hint: EndpointHint,
    ) -> Result<Endpoint, ConsoleError> {
        match hint {
            EndpointHint::HostShell if !settings.host_shell_allowed => Err(
                ConsoleError::AuthRejected("host shell requires the privileged operator".into()),
            ),
            EndpointHint::HostShell => Ok(Endpoint::host_shell(&settings.ws_url, &settings.token)),
            EndpointHint::Shell => Ok(Endpoint::container_shell(
                &settings.ws_url,
                target,
                &settings.token,
            )),
            EndpointHint::Display { .. } => Err(ConsoleError::TargetUnavailable(format!(
                "{target} is a display target, not a shell"
            ))),
        }
    }

    fn encode_input(&self, pending: &mut Vec<u8>, bytes: &[u8]) -> Option<Frame> {
        pending.extend_from_slice(bytes);
        let (text, tail) = split_utf8(pending);
        *pending = tail;
        (!text.is_empty()).then_some(Frame::Text(text))
    }

    fn encode_paste(&self, text: &str) -> Frame {
        Frame::Text(text.to_string())
    }

    fn on_remote_close(&self, outcome: &CloseOutcome) -> RemoteClosePolicy {
        match outcome {
            CloseOutcome::Clean => RemoteClosePolicy::Linger {
                banner: "[Connection closed]".into(),
            },
            CloseOutcome::Abnormal(reason) => {
                RemoteClosePolicy::Fail(ConsoleError::TransportError(reason.clone()))
            }
        }
    }

    fn error_banner(&self, err: &ConsoleError) -> Option<String> {
        Some(format!("[Connection error: {err}]"))
    }
}

/// Decode as much of `bytes` as forms whole characters and return it with
/// the trailing incomplete sequence, if any.
///
/// The shell proxy only takes text frames, so bytes that can never become
/// UTF-8 are replaced with U+FFFD one invalid sequence at a time.
fn split_utf8(bytes: &[u8]) -> (String, Vec<u8>) {
    let mut text = String::with_capacity(bytes.len());
    let mut rest = bytes;
    loop {
        match std::str::from_utf8(rest) {
            Ok(valid) => {
                text.push_str(valid);
                return (text, Vec::new());
            }
            Err(e) => {
                let (valid, after) = rest.split_at(e.valid_up_to());
                text.push_str(&String::from_utf8_lossy(valid));
                match e.error_len() {
                    None => return (text, after.to_vec()),
                    Some(bad) => {
                        text.push(char::REPLACEMENT_CHARACTER);
                        rest = &after[bad..];
                    }
                }
            }
        }
    }
}
