//! Interactive console loop: one session, stdin in, renderer out.
//!
//! Lines starting with `~` are local commands: `~.` closes the session,
//! `~paste` pastes the host clipboard, `~<verb>` runs a control action
//! (`~stop`, `~force-stop`, `~start`, `~delete`).

use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, info, warn};
use vmconsole_common::{ConsoleError, ControlVerb, SessionId, SessionKind};
use vmconsole_config::ConsoleConfig;
use vmconsole_mux::{
    ConsoleMux, HttpControlClient, MuxSettings, OpenRequest, SystemClipboard, WsConnector,
};

use crate::renderer::StdioRendererFactory;

pub async fn run_console(config: &ConsoleConfig, request: OpenRequest) -> vmconsole_common::Result<()> {
    let control = HttpControlClient::new(config.proxy.api_url.clone(), config.proxy.token.clone())?;
    let mut mux = ConsoleMux::new(
        MuxSettings::from(config),
        Arc::new(WsConnector),
        Arc::new(StdioRendererFactory),
        Arc::new(control),
    );
    match SystemClipboard::new() {
        Ok(clipboard) => mux = mux.with_clipboard(Box::new(clipboard)),
        Err(e) => debug!(error = %e, "no system clipboard, ~paste disabled"),
    }

    let kind = request.kind();
    let id = mux.open(request);
    let mut last_error: Option<ConsoleError> = None;

    let mut stdin = BufReader::new(tokio::io::stdin()).lines();
    let mut stdin_open = true;

    loop {
        tokio::select! {
            _ = mux.process_next() => {}

            line = stdin.next_line(), if stdin_open => match line {
                Ok(Some(line)) => handle_line(&mut mux, &id, kind, &line),
                Ok(None) => {
                    debug!("stdin closed");
                    stdin_open = false;
                    if kind == SessionKind::Text {
                        mux.close(&id);
                    }
                }
                Err(e) => {
                    warn!(error = %e, "stdin read failed");
                    stdin_open = false;
                }
            },

            _ = tokio::signal::ctrl_c() => {
                info!("interrupted");
                mux.close(&id);
            }
        }

        match mux.session(&id) {
            Some(session) => {
                if let Some(err) = session.last_error() {
                    last_error = Some(err.clone());
                }
            }
            None => break,
        }
    }

    match last_error {
        Some(err) if err.is_visible() => Err(err.into()),
        _ => Ok(()),
    }
}

fn handle_line(mux: &mut ConsoleMux, id: &SessionId, kind: SessionKind, line: &str) {
    let result = match line.trim() {
        "~." => {
            mux.close(id);
            Ok(())
        }
        "~paste" => mux.paste_clipboard(id),
        cmd if cmd.starts_with('~') => match cmd[1..].parse::<ControlVerb>() {
            Ok(verb) => mux.send_control_action(id, verb),
            Err(e) => {
                eprintln!("{e}");
                Ok(())
            }
        },
        _ if kind == SessionKind::Text => mux.send_input(id, format!("{line}\r").as_bytes()),
        _ => {
            eprintln!("display sessions only take ~ commands");
            Ok(())
        }
    };
    if let Err(e) = result {
        eprintln!("{e}");
    }
}
