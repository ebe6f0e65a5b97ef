//! Renderers for a plain terminal: text sessions go straight to stdout,
//! display sessions are summarized.

use std::io::Write;

use tracing::{debug, info};
use vmconsole_common::{ConsoleError, LifecycleState, SessionId, SessionKind};
use vmconsole_mux::{RenderOutput, Renderer, RendererFactory};

/// How often a display session logs its frame counters.
const STATS_EVERY: u64 = 500;

/// Writes remote bytes to stdout unchanged; status goes to stderr.
pub struct TerminalRenderer {
    target: String,
}

impl Renderer for TerminalRenderer {
    fn render(&mut self, payload: &[u8]) -> RenderOutput {
        let mut stdout = std::io::stdout().lock();
        if let Err(e) = stdout.write_all(payload).and_then(|_| stdout.flush()) {
            debug!(error = %e, "stdout write failed");
        }
        RenderOutput::Idle
    }

    fn show_state(&mut self, state: LifecycleState, error: Option<&ConsoleError>) {
        match (state, error) {
            (LifecycleState::Error, Some(err)) => eprintln!("[{}] {err}", self.target),
            (LifecycleState::Connecting | LifecycleState::Connected, _) => {
                eprintln!("[{}] {state}", self.target)
            }
            _ => {}
        }
    }

    fn write_banner(&mut self, line: &str) {
        let mut stdout = std::io::stdout().lock();
        let _ = write!(stdout, "\r\n{line}\r\n");
        let _ = stdout.flush();
    }
}

/// Counts framebuffer traffic for a display session.
pub struct DisplayStatsRenderer {
    target: String,
    frames: u64,
    bytes: u64,
}

impl Renderer for DisplayStatsRenderer {
    fn render(&mut self, payload: &[u8]) -> RenderOutput {
        self.frames += 1;
        self.bytes += payload.len() as u64;
        if self.frames % STATS_EVERY == 0 {
            info!(target_name = %self.target, frames = self.frames, bytes = self.bytes, "display traffic");
        }
        RenderOutput::Idle
    }

    fn show_state(&mut self, state: LifecycleState, error: Option<&ConsoleError>) {
        match (state, error) {
            (LifecycleState::Error, Some(err)) => eprintln!("[{}] {err}", self.target),
            (LifecycleState::Closed, _) => eprintln!(
                "[{}] closed after {} frames ({} bytes)",
                self.target, self.frames, self.bytes
            ),
            _ => eprintln!("[{}] {state}", self.target),
        }
    }
}

pub struct StdioRendererFactory;

impl RendererFactory for StdioRendererFactory {
    fn create(&self, _session: &SessionId, kind: SessionKind, target: &str) -> Box<dyn Renderer> {
        let target = target.to_string();
        match kind {
            SessionKind::Text => Box::new(TerminalRenderer { target }),
            SessionKind::Graphical => Box::new(DisplayStatsRenderer {
                target,
                frames: 0,
                bytes: 0,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_counts_traffic() {
        let mut renderer = DisplayStatsRenderer {
            target: "vm1".into(),
            frames: 0,
            bytes: 0,
        };
        renderer.render(&[0; 12]);
        renderer.render(&[0; 30]);
        assert_eq!(renderer.frames, 2);
        assert_eq!(renderer.bytes, 42);
    }
}
