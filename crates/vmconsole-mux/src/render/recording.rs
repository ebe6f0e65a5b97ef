//! Renderer that keeps everything it is shown, for headless use and tests.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use vmconsole_common::{ConsoleError, LifecycleState, SessionId, SessionKind};

use super::{RenderOutput, Renderer, RendererFactory};

/// Snapshot of what a session has rendered.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TranscriptData {
    /// Payload bytes and banners, in the order they were shown.
    pub output: Vec<u8>,
    pub payloads: usize,
    pub states: Vec<LifecycleState>,
    pub banners: Vec<String>,
    pub last_error: Option<ConsoleError>,
}

/// Shared, cloneable view of one session's rendered output.
#[derive(Debug, Clone, Default)]
pub struct Transcript(Arc<Mutex<TranscriptData>>);

impl Transcript {
    pub fn snapshot(&self) -> TranscriptData {
        self.lock().clone()
    }

    fn lock(&self) -> MutexGuard<'_, TranscriptData> {
        self.0.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

pub struct RecordingRenderer {
    transcript: Transcript,
}

impl RecordingRenderer {
    pub fn new(transcript: Transcript) -> Self {
        Self { transcript }
    }
}

impl Renderer for RecordingRenderer {
    fn render(&mut self, payload: &[u8]) -> RenderOutput {
        let mut data = self.transcript.lock();
        data.output.extend_from_slice(payload);
        data.payloads += 1;
        RenderOutput::Idle
    }

    fn show_state(&mut self, state: LifecycleState, error: Option<&ConsoleError>) {
        let mut data = self.transcript.lock();
        data.states.push(state);
        if let Some(err) = error {
            data.last_error = Some(err.clone());
        }
    }

    fn write_banner(&mut self, line: &str) {
        let mut data = self.transcript.lock();
        data.output.extend_from_slice(b"\r\n");
        data.output.extend_from_slice(line.as_bytes());
        data.output.extend_from_slice(b"\r\n");
        data.banners.push(line.to_string());
    }
}

/// Hands out [`RecordingRenderer`]s and keeps their transcripts by session.
#[derive(Debug, Clone, Default)]
pub struct RecordingFactory {
    transcripts: Arc<Mutex<HashMap<SessionId, Transcript>>>,
}

impl RecordingFactory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn transcript(&self, session: &SessionId) -> Option<Transcript> {
        self.transcripts
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .get(session)
            .cloned()
    }
}

impl RendererFactory for RecordingFactory {
    fn create(&self, session: &SessionId, _kind: SessionKind, _target: &str) -> Box<dyn Renderer> {
        let transcript = Transcript::default();
        self.transcripts
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .insert(session.clone(), transcript.clone());
        Box::new(RecordingRenderer::new(transcript))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_payloads_in_order() {
        let transcript = Transcript::default();
        let mut renderer = RecordingRenderer::new(transcript.clone());

        assert_eq!(renderer.render(b"login: "), RenderOutput::Idle);
        renderer.render(b"root\r\n");

        let data = transcript.snapshot();
        assert_eq!(data.output, b"login: root\r\n");
        assert_eq!(data.payloads, 2);
    }

    #[test]
    fn banner_lands_in_output() {
        let transcript = Transcript::default();
        let mut renderer = RecordingRenderer::new(transcript.clone());
        renderer.render(b"$ ");
        renderer.write_banner("[Connection closed]");

        let data = transcript.snapshot();
        assert_eq!(data.output, b"$ \r\n[Connection closed]\r\n");
        assert_eq!(data.banners, vec!["[Connection closed]".to_string()]);
    }

    #[test]
    fn factory_keeps_transcripts_per_session() {
        let factory = RecordingFactory::new();
        let a = SessionId::new();
        let b = SessionId::new();
        let mut ra = factory.create(&a, SessionKind::Text, "lxc1");
        let _rb = factory.create(&b, SessionKind::Graphical, "vm1");

        ra.show_state(
            LifecycleState::Error,
            Some(&ConsoleError::TransportError("reset".into())),
        );

        let data = factory.transcript(&a).unwrap().snapshot();
        assert_eq!(data.states, vec![LifecycleState::Error]);
        assert!(data.last_error.is_some());
        assert!(factory.transcript(&b).unwrap().snapshot().states.is_empty());
        assert!(factory.transcript(&SessionId::new()).is_none());
    }
}
