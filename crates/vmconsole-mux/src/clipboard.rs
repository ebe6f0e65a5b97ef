//! Host clipboard access for pasting into graphical consoles.

use vmconsole_common::ConsoleError;

pub trait ClipboardSource {
    fn read_text(&mut self) -> Result<String, ConsoleError>;
}

/// The desktop clipboard via arboard.
pub struct SystemClipboard {
    inner: arboard::Clipboard,
}

impl SystemClipboard {
    pub fn new() -> Result<Self, ConsoleError> {
        let inner = arboard::Clipboard::new().map_err(|e| ConsoleError::Clipboard(e.to_string()))?;
        Ok(Self { inner })
    }
}

impl ClipboardSource for SystemClipboard {
    fn read_text(&mut self) -> Result<String, ConsoleError> {
        self.inner
            .get_text()
            .map_err(|e| ConsoleError::Clipboard(e.to_string()))
    }
}

/// Fixed clipboard content, for headless runs.
#[derive(Debug, Clone, Default)]
pub struct StaticClipboard(pub String);

impl ClipboardSource for StaticClipboard {
    fn read_text(&mut self) -> Result<String, ConsoleError> {
        Ok(self.0.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn static_clipboard_repeats() {
        let mut clip = StaticClipboard("hello".into());
        assert_eq!(clip.read_text().unwrap(), "hello");
        assert_eq!(clip.read_text().unwrap(), "hello");
    }
}
