//! Mutations of the tab strip.

use vmconsole_common::SessionId;

use super::types::{Tab, TabStatus, TabStrip};

impl TabStrip {
    /// Append a tab and bring it to the foreground.
    pub fn open(&mut self, tab: Tab) {
        self.tabs.push(tab);
        self.foreground = Some(self.tabs.len() - 1);
    }

    /// Remove a tab. If it was in the foreground, the oldest remaining tab
    /// takes its place.
    pub fn close(&mut self, session: &SessionId) -> Option<Tab> {
        let idx = self.position(session)?;
        let tab = self.tabs.remove(idx);

        self.foreground = match self.foreground {
            _ if self.tabs.is_empty() => None,
            Some(fg) if fg == idx => Some(0),
            Some(fg) if idx < fg => Some(fg - 1),
            other => other,
        };
        Some(tab)
    }

    /// Bring a tab to the foreground. Returns `false` if it is not here.
    pub fn set_foreground(&mut self, session: &SessionId) -> bool {
        match self.position(session) {
            Some(idx) => {
                self.foreground = Some(idx);
                true
            }
            None => false,
        }
    }

    /// Cycle to the next tab, wrapping around.
    pub fn cycle_next(&mut self) {
        if let Some(fg) = self.foreground {
            self.foreground = Some((fg + 1) % self.tabs.len());
        }
    }

    /// Cycle to the previous tab, wrapping around.
    pub fn cycle_prev(&mut self) {
        if let Some(fg) = self.foreground {
            self.foreground = Some((fg + self.tabs.len() - 1) % self.tabs.len());
        }
    }

    pub fn set_status(&mut self, session: &SessionId, status: TabStatus) -> bool {
        match self.tabs.iter_mut().find(|t| t.session == *session) {
            Some(tab) => {
                tab.status = status;
                true
            }
            None => false,
        }
    }
}
