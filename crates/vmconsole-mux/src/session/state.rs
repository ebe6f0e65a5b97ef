//! Validated lifecycle state of one session.

use vmconsole_common::{ConsoleError, LifecycleState};

/// Current state plus the path that led to it.
#[derive(Debug, Clone)]
pub struct SessionState {
    current: LifecycleState,
    history: Vec<LifecycleState>,
}

impl SessionState {
    pub fn new() -> Self {
        Self {
            current: LifecycleState::Created,
            history: vec![LifecycleState::Created],
        }
    }

    pub fn current(&self) -> LifecycleState {
        self.current
    }

    /// Every state visited so far, oldest first.
    pub fn history(&self) -> &[LifecycleState] {
        &self.history
    }

    /// Move to `to`. Illegal edges are refused and leave the state untouched.
    pub fn transition(&mut self, to: LifecycleState) -> Result<LifecycleState, ConsoleError> {
        let from = self.current;
        if !from.can_transition_to(to) {
            return Err(ConsoleError::InvalidTransition { from, to });
        }
        self.current = to;
        self.history.push(to);
        Ok(from)
    }
}

impl Default for SessionState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use LifecycleState::*;

    #[test]
    fn starts_created() {
        let state = SessionState::new();
        assert_eq!(state.current(), Created);
        assert_eq!(state.history(), &[Created]);
    }

    #[test]
    fn error_path_is_recorded() {
        let mut state = SessionState::new();
        assert_eq!(state.transition(Connecting).unwrap(), Created);
        assert_eq!(state.transition(Connected).unwrap(), Connecting);
        assert_eq!(state.transition(Error).unwrap(), Connected);
        assert_eq!(state.transition(Closed).unwrap(), Error);
        assert_eq!(state.history(), &[Created, Connecting, Connected, Error, Closed]);
    }

    #[test]
    fn illegal_transition_leaves_state() {
        let mut state = SessionState::new();
        let err = state.transition(Connected).unwrap_err();
        assert_eq!(
            err,
            ConsoleError::InvalidTransition {
                from: Created,
                to: Connected
            }
        );
        assert_eq!(state.current(), Created);
        assert_eq!(state.history().len(), 1);
    }

    #[test]
    fn closed_cannot_reopen() {
        let mut state = SessionState::new();
        state.transition(Closed).unwrap();
        assert!(state.transition(Connecting).is_err());
        assert!(state.transition(Closed).is_err());
    }
}
