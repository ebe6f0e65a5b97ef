//! Console sessions and their lifecycle.

mod state;
mod types;

pub use state::SessionState;
pub use types::{ConsoleSession, OpenRequest, HOST_TARGET};
