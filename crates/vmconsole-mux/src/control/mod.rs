//! Control actions: start, stop, force-stop and delete against a target.
//!
//! The mux never awaits a dispatch on its consumer loop. Calls are spawned
//! and their results come back as [`crate::SessionEvent::ControlFinished`].

mod http;

use async_trait::async_trait;
use vmconsole_common::{ConsoleError, ControlVerb};

pub use http::{ActionResponse, HttpControlClient};

#[async_trait]
pub trait ControlDispatcher: Send + Sync {
    /// Run `verb` against `target`. `Ok` carries the server's message.
    async fn dispatch(&self, target: &str, verb: ControlVerb) -> Result<String, ConsoleError>;
}
