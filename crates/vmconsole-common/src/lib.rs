pub mod errors;
pub mod events;
pub mod id;
pub mod types;

pub use errors::{ConfigError, ConsoleError, VmConsoleError};
pub use events::{ConsoleEvent, EventBus};
pub use id::{new_id, SessionId};
pub use types::{ControlVerb, EndpointHint, LifecycleState, SessionKind};

pub type Result<T> = std::result::Result<T, VmConsoleError>;
