//! Multiplexed remote-console bridge.
//!
//! Lets one operator hold several live console sessions at once: VNC
//! displays for VMs and text shells for containers or the host. Each
//! session owns one WebSocket transport to the console proxy.
//!
//! - [`SessionRegistry`] is the single owner of every [`ConsoleSession`],
//!   enforces one session per target, and runs the lifecycle state machine.
//! - [`TabStrip`] is the view over the registry: one tab per session,
//!   exactly one in the foreground.
//! - [`bridge`] runs one task per session that owns the transport and
//!   reports [`BridgeEvent`]s back in receipt order.
//! - [`ConsoleMux`] ties it together with the control-action dispatcher and
//!   the clipboard, and is driven by a single consumer loop
//!   ([`ConsoleMux::process_next`]).

pub mod bridge;
pub mod clipboard;
pub mod control;
pub mod events;
pub mod mux;
pub mod registry;
pub mod render;
pub mod session;
pub mod settings;
pub mod tabs;
pub mod transport;

pub use bridge::{BridgeEvent, TransportHandle};
pub use clipboard::{ClipboardSource, StaticClipboard, SystemClipboard};
pub use control::{ControlDispatcher, HttpControlClient};
pub use events::{SessionEvent, TeardownReason};
pub use mux::ConsoleMux;
pub use registry::SessionRegistry;
pub use render::{RecordingFactory, RenderOutput, Renderer, RendererFactory, Transcript};
pub use session::{ConsoleSession, OpenRequest, SessionState, HOST_TARGET};
pub use settings::MuxSettings;
pub use tabs::{Tab, TabStatus, TabStrip};
pub use transport::{CloseOutcome, Connector, Endpoint, Frame, WsConnector};
