//! Tab strip: one tab per console session, one of them in the foreground.
//!
//! The strip only mirrors the registry. Tabs are inserted and removed by the
//! registry in lockstep with sessions; the strip decides which tab is on top.

mod operations;
mod types;

pub use types::{Tab, TabStatus, TabStrip};
