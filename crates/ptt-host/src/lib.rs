//! # ptt-host
//!
//! Seam between the bridge and the hosted script environment.
//!
//! This crate provides:
//! - `ScriptHost` trait for delivering messages into a web view
//! - Execution-context hand-off (`HostHandle` / `HostExecutor`)
//! - Target origin derivation from a base location
//! - JSON-lines host for embedders driving the bridge over stdio

pub mod context;
pub mod host;
pub mod origin;
pub mod stdio;

pub use context::{HostExecutor, HostHandle, host_context};
pub use host::{DeliveryError, HostCall, RecordingHost, ScriptHost};
pub use origin::{HostError, origin_of};
pub use stdio::StdioHost;
