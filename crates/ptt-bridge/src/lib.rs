//! Bridge between a serial push-to-talk device and a hosted widget
//!
//! This crate provides:
//! - Transport abstractions (`Connector`, `Connection`) over the SPP service
//! - TCP relay and RFCOMM tty transports
//! - Frame reader loop turning `+PTT=P` / `+PTT=R` into `pttp` / `pttr`
//! - Script bridge handing messages to the host's execution context
//! - Bridge controller with start-once / teardown lifecycle

pub mod config;
pub mod controller;
pub mod endpoint;
pub mod permission;
pub mod reader;
pub mod registry;
pub mod script;
pub mod tcp;
pub mod transport;
#[cfg(unix)]
pub mod tty;

pub use config::{BridgeConfig, DeviceEntry, Endpoint};
pub use controller::BridgeController;
pub use endpoint::EndpointConnector;
pub use permission::{AlwaysGranted, Permission, PermissionCallback, PermissionGate, required_permissions};
pub use reader::{LoopExit, READ_BUFFER_SIZE, reader_loop};
pub use registry::{DeviceRegistry, StaticRegistry};
pub use script::ScriptBridge;
pub use transport::{ByteStream, CloseHandle, Connection, ConnectionState, Connector, SPP_SERVICE_UUID};

pub use ptt_core::{BridgeError, DeviceSelector, ExternalDevice, Frame, PttCommand, Result};
