//! # ptt-core
//!
//! Core types for the push-to-talk widget bridge.
//!
//! This crate provides the pure pieces shared by the bridge and its hosts:
//! - Bonded device snapshots and target selection
//! - Frame classification for the device's ASCII command stream
//! - Bridge error taxonomy

pub mod device;
pub mod error;
pub mod frame;

pub use device::{DEFAULT_NAME_PATTERNS, DeviceSelector, ExternalDevice, describe_devices};
pub use error::{BridgeError, Result};
pub use frame::{Frame, PRESS_PREFIX, PttCommand, RELEASE_PREFIX};
