//! Delivery of button commands into the widget's script environment

use ptt_core::{BridgeError, PttCommand, Result};
use ptt_host::{HostHandle, origin_of};
use tracing::debug;

/// Posts commands and diagnostics to the hosted page
///
/// Every call is handed off to the host's execution context through a
/// [`HostHandle`]; nothing here touches the host directly.
#[derive(Debug, Clone)]
pub struct ScriptBridge {
    host: HostHandle,
    target_origin: String,
}

impl ScriptBridge {
    /// Create a bridge addressing the origin of `base_location`
    pub fn new(host: HostHandle, base_location: &str) -> Result<Self> {
        let target_origin =
            origin_of(base_location).map_err(|e| BridgeError::InvalidBaseLocation(e.to_string()))?;
        Ok(Self {
            host,
            target_origin,
        })
    }

    /// Origin every message is addressed to
    pub fn target_origin(&self) -> &str {
        &self.target_origin
    }

    /// Post a button command (`pttp` / `pttr`)
    pub fn post(&self, command: PttCommand) {
        debug!("Posting {:?} to {}", command, self.target_origin);
        // Best effort; a detached host just drops it
        self.host
            .post_message(command.payload(), self.target_origin.as_str());
    }

    /// Surface a failure to the user
    pub fn diagnostic(&self, error: &BridgeError) {
        self.host.alert(error.to_string());
    }
}
