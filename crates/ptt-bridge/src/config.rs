//! Bridge configuration

use crate::endpoint::EndpointConnector;
use crate::permission::{Permission, required_permissions};
use crate::registry::StaticRegistry;
use ptt_core::{BridgeError, DEFAULT_NAME_PATTERNS, DeviceSelector, ExternalDevice, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// How a bonded device's serial stream is reached
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Endpoint {
    /// RFCOMM relay listening on `host:port`
    Tcp {
        /// Relay address
        addr: String,
    },
    /// Kernel-bound RFCOMM serial device
    Tty {
        /// Device node, e.g. `/dev/rfcomm0`
        path: PathBuf,
    },
}

/// One entry of the bonded device registry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceEntry {
    /// Device snapshot
    #[serde(flatten)]
    pub device: ExternalDevice,
    /// Where its stream lives
    pub endpoint: Endpoint,
}

/// Configuration for the bridge
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BridgeConfig {
    /// Widget base URL; messages are addressed to its origin
    pub base_location: String,
    /// Device name substrings that identify the PTT accessory
    pub name_patterns: Vec<String>,
    /// Connect handshake timeout in seconds
    pub connect_timeout_secs: u64,
    /// Platform API level used to pick the permission set
    pub platform_api_level: Option<u32>,
    /// Bonded devices
    pub devices: Vec<DeviceEntry>,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            base_location: "http://localhost/".into(),
            name_patterns: DEFAULT_NAME_PATTERNS.iter().map(|p| p.to_string()).collect(),
            connect_timeout_secs: 30,
            platform_api_level: None,
            devices: Vec::new(),
        }
    }
}

impl BridgeConfig {
    /// Load a JSON config file
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            BridgeError::Config(format!("Failed to read {}: {}", path.display(), e))
        })?;
        Self::from_json(&text)
    }

    /// Parse a JSON config
    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// Connect handshake timeout
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    /// Selector built from `name_patterns`
    pub fn selector(&self) -> DeviceSelector {
        DeviceSelector::new(self.name_patterns.iter().cloned())
    }

    /// Permissions the platform must grant before connecting
    pub fn permissions(&self) -> Vec<Permission> {
        self.platform_api_level
            .map(required_permissions)
            .unwrap_or_default()
    }

    /// Registry over the configured devices
    pub fn registry(&self) -> StaticRegistry {
        StaticRegistry::new(self.devices.iter().map(|entry| entry.device.clone()))
    }

    /// Connector dispatching on each device's endpoint
    pub fn connector(&self) -> EndpointConnector {
        EndpointConnector::new(self.connect_timeout(), &self.devices)
    }
}
