//! Bonded device snapshots and target selection

use serde::{Deserialize, Serialize};

/// Name fragments that identify a PTT accessory by default
pub const DEFAULT_NAME_PATTERNS: [&str; 2] = ["PTT", "B01"];

/// Snapshot of a paired device as reported by the platform registry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExternalDevice {
    /// Hardware address, e.g. `00:11:22:33:44:55`
    pub address: String,
    /// Display name
    pub name: String,
    /// Whether the device is bonded with this host
    #[serde(default = "default_bonded")]
    pub bonded: bool,
}

fn default_bonded() -> bool {
    true
}

impl ExternalDevice {
    /// Create a bonded device snapshot
    pub fn new(address: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            name: name.into(),
            bonded: true,
        }
    }
}

impl std::fmt::Display for ExternalDevice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.name, self.address)
    }
}

/// Render a device list the way diagnostics show it: `name (address), ...`
pub fn describe_devices(devices: &[ExternalDevice]) -> String {
    devices
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Picks the target device by case-sensitive substring match on its name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceSelector {
    patterns: Vec<String>,
}

impl DeviceSelector {
    /// Create a selector matching any of the given substrings
    pub fn new<I, S>(patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            patterns: patterns.into_iter().map(Into::into).collect(),
        }
    }

    /// Substrings this selector matches
    pub fn patterns(&self) -> &[String] {
        &self.patterns
    }

    /// Whether a single device matches
    pub fn matches(&self, device: &ExternalDevice) -> bool {
        self.patterns
            .iter()
            .any(|pattern| device.name.contains(pattern.as_str()))
    }

    /// First matching device in registry order
    pub fn select<'a>(&self, devices: &'a [ExternalDevice]) -> Option<&'a ExternalDevice> {
        devices.iter().find(|device| self.matches(device))
    }
}

impl Default for DeviceSelector {
    fn default() -> Self {
        Self::new(DEFAULT_NAME_PATTERNS)
    }
}
