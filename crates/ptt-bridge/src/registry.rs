//! Bonded device registry

use ptt_core::ExternalDevice;

/// Source of the platform's bonded devices
///
/// Polled once per connection attempt; there is no change subscription.
pub trait DeviceRegistry: Send + Sync {
    /// Snapshot of bonded devices in registry order
    fn bonded_devices(&self) -> Vec<ExternalDevice>;
}

/// Registry over a fixed device list
#[derive(Debug, Clone, Default)]
pub struct StaticRegistry {
    devices: Vec<ExternalDevice>,
}

impl StaticRegistry {
    /// Create a registry from known devices
    pub fn new(devices: impl IntoIterator<Item = ExternalDevice>) -> Self {
        Self {
            devices: devices.into_iter().collect(),
        }
    }
}

impl DeviceRegistry for StaticRegistry {
    fn bonded_devices(&self) -> Vec<ExternalDevice> {
        self.devices
            .iter()
            .filter(|device| device.bonded)
            .cloned()
            .collect()
    }
}
