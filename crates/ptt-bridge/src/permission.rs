//! Platform permission gate
//!
//! Permission APIs are modelled as a synchronous check plus an asynchronous
//! request whose answer arrives through a continuation, on whatever thread
//! the platform chooses.

/// API level from which `BLUETOOTH_CONNECT` replaces `BLUETOOTH`
pub const BLUETOOTH_CONNECT_MIN_API: u32 = 31;

/// Runtime permission needed to open the device link
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Permission {
    /// Legacy `android.permission.BLUETOOTH`
    Bluetooth,
    /// `android.permission.BLUETOOTH_CONNECT`
    BluetoothConnect,
}

impl Permission {
    /// Platform name of the permission
    pub fn platform_name(self) -> &'static str {
        match self {
            Permission::Bluetooth => "android.permission.BLUETOOTH",
            Permission::BluetoothConnect => "android.permission.BLUETOOTH_CONNECT",
        }
    }
}

/// Permissions required on a given platform API level
pub fn required_permissions(api_level: u32) -> Vec<Permission> {
    if api_level >= BLUETOOTH_CONNECT_MIN_API {
        vec![Permission::BluetoothConnect]
    } else {
        vec![Permission::Bluetooth]
    }
}

/// Continuation receiving whether every permission was granted
pub type PermissionCallback = Box<dyn FnOnce(bool) + Send + 'static>;

/// Trait for platform permission checks
pub trait PermissionGate: Send + Sync {
    /// Whether all `required` permissions are already held
    fn check(&self, required: &[Permission]) -> bool;

    /// Prompt for `required`; `on_result` runs once with the outcome
    fn request(&self, required: &[Permission], on_result: PermissionCallback);
}

/// Gate for hosts without runtime permissions
#[derive(Debug, Clone, Copy, Default)]
pub struct AlwaysGranted;

impl PermissionGate for AlwaysGranted {
    fn check(&self, _required: &[Permission]) -> bool {
        true
    }

    fn request(&self, _required: &[Permission], on_result: PermissionCallback) {
        on_result(true);
    }
}
