//! Error types for the PTT bridge

use thiserror::Error;

/// Result type for bridge operations
pub type Result<T> = std::result::Result<T, BridgeError>;

/// Bridge error types
///
/// Runtime variants render as the diagnostic text shown inside the widget.
#[derive(Debug, Error)]
pub enum BridgeError {
    /// No bonded device matched the name patterns
    #[error("Could not locate PTT device among bonded devices {available}")]
    NoDeviceFound {
        /// Bonded devices as `name (address)`, comma separated
        available: String,
    },

    /// Platform refused the Bluetooth permissions
    #[error("Could not acquire Bluetooth permissions")]
    PermissionDenied,

    /// Connect handshake failed
    #[error("Failed to open RFCOMM socket: {0}")]
    Connect(#[source] std::io::Error),

    /// Read from an open connection failed
    #[error("Failed to read from socket: {0}")]
    Read(#[source] std::io::Error),

    /// Script host could not take a message
    #[error("Script host delivery failed: {0}")]
    Delivery(String),

    /// Base location has no usable origin
    #[error("Invalid base location: {0}")]
    InvalidBaseLocation(String),

    /// Configuration could not be loaded
    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<serde_json::Error> for BridgeError {
    fn from(err: serde_json::Error) -> Self {
        BridgeError::Config(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn test_diagnostic_text() {
        let err = BridgeError::NoDeviceFound {
            available: "Foo (00:11:22:33:44:55)".into(),
        };
        assert_eq!(
            err.to_string(),
            "Could not locate PTT device among bonded devices Foo (00:11:22:33:44:55)"
        );

        let err = BridgeError::Connect(io::Error::new(io::ErrorKind::ConnectionRefused, "refused"));
        assert_eq!(err.to_string(), "Failed to open RFCOMM socket: refused");
    }
}
