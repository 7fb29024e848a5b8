//! Script host trait

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A call into the hosted script environment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum HostCall {
    /// `postMessage(data, targetOrigin)` into the page
    PostMessage {
        /// Message payload
        data: String,
        /// Origin the message is addressed to
        target_origin: String,
    },
    /// User-visible diagnostic (`alert(...)` in a web view)
    Alert {
        /// Diagnostic text
        message: String,
    },
}

/// Errors raised while delivering into a script host
#[derive(Debug, Error)]
pub enum DeliveryError {
    /// Host has been torn down
    #[error("script host is gone")]
    Detached,
    /// Host output failed
    #[error("script host I/O failed: {0}")]
    Io(#[from] std::io::Error),
    /// Call could not be encoded
    #[error("failed to encode host call: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Trait for implementing script hosts
///
/// Implementations are bound to the host's own execution context and are
/// only ever called from a [`crate::HostExecutor`]; they need not be `Send`.
pub trait ScriptHost {
    /// Post a message to the page, addressed to `target_origin`
    fn post_message(&mut self, data: &str, target_origin: &str) -> Result<(), DeliveryError>;

    /// Show a diagnostic to the user
    fn alert(&mut self, message: &str) -> Result<(), DeliveryError>;

    /// Dispatch a queued call
    fn deliver(&mut self, call: &HostCall) -> Result<(), DeliveryError> {
        match call {
            HostCall::PostMessage {
                data,
                target_origin,
            } => self.post_message(data, target_origin),
            HostCall::Alert { message } => self.alert(message),
        }
    }
}

/// In-memory host that records every call
#[derive(Debug, Default)]
pub struct RecordingHost {
    /// Calls in delivery order
    pub calls: Vec<HostCall>,
}

impl RecordingHost {
    /// Create an empty recorder
    pub fn new() -> Self {
        Self::default()
    }

    /// Payloads of all posted messages
    pub fn messages(&self) -> Vec<(&str, &str)> {
        self.calls
            .iter()
            .filter_map(|call| match call {
                HostCall::PostMessage {
                    data,
                    target_origin,
                } => Some((data.as_str(), target_origin.as_str())),
                HostCall::Alert { .. } => None,
            })
            .collect()
    }

    /// Text of all diagnostics
    pub fn alerts(&self) -> Vec<&str> {
        self.calls
            .iter()
            .filter_map(|call| match call {
                HostCall::Alert { message } => Some(message.as_str()),
                HostCall::PostMessage { .. } => None,
            })
            .collect()
    }
}

impl ScriptHost for RecordingHost {
    fn post_message(&mut self, data: &str, target_origin: &str) -> Result<(), DeliveryError> {
        self.calls.push(HostCall::PostMessage {
            data: data.into(),
            target_origin: target_origin.into(),
        });
        Ok(())
    }

    fn alert(&mut self, message: &str) -> Result<(), DeliveryError> {
        self.calls.push(HostCall::Alert {
            message: message.into(),
        });
        Ok(())
    }
}
