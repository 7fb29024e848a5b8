//! JSON-lines script host
//!
//! For embedders that run the bridge as a child process: every host call is
//! written as one JSON object per line, and the embedder forwards it into its
//! web view.

use crate::host::{DeliveryError, HostCall, ScriptHost};
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, error};

/// Script host writing JSON lines to an async writer (stdout in the CLI)
///
/// Calls are encoded on the host context and handed to a writer task, so a
/// slow reader on the other end never stalls the executor.
pub struct StdioHost {
    lines: mpsc::UnboundedSender<String>,
}

impl StdioHost {
    /// Start the writer task on the current runtime
    ///
    /// The task ends once the host is dropped and every queued line is
    /// written, or at the first write error, and hands the writer back.
    pub fn spawn<W>(out: W) -> (Self, JoinHandle<W>)
    where
        W: AsyncWrite + Unpin + Send + 'static,
    {
        let (lines, rx) = mpsc::unbounded_channel();
        let writer = tokio::spawn(write_lines(out, rx));
        (Self { lines }, writer)
    }

    fn write_call(&mut self, call: &HostCall) -> Result<(), DeliveryError> {
        let json = serde_json::to_string(call)?;
        self.lines.send(json).map_err(|_| DeliveryError::Detached)
    }
}

async fn write_lines<W>(mut out: W, mut rx: mpsc::UnboundedReceiver<String>) -> W
where
    W: AsyncWrite + Unpin,
{
    while let Some(json) = rx.recv().await {
        if let Err(e) = out.write_all(json.as_bytes()).await {
            error!("Failed to write host call: {}", e);
            break;
        }
        if let Err(e) = out.write_all(b"\n").await {
            error!("Failed to write newline: {}", e);
            break;
        }
        // Flush so the embedder sees each call immediately
        if let Err(e) = out.flush().await {
            error!("Failed to flush: {}", e);
            break;
        }
        debug!("Sent: {}", json);
    }
    out
}

impl ScriptHost for StdioHost {
    fn post_message(&mut self, data: &str, target_origin: &str) -> Result<(), DeliveryError> {
        self.write_call(&HostCall::PostMessage {
            data: data.into(),
            target_origin: target_origin.into(),
        })
    }

    fn alert(&mut self, message: &str) -> Result<(), DeliveryError> {
        self.write_call(&HostCall::Alert {
            message: message.into(),
        })
    }

    fn deliver(&mut self, call: &HostCall) -> Result<(), DeliveryError> {
        self.write_call(call)
    }
}
