//! Hand-off onto the script host's execution context
//!
//! The script host is single-threaded. Background tasks never touch it
//! directly: they hold a [`HostHandle`] and queue [`HostCall`]s, and the
//! host's own context drains the queue through a [`HostExecutor`].

use crate::host::{HostCall, ScriptHost};
use tokio::sync::mpsc;
use tracing::{debug, warn};

/// Create a connected handle/executor pair
pub fn host_context() -> (HostHandle, HostExecutor) {
    let (tx, rx) = mpsc::unbounded_channel();
    (HostHandle { tx }, HostExecutor { rx })
}

/// Sending side, usable from any thread or task
#[derive(Debug, Clone)]
pub struct HostHandle {
    tx: mpsc::UnboundedSender<HostCall>,
}

impl HostHandle {
    /// Queue a `postMessage` call. Returns false if the host is gone.
    pub fn post_message(&self, data: impl Into<String>, target_origin: impl Into<String>) -> bool {
        self.dispatch(HostCall::PostMessage {
            data: data.into(),
            target_origin: target_origin.into(),
        })
    }

    /// Queue a diagnostic. Returns false if the host is gone.
    pub fn alert(&self, message: impl Into<String>) -> bool {
        self.dispatch(HostCall::Alert {
            message: message.into(),
        })
    }

    /// Whether the executor has been dropped
    pub fn is_detached(&self) -> bool {
        self.tx.is_closed()
    }

    fn dispatch(&self, call: HostCall) -> bool {
        match self.tx.send(call) {
            Ok(()) => true,
            Err(mpsc::error::SendError(call)) => {
                debug!("Script host detached, dropping {:?}", call);
                false
            }
        }
    }
}

/// Receiving side, driven on the host's execution context
#[derive(Debug)]
pub struct HostExecutor {
    rx: mpsc::UnboundedReceiver<HostCall>,
}

impl HostExecutor {
    /// Deliver calls until every handle is dropped
    pub async fn run<H: ScriptHost>(mut self, mut host: H) {
        while let Some(call) = self.rx.recv().await {
            deliver(&mut host, &call);
        }
        debug!("All host handles dropped, executor exiting");
    }

    /// Deliver whatever is queued right now; returns the number of calls
    pub fn run_pending<H: ScriptHost>(&mut self, host: &mut H) -> usize {
        let mut delivered = 0;
        while let Ok(call) = self.rx.try_recv() {
            deliver(host, &call);
            delivered += 1;
        }
        delivered
    }

    /// Wait for the next call and deliver it. Returns false once all handles are gone.
    pub async fn run_next<H: ScriptHost>(&mut self, host: &mut H) -> bool {
        match self.rx.recv().await {
            Some(call) => {
                deliver(host, &call);
                true
            }
            None => false,
        }
    }
}

fn deliver<H: ScriptHost>(host: &mut H, call: &HostCall) {
    // Best effort: a failed delivery never affects the caller
    if let Err(e) = host.deliver(call) {
        warn!("Dropped script host call {:?}: {}", call, e);
    }
}
