//! Cancellation of a running stream session.
//!
//! The caller keeps an [`AbortHandle`]; the session races an `AbortSignal`
//! against every await on the network.

use std::sync::Arc;
use tokio::sync::watch;

/// Caller-side handle that aborts one stream session.
///
/// Cloneable and usable from another task (e.g. a Ctrl+C handler). Aborting
/// an already finished session has no effect.
#[derive(Debug, Clone)]
pub struct AbortHandle {
    tx: Arc<watch::Sender<bool>>,
}

impl AbortHandle {
    pub(crate) fn new() -> (Self, AbortSignal) {
        let (tx, rx) = watch::channel(false);
        (Self { tx: Arc::new(tx) }, AbortSignal { rx })
    }

    /// Request the session to stop.
    pub fn abort(&self) {
        self.tx.send_replace(true);
    }

    pub fn is_aborted(&self) -> bool {
        *self.tx.borrow()
    }
}

/// Session-side end of an [`AbortHandle`].
#[derive(Debug)]
pub(crate) struct AbortSignal {
    rx: watch::Receiver<bool>,
}

impl AbortSignal {
    /// Resolve once abort was requested. Never resolves if every handle is
    /// gone without aborting.
    pub(crate) async fn aborted(&mut self) {
        if self.rx.wait_for(|aborted| *aborted).await.is_err() {
            std::future::pending::<()>().await;
        }
    }
}
