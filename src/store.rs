//! Observable transcript store.
//!
//! One store per conversation. Readers subscribe and receive a fresh
//! snapshot whenever the transcript changes. Writes go through either the
//! caller (when idle) or a [`TranscriptLease`] held by the one active stream
//! session; while a lease is out, caller writes are rejected.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::watch;

use crate::error::StreamError;
use crate::models::Transcript;

/// Shared handle to a conversation's transcript.
///
/// Cloning yields another handle to the same store.
#[derive(Debug, Clone)]
pub struct TranscriptStore {
    tx: Arc<watch::Sender<Transcript>>,
    leased: Arc<AtomicBool>,
}

impl Default for TranscriptStore {
    fn default() -> Self {
        Self::new(Transcript::new())
    }
}

impl TranscriptStore {
    /// Create a store holding `transcript`.
    pub fn new(transcript: Transcript) -> Self {
        let (tx, _rx) = watch::channel(transcript);
        Self {
            tx: Arc::new(tx),
            leased: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Receive a snapshot after every change.
    pub fn subscribe(&self) -> watch::Receiver<Transcript> {
        self.tx.subscribe()
    }

    /// Clone of the current transcript.
    pub fn snapshot(&self) -> Transcript {
        self.tx.borrow().clone()
    }

    /// Read the current transcript without cloning.
    pub fn read<R>(&self, f: impl FnOnce(&Transcript) -> R) -> R {
        f(&self.tx.borrow())
    }

    /// Whether a stream session currently owns the transcript.
    pub fn is_leased(&self) -> bool {
        self.leased.load(Ordering::Acquire)
    }

    /// Mutate the transcript as its owner, outside any stream session.
    ///
    /// Fails with `SessionBusy` while a session holds the lease.
    pub fn edit<R>(&self, f: impl FnOnce(&mut Transcript) -> R) -> Result<R, StreamError> {
        if self.is_leased() {
            return Err(StreamError::SessionBusy);
        }
        let mut result = None;
        self.tx.send_modify(|transcript| result = Some(f(transcript)));
        result.ok_or(StreamError::SessionBusy)
    }

    /// Take exclusive write ownership for one stream session.
    ///
    /// Fails with `SessionBusy` if another session already holds it. The
    /// lease is released when dropped, on every exit path.
    pub fn acquire(&self) -> Result<TranscriptLease, StreamError> {
        self.leased
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| StreamError::SessionBusy)?;
        Ok(TranscriptLease {
            store: self.clone(),
        })
    }
}

/// Exclusive write access to a store, held by one stream session.
#[derive(Debug)]
pub struct TranscriptLease {
    store: TranscriptStore,
}

impl TranscriptLease {
    /// Apply `f` and publish a snapshot only if it reports a change.
    pub fn update(&self, f: impl FnOnce(&mut Transcript) -> bool) -> bool {
        self.store.tx.send_if_modified(f)
    }
}

impl Drop for TranscriptLease {
    fn drop(&mut self) {
        self.store.leased.store(false, Ordering::Release);
    }
}
