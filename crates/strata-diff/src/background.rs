//! Diff streams produced on a scoped background thread.
//!
//! The producer runs ahead of the consumer by at most `capacity` changes.
//! Dropping the consumer raises a stop flag and closes the channel, so the
//! producer exits at its next step even if it is blocked on a full buffer.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver};
use std::sync::Arc;
use std::thread::{Scope, ScopedJoinHandle};

use tracing::trace;

use crate::change::ValueChanged;
use crate::error::{DiffError, DiffResult};

/// Consumer half of a diff running on another thread.
pub struct BackgroundDiff<'scope> {
    rx: Option<Receiver<DiffResult<ValueChanged>>>,
    stop: Arc<AtomicBool>,
    handle: Option<ScopedJoinHandle<'scope, ()>>,
}

impl<'scope> BackgroundDiff<'scope> {
    /// Start draining `stream` on a thread owned by `scope`.
    pub fn spawn<'env, I>(scope: &'scope Scope<'scope, 'env>, stream: I, capacity: usize) -> Self
    where
        I: Iterator<Item = DiffResult<ValueChanged>> + Send + 'scope,
    {
        let (tx, rx) = mpsc::sync_channel(capacity.max(1));
        let stop = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&stop);

        let handle = scope.spawn(move || {
            let mut sent = 0u64;
            for item in stream {
                if flag.load(Ordering::Acquire) {
                    trace!(sent, "diff producer stopped");
                    return;
                }
                let failed = item.is_err();
                if tx.send(item).is_err() {
                    trace!(sent, "diff consumer went away");
                    return;
                }
                if failed {
                    return;
                }
                sent += 1;
            }
            trace!(sent, "diff producer finished");
        });

        Self {
            rx: Some(rx),
            stop,
            handle: Some(handle),
        }
    }

    /// Ask the producer to stop after its current step.
    pub fn stop(&self) {
        self.stop.store(true, Ordering::Release);
    }
}

impl Iterator for BackgroundDiff<'_> {
    type Item = DiffResult<ValueChanged>;

    fn next(&mut self) -> Option<Self::Item> {
        let rx = self.rx.as_ref()?;
        match rx.recv() {
            Ok(item) => Some(item),
            Err(_) => {
                // Channel closed: either the stream ended or the producer died.
                self.rx = None;
                let handle = self.handle.take()?;
                match handle.join() {
                    Ok(()) => None,
                    Err(_) => Some(Err(DiffError::ProducerPanicked)),
                }
            }
        }
    }
}

impl Drop for BackgroundDiff<'_> {
    fn drop(&mut self) {
        self.stop();
        self.rx = None;
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

impl std::fmt::Debug for BackgroundDiff<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BackgroundDiff")
            .field("open", &self.rx.is_some())
            .field("stopped", &self.stop.load(Ordering::Relaxed))
            .finish()
    }
}
