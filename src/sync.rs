//! Cross-instance sync: watching the store file for external writes.
//!
//! Another instance of the client (a second terminal, a watch process next
//! to one-shot commands) mutates the same durable blob. The watcher
//! observes the store's parent directory, debounces the burst of
//! filesystem events a single save produces, and then invokes a callback;
//! the engine re-reads the raw payload and replaces its collection
//! wholesale. Last writer wins, no merge.

use std::path::Path;
use std::sync::mpsc::{self, RecvTimeoutError};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use notify::{RecommendedWatcher, RecursiveMode, Watcher};
use tracing::warn;

use crate::error::{Error, Result};

/// Debounce for bursts of filesystem events from one save.
pub const WATCH_DEBOUNCE_MS: u64 = 200;

/// A running watcher over the store file.
///
/// Stopping drops the underlying watcher, which disconnects the event
/// channel and ends the debounce thread; `stop` also joins it.
pub struct StoreWatcher {
    watcher: Option<RecommendedWatcher>,
    handle: Option<JoinHandle<()>>,
}

impl StoreWatcher {
    /// Watch the directory containing `store_path`; after a debounced
    /// change, invoke `on_change`.
    pub fn spawn(
        store_path: &Path,
        debounce: Duration,
        on_change: impl Fn() + Send + 'static,
    ) -> Result<Self> {
        let dir = store_path
            .parent()
            .ok_or_else(|| Error::Watch(format!("store path has no parent: {}", store_path.display())))?
            .to_path_buf();
        std::fs::create_dir_all(&dir)?;

        let (event_tx, event_rx) = mpsc::channel();
        let mut watcher = notify::recommended_watcher(move |res| {
            let _ = event_tx.send(res);
        })
        .map_err(|err| Error::Watch(err.to_string()))?;

        watcher
            .watch(&dir, RecursiveMode::NonRecursive)
            .map_err(|err| Error::Watch(err.to_string()))?;

        let handle = thread::spawn(move || {
            let mut pending: Option<Instant> = None;

            loop {
                let timeout = pending
                    .map(|deadline| deadline.saturating_duration_since(Instant::now()))
                    .unwrap_or(Duration::from_secs(3600));
                match event_rx.recv_timeout(timeout) {
                    Ok(Ok(_)) => {
                        pending = Some(Instant::now() + debounce);
                    }
                    Ok(Err(err)) => {
                        warn!(%err, "store watcher error");
                    }
                    Err(RecvTimeoutError::Timeout) => {
                        if pending.take().is_some() {
                            on_change();
                        }
                    }
                    Err(RecvTimeoutError::Disconnected) => break,
                }
            }
        });

        Ok(Self {
            watcher: Some(watcher),
            handle: Some(handle),
        })
    }

    pub fn stop(&mut self) {
        // Dropping the watcher drops the channel sender; the thread sees
        // the disconnect and exits.
        self.watcher.take();
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for StoreWatcher {
    fn drop(&mut self) {
        self.stop();
    }
}
