//! The window processor: fetch → dedup → evict → average → persist.
//!
//! The persisted [`WindowState`] lives in an injected [`KeyValueStore`]
//! under a single key. Each merge is one read and one write of that key,
//! performed under an async mutex so merges through the same processor
//! never interleave their read-modify-write.

use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{info, warn};
use winavg_core::{AvgError, NumberKind, Result, WindowState};
use winavg_source::NumberSource;
use winavg_store::KeyValueStore;

pub struct WindowProcessor {
    store:  Arc<dyn KeyValueStore>,
    source: Arc<dyn NumberSource>,
    key:    String,
    /// Serialises read-modify-write cycles on `key`.
    write_lock: Mutex<()>,
}

impl WindowProcessor {
    pub fn new(
        store: Arc<dyn KeyValueStore>,
        source: Arc<dyn NumberSource>,
        key: impl Into<String>,
    ) -> Self {
        Self {
            store,
            source,
            key: key.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Fetch numbers of `kind` and merge them into the persisted window.
    ///
    /// The window size is validated before anything is fetched. If the fetch
    /// fails the persisted state is left exactly as it was.
    pub async fn merge(&self, kind: NumberKind, window_size: i64) -> Result<WindowState> {
        let size = validate_window_size(window_size)?;

        let incoming = match self.source.fetch(kind).await {
            Ok(numbers) => numbers,
            Err(e) => {
                warn!("{kind} fetch failed, window left unchanged: {e}");
                return Err(e);
            }
        };

        self.apply(&incoming, size).await
    }

    /// Merge an already-fetched batch into the persisted window.
    pub async fn merge_numbers(&self, incoming: &[i64], window_size: i64) -> Result<WindowState> {
        let size = validate_window_size(window_size)?;
        self.apply(incoming, size).await
    }

    async fn apply(&self, incoming: &[i64], size: usize) -> Result<WindowState> {
        let _guard = self.write_lock.lock().await;

        // A read failure aborts the merge; only an undecodable blob counts as
        // "no state" here, otherwise the write below would clobber the window.
        let existing = match self.read_raw().await? {
            Some(raw) => decode_or_default(&self.key, &raw),
            None => WindowState::default(),
        };

        let next = existing.advance(incoming, size);
        let encoded = serde_json::to_string(&next)
            .map_err(|e| AvgError::Store(format!("encode window state: {e}")))?;
        self.with_store(move |store, key| store.set(key, &encoded)).await?;

        info!(
            "merged {} numbers (window {size}): {} retained, avg {}",
            incoming.len(),
            next.current_window.len(),
            next.average
        );
        Ok(next)
    }

    /// Persisted state, or the empty default when there is none or it
    /// cannot be read.
    pub async fn current_state(&self) -> WindowState {
        match self.read_raw().await {
            Ok(Some(raw)) => decode_or_default(&self.key, &raw),
            Ok(None) => WindowState::default(),
            Err(e) => {
                warn!("cannot read window state '{}': {e}; reporting empty", self.key);
                WindowState::default()
            }
        }
    }

    /// Clear the persisted state. Resetting an empty window is a no-op.
    pub async fn reset(&self) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        self.with_store(|store, key| store.delete(key)).await?;
        info!("window state reset");
        Ok(())
    }

    async fn read_raw(&self) -> Result<Option<String>> {
        self.with_store(|store, key| store.get(key)).await
    }

    /// Run a store operation on the blocking pool; stores may do file I/O.
    async fn with_store<T, F>(&self, op: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(&dyn KeyValueStore, &str) -> Result<T> + Send + 'static,
    {
        let store = Arc::clone(&self.store);
        let key = self.key.clone();
        tokio::task::spawn_blocking(move || op(store.as_ref(), &key))
            .await
            .map_err(|e| AvgError::Store(format!("store task failed: {e}")))?
    }
}

fn decode_or_default(key: &str, raw: &str) -> WindowState {
    serde_json::from_str(raw).unwrap_or_else(|e| {
        warn!("corrupt window state '{key}': {e}; starting empty");
        WindowState::default()
    })
}

/// Reject non-positive window sizes instead of silently evicting everything.
pub fn validate_window_size(window_size: i64) -> Result<usize> {
    match usize::try_from(window_size) {
        Ok(size) if size > 0 => Ok(size),
        _ => Err(AvgError::InvalidWindowSize(window_size)),
    }
}
