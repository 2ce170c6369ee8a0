//! Keyed debounce table for remote field writes.
//!
//! Rapid repeated edits to the same logical field must coalesce into one
//! remote write carrying the latest value, while edits to different fields
//! or entities must never starve each other. The table is keyed per
//! (entity id, field path): each key owns its own quiet-window timer, and a
//! newer submission simply supersedes the pending value under that key.
//!
//! Failures are reported on an alert channel and logged; they are never
//! retried, and the already-applied local edit is never rolled back.

use crate::store::{DocumentStore, FieldPatch};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, error};

/// Quiet window used when the configuration does not override it.
pub const DEFAULT_QUIET_WINDOW: Duration = Duration::from_millis(300);

/// Identity of one logical write: one entity, one dotted field path.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct WriteKey {
    /// Target document id
    pub id: String,
    /// Dotted field path being written
    pub field: String,
}

/// A remote write that failed after the quiet window elapsed.
#[derive(Clone, Debug)]
pub struct WriteFailure {
    /// The write that failed
    pub key: WriteKey,
    /// Store error, already formatted for display
    pub message: String,
}

struct PendingWrite {
    value: Value,
    generation: u64,
}

/// Debounced writer for one collection.
pub struct DebouncedWriter<S> {
    store: Arc<S>,
    collection: String,
    quiet: Duration,
    pending: Arc<Mutex<HashMap<WriteKey, PendingWrite>>>,
    generation: AtomicU64,
    alerts: UnboundedSender<WriteFailure>,
}

impl<S: DocumentStore> DebouncedWriter<S> {
    /// Creates a writer targeting `collection` with the given quiet window.
    pub fn new(
        store: Arc<S>,
        collection: String,
        quiet: Duration,
        alerts: UnboundedSender<WriteFailure>,
    ) -> Self {
        Self {
            store,
            collection,
            quiet,
            pending: Arc::new(Mutex::new(HashMap::new())),
            generation: AtomicU64::new(0),
            alerts,
        }
    }

    /// Schedules a write of `value` to `field` on document `id`.
    ///
    /// The write fires once no further submission for the same key arrives
    /// within the quiet window; only the most recent value is sent.
    pub fn submit(&self, id: &str, field: &str, value: Value) {
        let key = WriteKey {
            id: id.to_string(),
            field: field.to_string(),
        };
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        if let Ok(mut pending) = self.pending.lock() {
            pending.insert(key.clone(), PendingWrite { value, generation });
        }

        let store = Arc::clone(&self.store);
        let pending = Arc::clone(&self.pending);
        let collection = self.collection.clone();
        let quiet = self.quiet;
        let alerts = self.alerts.clone();
        tokio::spawn(async move {
            tokio::time::sleep(quiet).await;
            let write = {
                let Ok(mut map) = pending.lock() else { return };
                // Claim the entry only if this is still its latest
                // submission; a newer edit's timer fires instead.
                let still_latest = map
                    .get(&key)
                    .is_some_and(|entry| entry.generation == generation);
                if still_latest { map.remove(&key) } else { None }
            };
            if let Some(write) = write {
                perform_write(&*store, &collection, key, write.value, &alerts).await;
            }
        });
    }

    /// Writes out everything still pending, in submission order.
    ///
    /// Used on shutdown and by one-shot callers that cannot wait out the
    /// quiet window. Timers whose entries are drained here fire as no-ops.
    pub async fn flush(&self) {
        let drained = {
            let Ok(mut map) = self.pending.lock() else {
                return;
            };
            let mut entries: Vec<(WriteKey, PendingWrite)> = map.drain().collect();
            entries.sort_by_key(|(_, write)| write.generation);
            entries
        };
        for (key, write) in drained {
            perform_write(&*self.store, &self.collection, key, write.value, &self.alerts).await;
        }
    }

    /// Number of writes currently waiting out their quiet window.
    #[must_use]
    pub fn pending_len(&self) -> usize {
        self.pending.lock().map(|map| map.len()).unwrap_or(0)
    }
}

async fn perform_write<S: DocumentStore>(
    store: &S,
    collection: &str,
    key: WriteKey,
    value: Value,
    alerts: &UnboundedSender<WriteFailure>,
) {
    let patch: FieldPatch = vec![(key.field.clone(), value)];
    match store.update_fields(collection, &key.id, patch).await {
        Ok(()) => debug!(id = %key.id, field = %key.field, "debounced write applied"),
        Err(err) => {
            error!(id = %key.id, field = %key.field, "debounced write failed: {err}");
            let _ = alerts.send(WriteFailure {
                key,
                message: err.to_string(),
            });
        }
    }
}
