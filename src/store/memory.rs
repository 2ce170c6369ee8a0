//! In-memory document store.
//!
//! Mirrors the hosted store's observable behavior closely enough for tests:
//! documents live in insertion order per collection, partial updates touch
//! only the named paths, and `create_with_id` overwrites like the remote
//! store does. Every call is appended to an operation log so tests can
//! assert exactly which writes reached the store, and a one-shot failure can
//! be injected to exercise the error policy.

use crate::errors::{Error, Result};
use crate::store::{Document, DocumentStore, FieldPatch, apply_path};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};

/// One recorded store call.
#[derive(Debug, Clone, PartialEq)]
pub enum StoreOp {
    /// A full-collection fetch
    ListAll {
        /// Collection fetched
        collection: String,
    },
    /// A document creation (either id flavor)
    Create {
        /// Collection written
        collection: String,
        /// Id the document ended up under
        id: String,
    },
    /// A partial update
    UpdateFields {
        /// Collection written
        collection: String,
        /// Target document id
        id: String,
        /// The dotted-path patch as submitted
        patch: FieldPatch,
    },
    /// A document deletion
    Delete {
        /// Collection written
        collection: String,
        /// Deleted document id
        id: String,
    },
}

/// In-process [`DocumentStore`] implementation.
#[derive(Default)]
pub struct MemoryStore {
    collections: Mutex<HashMap<String, Vec<Document>>>,
    ops: Mutex<Vec<StoreOp>>,
    fail_next: Mutex<Option<String>>,
    next_id: AtomicU64,
}

impl MemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes the next store call fail with the given message.
    pub fn fail_next(&self, message: &str) {
        if let Ok(mut slot) = self.fail_next.lock() {
            *slot = Some(message.to_string());
        }
    }

    /// Returns a copy of the operation log.
    #[must_use]
    pub fn ops(&self) -> Vec<StoreOp> {
        self.ops.lock().map(|ops| ops.clone()).unwrap_or_default()
    }

    /// Returns the recorded partial updates, oldest first.
    #[must_use]
    pub fn update_ops(&self) -> Vec<StoreOp> {
        self.ops()
            .into_iter()
            .filter(|op| matches!(op, StoreOp::UpdateFields { .. }))
            .collect()
    }

    /// Fetches one document directly, bypassing the log.
    #[must_use]
    pub fn document(&self, collection: &str, id: &str) -> Option<Document> {
        let collections = self.collections.lock().ok()?;
        collections
            .get(collection)?
            .iter()
            .find(|doc| doc.id == id)
            .cloned()
    }

    fn record(&self, op: StoreOp) {
        if let Ok(mut ops) = self.ops.lock() {
            ops.push(op);
        }
    }

    fn take_injected_failure(&self) -> Option<Error> {
        let message = self.fail_next.lock().ok()?.take()?;
        Some(Error::Store { message })
    }

    fn locked(&self) -> Result<std::sync::MutexGuard<'_, HashMap<String, Vec<Document>>>> {
        self.collections.lock().map_err(|_| Error::Store {
            message: "memory store poisoned".to_string(),
        })
    }
}

impl DocumentStore for MemoryStore {
    async fn list_all(&self, collection: &str) -> Result<Vec<Document>> {
        if let Some(err) = self.take_injected_failure() {
            return Err(err);
        }
        self.record(StoreOp::ListAll {
            collection: collection.to_string(),
        });
        let collections = self.locked()?;
        Ok(collections.get(collection).cloned().unwrap_or_default())
    }

    async fn create(&self, collection: &str, fields: Map<String, Value>) -> Result<String> {
        if let Some(err) = self.take_injected_failure() {
            return Err(err);
        }
        let id = format!("doc-{}", self.next_id.fetch_add(1, Ordering::SeqCst) + 1);
        self.record(StoreOp::Create {
            collection: collection.to_string(),
            id: id.clone(),
        });
        let mut collections = self.locked()?;
        collections
            .entry(collection.to_string())
            .or_default()
            .push(Document::new(id.clone(), fields));
        Ok(id)
    }

    async fn create_with_id(
        &self,
        collection: &str,
        id: &str,
        fields: Map<String, Value>,
    ) -> Result<()> {
        if let Some(err) = self.take_injected_failure() {
            return Err(err);
        }
        self.record(StoreOp::Create {
            collection: collection.to_string(),
            id: id.to_string(),
        });
        let mut collections = self.locked()?;
        let docs = collections.entry(collection.to_string()).or_default();
        // Same semantics as the remote store: writing an existing id overwrites
        if let Some(existing) = docs.iter_mut().find(|doc| doc.id == id) {
            existing.fields = fields;
        } else {
            docs.push(Document::new(id.to_string(), fields));
        }
        Ok(())
    }

    async fn update_fields(&self, collection: &str, id: &str, patch: FieldPatch) -> Result<()> {
        if let Some(err) = self.take_injected_failure() {
            return Err(err);
        }
        self.record(StoreOp::UpdateFields {
            collection: collection.to_string(),
            id: id.to_string(),
            patch: patch.clone(),
        });
        let mut collections = self.locked()?;
        let doc = collections
            .get_mut(collection)
            .and_then(|docs| docs.iter_mut().find(|doc| doc.id == id))
            .ok_or_else(|| Error::UnknownEntity { id: id.to_string() })?;
        for (path, value) in patch {
            apply_path(&mut doc.fields, &path, value);
        }
        Ok(())
    }

    async fn delete(&self, collection: &str, id: &str) -> Result<()> {
        if let Some(err) = self.take_injected_failure() {
            return Err(err);
        }
        self.record(StoreOp::Delete {
            collection: collection.to_string(),
            id: id.to_string(),
        });
        let mut collections = self.locked()?;
        if let Some(docs) = collections.get_mut(collection) {
            docs.retain(|doc| doc.id != id);
        }
        Ok(())
    }
}
