//! Generic remote-backed editable list.
//!
//! A [`Roster`] mirrors one collection of the hosted store as an ordered
//! in-memory list. Field edits apply to the local copy immediately and are
//! pushed to the store through the keyed [`DebouncedWriter`]; creates and
//! deletes go straight through. There is no conflict detection - if two
//! clients edit the same document, the last remote write wins silently -
//! and a failed remote write never rolls back the local edit, so the cache
//! can diverge from the store until the next load.

use crate::core::debounce::{DebouncedWriter, WriteFailure};
use crate::entities::RosterEntity;
use crate::errors::{Error, Result};
use crate::store::DocumentStore;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc::{UnboundedReceiver, unbounded_channel};
use tracing::info;

/// Outcome of a sequential per-entity batch write (reset operations).
///
/// Bulk writes are issued one document at a time, each awaited; a failure
/// partway leaves the earlier writes in place. The report names both sides
/// instead of only logging the failures.
#[derive(Debug, Clone, Default)]
pub struct BatchReport {
    /// Ids written successfully, in write order
    pub updated: Vec<String>,
    /// Ids that failed, with the store error
    pub failed: Vec<(String, String)>,
}

impl BatchReport {
    /// True when every entity was written.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }

    /// Number of entities attempted.
    #[must_use]
    pub fn total(&self) -> usize {
        self.updated.len() + self.failed.len()
    }
}

/// One collection of the store, cached and editable.
pub struct Roster<E, S> {
    store: Arc<S>,
    collection: String,
    entries: Vec<E>,
    writer: DebouncedWriter<S>,
    alerts: UnboundedReceiver<WriteFailure>,
}

impl<E: RosterEntity, S: DocumentStore> Roster<E, S> {
    /// Creates an empty roster over `collection`; call [`Roster::load`] to
    /// populate it.
    pub fn new(store: Arc<S>, collection: impl Into<String>, quiet: Duration) -> Self {
        let collection = collection.into();
        let (alert_tx, alert_rx) = unbounded_channel();
        let writer =
            DebouncedWriter::new(Arc::clone(&store), collection.clone(), quiet, alert_tx);
        Self {
            store,
            collection,
            entries: Vec::new(),
            writer,
            alerts: alert_rx,
        }
    }

    /// Fetches the full collection - there is no server-side pagination -
    /// and replaces the cache. On failure the cache is left empty.
    pub async fn load(&mut self) -> Result<()> {
        self.entries.clear();
        let documents = self.store.list_all(&self.collection).await?;
        self.entries = documents.iter().map(E::from_document).collect();
        info!(
            collection = %self.collection,
            entries = self.entries.len(),
            "roster loaded"
        );
        Ok(())
    }

    /// Collection this roster mirrors.
    #[must_use]
    pub fn collection(&self) -> &str {
        &self.collection
    }

    /// Cached entities in fetch order.
    #[must_use]
    pub fn entries(&self) -> &[E] {
        &self.entries
    }

    /// Looks up one entity by id.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&E> {
        self.entries.iter().find(|entity| entity.id() == id)
    }

    /// Applies one field edit locally and schedules the debounced remote
    /// write of exactly that path.
    pub fn set_field(&mut self, id: &str, path: &str, value: Value) -> Result<()> {
        let entity = self
            .entries
            .iter_mut()
            .find(|entity| entity.id() == id)
            .ok_or_else(|| Error::UnknownEntity { id: id.to_string() })?;
        entity.apply_field(path, &value)?;
        self.writer.submit(id, path, value);
        Ok(())
    }

    /// Applies one field edit locally and writes it out immediately,
    /// bypassing the debounce. Used by the sequential reset loops.
    ///
    /// The local edit stays applied even when the remote write fails.
    pub async fn write_now(&mut self, id: &str, path: &str, value: Value) -> Result<()> {
        let entity = self
            .entries
            .iter_mut()
            .find(|entity| entity.id() == id)
            .ok_or_else(|| Error::UnknownEntity { id: id.to_string() })?;
        entity.apply_field(path, &value)?;
        self.store
            .update_fields(&self.collection, id, vec![(path.to_string(), value)])
            .await
    }

    /// Creates a document with a store-assigned id and appends the entity.
    pub async fn add(&mut self, mut entity: E) -> Result<String> {
        let id = self
            .store
            .create(&self.collection, entity.to_fields())
            .await?;
        entity.set_id(id.clone());
        self.entries.push(entity);
        Ok(id)
    }

    /// Creates a document under the entity's own id and appends it.
    pub async fn add_with_id(&mut self, entity: E) -> Result<()> {
        self.store
            .create_with_id(&self.collection, entity.id(), entity.to_fields())
            .await?;
        self.entries.push(entity);
        Ok(())
    }

    /// Deletes one document and drops it from the cache. Later operations
    /// on the id fail with [`Error::UnknownEntity`].
    pub async fn remove(&mut self, id: &str) -> Result<()> {
        if self.get(id).is_none() {
            return Err(Error::UnknownEntity { id: id.to_string() });
        }
        self.store.delete(&self.collection, id).await?;
        self.entries.retain(|entity| entity.id() != id);
        Ok(())
    }

    /// Forces out all pending debounced writes.
    pub async fn flush(&self) {
        self.writer.flush().await;
    }

    /// Collects the write failures reported since the last call.
    pub fn drain_alerts(&mut self) -> Vec<WriteFailure> {
        let mut failures = Vec::new();
        while let Ok(failure) = self.alerts.try_recv() {
            failures.push(failure);
        }
        failures
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::entities::Attendee;
    use crate::test_utils::{attendance_roster, seeded_attendance_store};
    use serde_json::json;

    #[tokio::test]
    async fn load_failure_leaves_cache_empty() {
        let store = seeded_attendance_store(&["Mina"]).await;
        let mut roster = attendance_roster(&store);
        roster.load().await.unwrap();
        assert_eq!(roster.entries().len(), 1);

        store.fail_next("network down");
        assert!(roster.load().await.is_err());
        assert!(roster.entries().is_empty());
    }

    #[tokio::test]
    async fn set_field_on_unknown_id_errors() {
        let store = seeded_attendance_store(&[]).await;
        let mut roster = attendance_roster(&store);
        roster.load().await.unwrap();

        let result = roster.set_field("missing", "name", json!("x"));
        assert!(matches!(result, Err(Error::UnknownEntity { .. })));
    }

    #[tokio::test]
    async fn failed_write_keeps_the_local_edit() {
        let store = seeded_attendance_store(&["Mina"]).await;
        let mut roster = attendance_roster(&store);
        roster.load().await.unwrap();
        let id = roster.entries()[0].id.clone();

        roster
            .set_field(&id, "days.2025-03-02.present", json!(true))
            .unwrap();
        store.fail_next("network down");
        roster.flush().await;

        // Local cache holds the optimistic value
        let date = chrono::NaiveDate::from_ymd_opt(2025, 3, 2).unwrap();
        assert!(roster.get(&id).unwrap().day(date).present);
        // The store never saw it - cache and store have diverged
        let doc = store.document("attendance", &id).unwrap();
        let attendee = Attendee::from_document(&doc);
        assert!(!attendee.day(date).present);
        // And the failure was surfaced as an alert
        assert_eq!(roster.drain_alerts().len(), 1);
    }

    #[tokio::test]
    async fn remove_drops_the_entity_for_later_operations() {
        let store = seeded_attendance_store(&["Mina", "Sara"]).await;
        let mut roster = attendance_roster(&store);
        roster.load().await.unwrap();
        let id = roster.entries()[0].id.clone();

        roster.remove(&id).await.unwrap();
        assert_eq!(roster.entries().len(), 1);
        assert!(roster.get(&id).is_none());
        assert!(matches!(
            roster.set_field(&id, "name", json!("x")),
            Err(Error::UnknownEntity { .. })
        ));
        assert!(matches!(
            roster.remove(&id).await,
            Err(Error::UnknownEntity { .. })
        ));
    }
}
