//! Document store abstraction.
//!
//! The application owns no backend; all persistence is delegated to a hosted
//! document database. This module defines the capability set the rest of the
//! crate is written against - fetch-all, create, update-field, delete on
//! named collections - together with the REST client used in production and
//! the in-memory store used by tests.

/// In-memory store with an operation log, used by tests
pub mod memory;
/// HTTP/JSON client for the hosted document store
pub mod rest;

use crate::errors::Result;
use serde_json::{Map, Value};
use std::future::Future;

pub use memory::MemoryStore;
pub use rest::RestStore;

/// One document in a collection: an opaque id plus a JSON field map.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    /// Opaque document identifier, unique within its collection
    pub id: String,
    /// Top-level fields of the document
    pub fields: Map<String, Value>,
}

impl Document {
    /// Creates a document from an id and a field map.
    #[must_use]
    pub const fn new(id: String, fields: Map<String, Value>) -> Self {
        Self { id, fields }
    }
}

/// A partial update: dotted field paths mapped to replacement values.
///
/// `days.2025-03-02.present -> true` replaces exactly that nested key,
/// creating intermediate objects as needed and leaving siblings untouched.
pub type FieldPatch = Vec<(String, Value)>;

/// Capability set of the hosted document store.
///
/// There is no server-side filtering or pagination; consumers always fetch
/// the full collection and derive views locally.
pub trait DocumentStore: Send + Sync + 'static {
    /// Fetches every document in `collection`, in store order.
    fn list_all(&self, collection: &str) -> impl Future<Output = Result<Vec<Document>>> + Send;

    /// Creates a document with a store-assigned id and returns that id.
    fn create(
        &self,
        collection: &str,
        fields: Map<String, Value>,
    ) -> impl Future<Output = Result<String>> + Send;

    /// Creates (or overwrites) a document under a caller-chosen id.
    fn create_with_id(
        &self,
        collection: &str,
        id: &str,
        fields: Map<String, Value>,
    ) -> impl Future<Output = Result<()>> + Send;

    /// Applies a partial update to one document. Only the named paths change.
    fn update_fields(
        &self,
        collection: &str,
        id: &str,
        patch: FieldPatch,
    ) -> impl Future<Output = Result<()>> + Send;

    /// Deletes one document by id.
    fn delete(&self, collection: &str, id: &str) -> impl Future<Output = Result<()>> + Send;
}

/// Applies one dotted-path replacement to a field map, creating intermediate
/// objects as needed. A non-object encountered mid-path is replaced.
pub fn apply_path(fields: &mut Map<String, Value>, path: &str, value: Value) {
    let mut segments = path.split('.').peekable();
    let mut current = fields;
    while let Some(segment) = segments.next() {
        if segments.peek().is_none() {
            current.insert(segment.to_string(), value);
            return;
        }
        let entry = current
            .entry(segment.to_string())
            .or_insert_with(|| Value::Object(Map::new()));
        if !entry.is_object() {
            *entry = Value::Object(Map::new());
        }
        match entry.as_object_mut() {
            Some(next) => current = next,
            // Unreachable: the entry was just forced to an object
            None => return,
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use serde_json::json;

    #[test]
    fn apply_path_inserts_nested_keys() {
        let mut fields = Map::new();
        apply_path(&mut fields, "days.2025-03-02.present", json!(true));
        apply_path(&mut fields, "days.2025-03-02.absent", json!(false));
        apply_path(&mut fields, "days.2025-03-09.present", json!(false));

        assert_eq!(
            Value::Object(fields),
            json!({
                "days": {
                    "2025-03-02": { "present": true, "absent": false },
                    "2025-03-09": { "present": false },
                }
            })
        );
    }

    #[test]
    fn apply_path_replaces_top_level_field() {
        let mut fields = Map::new();
        fields.insert("name".to_string(), json!("old"));
        apply_path(&mut fields, "name", json!("new"));
        assert_eq!(fields.get("name"), Some(&json!("new")));
    }

    #[test]
    fn apply_path_replaces_scalar_blocking_the_path() {
        let mut fields = Map::new();
        fields.insert("visited".to_string(), json!("not an object"));
        apply_path(&mut fields, "visited.2025-03", json!(true));
        assert_eq!(
            Value::Object(fields),
            json!({ "visited": { "2025-03": true } })
        );
    }
}
