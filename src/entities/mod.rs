//! Entity definitions for the three collections.
//!
//! Entities decode tolerantly from store documents: a missing or oddly-typed
//! field falls back to its default instead of failing the whole document,
//! matching how the hosted store is actually populated. Each entity also
//! knows how to apply a dotted-path patch to itself, which is the seam the
//! generic roster editor works through.

/// Attendance-sheet entity (used by the attendance and mass collections)
pub mod attendee;
/// Children-roster entity
pub mod child;

use crate::errors::Result;
use crate::store::Document;
use serde_json::{Map, Value};

pub use attendee::{Attendee, DayField, DayStatus};
pub use child::Child;

/// An editable roster row, as seen by the generic remote-backed list.
pub trait RosterEntity: Clone + Send + Sync + 'static {
    /// Decodes a store document, defaulting anything missing or malformed.
    fn from_document(doc: &Document) -> Self;

    /// Encodes the entity's fields for a document create.
    fn to_fields(&self) -> Map<String, Value>;

    /// Opaque document id.
    fn id(&self) -> &str;

    /// Replaces the id, used after a store-assigned create.
    fn set_id(&mut self, id: String);

    /// Name shown in lists and matched by the search filter.
    fn display_name(&self) -> &str;

    /// Applies one dotted-path mutation locally.
    ///
    /// The same path is what gets sent to the store, so local and remote
    /// stay field-for-field aligned.
    fn apply_field(&mut self, path: &str, value: &Value) -> Result<()>;
}

/// Coerces a JSON value to display text the way the source data does:
/// strings pass through, numbers and booleans are formatted, everything
/// else is empty.
pub(crate) fn text_of(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        Value::Number(number) => number.to_string(),
        Value::Bool(flag) => flag.to_string(),
        _ => String::new(),
    }
}
