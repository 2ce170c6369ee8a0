//! Shared test utilities.
//!
//! Helpers for seeding an in-memory store and opening rosters over it with
//! a short quiet window so debounce-sensitive tests stay fast.

#![allow(clippy::unwrap_used)]

use crate::core::roster::Roster;
use crate::entities::{Attendee, Child, RosterEntity};
use crate::store::{DocumentStore, MemoryStore};
use chrono::NaiveDate;
use std::sync::Arc;
use std::time::Duration;

/// Quiet window used by test rosters; long enough to observe coalescing,
/// short enough to wait out in real time.
pub const TEST_QUIET_WINDOW: Duration = Duration::from_millis(20);

/// Parses a `YYYY-MM-DD` literal.
pub fn date(text: &str) -> NaiveDate {
    NaiveDate::parse_from_str(text, "%Y-%m-%d").unwrap()
}

/// A store whose attendance collection holds one attendee per name, with
/// ids generated the way the application generates them.
pub async fn seeded_attendance_store(names: &[&str]) -> Arc<MemoryStore> {
    let store = Arc::new(MemoryStore::new());
    for (index, name) in names.iter().enumerate() {
        let id = Attendee::generate_id(name, 1_700_000_000_000 + index as i64);
        let attendee = Attendee::new(id, (*name).to_string());
        store
            .create_with_id("attendance", attendee.id(), attendee.to_fields())
            .await
            .unwrap();
    }
    store
}

/// A store whose children collection holds one named row per name.
pub async fn seeded_children_store(names: &[&str]) -> Arc<MemoryStore> {
    let store = Arc::new(MemoryStore::new());
    for name in names {
        let child = Child {
            name: (*name).to_string(),
            ..Child::default()
        };
        store.create("children", child.to_fields()).await.unwrap();
    }
    store
}

/// Opens an attendance roster over the store with the test quiet window.
pub fn attendance_roster(store: &Arc<MemoryStore>) -> Roster<Attendee, MemoryStore> {
    Roster::new(Arc::clone(store), "attendance", TEST_QUIET_WINDOW)
}

/// Opens a children roster over the store with the test quiet window.
pub fn children_roster(store: &Arc<MemoryStore>) -> Roster<Child, MemoryStore> {
    Roster::new(Arc::clone(store), "children", TEST_QUIET_WINDOW)
}
