//! Attendance-sheet operations.
//!
//! Used by both the Sunday-school and the mass sheets - they share the
//! entity shape and differ only in the collection they target. Per-day
//! edits go through the debounced writer; the day reset walks the whole
//! roster with one direct write per entity, each awaited in order.

use crate::core::roster::{BatchReport, Roster};
use crate::entities::{Attendee, DayField};
use crate::errors::{Error, Result};
use crate::store::DocumentStore;
use chrono::{NaiveDate, Utc};
use serde_json::json;
use tracing::{info, warn};

/// Dotted path of one per-day flag.
#[must_use]
pub fn day_path(date: NaiveDate, field: DayField) -> String {
    format!("days.{}.{}", date.format("%Y-%m-%d"), field.as_str())
}

/// Sets one flag for one date on one attendee, optimistically.
///
/// Only that (entity, date, field) cell changes, locally and remotely.
pub fn set_day<S: DocumentStore>(
    roster: &mut Roster<Attendee, S>,
    id: &str,
    date: NaiveDate,
    field: DayField,
    value: bool,
) -> Result<()> {
    roster.set_field(id, &day_path(date, field), json!(value))
}

/// Adds an attendee with an empty day map.
///
/// The id derives from the trimmed name plus the creation timestamp, the
/// same scheme the existing documents use.
pub async fn add_attendee<S: DocumentStore>(
    roster: &mut Roster<Attendee, S>,
    name: &str,
) -> Result<String> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(Error::Config {
            message: "Attendee name cannot be empty".to_string(),
        });
    }
    let id = Attendee::generate_id(trimmed, Utc::now().timestamp_millis());
    let attendee = Attendee::new(id.clone(), trimmed.to_string());
    roster.add_with_id(attendee).await?;
    info!(%id, "attendee added");
    Ok(id)
}

/// Clears both flags for `date` on every attendee, one sequential write per
/// document. Other dates are untouched. Failures do not stop the walk; the
/// report names every id on both sides.
pub async fn reset_day<S: DocumentStore>(
    roster: &mut Roster<Attendee, S>,
    date: NaiveDate,
) -> BatchReport {
    let ids: Vec<String> = roster.entries().iter().map(|a| a.id.clone()).collect();
    let path = format!("days.{}", date.format("%Y-%m-%d"));
    let mut report = BatchReport::default();
    for id in ids {
        match roster
            .write_now(&id, &path, json!({ "present": false, "absent": false }))
            .await
        {
            Ok(()) => report.updated.push(id),
            Err(err) => {
                warn!(%id, "reset write failed: {err}");
                report.failed.push((id, err.to_string()));
            }
        }
    }
    info!(
        date = %date,
        updated = report.updated.len(),
        failed = report.failed.len(),
        "attendance reset"
    );
    report
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::core::view::filtered;
    use crate::entities::RosterEntity;
    use crate::test_utils::{attendance_roster, date, seeded_attendance_store};

    #[tokio::test]
    async fn add_grows_the_filtered_view_by_one() {
        let store = seeded_attendance_store(&["Mina"]).await;
        let mut roster = attendance_roster(&store);
        roster.load().await.unwrap();
        assert_eq!(filtered(roster.entries(), "sara").len(), 0);

        add_attendee(&mut roster, "Sara").await.unwrap();
        assert_eq!(filtered(roster.entries(), "sara").len(), 1);
        assert_eq!(filtered(roster.entries(), "").len(), 2);
    }

    #[tokio::test]
    async fn add_rejects_blank_names() {
        let store = seeded_attendance_store(&[]).await;
        let mut roster = attendance_roster(&store);
        roster.load().await.unwrap();

        let result = add_attendee(&mut roster, "   ").await;
        assert!(matches!(result, Err(Error::Config { .. })));
        assert!(roster.entries().is_empty());
    }

    #[tokio::test]
    async fn set_day_touches_only_that_cell() {
        let store = seeded_attendance_store(&["Mina", "Sara"]).await;
        let mut roster = attendance_roster(&store);
        roster.load().await.unwrap();
        let mina = roster.entries()[0].id.clone();
        let sara = roster.entries()[1].id.clone();
        let sunday = date("2025-03-02");
        let next_sunday = date("2025-03-09");

        set_day(&mut roster, &mina, sunday, DayField::Present, true).unwrap();
        roster.flush().await;

        let mina_entity = roster.get(&mina).unwrap();
        assert!(mina_entity.day(sunday).present);
        assert!(!mina_entity.day(sunday).absent);
        assert!(!mina_entity.day(next_sunday).present);
        let sara_entity = roster.get(&sara).unwrap();
        assert!(!sara_entity.day(sunday).present);

        // Remote side saw exactly one field write
        assert_eq!(store.update_ops().len(), 1);
    }

    #[tokio::test]
    async fn reset_day_clears_both_flags_for_that_date_only() {
        let store = seeded_attendance_store(&["Mina", "Sara"]).await;
        let mut roster = attendance_roster(&store);
        roster.load().await.unwrap();
        let mina = roster.entries()[0].id.clone();
        let sunday = date("2025-03-02");
        let next_sunday = date("2025-03-09");

        set_day(&mut roster, &mina, sunday, DayField::Present, true).unwrap();
        set_day(&mut roster, &mina, next_sunday, DayField::Absent, true).unwrap();
        roster.flush().await;

        let report = reset_day(&mut roster, sunday).await;
        assert!(report.is_clean());
        assert_eq!(report.updated.len(), 2);

        let mina_entity = roster.get(&mina).unwrap();
        assert!(!mina_entity.day(sunday).present);
        assert!(!mina_entity.day(sunday).absent);
        // The other date survives
        assert!(mina_entity.day(next_sunday).absent);
    }

    #[tokio::test]
    async fn reset_day_reports_failed_rows_and_continues() {
        let store = seeded_attendance_store(&["Mina", "Sara"]).await;
        let mut roster = attendance_roster(&store);
        roster.load().await.unwrap();

        store.fail_next("network down");
        let report = reset_day(&mut roster, date("2025-03-02")).await;
        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.updated.len(), 1);
        assert_eq!(report.total(), 2);

        // The second write still reached the store
        let sara = &report.updated[0];
        let doc = store.document("attendance", sara).unwrap();
        let entity = Attendee::from_document(&doc);
        assert!(!entity.day(date("2025-03-02")).present);
    }
}
