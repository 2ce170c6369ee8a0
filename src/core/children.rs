//! Children-roster operations.
//!
//! Roster rows are edited field by field through the debounced writer; the
//! visit flag is keyed by calendar month. The month reset mirrors the
//! attendance day reset: one direct write per document, sequential, with a
//! per-entity report.

use crate::core::roster::{BatchReport, Roster};
use crate::entities::Child;
use crate::errors::{Error, Result};
use crate::store::DocumentStore;
use chrono::{Datelike, NaiveDate};
use serde_json::json;
use tracing::{info, warn};

/// `YYYY-MM` key for the given date's month.
#[must_use]
pub fn month_key(date: NaiveDate) -> String {
    format!("{:04}-{:02}", date.year(), date.month())
}

/// Validates a `YYYY-MM` month key.
#[must_use]
pub fn is_month_key(key: &str) -> bool {
    let Some((year, month)) = key.split_once('-') else {
        return false;
    };
    year.len() == 4
        && year.chars().all(|c| c.is_ascii_digit())
        && month.len() == 2
        && matches!(month.parse::<u8>(), Ok(1..=12))
}

fn checked_month(key: &str) -> Result<()> {
    if is_month_key(key) {
        Ok(())
    } else {
        Err(Error::InvalidPeriod {
            period: key.to_string(),
        })
    }
}

/// Appends an all-empty roster row and returns its store-assigned id.
pub async fn add_row<S: DocumentStore>(roster: &mut Roster<Child, S>) -> Result<String> {
    let id = roster.add(Child::default()).await?;
    info!(%id, "roster row added");
    Ok(id)
}

/// Sets one free-text field, optimistically. Any string is accepted,
/// including empty - the roster carries no validation.
pub fn set_text_field<S: DocumentStore>(
    roster: &mut Roster<Child, S>,
    id: &str,
    field: &str,
    value: &str,
) -> Result<()> {
    if !Child::TEXT_FIELDS.contains(&field) {
        return Err(Error::UnknownField {
            field: field.to_string(),
        });
    }
    roster.set_field(id, field, json!(value))
}

/// Sets the visit flag for one month, optimistically.
pub fn set_visited<S: DocumentStore>(
    roster: &mut Roster<Child, S>,
    id: &str,
    month: &str,
    value: bool,
) -> Result<()> {
    checked_month(month)?;
    roster.set_field(id, &format!("visited.{month}"), json!(value))
}

/// Clears the visit flag for `month` on every child, one sequential write
/// per document. Other months are untouched.
pub async fn reset_month<S: DocumentStore>(
    roster: &mut Roster<Child, S>,
    month: &str,
) -> Result<BatchReport> {
    checked_month(month)?;
    let ids: Vec<String> = roster.entries().iter().map(|c| c.id.clone()).collect();
    let path = format!("visited.{month}");
    let mut report = BatchReport::default();
    for id in ids {
        match roster.write_now(&id, &path, json!(false)).await {
            Ok(()) => report.updated.push(id),
            Err(err) => {
                warn!(%id, "reset write failed: {err}");
                report.failed.push((id, err.to_string()));
            }
        }
    }
    info!(
        %month,
        updated = report.updated.len(),
        failed = report.failed.len(),
        "visits reset"
    );
    Ok(report)
}
