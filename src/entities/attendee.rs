//! Attendance-sheet entity.
//!
//! One document per child, keyed by a name-derived id, carrying a map from
//! calendar date to that day's status. A date absent from the map means
//! "unset" and renders as neither present nor absent.

use crate::entities::{RosterEntity, text_of};
use crate::errors::{Error, Result};
use crate::store::Document;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};
use std::collections::BTreeMap;

/// Per-day attendance flags. Both default to false; they are independent
/// checkboxes in the source data, not a two-state toggle.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayStatus {
    /// Marked present on this date
    #[serde(default)]
    pub present: bool,
    /// Marked absent on this date
    #[serde(default)]
    pub absent: bool,
}

/// The two per-day flags, named as they appear on the wire.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DayField {
    /// The `present` flag
    Present,
    /// The `absent` flag
    Absent,
}

impl DayField {
    /// Wire name of the flag.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Present => "present",
            Self::Absent => "absent",
        }
    }
}

/// One row of an attendance sheet.
#[derive(Clone, Debug, PartialEq)]
pub struct Attendee {
    /// Document id, generated from the name plus a creation timestamp
    pub id: String,
    /// Display name
    pub name: String,
    /// Date-keyed status map; missing dates are unset
    pub days: BTreeMap<NaiveDate, DayStatus>,
}

impl Attendee {
    /// Creates an attendee with no recorded days.
    #[must_use]
    pub fn new(id: String, name: String) -> Self {
        Self {
            id,
            name,
            days: BTreeMap::new(),
        }
    }

    /// Derives a document id from a name and a millisecond timestamp:
    /// whitespace runs become underscores, the timestamp is appended.
    /// Two same-named attendees created in the same millisecond collide,
    /// a known trait of the source data.
    #[must_use]
    pub fn generate_id(name: &str, timestamp_millis: i64) -> String {
        let slug = name.split_whitespace().collect::<Vec<_>>().join("_");
        format!("{slug}_{timestamp_millis}")
    }

    /// Status for a date, unset dates reading as all-false.
    #[must_use]
    pub fn day(&self, date: NaiveDate) -> DayStatus {
        self.days.get(&date).copied().unwrap_or_default()
    }

    /// Sets one flag for one date, leaving the other flag untouched.
    pub fn set_day_field(&mut self, date: NaiveDate, field: DayField, value: bool) {
        let status = self.days.entry(date).or_default();
        match field {
            DayField::Present => status.present = value,
            DayField::Absent => status.absent = value,
        }
    }

    /// Clears both flags for one date.
    pub fn clear_day(&mut self, date: NaiveDate) {
        self.days.insert(date, DayStatus::default());
    }

    fn days_from_value(value: Option<&Value>) -> BTreeMap<NaiveDate, DayStatus> {
        let Some(Value::Object(entries)) = value else {
            return BTreeMap::new();
        };
        let mut days = BTreeMap::new();
        for (key, status) in entries {
            let Ok(date) = NaiveDate::parse_from_str(key, "%Y-%m-%d") else {
                continue;
            };
            days.insert(date, status_from_value(status));
        }
        days
    }
}

fn status_from_value(value: &Value) -> DayStatus {
    DayStatus {
        present: value
            .get("present")
            .and_then(Value::as_bool)
            .unwrap_or(false),
        absent: value
            .get("absent")
            .and_then(Value::as_bool)
            .unwrap_or(false),
    }
}

impl RosterEntity for Attendee {
    fn from_document(doc: &Document) -> Self {
        Self {
            id: doc.id.clone(),
            name: doc.fields.get("name").map(text_of).unwrap_or_default(),
            days: Self::days_from_value(doc.fields.get("days")),
        }
    }

    fn to_fields(&self) -> Map<String, Value> {
        let mut days = Map::new();
        for (date, status) in &self.days {
            days.insert(
                date.format("%Y-%m-%d").to_string(),
                json!({ "present": status.present, "absent": status.absent }),
            );
        }
        let mut fields = Map::new();
        fields.insert("name".to_string(), Value::String(self.name.clone()));
        fields.insert("days".to_string(), Value::Object(days));
        fields
    }

    fn id(&self) -> &str {
        &self.id
    }

    fn set_id(&mut self, id: String) {
        self.id = id;
    }

    fn display_name(&self) -> &str {
        &self.name
    }

    fn apply_field(&mut self, path: &str, value: &Value) -> Result<()> {
        if path == "name" {
            self.name = text_of(value);
            return Ok(());
        }
        let Some(rest) = path.strip_prefix("days.") else {
            return Err(Error::UnknownField {
                field: path.to_string(),
            });
        };
        match rest.split_once('.') {
            // days.<date>.<flag>
            Some((date, flag)) => {
                let date = parse_date(path, date)?;
                let field = match flag {
                    "present" => DayField::Present,
                    "absent" => DayField::Absent,
                    _ => {
                        return Err(Error::UnknownField {
                            field: path.to_string(),
                        });
                    }
                };
                self.set_day_field(date, field, value.as_bool().unwrap_or(false));
                Ok(())
            }
            // days.<date> replaces the whole day object
            None => {
                let date = parse_date(path, rest)?;
                self.days.insert(date, status_from_value(value));
                Ok(())
            }
        }
    }
}

fn parse_date(path: &str, segment: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(segment, "%Y-%m-%d").map_err(|_| Error::UnknownField {
        field: path.to_string(),
    })
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;

    fn date(text: &str) -> NaiveDate {
        NaiveDate::parse_from_str(text, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn generate_id_collapses_whitespace() {
        assert_eq!(
            Attendee::generate_id("Mina  Adel Fahmy", 1_712_000_000_000),
            "Mina_Adel_Fahmy_1712000000000"
        );
    }

    #[test]
    fn decodes_document_with_missing_days() {
        let doc = Document::new("kid_1".to_string(), {
            let mut fields = Map::new();
            fields.insert("name".to_string(), json!("Mina"));
            fields
        });
        let attendee = Attendee::from_document(&doc);
        assert_eq!(attendee.name, "Mina");
        assert!(attendee.days.is_empty());
        assert_eq!(attendee.day(date("2025-03-02")), DayStatus::default());
    }

    #[test]
    fn decodes_days_skipping_malformed_keys() {
        let doc = Document::new("kid_1".to_string(), {
            let mut fields = Map::new();
            fields.insert("name".to_string(), json!("Mina"));
            fields.insert(
                "days".to_string(),
                json!({
                    "2025-03-02": { "present": true },
                    "not-a-date": { "present": true },
                }),
            );
            fields
        });
        let attendee = Attendee::from_document(&doc);
        assert_eq!(attendee.days.len(), 1);
        assert!(attendee.day(date("2025-03-02")).present);
        assert!(!attendee.day(date("2025-03-02")).absent);
    }

    #[test]
    fn apply_field_sets_one_flag_only() {
        let mut attendee = Attendee::new("kid_1".to_string(), "Mina".to_string());
        attendee
            .apply_field("days.2025-03-02.present", &json!(true))
            .unwrap();
        attendee
            .apply_field("days.2025-03-02.absent", &json!(true))
            .unwrap();
        attendee
            .apply_field("days.2025-03-02.present", &json!(false))
            .unwrap();

        let status = attendee.day(date("2025-03-02"));
        assert!(!status.present);
        assert!(status.absent);
    }

    #[test]
    fn apply_field_rejects_unknown_paths() {
        let mut attendee = Attendee::new("kid_1".to_string(), "Mina".to_string());
        assert!(matches!(
            attendee.apply_field("phone", &json!("123")),
            Err(Error::UnknownField { .. })
        ));
        assert!(matches!(
            attendee.apply_field("days.yesterday.present", &json!(true)),
            Err(Error::UnknownField { .. })
        ));
    }

    #[test]
    fn round_trips_through_fields() {
        let mut attendee = Attendee::new("kid_1".to_string(), "Mina".to_string());
        attendee.set_day_field(date("2025-03-02"), DayField::Present, true);

        let doc = Document::new("kid_1".to_string(), attendee.to_fields());
        assert_eq!(Attendee::from_document(&doc), attendee);
    }
}
