//! Children-roster entity.
//!
//! One document per child with free-text contact fields and a month-keyed
//! visit map. The text fields take any string, including empty - the roster
//! is filled in incrementally and never validated, by design of the source
//! data.

use crate::entities::{RosterEntity, text_of};
use crate::errors::{Error, Result};
use crate::store::Document;
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// One row of the children roster.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Child {
    /// Store-assigned document id
    pub id: String,
    /// Display name
    pub name: String,
    /// Contact phone, free text
    pub phone: String,
    /// Home address, free text
    pub address: String,
    /// Date of birth, free text (usually `YYYY-MM-DD`)
    pub date_of_birth: String,
    /// School stage, free text
    pub stage: String,
    /// Birth-certificate reference, free text
    pub birth_certificate: String,
    /// `YYYY-MM` keyed visit flags; missing months are unvisited
    pub visited: BTreeMap<String, bool>,
}

impl Child {
    /// Wire names of the editable text fields, in roster column order.
    pub const TEXT_FIELDS: [&'static str; 6] = [
        "name",
        "phone",
        "address",
        "dateOfBirth",
        "stage",
        "birthCertificate",
    ];

    /// Reads an editable text field by its wire name.
    #[must_use]
    pub fn text_field(&self, field: &str) -> Option<&str> {
        match field {
            "name" => Some(&self.name),
            "phone" => Some(&self.phone),
            "address" => Some(&self.address),
            "dateOfBirth" => Some(&self.date_of_birth),
            "stage" => Some(&self.stage),
            "birthCertificate" => Some(&self.birth_certificate),
            _ => None,
        }
    }

    fn text_slot(&mut self, field: &str) -> Option<&mut String> {
        match field {
            "name" => Some(&mut self.name),
            "phone" => Some(&mut self.phone),
            "address" => Some(&mut self.address),
            "dateOfBirth" => Some(&mut self.date_of_birth),
            "stage" => Some(&mut self.stage),
            "birthCertificate" => Some(&mut self.birth_certificate),
            _ => None,
        }
    }

    /// Whether this child was visited in the given month.
    #[must_use]
    pub fn visited_in(&self, month: &str) -> bool {
        self.visited.get(month).copied().unwrap_or(false)
    }

    /// Sets the visit flag for one month.
    pub fn set_visited(&mut self, month: &str, value: bool) {
        self.visited.insert(month.to_string(), value);
    }

    fn visited_from_value(value: Option<&Value>) -> BTreeMap<String, bool> {
        let Some(Value::Object(entries)) = value else {
            return BTreeMap::new();
        };
        entries
            .iter()
            .map(|(month, flag)| (month.clone(), flag.as_bool().unwrap_or(false)))
            .collect()
    }
}

impl RosterEntity for Child {
    fn from_document(doc: &Document) -> Self {
        let text = |field: &str| doc.fields.get(field).map(text_of).unwrap_or_default();
        Self {
            id: doc.id.clone(),
            name: text("name"),
            phone: text("phone"),
            address: text("address"),
            date_of_birth: text("dateOfBirth"),
            stage: text("stage"),
            birth_certificate: text("birthCertificate"),
            visited: Self::visited_from_value(doc.fields.get("visited")),
        }
    }

    fn to_fields(&self) -> Map<String, Value> {
        let mut visited = Map::new();
        for (month, flag) in &self.visited {
            visited.insert(month.clone(), Value::Bool(*flag));
        }
        let mut fields = Map::new();
        for field in Self::TEXT_FIELDS {
            // text_field covers every name in TEXT_FIELDS
            let value = self.text_field(field).unwrap_or_default();
            fields.insert(field.to_string(), Value::String(value.to_string()));
        }
        fields.insert("visited".to_string(), Value::Object(visited));
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
        if let Some(slot) = self.text_slot(path) {
            *slot = text_of(value);
            return Ok(());
        }
        if path == "visited" {
            self.visited = Self::visited_from_value(Some(value));
            return Ok(());
        }
        if let Some(month) = path.strip_prefix("visited.") {
            self.set_visited(month, value.as_bool().unwrap_or(false));
            return Ok(());
        }
        Err(Error::UnknownField {
            field: path.to_string(),
        })
    }
}
