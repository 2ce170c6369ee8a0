//! Spreadsheet import.
//!
//! Reads the first sheet of an uploaded `.xlsx`/`.xls` workbook, skips the
//! header row, maps fixed column positions to entity fields and issues one
//! sequential create per surviving row. There is no schema validation, no
//! duplicate detection and no all-or-nothing guarantee; the report names
//! which rows were created, skipped and failed.

use crate::core::attendance::add_attendee;
use crate::core::roster::Roster;
use crate::entities::{Attendee, Child};
use crate::errors::{Error, Result};
use crate::store::DocumentStore;
use calamine::{Data, Reader, open_workbook_auto};
use chrono::NaiveDate;
use std::path::Path;
use tracing::{info, warn};

/// Days between the spreadsheet serial epoch (1900 system) and 1970-01-01.
const EXCEL_UNIX_EPOCH_OFFSET: i64 = 25569;

/// One imported row.
#[derive(Debug, Clone)]
pub struct ImportedRow {
    /// 0-based row index in the sheet
    pub row: usize,
    /// Id of the created document
    pub id: String,
    /// Name the row carried
    pub name: String,
}

/// Outcome of one import run.
#[derive(Debug, Clone, Default)]
pub struct ImportReport {
    /// Rows that became documents, in sheet order
    pub created: Vec<ImportedRow>,
    /// Row indexes skipped as empty
    pub skipped: Vec<usize>,
    /// Row indexes that failed, with the store error
    pub failed: Vec<(usize, String)>,
}

impl ImportReport {
    /// Number of data rows the sheet contained (header excluded).
    #[must_use]
    pub fn rows_seen(&self) -> usize {
        self.created.len() + self.skipped.len() + self.failed.len()
    }
}

/// Loads the first sheet as a grid of cells.
fn read_first_sheet(path: &Path) -> Result<Vec<Vec<Data>>> {
    let mut workbook = open_workbook_auto(path)?;
    let sheet = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or_else(|| Error::Import {
            message: format!("{} has no sheets", path.display()),
        })?;
    let range = workbook.worksheet_range(&sheet)?;
    Ok(range.rows().map(<[Data]>::to_vec).collect())
}

/// Coerces one cell to text. Numbers drop a trailing `.0`, everything
/// unreadable becomes empty.
fn cell_text(cell: Option<&Data>) -> String {
    match cell {
        None | Some(Data::Empty | Data::Error(_)) => String::new(),
        Some(Data::String(text)) => text.clone(),
        Some(Data::Float(number)) => format_number(*number),
        Some(Data::Int(number)) => number.to_string(),
        Some(Data::Bool(flag)) => flag.to_string(),
        Some(Data::DateTime(datetime)) => format_number(datetime.as_f64()),
        Some(Data::DateTimeIso(text) | Data::DurationIso(text)) => text.clone(),
    }
}

#[allow(clippy::cast_possible_truncation)] // guarded by the magnitude check
fn format_number(number: f64) -> String {
    if number.fract() == 0.0 && number.abs() < 1e15 {
        (number as i64).to_string()
    } else {
        number.to_string()
    }
}

/// Converts a spreadsheet date serial to `YYYY-MM-DD`, or empty text when
/// the serial is out of range.
#[allow(clippy::cast_possible_truncation)]
fn date_serial_to_text(serial: f64) -> String {
    let days = serial.floor() as i64 - EXCEL_UNIX_EPOCH_OFFSET;
    NaiveDate::from_ymd_opt(1970, 1, 1)
        .and_then(|epoch| epoch.checked_add_signed(chrono::Duration::days(days)))
        .map(|date| date.format("%Y-%m-%d").to_string())
        .unwrap_or_default()
}

/// Date-of-birth cells: numeric serials become calendar dates, anything
/// else passes through as text.
fn date_of_birth_text(cell: Option<&Data>) -> String {
    match cell {
        Some(Data::Float(serial)) => date_serial_to_text(*serial),
        #[allow(clippy::cast_precision_loss)] // serials are small
        Some(Data::Int(serial)) => date_serial_to_text(*serial as f64),
        Some(Data::DateTime(datetime)) => date_serial_to_text(datetime.as_f64()),
        other => cell_text(other),
    }
}

/// Imports an attendance sheet: column 0 is the name, rows without one are
/// skipped, row 0 is the header.
pub async fn import_attendance<S: DocumentStore>(
    roster: &mut Roster<Attendee, S>,
    path: &Path,
) -> Result<ImportReport> {
    let rows = read_first_sheet(path)?;
    let mut report = ImportReport::default();
    for (index, row) in rows.iter().enumerate().skip(1) {
        let name = cell_text(row.first());
        if name.trim().is_empty() {
            report.skipped.push(index);
            continue;
        }
        match add_attendee(roster, &name).await {
            Ok(id) => report.created.push(ImportedRow {
                row: index,
                id,
                name,
            }),
            Err(err) => {
                warn!(row = index, "import row failed: {err}");
                report.failed.push((index, err.to_string()));
            }
        }
    }
    info!(
        path = %path.display(),
        created = report.created.len(),
        skipped = report.skipped.len(),
        failed = report.failed.len(),
        "attendance import finished"
    );
    Ok(report)
}

/// Imports a children roster: columns 0-5 are name, phone, address,
/// date-of-birth, stage and birth-certificate; fully-empty rows are
/// skipped, row 0 is the header.
pub async fn import_children<S: DocumentStore>(
    roster: &mut Roster<Child, S>,
    path: &Path,
) -> Result<ImportReport> {
    let rows = read_first_sheet(path)?;
    let mut report = ImportReport::default();
    for (index, row) in rows.iter().enumerate().skip(1) {
        if row.iter().all(|cell| cell_text(Some(cell)).is_empty()) {
            report.skipped.push(index);
            continue;
        }
        let child = Child {
            name: cell_text(row.first()),
            phone: cell_text(row.get(1)),
            address: cell_text(row.get(2)),
            date_of_birth: date_of_birth_text(row.get(3)),
            stage: cell_text(row.get(4)),
            birth_certificate: cell_text(row.get(5)),
            ..Child::default()
        };
        let name = child.name.clone();
        match roster.add(child).await {
            Ok(id) => report.created.push(ImportedRow {
                row: index,
                id,
                name,
            }),
            Err(err) => {
                warn!(row = index, "import row failed: {err}");
                report.failed.push((index, err.to_string()));
            }
        }
    }
    info!(
        path = %path.display(),
        created = report.created.len(),
        skipped = report.skipped.len(),
        failed = report.failed.len(),
        "children import finished"
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::test_utils::{
        attendance_roster, children_roster, seeded_attendance_store, seeded_children_store,
    };
    use rust_xlsxwriter::Workbook;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn attendance_sheet(dir: &TempDir) -> PathBuf {
        let path = dir.path().join("attendance.xlsx");
        let mut workbook = Workbook::new();
        let sheet = workbook.add_worksheet();
        sheet.write_string(0, 0, "Name").unwrap();
        sheet.write_string(1, 0, "Mina Adel").unwrap();
        sheet.write_string(2, 0, "").unwrap(); // blank row
        sheet.write_string(3, 0, "Sara Nabil").unwrap();
        workbook.save(&path).unwrap();
        path
    }

    fn children_sheet(dir: &TempDir) -> PathBuf {
        let path = dir.path().join("children.xlsx");
        let mut workbook = Workbook::new();
        let sheet = workbook.add_worksheet();
        for (column, header) in ["Name", "Phone", "Address", "DOB", "Stage", "Cert"]
            .iter()
            .enumerate()
        {
            #[allow(clippy::cast_possible_truncation)]
            sheet.write_string(0, column as u16, *header).unwrap();
        }
        sheet.write_string(1, 0, "Sara").unwrap();
        sheet.write_string(1, 1, "0100000000").unwrap();
        sheet.write_string(1, 2, "Alexandria").unwrap();
        sheet.write_number(1, 3, 44927.0).unwrap(); // 2023-01-01 as a serial
        sheet.write_string(1, 4, "primary-1").unwrap();
        sheet.write_string(1, 5, "A-17").unwrap();
        // row 2 left entirely empty
        sheet.write_string(3, 0, "Mark").unwrap();
        sheet.write_string(3, 3, "2019-05-04").unwrap();
        workbook.save(&path).unwrap();
        path
    }

    #[test]
    fn date_serials_convert_via_the_1900_epoch() {
        assert_eq!(date_serial_to_text(25569.0), "1970-01-01");
        assert_eq!(date_serial_to_text(44927.0), "2023-01-01");
        assert_eq!(date_serial_to_text(44927.75), "2023-01-01");
    }

    #[tokio::test]
    async fn attendance_import_creates_named_rows_and_skips_blanks() {
        let dir = TempDir::new().unwrap();
        let path = attendance_sheet(&dir);
        let store = seeded_attendance_store(&[]).await;
        let mut roster = attendance_roster(&store);
        roster.load().await.unwrap();

        let report = import_attendance(&mut roster, &path).await.unwrap();
        assert_eq!(report.created.len(), 2);
        assert_eq!(report.skipped, vec![2]);
        assert!(report.failed.is_empty());
        assert_eq!(report.rows_seen(), 3);

        assert_eq!(roster.entries().len(), 2);
        assert!(roster.entries()[0].id.starts_with("Mina_Adel_"));
        assert!(roster.entries()[0].days.is_empty());
    }

    #[tokio::test]
    async fn children_import_maps_columns_and_converts_serials() {
        let dir = TempDir::new().unwrap();
        let path = children_sheet(&dir);
        let store = seeded_children_store(&[]).await;
        let mut roster = children_roster(&store);
        roster.load().await.unwrap();

        let report = import_children(&mut roster, &path).await.unwrap();
        assert_eq!(report.created.len(), 2);
        assert_eq!(report.skipped, vec![2]);

        let sara = roster.get(&report.created[0].id).unwrap();
        assert_eq!(sara.name, "Sara");
        assert_eq!(sara.phone, "0100000000");
        assert_eq!(sara.address, "Alexandria");
        assert_eq!(sara.date_of_birth, "2023-01-01");
        assert_eq!(sara.stage, "primary-1");
        assert_eq!(sara.birth_certificate, "A-17");
        assert!(sara.visited.is_empty());

        let mark = roster.get(&report.created[1].id).unwrap();
        assert_eq!(mark.date_of_birth, "2019-05-04");
        assert_eq!(mark.phone, "");
    }

    #[tokio::test]
    async fn failed_rows_are_reported_and_the_rest_proceed() {
        let dir = TempDir::new().unwrap();
        let path = attendance_sheet(&dir);
        let store = seeded_attendance_store(&[]).await;
        let mut roster = attendance_roster(&store);
        roster.load().await.unwrap();

        store.fail_next("quota exceeded");
        let report = import_attendance(&mut roster, &path).await.unwrap();
        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.failed[0].0, 1);
        assert_eq!(report.created.len(), 1);
        assert_eq!(roster.entries().len(), 1);
    }
}
