//! Attendance sheet commands.
//!
//! Serves both the Sunday-school and the mass sheet; the caller picks the
//! collection. Mutating commands flush the debounced writer before
//! returning so a one-shot invocation never exits with writes still
//! waiting out their quiet window.

use crate::cli::{SheetCommands, confirm, print_alerts, today};
use crate::core::roster::{BatchReport, Roster};
use crate::core::view::{PageView, ViewQuery, page_view};
use crate::core::{attendance, import};
use crate::entities::{Attendee, DayField};
use crate::errors::{Error, Result};
use crate::store::DocumentStore;
use std::sync::Arc;
use std::time::Duration;
use tracing::error;

/// Loads the sheet and runs one command against it.
pub async fn run<S: DocumentStore>(
    store: Arc<S>,
    collection: String,
    quiet: Duration,
    command: SheetCommands,
) -> Result<()> {
    let mut roster = Roster::<Attendee, S>::new(store, collection, quiet);
    if let Err(err) = roster.load().await {
        error!("sheet load failed: {err}");
        println!("Failed to load the sheet; nothing was changed.");
        return Err(err);
    }

    match command {
        SheetCommands::List { date, search, page } => {
            let date = date.unwrap_or_else(today);
            let view = page_view(roster.entries(), &ViewQuery { search, page });
            println!("Sheet for {date}");
            render_page(&view, date);
        }
        SheetCommands::Add { name } => {
            let id = attendance::add_attendee(&mut roster, &name).await?;
            println!("Added {} ({id})", name.trim());
        }
        SheetCommands::Mark {
            id,
            date,
            present,
            absent,
        } => {
            if present.is_none() && absent.is_none() {
                return Err(Error::Config {
                    message: "pass --present and/or --absent".to_string(),
                });
            }
            let date = date.unwrap_or_else(today);
            if let Some(value) = present {
                attendance::set_day(&mut roster, &id, date, DayField::Present, value)?;
            }
            if let Some(value) = absent {
                attendance::set_day(&mut roster, &id, date, DayField::Absent, value)?;
            }
            roster.flush().await;
            print_alerts(&roster.drain_alerts());
            // get() cannot fail here: set_day already found the entity
            if let Some(entity) = roster.get(&id) {
                let status = entity.day(date);
                println!(
                    "{} on {date}: present={} absent={}",
                    entity.name, status.present, status.absent
                );
            }
        }
        SheetCommands::Reset { date, yes } => {
            let date = date.unwrap_or_else(today);
            if !yes
                && !confirm(&format!(
                    "Reset the sheet for {date}? This clears present and absent for every attendee."
                ))
            {
                println!("Cancelled.");
                return Ok(());
            }
            let report = attendance::reset_day(&mut roster, date).await;
            render_batch_report("Reset", &report);
        }
        SheetCommands::Import { file } => {
            let report = import::import_attendance(&mut roster, &file).await?;
            println!(
                "Imported {} rows ({} skipped, {} failed)",
                report.created.len(),
                report.skipped.len(),
                report.failed.len()
            );
            for (row, message) in &report.failed {
                println!("  row {row}: {message}");
            }
        }
        SheetCommands::Remove { id, yes } => {
            let name = roster
                .get(&id)
                .map(|entity| entity.name.clone())
                .ok_or_else(|| Error::UnknownEntity { id: id.clone() })?;
            if !yes
                && !confirm(&format!(
                    "Delete {name}? All recorded attendance is removed permanently."
                ))
            {
                println!("Cancelled.");
                return Ok(());
            }
            roster.remove(&id).await?;
            println!("Deleted {name} ({id})");
        }
    }
    Ok(())
}

fn render_page(view: &PageView<'_, Attendee>, date: chrono::NaiveDate) {
    println!("  #  P A  Name");
    let first_row = (view.page - 1) * crate::core::view::ROWS_PER_PAGE;
    for (offset, attendee) in view.rows.iter().enumerate() {
        let status = attendee.day(date);
        println!(
            "{:>3}  {} {}  {}  [{}]",
            first_row + offset + 1,
            if status.present { 'x' } else { '-' },
            if status.absent { 'x' } else { '-' },
            attendee.name,
            attendee.id
        );
    }
    println!(
        "Page {}/{} - {} matching rows",
        view.page, view.total_pages, view.total_rows
    );
}

fn render_batch_report(label: &str, report: &BatchReport) {
    println!(
        "{label}: {} updated, {} failed",
        report.updated.len(),
        report.failed.len()
    );
    for (id, message) in &report.failed {
        println!("  {id}: {message}");
    }
}
