//! Children roster commands.

use crate::cli::{ChildrenCommands, confirm, print_alerts, today};
use crate::core::roster::Roster;
use crate::core::view::{PageView, ViewQuery, page_view};
use crate::core::{children, import};
use crate::entities::Child;
use crate::errors::{Error, Result};
use crate::store::DocumentStore;
use std::sync::Arc;
use std::time::Duration;
use tracing::error;

/// Loads the roster and runs one command against it.
pub async fn run<S: DocumentStore>(
    store: Arc<S>,
    collection: String,
    quiet: Duration,
    command: ChildrenCommands,
) -> Result<()> {
    let mut roster = Roster::<Child, S>::new(store, collection, quiet);
    if let Err(err) = roster.load().await {
        error!("roster load failed: {err}");
        println!("Failed to load the roster; nothing was changed.");
        return Err(err);
    }

    match command {
        ChildrenCommands::List {
            search,
            page,
            month,
        } => {
            let month = month.unwrap_or_else(|| children::month_key(today()));
            let view = page_view(roster.entries(), &ViewQuery { search, page });
            println!("Roster - visits for {month}");
            render_page(&view, &month);
        }
        ChildrenCommands::Add => {
            let id = children::add_row(&mut roster).await?;
            println!("Added empty row ({id})");
        }
        ChildrenCommands::Set { id, field, value } => {
            children::set_text_field(&mut roster, &id, &field, &value)?;
            roster.flush().await;
            print_alerts(&roster.drain_alerts());
            println!("Set {field} on {id}");
        }
        ChildrenCommands::Visit { id, month, clear } => {
            let month = month.unwrap_or_else(|| children::month_key(today()));
            children::set_visited(&mut roster, &id, &month, !clear)?;
            roster.flush().await;
            print_alerts(&roster.drain_alerts());
            // set_visited already found the entity
            if let Some(child) = roster.get(&id) {
                println!(
                    "{} - {month}: visited={}",
                    display_name(child),
                    child.visited_in(&month)
                );
            }
        }
        ChildrenCommands::Reset { month, yes } => {
            let month = month.unwrap_or_else(|| children::month_key(today()));
            if !yes
                && !confirm(&format!(
                    "Reset the visits for {month}? This clears the flag for every child."
                ))
            {
                println!("Cancelled.");
                return Ok(());
            }
            let report = children::reset_month(&mut roster, &month).await?;
            println!(
                "Reset {month}: {} updated, {} failed",
                report.updated.len(),
                report.failed.len()
            );
            for (id, message) in &report.failed {
                println!("  {id}: {message}");
            }
        }
        ChildrenCommands::Import { file } => {
            let report = import::import_children(&mut roster, &file).await?;
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
        ChildrenCommands::Remove { id, yes } => {
            let name = roster
                .get(&id)
                .map(display_name)
                .ok_or_else(|| Error::UnknownEntity { id: id.clone() })?;
            if !yes && !confirm(&format!("Delete {name}? The row is removed permanently.")) {
                println!("Cancelled.");
                return Ok(());
            }
            roster.remove(&id).await?;
            println!("Deleted {name} ({id})");
        }
    }
    Ok(())
}

fn display_name(child: &Child) -> String {
    if child.name.trim().is_empty() {
        "(unnamed row)".to_string()
    } else {
        child.name.clone()
    }
}

fn render_page(view: &PageView<'_, Child>, month: &str) {
    println!("  #  V  Name - Phone - Stage");
    let first_row = (view.page - 1) * crate::core::view::ROWS_PER_PAGE;
    for (offset, child) in view.rows.iter().enumerate() {
        println!(
            "{:>3}  {}  {} - {} - {}  [{}]",
            first_row + offset + 1,
            if child.visited_in(month) { 'x' } else { '-' },
            display_name(child),
            child.phone,
            child.stage,
            child.id
        );
    }
    println!(
        "Page {}/{} - {} matching rows",
        view.page, view.total_pages, view.total_rows
    );
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::entities::RosterEntity;
    use crate::test_utils::{TEST_QUIET_WINDOW, seeded_children_store};

    #[tokio::test]
    async fn set_and_visit_round_trip_through_the_store() {
        let store = seeded_children_store(&["Sara"]).await;
        let id = store.list_all("children").await.unwrap()[0].id.clone();

        run(
            Arc::clone(&store),
            "children".to_string(),
            TEST_QUIET_WINDOW,
            ChildrenCommands::Set {
                id: id.clone(),
                field: "phone".to_string(),
                value: "0100000000".to_string(),
            },
        )
        .await
        .unwrap();

        run(
            Arc::clone(&store),
            "children".to_string(),
            TEST_QUIET_WINDOW,
            ChildrenCommands::Visit {
                id: id.clone(),
                month: Some("2025-03".to_string()),
                clear: false,
            },
        )
        .await
        .unwrap();

        let doc = store.document("children", &id).unwrap();
        let child = Child::from_document(&doc);
        assert_eq!(child.phone, "0100000000");
        assert!(child.visited_in("2025-03"));
    }

    #[tokio::test]
    async fn set_rejects_unknown_fields() {
        let store = seeded_children_store(&["Sara"]).await;
        let id = store.list_all("children").await.unwrap()[0].id.clone();

        let result = run(
            store,
            "children".to_string(),
            TEST_QUIET_WINDOW,
            ChildrenCommands::Set {
                id,
                field: "nickname".to_string(),
                value: "x".to_string(),
            },
        )
        .await;
        assert!(matches!(result, Err(Error::UnknownField { .. })));
    }
}
