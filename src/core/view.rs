//! Search, locale-aware sort and pagination over a cached roster.
//!
//! Derived on demand from the cache and a query, never persisted. The sort
//! uses a folded collation key so that Arabic names order the way a reader
//! expects: diacritics and tatweel are ignored and the hamza-carrier alef
//! forms collate together with the bare alef.

use crate::entities::RosterEntity;

/// Fixed page size of every list view.
pub const ROWS_PER_PAGE: usize = 20;

/// A list query: search text plus a 1-based page number.
#[derive(Clone, Debug)]
pub struct ViewQuery {
    /// Case-insensitive substring matched against display names
    pub search: String,
    /// 1-based page number; out-of-range pages yield empty rows
    pub page: usize,
}

impl Default for ViewQuery {
    fn default() -> Self {
        Self {
            search: String::new(),
            page: 1,
        }
    }
}

/// One page of a filtered, sorted roster.
#[derive(Debug)]
pub struct PageView<'a, E> {
    /// Rows visible on this page, in sorted order
    pub rows: Vec<&'a E>,
    /// The page these rows belong to (1-based)
    pub page: usize,
    /// Total pages for the current filter
    pub total_pages: usize,
    /// Total rows matching the current filter
    pub total_rows: usize,
}

/// Entities whose display name contains the search string, sorted by the
/// collation key. The sort is stable.
pub fn filtered<'a, E: RosterEntity>(entries: &'a [E], search: &str) -> Vec<&'a E> {
    let needle = search.to_lowercase();
    let mut rows: Vec<&E> = entries
        .iter()
        .filter(|entity| entity.display_name().to_lowercase().contains(&needle))
        .collect();
    rows.sort_by_cached_key(|entity| collation_key(entity.display_name()));
    rows
}

/// Filters, sorts and slices one page.
pub fn page_view<'a, E: RosterEntity>(entries: &'a [E], query: &ViewQuery) -> PageView<'a, E> {
    let rows = filtered(entries, &query.search);
    let total_rows = rows.len();
    let total_pages = total_rows.div_ceil(ROWS_PER_PAGE);
    let page = query.page.max(1);
    let start = (page - 1) * ROWS_PER_PAGE;
    let rows = if start < total_rows {
        rows[start..(start + ROWS_PER_PAGE).min(total_rows)].to_vec()
    } else {
        Vec::new()
    };
    PageView {
        rows,
        page,
        total_pages,
        total_rows,
    }
}

/// Folds a name into its collation key: Arabic diacritics and tatweel are
/// dropped, alef/hamza-carrier variants unify, ASCII letters lowercase.
fn collation_key(name: &str) -> String {
    name.chars()
        .filter_map(|c| match c {
            // Tashkeel marks and the tatweel stretch character
            '\u{064B}'..='\u{0652}' | '\u{0640}' => None,
            'أ' | 'إ' | 'آ' | 'ٱ' => Some('ا'),
            'ى' => Some('ي'),
            'ة' => Some('ه'),
            other => Some(other.to_ascii_lowercase()),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::entities::Attendee;

    fn roster(names: &[&str]) -> Vec<Attendee> {
        names
            .iter()
            .enumerate()
            .map(|(index, name)| Attendee::new(format!("kid_{index}"), (*name).to_string()))
            .collect()
    }

    #[test]
    fn arabic_names_sort_in_alphabet_order() {
        let entries = roster(&["ب", "أ"]);
        let rows = filtered(&entries, "");
        let names: Vec<&str> = rows.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, ["أ", "ب"]);
    }

    #[test]
    fn hamza_and_diacritics_do_not_split_the_ordering() {
        let entries = roster(&["يوسف", "إبرام", "بيتر", "آدم"]);
        let rows = filtered(&entries, "");
        let names: Vec<&str> = rows.iter().map(|e| e.name.as_str()).collect();
        // Folded keys: ابرام < ادم < بيتر < يوسف
        assert_eq!(names, ["إبرام", "آدم", "بيتر", "يوسف"]);
    }

    #[test]
    fn search_is_case_insensitive_and_clearing_restores_all() {
        let entries = roster(&["Peter", "Paula", "Mark"]);
        let matched = filtered(&entries, "pa");
        assert_eq!(matched.len(), 1);
        assert_eq!(matched[0].name, "Paula");

        let all = filtered(&entries, "");
        assert_eq!(all.len(), 3);
    }

    #[test]
    fn sort_is_stable_for_equal_keys() {
        let mut entries = roster(&["مينا", "مينا"]);
        entries[0].id = "first".to_string();
        entries[1].id = "second".to_string();
        let rows = filtered(&entries, "");
        assert_eq!(rows[0].id, "first");
        assert_eq!(rows[1].id, "second");
    }

    #[test]
    fn pages_slice_at_twenty_rows() {
        let names: Vec<String> = (0..45).map(|n| format!("name{n:02}")).collect();
        let name_refs: Vec<&str> = names.iter().map(String::as_str).collect();
        let entries = roster(&name_refs);

        let first = page_view(&entries, &ViewQuery::default());
        assert_eq!(first.rows.len(), ROWS_PER_PAGE);
        assert_eq!(first.total_pages, 3);
        assert_eq!(first.total_rows, 45);

        let last = page_view(
            &entries,
            &ViewQuery {
                search: String::new(),
                page: 3,
            },
        );
        assert_eq!(last.rows.len(), 5);

        let beyond = page_view(
            &entries,
            &ViewQuery {
                search: String::new(),
                page: 9,
            },
        );
        assert!(beyond.rows.is_empty());
        assert_eq!(beyond.total_rows, 45);
    }
}
