//! Search/filter state container.
//!
//! Owned by whoever renders, passed explicitly. Every change is published to
//! subscribers as a full [`SearchSnapshot`].

use crate::models::{FiltersPatch, SearchFilters};
use std::fmt;
use std::str::FromStr;
use tokio::sync::watch;
use tracing::debug;

pub const RECENT_SEARCH_CAPACITY: usize = 5;

/// Most-recent-first list of distinct search terms.
///
/// Re-adding a term already in the list leaves it where it is.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RecentSearches {
    items: Vec<String>,
}

impl RecentSearches {
    /// Returns whether the list changed.
    pub fn add(&mut self, term: &str) -> bool {
        if term.is_empty() || self.items.iter().any(|t| t == term) {
            return false;
        }
        self.items.insert(0, term.to_string());
        self.items.truncate(RECENT_SEARCH_CAPACITY);
        true
    }

    pub fn clear(&mut self) -> bool {
        let changed = !self.items.is_empty();
        self.items.clear();
        changed
    }

    pub fn as_slice(&self) -> &[String] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Theme {
    Light,
    #[default]
    Dark,
}

impl Theme {
    pub fn toggle(self) -> Theme {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }

    pub fn is_dark(self) -> bool {
        self == Theme::Dark
    }
}

impl FromStr for Theme {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "light" => Ok(Theme::Light),
            "dark" => Ok(Theme::Dark),
            other => Err(format!("unknown theme '{}' (expected light or dark)", other)),
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SearchSnapshot {
    pub term: String,
    pub filters: SearchFilters,
    pub recent_searches: RecentSearches,
    pub theme: Theme,
}

pub struct SearchStore {
    tx: watch::Sender<SearchSnapshot>,
}

impl Default for SearchStore {
    fn default() -> Self {
        SearchStore::new(SearchSnapshot::default())
    }
}

impl SearchStore {
    pub fn new(initial: SearchSnapshot) -> Self {
        let (tx, _) = watch::channel(initial);
        SearchStore { tx }
    }

    pub fn subscribe(&self) -> watch::Receiver<SearchSnapshot> {
        self.tx.subscribe()
    }

    pub fn snapshot(&self) -> SearchSnapshot {
        self.tx.borrow().clone()
    }

    pub fn term(&self) -> String {
        self.tx.borrow().term.clone()
    }

    pub fn filters(&self) -> SearchFilters {
        self.tx.borrow().filters.clone()
    }

    pub fn recent_searches(&self) -> Vec<String> {
        self.tx.borrow().recent_searches.as_slice().to_vec()
    }

    pub fn theme(&self) -> Theme {
        self.tx.borrow().theme
    }

    /// Stored verbatim, trimming belongs to the input boundary.
    pub fn set_query(&self, term: impl Into<String>) {
        let term = term.into();
        self.tx.send_modify(|state| state.term = term);
    }

    pub fn set_filters(&self, patch: FiltersPatch) {
        self.tx.send_modify(|state| {
            state.filters = state.filters.merge(patch);
            debug!(filters = ?state.filters, "filters updated");
        });
    }

    /// Make the `n`th (1-based) recent search the current term.
    ///
    /// The recent list is left as is. Returns the term, or `None` when out of
    /// range.
    pub fn select_recent_search(&self, n: usize) -> Option<String> {
        let term = n
            .checked_sub(1)
            .and_then(|i| self.tx.borrow().recent_searches.as_slice().get(i).cloned())?;
        self.set_query(term.as_str());
        Some(term)
    }

    pub fn add_recent_search(&self, term: &str) {
        self.tx
            .send_if_modified(|state| state.recent_searches.add(term));
    }

    pub fn clear_recent_searches(&self) {
        self.tx
            .send_if_modified(|state| state.recent_searches.clear());
    }

    pub fn set_theme(&self, theme: Theme) {
        self.tx.send_if_modified(|state| {
            let changed = state.theme != theme;
            state.theme = theme;
            changed
        });
    }

    pub fn toggle_theme(&self) -> Theme {
        let mut theme = Theme::default();
        self.tx.send_modify(|state| {
            state.theme = state.theme.toggle();
            theme = state.theme;
        });
        theme
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{SortField, SortOrder};

    #[test]
    fn adding_a_term_twice_keeps_one() {
        let store = SearchStore::default();
        store.add_recent_search("rust");
        store.add_recent_search("rust");
        assert_eq!(store.recent_searches(), vec!["rust"]);
    }

    #[test]
    fn recent_searches_keep_five_most_recent() {
        let store = SearchStore::default();
        for term in ["a", "b", "c", "d", "e", "f"] {
            store.add_recent_search(term);
        }
        assert_eq!(store.recent_searches(), vec!["f", "e", "d", "c", "b"]);
    }

    #[test]
    fn existing_term_is_not_promoted() {
        let mut recent = RecentSearches::default();
        recent.add("tokio");
        recent.add("serde");
        assert!(!recent.add("tokio"));
        assert_eq!(recent.as_slice(), ["serde", "tokio"]);
    }

    #[test]
    fn empty_term_is_ignored() {
        let mut recent = RecentSearches::default();
        assert!(!recent.add(""));
        assert!(recent.is_empty());
    }

    #[test]
    fn clear_empties_the_list() {
        let store = SearchStore::default();
        store.add_recent_search("axum");
        store.clear_recent_searches();
        assert!(store.recent_searches().is_empty());
    }

    #[test]
    fn set_query_is_verbatim() {
        let store = SearchStore::default();
        store.set_query("  spaced  ");
        assert_eq!(store.term(), "  spaced  ");
    }

    #[test]
    fn set_filters_merges() {
        let store = SearchStore::default();
        store.set_filters(FiltersPatch::default().language("Go").min_stars(100));
        store.set_filters(FiltersPatch::default().order(SortOrder::Asc));

        let filters = store.filters();
        assert_eq!(filters.language, "Go");
        assert_eq!(filters.min_stars, 100);
        assert_eq!(filters.sort, SortField::Stars);
        assert_eq!(filters.order, SortOrder::Asc);
    }

    #[test]
    fn presets_merge_into_filters() {
        let store = SearchStore::default();
        store.set_filters(FiltersPatch::default().language("Rust").order(SortOrder::Asc));

        store.set_filters(FiltersPatch::popular());
        let f = store.filters();
        assert_eq!((f.min_stars, f.sort, f.order), (1_000, SortField::Stars, SortOrder::Asc));
        assert_eq!(f.language, "Rust");

        store.set_filters(FiltersPatch::active());
        let f = store.filters();
        assert_eq!((f.min_stars, f.sort, f.order), (100, SortField::Forks, SortOrder::Asc));

        store.set_filters(FiltersPatch::recently_updated());
        let f = store.filters();
        assert_eq!((f.min_stars, f.sort, f.order), (100, SortField::Updated, SortOrder::Desc));

        store.set_filters(FiltersPatch::trending_new());
        let f = store.filters();
        assert_eq!((f.min_stars, f.sort, f.order), (50, SortField::Created, SortOrder::Desc));
        assert_eq!(f.language, "Rust");
    }

    #[test]
    fn selecting_a_recent_search_keeps_the_order() {
        let store = SearchStore::default();
        for term in ["axum", "tokio", "serde"] {
            store.add_recent_search(term);
        }

        assert_eq!(store.select_recent_search(3).as_deref(), Some("axum"));
        assert_eq!(store.term(), "axum");
        assert_eq!(store.recent_searches(), vec!["serde", "tokio", "axum"]);

        assert_eq!(store.select_recent_search(0), None);
        assert_eq!(store.select_recent_search(4), None);
        assert_eq!(store.term(), "axum");
    }

    #[test]
    fn theme_toggles() {
        let store = SearchStore::default();
        assert_eq!(store.theme(), Theme::Dark);
        assert_eq!(store.toggle_theme(), Theme::Light);
        assert!(!store.theme().is_dark());
        store.set_theme(Theme::Dark);
        assert_eq!(store.snapshot().theme, Theme::Dark);
        assert_eq!("dark".parse::<Theme>(), Ok(Theme::Dark));
    }

    #[test]
    fn subscribers_see_changes() {
        let store = SearchStore::default();
        let mut rx = store.subscribe();
        assert!(!rx.has_changed().unwrap());

        store.add_recent_search("rust");
        assert!(rx.has_changed().unwrap());
        assert_eq!(rx.borrow_and_update().recent_searches.as_slice(), ["rust"]);

        // no-op insert does not notify
        store.add_recent_search("rust");
        assert!(!rx.has_changed().unwrap());
    }
}
