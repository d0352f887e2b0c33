//! Search query construction.
//!
//! Clause order is fixed: base clause, then `language:`, then `stars:>=`.

use crate::models::SearchFilters;
use chrono::{Duration, NaiveDate, Utc};

/// Substituted when the term is blank so the query is never empty
pub const DEFAULT_BASE_CLAUSE: &str = "stars:>1";

pub const TRENDING_WINDOW_DAYS: i64 = 7;
pub const TRENDING_MIN_STARS: u64 = 10;

/// Languages offered by the trending selector. An empty value means all.
pub const TRENDING_LANGUAGES: &[(&str, &str)] = &[
    ("All", ""),
    ("JavaScript", "JavaScript"),
    ("TypeScript", "TypeScript"),
    ("Python", "Python"),
    ("Go", "Go"),
    ("Rust", "Rust"),
];

/// Languages offered by the search filter. Any other value is passed through.
pub const SEARCH_LANGUAGES: &[&str] = &[
    "JavaScript", "TypeScript", "Python", "Java", "Go", "Rust", "C++", "C#", "PHP", "Ruby",
    "Swift", "Kotlin", "Dart", "Scala", "R", "Shell",
];

pub fn build_query(term: &str, filters: &SearchFilters) -> String {
    let term = term.trim();
    let mut query = if term.is_empty() {
        DEFAULT_BASE_CLAUSE.to_string()
    } else {
        term.to_string()
    };

    if !filters.language.is_empty() {
        query.push_str(&format!(" language:{}", filters.language));
    }

    if filters.min_stars > 0 {
        query.push_str(&format!(" stars:>={}", filters.min_stars));
    }

    query
}

/// Trending query for the week ending today (UTC).
pub fn build_trending_query(language: Option<&str>) -> String {
    build_trending_query_on(Utc::now().date_naive(), language)
}

/// Trending query relative to an explicit calendar date.
pub fn build_trending_query_on(today: NaiveDate, language: Option<&str>) -> String {
    let since = today - Duration::days(TRENDING_WINDOW_DAYS);
    let mut query = format!(
        "created:>{} stars:>{}",
        since.format("%Y-%m-%d"),
        TRENDING_MIN_STARS
    );

    if let Some(language) = language.filter(|l| !l.is_empty()) {
        query.push_str(&format!(" language:{}", language));
    }

    query
}
