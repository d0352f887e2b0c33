//! Terminal rendering of result pages.

use crate::models::{RepositoryRecord, SearchResultPage};
use crate::state::Theme;
use chrono::{DateTime, Utc};

const RESET: &str = "\x1b[0m";
const MAX_TOPICS: usize = 3;

fn accent(theme: Theme) -> &'static str {
    match theme {
        Theme::Dark => "\x1b[1;96m",
        Theme::Light => "\x1b[1;34m",
    }
}

pub fn format_count(n: u64) -> String {
    if n >= 1_000_000 {
        format!("{:.1}M", n as f64 / 1_000_000.0)
    } else if n >= 1_000 {
        format!("{:.1}K", n as f64 / 1_000.0)
    } else {
        n.to_string()
    }
}

/// `1234567` -> `1,234,567`
pub fn format_thousands(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

pub fn format_date(date: &DateTime<Utc>) -> String {
    date.format("%b %-d, %Y").to_string()
}

pub fn display_description(repo: &RepositoryRecord) -> &str {
    repo.description
        .as_deref()
        .filter(|d| !d.trim().is_empty())
        .unwrap_or("No description available")
}

pub fn render_repository(repo: &RepositoryRecord, theme: Theme) -> String {
    let mut out = format!("  {}{}{}\n", accent(theme), repo.full_name, RESET);
    out.push_str(&format!(
        "    ⭐ {}  🍴 {}",
        format_count(repo.stars),
        format_count(repo.forks)
    ));
    if repo.open_issues > 0 {
        out.push_str(&format!("  issues {}", repo.open_issues));
    }
    if let Some(language) = &repo.language {
        out.push_str(&format!("  {}", language));
    }
    if let Some(spdx) = repo.license.as_ref().and_then(|l| l.spdx_id.as_deref()) {
        out.push_str(&format!("  [{}]", spdx));
    }
    out.push('\n');
    out.push_str(&format!("    {}\n", display_description(repo)));

    if !repo.topics.is_empty() {
        let shown: Vec<&str> = repo.topics.iter().take(MAX_TOPICS).map(String::as_str).collect();
        out.push_str(&format!("    #{}", shown.join(" #")));
        if repo.topics.len() > MAX_TOPICS {
            out.push_str(&format!(" +{}", repo.topics.len() - MAX_TOPICS));
        }
        out.push('\n');
    }

    out.push_str(&format!(
        "    {}  (updated {})\n",
        repo.html_url,
        format_date(&repo.updated_at)
    ));
    out
}

pub fn render_page(title: &str, page: &SearchResultPage, theme: Theme, limit: usize) -> String {
    if page.items.is_empty() {
        return "No repositories found.\n".to_string();
    }

    let mut out = format!(
        "\n{}{}{}  {} repositories found\n\n",
        accent(theme),
        title,
        RESET,
        format_thousands(page.total_count)
    );
    for repo in page.items.iter().take(limit) {
        out.push_str(&render_repository(repo, theme));
        out.push('\n');
    }
    if page.incomplete_results {
        out.push_str("(results may be incomplete, GitHub timed out part of the search)\n");
    }
    out
}
