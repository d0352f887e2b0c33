use anyhow::Context;
use gitsplore::explorer::Explorer;
use gitsplore::models::SearchFilters;
use gitsplore::render;
use gitsplore::state::Theme;
use tracing::error;

pub async fn search_repos(
    explorer: &Explorer,
    term: &str,
    filters: &SearchFilters,
    page: u32,
    theme: Theme,
) -> anyhow::Result<()> {
    let result = explorer
        .fetch_search(term, filters, page)
        .await
        .map_err(|err| {
            error!(kind = %err.kind(), status = ?err.status(), "search for {:?} failed: {}", term, err);
            err
        })
        .context("Search failed")?;

    let title = if term.is_empty() {
        "Popular repositories".to_string()
    } else {
        format!("Search Results for \"{}\"", term)
    };
    print!("{}", render::render_page(&title, &result, theme, usize::MAX));
    Ok(())
}
