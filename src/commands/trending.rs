use anyhow::Context;
use gitsplore::explorer::Explorer;
use gitsplore::render;
use gitsplore::state::Theme;
use tracing::error;

pub async fn trending_repos(
    explorer: &Explorer,
    language: Option<&str>,
    theme: Theme,
) -> anyhow::Result<()> {
    let result = explorer
        .fetch_trending(language)
        .await
        .map_err(|err| {
            error!(kind = %err.kind(), status = ?err.status(), "trending fetch failed: {}", err);
            err
        })
        .context("Failed to load trending repositories")?;

    let title = match language.filter(|l| !l.is_empty()) {
        Some(language) => format!("Trending This Week ({})", language),
        None => "Trending This Week".to_string(),
    };
    print!("{}", render::render_page(&title, &result, theme, usize::MAX));
    Ok(())
}
