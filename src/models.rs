use crate::types::{GitHubLicense, GitHubOwner, GitHubRepo, GitHubSearchResponse};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum SortField {
    #[default]
    Stars,
    Forks,
    Updated,
    Created,
}

impl SortField {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortField::Stars => "stars",
            SortField::Forks => "forks",
            SortField::Updated => "updated",
            SortField::Created => "created",
        }
    }
}

impl FromStr for SortField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "stars" => Ok(SortField::Stars),
            "forks" => Ok(SortField::Forks),
            "updated" => Ok(SortField::Updated),
            "created" => Ok(SortField::Created),
            other => Err(format!(
                "unknown sort field '{}' (expected stars, forks, updated or created)",
                other
            )),
        }
    }
}

impl fmt::Display for SortField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl SortOrder {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortOrder::Asc => "asc",
            SortOrder::Desc => "desc",
        }
    }
}

impl FromStr for SortOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "asc" => Ok(SortOrder::Asc),
            "desc" => Ok(SortOrder::Desc),
            other => Err(format!("unknown sort order '{}' (expected asc or desc)", other)),
        }
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Structured refinement applied alongside the query term.
///
/// An empty `language` means unfiltered. `min_stars` of zero adds no clause.
#[derive(Serialize, Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct SearchFilters {
    pub language: String,
    pub sort: SortField,
    pub order: SortOrder,
    pub min_stars: u64,
}

impl SearchFilters {
    /// Field-by-field merge, unspecified fields keep their value.
    pub fn merge(&self, patch: FiltersPatch) -> SearchFilters {
        SearchFilters {
            language: patch.language.unwrap_or_else(|| self.language.clone()),
            sort: patch.sort.unwrap_or(self.sort),
            order: patch.order.unwrap_or(self.order),
            min_stars: patch.min_stars.unwrap_or(self.min_stars),
        }
    }
}

/// Partial filter update.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FiltersPatch {
    pub language: Option<String>,
    pub sort: Option<SortField>,
    pub order: Option<SortOrder>,
    pub min_stars: Option<u64>,
}

impl FiltersPatch {
    pub fn language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }

    pub fn sort(mut self, sort: SortField) -> Self {
        self.sort = Some(sort);
        self
    }

    pub fn order(mut self, order: SortOrder) -> Self {
        self.order = Some(order);
        self
    }

    pub fn min_stars(mut self, min_stars: u64) -> Self {
        self.min_stars = Some(min_stars);
        self
    }

    /// 1K+ stars, most starred first.
    pub fn popular() -> Self {
        FiltersPatch::default().min_stars(1_000).sort(SortField::Stars)
    }

    /// 100+ stars, most forked first.
    pub fn active() -> Self {
        FiltersPatch::default().min_stars(100).sort(SortField::Forks)
    }

    pub fn recently_updated() -> Self {
        FiltersPatch::default()
            .sort(SortField::Updated)
            .order(SortOrder::Desc)
    }

    /// Newest repositories with 50+ stars.
    pub fn trending_new() -> Self {
        FiltersPatch::default()
            .sort(SortField::Created)
            .order(SortOrder::Desc)
            .min_stars(50)
    }

    /// Look up a quick filter by its short name.
    pub fn preset(name: &str) -> Option<Self> {
        match name {
            "popular" => Some(FiltersPatch::popular()),
            "active" => Some(FiltersPatch::active()),
            "updated" => Some(FiltersPatch::recently_updated()),
            "new" => Some(FiltersPatch::trending_new()),
            _ => None,
        }
    }
}

/// Short names accepted by [`FiltersPatch::preset`].
pub const FILTER_PRESETS: &[&str] = &["popular", "active", "updated", "new"];

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct Owner {
    pub login: String,
    pub avatar_url: String,
    pub html_url: String,
    pub kind: String,
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct License {
    pub name: String,
    pub spdx_id: Option<String>,
}

/// Read-only projection of one repository from a search response.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct RepositoryRecord {
    pub id: u64,
    pub name: String,
    pub full_name: String,
    pub owner: Owner,
    pub description: Option<String>,
    pub html_url: String,
    pub stars: u64,
    pub forks: u64,
    pub open_issues: u64,
    pub size_kb: u64,
    pub language: Option<String>,
    pub topics: Vec<String>,
    pub license: Option<License>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub pushed_at: DateTime<Utc>,
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct SearchResultPage {
    pub total_count: u64,
    pub incomplete_results: bool,
    pub items: Vec<RepositoryRecord>,
}

impl From<GitHubOwner> for Owner {
    fn from(owner: GitHubOwner) -> Self {
        Owner {
            login: owner.login,
            avatar_url: owner.avatar_url,
            html_url: owner.html_url,
            kind: owner.kind,
        }
    }
}

impl From<GitHubLicense> for License {
    fn from(license: GitHubLicense) -> Self {
        License {
            name: license.name,
            spdx_id: license.spdx_id,
        }
    }
}

impl From<GitHubRepo> for RepositoryRecord {
    fn from(repo: GitHubRepo) -> Self {
        RepositoryRecord {
            id: repo.id,
            name: repo.name,
            full_name: repo.full_name,
            owner: repo.owner.into(),
            description: repo.description,
            html_url: repo.html_url,
            stars: repo.stargazers_count,
            forks: repo.forks_count,
            open_issues: repo.open_issues_count,
            size_kb: repo.size,
            language: repo.language,
            topics: repo.topics,
            license: repo.license.map(License::from),
            created_at: repo.created_at,
            updated_at: repo.updated_at,
            pushed_at: repo.pushed_at,
        }
    }
}

impl From<GitHubSearchResponse> for SearchResultPage {
    fn from(response: GitHubSearchResponse) -> Self {
        SearchResultPage {
            total_count: response.total_count,
            incomplete_results: response.incomplete_results,
            items: response.items.into_iter().map(RepositoryRecord::from).collect(),
        }
    }
}

/// Which staleness window a cache key falls under.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyFamily {
    Search,
    Trending,
}

/// Identity of a cached query.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CacheKey {
    Search {
        term: String,
        filters: SearchFilters,
        page: u32,
    },
    Trending {
        language: Option<String>,
    },
}

impl CacheKey {
    /// First page of a search.
    pub fn search(term: impl Into<String>, filters: SearchFilters) -> Self {
        CacheKey::search_page(term, filters, 1)
    }

    pub fn search_page(term: impl Into<String>, filters: SearchFilters, page: u32) -> Self {
        CacheKey::Search {
            term: term.into(),
            filters,
            page,
        }
    }

    /// Empty language is the same view as no language.
    pub fn trending(language: Option<&str>) -> Self {
        CacheKey::Trending {
            language: language.filter(|l| !l.is_empty()).map(str::to_string),
        }
    }

    pub fn family(&self) -> KeyFamily {
        match self {
            CacheKey::Search { .. } => KeyFamily::Search,
            CacheKey::Trending { .. } => KeyFamily::Trending,
        }
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CacheKey::Search {
                term,
                filters,
                page,
            } => write!(
                f,
                "repositories[{:?} lang={:?} sort={} order={} min_stars={} page={}]",
                term, filters.language, filters.sort, filters.order, filters.min_stars, page
            ),
            CacheKey::Trending { language } => {
                write!(f, "trending[{}]", language.as_deref().unwrap_or("all"))
            }
        }
    }
}
