//! Stateless adapter over the GitHub repository search endpoint.
//!
//! One GET per call. No retries or caching here, see [`crate::cache`].

use crate::config::GitsploreConfig;
use crate::error::ApiError;
use crate::models::{SearchResultPage, SortField, SortOrder};
use crate::query;
use crate::types::GitHubSearchResponse;
use async_trait::async_trait;
use tracing::debug;

pub const ACCEPT_HEADER: &str = "application/vnd.github.v3+json";
pub const TRENDING_PER_PAGE: u32 = 30;

/// Source of repository search results.
#[async_trait]
pub trait RepositorySource: Send + Sync {
    async fn search(
        &self,
        query: &str,
        sort: SortField,
        order: SortOrder,
        page: u32,
        per_page: u32,
    ) -> Result<SearchResultPage, ApiError>;

    async fn trending(&self, language: Option<&str>) -> Result<SearchResultPage, ApiError>;
}

pub struct GitHubClient {
    http: reqwest::Client,
    base_url: String,
    user_agent: String,
}

impl GitHubClient {
    pub fn new(config: &GitsploreConfig) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder().build()?;

        Ok(GitHubClient {
            http,
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
            user_agent: config.user_agent.clone(),
        })
    }

    pub fn search_url(
        &self,
        query: &str,
        sort: SortField,
        order: SortOrder,
        page: u32,
        per_page: u32,
    ) -> String {
        format!(
            "{}/search/repositories?q={}&sort={}&order={}&page={}&per_page={}",
            self.base_url,
            urlencoding::encode(query),
            sort,
            order,
            page,
            per_page
        )
    }

    pub fn trending_url(&self, language: Option<&str>) -> String {
        format!(
            "{}/search/repositories?q={}&sort={}&order={}&per_page={}",
            self.base_url,
            urlencoding::encode(&query::build_trending_query(language)),
            SortField::Stars,
            SortOrder::Desc,
            TRENDING_PER_PAGE
        )
    }

    async fn fetch(&self, url: &str) -> Result<SearchResultPage, ApiError> {
        debug!(url, "GET");
        let resp = self
            .http
            .get(url)
            .header(reqwest::header::ACCEPT, ACCEPT_HEADER)
            .header(reqwest::header::USER_AGENT, &self.user_agent)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            return Err(ApiError::Request {
                status: status.as_u16(),
            });
        }

        let body = resp.text().await?;
        let response: GitHubSearchResponse = serde_json::from_str(&body)?;
        debug!(
            total_count = response.total_count,
            items = response.items.len(),
            "search response"
        );
        Ok(response.into())
    }
}

#[async_trait]
impl RepositorySource for GitHubClient {
    async fn search(
        &self,
        query: &str,
        sort: SortField,
        order: SortOrder,
        page: u32,
        per_page: u32,
    ) -> Result<SearchResultPage, ApiError> {
        let url = self.search_url(query, sort, order, page, per_page);
        self.fetch(&url).await
    }

    async fn trending(&self, language: Option<&str>) -> Result<SearchResultPage, ApiError> {
        let url = self.trending_url(language);
        self.fetch(&url).await
    }
}
