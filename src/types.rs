//! Wire schema of the GitHub `search/repositories` endpoint.

use chrono::{DateTime, Utc};
use serde::Deserialize;

#[derive(Deserialize, Debug, Clone)]
pub struct GitHubOwner {
    pub login: String,
    pub avatar_url: String,
    pub html_url: String,
    #[serde(rename = "type")]
    pub kind: String,
}

#[derive(Deserialize, Debug, Clone)]
pub struct GitHubLicense {
    pub name: String,
    // GitHub sends null here for "Other" licenses
    pub spdx_id: Option<String>,
}

#[derive(Deserialize, Debug, Clone)]
pub struct GitHubRepo {
    pub id: u64,
    pub name: String,
    pub full_name: String,
    pub description: Option<String>,
    pub html_url: String,
    pub stargazers_count: u64,
    pub forks_count: u64,
    pub language: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub pushed_at: DateTime<Utc>,
    pub size: u64,
    pub open_issues_count: u64,
    #[serde(default)]
    pub topics: Vec<String>,
    pub owner: GitHubOwner,
    pub license: Option<GitHubLicense>,
}

#[derive(Deserialize, Debug, Clone)]
pub struct GitHubSearchResponse {
    pub total_count: u64,
    #[serde(default)]
    pub incomplete_results: bool,
    pub items: Vec<GitHubRepo>,
}
