//! Shared fixtures for the HTTP-level tests

use gitsplore::config::GitsploreConfig;

/// Config pointing at a mock server
#[allow(dead_code)]
pub fn config_for(base_url: &str) -> GitsploreConfig {
    GitsploreConfig {
        api_base_url: base_url.to_string(),
        ..GitsploreConfig::default()
    }
}

/// A two-item search response; the second item has every nullable field null
#[allow(dead_code)]
pub fn search_body() -> String {
    r#"{
  "total_count": 1234,
  "incomplete_results": false,
  "items": [
    {
      "id": 44838949,
      "name": "deno",
      "full_name": "denoland/deno",
      "description": "A modern runtime for JavaScript and TypeScript.",
      "html_url": "https://github.com/denoland/deno",
      "stargazers_count": 98000,
      "forks_count": 5300,
      "language": "Rust",
      "created_at": "2018-05-15T01:34:26Z",
      "updated_at": "2024-06-01T10:00:00Z",
      "pushed_at": "2024-06-01T09:59:00Z",
      "size": 240000,
      "open_issues_count": 1900,
      "topics": ["deno", "javascript", "typescript", "rust"],
      "owner": {
        "login": "denoland",
        "avatar_url": "https://avatars.githubusercontent.com/u/42048915?v=4",
        "html_url": "https://github.com/denoland",
        "type": "Organization"
      },
      "license": { "key": "mit", "name": "MIT License", "spdx_id": "MIT" }
    },
    {
      "id": 7,
      "name": "scratch",
      "full_name": "someone/scratch",
      "description": null,
      "html_url": "https://github.com/someone/scratch",
      "stargazers_count": 12,
      "forks_count": 0,
      "language": null,
      "created_at": "2024-05-30T00:00:00Z",
      "updated_at": "2024-05-31T00:00:00Z",
      "pushed_at": "2024-05-31T00:00:00Z",
      "size": 3,
      "open_issues_count": 0,
      "owner": {
        "login": "someone",
        "avatar_url": "https://avatars.githubusercontent.com/u/7?v=4",
        "html_url": "https://github.com/someone",
        "type": "User"
      },
      "license": null
    }
  ]
}"#
    .to_string()
}

#[allow(dead_code)]
pub fn empty_body() -> String {
    r#"{ "total_count": 0, "incomplete_results": false, "items": [] }"#.to_string()
}
