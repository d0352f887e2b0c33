use crate::cache::{CachePolicy, RetryPolicy};
use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_API_BASE: &str = "https://api.github.com";
pub const DEFAULT_USER_AGENT: &str = "Gitsplore-App";
pub const API_BASE_ENV: &str = "GITSPLORE_API_BASE";

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct GitsploreConfig {
    pub api_base_url: String,
    pub user_agent: String,
    pub per_page: u32,
    pub search_stale_secs: u64,
    pub trending_stale_secs: u64,
    pub max_retries: u32,
    pub retry_delay_ms: u64,
}

impl Default for GitsploreConfig {
    fn default() -> Self {
        GitsploreConfig {
            api_base_url: DEFAULT_API_BASE.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            per_page: 30,
            search_stale_secs: 5 * 60,
            trending_stale_secs: 30 * 60,
            max_retries: 2,
            retry_delay_ms: 0,
        }
    }
}

impl GitsploreConfig {
    /// Config file if present, defaults otherwise, then environment overrides.
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = match Self::config_path() {
            Ok(path) if path.exists() => Self::from_file(&path)?,
            _ => GitsploreConfig::default(),
        };
        if let Ok(base) = std::env::var(API_BASE_ENV) {
            if !base.trim().is_empty() {
                config.api_base_url = base.trim().to_string();
            }
        }
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        serde_json::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })
    }

    pub fn config_path() -> Result<PathBuf, ConfigError> {
        let home = std::env::var("HOME").map_err(|_| ConfigError::MissingHome)?;
        Ok(PathBuf::from(home)
            .join(".config")
            .join("gitsplore")
            .join("config.json"))
    }

    pub fn cache_policy(&self) -> CachePolicy {
        CachePolicy {
            search_stale: Duration::from_secs(self.search_stale_secs),
            trending_stale: Duration::from_secs(self.trending_stale_secs),
        }
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_retries: self.max_retries,
            delay: Duration::from_millis(self.retry_delay_ms),
        }
    }
}
