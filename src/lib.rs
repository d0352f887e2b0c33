//! Gitsplore: search and browse GitHub repository metadata.
//!
//! - [`query`] builds `search/repositories` query strings from a term and filters
//! - [`client`] issues the HTTP requests and maps responses into [`models`]
//! - [`cache`] coalesces concurrent requests per key, applies staleness windows and retries
//! - [`state`] holds the current term, filters, recent searches and theme
//! - [`explorer`] ties them together into views that ignore out-of-date responses
//! - [`render`] formats result pages for the terminal

pub mod cache;
pub mod client;
pub mod config;
pub mod error;
pub mod explorer;
pub mod models;
pub mod query;
pub mod render;
pub mod state;
pub mod types;

pub use error::{ApiError, ConfigError};
