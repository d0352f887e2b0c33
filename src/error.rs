use std::fmt;
use thiserror::Error;

/// Failure of a single repository search request.
///
/// Cloneable so one failed attempt sequence can be handed to every caller
/// that was waiting on the same cache key.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// Transport failure, no response was received
    #[error("Network error: {0}")]
    Network(String),

    /// Non-success HTTP status, body not parsed
    #[error("GitHub API error: {status}")]
    Request { status: u16 },

    /// Response body did not match the search schema
    #[error("Malformed response: {0}")]
    Parse(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Network,
    Request,
    Parse,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::Network => "network",
            ErrorKind::Request => "request",
            ErrorKind::Parse => "parse",
        };
        f.write_str(name)
    }
}

impl ApiError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ApiError::Network(_) => ErrorKind::Network,
            ApiError::Request { .. } => ErrorKind::Request,
            ApiError::Parse(_) => ErrorKind::Parse,
        }
    }

    /// HTTP status carried by a request error
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Request { status } => Some(*status),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        ApiError::Network(err.to_string())
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        ApiError::Parse(err.to_string())
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("No HOME directory set")]
    MissingHome,

    #[error("Can't read config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config file {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}
