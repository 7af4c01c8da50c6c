//! Error types for the lectern-index crate.

use std::io;

use lectern_query::QueryError;
use thiserror::Error;

/// Errors raised while fetching or decoding index resources.
///
/// Inside the search pipeline these never escape: a failed shard counts as zero hits, a failed
/// stems table disables stemming and a failed info file yields empty metadata.
#[derive(Debug, Error)]
pub enum IndexError {
    /// The resource does not exist.
    #[error("resource not found: {path}")]
    NotFound {
        /// Path relative to the fetcher's base.
        path: String,
    },

    /// The resource could not be retrieved.
    #[error("failed to fetch {path}: {message}")]
    Fetch {
        /// Path or URL that was requested.
        path: String,
        /// Transport error message.
        message: String,
    },

    /// The resource was retrieved but is not valid JSON of the expected shape.
    #[error("malformed resource {path}: {source}")]
    Parse {
        /// Path relative to the fetcher's base.
        path: String,
        /// Underlying JSON error.
        source: serde_json::Error,
    },

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl IndexError {
    /// Creates a `Fetch` error from a transport error.
    pub fn fetch(path: impl Into<String>, source: &reqwest::Error) -> Self {
        Self::Fetch {
            path: path.into(),
            message: source.to_string(),
        }
    }

    /// Returns true if the resource simply does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

/// Errors that end a search run.
#[derive(Debug, Error)]
pub enum SearchError {
    /// Another search is already running on this orchestrator.
    #[error("a search is already in progress")]
    Busy,

    /// The run was canceled before it completed.
    #[error("search canceled")]
    Canceled,

    /// The query could not be parsed or compiled.
    #[error(transparent)]
    Query(#[from] QueryError),
}
