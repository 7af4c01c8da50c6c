//! Error types for query handling.

use thiserror::Error;

/// Errors that can occur when parsing a query or building its match patterns.
#[derive(Debug, Error)]
pub enum QueryError {
    /// The query contained nothing to search for.
    #[error("query contains no searchable words")]
    Empty,

    /// A match pattern could not be compiled.
    #[error("invalid match pattern for '{term}': {source}")]
    Pattern {
        /// The term the pattern was built from.
        term: String,
        /// Underlying regex error.
        source: regex::Error,
    },
}
