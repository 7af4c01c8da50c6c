//! Error types for section content loading.

use thiserror::Error;

/// Errors that can occur when loading section content.
#[derive(Debug, Error)]
pub enum DocumentError {
    /// The section does not exist in the collection.
    #[error("section {section_id} not found in collection {collection_id}")]
    NotFound {
        /// Collection that was searched.
        collection_id: String,
        /// Section that was requested.
        section_id: String,
    },

    /// The section exists but could not be loaded.
    #[error("failed to load section {section_id} of {collection_id}: {message}")]
    Load {
        /// Collection that was searched.
        collection_id: String,
        /// Section that was requested.
        section_id: String,
        /// Error message from the underlying transport.
        message: String,
    },
}
