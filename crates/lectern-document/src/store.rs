//! The content store collaborator.

use std::future::Future;

use crate::DocumentError;

/// Serves the rendered content of sections by id.
///
/// Implementations load one section per call; the search pipeline never issues concurrent
/// loads against a store.
pub trait ContentStore: Send + Sync {
    /// Loads the rendered HTML of `section_id` in `collection_id`.
    fn load_section(
        &self,
        collection_id: &str,
        section_id: &str,
    ) -> impl Future<Output = Result<String, DocumentError>> + Send;
}
