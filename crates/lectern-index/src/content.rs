//! Section content served through a resource fetcher.

use lectern_document::{ContentStore, DocumentError};

use crate::{IndexError, fetch::ResourceFetcher};

/// Loads section HTML from `<collectionId>/<sectionId>.html`.
#[derive(Debug, Clone)]
pub struct FetcherContentStore<F> {
    /// Resource transport.
    fetcher: F,
}

impl<F> FetcherContentStore<F> {
    /// Creates a store over `fetcher`.
    pub fn new(fetcher: F) -> Self {
        Self { fetcher }
    }
}

/// Returns the path of a section's rendered content.
pub fn section_path(collection_id: &str, section_id: &str) -> String {
    format!("{collection_id}/{section_id}.html")
}

impl<F: ResourceFetcher> ContentStore for FetcherContentStore<F> {
    async fn load_section(
        &self,
        collection_id: &str,
        section_id: &str,
    ) -> Result<String, DocumentError> {
        let path = section_path(collection_id, section_id);
        self.fetcher.fetch(&path).await.map_err(|err| match err {
            IndexError::NotFound { .. } => DocumentError::NotFound {
                collection_id: collection_id.to_string(),
                section_id: section_id.to_string(),
            },
            other => DocumentError::Load {
                collection_id: collection_id.to_string(),
                section_id: section_id.to_string(),
                message: other.to_string(),
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::TempDir;

    use super::*;
    use crate::FsFetcher;

    #[tokio::test]
    async fn loads_sections_from_disk() {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join("kjv")).unwrap();
        fs::write(dir.path().join("kjv/JN1.html"), "<p>In the beginning</p>").unwrap();

        let store = FetcherContentStore::new(FsFetcher::new(dir.path()));
        assert_eq!(
            store.load_section("kjv", "JN1").await.unwrap(),
            "<p>In the beginning</p>"
        );

        let err = store.load_section("kjv", "JN2").await.unwrap_err();
        assert!(
            matches!(err, DocumentError::NotFound { ref section_id, .. } if section_id == "JN2")
        );
    }
}
