//! Loading candidate sections and verifying their fragments.

use lectern_document::{ContentStore, SectionContent};
use lectern_highlight::MatchPlan;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::{FragmentId, merge::SectionBucket};

/// One verified, highlighted fragment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResult {
    /// The fragment.
    #[serde(rename = "fragmentid")]
    pub fragment_id: FragmentId,
    /// The fragment's markup with highlights inserted.
    pub html: String,
}

/// Re-verifies index candidates against live section content.
///
/// The index only nominates candidates; a fragment becomes a result only if the match plan
/// verifies against its current markup.
pub struct SectionScanner<C> {
    /// Where section content comes from.
    store: C,
}

impl<C: ContentStore> SectionScanner<C> {
    /// Creates a scanner over `store`.
    pub fn new(store: C) -> Self {
        Self { store }
    }

    /// Returns the content store.
    pub fn store(&self) -> &C {
        &self.store
    }

    /// Loads one section and returns its verified fragments in bucket order.
    ///
    /// A section that fails to load yields no results. Fragments missing from the content
    /// are skipped.
    pub async fn scan(
        &self,
        collection_id: &str,
        bucket: &SectionBucket,
        plan: &MatchPlan,
    ) -> Vec<SearchResult> {
        let html = match self
            .store
            .load_section(collection_id, &bucket.section_id)
            .await
        {
            Ok(html) => html,
            Err(err) => {
                warn!(section = %bucket.section_id, error = %err, "skipping section");
                return Vec::new();
            }
        };

        let mut content = SectionContent::parse(&html);
        content.strip_notes();

        let results: Vec<SearchResult> = bucket
            .fragment_ids
            .iter()
            .filter_map(|id| {
                let markup = content.fragment_markup(id.as_str())?;
                let html = plan.highlight(&markup)?;
                Some(SearchResult {
                    fragment_id: id.clone(),
                    html,
                })
            })
            .collect();

        debug!(
            section = %bucket.section_id,
            candidates = bucket.fragment_ids.len(),
            verified = results.len(),
            "section scanned"
        );
        results
    }
}
