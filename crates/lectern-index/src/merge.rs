//! Combining per-term hit lists and grouping fragments by section.

use std::collections::{HashMap, HashSet};

use lectern_query::JoinMode;
use serde::Serialize;

use crate::{
    FragmentId,
    collection::{CollectionInfo, DivisionFilter, SectionOrder},
};

/// The candidate fragments of one section, in document order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SectionBucket {
    /// The section to load.
    #[serde(rename = "sectionid")]
    pub section_id: String,
    /// Candidate fragments within it.
    #[serde(rename = "fragmentids")]
    pub fragment_ids: Vec<FragmentId>,
}

/// Merges per-term hit lists into one candidate list in document order.
///
/// AND keeps fragments present in every list, once each. OR concatenates the lists and keeps
/// duplicates, so a fragment hit by two terms appears twice. The sort is stable.
pub fn merge(lists: &[&[FragmentId]], join: JoinMode, order: &SectionOrder) -> Vec<FragmentId> {
    let mut merged = match join {
        JoinMode::Or => lists.iter().flat_map(|list| list.iter().cloned()).collect(),
        JoinMode::And => intersect(lists),
    };
    merged.sort_by_key(|id| order.sort_key(id));
    merged
}

/// Returns the fragments of the first list that occur in every other list, deduplicated.
fn intersect(lists: &[&[FragmentId]]) -> Vec<FragmentId> {
    let Some((first, rest)) = lists.split_first() else {
        return Vec::new();
    };
    let others: Vec<HashSet<&FragmentId>> =
        rest.iter().map(|list| list.iter().collect()).collect();

    let mut seen = HashSet::new();
    first
        .iter()
        .filter(|id| others.iter().all(|set| set.contains(id)))
        .filter(|id| seen.insert(*id))
        .cloned()
        .collect()
}

/// Groups merged fragments into per-section buckets in first-seen order, dropping fragments
/// whose book the filter excludes.
pub fn group_by_section(fragments: &[FragmentId], filter: &DivisionFilter) -> Vec<SectionBucket> {
    let mut buckets: Vec<SectionBucket> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();

    for id in fragments {
        let section = id.section_id();
        if !filter.allows(section) {
            continue;
        }
        let slot = *index.entry(section).or_insert_with(|| {
            buckets.push(SectionBucket {
                section_id: section.to_string(),
                fragment_ids: Vec::new(),
            });
            buckets.len() - 1
        });
        buckets[slot].fragment_ids.push(id.clone());
    }

    buckets
}

/// Builds one bucket per allowed section, in canonical order, listing every fragment the
/// collection metadata says the section has.
///
/// Sections with no known fragment count are skipped.
pub fn brute_force_buckets(info: &CollectionInfo, filter: &DivisionFilter) -> Vec<SectionBucket> {
    info.sections
        .iter()
        .filter(|section| filter.allows(section))
        .filter_map(|section| {
            let count = info.fragment_count(section).filter(|&n| n > 0)?;
            Some(SectionBucket {
                section_id: section.clone(),
                fragment_ids: (1..=count)
                    .map(|n| FragmentId::from_parts(section, n))
                    .collect(),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;

    fn ids(list: &[&str]) -> Vec<FragmentId> {
        list.iter().copied().map(FragmentId::from).collect()
    }

    fn strs(list: &[FragmentId]) -> Vec<&str> {
        list.iter().map(FragmentId::as_str).collect()
    }

    fn order() -> SectionOrder {
        SectionOrder::new(&["JN1".into(), "JN2".into()])
    }

    #[test]
    fn and_intersects() {
        let the = ids(&["JN1_1", "JN2_3"]);
        let word = ids(&["JN1_1"]);
        let merged = merge(&[the.as_slice(), word.as_slice()], JoinMode::And, &order());
        assert_eq!(strs(&merged), vec!["JN1_1"]);
    }

    #[test]
    fn or_keeps_duplicates_in_document_order() {
        let the = ids(&["JN1_1", "JN2_3"]);
        let word = ids(&["JN1_1"]);
        let merged = merge(&[the.as_slice(), word.as_slice()], JoinMode::Or, &order());
        assert_eq!(strs(&merged), vec!["JN1_1", "JN1_1", "JN2_3"]);
    }

    #[test]
    fn single_list_is_sorted_and_deduplicated_under_and() {
        let list = ids(&["JN2_1", "JN1_12", "JN1_2", "JN1_2"]);
        let merged = merge(&[list.as_slice()], JoinMode::And, &order());
        assert_eq!(strs(&merged), vec!["JN1_2", "JN1_12", "JN2_1"]);
    }

    #[test]
    fn dropping_a_term_never_shrinks_and_results() {
        let a = ids(&["JN1_1", "JN1_2", "JN2_3"]);
        let b = ids(&["JN1_2", "JN2_3"]);
        let c = ids(&["JN2_3", "JN2_4"]);
        let all = merge(&[a.as_slice(), b.as_slice(), c.as_slice()], JoinMode::And, &order());
        let fewer = merge(&[a.as_slice(), b.as_slice()], JoinMode::And, &order());
        assert!(all.iter().all(|id| fewer.contains(id)));
        assert_eq!(strs(&all), vec!["JN2_3"]);
        assert_eq!(strs(&fewer), vec!["JN1_2", "JN2_3"]);
    }

    #[test]
    fn no_lists_merge_to_nothing() {
        assert!(merge(&[], JoinMode::And, &order()).is_empty());
        assert!(merge(&[], JoinMode::Or, &order()).is_empty());
    }

    #[test]
    fn groups_in_first_seen_order() {
        let merged = ids(&["JN1_1", "JN1_1", "JN2_3", "RV1_1"]);
        let buckets = group_by_section(&merged, &DivisionFilter::all());
        assert_eq!(buckets.len(), 3);
        assert_eq!(buckets[0].section_id, "JN1");
        assert_eq!(strs(&buckets[0].fragment_ids), vec!["JN1_1", "JN1_1"]);
        assert_eq!(buckets[2].section_id, "RV1");
    }

    #[test]
    fn grouping_applies_division_filter() {
        let merged = ids(&["JN1_1", "MT5_3", "JN2_3"]);
        let buckets = group_by_section(&merged, &DivisionFilter::new(["MT"]));
        assert_eq!(buckets.len(), 1);
        assert_eq!(buckets[0].section_id, "MT5");
    }

    #[test]
    fn brute_force_synthesizes_every_fragment() {
        let info = CollectionInfo {
            sections: vec!["JN1".into(), "JN2".into(), "JN3".into(), "MT1".into()],
            fragment_counts: BTreeMap::from([
                ("JN1".into(), 2),
                ("JN2".into(), 3),
                ("JN3".into(), 0),
                ("MT1".into(), 1),
            ]),
            ..CollectionInfo::default()
        };
        let buckets = brute_force_buckets(&info, &DivisionFilter::new(["jn"]));
        assert_eq!(buckets.len(), 2);
        assert_eq!(strs(&buckets[0].fragment_ids), vec!["JN1_1", "JN1_2"]);
        assert_eq!(
            strs(&buckets[1].fragment_ids),
            vec!["JN2_1", "JN2_2", "JN2_3"]
        );
    }
}
