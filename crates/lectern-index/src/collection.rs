//! Collection metadata, canonical section order and division filtering.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use crate::{FragmentId, id::book_code};

/// Name of the metadata file in each collection directory.
pub const INFO_FILE: &str = "info.json";

/// Metadata describing one collection (`<collectionId>/info.json`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectionInfo {
    /// Collection id.
    #[serde(default)]
    pub id: String,
    /// Display name.
    #[serde(default)]
    pub name: String,
    /// Section ids in canonical order.
    #[serde(default)]
    pub sections: Vec<String>,
    /// Number of fragments in each section.
    #[serde(default)]
    pub fragment_counts: BTreeMap<String, u32>,
    /// Whether stemmed shards exist for this collection.
    #[serde(default = "default_stemming")]
    pub stemming: bool,
}

/// Collections are stemmed unless their info file says otherwise.
fn default_stemming() -> bool {
    true
}

impl Default for CollectionInfo {
    fn default() -> Self {
        Self {
            id: String::new(),
            name: String::new(),
            sections: Vec::new(),
            fragment_counts: BTreeMap::new(),
            stemming: default_stemming(),
        }
    }
}

impl CollectionInfo {
    /// Returns the canonical order of this collection's sections.
    pub fn section_order(&self) -> SectionOrder {
        SectionOrder::new(&self.sections)
    }

    /// Returns the number of fragments in `section_id`, if known.
    pub fn fragment_count(&self, section_id: &str) -> Option<u32> {
        self.fragment_counts.get(section_id).copied()
    }
}

/// Position of each section in a collection's canonical order.
#[derive(Debug, Clone, Default)]
pub struct SectionOrder {
    /// Section id to position.
    positions: HashMap<String, usize>,
}

impl SectionOrder {
    /// Builds the order from a list of section ids. Later duplicates are ignored.
    pub fn new(sections: &[String]) -> Self {
        let mut positions = HashMap::with_capacity(sections.len());
        for (index, section) in sections.iter().enumerate() {
            positions.entry(section.clone()).or_insert(index);
        }
        Self { positions }
    }

    /// Returns the position of `section_id`, if it is known.
    pub fn position(&self, section_id: &str) -> Option<usize> {
        self.positions.get(section_id).copied()
    }

    /// Sort key placing fragments in document order. Unknown sections and unparseable
    /// fragment numbers sort last.
    pub fn sort_key(&self, id: &FragmentId) -> (usize, u32) {
        (
            self.position(id.section_id()).unwrap_or(usize::MAX),
            id.number().unwrap_or(u32::MAX),
        )
    }
}

/// The set of book codes a search is restricted to. Empty means no restriction.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DivisionFilter {
    /// Uppercased book codes in the order given.
    codes: Vec<String>,
}

impl DivisionFilter {
    /// Builds a filter from book codes. Codes are uppercased and deduplicated.
    pub fn new<I, S>(codes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut filter = Self::default();
        for code in codes {
            let code = code.as_ref().trim().to_uppercase();
            if !code.is_empty() && !filter.codes.contains(&code) {
                filter.codes.push(code);
            }
        }
        filter
    }

    /// A filter that allows everything.
    pub fn all() -> Self {
        Self::default()
    }

    /// Returns true if the filter allows everything.
    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }

    /// Returns the book codes.
    pub fn codes(&self) -> &[String] {
        &self.codes
    }

    /// Returns true if `section_id`'s book is allowed.
    pub fn allows(&self, section_id: &str) -> bool {
        self.is_empty() || self.codes.contains(&book_code(section_id))
    }
}
