//! Fragment and section identifiers.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifies one fragment (for example one verse): `<sectionid>_<number>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FragmentId(String);

impl FragmentId {
    /// Wraps a raw fragment id.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Builds the id of fragment `number` in `section_id`.
    pub fn from_parts(section_id: &str, number: u32) -> Self {
        Self(format!("{section_id}_{number}"))
    }

    /// Returns the raw id.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the section the fragment lives in: everything before the last `_`.
    ///
    /// An id without `_` is its own section.
    pub fn section_id(&self) -> &str {
        self.0
            .rsplit_once('_')
            .map_or(self.0.as_str(), |(section, _)| section)
    }

    /// Returns the numeric suffix, if it parses.
    pub fn number(&self) -> Option<u32> {
        self.0.rsplit_once('_')?.1.parse().ok()
    }
}

impl fmt::Display for FragmentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for FragmentId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// Returns the two-letter book code of a section (`JN1` -> `JN`), uppercased.
pub fn book_code(section_id: &str) -> String {
    section_id.chars().take(2).collect::<String>().to_uppercase()
}
