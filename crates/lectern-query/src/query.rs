//! Query classification.
//!
//! A [`Query`] is decided once, up front, as either a plain text query or a lemma query.
//! The join mode and the lookup terms are derived at the same time so later stages never
//! re-inspect the raw string.

use std::{collections::HashSet, fmt};

use serde::Serialize;

use crate::{MatchPattern, QueryError, pattern::build_patterns, tokenizer::split_words};

/// The keyword that switches a query into OR mode.
const OR_KEYWORD: &str = "OR";

/// The keyword that separates AND terms explicitly.
const AND_KEYWORD: &str = "AND";

/// How per-term results are combined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum JoinMode {
    /// A fragment must match every term.
    #[default]
    And,
    /// A fragment must match at least one term.
    Or,
}

impl fmt::Display for JoinMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::And => write!(f, "AND"),
            Self::Or => write!(f, "OR"),
        }
    }
}

/// A parsed search query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Query {
    /// A surface-text query.
    Plain {
        /// The raw query text, trimmed.
        text: String,
        /// Lowercased lookup words in tokenizer order.
        terms: Vec<String>,
        /// How the terms combine.
        join: JoinMode,
    },
    /// A query made of Strong's-style morphological codes.
    Lemma {
        /// The raw query text, trimmed.
        text: String,
        /// Lemma codes with an uppercase prefix, in query order.
        codes: Vec<String>,
        /// How the codes combine.
        join: JoinMode,
    },
}

impl Query {
    /// Parses a raw query string.
    ///
    /// The query is a lemma query when every word (other than `AND`/`OR`) is a lemma code
    /// such as `G1234` or `H5678`. The join mode is OR when a standalone `OR` token appears,
    /// AND otherwise.
    pub fn parse(input: &str) -> Result<Self, QueryError> {
        let text = input.trim().to_string();
        let words = split_words(&text);
        let join = if words.iter().any(|w| w == OR_KEYWORD) {
            JoinMode::Or
        } else {
            JoinMode::And
        };

        let significant: Vec<&String> = words.iter().filter(|w| !is_keyword(w)).collect();
        if significant.is_empty() {
            return Err(QueryError::Empty);
        }

        if significant.iter().all(|w| is_lemma_code(w)) {
            let codes = dedup(significant.iter().map(|w| normalize_lemma_code(w)));
            return Ok(Self::Lemma { text, codes, join });
        }

        let terms = dedup(significant.iter().map(|w| w.to_lowercase()));
        Ok(Self::Plain { text, terms, join })
    }

    /// Returns the trimmed query text.
    pub fn text(&self) -> &str {
        match self {
            Self::Plain { text, .. } | Self::Lemma { text, .. } => text,
        }
    }

    /// Returns the lookup terms: lowercased words, or lemma codes with an uppercase prefix.
    pub fn terms(&self) -> &[String] {
        match self {
            Self::Plain { terms, .. } => terms,
            Self::Lemma { codes, .. } => codes,
        }
    }

    /// Returns how per-term results combine.
    pub fn join_mode(&self) -> JoinMode {
        match self {
            Self::Plain { join, .. } | Self::Lemma { join, .. } => *join,
        }
    }

    /// Returns true for lemma queries.
    pub fn is_lemma(&self) -> bool {
        matches!(self, Self::Lemma { .. })
    }

    /// Builds the match patterns used to verify and highlight fragments.
    pub fn patterns(&self) -> Result<Vec<MatchPattern>, QueryError> {
        build_patterns(self.text(), self.is_lemma())
    }
}

/// Returns true for the `AND` and `OR` join keywords.
fn is_keyword(word: &str) -> bool {
    word == OR_KEYWORD || word == AND_KEYWORD
}

/// Returns true if `word` looks like a Strong's-style code: `G` or `H`, digits, and an
/// optional single trailing letter (`G3056`, `h430`, `G1722a`).
pub fn is_lemma_code(word: &str) -> bool {
    let mut chars = word.chars();
    let Some(prefix) = chars.next() else {
        return false;
    };
    if !matches!(prefix, 'G' | 'g' | 'H' | 'h') {
        return false;
    }
    let rest = chars.as_str();
    let digits = rest.trim_end_matches(|c: char| c.is_ascii_alphabetic());
    let suffix_len = rest.len() - digits.len();
    !digits.is_empty() && digits.chars().all(|c| c.is_ascii_digit()) && suffix_len <= 1
}

/// Uppercases the `G`/`H` prefix of a lemma code, leaving the digits and any trailing letter
/// as written.
pub(crate) fn normalize_lemma_code(code: &str) -> String {
    let mut chars = code.chars();
    chars.next().map_or_else(String::new, |prefix| {
        let mut normalized = prefix.to_ascii_uppercase().to_string();
        normalized.push_str(chars.as_str());
        normalized
    })
}

/// Removes duplicates, keeping first occurrences in order.
fn dedup(items: impl Iterator<Item = String>) -> Vec<String> {
    let mut seen = HashSet::new();
    items.filter(|item| seen.insert(item.clone())).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_and_query() {
        let query = Query::parse("The Word").unwrap();
        assert!(!query.is_lemma());
        assert_eq!(query.join_mode(), JoinMode::And);
        assert_eq!(query.terms(), ["the", "word"]);
        assert_eq!(query.text(), "The Word");
    }

    #[test]
    fn or_keyword_switches_mode() {
        let query = Query::parse("the OR word").unwrap();
        assert_eq!(query.join_mode(), JoinMode::Or);
        assert_eq!(query.terms(), ["the", "word"]);
    }

    #[test]
    fn lowercase_or_is_a_word() {
        let query = Query::parse("this or that").unwrap();
        assert_eq!(query.join_mode(), JoinMode::And);
        assert_eq!(query.terms(), ["this", "or", "that"]);
    }

    #[test]
    fn and_keyword_is_dropped() {
        let query = Query::parse("faith AND works").unwrap();
        assert_eq!(query.join_mode(), JoinMode::And);
        assert_eq!(query.terms(), ["faith", "works"]);
    }

    #[test]
    fn terms_are_deduplicated_case_insensitively() {
        let query = Query::parse("Love love LOVE").unwrap();
        assert_eq!(query.terms(), ["love"]);
    }

    #[test]
    fn lemma_query() {
        let query = Query::parse("g3056 H430").unwrap();
        assert!(query.is_lemma());
        assert_eq!(query.terms(), ["G3056", "H430"]);
    }

    #[test]
    fn mixed_lemma_and_words_is_plain() {
        let query = Query::parse("G3056 word").unwrap();
        assert!(!query.is_lemma());
    }

    #[test]
    fn lemma_or_query() {
        let query = Query::parse("G25 OR G5368").unwrap();
        assert!(query.is_lemma());
        assert_eq!(query.join_mode(), JoinMode::Or);
    }

    #[test]
    fn empty_query_is_rejected() {
        assert!(matches!(Query::parse("   "), Err(QueryError::Empty)));
        assert!(matches!(Query::parse("OR AND"), Err(QueryError::Empty)));
        assert!(matches!(Query::parse("..."), Err(QueryError::Empty)));
    }

    #[test]
    fn quoted_phrase_terms() {
        let query = Query::parse("\"in the beginning\"").unwrap();
        assert_eq!(query.terms(), ["in", "the", "beginning"]);
        assert_eq!(query.join_mode(), JoinMode::And);
    }

    #[test]
    fn lemma_code_shapes() {
        assert!(is_lemma_code("G3056"));
        assert!(is_lemma_code("h430"));
        assert!(is_lemma_code("G1722a"));
        assert!(!is_lemma_code("G"));
        assert!(!is_lemma_code("Gospel"));
        assert!(!is_lemma_code("G12ab"));
        assert!(!is_lemma_code("X123"));
        assert!(!is_lemma_code(""));
    }

    #[test]
    fn lemma_suffix_keeps_its_case() {
        let query = Query::parse("g1722a H430").unwrap();
        assert_eq!(query.terms(), ["G1722a", "H430"]);
        assert_eq!(normalize_lemma_code("h7225B"), "H7225B");
    }

    #[test]
    fn join_mode_display() {
        assert_eq!(JoinMode::And.to_string(), "AND");
        assert_eq!(JoinMode::Or.to_string(), "OR");
    }
}
