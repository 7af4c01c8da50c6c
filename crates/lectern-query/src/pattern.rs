//! Match pattern construction.
//!
//! Match patterns are the case-insensitive matchers applied to fragment markup, both to
//! re-verify index candidates and to place highlights. They are distinct from lookup terms:
//! a quoted phrase produces one pattern but several lookup terms.

use std::{collections::HashSet, iter};

use regex::Regex;

use crate::{
    QueryError,
    query::{is_lemma_code, normalize_lemma_code},
    tokenizer::{is_printable_ascii, split_words},
};

/// Gap allowed between the words of a quoted phrase: any run of whitespace and inline tags.
pub const PHRASE_GAP: &str = r"(?:\s|<[^>]*>)+";

/// Name of the markup attribute that carries lemma codes (`<w s="G3056">`).
const LEMMA_ATTRIBUTE: &str = "s";

/// The kind of text a pattern matches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatternKind {
    /// A whole word, bounded by word boundaries.
    Word,
    /// A quoted phrase whose words may be separated by whitespace and inline markup.
    Phrase,
    /// A bare substring with no boundary anchors (scripts without word spacing).
    Substring,
    /// A lemma code inside a markup attribute.
    Lemma,
}

/// A compiled, case-insensitive matcher for one query term.
#[derive(Debug, Clone)]
pub struct MatchPattern {
    /// What kind of text the pattern matches.
    kind: PatternKind,
    /// The query term the pattern was built from.
    term: String,
    /// The compiled expression.
    regex: Regex,
}

impl MatchPattern {
    /// Builds a word-boundary pattern for a single word.
    pub fn word(term: &str) -> Result<Self, QueryError> {
        let source = format!(r"(?i)\b{}\b", regex::escape(term));
        Self::compile(PatternKind::Word, term, &source)
    }

    /// Builds a word-boundary pattern matching any of `words`, labelled with `term`.
    ///
    /// Used when a term was looked up through a stem table, so every surface form that rolled
    /// up into the stem verifies and highlights.
    pub fn alternation(term: &str, words: &[String]) -> Result<Self, QueryError> {
        let mut seen = HashSet::new();
        let mut alternatives: Vec<String> = Vec::new();
        for word in iter::once(term).chain(words.iter().map(String::as_str)) {
            let lowered = word.to_lowercase();
            if !lowered.is_empty() && seen.insert(lowered.clone()) {
                alternatives.push(regex::escape(&lowered));
            }
        }
        let source = format!(r"(?i)\b(?:{})\b", alternatives.join("|"));
        Self::compile(PatternKind::Word, term, &source)
    }

    /// Builds a phrase pattern from whitespace-separated words.
    ///
    /// Internal whitespace becomes [`PHRASE_GAP`], so `in the<br>beginning` matches the phrase
    /// `in the beginning`.
    pub fn phrase(phrase: &str) -> Result<Self, QueryError> {
        let words: Vec<String> = phrase.split_whitespace().map(regex::escape).collect();
        let source = format!(r"(?i)\b{}\b", words.join(PHRASE_GAP));
        Self::compile(PatternKind::Phrase, phrase, &source)
    }

    /// Builds an unanchored substring pattern.
    pub fn substring(term: &str) -> Result<Self, QueryError> {
        let source = format!("(?i){}", regex::escape(term));
        Self::compile(PatternKind::Substring, term, &source)
    }

    /// Builds a pattern matching a lemma attribute that contains `code`.
    ///
    /// The attribute value may hold several space-separated codes; the code may carry a short
    /// inflection prefix (`x:`) and a single trailing letter.
    pub fn lemma(code: &str) -> Result<Self, QueryError> {
        let source = format!(
            r#"(?i)\b{LEMMA_ATTRIBUTE}="[^"]*?\b(?:[a-z]{{1,2}}:)?{}[a-z]?\b[^"]*""#,
            regex::escape(code)
        );
        Self::compile(PatternKind::Lemma, code, &source)
    }

    /// Compiles a pattern source.
    fn compile(kind: PatternKind, term: &str, source: &str) -> Result<Self, QueryError> {
        let regex = Regex::new(source).map_err(|source| QueryError::Pattern {
            term: term.to_string(),
            source,
        })?;
        Ok(Self {
            kind,
            term: term.to_string(),
            regex,
        })
    }

    /// Returns the pattern kind.
    pub fn kind(&self) -> PatternKind {
        self.kind
    }

    /// Returns the query term the pattern was built from.
    pub fn term(&self) -> &str {
        &self.term
    }

    /// Returns the compiled expression.
    pub fn regex(&self) -> &Regex {
        &self.regex
    }

    /// Returns the expression source.
    pub fn as_str(&self) -> &str {
        self.regex.as_str()
    }

    /// Returns true if the pattern matches anywhere in `text`.
    pub fn is_match(&self, text: &str) -> bool {
        self.regex.is_match(text)
    }
}

/// Builds the ordered match patterns for a query.
///
/// Rules, in priority order:
/// 1. Lemma queries: one [`PatternKind::Lemma`] pattern per code
/// 2. A query wrapped in one pair of double quotes: one [`PatternKind::Phrase`] pattern
/// 3. Printable ASCII: one [`PatternKind::Word`] pattern per distinct whitespace-separated token
/// 4. Anything else: one [`PatternKind::Substring`] pattern per tokenizer word
///
/// The `AND` and `OR` keywords never produce patterns.
pub fn build_patterns(query: &str, is_lemma: bool) -> Result<Vec<MatchPattern>, QueryError> {
    let query = query.trim();

    if is_lemma {
        return distinct(
            query
                .split_whitespace()
                .filter(|t| is_lemma_code(t))
                .map(normalize_lemma_code),
        )
        .iter()
        .map(|code| MatchPattern::lemma(code))
        .collect();
    }

    if let Some(phrase) = unquote(query) {
        if phrase.split_whitespace().next().is_none() {
            return Err(QueryError::Empty);
        }
        return Ok(vec![MatchPattern::phrase(phrase)?]);
    }

    if is_printable_ascii(query) {
        return distinct(
            query
                .split_whitespace()
                .filter(|t| !is_keyword(t))
                .map(|t| t.trim_matches(|c: char| c.is_ascii_punctuation() && c != '\''))
                .map(|t| t.trim_matches('\''))
                .filter(|t| !t.is_empty())
                .map(str::to_string),
        )
        .iter()
        .map(|token| MatchPattern::word(token))
        .collect();
    }

    distinct(split_words(query).into_iter().filter(|t| !is_keyword(t)))
        .iter()
        .map(|token| MatchPattern::substring(token))
        .collect()
}

/// Strips one surrounding pair of double quotes, if the query is exactly one quoted phrase.
fn unquote(query: &str) -> Option<&str> {
    let inner = query.strip_prefix('"')?.strip_suffix('"')?;
    (!inner.contains('"')).then_some(inner)
}

/// Returns true for the `AND` and `OR` join keywords.
fn is_keyword(token: &str) -> bool {
    token == "AND" || token == "OR"
}

/// Removes case-insensitive duplicates, keeping first occurrences in order.
fn distinct(tokens: impl Iterator<Item = String>) -> Vec<String> {
    let mut seen = HashSet::new();
    tokens.filter(|t| seen.insert(t.to_lowercase())).collect()
}
