//! Query handling for lectern text search.
//!
//! This crate turns a raw user query into the two things the search pipeline needs:
//!
//! - **Lookup terms**: the words (or Strong's-style lemma codes) used to select index shards
//! - **Match patterns**: case-insensitive matchers used to verify and highlight fragments
//!
//! Queries come in two flavours, decided once when the query is parsed:
//!
//! - **Plain**: `the word`, `"in the beginning"`, `love OR charity`, `神爱`
//! - **Lemma**: `G3056`, `H430 G2316`
//!
//! # Example
//!
//! ```
//! use lectern_query::{JoinMode, Query};
//!
//! let query = Query::parse("light OR darkness").unwrap();
//! assert_eq!(query.join_mode(), JoinMode::Or);
//! assert_eq!(query.terms(), ["light", "darkness"]);
//! ```

#![warn(missing_docs)]

mod error;
mod pattern;
mod query;
mod tokenizer;

pub use error::QueryError;
pub use pattern::{MatchPattern, PHRASE_GAP, PatternKind, build_patterns};
pub use query::{JoinMode, Query, is_lemma_code};
pub use tokenizer::{is_cjk_ideograph, is_printable_ascii, is_punctuation, split_words};
