//! Shard keys, word hashing and the on-disk shard formats.
//!
//! A collection's index is split into small JSON files so a search only fetches the shards its
//! terms hash into:
//!
//! - `index/_<hash>.json`: `{ "<word>": ["<fragmentid>", ...] }`
//! - `index/_stems_<hash>.json`: `{ "<stem>": { "fragmentids": [...], "words": [...] } }`
//! - `indexlemma/_<LETTER><digit>000.json`: `{ "<CODE>": ["<fragmentid>", ...] }`
//! - `index/stems.json`: `{ "<word>": "<stem>" }`

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::FragmentId;

/// Number of word and stem shards per collection.
pub const HASH_SIZE: u32 = 20;

/// Path of the stemming table, relative to the collection.
pub const STEMS_PATH: &str = "index/stems.json";

/// Hashes a word into `[0, HASH_SIZE)` by summing its UTF-16 code units.
pub fn hash_word(word: &str) -> u32 {
    word.encode_utf16()
        .fold(0, |sum, unit| (sum + u32::from(unit)) % HASH_SIZE)
}

/// Identifies one shard file of a collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShardKey {
    /// A raw word shard.
    Word(u32),
    /// A stemmed word shard.
    Stem(u32),
    /// A lemma shard, selected by the code's letter and first digit.
    Lemma {
        /// Uppercased code letter (`G`, `H`).
        letter: char,
        /// First digit of the code number.
        digit: char,
    },
}

impl ShardKey {
    /// The raw shard holding `word`.
    pub fn for_word(word: &str) -> Self {
        Self::Word(hash_word(word))
    }

    /// The stemmed shard holding `stem`.
    pub fn for_stem(stem: &str) -> Self {
        Self::Stem(hash_word(stem))
    }

    /// The lemma shard holding `code`, or `None` if the code has no letter and digit.
    pub fn for_lemma(code: &str) -> Option<Self> {
        let mut chars = code.chars();
        let letter = chars.next().filter(char::is_ascii_alphabetic)?;
        let digit = chars.next().filter(char::is_ascii_digit)?;
        Some(Self::Lemma {
            letter: letter.to_ascii_uppercase(),
            digit,
        })
    }

    /// Returns true if the shard uses the stemmed format.
    pub fn is_stemmed(&self) -> bool {
        matches!(self, Self::Stem(_))
    }

    /// Returns the shard path relative to the collection.
    pub fn path(&self) -> String {
        match self {
            Self::Word(hash) => format!("index/_{hash}.json"),
            Self::Stem(hash) => format!("index/_stems_{hash}.json"),
            Self::Lemma { letter, digit } => format!("indexlemma/_{letter}{digit}000.json"),
        }
    }
}

/// A raw word or lemma shard.
pub type WordShard = HashMap<String, Vec<FragmentId>>;

/// A stemmed shard.
pub type StemShard = HashMap<String, StemEntry>;

/// The stemming table: lowercased word to stem.
pub type StemTable = HashMap<String, String>;

/// One stem's entry in a stemmed shard.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StemEntry {
    /// Fragments containing any word with this stem.
    #[serde(default)]
    pub fragmentids: Vec<FragmentId>,
    /// Surface words that rolled up into this stem.
    #[serde(default)]
    pub words: Vec<String>,
}

/// A parsed shard of either format.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Shard {
    /// Raw word or lemma shard.
    Words(WordShard),
    /// Stemmed shard.
    Stems(StemShard),
}

impl Shard {
    /// Returns the hit list for a word or lemma key.
    pub fn hits(&self, key: &str) -> Option<&[FragmentId]> {
        match self {
            Self::Words(map) => map.get(key).map(Vec::as_slice),
            Self::Stems(_) => None,
        }
    }

    /// Returns the entry for a stem key.
    pub fn stem(&self, key: &str) -> Option<&StemEntry> {
        match self {
            Self::Stems(map) => map.get(key),
            Self::Words(_) => None,
        }
    }
}
