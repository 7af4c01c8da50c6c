//! Word tokenizer.
//!
//! Splits query text into lookup words. Scripts without reliable word boundaries (CJK) are
//! handled by closing the current word after every ideograph, so each ideograph becomes its
//! own token.

use std::{collections::HashSet, mem};

/// Characters that separate words.
///
/// Apostrophes and hyphens are listed here too; they only continue a word when both
/// neighbours are word characters (see [`is_joiner`]).
const PUNCTUATION: &[char] = &[
    '.', ',', ';', ':', '!', '?', '"', '\'', '(', ')', '[', ']', '{', '}', '<', '>', '/', '\\',
    '|', '*', '+', '=', '#', '@', '$', '%', '^', '&', '~', '`', '-', '_', '«', '»', '‹', '›',
    '“', '”', '„', '‘', '’', '‚', '—', '–', '…', '¡', '¿', '·', '、', '。', '，', '；', '：',
    '！', '？', '「', '」', '『', '』', '（', '）', '《', '》', '〈', '〉', '【', '】', '〔',
    '〕', '・', '؟', '،', '؛', '׃', '־', '।', '॥',
];

/// Inclusive code point ranges of the CJK Unified Ideographs blocks.
const CJK_RANGES: &[(u32, u32)] = &[
    (0x3400, 0x4DBF),
    (0x4E00, 0x9FFF),
    (0xF900, 0xFAFF),
    (0x20000, 0x2A6DF),
    (0x2A700, 0x2B73F),
    (0x2B740, 0x2B81F),
    (0x2B820, 0x2CEAF),
    (0x2CEB0, 0x2EBEF),
    (0x2F800, 0x2FA1F),
    (0x30000, 0x3134F),
];

/// Returns true if `ch` is in the fixed punctuation set.
pub fn is_punctuation(ch: char) -> bool {
    PUNCTUATION.contains(&ch)
}

/// Returns true if `ch` is a CJK unified ideograph.
pub fn is_cjk_ideograph(ch: char) -> bool {
    let cp = u32::from(ch);
    CJK_RANGES
        .iter()
        .any(|&(start, end)| (start..=end).contains(&cp))
}

/// Returns true if every character of `text` is printable ASCII (space through `~`).
pub fn is_printable_ascii(text: &str) -> bool {
    text.chars().all(|ch| (' '..='~').contains(&ch))
}

/// Characters that may continue a word when surrounded by word characters.
fn is_joiner(ch: char) -> bool {
    matches!(ch, '\'' | '’' | '-')
}

/// Returns true if `ch` ends the current word.
fn is_separator(ch: char) -> bool {
    ch.is_whitespace() || is_punctuation(ch)
}

/// Splits text into an ordered set of words.
///
/// Rules:
/// - Whitespace and punctuation separate words
/// - An apostrophe or hyphen continues a word only when neither neighbour is punctuation or
///   whitespace (`Lord's`, `well-known`)
/// - A CJK ideograph always closes the current word, so each ideograph is its own token
///
/// Duplicates are dropped; first occurrence order is preserved. Case is preserved.
pub fn split_words(text: &str) -> Vec<String> {
    let chars: Vec<char> = text.chars().collect();
    let mut words = Vec::new();
    let mut seen = HashSet::new();
    let mut current = String::new();

    let mut flush = |current: &mut String| {
        if !current.is_empty() {
            let word = mem::take(current);
            if seen.insert(word.clone()) {
                words.push(word);
            }
        }
    };

    for (i, &ch) in chars.iter().enumerate() {
        if is_joiner(ch) {
            let prev = i.checked_sub(1).and_then(|p| chars.get(p)).copied();
            let next = chars.get(i + 1).copied();
            let joins = !current.is_empty()
                && prev.is_some_and(|p| !is_separator(p))
                && next.is_some_and(|n| !is_separator(n));
            if joins {
                current.push(ch);
            } else {
                flush(&mut current);
            }
            continue;
        }

        if is_separator(ch) {
            flush(&mut current);
            continue;
        }

        current.push(ch);
        if is_cjk_ideograph(ch) {
            flush(&mut current);
        }
    }
    flush(&mut current);

    words
}
