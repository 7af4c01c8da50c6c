//! Highlighting match patterns in fragment markup.
//!
//! Fragment markup is treated as text with known tag-delimited spans. Plain patterns only
//! count when they match visible text, never inside a tag or a character entity; lemma
//! patterns are the opposite and only count inside a tag, because the lemma code lives in an
//! attribute.

use std::ops::Range;

use lectern_query::{JoinMode, MatchPattern, PatternKind};

/// Class applied to highlight spans unless configured otherwise.
pub const DEFAULT_HIGHLIGHT_CLASS: &str = "highlight";

/// The result of applying a set of patterns to one piece of markup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HighlightOutcome {
    /// The markup with highlights inserted.
    pub html: String,
    /// Whether each pattern matched, in pattern order.
    pub matched: Vec<bool>,
}

impl HighlightOutcome {
    /// Returns true if the per-pattern results satisfy `join`.
    pub fn is_verified(&self, join: JoinMode) -> bool {
        verify(&self.matched, join)
    }
}

/// Checks per-pattern match results against a join mode.
///
/// OR needs at least one match, AND needs every pattern to match. An empty pattern set never
/// verifies.
pub fn verify(matched: &[bool], join: JoinMode) -> bool {
    if matched.is_empty() {
        return false;
    }
    match join {
        JoinMode::And => matched.iter().all(|&m| m),
        JoinMode::Or => matched.iter().any(|&m| m),
    }
}

/// Inserts highlight markup for pattern matches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkupHighlighter {
    /// The class written on highlight spans and lemma markers.
    class: String,
}

impl Default for MarkupHighlighter {
    fn default() -> Self {
        Self::new(DEFAULT_HIGHLIGHT_CLASS)
    }
}

impl MarkupHighlighter {
    /// Creates a highlighter that marks matches with `class`.
    pub fn new(class: impl Into<String>) -> Self {
        Self {
            class: class.into(),
        }
    }

    /// Returns the highlight class.
    pub fn class(&self) -> &str {
        &self.class
    }

    /// Applies every pattern to `markup` in order.
    ///
    /// Each pattern sees the output of the previous one, so earlier highlights are tags by the
    /// time later patterns run and are never matched themselves.
    pub fn apply(&self, markup: &str, patterns: &[MatchPattern]) -> HighlightOutcome {
        let mut html = markup.to_string();
        let mut matched = Vec::with_capacity(patterns.len());

        for pattern in patterns {
            let (next, hit) = match pattern.kind() {
                PatternKind::Lemma => self.mark_attributes(&html, pattern),
                PatternKind::Word | PatternKind::Phrase | PatternKind::Substring => {
                    self.wrap_text(&html, pattern)
                }
            };
            html = next;
            matched.push(hit);
        }

        HighlightOutcome { html, matched }
    }

    /// Wraps visible-text matches in highlight spans.
    fn wrap_text(&self, html: &str, pattern: &MatchPattern) -> (String, bool) {
        let tags = tag_spans(html);
        let protected = protected_spans(html, &tags);
        let mut out = String::with_capacity(html.len());
        let mut last = 0;
        let mut hit = false;

        for m in pattern.regex().find_iter(html) {
            if m.is_empty()
                || span_containing(&protected, m.start()).is_some()
                || span_containing(&protected, m.end() - 1).is_some()
            {
                continue;
            }
            hit = true;
            out.push_str(&html[last..m.start()]);
            self.wrap_range(html, m.range(), &tags, &mut out);
            last = m.end();
        }

        out.push_str(&html[last..]);
        (out, hit)
    }

    /// Writes `html[range]` with each text run wrapped in its own highlight span.
    ///
    /// A phrase match may cross inline tags; the tags are copied through unwrapped so the
    /// output stays well nested.
    fn wrap_range(
        &self,
        html: &str,
        range: Range<usize>,
        tags: &[Range<usize>],
        out: &mut String,
    ) {
        let mut pos = range.start;
        let inner = tags
            .iter()
            .filter(|tag| tag.start >= range.start && tag.end <= range.end);

        for tag in inner {
            self.wrap_segment(&html[pos..tag.start], out);
            out.push_str(&html[tag.clone()]);
            pos = tag.end;
        }
        self.wrap_segment(&html[pos..range.end], out);
    }

    /// Wraps one run of text. Edge whitespace stays outside the span.
    fn wrap_segment(&self, text: &str, out: &mut String) {
        let core = text.trim();
        if core.is_empty() {
            out.push_str(text);
            return;
        }
        let lead = text.len() - text.trim_start().len();
        out.push_str(&text[..lead]);
        out.push_str(&format!(r#"<span class="{}">{core}</span>"#, self.class));
        out.push_str(&text[lead + core.len()..]);
    }

    /// Marks tags whose lemma attribute matches with the highlight class.
    fn mark_attributes(&self, html: &str, pattern: &MatchPattern) -> (String, bool) {
        let tags = tag_spans(html);
        // (tag index, offset of the matched attribute), one entry per tag.
        let mut marked: Vec<(usize, usize)> = Vec::new();

        for m in pattern.regex().find_iter(html) {
            let Some(index) = span_containing(&tags, m.start()) else {
                continue;
            };
            if m.end() > tags[index].end {
                continue;
            }
            if marked.last().is_none_or(|&(last, _)| last != index) {
                marked.push((index, m.start() - tags[index].start));
            }
        }

        let hit = !marked.is_empty();
        let mut out = String::with_capacity(html.len());
        let mut last = 0;
        for (index, attribute) in marked {
            let tag = &tags[index];
            out.push_str(&html[last..tag.start]);
            self.mark_tag(&html[tag.clone()], attribute, &mut out);
            last = tag.end;
        }
        out.push_str(&html[last..]);
        (out, hit)
    }

    /// Writes `tag` with the highlight class added.
    ///
    /// An existing class attribute gains the class; otherwise a new attribute goes in front of
    /// the one at `attribute`. Tags that already carry the class are copied unchanged.
    fn mark_tag(&self, tag: &str, attribute: usize, out: &mut String) {
        let Some(value) = class_value(tag) else {
            out.push_str(&tag[..attribute]);
            out.push_str(&format!(r#"class="{}" "#, self.class));
            out.push_str(&tag[attribute..]);
            return;
        };

        let existing = &tag[value.range.clone()];
        if existing.split_ascii_whitespace().any(|c| c == self.class) {
            out.push_str(tag);
            return;
        }

        let joined = if existing.trim().is_empty() {
            self.class.clone()
        } else {
            format!("{} {}", existing.trim_end(), self.class)
        };
        out.push_str(&tag[..value.range.start]);
        if value.quoted {
            out.push_str(&joined);
        } else {
            out.push_str(&format!(r#""{joined}""#));
        }
        out.push_str(&tag[value.range.end..]);
    }
}

/// The location of a class attribute's value inside a tag.
struct ClassValue {
    /// Byte range of the value, excluding quotes.
    range: Range<usize>,
    /// Whether the value is quoted.
    quoted: bool,
}

/// Finds the class attribute of `tag`, which runs from `<` to `>` inclusive.
fn class_value(tag: &str) -> Option<ClassValue> {
    let bytes = tag.as_bytes();
    let is_space = |pos: usize| bytes.get(pos).is_some_and(u8::is_ascii_whitespace);
    let ends_name = |pos: usize| {
        bytes
            .get(pos)
            .is_none_or(|&b| b.is_ascii_whitespace() || matches!(b, b'=' | b'>' | b'/'))
    };

    let mut pos = 1;
    while !ends_name(pos) {
        pos += 1;
    }

    loop {
        while is_space(pos) || bytes.get(pos) == Some(&b'/') {
            pos += 1;
        }
        if bytes.get(pos).is_none_or(|&b| b == b'>') {
            return None;
        }

        let name_start = pos;
        while !ends_name(pos) {
            pos += 1;
        }
        let name = &tag[name_start..pos];
        while is_space(pos) {
            pos += 1;
        }
        if bytes.get(pos) != Some(&b'=') {
            continue;
        }
        pos += 1;
        while is_space(pos) {
            pos += 1;
        }

        let value = match bytes.get(pos) {
            Some(&quote @ (b'"' | b'\'')) => {
                let start = pos + 1;
                let end = start + tag[start..].find(char::from(quote))?;
                pos = end + 1;
                ClassValue {
                    range: start..end,
                    quoted: true,
                }
            }
            _ => {
                let start = pos;
                while bytes
                    .get(pos)
                    .is_some_and(|&b| !b.is_ascii_whitespace() && b != b'>')
                {
                    pos += 1;
                }
                ClassValue {
                    range: start..pos,
                    quoted: false,
                }
            }
        };
        if name.eq_ignore_ascii_case("class") {
            return Some(value);
        }
    }
}

/// A pattern set together with the join mode that decides whether a fragment verifies.
#[derive(Debug, Clone)]
pub struct MatchPlan {
    /// Patterns in query order.
    patterns: Vec<MatchPattern>,
    /// How per-pattern results combine.
    join: JoinMode,
    /// Highlight insertion.
    highlighter: MarkupHighlighter,
}

impl MatchPlan {
    /// Creates a plan using the default highlight class.
    pub fn new(patterns: Vec<MatchPattern>, join: JoinMode) -> Self {
        Self {
            patterns,
            join,
            highlighter: MarkupHighlighter::default(),
        }
    }

    /// Replaces the highlight class.
    #[must_use]
    pub fn with_class(mut self, class: impl Into<String>) -> Self {
        self.highlighter = MarkupHighlighter::new(class);
        self
    }

    /// Returns the patterns.
    pub fn patterns(&self) -> &[MatchPattern] {
        &self.patterns
    }

    /// Returns the join mode.
    pub fn join(&self) -> JoinMode {
        self.join
    }

    /// Returns the pattern sources, for reporting.
    pub fn pattern_sources(&self) -> Vec<String> {
        self.patterns
            .iter()
            .map(|p| p.as_str().to_string())
            .collect()
    }

    /// Highlights `markup`, returning it only if the fragment verifies.
    pub fn highlight(&self, markup: &str) -> Option<String> {
        let outcome = self.highlighter.apply(markup, &self.patterns);
        outcome.is_verified(self.join).then_some(outcome.html)
    }
}

/// Returns the byte ranges of every tag in `html`, in order.
///
/// A tag runs from a `<` that starts a tag-like construct to the next `>`.
fn tag_spans(html: &str) -> Vec<Range<usize>> {
    let bytes = html.as_bytes();
    let mut spans = Vec::new();
    let mut pos = 0;

    while let Some(offset) = html[pos..].find('<') {
        let start = pos + offset;
        let opens_tag = bytes
            .get(start + 1)
            .is_some_and(|&b| b.is_ascii_alphabetic() || matches!(b, b'/' | b'!' | b'?'));
        if !opens_tag {
            pos = start + 1;
            continue;
        }
        match html[start..].find('>') {
            Some(len) => {
                spans.push(start..start + len + 1);
                pos = start + len + 1;
            }
            None => break,
        }
    }

    spans
}

/// Returns the spans plain patterns may not start or end in: every tag, plus every character
/// entity outside a tag, sorted by position.
fn protected_spans(html: &str, tags: &[Range<usize>]) -> Vec<Range<usize>> {
    let mut spans = tags.to_vec();
    spans.extend(
        entity_spans(html).filter(|entity| span_containing(tags, entity.start).is_none()),
    );
    spans.sort_by_key(|span| span.start);
    spans
}

/// Returns the byte ranges of character entities such as `&amp;` and `&#39;`.
fn entity_spans(html: &str) -> impl Iterator<Item = Range<usize>> + '_ {
    html.match_indices('&').filter_map(move |(start, _)| {
        let name_len = html[start + 1..]
            .bytes()
            .take_while(|&b| b.is_ascii_alphanumeric() || b == b'#')
            .count();
        let terminated = html.as_bytes().get(start + 1 + name_len) == Some(&b';');
        (name_len > 0 && terminated).then(|| start..start + name_len + 2)
    })
}

/// Returns the index of the span containing byte `pos`, if any. `spans` must be sorted and
/// non-overlapping.
fn span_containing(spans: &[Range<usize>], pos: usize) -> Option<usize> {
    let index = spans.partition_point(|span| span.end <= pos);
    spans
        .get(index)
        .is_some_and(|span| span.start <= pos)
        .then_some(index)
}

#[cfg(test)]
mod tests {
    use lectern_query::Query;

    use super::*;

    fn plan(query: &str) -> MatchPlan {
        let query = Query::parse(query).unwrap();
        MatchPlan::new(query.patterns().unwrap(), query.join_mode())
    }

    #[test]
    fn verify_join_modes() {
        assert!(verify(&[true, true], JoinMode::And));
        assert!(!verify(&[true, false], JoinMode::And));
        assert!(verify(&[false, true], JoinMode::Or));
        assert!(!verify(&[false, false], JoinMode::Or));
        assert!(!verify(&[], JoinMode::Or));
        assert!(!verify(&[], JoinMode::And));
    }

    #[test]
    fn wraps_each_word() {
        let html = plan("the word")
            .highlight("In the beginning was the Word")
            .unwrap();
        assert_eq!(
            html,
            concat!(
                r#"In <span class="highlight">the</span> beginning was "#,
                r#"<span class="highlight">the</span> <span class="highlight">Word</span>"#
            )
        );
    }

    #[test]
    fn and_requires_every_pattern() {
        assert_eq!(plan("the light").highlight("In the beginning"), None);
        assert!(plan("the OR light").highlight("In the beginning").is_some());
    }

    #[test]
    fn never_matches_inside_tags() {
        let markup = r#"<span class="vn">1</span>In the beginning"#;
        assert_eq!(plan("class").highlight(markup), None);

        let html = plan("beginning").highlight(markup).unwrap();
        assert!(html.starts_with(r#"<span class="vn">1</span>In the "#));
        assert!(html.ends_with(r#"<span class="highlight">beginning</span>"#));
    }

    #[test]
    fn word_boundaries_are_respected() {
        assert_eq!(plan("he").highlight("the"), None);
    }

    #[test]
    fn phrase_across_inline_tags() {
        let html = plan(r#""in the beginning""#)
            .highlight("<i>In</i> the<br>beginning")
            .unwrap();
        assert_eq!(
            html,
            concat!(
                r#"<i><span class="highlight">In</span></i> "#,
                r#"<span class="highlight">the</span><br>"#,
                r#"<span class="highlight">beginning</span>"#
            )
        );
    }

    #[test]
    fn later_patterns_skip_earlier_highlights() {
        let html = plan("highlight word").highlight("a highlight word").unwrap();
        assert_eq!(html.matches(r#"<span class="highlight">"#).count(), 2);
    }

    #[test]
    fn substring_matches_without_word_spacing() {
        let html = plan("神").highlight("起初神创造天地").unwrap();
        assert_eq!(html, r#"起初<span class="highlight">神</span>创造天地"#);
    }

    #[test]
    fn lemma_marks_attribute() {
        let html = plan("G3056")
            .highlight(r#"the <w s="G3056">Word</w> was"#)
            .unwrap();
        assert_eq!(html, r#"the <w class="highlight" s="G3056">Word</w> was"#);
    }

    #[test]
    fn lemma_ignores_visible_text() {
        assert_eq!(plan("G3056").highlight(r#"s="G3056" in text"#), None);
    }

    #[test]
    fn custom_class() {
        let html = plan("word")
            .with_class("hit")
            .highlight("the word")
            .unwrap();
        assert_eq!(html, r#"the <span class="hit">word</span>"#);
    }

    #[test]
    fn outcome_records_each_pattern() {
        let query = Query::parse("the OR light").unwrap();
        let outcome = MarkupHighlighter::default().apply("the end", &query.patterns().unwrap());
        assert_eq!(outcome.matched, vec![true, false]);
        assert!(outcome.is_verified(JoinMode::Or));
        assert!(!outcome.is_verified(JoinMode::And));
    }

    #[test]
    fn tag_spans_skip_bare_less_than() {
        assert_eq!(tag_spans("1 < 2 <b>x</b>"), vec![6..9, 10..14]);
        assert_eq!(span_containing(&tag_spans("a<b>c"), 2), Some(0));
        assert_eq!(span_containing(&tag_spans("a<b>c"), 4), None);
    }

    #[test]
    fn never_matches_inside_entities() {
        assert_eq!(plan("amp").highlight("Tom &amp; Jerry"), None);
        assert_eq!(plan("nbsp").highlight("In&nbsp;the beginning"), None);
        assert_eq!(plan("39").highlight("it&#39;s"), None);

        let html = plan("the").highlight("In&nbsp;the beginning").unwrap();
        assert_eq!(html, r#"In&nbsp;<span class="highlight">the</span> beginning"#);
    }

    #[test]
    fn entity_spans_need_a_terminator() {
        let html = "a &amp; b & c &#39; &bad";
        let spans: Vec<Range<usize>> = entity_spans(html).collect();
        assert_eq!(spans, vec![2..7, 14..19]);
        assert_eq!(&html[spans[1].clone()], "&#39;");
    }

    #[test]
    fn entities_inside_tags_are_left_to_the_tag() {
        let html = r#"<a title="&amp;">x</a> &lt;"#;
        let tags = tag_spans(html);
        assert_eq!(protected_spans(html, &tags), vec![0..17, 18..22, 23..27]);
    }

    #[test]
    fn lemma_extends_existing_class() {
        let html = plan("G3056")
            .highlight(r#"the <w class="wj" s="G3056">Word</w>"#)
            .unwrap();
        assert_eq!(html, r#"the <w class="wj highlight" s="G3056">Word</w>"#);

        let html = plan("G3056")
            .highlight(r#"<w s="G3056" class=wj>Word</w>"#)
            .unwrap();
        assert_eq!(html, r#"<w s="G3056" class="wj highlight">Word</w>"#);
    }

    #[test]
    fn lemma_marks_shared_tag_once() {
        let html = plan("G3588 OR G3056")
            .highlight(r#"<w s="G3588 G3056">Word</w>"#)
            .unwrap();
        assert_eq!(html, r#"<w class="highlight" s="G3588 G3056">Word</w>"#);

        let html = plan("G3588 G3056")
            .highlight(r#"<w s="G3588 G3056">Word</w>"#)
            .unwrap();
        assert_eq!(html.matches("highlight").count(), 1);
    }

    #[test]
    fn class_value_skips_other_attributes() {
        let tag = r#"<w data-class="x" s="G1" CLASS='a b'>"#;
        let value = class_value(tag).unwrap();
        assert_eq!(&tag[value.range], "a b");
        assert!(value.quoted);
        assert!(class_value(r#"<w s="G1">"#).is_none());
        assert!(class_value("<br/>").is_none());
    }
}
