//! Terminal styling: TOML highlighting, ANSI helpers and rendering of highlighted fragments.

use syntect::{
    easy::HighlightLines,
    highlighting::Style,
    parsing::SyntaxSet,
    util::{LinesWithEndings, as_24_bit_terminal_escaped},
};
use two_face::{
    syntax::extra_newlines as extra_syntaxes,
    theme::{EmbeddedLazyThemeSet, EmbeddedThemeName, extra as extra_themes},
};

/// Highlights configuration files for terminal output.
pub struct Highlighter {
    /// Language definitions, including TOML from the two-face extras.
    syntax_set: SyntaxSet,
    /// Embedded color themes.
    theme_set: EmbeddedLazyThemeSet,
    /// Active theme.
    theme: EmbeddedThemeName,
}

impl Default for Highlighter {
    fn default() -> Self {
        Self::new()
    }
}

impl Highlighter {
    /// Creates a highlighter using the Dracula theme.
    pub fn new() -> Self {
        Self {
            syntax_set: extra_syntaxes(),
            theme_set: extra_themes(),
            theme: EmbeddedThemeName::Dracula,
        }
    }

    /// Highlights TOML. Lines that fail to highlight are emitted unstyled.
    pub fn highlight_toml(&self, content: &str) -> String {
        let syntax = self
            .syntax_set
            .find_syntax_by_extension("toml")
            .unwrap_or_else(|| self.syntax_set.find_syntax_plain_text());
        let mut lines = HighlightLines::new(syntax, self.theme_set.get(self.theme));

        let mut output = String::new();
        for line in LinesWithEndings::from(content) {
            let ranges: Vec<(Style, &str)> = lines
                .highlight_line(line, &self.syntax_set)
                .unwrap_or_else(|_| vec![(Style::default(), line)]);
            output.push_str(&as_24_bit_terminal_escaped(&ranges, false));
        }
        output.push_str(colors::RESET);
        output
    }
}

/// ANSI escape sequences.
pub mod colors {
    /// Bold.
    pub const BOLD: &str = "\x1b[1m";
    /// Cyan, for headers.
    pub const CYAN: &str = "\x1b[36m";
    /// Yellow, for warnings and search hits.
    pub const YELLOW: &str = "\x1b[33m";
    /// Dim.
    pub const DIM: &str = "\x1b[2m";
    /// Reset all attributes.
    pub const RESET: &str = "\x1b[0m";
}

/// Bold cyan.
pub fn header(text: &str) -> String {
    format!("{}{}{text}{}", colors::BOLD, colors::CYAN, colors::RESET)
}

/// Bold.
pub fn subheader(text: &str) -> String {
    format!("{}{text}{}", colors::BOLD, colors::RESET)
}

/// Dimmed.
pub fn dim(text: &str) -> String {
    format!("{}{text}{}", colors::DIM, colors::RESET)
}

/// Yellow.
pub fn warning(text: &str) -> String {
    format!("{}{text}{}", colors::YELLOW, colors::RESET)
}

/// Renders highlighted fragment markup as terminal text.
///
/// Spans carrying `class` become bold yellow; every other tag is dropped and the common
/// character entities are decoded. With `color` off, highlighted text is left plain.
pub fn render_markup(html: &str, class: &str, color: bool) -> String {
    let open = format!(r#"<span class="{class}">"#);
    let mut out = String::with_capacity(html.len());
    // One entry per open span: whether it is a highlight span.
    let mut spans: Vec<bool> = Vec::new();
    let mut rest = html;

    while let Some(start) = rest.find('<') {
        push_text(&rest[..start], &mut out);
        rest = &rest[start..];
        let Some(end) = rest.find('>') else {
            break;
        };
        let tag = &rest[..=end];
        rest = &rest[end + 1..];

        if tag == open {
            spans.push(true);
            if color {
                out.push_str(colors::BOLD);
                out.push_str(colors::YELLOW);
            }
        } else if tag.starts_with("<span") {
            spans.push(false);
        } else if tag == "</span>" && spans.pop() == Some(true) && color {
            out.push_str(colors::RESET);
            if spans.contains(&true) {
                out.push_str(colors::BOLD);
                out.push_str(colors::YELLOW);
            }
        }
    }
    push_text(rest, &mut out);
    out
}

/// Appends `text` with common entities decoded.
fn push_text(text: &str, out: &mut String) {
    const ENTITIES: &[(&str, &str)] = &[
        ("&lt;", "<"),
        ("&gt;", ">"),
        ("&quot;", "\""),
        ("&#39;", "'"),
        ("&nbsp;", " "),
        ("&amp;", "&"),
    ];

    let mut rest = text;
    while let Some(at) = rest.find('&') {
        out.push_str(&rest[..at]);
        rest = &rest[at..];
        match ENTITIES.iter().find(|(entity, _)| rest.starts_with(entity)) {
            Some((entity, decoded)) => {
                out.push_str(decoded);
                rest = &rest[entity.len()..];
            }
            None => {
                out.push('&');
                rest = &rest[1..];
            }
        }
    }
    out.push_str(rest);
}
