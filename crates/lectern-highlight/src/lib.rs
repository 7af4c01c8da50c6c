//! Highlighting for lectern.
//!
//! Two unrelated kinds of highlighting live here:
//!
//! - **Markup highlighting** ([`MatchPlan`], [`MarkupHighlighter`]): applies query match
//!   patterns to fragment HTML, wraps matched text in highlight spans (or marks matched lemma
//!   attributes), and re-verifies that the fragment still satisfies the query.
//! - **Terminal styling** ([`Highlighter`], [`colors`]): ANSI output for the CLI, including
//!   rendering highlighted fragment HTML as styled terminal text.

#![warn(missing_docs)]

mod markup;
mod terminal;

pub use markup::{
    DEFAULT_HIGHLIGHT_CLASS, HighlightOutcome, MarkupHighlighter, MatchPlan, verify,
};
pub use terminal::{Highlighter, colors, dim, header, render_markup, subheader, warning};
