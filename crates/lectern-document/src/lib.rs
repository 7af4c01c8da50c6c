//! Section content model for lectern.
//!
//! Sections are the smallest independently loadable units of a collection (one chapter,
//! typically). Their rendered content is HTML in which every fragment (verse, paragraph) is
//! tagged with a `data-id` attribute, possibly across several elements:
//!
//! ```html
//! <div class="p"><span class="v" data-id="JN1_1">In the beginning was the Word,</span></div>
//! <div class="p"><span class="v" data-id="JN1_1">and the Word was with God.</span></div>
//! ```
//!
//! This crate parses that HTML into a small tree ([`SectionContent`]) that preserves the exact
//! source markup, removes footnote and cross-reference markers, and extracts per-fragment
//! markup. It also defines the [`ContentStore`] collaborator that loads section HTML.
//!
//! # Example
//!
//! ```
//! use lectern_document::SectionContent;
//!
//! let mut content = SectionContent::parse(
//!     r#"<span data-id="JN1_1">In the beginning<span class="note">a</span></span>"#,
//! );
//! content.strip_notes();
//! assert_eq!(content.fragment_markup("JN1_1").as_deref(), Some("In the beginning"));
//! ```

#![warn(missing_docs)]

mod error;
mod node;
mod parse;
mod section;
mod store;

pub use error::DocumentError;
pub use node::{Element, Node};
pub use parse::parse_html;
pub use section::{FRAGMENT_ATTRIBUTE, NOTE_CLASSES, SectionContent};
pub use store::ContentStore;
