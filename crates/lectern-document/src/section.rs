//! Parsed section content and fragment extraction.

use crate::{
    node::{Element, Node},
    parse::parse_html,
};

/// Attribute that tags an element as (part of) a fragment.
pub const FRAGMENT_ATTRIBUTE: &str = "data-id";

/// Classes that mark footnote and cross-reference markers.
pub const NOTE_CLASSES: &[&str] = &["note", "footnote", "cf", "crossref"];

/// The rendered content of one section, as a markup tree.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SectionContent {
    /// Top-level nodes.
    nodes: Vec<Node>,
}

impl SectionContent {
    /// Parses section HTML.
    pub fn parse(html: &str) -> Self {
        Self {
            nodes: parse_html(html),
        }
    }

    /// Returns the top-level nodes.
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Removes every footnote and cross-reference marker element, with its contents.
    ///
    /// Returns the number of elements removed.
    pub fn strip_notes(&mut self) -> usize {
        strip_notes_in(&mut self.nodes)
    }

    /// Returns the concatenated inner markup of every element tagged with `fragment_id`.
    ///
    /// Elements are visited in document order. Returns `None` when no element carries the id.
    pub fn fragment_markup(&self, fragment_id: &str) -> Option<String> {
        let mut out = String::new();
        let found = collect_fragment(&self.nodes, fragment_id, &mut out);
        found.then_some(out)
    }

    /// Serializes the content back to HTML.
    pub fn to_html(&self) -> String {
        let mut out = String::new();
        for node in &self.nodes {
            node.write_html(&mut out);
        }
        out
    }
}

/// Returns true if `element` is a note or cross-reference marker.
fn is_note(element: &Element) -> bool {
    NOTE_CLASSES.iter().any(|class| element.has_class(class))
}

/// Recursively removes note elements, returning how many were removed.
fn strip_notes_in(nodes: &mut Vec<Node>) -> usize {
    let before = nodes.len();
    nodes.retain(|node| !node.as_element().is_some_and(is_note));
    let mut removed = before - nodes.len();

    for node in nodes.iter_mut() {
        if let Node::Element(element) = node {
            removed += strip_notes_in(&mut element.children);
        }
    }
    removed
}

/// Appends the inner markup of elements tagged `fragment_id` to `out`.
///
/// A tagged element's descendants are not searched again, so nested tags with the same id
/// are not duplicated.
fn collect_fragment(nodes: &[Node], fragment_id: &str, out: &mut String) -> bool {
    let mut found = false;
    for element in nodes.iter().filter_map(Node::as_element) {
        if element.attribute(FRAGMENT_ATTRIBUTE) == Some(fragment_id) {
            element.write_inner_html(out);
            found = true;
        } else {
            found |= collect_fragment(&element.children, fragment_id, out);
        }
    }
    found
}
