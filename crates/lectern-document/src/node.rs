//! Tree nodes for parsed section markup.
//!
//! Every node keeps the exact source text it was parsed from, so serializing an unmodified
//! tree reproduces the input byte for byte. Only structural edits (removing note markers)
//! change the output.

/// A node in a parsed markup tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    /// An element with its children.
    Element(Element),
    /// Character data, kept exactly as written (entities are not decoded).
    Text(String),
    /// Markup that carries no structure: comments, doctypes, stray closing tags.
    Raw(String),
}

impl Node {
    /// Returns the element if this node is one.
    pub fn as_element(&self) -> Option<&Element> {
        match self {
            Self::Element(element) => Some(element),
            Self::Text(_) | Self::Raw(_) => None,
        }
    }

    /// Appends this node's markup to `out`.
    pub fn write_html(&self, out: &mut String) {
        match self {
            Self::Element(element) => element.write_outer_html(out),
            Self::Text(text) | Self::Raw(text) => out.push_str(text),
        }
    }

    /// Returns this node's markup.
    pub fn to_html(&self) -> String {
        let mut out = String::new();
        self.write_html(&mut out);
        out
    }
}

/// An element node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    /// Lowercased tag name.
    pub name: String,
    /// Attributes in source order, with lowercased names and unquoted values.
    pub attributes: Vec<(String, String)>,
    /// The opening tag exactly as written.
    pub open_tag: String,
    /// The closing tag exactly as written, or `None` for void, self-closing and unclosed elements.
    pub close_tag: Option<String>,
    /// Child nodes in document order.
    pub children: Vec<Node>,
}

impl Element {
    /// Returns the value of an attribute (case-insensitive name).
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Returns true if the `class` attribute lists `class`.
    pub fn has_class(&self, class: &str) -> bool {
        self.attribute("class")
            .is_some_and(|classes| classes.split_whitespace().any(|c| c == class))
    }

    /// Returns the markup of this element's children.
    pub fn inner_html(&self) -> String {
        let mut out = String::new();
        self.write_inner_html(&mut out);
        out
    }

    /// Appends the markup of this element's children to `out`.
    pub fn write_inner_html(&self, out: &mut String) {
        for child in &self.children {
            child.write_html(out);
        }
    }

    /// Appends this element's full markup to `out`.
    pub fn write_outer_html(&self, out: &mut String) {
        out.push_str(&self.open_tag);
        self.write_inner_html(out);
        if let Some(close) = &self.close_tag {
            out.push_str(close);
        }
    }
}
