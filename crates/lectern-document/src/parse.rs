//! Tolerant HTML parsing.
//!
//! The parser recognises just enough HTML to build an element tree from rendered section
//! content: tags with quoted or unquoted attributes, void and self-closing elements,
//! comments and declarations. Malformed input never fails; unknown constructs are kept as
//! text so that serialization stays faithful.

use std::{iter::Peekable, str::CharIndices};

use crate::node::{Element, Node};

/// Elements that never have children or a closing tag.
const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param", "source",
    "track", "wbr",
];

/// Parses HTML into a list of top-level nodes.
pub fn parse_html(html: &str) -> Vec<Node> {
    Parser::new(html).parse()
}

/// Parser state.
struct Parser<'a> {
    /// The full input.
    input: &'a str,
    /// Current byte position.
    pos: usize,
    /// Elements opened but not yet closed, innermost last.
    stack: Vec<Element>,
    /// Completed top-level nodes.
    roots: Vec<Node>,
}

impl<'a> Parser<'a> {
    /// Creates a parser over `input`.
    fn new(input: &'a str) -> Self {
        Self {
            input,
            pos: 0,
            stack: Vec::new(),
            roots: Vec::new(),
        }
    }

    /// Parses the whole input.
    fn parse(mut self) -> Vec<Node> {
        while self.pos < self.input.len() {
            let rest = &self.input[self.pos..];
            match rest.find('<') {
                Some(0) => self.read_markup(),
                Some(n) => {
                    self.append(Node::Text(rest[..n].to_string()));
                    self.pos += n;
                }
                None => {
                    self.append(Node::Text(rest.to_string()));
                    self.pos = self.input.len();
                }
            }
        }

        // Unclosed elements end at end of input.
        while let Some(element) = self.stack.pop() {
            self.append(Node::Element(element));
        }

        self.roots
    }

    /// Appends a finished node to the innermost open element, or to the roots.
    fn append(&mut self, node: Node) {
        match self.stack.last_mut() {
            Some(parent) => parent.children.push(node),
            None => self.roots.push(node),
        }
    }

    /// Reads the markup construct starting at the current `<`.
    fn read_markup(&mut self) {
        let rest = &self.input[self.pos..];

        if rest.starts_with("<!--") {
            let end = rest.find("-->").map_or(rest.len(), |i| i + 3);
            self.append(Node::Raw(rest[..end].to_string()));
            self.pos += end;
            return;
        }

        if rest.starts_with("<!") || rest.starts_with("<?") {
            let end = rest.find('>').map_or(rest.len(), |i| i + 1);
            self.append(Node::Raw(rest[..end].to_string()));
            self.pos += end;
            return;
        }

        let Some(end) = tag_end(rest) else {
            // No closing `>` before the next `<`: the `<` is text.
            self.append(Node::Text("<".to_string()));
            self.pos += 1;
            return;
        };
        let tag = &rest[..end];

        if let Some(body) = tag.strip_prefix("</") {
            let name = tag_name(body);
            if name.is_empty() {
                self.append(Node::Text(tag.to_string()));
            } else {
                self.close_element(&name, tag);
            }
            self.pos += end;
            return;
        }

        let body = &tag[1..tag.len() - 1];
        let name = tag_name(body);
        if name.is_empty() {
            // A bare `<` in text.
            self.append(Node::Text("<".to_string()));
            self.pos += 1;
            return;
        }

        let self_closing = body.trim_end().ends_with('/');
        let attributes = parse_attributes(&body[name.len()..]);
        let element = Element {
            name: name.clone(),
            attributes,
            open_tag: tag.to_string(),
            close_tag: None,
            children: Vec::new(),
        };

        if self_closing || VOID_ELEMENTS.contains(&name.as_str()) {
            self.append(Node::Element(element));
        } else {
            self.stack.push(element);
        }
        self.pos += end;
    }

    /// Closes the innermost open element named `name`.
    ///
    /// Elements opened inside it are closed implicitly. A closing tag with no matching open
    /// element is kept as raw markup.
    fn close_element(&mut self, name: &str, tag: &str) {
        let Some(index) = self.stack.iter().rposition(|e| e.name == name) else {
            self.append(Node::Raw(tag.to_string()));
            return;
        };

        while self.stack.len() > index + 1 {
            if let Some(inner) = self.stack.pop() {
                self.append(Node::Element(inner));
            }
        }

        if let Some(mut element) = self.stack.pop() {
            element.close_tag = Some(tag.to_string());
            self.append(Node::Element(element));
        }
    }
}

/// Returns the byte length of the tag starting at `rest[0] == '<'`, honouring quoted
/// attribute values.
fn tag_end(rest: &str) -> Option<usize> {
    let mut quote: Option<u8> = None;
    for (i, &b) in rest.as_bytes().iter().enumerate().skip(1) {
        match quote {
            Some(q) if b == q => quote = None,
            Some(_) => {}
            None if b == b'"' || b == b'\'' => quote = Some(b),
            None if b == b'>' => return Some(i + 1),
            None if b == b'<' => return None,
            None => {}
        }
    }
    None
}

/// Reads the lowercased tag name at the start of a tag body.
fn tag_name(body: &str) -> String {
    let name: String = body
        .chars()
        .take_while(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | ':' | '_'))
        .collect();
    if name.starts_with(|c: char| c.is_ascii_alphabetic()) {
        name.to_ascii_lowercase()
    } else {
        String::new()
    }
}

/// Parses the attribute list that follows a tag name.
fn parse_attributes(source: &str) -> Vec<(String, String)> {
    let mut attributes = Vec::new();
    let mut chars = source.char_indices().peekable();

    while let Some(&(start, ch)) = chars.peek() {
        if ch.is_whitespace() || ch == '/' {
            chars.next();
            continue;
        }

        let mut name_end = source.len();
        while let Some(&(i, c)) = chars.peek() {
            if c.is_whitespace() || c == '=' || c == '/' {
                name_end = i;
                break;
            }
            chars.next();
        }
        let name = source[start..name_end].to_ascii_lowercase();

        while chars.peek().is_some_and(|&(_, c)| c.is_whitespace()) {
            chars.next();
        }

        if chars.peek().is_some_and(|&(_, c)| c == '=') {
            chars.next();
            while chars.peek().is_some_and(|&(_, c)| c.is_whitespace()) {
                chars.next();
            }
            let value = read_attribute_value(source, &mut chars);
            attributes.push((name, value));
        } else if !name.is_empty() {
            attributes.push((name, String::new()));
        }
    }

    attributes
}

/// Reads a quoted or unquoted attribute value.
fn read_attribute_value(source: &str, chars: &mut Peekable<CharIndices<'_>>) -> String {
    let Some(&(start, first)) = chars.peek() else {
        return String::new();
    };

    if first == '"' || first == '\'' {
        chars.next();
        let value_start = start + 1;
        for (i, c) in chars.by_ref() {
            if c == first {
                return source[value_start..i].to_string();
            }
        }
        return source[value_start..].to_string();
    }

    let mut end = source.len();
    while let Some(&(i, c)) = chars.peek() {
        if c.is_whitespace() {
            end = i;
            break;
        }
        chars.next();
    }
    source[start..end].to_string()
}
