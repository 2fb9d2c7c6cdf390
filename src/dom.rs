//! Render-target tree.
//!
//! A small owned node tree standing in for the host's document. Views
//! produce markup text; [`parse_fragment`] turns it into nodes that the
//! renderer either installs wholesale or reconciles against what is already
//! there.

use std::fmt::Write as _;

/// Elements that never have children or a closing tag.
const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source",
    "track", "wbr",
];

/// Elements whose text starts on a fresh line in [`Element::to_plain_text`].
const BLOCK_ELEMENTS: &[&str] = &[
    "div", "p", "li", "ul", "ol", "h1", "h2", "h3", "h4", "figure", "form", "section",
    "button", "label", "nav", "header", "footer", "article",
];

#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Element(Element),
    Text(String),
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Element {
    pub tag: String,
    pub attrs: Vec<(String, String)>,
    pub children: Vec<Node>,
}

impl Node {
    pub fn as_element(&self) -> Option<&Element> {
        match self {
            Node::Element(el) => Some(el),
            Node::Text(_) => None,
        }
    }

    fn text_content_into(&self, out: &mut String) {
        match self {
            Node::Text(t) => out.push_str(t),
            Node::Element(el) => {
                for child in &el.children {
                    child.text_content_into(out);
                }
            }
        }
    }

    /// Structural equality the way the host document defines it: same kind,
    /// same tag, same attribute set (order ignored), same children.
    pub fn is_equal_node(&self, other: &Node) -> bool {
        match (self, other) {
            (Node::Text(a), Node::Text(b)) => a == b,
            (Node::Element(a), Node::Element(b)) => a.is_equal_node(b),
            _ => false,
        }
    }
}

impl Element {
    pub fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_ascii_lowercase(),
            ..Self::default()
        }
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn set_attribute(&mut self, name: &str, value: &str) {
        match self.attrs.iter_mut().find(|(n, _)| n == name) {
            Some((_, v)) => {
                if v != value {
                    *v = value.to_string();
                }
            }
            None => self.attrs.push((name.to_string(), value.to_string())),
        }
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.attr("class")
            .is_some_and(|c| c.split_whitespace().any(|c| c == class))
    }

    /// Concatenated text of every descendant text node.
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        for child in &self.children {
            child.text_content_into(&mut out);
        }
        out
    }

    /// Replace all children with a single text node.
    pub fn set_text_content(&mut self, text: &str) {
        self.children.clear();
        if !text.is_empty() {
            self.children.push(Node::Text(text.to_string()));
        }
    }

    pub fn first_child(&self) -> Option<&Node> {
        self.children.first()
    }

    pub fn is_equal_node(&self, other: &Element) -> bool {
        self.tag == other.tag
            && self.attrs.len() == other.attrs.len()
            && self
                .attrs
                .iter()
                .all(|(name, value)| other.attr(name) == Some(value.as_str()))
            && self.children.len() == other.children.len()
            && self
                .children
                .iter()
                .zip(&other.children)
                .all(|(a, b)| a.is_equal_node(b))
    }

    /// Descendant elements in document order (self excluded).
    pub fn descendants(&self) -> Vec<&Element> {
        let mut out = Vec::new();
        collect_elements(&self.children, &mut out);
        out
    }

    pub fn descendant_count(&self) -> usize {
        count_elements(&self.children)
    }

    /// First descendant element carrying `class`.
    pub fn find_by_class(&self, class: &str) -> Option<&Element> {
        self.descendants().into_iter().find(|el| el.has_class(class))
    }

    pub fn find_all_by_class(&self, class: &str) -> Vec<&Element> {
        self.descendants()
            .into_iter()
            .filter(|el| el.has_class(class))
            .collect()
    }

    /// Human-readable rendition for a terminal: block elements start a new
    /// line, runs of whitespace collapse, empty lines are dropped.
    pub fn to_plain_text(&self) -> String {
        let mut lines = vec![String::new()];
        plain_text_into(&self.children, &mut lines);
        lines
            .into_iter()
            .map(|l| l.split_whitespace().collect::<Vec<_>>().join(" "))
            .filter(|l| !l.is_empty())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

fn collect_elements<'a>(nodes: &'a [Node], out: &mut Vec<&'a Element>) {
    for node in nodes {
        if let Node::Element(el) = node {
            out.push(el);
            collect_elements(&el.children, out);
        }
    }
}

fn count_elements(nodes: &[Node]) -> usize {
    nodes
        .iter()
        .map(|n| match n {
            Node::Element(el) => 1 + count_elements(&el.children),
            Node::Text(_) => 0,
        })
        .sum()
}

fn plain_text_into(nodes: &[Node], lines: &mut Vec<String>) {
    for node in nodes {
        match node {
            Node::Text(t) => {
                if let Some(line) = lines.last_mut() {
                    line.push_str(t);
                }
            }
            Node::Element(el) => {
                let block = BLOCK_ELEMENTS.contains(&el.tag.as_str());
                if block {
                    lines.push(String::new());
                }
                if el.tag == "img" {
                    if let Some(alt) = el.attr("alt") {
                        if let Some(line) = lines.last_mut() {
                            let _ = write!(line, "[{alt}]");
                        }
                    }
                }
                plain_text_into(&el.children, lines);
                if block {
                    lines.push(String::new());
                } else if let Some(line) = lines.last_mut() {
                    line.push(' ');
                }
            }
        }
    }
}

/// Escape text for inclusion in markup. Views use this on every
/// interpolated value.
pub fn escape(raw: &str, in_attribute: bool) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' if in_attribute => out.push_str("&quot;"),
            '\'' if in_attribute => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}

fn unescape(raw: &str) -> String {
    if !raw.contains('&') {
        return raw.to_string();
    }
    raw.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&nbsp;", "\u{a0}")
        .replace("&amp;", "&")
}

/// Parse a markup fragment into nodes.
///
/// Lenient in the way a browser's fragment parser is: unknown tags are kept,
/// stray closing tags are ignored, unclosed elements are closed at the end,
/// comments are dropped.
pub fn parse_fragment(markup: &str) -> Vec<Node> {
    // Stack of open elements; index 0 is a synthetic root.
    let mut stack: Vec<Element> = vec![Element::new("#fragment")];
    let mut rest = markup;

    while !rest.is_empty() {
        if let Some(after) = rest.strip_prefix("<!--") {
            rest = match after.find("-->") {
                Some(end) => &after[end + 3..],
                None => "",
            };
            continue;
        }
        if let Some(after) = rest.strip_prefix("</") {
            let end = after.find('>').unwrap_or(after.len());
            let name = after[..end].trim().to_ascii_lowercase();
            rest = after.get(end + 1..).unwrap_or("");
            if let Some(pos) = stack.iter().rposition(|el| el.tag == name) {
                if pos > 0 {
                    while stack.len() > pos {
                        close_top(&mut stack);
                    }
                }
            }
            continue;
        }
        if rest.starts_with('<')
            && rest[1..].starts_with(|c: char| c.is_ascii_alphabetic())
        {
            let (element, self_closing, remaining) = parse_open_tag(&rest[1..]);
            rest = remaining;
            if self_closing || VOID_ELEMENTS.contains(&element.tag.as_str()) {
                push_child(&mut stack, Node::Element(element));
            } else {
                stack.push(element);
            }
            continue;
        }
        // Text runs up to the next tag-like '<'.
        let first = rest.chars().next().map_or(1, char::len_utf8);
        let end = rest[first..]
            .find('<')
            .map(|i| i + first)
            .unwrap_or(rest.len());
        push_child(&mut stack, Node::Text(unescape(&rest[..end])));
        rest = &rest[end..];
    }

    while stack.len() > 1 {
        close_top(&mut stack);
    }
    stack.pop().map(|root| root.children).unwrap_or_default()
}

fn push_child(stack: &mut [Element], node: Node) {
    if let Some(parent) = stack.last_mut() {
        // Adjacent text merges into one node, as it would in a document.
        if let (Node::Text(new), Some(Node::Text(prev))) = (&node, parent.children.last_mut()) {
            prev.push_str(new);
            return;
        }
        parent.children.push(node);
    }
}

fn close_top(stack: &mut Vec<Element>) {
    if let Some(el) = stack.pop() {
        push_child(stack, Node::Element(el));
    }
}

/// Parse `tag attr="v" ...>` (the leading '<' already consumed). Returns the
/// element, whether it was written `<x/>`, and the remaining input.
fn parse_open_tag(input: &str) -> (Element, bool, &str) {
    let name_end = input
        .find(|c: char| c.is_whitespace() || c == '>' || c == '/')
        .unwrap_or(input.len());
    let mut element = Element::new(&input[..name_end]);
    let mut rest = &input[name_end..];

    loop {
        rest = rest.trim_start();
        if rest.is_empty() {
            return (element, false, rest);
        }
        if let Some(after) = rest.strip_prefix("/>") {
            return (element, true, after);
        }
        if let Some(after) = rest.strip_prefix('>') {
            return (element, false, after);
        }
        if let Some(after) = rest.strip_prefix('/') {
            rest = after;
            continue;
        }

        let name_end = rest
            .find(|c: char| c.is_whitespace() || c == '=' || c == '>' || c == '/')
            .unwrap_or(rest.len());
        let name = rest[..name_end].to_ascii_lowercase();
        rest = rest[name_end..].trim_start();

        let value = if let Some(after) = rest.strip_prefix('=') {
            let after = after.trim_start();
            match after.chars().next() {
                Some(q @ ('"' | '\'')) => {
                    let body = &after[1..];
                    let end = body.find(q).unwrap_or(body.len());
                    rest = body.get(end + 1..).unwrap_or("");
                    unescape(&body[..end])
                }
                _ => {
                    let end = after
                        .find(|c: char| c.is_whitespace() || c == '>')
                        .unwrap_or(after.len());
                    rest = &after[end..];
                    unescape(&after[..end])
                }
            }
        } else {
            String::new()
        };

        if !name.is_empty() && element.attr(&name).is_none() {
            element.attrs.push((name, value));
        }
    }
}
