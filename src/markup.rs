//! A small element tree that views build instead of concatenating strings.
//!
//! Text and attribute values are escaped when the tree is rendered, so record
//! fields coming from the API can never inject markup.

use std::fmt::Write;

const VOID_TAGS: &[&str] = &["br", "hr", "img", "input"];

#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Element(Element),
    Text(String),
    Fragment(Vec<Node>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    tag: &'static str,
    attrs: Vec<(String, String)>,
    children: Vec<Node>,
}

pub fn el(tag: &'static str) -> Element {
    Element::new(tag)
}

pub fn text<S: Into<String>>(value: S) -> Node {
    Node::Text(value.into())
}

pub fn fragment<I: IntoIterator<Item = Node>>(nodes: I) -> Node {
    Node::Fragment(nodes.into_iter().collect())
}

impl Element {
    pub fn new(tag: &'static str) -> Self {
        Self {
            tag,
            attrs: Vec::new(),
            children: Vec::new(),
        }
    }

    pub fn attr<K: Into<String>, V: Into<String>>(mut self, key: K, value: V) -> Self {
        self.set_attr(key, value);
        self
    }

    pub fn id<V: Into<String>>(self, value: V) -> Self {
        self.attr("id", value)
    }

    pub fn class<V: Into<String>>(self, value: V) -> Self {
        self.attr("class", value)
    }

    pub fn child<N: Into<Node>>(mut self, node: N) -> Self {
        self.children.push(node.into());
        self
    }

    pub fn children<I, N>(mut self, nodes: I) -> Self
    where
        I: IntoIterator<Item = N>,
        N: Into<Node>,
    {
        self.children.extend(nodes.into_iter().map(Into::into));
        self
    }

    pub fn text<S: Into<String>>(self, value: S) -> Self {
        self.child(text(value))
    }

    pub fn get_attr(&self, key: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(name, _)| name == key)
            .map(|(_, value)| value.as_str())
    }

    pub fn set_attr<K: Into<String>, V: Into<String>>(&mut self, key: K, value: V) {
        let key = key.into();
        let value = value.into();
        match self.attrs.iter_mut().find(|(name, _)| *name == key) {
            Some(slot) => slot.1 = value,
            None => self.attrs.push((key, value)),
        }
    }

    pub fn remove_attr(&mut self, key: &str) {
        self.attrs.retain(|(name, _)| name != key);
    }

    pub fn has_attr(&self, key: &str) -> bool {
        self.get_attr(key).is_some()
    }

    /// `data-*` attributes, in declaration order, with the prefix stripped.
    pub fn data_attrs(&self) -> impl Iterator<Item = (&str, &str)> {
        self.attrs.iter().filter_map(|(name, value)| {
            name.strip_prefix("data-")
                .map(|key| (key, value.as_str()))
        })
    }

    pub fn replace_children(&mut self, node: Node) {
        self.children = vec![node];
    }

    pub fn text_content(&self) -> String {
        let mut out = String::new();
        for child in &self.children {
            child.collect_text(&mut out);
        }
        out
    }

    fn write_to(&self, out: &mut String) {
        out.push('<');
        out.push_str(self.tag);
        for (name, value) in &self.attrs {
            let _ = write!(out, " {}=\"{}\"", name, escape(value));
        }
        out.push('>');
        if VOID_TAGS.contains(&self.tag) {
            return;
        }
        for child in &self.children {
            child.write_to(out);
        }
        let _ = write!(out, "</{}>", self.tag);
    }
}

impl From<Element> for Node {
    fn from(element: Element) -> Self {
        Node::Element(element)
    }
}

impl From<&str> for Node {
    fn from(value: &str) -> Self {
        Node::Text(value.to_string())
    }
}

impl From<String> for Node {
    fn from(value: String) -> Self {
        Node::Text(value)
    }
}

impl Node {
    pub fn render(&self) -> String {
        let mut out = String::new();
        self.write_to(&mut out);
        out
    }

    pub fn text_content(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    /// Top level elements: the element itself, or a fragment's elements.
    pub fn elements(&self) -> Vec<&Element> {
        match self {
            Node::Element(element) => vec![element],
            Node::Fragment(nodes) => nodes
                .iter()
                .filter_map(|node| match node {
                    Node::Element(element) => Some(element),
                    _ => None,
                })
                .collect(),
            Node::Text(_) => Vec::new(),
        }
    }

    pub fn elements_mut(&mut self) -> Vec<&mut Element> {
        match self {
            Node::Element(element) => vec![element],
            Node::Fragment(nodes) => nodes
                .iter_mut()
                .filter_map(|node| match node {
                    Node::Element(element) => Some(element),
                    _ => None,
                })
                .collect(),
            Node::Text(_) => Vec::new(),
        }
    }

    /// Depth-first search for the first element matching `predicate`.
    pub fn find(&self, predicate: &dyn Fn(&Element) -> bool) -> Option<&Element> {
        match self {
            Node::Text(_) => None,
            Node::Element(element) => {
                if predicate(element) {
                    return Some(element);
                }
                element.children.iter().find_map(|child| child.find(predicate))
            }
            Node::Fragment(nodes) => nodes.iter().find_map(|child| child.find(predicate)),
        }
    }

    pub fn find_mut(&mut self, predicate: &dyn Fn(&Element) -> bool) -> Option<&mut Element> {
        match self {
            Node::Text(_) => None,
            Node::Element(element) => {
                if predicate(element) {
                    return Some(element);
                }
                element
                    .children
                    .iter_mut()
                    .find_map(|child| child.find_mut(predicate))
            }
            Node::Fragment(nodes) => nodes.iter_mut().find_map(|child| child.find_mut(predicate)),
        }
    }

    fn collect_text(&self, out: &mut String) {
        match self {
            Node::Text(value) => out.push_str(value),
            Node::Element(element) => {
                for child in &element.children {
                    child.collect_text(out);
                }
            }
            Node::Fragment(nodes) => {
                for child in nodes {
                    child.collect_text(out);
                }
            }
        }
    }

    fn write_to(&self, out: &mut String) {
        match self {
            Node::Text(value) => out.push_str(&escape(value)),
            Node::Element(element) => element.write_to(out),
            Node::Fragment(nodes) => {
                for node in nodes {
                    node.write_to(out);
                }
            }
        }
    }
}

pub fn escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
