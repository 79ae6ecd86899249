//! Chat markup tree
//!
//! Command text arrives as plain text interleaved with elements such as
//! `<img src="..."/>`. This module parses it into a tree of [`Node`]s, rewrites
//! the tree with a [`Visitor`], and renders it back to plain text.

mod parser;

pub use parser::parse;

use crate::Result;
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Text(String),
    Element(Element),
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Element {
    pub tag: String,
    pub attrs: BTreeMap<String, String>,
    pub children: Vec<Node>,
}

impl Element {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            ..Self::default()
        }
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs.get(name).map(String::as_str)
    }
}

/// What a [`Visitor`] wants done with the element it was shown.
#[derive(Debug)]
pub enum Visit {
    /// Keep the element and visit its children.
    Descend,
    /// Replace the element (children included) with these nodes.
    Replace(Vec<Node>),
}

pub trait Visitor {
    fn visit_element(&mut self, element: &Element) -> Result<Visit>;
}

/// Rewrite `nodes` depth-first in document order. The first visitor error
/// aborts the walk and the partially rewritten tree is dropped.
pub fn transform<V: Visitor + ?Sized>(nodes: Vec<Node>, visitor: &mut V) -> Result<Vec<Node>> {
    let mut out = Vec::with_capacity(nodes.len());
    for node in nodes {
        match node {
            Node::Text(_) => out.push(node),
            Node::Element(mut element) => match visitor.visit_element(&element)? {
                Visit::Descend => {
                    let children = std::mem::take(&mut element.children);
                    element.children = transform(children, visitor)?;
                    out.push(Node::Element(element));
                }
                Visit::Replace(replacement) => out.extend(replacement),
            },
        }
    }
    Ok(out)
}

/// Plain-text rendering: element tags are dropped, their text content kept.
pub fn render_text(nodes: &[Node]) -> String {
    let mut out = String::new();
    write_text(nodes, &mut out);
    out
}

fn write_text(nodes: &[Node], out: &mut String) {
    for node in nodes {
        match node {
            Node::Text(text) => out.push_str(text),
            Node::Element(element) => write_text(&element.children, out),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;

    struct DropTag(&'static str);

    impl Visitor for DropTag {
        fn visit_element(&mut self, element: &Element) -> Result<Visit> {
            if element.tag == self.0 {
                Ok(Visit::Replace(Vec::new()))
            } else {
                Ok(Visit::Descend)
            }
        }
    }

    struct Reject;

    impl Visitor for Reject {
        fn visit_element(&mut self, _element: &Element) -> Result<Visit> {
            Err(Error::InvalidMedia("rejected".to_string()))
        }
    }

    #[test]
    fn test_render_keeps_child_text() {
        let nodes = parse("say <b>hello</b> world");
        assert_eq!(render_text(&nodes), "say hello world");
    }

    #[test]
    fn test_transform_replaces_nested_elements() {
        let nodes = parse("a <quote>b <img src=\"x.png\"/> c</quote> d");
        let rewritten = transform(nodes, &mut DropTag("img")).unwrap();
        assert_eq!(render_text(&rewritten), "a b  c d");
    }

    #[test]
    fn test_transform_propagates_visitor_errors() {
        let nodes = parse("text <img src=\"x.png\"/>");
        assert!(transform(nodes, &mut Reject).is_err());
    }

    #[test]
    fn test_transform_without_elements_is_identity() {
        let nodes = parse("just text");
        let rewritten = transform(nodes.clone(), &mut Reject).unwrap();
        assert_eq!(rewritten, nodes);
    }
}
