//! # Node tree
//!
//! Nodes are immutable. Children are held behind `Arc`, so an edit rebuilds
//! only the path from the edited node to the root and every untouched
//! subtree is shared with the previous tree.
//!
//! ```text
//! Document ─┬─ Block ─┬─ Text
//!           │         ├─ Inline ── Text
//!           │         └─ Text
//!           └─ Block ─── Block ── Text
//! ```

use crate::cache::DerivedText;
use crate::error::{ModelError, ModelResult};
use crate::mark::Data;
use crate::text::Text;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Arc;

/// Position of a node as child indices from the document root
pub type Path = Vec<usize>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    Document,
    Block,
    Inline,
    Text,
}

impl NodeKind {
    pub fn name(self) -> &'static str {
        match self {
            NodeKind::Document => "document",
            NodeKind::Block => "block",
            NodeKind::Inline => "inline",
            NodeKind::Text => "text",
        }
    }

    /// Whether a node of this kind may hold a child of kind `child`
    pub fn can_contain(self, child: NodeKind) -> bool {
        matches!(
            (self, child),
            (NodeKind::Document, NodeKind::Block)
                | (NodeKind::Block, NodeKind::Block | NodeKind::Inline | NodeKind::Text)
                | (NodeKind::Inline, NodeKind::Inline | NodeKind::Text)
        )
    }
}

/// Settable properties of an element; `None` leaves a field unchanged
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeProperties {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub node_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_void: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Data>,
}

impl NodeProperties {
    pub fn node_type(node_type: impl Into<String>) -> Self {
        Self {
            node_type: Some(node_type.into()),
            ..Self::default()
        }
    }
}

/// Block or inline element
#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    key: String,
    node_type: String,
    is_void: bool,
    data: Data,
    nodes: Vec<Node>,
    cache: DerivedText,
}

impl Element {
    pub fn new(key: impl Into<String>, node_type: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            node_type: node_type.into(),
            is_void: false,
            data: Data::new(),
            nodes: Vec::new(),
            cache: DerivedText::default(),
        }
    }

    pub fn with_void(mut self, is_void: bool) -> Self {
        self.is_void = is_void;
        self
    }

    pub fn with_data(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.data.insert(key.into(), value.into());
        self
    }

    pub fn with_child(mut self, child: Node) -> Self {
        self.nodes.push(child);
        self.cache = DerivedText::default();
        self
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn node_type(&self) -> &str {
        &self.node_type
    }

    pub fn is_void(&self) -> bool {
        self.is_void
    }

    pub fn data(&self) -> &Data {
        &self.data
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn text(&self) -> &str {
        self.cache.text(|| text_of(&self.nodes))
    }

    /// Length of [`Element::text`] in chars
    pub fn len(&self) -> usize {
        self.cache.len(|| text_of(&self.nodes))
    }

    /// A void element is never empty; otherwise empty iff every child is
    pub fn is_empty(&self) -> bool {
        !self.is_void && self.nodes.iter().all(Node::is_empty)
    }

    pub fn properties(&self) -> NodeProperties {
        NodeProperties {
            node_type: Some(self.node_type.clone()),
            is_void: Some(self.is_void),
            data: Some(self.data.clone()),
        }
    }

    pub(crate) fn replace_nodes(&self, nodes: Vec<Node>) -> Element {
        Element {
            key: self.key.clone(),
            node_type: self.node_type.clone(),
            is_void: self.is_void,
            data: self.data.clone(),
            nodes,
            cache: DerivedText::default(),
        }
    }

    pub fn with_properties(&self, properties: &NodeProperties) -> Element {
        let mut element = self.replace_nodes(self.nodes.clone());
        if let Some(node_type) = &properties.node_type {
            element.node_type = node_type.clone();
        }
        if let Some(is_void) = properties.is_void {
            element.is_void = is_void;
        }
        if let Some(data) = &properties.data {
            element.data = data.clone();
        }
        element
    }

    /// Same properties, different key and children
    pub(crate) fn sibling(&self, key: impl Into<String>, nodes: Vec<Node>) -> Element {
        let mut element = self.replace_nodes(nodes);
        element.key = key.into();
        element
    }
}

/// Any non-root node
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Block(Arc<Element>),
    Inline(Arc<Element>),
    Text(Arc<Text>),
}

impl Node {
    pub fn block(element: Element) -> Node {
        Node::Block(Arc::new(element))
    }

    pub fn inline(element: Element) -> Node {
        Node::Inline(Arc::new(element))
    }

    pub fn text(text: Text) -> Node {
        Node::Text(Arc::new(text))
    }

    pub fn kind(&self) -> NodeKind {
        match self {
            Node::Block(_) => NodeKind::Block,
            Node::Inline(_) => NodeKind::Inline,
            Node::Text(_) => NodeKind::Text,
        }
    }

    pub fn key(&self) -> &str {
        match self {
            Node::Block(e) | Node::Inline(e) => e.key(),
            Node::Text(t) => t.key(),
        }
    }

    pub fn as_text(&self) -> Option<&Text> {
        match self {
            Node::Text(t) => Some(t),
            _ => None,
        }
    }

    pub fn as_element(&self) -> Option<&Element> {
        match self {
            Node::Block(e) | Node::Inline(e) => Some(e),
            Node::Text(_) => None,
        }
    }

    pub fn is_text(&self) -> bool {
        matches!(self, Node::Text(_))
    }

    pub fn is_block(&self) -> bool {
        matches!(self, Node::Block(_))
    }

    pub fn is_void(&self) -> bool {
        self.as_element().is_some_and(Element::is_void)
    }

    /// Children; empty for text nodes
    pub fn nodes(&self) -> &[Node] {
        match self {
            Node::Block(e) | Node::Inline(e) => e.nodes(),
            Node::Text(_) => &[],
        }
    }

    /// Concatenated text of every descendant leaf
    pub fn text_content(&self) -> &str {
        match self {
            Node::Block(e) | Node::Inline(e) => e.text(),
            Node::Text(t) => t.text(),
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Node::Block(e) | Node::Inline(e) => e.len(),
            Node::Text(t) => t.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Node::Block(e) | Node::Inline(e) => e.is_empty(),
            Node::Text(t) => t.is_empty(),
        }
    }

    /// Identity comparison: true when both share the same allocation
    pub fn ptr_eq(&self, other: &Node) -> bool {
        match (self, other) {
            (Node::Block(a), Node::Block(b)) | (Node::Inline(a), Node::Inline(b)) => Arc::ptr_eq(a, b),
            (Node::Text(a), Node::Text(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }

    /// Rebuild this element around new children, re-checking child kinds
    pub fn with_nodes(&self, nodes: Vec<Node>) -> ModelResult<Node> {
        validate_children(self.kind(), &nodes)?;
        match self {
            Node::Block(e) => Ok(Node::block(e.replace_nodes(nodes))),
            Node::Inline(e) => Ok(Node::inline(e.replace_nodes(nodes))),
            Node::Text(t) => Err(ModelError::NotElement(t.key().to_string())),
        }
    }

    pub fn get_descendant(&self, key: &str) -> Option<&Node> {
        descendant_in(self.nodes(), key)
    }

    pub fn has_descendant(&self, key: &str) -> bool {
        self.get_descendant(key).is_some()
    }

    /// Text descendants in document order (a text node yields itself)
    pub fn texts(&self) -> Vec<&Text> {
        match self {
            Node::Text(t) => vec![t.as_ref()],
            _ => texts_in(self.nodes()),
        }
    }

    /// Text containing char `offset` of this node's text, with the offset
    /// local to that text
    pub fn text_at_offset(&self, offset: usize) -> Option<(&Text, usize)> {
        match self {
            Node::Text(t) => Some((t.as_ref(), offset.min(t.len()))),
            _ => text_at_offset_in(self.nodes(), offset),
        }
    }
}

pub(crate) fn text_of(nodes: &[Node]) -> String {
    let mut out = String::new();
    for node in nodes {
        out.push_str(node.text_content());
    }
    out
}

pub(crate) fn validate_children(parent: NodeKind, nodes: &[Node]) -> ModelResult<()> {
    for child in nodes {
        if !parent.can_contain(child.kind()) {
            return Err(ModelError::InvalidChild {
                parent: parent.name(),
                child: child.kind().name(),
            });
        }
    }
    Ok(())
}

/// Recursively check child kinds and key uniqueness below `nodes`
pub(crate) fn validate_tree(parent: NodeKind, nodes: &[Node], seen: &mut HashSet<String>) -> ModelResult<()> {
    validate_children(parent, nodes)?;
    for node in nodes {
        if !seen.insert(node.key().to_string()) {
            return Err(ModelError::DuplicateKey(node.key().to_string()));
        }
        if let Some(element) = node.as_element() {
            validate_tree(node.kind(), element.nodes(), seen)?;
        }
    }
    Ok(())
}

pub(crate) fn descendant_in<'a>(nodes: &'a [Node], key: &str) -> Option<&'a Node> {
    for node in nodes {
        if node.key() == key {
            return Some(node);
        }
        if let Some(found) = descendant_in(node.nodes(), key) {
            return Some(found);
        }
    }
    None
}

pub(crate) fn find_path_in(nodes: &[Node], key: &str) -> Option<Path> {
    for (i, node) in nodes.iter().enumerate() {
        if node.key() == key {
            return Some(vec![i]);
        }
        if let Some(mut rest) = find_path_in(node.nodes(), key) {
            rest.insert(0, i);
            return Some(rest);
        }
    }
    None
}

pub(crate) fn node_at_in<'a>(nodes: &'a [Node], path: &[usize]) -> Option<&'a Node> {
    let (first, rest) = path.split_first()?;
    let node = nodes.get(*first)?;
    if rest.is_empty() {
        Some(node)
    } else {
        node_at_in(node.nodes(), rest)
    }
}

pub(crate) fn texts_in(nodes: &[Node]) -> Vec<&Text> {
    let mut out = Vec::new();
    collect_texts(nodes, &mut out);
    out
}

fn collect_texts<'a>(nodes: &'a [Node], out: &mut Vec<&'a Text>) {
    for node in nodes {
        match node {
            Node::Text(t) => out.push(t),
            _ => collect_texts(node.nodes(), out),
        }
    }
}

pub(crate) fn text_at_offset_in(nodes: &[Node], offset: usize) -> Option<(&Text, usize)> {
    let texts = texts_in(nodes);
    let mut start = 0;
    for text in &texts {
        let end = start + text.len();
        if offset < end {
            return Some((text, offset - start));
        }
        start = end;
    }
    texts.last().map(|t| (*t, t.len()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::leaf::Leaves;

    fn paragraph(key: &str, texts: &[(&str, &str)]) -> Node {
        let mut element = Element::new(key, "paragraph");
        for (k, t) in texts {
            element = element.with_child(Node::text(Text::new(*k, Leaves::plain(*t))));
        }
        Node::block(element)
    }

    #[test]
    fn test_can_contain() {
        assert!(NodeKind::Document.can_contain(NodeKind::Block));
        assert!(!NodeKind::Document.can_contain(NodeKind::Inline));
        assert!(NodeKind::Block.can_contain(NodeKind::Inline));
        assert!(!NodeKind::Inline.can_contain(NodeKind::Block));
        assert!(!NodeKind::Text.can_contain(NodeKind::Text));
    }

    #[test]
    fn test_element_text_concatenates_children() {
        let node = paragraph("p", &[("a", "Hello"), ("b", ", "), ("c", "world")]);
        assert_eq!(node.text_content(), "Hello, world");
        assert_eq!(node.len(), 12);
    }

    #[test]
    fn test_void_is_never_empty() {
        let image = Node::block(
            Element::new("img", "image")
                .with_void(true)
                .with_child(Node::text(Text::empty("t"))),
        );
        assert!(!image.is_empty());

        let empty = paragraph("p", &[("t", "")]);
        assert!(empty.is_empty());
    }

    #[test]
    fn test_with_nodes_rejects_invalid_children() {
        let link = Node::inline(Element::new("l", "link"));
        let err = link.with_nodes(vec![paragraph("p", &[])]).unwrap_err();
        assert_eq!(
            err,
            ModelError::InvalidChild {
                parent: "inline",
                child: "block"
            }
        );
    }

    #[test]
    fn test_text_at_offset_prefers_following_text_on_boundary() {
        let node = paragraph("p", &[("a", "abc"), ("b", "def")]);
        let (text, local) = node.text_at_offset(3).unwrap();
        assert_eq!(text.key(), "b");
        assert_eq!(local, 0);

        let (text, local) = node.text_at_offset(6).unwrap();
        assert_eq!(text.key(), "b");
        assert_eq!(local, 3);
    }

    #[test]
    fn test_untouched_children_are_shared() {
        let node = paragraph("p", &[("a", "abc"), ("b", "def")]);
        let first = node.nodes()[0].clone();
        let rebuilt = node
            .with_nodes(vec![first.clone(), Node::text(Text::new("c", Leaves::plain("x")))])
            .unwrap();
        assert!(rebuilt.nodes()[0].ptr_eq(&node.nodes()[0]));
    }
}
