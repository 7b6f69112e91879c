//! # Document
//!
//! The root of the node tree and the home of the tree edit primitives.
//!
//! Every primitive addresses nodes by key, validates before building, and
//! returns a new `Document` in which only the path from the root to the
//! edited node has been rebuilt:
//!
//! ```text
//! before                 after update_text("t3")
//! doc ─┬─ b1 ── t1       doc' ─┬─ b1 ── t1        (shared)
//!      └─ b2 ─┬─ t2            └─ b2' ─┬─ t2      (shared)
//!             └─ t3                    └─ t3'
//! ```

use crate::cache::DerivedText;
use crate::error::{ModelError, ModelResult};
use crate::key_generator::generate_key;
use crate::mark::Data;
use crate::node::{
    descendant_in, find_path_in, node_at_in, text_at_offset_in, text_of, texts_in, validate_children,
    validate_tree, Element, Node, NodeKind, NodeProperties, Path,
};
use crate::text::Text;
use std::collections::HashSet;

#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    key: String,
    data: Data,
    nodes: Vec<Node>,
    cache: DerivedText,
}

impl Document {
    /// Build a document, checking child kinds and key uniqueness
    pub fn new(key: impl Into<String>, nodes: Vec<Node>) -> ModelResult<Self> {
        let key = key.into();
        let mut seen = HashSet::from([key.clone()]);
        validate_tree(NodeKind::Document, &nodes, &mut seen).map_err(|e| match e {
            ModelError::DuplicateKey(k) => ModelError::invalid_shape(format!("duplicate key `{k}`")),
            other => other,
        })?;
        Ok(Self {
            key,
            data: Data::new(),
            nodes,
            cache: DerivedText::default(),
        })
    }

    /// Document with a generated key
    pub fn from_blocks(nodes: Vec<Node>) -> ModelResult<Self> {
        Self::new(generate_key(), nodes)
    }

    pub fn with_data(mut self, data: Data) -> Self {
        self.data = data;
        self
    }

    pub fn key(&self) -> &str {
        &self.key
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

    pub fn len(&self) -> usize {
        self.cache.len(|| text_of(&self.nodes))
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.iter().all(Node::is_empty)
    }

    fn replace_nodes(&self, nodes: Vec<Node>) -> Document {
        Document {
            key: self.key.clone(),
            data: self.data.clone(),
            nodes,
            cache: DerivedText::default(),
        }
    }

    // ------------------------------------------------------------------
    // Lookups
    // ------------------------------------------------------------------

    pub fn get_descendant(&self, key: &str) -> Option<&Node> {
        descendant_in(&self.nodes, key)
    }

    pub fn has_descendant(&self, key: &str) -> bool {
        self.get_descendant(key).is_some()
    }

    pub fn assert_descendant(&self, key: &str) -> ModelResult<&Node> {
        self.get_descendant(key)
            .ok_or_else(|| ModelError::key_not_found(key))
    }

    pub fn assert_text(&self, key: &str) -> ModelResult<&Text> {
        self.assert_descendant(key)?
            .as_text()
            .ok_or_else(|| ModelError::NotText(key.to_string()))
    }

    /// Path from the root; the document itself has the empty path
    pub fn find_path(&self, key: &str) -> Option<Path> {
        if key == self.key {
            return Some(Vec::new());
        }
        find_path_in(&self.nodes, key)
    }

    pub fn node_at(&self, path: &[usize]) -> Option<&Node> {
        node_at_in(&self.nodes, path)
    }

    /// Parent element, or `None` for top-level blocks and unknown keys
    pub fn get_parent(&self, key: &str) -> Option<&Node> {
        let path = self.find_path(key)?;
        match path.len() {
            0 | 1 => None,
            n => self.node_at(&path[..n - 1]),
        }
    }

    /// Key of the parent (the document key for top-level blocks) and the
    /// node's index within it
    pub fn parent_of(&self, key: &str) -> ModelResult<(String, usize)> {
        if key == self.key {
            return Err(ModelError::RootNotAllowed);
        }
        let path = find_path_in(&self.nodes, key).ok_or_else(|| ModelError::key_not_found(key))?;
        let index = path[path.len() - 1];
        let parent = match self.get_parent(key) {
            Some(node) => node.key().to_string(),
            None => self.key.clone(),
        };
        Ok((parent, index))
    }

    /// Children of the document or of an element
    pub fn children_of(&self, key: &str) -> ModelResult<&[Node]> {
        if key == self.key {
            return Ok(&self.nodes);
        }
        let node = self.assert_descendant(key)?;
        match node {
            Node::Text(_) => Err(ModelError::NotElement(key.to_string())),
            _ => Ok(node.nodes()),
        }
    }

    pub fn kind_of(&self, key: &str) -> Option<NodeKind> {
        if key == self.key {
            return Some(NodeKind::Document);
        }
        self.get_descendant(key).map(Node::kind)
    }

    pub fn is_descendant_of(&self, key: &str, ancestor: &str) -> bool {
        if ancestor == self.key {
            return key != self.key && self.has_descendant(key);
        }
        self.get_descendant(ancestor)
            .is_some_and(|node| node.has_descendant(key))
    }

    /// Text nodes in document order
    pub fn texts(&self) -> Vec<&Text> {
        texts_in(&self.nodes)
    }

    pub fn first_text(&self) -> Option<&Text> {
        self.texts().into_iter().next()
    }

    pub fn last_text(&self) -> Option<&Text> {
        self.texts().into_iter().last()
    }

    /// Char offset of the start of `key`'s text within the document text
    pub fn get_offset(&self, key: &str) -> ModelResult<usize> {
        let path = self.find_path(key).ok_or_else(|| ModelError::key_not_found(key))?;
        let mut offset = 0;
        let mut nodes = self.nodes.as_slice();
        for index in path {
            offset += nodes[..index].iter().map(Node::len).sum::<usize>();
            nodes = nodes[index].nodes();
        }
        Ok(offset)
    }

    pub fn text_at_offset(&self, offset: usize) -> Option<(&Text, usize)> {
        text_at_offset_in(&self.nodes, offset)
    }

    /// Text immediately before the first text of `key`
    pub fn previous_text(&self, key: &str) -> Option<&Text> {
        let first = self.get_descendant(key)?.texts().first()?.key().to_string();
        let texts = self.texts();
        let index = texts.iter().position(|t| t.key() == first)?;
        index.checked_sub(1).map(|i| texts[i])
    }

    /// Text immediately after the last text of `key`
    pub fn next_text(&self, key: &str) -> Option<&Text> {
        let last = self.get_descendant(key)?.texts().last()?.key().to_string();
        let texts = self.texts();
        let index = texts.iter().position(|t| t.key() == last)?;
        texts.get(index + 1).copied()
    }

    /// Nearest block at or above `key`
    pub fn closest_block(&self, key: &str) -> Option<&Node> {
        let path = self.find_path(key)?;
        (1..=path.len())
            .rev()
            .filter_map(|depth| self.node_at(&path[..depth]))
            .find(|node| node.is_block())
    }

    /// Keys of every node in the document, in document order
    pub fn keys(&self) -> Vec<&str> {
        fn collect<'a>(nodes: &'a [Node], out: &mut Vec<&'a str>) {
            for node in nodes {
                out.push(node.key());
                collect(node.nodes(), out);
            }
        }
        let mut out = Vec::new();
        collect(&self.nodes, &mut out);
        out
    }

    // ------------------------------------------------------------------
    // Edit primitives
    // ------------------------------------------------------------------

    /// Replace the children of `parent` (the document or an element) with
    /// the list produced by `f`, rebuilding the path above it
    fn update_children<F>(&self, parent: &str, f: F) -> ModelResult<Document>
    where
        F: FnOnce(&[Node]) -> ModelResult<Vec<Node>>,
    {
        if parent == self.key {
            let nodes = f(self.nodes.as_slice())?;
            validate_children(NodeKind::Document, &nodes)?;
            return Ok(self.replace_nodes(nodes));
        }
        let path = find_path_in(&self.nodes, parent).ok_or_else(|| ModelError::key_not_found(parent))?;
        let nodes = replace_at(&self.nodes, &path, |node| match node {
            Node::Text(_) => Err(ModelError::NotElement(parent.to_string())),
            _ => node.with_nodes(f(node.nodes())?),
        })?;
        Ok(self.replace_nodes(nodes))
    }

    /// Replace the node at `key` with the node produced by `f`
    fn update_node<F>(&self, key: &str, f: F) -> ModelResult<Document>
    where
        F: FnOnce(&Node) -> ModelResult<Node>,
    {
        if key == self.key {
            return Err(ModelError::RootNotAllowed);
        }
        let path = find_path_in(&self.nodes, key).ok_or_else(|| ModelError::key_not_found(key))?;
        let nodes = replace_at(&self.nodes, &path, f)?;
        validate_children(NodeKind::Document, &nodes)?;
        Ok(self.replace_nodes(nodes))
    }

    fn check_new_keys(&self, node: &Node, replacing: Option<&Node>) -> ModelResult<()> {
        let mut seen = HashSet::new();
        for key in std::iter::once(node.key()).chain(subtree_keys(node)) {
            if !seen.insert(key) {
                return Err(ModelError::DuplicateKey(key.to_string()));
            }
            let owned_by_replaced =
                replacing.is_some_and(|old| old.key() == key || old.has_descendant(key));
            if (key == self.key || self.has_descendant(key)) && !owned_by_replaced {
                return Err(ModelError::DuplicateKey(key.to_string()));
            }
        }
        Ok(())
    }

    /// Insert `node` as child `index` of `parent`
    pub fn insert_node(&self, parent: &str, index: usize, node: Node) -> ModelResult<Document> {
        self.check_new_keys(&node, None)?;
        if let Some(element) = node.as_element() {
            validate_children(node.kind(), element.nodes())?;
        }
        self.insert_unchecked(parent, index, node)
    }

    fn insert_unchecked(&self, parent: &str, index: usize, node: Node) -> ModelResult<Document> {
        self.update_children(parent, |children| {
            if index > children.len() {
                return Err(ModelError::index_out_of_range(index, children.len()));
            }
            let mut out = children.to_vec();
            out.insert(index, node);
            Ok(out)
        })
    }

    pub fn remove_node(&self, key: &str) -> ModelResult<Document> {
        let (parent, index) = self.parent_of(key)?;
        self.update_children(&parent, |children| {
            let mut out = children.to_vec();
            out.remove(index);
            Ok(out)
        })
    }

    pub fn replace_node(&self, key: &str, node: Node) -> ModelResult<Document> {
        let old = self.assert_descendant(key)?;
        self.check_new_keys(&node, Some(old))?;
        self.update_node(key, |_| Ok(node))
    }

    /// Replace a text node with the result of `f`
    pub fn update_text<F>(&self, key: &str, f: F) -> ModelResult<Document>
    where
        F: FnOnce(&Text) -> ModelResult<Text>,
    {
        self.update_node(key, |node| match node {
            Node::Text(text) => Ok(Node::text(f(text)?)),
            _ => Err(ModelError::NotText(key.to_string())),
        })
    }

    pub fn set_node(&self, key: &str, properties: &NodeProperties) -> ModelResult<Document> {
        self.update_node(key, |node| match node {
            Node::Block(e) => Ok(Node::block(e.with_properties(properties))),
            Node::Inline(e) => Ok(Node::inline(e.with_properties(properties))),
            Node::Text(_) => Err(ModelError::NotElement(key.to_string())),
        })
    }

    /// Merge `key` into its previous sibling, which keeps its own key
    pub fn merge_node(&self, key: &str) -> ModelResult<Document> {
        let (parent, index) = self.parent_of(key)?;
        if index == 0 {
            return Err(ModelError::NoPreviousSibling(key.to_string()));
        }
        self.update_children(&parent, |children| {
            let merged = merge_pair(&children[index - 1], &children[index])?;
            let mut out = children.to_vec();
            out.splice(index - 1..=index, [merged]);
            Ok(out)
        })
    }

    /// Split `key` at `position` (a char offset for texts, a child index for
    /// elements). The first half keeps the key; the second is inserted right
    /// after it as `new_key`, with `properties` applied when given.
    pub fn split_node(
        &self,
        key: &str,
        position: usize,
        new_key: &str,
        properties: Option<&NodeProperties>,
    ) -> ModelResult<Document> {
        if new_key == self.key || self.has_descendant(new_key) {
            return Err(ModelError::DuplicateKey(new_key.to_string()));
        }
        let (parent, index) = self.parent_of(key)?;
        self.update_children(&parent, |children| {
            let (first, second) = split_one(&children[index], position, new_key, properties)?;
            let mut out = children.to_vec();
            out.splice(index..=index, [first, second]);
            Ok(out)
        })
    }

    /// Move `key` to child `index` of `new_parent`. The index is taken
    /// against the parent's children after the node has been removed.
    pub fn move_node(&self, key: &str, new_parent: &str, index: usize) -> ModelResult<Document> {
        if key == self.key {
            return Err(ModelError::RootNotAllowed);
        }
        let node = self.assert_descendant(key)?.clone();
        if new_parent == key || node.has_descendant(new_parent) {
            return Err(ModelError::CycleDetected {
                key: key.to_string(),
                parent: new_parent.to_string(),
            });
        }
        if self.kind_of(new_parent).is_none() {
            return Err(ModelError::key_not_found(new_parent));
        }
        self.remove_node(key)?.insert_unchecked(new_parent, index, node)
    }
}

fn subtree_keys(node: &Node) -> Vec<&str> {
    let mut out = Vec::new();
    let mut stack: Vec<&Node> = node.nodes().iter().rev().collect();
    while let Some(next) = stack.pop() {
        out.push(next.key());
        stack.extend(next.nodes().iter().rev());
    }
    out
}

fn replace_at<F>(nodes: &[Node], path: &[usize], f: F) -> ModelResult<Vec<Node>>
where
    F: FnOnce(&Node) -> ModelResult<Node>,
{
    let (first, rest) = path.split_first().ok_or(ModelError::RootNotAllowed)?;
    let node = nodes
        .get(*first)
        .ok_or_else(|| ModelError::index_out_of_range(*first, nodes.len()))?;
    let replacement = if rest.is_empty() {
        f(node)?
    } else {
        node.with_nodes(replace_at(node.nodes(), rest, f)?)?
    };
    let mut out = nodes.to_vec();
    out[*first] = replacement;
    Ok(out)
}

fn merge_pair(previous: &Node, node: &Node) -> ModelResult<Node> {
    match (previous, node) {
        (Node::Text(a), Node::Text(b)) => Ok(Node::text(a.merge(b))),
        (Node::Block(a), Node::Block(b)) | (Node::Inline(a), Node::Inline(b)) => {
            let mut nodes = a.nodes().to_vec();
            nodes.extend(b.nodes().iter().cloned());
            previous.with_nodes(nodes)
        }
        _ => Err(ModelError::KindMismatch {
            expected: previous.kind().name(),
            found: node.kind().name(),
        }),
    }
}

fn split_one(
    node: &Node,
    position: usize,
    new_key: &str,
    properties: Option<&NodeProperties>,
) -> ModelResult<(Node, Node)> {
    match node {
        Node::Text(text) => {
            let (a, b) = text.split(position, new_key)?;
            Ok((Node::text(a), Node::text(b)))
        }
        Node::Block(element) | Node::Inline(element) => {
            let children = element.nodes();
            if position > children.len() {
                return Err(ModelError::index_out_of_range(position, children.len()));
            }
            let first = element.replace_nodes(children[..position].to_vec());
            let mut second: Element = element.sibling(new_key, children[position..].to_vec());
            if let Some(properties) = properties {
                second = second.with_properties(properties);
            }
            Ok(match node {
                Node::Block(_) => (Node::block(first), Node::block(second)),
                _ => (Node::inline(first), Node::inline(second)),
            })
        }
    }
}
