//! # Surface Tree
//!
//! A read-only, DOM-like picture of what the renderer put on screen.
//!
//! Fixtures and callers describe the tree with the nested [`SurfaceNode`]
//! builder; [`Surface::build`] flattens it into an arena where every node
//! knows its parent. Ids are assigned in pre-order, so document order is
//! id order.
//!
//! ```text
//! SurfaceNode (nested, serde)  →  Surface (arena, parent links)
//!   element "div"                    0: div        parent: -
//!     element "span"                 1: span       parent: 0
//!       text "Hi"                    2: "Hi"       parent: 1
//! ```

use crate::error::{SurfaceError, SurfaceResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Nested surface node, as written in fixtures
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum SurfaceNode {
    Element {
        tag: String,
        #[serde(default)]
        attributes: BTreeMap<String, String>,
        #[serde(default)]
        children: Vec<SurfaceNode>,
    },

    Text { content: String },

    Comment { content: String },
}

impl SurfaceNode {
    pub fn element(tag: impl Into<String>) -> Self {
        SurfaceNode::Element {
            tag: tag.into(),
            attributes: BTreeMap::new(),
            children: Vec::new(),
        }
    }

    pub fn text(content: impl Into<String>) -> Self {
        SurfaceNode::Text {
            content: content.into(),
        }
    }

    pub fn comment(content: impl Into<String>) -> Self {
        SurfaceNode::Comment {
            content: content.into(),
        }
    }

    pub fn with_attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        if let SurfaceNode::Element {
            ref mut attributes, ..
        } = self
        {
            attributes.insert(name.into(), value.into());
        }
        self
    }

    pub fn with_child(mut self, child: SurfaceNode) -> Self {
        if let SurfaceNode::Element {
            ref mut children, ..
        } = self
        {
            children.push(child);
        }
        self
    }

    pub fn with_children(mut self, new_children: Vec<SurfaceNode>) -> Self {
        if let SurfaceNode::Element {
            ref mut children, ..
        } = self
        {
            children.extend(new_children);
        }
        self
    }
}

/// Index of a node inside a [`Surface`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SurfaceNodeId(usize);

impl SurfaceNodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// What a surface node holds, without its children
#[derive(Debug, Clone, PartialEq)]
pub enum SurfaceData {
    Element {
        tag: String,
        attributes: BTreeMap<String, String>,
    },
    Text(String),
    Comment(String),
}

#[derive(Debug, Clone)]
struct Slot {
    data: SurfaceData,
    parent: Option<SurfaceNodeId>,
    children: Vec<SurfaceNodeId>,
}

/// Flattened surface tree with parent links
#[derive(Debug, Clone)]
pub struct Surface {
    slots: Vec<Slot>,
}

impl Surface {
    pub fn build(root: &SurfaceNode) -> Self {
        let mut surface = Surface { slots: Vec::new() };
        surface.push(root, None);
        surface
    }

    fn push(&mut self, node: &SurfaceNode, parent: Option<SurfaceNodeId>) -> SurfaceNodeId {
        let id = SurfaceNodeId(self.slots.len());
        let (data, children) = match node {
            SurfaceNode::Element {
                tag,
                attributes,
                children,
            } => (
                SurfaceData::Element {
                    tag: tag.clone(),
                    attributes: attributes.clone(),
                },
                children.as_slice(),
            ),
            SurfaceNode::Text { content } => (SurfaceData::Text(content.clone()), &[][..]),
            SurfaceNode::Comment { content } => (SurfaceData::Comment(content.clone()), &[][..]),
        };
        self.slots.push(Slot {
            data,
            parent,
            children: Vec::with_capacity(children.len()),
        });
        for child in children {
            let child_id = self.push(child, Some(id));
            self.slots[id.0].children.push(child_id);
        }
        id
    }

    pub fn root(&self) -> SurfaceNodeId {
        SurfaceNodeId(0)
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Always false: a surface holds at least its root
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn contains(&self, id: SurfaceNodeId) -> bool {
        id.0 < self.slots.len()
    }

    pub fn data(&self, id: SurfaceNodeId) -> Option<&SurfaceData> {
        self.slots.get(id.0).map(|slot| &slot.data)
    }

    pub fn parent(&self, id: SurfaceNodeId) -> Option<SurfaceNodeId> {
        self.slots.get(id.0).and_then(|slot| slot.parent)
    }

    pub fn children(&self, id: SurfaceNodeId) -> &[SurfaceNodeId] {
        self.slots
            .get(id.0)
            .map(|slot| slot.children.as_slice())
            .unwrap_or(&[])
    }

    pub fn is_element(&self, id: SurfaceNodeId) -> bool {
        matches!(self.data(id), Some(SurfaceData::Element { .. }))
    }

    pub fn is_text(&self, id: SurfaceNodeId) -> bool {
        matches!(self.data(id), Some(SurfaceData::Text(_)))
    }

    pub fn is_comment(&self, id: SurfaceNodeId) -> bool {
        matches!(self.data(id), Some(SurfaceData::Comment(_)))
    }

    pub fn attribute(&self, id: SurfaceNodeId, name: &str) -> Option<&str> {
        match self.data(id)? {
            SurfaceData::Element { attributes, .. } => attributes.get(name).map(String::as_str),
            _ => None,
        }
    }

    pub fn has_attribute(&self, id: SurfaceNodeId, name: &str) -> bool {
        self.attribute(id, name).is_some()
    }

    /// Descendants of `id` in document order, excluding `id` itself
    pub fn descendants(&self, id: SurfaceNodeId) -> Vec<SurfaceNodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<SurfaceNodeId> = self.children(id).iter().rev().copied().collect();
        while let Some(next) = stack.pop() {
            out.push(next);
            stack.extend(self.children(next).iter().rev().copied());
        }
        out
    }

    pub fn is_descendant_of(&self, id: SurfaceNodeId, ancestor: SurfaceNodeId) -> bool {
        let mut current = self.parent(id);
        while let Some(node) = current {
            if node == ancestor {
                return true;
            }
            current = self.parent(node);
        }
        false
    }

    /// Nearest node matching `predicate`, starting at `id` and walking up
    pub fn closest(&self, id: SurfaceNodeId, predicate: impl Fn(SurfaceNodeId) -> bool) -> Option<SurfaceNodeId> {
        let mut current = self.contains(id).then_some(id);
        while let Some(node) = current {
            if predicate(node) {
                return Some(node);
            }
            current = self.parent(node);
        }
        None
    }

    /// First descendant of `id` matching `predicate`
    pub fn query(&self, id: SurfaceNodeId, predicate: impl Fn(SurfaceNodeId) -> bool) -> Option<SurfaceNodeId> {
        self.descendants(id).into_iter().find(|node| predicate(*node))
    }

    pub fn query_all(&self, id: SurfaceNodeId, predicate: impl Fn(SurfaceNodeId) -> bool) -> Vec<SurfaceNodeId> {
        self.descendants(id).into_iter().filter(|node| predicate(*node)).collect()
    }

    /// Character length of the text under `id` (comments excluded)
    pub fn text_len(&self, id: SurfaceNodeId) -> usize {
        match self.data(id) {
            Some(SurfaceData::Text(content)) => content.chars().count(),
            Some(SurfaceData::Element { .. }) => self
                .descendants(id)
                .into_iter()
                .map(|node| match self.data(node) {
                    Some(SurfaceData::Text(content)) => content.chars().count(),
                    _ => 0,
                })
                .sum(),
            _ => 0,
        }
    }

    pub fn text_content(&self, id: SurfaceNodeId) -> String {
        match self.data(id) {
            Some(SurfaceData::Text(content)) => content.clone(),
            Some(SurfaceData::Element { .. }) => self
                .descendants(id)
                .into_iter()
                .filter_map(|node| match self.data(node) {
                    Some(SurfaceData::Text(content)) => Some(content.as_str()),
                    _ => None,
                })
                .collect(),
            _ => String::new(),
        }
    }

    /// Characters of text under `container` that come before `node` in
    /// document order. `None` when `node` is not inside `container`.
    pub fn chars_before(&self, container: SurfaceNodeId, node: SurfaceNodeId) -> Option<usize> {
        if container != node && !self.is_descendant_of(node, container) {
            return None;
        }
        Some(
            self.descendants(container)
                .into_iter()
                .take_while(|d| *d < node)
                .map(|d| match self.data(d) {
                    Some(SurfaceData::Text(content)) => content.chars().count(),
                    _ => 0,
                })
                .sum(),
        )
    }

    /// Follow child indexes from the root
    fn node_at_path(&self, path: &[usize]) -> Option<SurfaceNodeId> {
        path.iter()
            .try_fold(self.root(), |node, index| self.children(node).get(*index).copied())
    }

    /// Parse a dotted child-index path such as `0.2.1` (empty = root)
    pub fn resolve_path(&self, path: &str) -> SurfaceResult<SurfaceNodeId> {
        let not_found = || SurfaceError::PathNotFound(path.to_string());
        let trimmed = path.trim();
        let indexes = if trimmed.is_empty() {
            Vec::new()
        } else {
            trimmed
                .split('.')
                .map(|part| part.parse::<usize>().map_err(|_| not_found()))
                .collect::<SurfaceResult<Vec<_>>>()?
        };
        self.node_at_path(&indexes).ok_or_else(not_found)
    }
}

impl From<&SurfaceNode> for Surface {
    fn from(root: &SurfaceNode) -> Self {
        Surface::build(root)
    }
}

impl From<SurfaceNode> for Surface {
    fn from(root: SurfaceNode) -> Self {
        Surface::build(&root)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn surface() -> Surface {
        Surface::build(
            &SurfaceNode::element("div")
                .with_attr("id", "root")
                .with_child(
                    SurfaceNode::element("p")
                        .with_child(SurfaceNode::text("Héllo"))
                        .with_child(SurfaceNode::comment("x")),
                )
                .with_child(SurfaceNode::element("p").with_child(SurfaceNode::text("world"))),
        )
    }

    #[test]
    fn test_build_assigns_preorder_ids() {
        let s = surface();
        assert_eq!(s.len(), 6);
        let ids: Vec<usize> = s.descendants(s.root()).iter().map(|id| id.index()).collect();
        assert_eq!(ids, vec![1, 2, 3, 4, 5]);
        assert_eq!(s.parent(SurfaceNodeId(5)), Some(SurfaceNodeId(4)));
        assert_eq!(s.parent(s.root()), None);
    }

    #[test]
    fn test_text_lengths_count_chars() {
        let s = surface();
        assert_eq!(s.text_len(s.root()), 10);
        assert_eq!(s.text_content(s.root()), "Hélloworld");
        assert_eq!(s.chars_before(s.root(), SurfaceNodeId(5)), Some(5));
        assert_eq!(s.chars_before(SurfaceNodeId(1), SurfaceNodeId(5)), None);
    }

    #[test]
    fn test_closest_and_query() {
        let s = surface();
        let text = SurfaceNodeId(2);
        assert_eq!(s.closest(text, |id| s.has_attribute(id, "id")), Some(s.root()));
        assert_eq!(s.query(s.root(), |id| s.is_comment(id)), Some(SurfaceNodeId(3)));
        let is_p = |id: SurfaceNodeId| matches!(s.data(id), Some(SurfaceData::Element { tag, .. }) if tag == "p");
        assert_eq!(s.query_all(s.root(), is_p).len(), 2);
    }

    #[test]
    fn test_resolve_path() {
        let s = surface();
        assert_eq!(s.resolve_path("").unwrap(), s.root());
        assert_eq!(s.resolve_path("1.0").unwrap(), SurfaceNodeId(5));
        assert_eq!(s.resolve_path("1.4"), Err(SurfaceError::PathNotFound("1.4".into())));
        assert!(s.resolve_path("a").is_err());
    }
}
