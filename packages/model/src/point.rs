use crate::document::Document;
use crate::node::{Node, Path};
use crate::text::Text;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// A position in the document: a node key and a char offset.
///
/// Points hold keys only. Whether the key still names a text node is
/// re-checked by [`Point::normalize`] every time the point is used.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Point {
    pub key: String,
    #[serde(default)]
    pub offset: usize,
}

impl Point {
    pub fn new(key: impl Into<String>, offset: usize) -> Self {
        Self {
            key: key.into(),
            offset,
        }
    }

    pub fn start_of(document: &Document) -> Option<Point> {
        document.first_text().map(|t| Point::new(t.key(), 0))
    }

    pub fn end_of(document: &Document) -> Option<Point> {
        document.last_text().map(|t| Point::new(t.key(), t.len()))
    }

    pub fn with_offset(&self, offset: usize) -> Point {
        Point::new(self.key.clone(), offset)
    }

    /// Resolve against `document`: a text key has its offset clamped, an
    /// element key is mapped to the descendant text holding the offset, and
    /// a missing key yields `None`.
    pub fn normalize(&self, document: &Document) -> Option<Point> {
        if self.key == document.key() {
            return document
                .text_at_offset(self.offset)
                .map(|(text, local)| Point::new(text.key(), local));
        }
        match document.get_descendant(&self.key)? {
            Node::Text(text) => Some(self.with_offset(self.offset.min(text.len()))),
            node => node
                .text_at_offset(self.offset)
                .map(|(text, local)| Point::new(text.key(), local)),
        }
    }

    /// Like [`Point::normalize`], but a missing key is re-anchored using
    /// `hint`, the path the key had before the tree changed: the last text
    /// ordered before that path (at its end), else the document start.
    pub fn normalize_with_hint(&self, document: &Document, hint: &[usize]) -> Option<Point> {
        if let Some(point) = self.normalize(document) {
            return Some(point);
        }
        let texts = text_paths(document);
        texts
            .iter()
            .rev()
            .find(|(path, _)| path.as_slice() < hint)
            .map(|(_, text)| Point::new(text.key(), text.len()))
            .or_else(|| texts.first().map(|(_, text)| Point::new(text.key(), 0)))
    }

    /// Document order of two points; `None` when either key is missing
    pub fn compare(&self, other: &Point, document: &Document) -> Option<Ordering> {
        let a = document.find_path(&self.key)?;
        let b = document.find_path(&other.key)?;
        Some(a.cmp(&b).then(self.offset.cmp(&other.offset)))
    }

    pub fn is_before(&self, other: &Point, document: &Document) -> bool {
        self.compare(other, document) == Some(Ordering::Less)
    }
}

/// Every text with its path, in document order
pub(crate) fn text_paths(document: &Document) -> Vec<(Path, &Text)> {
    fn walk<'a>(nodes: &'a [Node], prefix: &mut Path, out: &mut Vec<(Path, &'a Text)>) {
        for (i, node) in nodes.iter().enumerate() {
            prefix.push(i);
            match node {
                Node::Text(text) => out.push((prefix.clone(), text)),
                _ => walk(node.nodes(), prefix, out),
            }
            prefix.pop();
        }
    }
    let mut out = Vec::new();
    walk(document.nodes(), &mut Vec::new(), &mut out);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::leaf::Leaves;
    use crate::node::Element;

    fn document() -> Document {
        let block = |key: &str, texts: &[(&str, &str)]| {
            Node::block(texts.iter().fold(Element::new(key, "paragraph"), |e, (k, t)| {
                e.with_child(Node::text(Text::new(*k, Leaves::plain(*t))))
            }))
        };
        Document::new(
            "doc",
            vec![block("b1", &[("t1", "abc")]), block("b2", &[("t2", "de"), ("t3", "fgh")])],
        )
        .unwrap()
    }

    #[test]
    fn test_normalize_clamps_offset() {
        let doc = document();
        assert_eq!(Point::new("t1", 10).normalize(&doc), Some(Point::new("t1", 3)));
    }

    #[test]
    fn test_normalize_maps_element_key_to_text() {
        let doc = document();
        assert_eq!(Point::new("b2", 3).normalize(&doc), Some(Point::new("t3", 1)));
        assert_eq!(Point::new("doc", 4).normalize(&doc), Some(Point::new("t2", 1)));
    }

    #[test]
    fn test_normalize_missing_key() {
        let doc = document();
        assert_eq!(Point::new("gone", 1).normalize(&doc), None);
        assert_eq!(
            Point::new("gone", 1).normalize_with_hint(&doc, &[1, 1]),
            Some(Point::new("t2", 2))
        );
        assert_eq!(
            Point::new("gone", 1).normalize_with_hint(&doc, &[0]),
            Some(Point::new("t1", 0))
        );
    }

    #[test]
    fn test_compare_uses_document_order() {
        let doc = document();
        assert!(Point::new("t1", 3).is_before(&Point::new("t2", 0), &doc));
        assert!(Point::new("t3", 0).is_before(&Point::new("t3", 1), &doc));
        assert_eq!(Point::new("x", 0).compare(&Point::new("t1", 0), &doc), None);
    }
}
