//! Selection transforms
//!
//! Carries selection points across a single operation. The points produced
//! here may still name removed keys; [`Operation::apply`] finishes with a
//! path-hinted normalization against the new document.
//!
//! [`Operation::apply`]: crate::Operation::apply

use crate::operation::Operation;
use folio_model::{Document, Node, Path, Point, Range};

/// Path of the point's key before the edit, used to re-anchor it if the key
/// disappears
pub(crate) fn point_hint(document: &Document, point: &Point) -> Path {
    document.find_path(&point.key).unwrap_or_default()
}

pub(crate) fn transform_range(operation: &Operation, before: &Document, range: &Range) -> Range {
    range.move_to(
        transform_point(operation, before, &range.anchor),
        transform_point(operation, before, &range.focus),
    )
}

pub(crate) fn transform_point(operation: &Operation, before: &Document, point: &Point) -> Point {
    match operation {
        Operation::InsertText {
            key, offset, text, ..
        } if point.key == *key && point.offset >= *offset => {
            point.with_offset(point.offset + text.chars().count())
        }

        Operation::RemoveText { key, offset, length } if point.key == *key => {
            if point.offset >= offset.saturating_add(*length) {
                point.with_offset(point.offset - length)
            } else if point.offset > *offset {
                point.with_offset(*offset)
            } else {
                point.clone()
            }
        }

        Operation::MergeNode { key } if point.key == *key => {
            // Only a text merge moves the point; element merges keep keys.
            let previous = before
                .parent_of(key)
                .ok()
                .and_then(|(parent, index)| {
                    let siblings = before.children_of(&parent).ok()?;
                    siblings.get(index.checked_sub(1)?).cloned()
                });
            match previous {
                Some(Node::Text(text)) => Point::new(text.key(), text.len() + point.offset),
                _ => point.clone(),
            }
        }

        Operation::SplitNode {
            key,
            position,
            new_key,
            ..
        } if point.key == *key && point.offset >= *position => {
            match before.get_descendant(key) {
                Some(Node::Text(_)) => Point::new(new_key.clone(), point.offset - position),
                _ => point.clone(),
            }
        }

        Operation::RemoveNode { key } if point.key == *key || before.is_descendant_of(&point.key, key) => {
            if let Some(text) = before.previous_text(key) {
                Point::new(text.key(), text.len())
            } else if let Some(text) = before.next_text(key) {
                Point::new(text.key(), 0)
            } else {
                point.clone()
            }
        }

        _ => point.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use folio_model::{Element, Leaves, Text};

    fn document() -> Document {
        let block = |key: &str, texts: &[(&str, &str)]| {
            Node::block(texts.iter().fold(Element::new(key, "paragraph"), |e, (k, t)| {
                e.with_child(Node::text(Text::new(*k, Leaves::plain(*t))))
            }))
        };
        Document::new(
            "doc",
            vec![
                block("b1", &[("t1", "abc")]),
                block("b2", &[("t2", "de"), ("t3", "fgh")]),
                block("b3", &[("t4", "ij")]),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_remove_text_pulls_points_back() {
        let doc = document();
        let op = Operation::RemoveText {
            key: "t3".into(),
            offset: 1,
            length: 1,
        };
        assert_eq!(transform_point(&op, &doc, &Point::new("t3", 3)), Point::new("t3", 2));
        assert_eq!(transform_point(&op, &doc, &Point::new("t3", 2)), Point::new("t3", 1));
        assert_eq!(transform_point(&op, &doc, &Point::new("t3", 1)), Point::new("t3", 1));
    }

    #[test]
    fn test_text_merge_moves_point_to_previous() {
        let doc = document();
        let op = Operation::MergeNode { key: "t3".into() };
        assert_eq!(transform_point(&op, &doc, &Point::new("t3", 1)), Point::new("t2", 3));
    }

    #[test]
    fn test_text_split_moves_trailing_points() {
        let doc = document();
        let op = Operation::SplitNode {
            key: "t3".into(),
            position: 1,
            new_key: "t9".into(),
            properties: None,
        };
        assert_eq!(transform_point(&op, &doc, &Point::new("t3", 2)), Point::new("t9", 1));
        assert_eq!(transform_point(&op, &doc, &Point::new("t3", 0)), Point::new("t3", 0));
    }

    #[test]
    fn test_remove_node_reanchors() {
        let doc = document();
        let op = Operation::RemoveNode { key: "b2".into() };
        assert_eq!(transform_point(&op, &doc, &Point::new("t3", 1)), Point::new("t1", 3));

        let op = Operation::RemoveNode { key: "b1".into() };
        assert_eq!(transform_point(&op, &doc, &Point::new("t1", 1)), Point::new("t2", 0));
    }
}
