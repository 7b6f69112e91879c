//! # Change
//!
//! Generic editing commands built from primitive operations. A `Change`
//! works on its own copy of a value: every command applies its operations
//! immediately, so later commands see earlier results, and the collected
//! operations are handed back to the [`Editor`](crate::Editor) to be applied
//! and recorded as one history batch.

use crate::errors::{EditorError, EditorResult};
use crate::normalize::fresh_key;
use crate::operation::Operation;
use folio_model::{
    Element, KeyGenerator, Mark, Node, NodeProperties, Point, Range, Text, Value,
};
use tracing::trace;

#[derive(Debug)]
pub struct Change<'k> {
    value: Value,
    operations: Vec<Operation>,
    keys: &'k KeyGenerator,
    description: Option<String>,
}

impl<'k> Change<'k> {
    pub fn new(value: Value, keys: &'k KeyGenerator) -> Self {
        Self {
            value,
            operations: Vec::new(),
            keys,
            description: None,
        }
    }

    /// The working value, with every operation so far applied
    pub fn value(&self) -> &Value {
        &self.value
    }

    pub fn operations(&self) -> &[Operation] {
        &self.operations
    }

    pub fn describe(&mut self, description: impl Into<String>) -> &mut Self {
        self.description = Some(description.into());
        self
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn into_operations(self) -> Vec<Operation> {
        self.operations
    }

    /// Apply an operation to the working value and record it
    pub fn apply(&mut self, operation: Operation) -> EditorResult<&mut Self> {
        trace!(operation = operation.name(), "Change step");
        self.value = operation.apply(&self.value)?;
        self.operations.push(operation);
        Ok(self)
    }

    fn new_key(&self) -> String {
        fresh_key(self.value.document(), self.keys)
    }

    fn resolve(&self, point: &Point) -> EditorResult<Point> {
        point
            .normalize(self.value.document())
            .ok_or_else(|| folio_model::ModelError::key_not_found(point.key.clone()).into())
    }

    fn resolve_range(&self, range: &Range) -> EditorResult<Range> {
        range
            .normalize(self.value.document())
            .ok_or_else(|| folio_model::ModelError::key_not_found(range.anchor.key.clone()).into())
    }

    fn selection(&self) -> EditorResult<Range> {
        self.value
            .selection()
            .cloned()
            .ok_or_else(|| EditorError::InvalidStructure("value has no selection".to_string()))
    }

    // ------------------------------------------------------------------
    // Text
    // ------------------------------------------------------------------

    pub fn insert_text_at(&mut self, point: &Point, text: &str) -> EditorResult<&mut Self> {
        let point = self.resolve(point)?;
        self.apply(Operation::InsertText {
            key: point.key,
            offset: point.offset,
            text: text.to_string(),
            marks: None,
        })
    }

    /// Replace the selection with `text`
    pub fn insert_text(&mut self, text: &str) -> EditorResult<&mut Self> {
        let selection = self.selection()?;
        if selection.is_expanded() {
            self.delete_range(&selection)?;
        }
        let at = self.selection()?.start().clone();
        self.insert_text_at(&at, text)
    }

    /// Delete the content of `range`. Supported shapes: within one text,
    /// within one block, and across sibling blocks, which are merged.
    pub fn delete_range(&mut self, range: &Range) -> EditorResult<&mut Self> {
        let range = self.resolve_range(range)?;
        if range.is_collapsed() {
            return Ok(self);
        }
        let start = range.start().clone();
        let end = range.end().clone();

        if start.key == end.key {
            return self.apply(Operation::RemoveText {
                key: start.key,
                offset: start.offset,
                length: end.offset - start.offset,
            });
        }

        let document = self.value.document();
        let start_block = closest_block_key(&self.value, &start.key)?;
        let end_block = closest_block_key(&self.value, &end.key)?;

        let mut ops = Vec::new();
        let texts = document.texts();
        let start_index = text_index(&texts, &start.key)?;
        let end_index = text_index(&texts, &end.key)?;

        let start_len = texts[start_index].len();
        if start.offset < start_len {
            ops.push(Operation::RemoveText {
                key: start.key.clone(),
                offset: start.offset,
                length: start_len - start.offset,
            });
        }
        for text in &texts[start_index + 1..end_index] {
            let block = closest_block_key(&self.value, text.key())?;
            if !text.is_empty() && (block == start_block || block == end_block) {
                ops.push(Operation::RemoveText {
                    key: text.key().to_string(),
                    offset: 0,
                    length: text.len(),
                });
            }
        }
        if end.offset > 0 {
            ops.push(Operation::RemoveText {
                key: end.key.clone(),
                offset: 0,
                length: end.offset,
            });
        }

        if start_block != end_block {
            let (start_parent, start_pos) = document.parent_of(&start_block)?;
            let (end_parent, end_pos) = document.parent_of(&end_block)?;
            if start_parent != end_parent {
                return Err(EditorError::InvalidStructure(format!(
                    "cannot delete across `{start_block}` and `{end_block}`: blocks are not siblings"
                )));
            }
            let siblings = document.children_of(&start_parent)?;
            for between in &siblings[start_pos + 1..end_pos] {
                ops.push(Operation::RemoveNode {
                    key: between.key().to_string(),
                });
            }
            ops.push(Operation::MergeNode { key: end_block });
        }

        for op in ops {
            self.apply(op)?;
        }
        Ok(self)
    }

    /// Delete the selection and collapse it to its start
    pub fn delete_selection(&mut self) -> EditorResult<&mut Self> {
        let selection = self.selection()?;
        let start = selection.start().clone();
        self.delete_range(&selection)?;
        let start = start.normalize(self.value.document()).unwrap_or(start);
        self.select(&Range::collapsed(start).focused(selection.is_focused))
    }

    // ------------------------------------------------------------------
    // Marks
    // ------------------------------------------------------------------

    pub fn add_mark_in_range(&mut self, range: &Range, mark: &Mark) -> EditorResult<&mut Self> {
        for (key, offset, length) in self.text_spans(range)? {
            self.apply(Operation::AddMark {
                key,
                offset,
                length,
                mark: mark.clone(),
            })?;
        }
        Ok(self)
    }

    pub fn remove_mark_in_range(&mut self, range: &Range, mark: &Mark) -> EditorResult<&mut Self> {
        for (key, offset, length) in self.text_spans(range)? {
            self.apply(Operation::RemoveMark {
                key,
                offset,
                length,
                mark: mark.clone(),
            })?;
        }
        Ok(self)
    }

    /// Non-empty `(key, offset, length)` spans of every text the range covers
    fn text_spans(&self, range: &Range) -> EditorResult<Vec<(String, usize, usize)>> {
        let range = self.resolve_range(range)?;
        let (start, end) = (range.start(), range.end());
        let texts = self.value.document().texts();
        let first = text_index(&texts, &start.key)?;
        let last = text_index(&texts, &end.key)?;
        Ok(texts[first..=last]
            .iter()
            .filter_map(|text| {
                let from = if text.key() == start.key { start.offset } else { 0 };
                let to = if text.key() == end.key { end.offset } else { text.len() };
                (to > from).then(|| (text.key().to_string(), from, to - from))
            })
            .collect())
    }

    // ------------------------------------------------------------------
    // Blocks
    // ------------------------------------------------------------------

    /// Split the text at `point` and every ancestor up to its closest block.
    /// Returns the key of the new block.
    pub fn split_block_at(&mut self, point: &Point) -> EditorResult<String> {
        let point = self.resolve(point)?;
        let block = closest_block_key(&self.value, &point.key)?;

        let mut new_key = self.new_key();
        self.apply(Operation::SplitNode {
            key: point.key.clone(),
            position: point.offset,
            new_key: new_key.clone(),
            properties: None,
        })?;

        let mut child = point.key;
        while child != block {
            let document = self.value.document();
            let (parent, index) = document.parent_of(&child)?;
            let next_key = self.new_key();
            self.apply(Operation::SplitNode {
                key: parent.clone(),
                position: index + 1,
                new_key: next_key.clone(),
                properties: None,
            })?;
            child = parent;
            new_key = next_key;
        }
        Ok(new_key)
    }

    /// Wrap the block `key` in a new block of `node_type`
    pub fn wrap_block(&mut self, key: &str, node_type: &str) -> EditorResult<String> {
        let document = self.value.document();
        if !document.assert_descendant(key)?.is_block() {
            return Err(EditorError::InvalidStructure(format!("`{key}` is not a block")));
        }
        let (parent, index) = document.parent_of(key)?;
        let wrapper_key = self.new_key();
        self.apply(Operation::InsertNode {
            parent,
            index,
            node: Node::block(Element::new(wrapper_key.clone(), node_type)),
        })?;
        self.apply(Operation::MoveNode {
            key: key.to_string(),
            new_parent: wrapper_key.clone(),
            index: 0,
        })?;
        Ok(wrapper_key)
    }

    /// Replace the block `key` with its children
    pub fn unwrap_block(&mut self, key: &str) -> EditorResult<&mut Self> {
        let document = self.value.document();
        let node = document.assert_descendant(key)?;
        if !node.is_block() {
            return Err(EditorError::InvalidStructure(format!("`{key}` is not a block")));
        }
        let children: Vec<String> = node.nodes().iter().map(|n| n.key().to_string()).collect();
        let (parent, index) = document.parent_of(key)?;
        for (offset, child) in children.into_iter().enumerate() {
            self.apply(Operation::MoveNode {
                key: child,
                new_parent: parent.clone(),
                index: index + 1 + offset,
            })?;
        }
        self.apply(Operation::RemoveNode { key: key.to_string() })
    }

    pub fn set_block(&mut self, key: &str, properties: NodeProperties) -> EditorResult<&mut Self> {
        self.apply(Operation::SetNode {
            key: key.to_string(),
            properties,
        })
    }

    pub fn insert_node(&mut self, parent: &str, index: usize, node: Node) -> EditorResult<&mut Self> {
        self.apply(Operation::InsertNode {
            parent: parent.to_string(),
            index,
            node,
        })
    }

    pub fn remove_node(&mut self, key: &str) -> EditorResult<&mut Self> {
        self.apply(Operation::RemoveNode { key: key.to_string() })
    }

    /// Insert an empty paragraph-like block of `node_type` at `index` of `parent`
    pub fn insert_block(&mut self, parent: &str, index: usize, node_type: &str) -> EditorResult<String> {
        let key = self.new_key();
        let text_key = self.new_key();
        let block = Element::new(key.clone(), node_type).with_child(Node::text(Text::empty(text_key)));
        self.insert_node(parent, index, Node::block(block))?;
        Ok(key)
    }

    // ------------------------------------------------------------------
    // Selection
    // ------------------------------------------------------------------

    pub fn select(&mut self, range: &Range) -> EditorResult<&mut Self> {
        let range = self.resolve_range(range)?;
        self.apply(Operation::SetSelection {
            selection: Some(range),
        })
    }

    pub fn deselect(&mut self) -> EditorResult<&mut Self> {
        self.apply(Operation::SetSelection { selection: None })
    }
}

fn closest_block_key(value: &Value, key: &str) -> EditorResult<String> {
    value
        .document()
        .closest_block(key)
        .map(|node| node.key().to_string())
        .ok_or_else(|| EditorError::InvalidStructure(format!("`{key}` is not inside a block")))
}

fn text_index(texts: &[&Text], key: &str) -> EditorResult<usize> {
    texts
        .iter()
        .position(|t| t.key() == key)
        .ok_or_else(|| folio_model::ModelError::NotText(key.to_string()).into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use folio_model::{Document, Leaves};

    fn keys() -> KeyGenerator {
        KeyGenerator::from_seed("c".to_string())
    }

    fn value() -> Value {
        let block = |key: &str, texts: &[(&str, &str)]| {
            Node::block(texts.iter().fold(Element::new(key, "paragraph"), |e, (k, t)| {
                e.with_child(Node::text(Text::new(*k, Leaves::plain(*t))))
            }))
        };
        Value::new(
            Document::new(
                "doc",
                vec![
                    block("b1", &[("t1", "Hello")]),
                    block("b2", &[("t2", "big")]),
                    block("b3", &[("t3", "World")]),
                ],
            )
            .unwrap(),
        )
    }

    #[test]
    fn test_delete_across_sibling_blocks_merges() {
        let keys = keys();
        let mut change = Change::new(value(), &keys);
        change
            .delete_range(&Range::new(Point::new("t1", 2), Point::new("t3", 3)))
            .unwrap();
        let doc = change.value().document();
        assert_eq!(doc.nodes().len(), 1);
        assert_eq!(doc.text(), "Held");
        assert!(!doc.has_descendant("b2"));
    }

    #[test]
    fn test_delete_within_text() {
        let keys = keys();
        let mut change = Change::new(value(), &keys);
        change
            .delete_range(&Range::new(Point::new("t1", 4), Point::new("t1", 1)))
            .unwrap();
        assert_eq!(change.value().document().text(), "HobigWorld");
        assert_eq!(change.operations().len(), 1);
    }

    #[test]
    fn test_split_block_at() {
        let keys = keys();
        let mut change = Change::new(value(), &keys);
        let new_block = change.split_block_at(&Point::new("t1", 2)).unwrap();
        let doc = change.value().document();
        assert_eq!(doc.nodes().len(), 4);
        assert_eq!(doc.get_descendant(&new_block).unwrap().text_content(), "llo");
        assert_eq!(doc.get_descendant("b1").unwrap().text_content(), "He");
    }

    #[test]
    fn test_wrap_and_unwrap() {
        let keys = keys();
        let mut change = Change::new(value(), &keys);
        let wrapper = change.wrap_block("b2", "quote").unwrap();
        {
            let doc = change.value().document();
            assert_eq!(doc.parent_of("b2").unwrap(), (wrapper.clone(), 0));
            assert_eq!(doc.nodes()[1].key(), wrapper);
        }
        change.unwrap_block(&wrapper).unwrap();
        let doc = change.value().document();
        assert_eq!(doc.parent_of("b2").unwrap(), ("doc".to_string(), 1));
        assert!(!doc.has_descendant(&wrapper));
    }

    #[test]
    fn test_add_mark_across_texts() {
        let keys = keys();
        let mut change = Change::new(value(), &keys);
        let bold = Mark::new("bold");
        change
            .add_mark_in_range(&Range::new(Point::new("t1", 3), Point::new("t3", 2)), &bold)
            .unwrap();
        assert_eq!(change.operations().len(), 3);
        let doc = change.value().document();
        assert!(doc.assert_text("t2").unwrap().marks_at(1).contains(&bold));
        assert!(!doc.assert_text("t3").unwrap().marks_at(3).contains(&bold));
    }

    #[test]
    fn test_delete_across_nested_blocks_is_rejected() {
        let keys = keys();
        let mut change = Change::new(value(), &keys);
        change.wrap_block("b3", "quote").unwrap();
        let err = change
            .delete_range(&Range::new(Point::new("t1", 1), Point::new("t3", 1)))
            .unwrap_err();
        assert!(matches!(err, EditorError::InvalidStructure(_)));
    }
}
