//! # Operations
//!
//! The closed set of primitive edits. Every change to a [`Value`] goes
//! through one of these.
//!
//! ## Semantics
//!
//! 1. **Validated**: an operation is checked against the current tree before
//!    anything is built; a rejected operation leaves the value untouched
//! 2. **Pure**: `apply` returns a new value and never mutates its input
//! 3. **Invertible**: `invert`, computed against the value the operation is
//!    about to be applied to, yields operations that restore it
//! 4. **Selection-safe**: the selection is carried through the edit and
//!    re-normalized before the new value is returned
//!
//! ## Wire format
//!
//! Operations serialize tagged by `type`:
//!
//! ```json
//! { "type": "insert_text", "key": "t1", "offset": 0, "text": "Hi" }
//! { "type": "split_node", "key": "t1", "position": 2, "new_key": "t9" }
//! ```

use crate::errors::OperationError;
use crate::transform::{point_hint, transform_range};
use folio_model::{
    Document, Mark, MarkProperties, MarkSet, ModelError, ModelResult, Node, NodeProperties, Range,
    Text, Value,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Operation {
    /// Insert text into a text node. Without `marks` the text inherits the
    /// marks of the character before `offset`.
    InsertText {
        key: String,
        offset: usize,
        text: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        marks: Option<MarkSet>,
    },

    RemoveText {
        key: String,
        offset: usize,
        length: usize,
    },

    /// Insert a node (and its subtree) as child `index` of `parent`
    InsertNode {
        parent: String,
        index: usize,
        node: Node,
    },

    RemoveNode {
        key: String,
    },

    /// Merge a node into its previous sibling
    MergeNode {
        key: String,
    },

    /// Split a node at `position` (char offset for texts, child index for
    /// elements); the second half becomes `new_key`
    SplitNode {
        key: String,
        position: usize,
        new_key: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        properties: Option<NodeProperties>,
    },

    /// Move a node to child `index` of `new_parent`, the index counted after
    /// the node has left its old position
    MoveNode {
        key: String,
        new_parent: String,
        index: usize,
    },

    AddMark {
        key: String,
        offset: usize,
        length: usize,
        mark: Mark,
    },

    RemoveMark {
        key: String,
        offset: usize,
        length: usize,
        mark: Mark,
    },

    /// Update the mark of `mark`'s type on a range of a text
    SetMark {
        key: String,
        offset: usize,
        length: usize,
        mark: Mark,
        properties: MarkProperties,
    },

    SetNode {
        key: String,
        properties: NodeProperties,
    },

    SetSelection {
        selection: Option<Range>,
    },
}

impl Operation {
    pub fn name(&self) -> &'static str {
        match self {
            Operation::InsertText { .. } => "insert_text",
            Operation::RemoveText { .. } => "remove_text",
            Operation::InsertNode { .. } => "insert_node",
            Operation::RemoveNode { .. } => "remove_node",
            Operation::MergeNode { .. } => "merge_node",
            Operation::SplitNode { .. } => "split_node",
            Operation::MoveNode { .. } => "move_node",
            Operation::AddMark { .. } => "add_mark",
            Operation::RemoveMark { .. } => "remove_mark",
            Operation::SetMark { .. } => "set_mark",
            Operation::SetNode { .. } => "set_node",
            Operation::SetSelection { .. } => "set_selection",
        }
    }

    fn error(&self, cause: ModelError) -> OperationError {
        OperationError::invalid(self.name(), cause)
    }

    /// Apply to `value`, returning the next value
    pub fn apply(&self, value: &Value) -> Result<Value, OperationError> {
        self.validate(value.document())?;

        let before = value.document();
        let document = match self.apply_to_document(before) {
            Ok(Some(document)) => Arc::new(document),
            Ok(None) => value.document_arc().clone(),
            Err(cause) => return Err(self.error(cause)),
        };

        let selection = match self {
            Operation::SetSelection { selection } => selection.clone(),
            _ => value.selection().map(|range| {
                let anchor_hint = point_hint(before, &range.anchor);
                let focus_hint = point_hint(before, &range.focus);
                let moved = transform_range(self, before, range);
                moved
                    .normalize_with_hints(&document, &anchor_hint, &focus_hint)
                    .unwrap_or(moved)
            }),
        };

        Ok(Value::from_parts(document, selection, value.version() + 1))
    }

    /// Check the operation against `document` without building anything
    pub fn validate(&self, document: &Document) -> Result<(), OperationError> {
        self.check(document).map_err(|cause| self.error(cause))
    }

    fn check(&self, document: &Document) -> ModelResult<()> {
        match self {
            Operation::InsertText { key, offset, .. } => {
                check_offset(document.assert_text(key)?, *offset)
            }
            Operation::RemoveText { key, offset, length }
            | Operation::AddMark { key, offset, length, .. }
            | Operation::RemoveMark { key, offset, length, .. } => {
                document.assert_text(key)?.span(*offset, *length).map(|_| ())
            }
            Operation::SetMark {
                key,
                offset,
                length,
                mark,
                properties,
            } => {
                // The updated mark must not already be on the run
                let text = document.assert_text(key)?;
                for (_, _, marks) in segments(text, text.span(*offset, *length)?) {
                    let Some(old) = marks.find_type(&mark.mark_type) else {
                        continue;
                    };
                    let updated = old.merge(properties);
                    if updated != *old && marks.contains(&updated) {
                        return Err(ModelError::DuplicateMark(updated.mark_type));
                    }
                }
                Ok(())
            }
            Operation::InsertNode { parent, index, .. } => {
                let len = document.children_of(parent)?.len();
                if *index > len {
                    return Err(ModelError::index_out_of_range(*index, len));
                }
                Ok(())
            }
            Operation::RemoveNode { key } | Operation::MergeNode { key } => {
                document.parent_of(key).map(|_| ())
            }
            Operation::SplitNode { key, position, .. } => {
                match document.assert_descendant(key)? {
                    Node::Text(text) => check_offset(text, *position)?,
                    node if *position > node.nodes().len() => {
                        return Err(ModelError::index_out_of_range(*position, node.nodes().len()));
                    }
                    _ => {}
                }
                document.parent_of(key).map(|_| ())
            }
            Operation::MoveNode { key, new_parent, .. } => {
                document.parent_of(key)?;
                document.children_of(new_parent).map(|_| ())
            }
            Operation::SetNode { key, .. } => match document.assert_descendant(key)? {
                Node::Text(_) => Err(ModelError::NotElement(key.clone())),
                _ => Ok(()),
            },
            Operation::SetSelection { selection } => {
                if let Some(range) = selection {
                    for point in [&range.anchor, &range.focus] {
                        if point.key != document.key() {
                            document.assert_descendant(&point.key)?;
                        }
                    }
                }
                Ok(())
            }
        }
    }

    /// The new document, or `None` when the document is unchanged
    fn apply_to_document(&self, document: &Document) -> ModelResult<Option<Document>> {
        let next = match self {
            Operation::InsertText {
                key,
                offset,
                text,
                marks,
            } => document.update_text(key, |t| t.insert_text(*offset, text, marks.as_ref()))?,
            Operation::RemoveText { key, offset, length } => {
                document.update_text(key, |t| t.remove_text(*offset, *length))?
            }
            Operation::InsertNode { parent, index, node } => {
                document.insert_node(parent, *index, node.clone())?
            }
            Operation::RemoveNode { key } => document.remove_node(key)?,
            Operation::MergeNode { key } => document.merge_node(key)?,
            Operation::SplitNode {
                key,
                position,
                new_key,
                properties,
            } => document.split_node(key, *position, new_key, properties.as_ref())?,
            Operation::MoveNode {
                key,
                new_parent,
                index,
            } => document.move_node(key, new_parent, *index)?,
            Operation::AddMark {
                key,
                offset,
                length,
                mark,
            } => document.update_text(key, |t| t.add_mark(t.span(*offset, *length)?, mark))?,
            Operation::RemoveMark {
                key,
                offset,
                length,
                mark,
            } => document.update_text(key, |t| t.remove_mark(t.span(*offset, *length)?, mark))?,
            Operation::SetMark {
                key,
                offset,
                length,
                mark,
                properties,
            } => document.update_text(key, |t| t.update_mark(t.span(*offset, *length)?, mark, properties))?,
            Operation::SetNode { key, properties } => document.set_node(key, properties)?,
            Operation::SetSelection { .. } => return Ok(None),
        };
        Ok(Some(next))
    }

    /// Operations that undo this one, computed against `value` before the
    /// operation is applied. Applied in order, they restore the document.
    pub fn invert(&self, value: &Value) -> Result<Vec<Operation>, OperationError> {
        self.validate(value.document())?;
        self.inverse(value.document(), value.selection())
            .map_err(|cause| self.error(cause))
    }

    fn inverse(&self, document: &Document, selection: Option<&Range>) -> ModelResult<Vec<Operation>> {
        let ops = match self {
            Operation::InsertText {
                key, offset, text, ..
            } => {
                let length = text.chars().count();
                if length == 0 {
                    return Ok(Vec::new());
                }
                vec![Operation::RemoveText {
                    key: key.clone(),
                    offset: *offset,
                    length,
                }]
            }
            Operation::RemoveText { key, offset, length } => {
                let text = document.assert_text(key)?;
                let removed = text.leaves().leaves_in_range(text.span(*offset, *length)?)?;
                let mut at = *offset;
                removed
                    .into_iter()
                    .map(|leaf| {
                        let op = Operation::InsertText {
                            key: key.clone(),
                            offset: at,
                            marks: Some(leaf.marks.clone()),
                            text: leaf.text.clone(),
                        };
                        at += leaf.len();
                        op
                    })
                    .collect()
            }
            Operation::InsertNode { node, .. } => vec![Operation::RemoveNode {
                key: node.key().to_string(),
            }],
            Operation::RemoveNode { key } => {
                let (parent, index) = document.parent_of(key)?;
                vec![Operation::InsertNode {
                    parent,
                    index,
                    node: document.assert_descendant(key)?.clone(),
                }]
            }
            Operation::MergeNode { key } => {
                let (parent, index) = document.parent_of(key)?;
                let siblings = document.children_of(&parent)?;
                if index == 0 {
                    return Err(ModelError::NoPreviousSibling(key.clone()));
                }
                let previous = &siblings[index - 1];
                let node = &siblings[index];
                let (position, properties) = match (previous, node) {
                    (Node::Text(text), _) => (text.len(), None),
                    (_, node) => (
                        previous.nodes().len(),
                        node.as_element().map(|e| e.properties()),
                    ),
                };
                vec![Operation::SplitNode {
                    key: previous.key().to_string(),
                    position,
                    new_key: key.clone(),
                    properties,
                }]
            }
            Operation::SplitNode { new_key, .. } => vec![Operation::MergeNode {
                key: new_key.clone(),
            }],
            Operation::MoveNode { key, .. } => {
                let (parent, index) = document.parent_of(key)?;
                vec![Operation::MoveNode {
                    key: key.clone(),
                    new_parent: parent,
                    index,
                }]
            }
            Operation::AddMark {
                key,
                offset,
                length,
                mark,
            } => {
                let text = document.assert_text(key)?;
                spans_where(text, text.span(*offset, *length)?, |marks| !marks.contains(mark))
                    .into_iter()
                    .map(|(start, end)| Operation::RemoveMark {
                        key: key.clone(),
                        offset: start,
                        length: end - start,
                        mark: mark.clone(),
                    })
                    .collect()
            }
            Operation::RemoveMark {
                key,
                offset,
                length,
                mark,
            } => {
                let text = document.assert_text(key)?;
                spans_where(text, text.span(*offset, *length)?, |marks| marks.contains(mark))
                    .into_iter()
                    .map(|(start, end)| Operation::AddMark {
                        key: key.clone(),
                        offset: start,
                        length: end - start,
                        mark: mark.clone(),
                    })
                    .collect()
            }
            Operation::SetMark {
                key,
                offset,
                length,
                mark,
                properties,
            } => {
                let text = document.assert_text(key)?;
                segments(text, text.span(*offset, *length)?)
                    .into_iter()
                    .filter_map(|(start, end, marks)| {
                        let old = marks.find_type(&mark.mark_type)?;
                        Some(Operation::SetMark {
                            key: key.clone(),
                            offset: start,
                            length: end - start,
                            mark: old.merge(properties),
                            properties: old.to_properties(),
                        })
                    })
                    .collect()
            }
            Operation::SetNode { key, .. } => {
                let element = document
                    .assert_descendant(key)?
                    .as_element()
                    .ok_or_else(|| ModelError::NotElement(key.clone()))?;
                vec![Operation::SetNode {
                    key: key.clone(),
                    properties: element.properties(),
                }]
            }
            Operation::SetSelection { .. } => vec![Operation::SetSelection {
                selection: selection.cloned(),
            }],
        };
        Ok(ops)
    }
}

fn check_offset(text: &Text, offset: usize) -> ModelResult<()> {
    if offset > text.len() {
        return Err(ModelError::offset_out_of_range(offset, text.len()));
    }
    Ok(())
}

/// Runs of `text` intersected with `span`
fn segments(text: &Text, span: std::ops::Range<usize>) -> Vec<(usize, usize, &MarkSet)> {
    let (offset, end) = (span.start, span.end);
    let mut out = Vec::new();
    let mut start = 0;
    for leaf in text.leaves().iter() {
        let leaf_end = start + leaf.len();
        let lo = start.max(offset);
        let hi = leaf_end.min(end);
        if lo < hi {
            out.push((lo, hi, &leaf.marks));
        }
        start = leaf_end;
    }
    out
}

/// Maximal sub-spans of the range whose runs satisfy `pred`
fn spans_where(
    text: &Text,
    span: std::ops::Range<usize>,
    pred: impl Fn(&MarkSet) -> bool,
) -> Vec<(usize, usize)> {
    let mut spans: Vec<(usize, usize)> = Vec::new();
    for (start, end, marks) in segments(text, span) {
        if !pred(marks) {
            continue;
        }
        match spans.last_mut() {
            Some(last) if last.1 == start => last.1 = end,
            _ => spans.push((start, end)),
        }
    }
    spans
}
