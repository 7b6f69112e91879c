//! # Undo/Redo History
//!
//! Tracks applied operations and enables undo/redo.
//!
//! ## Design
//!
//! - Each operation records its inverses before being applied
//! - Undo applies the inverses and moves the batch to the redo stack
//! - Redo reapplies the original operations
//! - New operations clear the redo stack
//! - Batches group several operations into one undo step
//!
//! ## Example
//!
//! ```rust,ignore
//! let mut history = History::new();
//!
//! let inverses = op.invert(&value)?;
//! value = op.apply(&value)?;
//! history.record(op, inverses);
//!
//! if let Some(previous) = history.undo(&value)? {
//!     value = previous;
//! }
//! ```

use crate::errors::OperationError;
use crate::operation::Operation;
use folio_model::Value;

/// Default number of undo levels
pub const DEFAULT_MAX_LEVELS: usize = 100;

/// A group of operations that are undone/redone together
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OperationBatch {
    /// Operations in application order
    pub operations: Vec<Operation>,

    /// Inverse operations, in the order undo applies them
    pub inverses: Vec<Operation>,

    pub description: Option<String>,
}

impl OperationBatch {
    pub fn single(operation: Operation, inverses: Vec<Operation>) -> Self {
        Self {
            operations: vec![operation],
            inverses,
            description: None,
        }
    }

    fn push(&mut self, operation: Operation, inverses: Vec<Operation>) {
        self.operations.push(operation);
        // The newest inverses run first
        self.inverses.splice(0..0, inverses);
    }
}

/// Bounded undo/redo stack
#[derive(Debug)]
pub struct History {
    undo_stack: Vec<OperationBatch>,
    redo_stack: Vec<OperationBatch>,
    /// Maximum number of undo levels (0 = unlimited)
    max_levels: usize,
    current_batch: Option<OperationBatch>,
}

impl History {
    pub fn new() -> Self {
        Self::with_max_levels(DEFAULT_MAX_LEVELS)
    }

    pub fn with_max_levels(max_levels: usize) -> Self {
        Self {
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
            max_levels,
            current_batch: None,
        }
    }

    /// Record an applied operation with its inverses
    pub fn record(&mut self, operation: Operation, inverses: Vec<Operation>) {
        if let Some(batch) = &mut self.current_batch {
            batch.push(operation, inverses);
        } else {
            self.push_batch(OperationBatch::single(operation, inverses));
        }
    }

    /// Start a batch; operations recorded until `end_batch` undo as one step
    pub fn begin_batch(&mut self) {
        self.current_batch = Some(OperationBatch::default());
    }

    pub fn end_batch(&mut self) {
        if let Some(batch) = self.current_batch.take() {
            if !batch.operations.is_empty() {
                self.push_batch(batch);
            }
        }
    }

    pub fn is_batching(&self) -> bool {
        self.current_batch.is_some()
    }

    pub fn set_batch_description(&mut self, description: impl Into<String>) {
        if let Some(batch) = &mut self.current_batch {
            batch.description = Some(description.into());
        }
    }

    fn push_batch(&mut self, batch: OperationBatch) {
        self.undo_stack.push(batch);

        if self.max_levels > 0 && self.undo_stack.len() > self.max_levels {
            self.undo_stack.remove(0);
        }

        self.redo_stack.clear();
    }

    /// Undo the most recent batch. Returns the restored value, or `None`
    /// when there is nothing to undo. On error both stacks are unchanged.
    pub fn undo(&mut self, value: &Value) -> Result<Option<Value>, OperationError> {
        let Some(batch) = self.undo_stack.last() else {
            return Ok(None);
        };
        let restored = apply_all(&batch.inverses, value)?;
        if let Some(batch) = self.undo_stack.pop() {
            self.redo_stack.push(batch);
        }
        Ok(Some(restored))
    }

    /// Redo the most recently undone batch
    pub fn redo(&mut self, value: &Value) -> Result<Option<Value>, OperationError> {
        let Some(batch) = self.redo_stack.last() else {
            return Ok(None);
        };
        let restored = apply_all(&batch.operations, value)?;
        if let Some(batch) = self.redo_stack.pop() {
            self.undo_stack.push(batch);
        }
        Ok(Some(restored))
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    pub fn undo_levels(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn redo_levels(&self) -> usize {
        self.redo_stack.len()
    }

    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
        self.current_batch = None;
    }

    pub fn undo_description(&self) -> Option<&str> {
        self.undo_stack
            .last()
            .and_then(|batch| batch.description.as_deref())
    }

    pub fn redo_description(&self) -> Option<&str> {
        self.redo_stack
            .last()
            .and_then(|batch| batch.description.as_deref())
    }
}

impl Default for History {
    fn default() -> Self {
        Self::new()
    }
}

fn apply_all(operations: &[Operation], value: &Value) -> Result<Value, OperationError> {
    let mut value = value.clone();
    for operation in operations {
        value = operation.apply(&value)?;
    }
    Ok(value)
}
