//! # Editor
//!
//! Owns the current [`Value`], the [`History`] and the [`EditorConfig`].
//!
//! ## Lifecycle
//!
//! ```text
//! apply(op) → invert → apply → normalize → record → swap value
//!               ↓                   ↓
//!           inverses        fix-up operations
//! ```
//!
//! Nothing is committed until the whole batch (the operations plus their
//! normalization fixes) has applied cleanly: a failed batch leaves the value
//! and the history exactly as they were.

use crate::change::Change;
use crate::errors::EditorResult;
use crate::history::{History, DEFAULT_MAX_LEVELS};
use crate::normalize::normalization_op;
use crate::operation::Operation;
use folio_model::key_generator::DEFAULT_NAMESPACE;
use folio_model::{KeyGenerator, Value};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// Library-side editor settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EditorConfig {
    /// Undo levels kept (0 = unlimited)
    pub max_undo_levels: usize,

    /// Namespace seeding the keys the editor generates
    pub key_namespace: String,

    /// Run schema normalization after each batch
    pub normalize: bool,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            max_undo_levels: DEFAULT_MAX_LEVELS,
            key_namespace: DEFAULT_NAMESPACE.to_string(),
            normalize: true,
        }
    }
}

#[derive(Debug)]
pub struct Editor {
    value: Arc<Value>,
    history: History,
    keys: KeyGenerator,
    config: EditorConfig,
}

impl Editor {
    pub fn new(value: Value) -> Self {
        Self::with_config(value, EditorConfig::default())
    }

    pub fn with_config(value: Value, config: EditorConfig) -> Self {
        Self {
            value: Arc::new(value),
            history: History::with_max_levels(config.max_undo_levels),
            keys: KeyGenerator::new(&config.key_namespace),
            config,
        }
    }

    /// Snapshot of the current value
    pub fn value(&self) -> &Arc<Value> {
        &self.value
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn keys(&self) -> &KeyGenerator {
        &self.keys
    }

    /// Apply one operation as its own undo step
    pub fn apply(&mut self, operation: Operation) -> EditorResult<()> {
        self.apply_batch(vec![operation], None)
    }

    /// Apply operations in order, each as its own undo step. Stops at the
    /// first failure; earlier operations stay applied.
    pub fn apply_all(&mut self, operations: impl IntoIterator<Item = Operation>) -> EditorResult<()> {
        for operation in operations {
            self.apply(operation)?;
        }
        Ok(())
    }

    /// Run editing commands and record them as a single undo step
    pub fn change<F>(&mut self, f: F) -> EditorResult<()>
    where
        F: FnOnce(&mut Change<'_>) -> EditorResult<()>,
    {
        let mut change = Change::new(self.value.as_ref().clone(), &self.keys);
        f(&mut change)?;
        let description = change.description().map(str::to_string);
        let operations = change.into_operations();
        if operations.is_empty() {
            return Ok(());
        }
        self.apply_batch(operations, description)
    }

    #[instrument(skip(self, operations), fields(count = operations.len(), version = self.value.version()))]
    fn apply_batch(&mut self, operations: Vec<Operation>, description: Option<String>) -> EditorResult<()> {
        let mut value = self.value.as_ref().clone();
        let mut recorded = Vec::with_capacity(operations.len());

        for operation in operations {
            value = self.step(&value, operation, &mut recorded)?;
        }

        if self.config.normalize {
            while let Some(fix) = normalization_op(value.document(), &self.keys) {
                debug!(operation = fix.name(), "Normalizing");
                value = self.step(&value, fix, &mut recorded)?;
            }
        }

        let own_batch = !self.history.is_batching();
        if own_batch {
            self.history.begin_batch();
        }
        if let Some(description) = description {
            self.history.set_batch_description(description);
        }
        for (operation, inverses) in recorded {
            self.history.record(operation, inverses);
        }
        if own_batch {
            self.history.end_batch();
        }

        self.value = Arc::new(value);
        Ok(())
    }

    fn step(
        &self,
        value: &Value,
        operation: Operation,
        recorded: &mut Vec<(Operation, Vec<Operation>)>,
    ) -> EditorResult<Value> {
        let result = operation
            .invert(value)
            .and_then(|inverses| operation.apply(value).map(|next| (next, inverses)));
        match result {
            Ok((next, inverses)) => {
                debug!(operation = operation.name(), version = next.version(), "Applied operation");
                recorded.push((operation, inverses));
                Ok(next)
            }
            Err(e) => {
                warn!(operation = operation.name(), error = %e, "Rejected operation");
                Err(e.into())
            }
        }
    }

    /// Start grouping subsequent applies into one undo step
    pub fn begin_batch(&mut self) {
        self.history.begin_batch();
    }

    pub fn end_batch(&mut self) {
        self.history.end_batch();
    }

    /// Undo the most recent step. Returns false when there is nothing to undo.
    pub fn undo(&mut self) -> EditorResult<bool> {
        match self.history.undo(&self.value)? {
            Some(value) => {
                info!(version = value.version(), "Undo");
                self.value = Arc::new(value);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    pub fn redo(&mut self) -> EditorResult<bool> {
        match self.history.redo(&self.value)? {
            Some(value) => {
                info!(version = value.version(), "Redo");
                self.value = Arc::new(value);
                Ok(true)
            }
            None => Ok(false),
        }
    }
}
