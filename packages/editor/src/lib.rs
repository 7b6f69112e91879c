//! # Folio Editor
//!
//! Operation engine for Folio documents.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │ model: Value / Document / Point / Range     │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ editor: Value lifecycle + operations        │
//! │  - Validate and apply primitive operations  │
//! │  - Carry the selection through each edit    │
//! │  - Normalize the tree after each batch      │
//! │  - Record inverses for undo/redo            │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ surface: rendered tree ↔ model points       │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! ## Core Principles
//!
//! 1. **Operations are the only way in**: commands compile to primitives
//! 2. **Every operation inverts**: undo is replaying inverses
//! 3. **Fixes are operations too**: normalization is recorded like any edit
//!
//! ## Usage
//!
//! ```rust,ignore
//! use folio_editor::{Editor, Operation};
//! use folio_model::Point;
//!
//! let mut editor = Editor::new(value);
//!
//! editor.apply(Operation::InsertText {
//!     key: "t1".to_string(),
//!     offset: 0,
//!     text: "Hi ".to_string(),
//!     marks: None,
//! })?;
//!
//! editor.change(|c| {
//!     c.split_block_at(&Point::new("t1", 3))?;
//!     Ok(())
//! })?;
//!
//! editor.undo()?;
//! ```

mod change;
mod editor;
mod errors;
mod history;
mod normalize;
mod operation;
mod transform;

pub use change::Change;
pub use editor::{Editor, EditorConfig};
pub use errors::{EditorError, EditorResult, OperationError};
pub use history::{History, OperationBatch, DEFAULT_MAX_LEVELS};
pub use normalize::{fresh_key, normalization_op};
pub use operation::Operation;
