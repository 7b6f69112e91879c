//! # Folio Model
//!
//! Immutable document model for the Folio rich-text editor.
//!
//! ## Architecture
//!
//! ```text
//! Value ── Document ─┬─ Block ─┬─ Text ── Leaves [(text, marks), ...]
//!     │              │         └─ Inline ── Text
//!     │              └─ Block ── ...
//!     └── Selection (Range: anchor Point, focus Point)
//! ```
//!
//! ## Core Principles
//!
//! 1. **Values, not objects**: every edit returns a new tree
//! 2. **Structural sharing**: only the root-to-node path is rebuilt
//! 3. **Key addressing**: points and operations name nodes by key, never by reference
//! 4. **Settled leaves**: adjacent runs never share a mark set
//!
//! ## Usage
//!
//! ```rust,ignore
//! use folio_model::{Value, SerializeOptions};
//!
//! let value = Value::from_json_str(input)?;
//! let doc = value.document();
//!
//! let edited = doc.update_text("t1", |t| t.insert_text(0, "Hi ", None))?;
//! assert_eq!(edited.text(), "Hi there");
//!
//! let json = value.to_json_value(SerializeOptions::default())?;
//! ```

mod cache;
pub mod document;
pub mod error;
pub mod json;
pub mod key_generator;
pub mod leaf;
pub mod mark;
pub mod node;
pub mod point;
pub mod range;
pub mod text;
pub mod value;
pub mod visitor;

pub use document::Document;
pub use error::{ModelError, ModelResult};
pub use json::{DocumentJson, ElementJson, NodeInput, NodeJson, SerializeOptions, TextJson, ValueJson};
pub use key_generator::{generate_key, KeyGenerator};
pub use leaf::{Leaf, Leaves};
pub use mark::{Data, Mark, MarkProperties, MarkSet};
pub use node::{Element, Node, NodeKind, NodeProperties, Path};
pub use point::Point;
pub use range::Range;
pub use text::Text;
pub use value::Value;
pub use visitor::{NodeCounts, Visitor};
