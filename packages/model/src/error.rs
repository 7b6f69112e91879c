use thiserror::Error;

pub type ModelResult<T> = Result<T, ModelError>;

/// Faults raised by node construction and tree edit primitives.
///
/// Every variant describes a condition detected *before* a new tree is
/// produced: a failed edit never yields a partially edited document.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ModelError {
    #[error("Invalid shape: {0}")]
    InvalidShape(String),

    #[error("Key not found: {0}")]
    KeyNotFound(String),

    #[error("Index {index} out of range (length {len})")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("Offset {offset} out of range (length {len})")]
    OffsetOutOfRange { offset: usize, len: usize },

    #[error("A {parent} cannot contain a {child}")]
    InvalidChild {
        parent: &'static str,
        child: &'static str,
    },

    #[error("Node is not a text: {0}")]
    NotText(String),

    #[error("Node is not an element: {0}")]
    NotElement(String),

    #[error("Moving {key} into {parent} would create a cycle")]
    CycleDetected { key: String, parent: String },

    #[error("Cannot merge a {found} into a {expected}")]
    KindMismatch {
        expected: &'static str,
        found: &'static str,
    },

    #[error("Node has no previous sibling: {0}")]
    NoPreviousSibling(String),

    #[error("Duplicate key: {0}")]
    DuplicateKey(String),

    #[error("Mark `{0}` is already present on the run")]
    DuplicateMark(String),

    #[error("Operation is not allowed on the document root")]
    RootNotAllowed,
}

impl ModelError {
    pub fn invalid_shape(message: impl Into<String>) -> Self {
        Self::InvalidShape(message.into())
    }

    pub fn key_not_found(key: impl Into<String>) -> Self {
        Self::KeyNotFound(key.into())
    }

    pub fn index_out_of_range(index: usize, len: usize) -> Self {
        Self::IndexOutOfRange { index, len }
    }

    pub fn offset_out_of_range(offset: usize, len: usize) -> Self {
        Self::OffsetOutOfRange { offset, len }
    }
}

impl From<serde_json::Error> for ModelError {
    fn from(e: serde_json::Error) -> Self {
        ModelError::InvalidShape(e.to_string())
    }
}
