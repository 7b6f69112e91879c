//! Error types for the editor

use folio_model::ModelError;
use thiserror::Error;

/// An operation was rejected before any change was made
#[derive(Error, Debug, Clone, PartialEq)]
pub enum OperationError {
    #[error("Invalid {operation} operation: {cause}")]
    InvalidOperation {
        operation: &'static str,
        #[source]
        cause: ModelError,
    },
}

impl OperationError {
    pub fn invalid(operation: &'static str, cause: ModelError) -> Self {
        Self::InvalidOperation { operation, cause }
    }

    pub fn operation(&self) -> &'static str {
        match self {
            Self::InvalidOperation { operation, .. } => operation,
        }
    }

    pub fn cause(&self) -> &ModelError {
        match self {
            Self::InvalidOperation { cause, .. } => cause,
        }
    }
}

#[derive(Error, Debug)]
pub enum EditorError {
    #[error("Operation error: {0}")]
    Operation(#[from] OperationError),

    #[error("Model error: {0}")]
    Model(#[from] ModelError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid structure: {0}")]
    InvalidStructure(String),
}

pub type EditorResult<T> = Result<T, EditorError>;
