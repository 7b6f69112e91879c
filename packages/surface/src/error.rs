use thiserror::Error;

pub type SurfaceResult<T> = Result<T, SurfaceError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SurfaceError {
    #[error("Malformed offset key: {0:?}")]
    MalformedOffsetKey(String),

    #[error("No surface node at path {0:?}")]
    PathNotFound(String),
}
