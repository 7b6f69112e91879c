pub mod apply;
pub mod check;
pub mod init;
pub mod resolve;

pub use apply::{apply, ApplyArgs};
pub use check::{check, CheckArgs};
pub use init::{init, InitArgs};
pub use resolve::{resolve, ResolveArgs};

use anyhow::{Context, Result};
use folio_model::Value;
use std::path::{Path, PathBuf};

/// Resolve `path` against the working directory
pub(crate) fn input_path(cwd: &str, path: &Path) -> PathBuf {
    PathBuf::from(cwd).join(path)
}

pub(crate) fn read_value(path: &Path) -> Result<Value> {
    let content = std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
    Value::from_json_str(&content).with_context(|| format!("Invalid value in {}", path.display()))
}
