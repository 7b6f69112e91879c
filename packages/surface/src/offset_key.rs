//! Offset keys tie a rendered leaf back to its model text: `"{key}:{index}"`,
//! where `index` is the leaf's position within the text's leaves.

use crate::error::SurfaceError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct OffsetKey {
    pub key: String,
    pub index: usize,
}

impl OffsetKey {
    pub fn new(key: impl Into<String>, index: usize) -> Self {
        Self { key: key.into(), index }
    }

    /// Parse `"{key}:{index}"`. The index is taken after the last colon.
    pub fn parse(s: &str) -> Option<Self> {
        let (key, index) = s.rsplit_once(':')?;
        if key.is_empty() {
            return None;
        }
        Some(Self::new(key, index.parse().ok()?))
    }
}

impl fmt::Display for OffsetKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.key, self.index)
    }
}

impl FromStr for OffsetKey {
    type Err = SurfaceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| SurfaceError::MalformedOffsetKey(s.to_string()))
    }
}

/// Attribute names the renderer uses to mark up the surface
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SurfaceMarkers {
    /// Carries an [`OffsetKey`] on each rendered leaf
    pub offset_key: String,

    /// Carries the model key on each rendered node
    pub key: String,

    /// Present on rendered void nodes
    pub void: String,

    /// Present on placeholders that keep empty texts focusable
    pub zero_width: String,
}

impl Default for SurfaceMarkers {
    fn default() -> Self {
        Self {
            offset_key: "data-offset-key".to_string(),
            key: "data-key".to_string(),
            void: "data-void".to_string(),
            zero_width: "data-zero-width".to_string(),
        }
    }
}
