use crate::document::Document;
use crate::point::Point;
use crate::range::Range;
use std::sync::Arc;

/// Top-level editor state: a document, a selection and a version counter.
///
/// `version` counts the operations applied since the value was created and
/// serves as the history marker for snapshots.
#[derive(Debug, Clone, PartialEq)]
pub struct Value {
    document: Arc<Document>,
    selection: Option<Range>,
    version: u64,
}

impl Value {
    /// Value with the cursor collapsed at the start of the document
    pub fn new(document: Document) -> Self {
        let selection = Point::start_of(&document).map(Range::collapsed);
        Self {
            document: Arc::new(document),
            selection,
            version: 0,
        }
    }

    /// Assemble a value, normalizing `selection` against `document`. A
    /// selection that no longer resolves is dropped.
    pub fn from_parts(document: Arc<Document>, selection: Option<Range>, version: u64) -> Self {
        let selection = selection.and_then(|s| s.normalize(&document));
        Self {
            document,
            selection,
            version,
        }
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn document_arc(&self) -> &Arc<Document> {
        &self.document
    }

    pub fn selection(&self) -> Option<&Range> {
        self.selection.as_ref()
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    /// Same document and version, different selection
    pub fn with_selection(&self, selection: Option<Range>) -> Value {
        Value::from_parts(self.document.clone(), selection, self.version)
    }

    /// Whether the selection points at keys present in the document
    pub fn selection_is_valid(&self) -> bool {
        match &self.selection {
            None => true,
            Some(range) => [&range.anchor, &range.focus].iter().all(|point| {
                self.document
                    .get_descendant(&point.key)
                    .and_then(|n| n.as_text())
                    .is_some_and(|t| point.offset <= t.len())
            }),
        }
    }
}
