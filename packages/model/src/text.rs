use crate::cache::DerivedText;
use crate::error::ModelResult;
use crate::key_generator::generate_key;
use crate::leaf::{Leaf, Leaves};
use crate::mark::{Mark, MarkProperties, MarkSet};
use std::ops::Range;

/// Leaf node of the document tree
#[derive(Debug, Clone, PartialEq)]
pub struct Text {
    key: String,
    leaves: Leaves,
    cache: DerivedText,
}

impl Text {
    pub fn new(key: impl Into<String>, leaves: Leaves) -> Self {
        Self {
            key: key.into(),
            leaves,
            cache: DerivedText::default(),
        }
    }

    /// Unmarked text with a generated key
    pub fn plain(text: impl Into<String>) -> Self {
        Self::new(generate_key(), Leaves::plain(text))
    }

    pub fn empty(key: impl Into<String>) -> Self {
        Self::new(key, Leaves::empty())
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn leaves(&self) -> &Leaves {
        &self.leaves
    }

    pub fn text(&self) -> &str {
        self.cache.text(|| self.leaves.text())
    }

    /// Length in chars
    pub fn len(&self) -> usize {
        self.cache.len(|| self.leaves.text())
    }

    pub fn is_empty(&self) -> bool {
        self.leaves.is_empty()
    }

    pub fn with_leaves(&self, leaves: Leaves) -> Text {
        Text::new(self.key.clone(), leaves)
    }

    pub fn marks_at(&self, offset: usize) -> MarkSet {
        self.leaves.marks_at(offset)
    }

    pub fn span(&self, offset: usize, length: usize) -> ModelResult<Range<usize>> {
        self.leaves.span(offset, length)
    }

    pub fn insert_text(&self, offset: usize, text: &str, marks: Option<&MarkSet>) -> ModelResult<Text> {
        Ok(self.with_leaves(self.leaves.insert_text(offset, text, marks)?))
    }

    pub fn insert_leaves(&self, offset: usize, leaves: &[Leaf]) -> ModelResult<Text> {
        Ok(self.with_leaves(self.leaves.insert_leaves(offset, leaves)?))
    }

    pub fn remove_text(&self, offset: usize, length: usize) -> ModelResult<Text> {
        Ok(self.with_leaves(self.leaves.remove_text(offset, length)?))
    }

    pub fn add_mark(&self, range: Range<usize>, mark: &Mark) -> ModelResult<Text> {
        Ok(self.with_leaves(self.leaves.add_mark(range, mark)?))
    }

    pub fn remove_mark(&self, range: Range<usize>, mark: &Mark) -> ModelResult<Text> {
        Ok(self.with_leaves(self.leaves.remove_mark(range, mark)?))
    }

    pub fn update_mark(
        &self,
        range: Range<usize>,
        mark: &Mark,
        properties: &MarkProperties,
    ) -> ModelResult<Text> {
        Ok(self.with_leaves(self.leaves.update_mark(range, mark, properties)?))
    }

    /// Split at `offset`; the first half keeps this key, the second gets `new_key`
    pub fn split(&self, offset: usize, new_key: impl Into<String>) -> ModelResult<(Text, Text)> {
        let (before, after) = self.leaves.split_at(offset)?;
        Ok((self.with_leaves(before), Text::new(new_key, after)))
    }

    /// Append `other`'s runs, keeping this key
    pub fn merge(&self, other: &Text) -> Text {
        self.with_leaves(self.leaves.concat(&other.leaves))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_cache_is_per_value() {
        let text = Text::new("t1", Leaves::plain("hello"));
        assert_eq!(text.text(), "hello");
        assert_eq!(text.len(), 5);

        let edited = text.insert_text(5, " world", None).unwrap();
        assert_eq!(edited.text(), "hello world");
        assert_eq!(edited.key(), "t1");
        assert_eq!(text.text(), "hello");
    }

    #[test]
    fn test_split_at_edges_produces_valid_halves() {
        let text = Text::new("t1", Leaves::plain("abc"));

        let (a, b) = text.split(0, "t2").unwrap();
        assert!(a.is_empty());
        assert_eq!(a.leaves().as_slice().len(), 1);
        assert_eq!(b.text(), "abc");
        assert_eq!(b.key(), "t2");

        let (a, b) = text.split(3, "t3").unwrap();
        assert_eq!(a.text(), "abc");
        assert!(b.is_empty());
        assert!(b.leaves().is_normalized());
    }

    #[test]
    fn test_merge_keeps_first_key() {
        let a = Text::new("a", Leaves::plain("foo"));
        let b = Text::new("b", Leaves::plain("bar"));
        let merged = a.merge(&b);
        assert_eq!(merged.key(), "a");
        assert_eq!(merged.text(), "foobar");
        assert_eq!(merged.leaves().as_slice().len(), 1);
    }
}
