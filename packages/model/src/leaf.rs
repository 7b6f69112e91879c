//! # Leaf algebra
//!
//! A text node stores its content as ordered runs of `(text, marks)`.
//! Every edit returns a new [`Leaves`] value that satisfies two invariants:
//!
//! 1. No two adjacent runs carry equal mark sets.
//! 2. No run is empty, unless the whole sequence is a single empty run.
//!
//! All offsets are counted in `char`s.

use crate::error::{ModelError, ModelResult};
use crate::mark::{Mark, MarkProperties, MarkSet};
use serde::{Deserialize, Serialize};
use std::ops::Range;

/// One run of text sharing a mark set
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Leaf {
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub marks: MarkSet,
}

impl Leaf {
    pub fn new(text: impl Into<String>, marks: MarkSet) -> Self {
        Self {
            text: text.into(),
            marks,
        }
    }

    pub fn plain(text: impl Into<String>) -> Self {
        Self::new(text, MarkSet::new())
    }

    pub fn len(&self) -> usize {
        self.text.chars().count()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    fn split(&self, at: usize) -> (Leaf, Leaf) {
        let idx = byte_index(&self.text, at);
        (
            Leaf::new(&self.text[..idx], self.marks.clone()),
            Leaf::new(&self.text[idx..], self.marks.clone()),
        )
    }
}

/// Byte index of the `offset`-th char, clamped to the string length
pub(crate) fn byte_index(s: &str, offset: usize) -> usize {
    s.char_indices()
        .nth(offset)
        .map(|(i, _)| i)
        .unwrap_or(s.len())
}

/// Normalized sequence of runs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "Vec<Leaf>", into = "Vec<Leaf>")]
pub struct Leaves(Vec<Leaf>);

impl Leaves {
    /// Build from arbitrary runs, dropping empty ones and merging equal neighbours
    pub fn new(leaves: Vec<Leaf>) -> Self {
        let mut merged: Vec<Leaf> = Vec::with_capacity(leaves.len());
        for leaf in leaves.into_iter().filter(|l| !l.is_empty()) {
            match merged.last_mut() {
                Some(last) if last.marks == leaf.marks => last.text.push_str(&leaf.text),
                _ => merged.push(leaf),
            }
        }
        if merged.is_empty() {
            merged.push(Leaf::default());
        }
        Self(merged)
    }

    pub fn empty() -> Self {
        Self(vec![Leaf::default()])
    }

    pub fn plain(text: impl Into<String>) -> Self {
        Self::new(vec![Leaf::plain(text)])
    }

    pub fn as_slice(&self) -> &[Leaf] {
        &self.0
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Leaf> {
        self.0.iter()
    }

    /// Total length in chars
    pub fn len(&self) -> usize {
        self.0.iter().map(Leaf::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.0.iter().all(Leaf::is_empty)
    }

    pub fn text(&self) -> String {
        self.0.iter().map(|l| l.text.as_str()).collect()
    }

    /// Whether both leaf invariants hold
    pub fn is_normalized(&self) -> bool {
        let adjacent_distinct = self.0.windows(2).all(|w| w[0].marks != w[1].marks);
        let no_empty_runs = self.0.len() == 1 || self.0.iter().all(|l| !l.is_empty());
        !self.0.is_empty() && adjacent_distinct && no_empty_runs
    }

    /// Marks a character inserted at `offset` would inherit: those of the
    /// character before it, or of the first run at offset 0.
    pub fn marks_at(&self, offset: usize) -> MarkSet {
        if offset == 0 {
            return self.0.first().map(|l| l.marks.clone()).unwrap_or_default();
        }
        let mut start = 0;
        for leaf in &self.0 {
            let end = start + leaf.len();
            if offset <= end {
                return leaf.marks.clone();
            }
            start = end;
        }
        self.0.last().map(|l| l.marks.clone()).unwrap_or_default()
    }

    /// Runs covering `range`, trimmed to its boundaries
    pub fn leaves_in_range(&self, range: Range<usize>) -> ModelResult<Vec<Leaf>> {
        self.check_range(&range)?;
        let (_, rest) = split_runs(&self.0, range.start);
        let (middle, _) = split_runs(&rest, range.end - range.start);
        Ok(middle)
    }

    pub fn split_at(&self, offset: usize) -> ModelResult<(Leaves, Leaves)> {
        self.check_offset(offset)?;
        let (before, after) = split_runs(&self.0, offset);
        Ok((Leaves::new(before), Leaves::new(after)))
    }

    pub fn concat(&self, other: &Leaves) -> Leaves {
        let mut all = self.0.clone();
        all.extend(other.0.iter().cloned());
        Leaves::new(all)
    }

    /// Insert `text` at `offset`; without `marks` the new run inherits
    /// [`Leaves::marks_at`].
    pub fn insert_text(&self, offset: usize, text: &str, marks: Option<&MarkSet>) -> ModelResult<Leaves> {
        self.check_offset(offset)?;
        if text.is_empty() {
            return Ok(self.clone());
        }
        let marks = marks.cloned().unwrap_or_else(|| self.marks_at(offset));
        let (mut before, after) = split_runs(&self.0, offset);
        before.push(Leaf::new(text, marks));
        before.extend(after);
        Ok(Leaves::new(before))
    }

    /// Insert pre-marked runs at `offset`
    pub fn insert_leaves(&self, offset: usize, leaves: &[Leaf]) -> ModelResult<Leaves> {
        self.check_offset(offset)?;
        let (mut before, after) = split_runs(&self.0, offset);
        before.extend(leaves.iter().cloned());
        before.extend(after);
        Ok(Leaves::new(before))
    }

    /// `offset..offset + length`, checked against this sequence's length
    pub fn span(&self, offset: usize, length: usize) -> ModelResult<Range<usize>> {
        let len = self.len();
        match offset.checked_add(length) {
            Some(end) if end <= len => Ok(offset..end),
            _ => Err(ModelError::offset_out_of_range(offset.saturating_add(length), len)),
        }
    }

    pub fn remove_text(&self, offset: usize, length: usize) -> ModelResult<Leaves> {
        let range = self.span(offset, length)?;
        let (mut before, rest) = split_runs(&self.0, range.start);
        let (_, after) = split_runs(&rest, length);
        before.extend(after);
        Ok(Leaves::new(before))
    }

    pub fn add_mark(&self, range: Range<usize>, mark: &Mark) -> ModelResult<Leaves> {
        self.map_marks(range, |marks| {
            marks.insert(mark.clone());
        })
    }

    pub fn remove_mark(&self, range: Range<usize>, mark: &Mark) -> ModelResult<Leaves> {
        self.map_marks(range, |marks| {
            marks.remove(mark);
        })
    }

    /// Replace the mark of `mark.mark_type` in every run inside `range` with
    /// its merge with `properties`. Runs lacking that type are untouched.
    pub fn update_mark(
        &self,
        range: Range<usize>,
        mark: &Mark,
        properties: &MarkProperties,
    ) -> ModelResult<Leaves> {
        self.map_marks(range, |marks| {
            marks.update_type(&mark.mark_type, properties);
        })
    }

    fn map_marks(&self, range: Range<usize>, f: impl Fn(&mut MarkSet)) -> ModelResult<Leaves> {
        self.check_range(&range)?;
        let (mut head, rest) = split_runs(&self.0, range.start);
        let (middle, tail) = split_runs(&rest, range.end - range.start);
        for mut leaf in middle {
            f(&mut leaf.marks);
            head.push(leaf);
        }
        head.extend(tail);
        Ok(Leaves::new(head))
    }

    fn check_offset(&self, offset: usize) -> ModelResult<()> {
        let len = self.len();
        if offset > len {
            return Err(ModelError::offset_out_of_range(offset, len));
        }
        Ok(())
    }

    fn check_range(&self, range: &Range<usize>) -> ModelResult<()> {
        let len = self.len();
        if range.start > range.end {
            return Err(ModelError::offset_out_of_range(range.start, range.end));
        }
        if range.end > len {
            return Err(ModelError::offset_out_of_range(range.end, len));
        }
        Ok(())
    }
}

impl Default for Leaves {
    fn default() -> Self {
        Self::empty()
    }
}

impl From<Vec<Leaf>> for Leaves {
    fn from(leaves: Vec<Leaf>) -> Self {
        Leaves::new(leaves)
    }
}

impl From<Leaves> for Vec<Leaf> {
    fn from(leaves: Leaves) -> Self {
        leaves.0
    }
}

/// Split raw runs at a char offset; zero-length pieces are dropped.
fn split_runs(leaves: &[Leaf], offset: usize) -> (Vec<Leaf>, Vec<Leaf>) {
    let mut before = Vec::new();
    let mut after = Vec::new();
    let mut start = 0;
    for leaf in leaves {
        let len = leaf.len();
        let end = start + len;
        if end <= offset {
            before.push(leaf.clone());
        } else if start >= offset {
            after.push(leaf.clone());
        } else {
            let (a, b) = leaf.split(offset - start);
            before.push(a);
            after.push(b);
        }
        start = end;
    }
    before.retain(|l| !l.is_empty());
    after.retain(|l| !l.is_empty());
    (before, after)
}
