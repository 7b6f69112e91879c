use crate::document::Document;
use crate::point::Point;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Anchor and focus points. `anchor == focus` is a collapsed cursor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Range {
    pub anchor: Point,
    pub focus: Point,
    #[serde(default)]
    pub is_focused: bool,
    /// Derived by [`Range::normalize`]
    #[serde(default)]
    pub is_backward: bool,
}

impl Range {
    pub fn new(anchor: Point, focus: Point) -> Self {
        Self {
            anchor,
            focus,
            is_focused: false,
            is_backward: false,
        }
    }

    pub fn collapsed(point: Point) -> Self {
        Self::new(point.clone(), point)
    }

    pub fn focused(mut self, is_focused: bool) -> Self {
        self.is_focused = is_focused;
        self
    }

    pub fn is_collapsed(&self) -> bool {
        self.anchor == self.focus
    }

    pub fn is_expanded(&self) -> bool {
        !self.is_collapsed()
    }

    pub fn start(&self) -> &Point {
        if self.is_backward {
            &self.focus
        } else {
            &self.anchor
        }
    }

    pub fn end(&self) -> &Point {
        if self.is_backward {
            &self.anchor
        } else {
            &self.focus
        }
    }

    pub fn collapse_to_anchor(&self) -> Range {
        self.collapse_to(self.anchor.clone())
    }

    pub fn collapse_to_focus(&self) -> Range {
        self.collapse_to(self.focus.clone())
    }

    pub fn collapse_to_start(&self) -> Range {
        self.collapse_to(self.start().clone())
    }

    pub fn collapse_to_end(&self) -> Range {
        self.collapse_to(self.end().clone())
    }

    fn collapse_to(&self, point: Point) -> Range {
        Range {
            anchor: point.clone(),
            focus: point,
            is_focused: self.is_focused,
            is_backward: false,
        }
    }

    /// Same flags, new points; `is_backward` is stale until normalized
    pub fn move_to(&self, anchor: Point, focus: Point) -> Range {
        Range {
            anchor,
            focus,
            ..self.clone()
        }
    }

    /// Normalize both points and recompute `is_backward`
    pub fn normalize(&self, document: &Document) -> Option<Range> {
        let anchor = self.anchor.normalize(document)?;
        let focus = self.focus.normalize(document)?;
        Some(self.settle(anchor, focus, document))
    }

    /// Normalize with per-point path hints for keys that no longer exist
    pub fn normalize_with_hints(
        &self,
        document: &Document,
        anchor_hint: &[usize],
        focus_hint: &[usize],
    ) -> Option<Range> {
        let anchor = self.anchor.normalize_with_hint(document, anchor_hint)?;
        let focus = self.focus.normalize_with_hint(document, focus_hint)?;
        Some(self.settle(anchor, focus, document))
    }

    fn settle(&self, anchor: Point, focus: Point, document: &Document) -> Range {
        let is_backward = anchor.compare(&focus, document) == Some(Ordering::Greater);
        Range {
            anchor,
            focus,
            is_focused: self.is_focused,
            is_backward,
        }
    }
}
