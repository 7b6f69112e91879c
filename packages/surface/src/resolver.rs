//! # Native Position Resolver
//!
//! Translates a caret reported by the rendering layer, a `(surface node,
//! offset)` pair, into a model [`Point`], and back.
//!
//! ## Steps
//!
//! 1. **Normalize**: an element caret (offset = child index) descends to a
//!    leaf, skipping comments, childless elements and non-editable elements.
//! 2. **Locate**: the nearest offset-key ancestor names the text; the offset
//!    is the character count from the start of the rendered text up to the
//!    caret. Void nodes fall back to their first offset-key descendant.
//! 3. **Compensate**: a caret at the end of a zero-width placeholder does not
//!    count the placeholder character, unless input is being composed.
//! 4. **Check**: the key must exist in the value the surface was rendered from.
//!
//! Points come back as rendered. While input is composing the surface can be
//! ahead of the model, so offsets are not clamped here; [`find_range`] and
//! the editor's selection commands normalize against the value.
//!
//! Every failure is `None`; stale or malformed surfaces are expected input.

use crate::offset_key::{OffsetKey, SurfaceMarkers};
use crate::surface::{Surface, SurfaceNodeId};
use folio_model::{Point, Range, Value};
use tracing::{debug, trace};

/// Caller-provided context for a resolution
#[derive(Debug, Clone, Default)]
pub struct ResolveOptions {
    /// An input method is composing, so the zero-width placeholder may be
    /// preceded by real characters
    pub composing: bool,

    pub markers: SurfaceMarkers,
}

impl ResolveOptions {
    pub fn composing(mut self, composing: bool) -> Self {
        self.composing = composing;
        self
    }

    pub fn with_markers(mut self, markers: SurfaceMarkers) -> Self {
        self.markers = markers;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Direction {
    Forward,
    Backward,
}

/// Resolve a surface caret to a model point
pub fn find_point(
    surface: &Surface,
    node: SurfaceNodeId,
    offset: usize,
    value: &Value,
    options: &ResolveOptions,
) -> Option<Point> {
    let markers = &options.markers;
    let Some((leaf, leaf_offset)) = normalize_node_and_offset(surface, node, offset) else {
        debug!(node = node.index(), offset, "Caret does not reach a leaf");
        return None;
    };
    if leaf_offset > surface.text_len(leaf) {
        debug!(node = leaf.index(), offset = leaf_offset, "Caret is past the end of its leaf");
        return None;
    }
    let parent = surface.parent(leaf)?;

    let (range_node, text_node, mut offset) =
        match surface.closest(parent, |id| surface.has_attribute(id, &markers.offset_key)) {
            Some(range_node) => {
                let text_node = surface.closest(range_node, |id| surface.has_attribute(id, &markers.key))?;
                let before = surface.chars_before(text_node, leaf)?;
                (range_node, text_node, before + leaf_offset)
            }
            None => {
                // Inside a void the offset-key element is a cousin of the caret
                let Some(void_node) = surface.closest(parent, |id| surface.has_attribute(id, &markers.void)) else {
                    trace!(node = leaf.index(), "Caret is outside any rendered text");
                    return None;
                };
                let range_node = surface.query(void_node, |id| surface.has_attribute(id, &markers.offset_key))?;
                (range_node, range_node, surface.text_len(range_node))
            }
        };

    if offset == surface.text_len(text_node)
        && surface.has_attribute(parent, &markers.zero_width)
        && !options.composing
    {
        offset = offset.saturating_sub(1);
    }

    let raw = surface.attribute(range_node, &markers.offset_key)?;
    let Some(OffsetKey { key, .. }) = OffsetKey::parse(raw) else {
        debug!(offset_key = raw, "Malformed offset key");
        return None;
    };
    if !value.document().has_descendant(&key) {
        // Usually a surface rendered from a different value
        debug!(key = %key, "Resolved key is not in the document");
        return None;
    }

    Some(Point::new(key, offset))
}

/// Resolve an anchor caret and a focus caret to a range normalized
/// against `value`
pub fn find_range(
    surface: &Surface,
    anchor: (SurfaceNodeId, usize),
    focus: (SurfaceNodeId, usize),
    value: &Value,
    options: &ResolveOptions,
) -> Option<Range> {
    let anchor = find_point(surface, anchor.0, anchor.1, value, options)?;
    let focus = find_point(surface, focus.0, focus.1, value, options)?;
    Range::new(anchor, focus).normalize(value.document())
}

/// Locate the rendered text node and local offset showing `point`
pub fn find_surface_point(
    surface: &Surface,
    point: &Point,
    markers: &SurfaceMarkers,
) -> Option<(SurfaceNodeId, usize)> {
    let renders_key = |id: SurfaceNodeId| surface.attribute(id, &markers.key) == Some(point.key.as_str());
    let root = surface.root();
    let text_node = if renders_key(root) {
        root
    } else {
        surface.query(root, renders_key)?
    };

    let leaves = surface.query_all(text_node, |id| {
        surface
            .attribute(id, &markers.offset_key)
            .and_then(OffsetKey::parse)
            .is_some_and(|k| k.key == point.key)
    });

    let mut start = 0;
    let mut last = None;
    for leaf in leaves {
        for text in surface.query_all(leaf, |id| surface.is_text(id)) {
            let len = surface.text_len(text);
            if point.offset <= start + len {
                return Some((text, point.offset - start));
            }
            start += len;
            last = Some((text, len));
        }
    }

    trace!(key = %point.key, offset = point.offset, "Point is past the rendered text");
    last
}

/// Descend from an element caret to a leaf caret
fn normalize_node_and_offset(
    surface: &Surface,
    node: SurfaceNodeId,
    offset: usize,
) -> Option<(SurfaceNodeId, usize)> {
    if !surface.contains(node) {
        return None;
    }
    let child_count = surface.children(node).len();
    if !surface.is_element(node) || child_count == 0 {
        return Some((node, offset));
    }
    if offset > child_count {
        return None;
    }

    let is_last = offset == child_count;
    let (direction, index) = if is_last {
        (Direction::Backward, offset - 1)
    } else {
        (Direction::Forward, offset)
    };

    let mut leaf = editable_child(surface, node, index, direction)?;
    while surface.is_element(leaf) && !surface.children(leaf).is_empty() {
        let i = if is_last { surface.children(leaf).len() - 1 } else { 0 };
        leaf = editable_child(surface, leaf, i, direction)?;
    }

    let offset = if is_last { surface.text_len(leaf) } else { 0 };
    Some((leaf, offset))
}

/// The child at `index`, or the nearest editable sibling searching in
/// `direction` first. Falls back to the child at `index` when none is.
fn editable_child(
    surface: &Surface,
    parent: SurfaceNodeId,
    index: usize,
    direction: Direction,
) -> Option<SurfaceNodeId> {
    let children = surface.children(parent);
    let child = *children.get(index)?;
    if is_editable(surface, child) {
        return Some(child);
    }

    let forward = children[index + 1..].iter();
    let backward = children[..index].iter().rev();
    let found = match direction {
        Direction::Forward => forward.chain(backward).find(|id| is_editable(surface, **id)),
        Direction::Backward => backward.chain(forward).find(|id| is_editable(surface, **id)),
    };
    Some(found.copied().unwrap_or(child))
}

fn is_editable(surface: &Surface, id: SurfaceNodeId) -> bool {
    if surface.is_comment(id) {
        return false;
    }
    if surface.is_element(id) {
        return !surface.children(id).is_empty() && surface.attribute(id, "contenteditable") != Some("false");
    }
    true
}
