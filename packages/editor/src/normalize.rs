//! Schema normalization
//!
//! After an edit the tree may hold transient shapes the primitives allow but
//! a settled document must not: a non-void element without children, or two
//! adjacent text siblings. Each fix is emitted as an ordinary operation so it
//! is recorded in history and undone with the edit that caused it.

use crate::operation::Operation;
use folio_model::visitor::walk_element;
use folio_model::{Document, Element, KeyGenerator, Node, Text, Visitor};

/// The next fix the document needs, or `None` when it is settled
pub fn normalization_op(document: &Document, keys: &KeyGenerator) -> Option<Operation> {
    let mut finder = ViolationFinder {
        document,
        keys,
        found: None,
    };
    finder.visit_document(document);
    finder.found
}

/// A generated key not already used in `document`
pub fn fresh_key(document: &Document, keys: &KeyGenerator) -> String {
    loop {
        let key = keys.next_key();
        if key != document.key() && !document.has_descendant(&key) {
            return key;
        }
    }
}

struct ViolationFinder<'d> {
    document: &'d Document,
    keys: &'d KeyGenerator,
    found: Option<Operation>,
}

impl ViolationFinder<'_> {
    fn check(&mut self, element: &Element) {
        if self.found.is_some() {
            return;
        }
        if element.nodes().is_empty() && !element.is_void() {
            self.found = Some(Operation::InsertNode {
                parent: element.key().to_string(),
                index: 0,
                node: Node::text(Text::empty(fresh_key(self.document, self.keys))),
            });
            return;
        }
        let adjacent = element
            .nodes()
            .windows(2)
            .find(|pair| pair[0].is_text() && pair[1].is_text());
        if let Some(pair) = adjacent {
            self.found = Some(Operation::MergeNode {
                key: pair[1].key().to_string(),
            });
            return;
        }
        walk_element(self, element);
    }
}

impl<'a> Visitor<'a> for ViolationFinder<'_> {
    fn visit_block(&mut self, element: &'a Element) {
        self.check(element);
    }

    fn visit_inline(&mut self, element: &'a Element) {
        self.check(element);
    }
}
