use crate::document::Document;
use crate::node::{Element, Node};
use crate::text::Text;

/// Visitor pattern for traversing a document immutably
///
/// Default implementations walk the entire tree in document order.
/// Override specific visit_* methods to act on nodes; call the matching
/// `walk_*` function to keep descending.
pub trait Visitor<'a>: Sized {
    fn visit_document(&mut self, document: &'a Document) {
        walk_document(self, document);
    }

    fn visit_node(&mut self, node: &'a Node) {
        walk_node(self, node);
    }

    fn visit_block(&mut self, element: &'a Element) {
        walk_element(self, element);
    }

    fn visit_inline(&mut self, element: &'a Element) {
        walk_element(self, element);
    }

    fn visit_text(&mut self, _text: &'a Text) {
        // Leaf node, no children to walk
    }
}

pub fn walk_document<'a, V: Visitor<'a>>(visitor: &mut V, document: &'a Document) {
    for node in document.nodes() {
        visitor.visit_node(node);
    }
}

pub fn walk_node<'a, V: Visitor<'a>>(visitor: &mut V, node: &'a Node) {
    match node {
        Node::Block(element) => visitor.visit_block(element),
        Node::Inline(element) => visitor.visit_inline(element),
        Node::Text(text) => visitor.visit_text(text),
    }
}

pub fn walk_element<'a, V: Visitor<'a>>(visitor: &mut V, element: &'a Element) {
    for node in element.nodes() {
        visitor.visit_node(node);
    }
}

/// Node totals for a document
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NodeCounts {
    pub blocks: usize,
    pub inlines: usize,
    pub texts: usize,
    pub voids: usize,
    pub leaves: usize,
}

impl NodeCounts {
    pub fn of(document: &Document) -> Self {
        let mut counts = NodeCounts::default();
        counts.visit_document(document);
        counts
    }
}

impl<'a> Visitor<'a> for NodeCounts {
    fn visit_block(&mut self, element: &'a Element) {
        self.blocks += 1;
        self.voids += usize::from(element.is_void());
        walk_element(self, element);
    }

    fn visit_inline(&mut self, element: &'a Element) {
        self.inlines += 1;
        self.voids += usize::from(element.is_void());
        walk_element(self, element);
    }

    fn visit_text(&mut self, text: &'a Text) {
        self.texts += 1;
        self.leaves += text.leaves().as_slice().len();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::leaf::{Leaf, Leaves};
    use crate::mark::{Mark, MarkSet};

    struct TextKeys<'a>(Vec<&'a str>);

    impl<'a> Visitor<'a> for TextKeys<'a> {
        fn visit_text(&mut self, text: &'a Text) {
            self.0.push(text.key());
        }
    }

    fn document() -> Document {
        let bold = MarkSet::new().with(Mark::new("bold"));
        let link = Element::new("l", "link").with_child(Node::text(Text::new("t2", Leaves::plain("here"))));
        let image = Element::new("img", "image")
            .with_void(true)
            .with_child(Node::text(Text::empty("t4")));
        Document::new(
            "doc",
            vec![
                Node::block(
                    Element::new("b1", "paragraph")
                        .with_child(Node::text(Text::new(
                            "t1",
                            Leaves::new(vec![Leaf::plain("click "), Leaf::new("bold", bold)]),
                        )))
                        .with_child(Node::inline(link))
                        .with_child(Node::text(Text::new("t3", Leaves::plain("!")))),
                ),
                Node::block(image),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_visitor_walks_in_document_order() {
        let doc = document();
        let mut keys = TextKeys(Vec::new());
        keys.visit_document(&doc);
        assert_eq!(keys.0, vec!["t1", "t2", "t3", "t4"]);
    }

    #[test]
    fn test_node_counts() {
        let counts = NodeCounts::of(&document());
        assert_eq!(
            counts,
            NodeCounts {
                blocks: 2,
                inlines: 1,
                texts: 4,
                voids: 1,
                leaves: 5,
            }
        );
    }
}
