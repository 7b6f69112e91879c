//! Operation application, rejection and inversion

use folio_editor::Operation;
use folio_model::{
    Document, Element, Leaf, Leaves, Mark, MarkProperties, MarkSet, ModelError, Node, NodeProperties, Point,
    Range, SerializeOptions, Text, Value,
};
use pretty_assertions::assert_eq;
use std::sync::Arc;

fn marks(list: &[&str]) -> MarkSet {
    list.iter().map(|m| Mark::new(*m)).collect()
}

/// doc
///   b1 paragraph: t1 "Cat is Cute" (bold "Cat"), link(l1: t2 "here"), t3 "!"
///   b2 quote: b3 paragraph: t4 "Nested"
///   b4 image (void): t5 ""
fn value() -> Value {
    let link = Element::new("l1", "link")
        .with_data("href", "/cats")
        .with_child(Node::text(Text::new("t2", Leaves::plain("here"))));
    let document = Document::new(
        "doc",
        vec![
            Node::block(
                Element::new("b1", "paragraph")
                    .with_child(Node::text(Text::new(
                        "t1",
                        Leaves::new(vec![Leaf::new("Cat", marks(&["bold"])), Leaf::plain(" is Cute")]),
                    )))
                    .with_child(Node::inline(link))
                    .with_child(Node::text(Text::new("t3", Leaves::plain("!")))),
            ),
            Node::block(Element::new("b2", "quote").with_child(Node::block(
                Element::new("b3", "paragraph").with_child(Node::text(Text::new("t4", Leaves::plain("Nested")))),
            ))),
            Node::block(
                Element::new("b4", "image")
                    .with_void(true)
                    .with_child(Node::text(Text::empty("t5"))),
            ),
        ],
    )
    .unwrap();
    Value::new(document).with_selection(Some(Range::new(Point::new("t1", 4), Point::new("t4", 2))))
}

fn serialized(value: &Value) -> serde_json::Value {
    value
        .to_json_value(SerializeOptions {
            preserve_keys: true,
            preserve_selection: false,
        })
        .unwrap()
}

fn all_operations() -> Vec<Operation> {
    vec![
        Operation::InsertText {
            key: "t1".into(),
            offset: 3,
            text: "s".into(),
            marks: None,
        },
        Operation::InsertText {
            key: "t2".into(),
            offset: 0,
            text: "över ".into(),
            marks: Some(marks(&["italic"])),
        },
        Operation::RemoveText {
            key: "t1".into(),
            offset: 1,
            length: 6,
        },
        Operation::InsertNode {
            parent: "b2".into(),
            index: 1,
            node: Node::block(
                Element::new("n1", "paragraph").with_child(Node::text(Text::new("n2", Leaves::plain("new")))),
            ),
        },
        Operation::RemoveNode { key: "l1".into() },
        Operation::RemoveNode { key: "b2".into() },
        Operation::MergeNode { key: "b4".into() },
        Operation::MergeNode { key: "b2".into() },
        Operation::SplitNode {
            key: "t1".into(),
            position: 3,
            new_key: "s1".into(),
            properties: None,
        },
        Operation::SplitNode {
            key: "b1".into(),
            position: 1,
            new_key: "s2".into(),
            properties: Some(NodeProperties::node_type("heading")),
        },
        Operation::MoveNode {
            key: "b3".into(),
            new_parent: "doc".into(),
            index: 0,
        },
        Operation::MoveNode {
            key: "t3".into(),
            new_parent: "l1".into(),
            index: 1,
        },
        Operation::AddMark {
            key: "t1".into(),
            offset: 0,
            length: 11,
            mark: Mark::new("bold"),
        },
        Operation::RemoveMark {
            key: "t1".into(),
            offset: 1,
            length: 1,
            mark: Mark::new("bold"),
        },
        Operation::SetMark {
            key: "t1".into(),
            offset: 0,
            length: 11,
            mark: Mark::new("bold"),
            properties: MarkProperties::data([("weight".to_string(), 700.into())].into_iter().collect()),
        },
        Operation::SetNode {
            key: "b4".into(),
            properties: NodeProperties {
                node_type: Some("video".into()),
                is_void: Some(true),
                data: Some([("src".to_string(), "/cat.mp4".into())].into_iter().collect()),
            },
        },
        Operation::SetSelection {
            selection: Some(Range::collapsed(Point::new("t4", 6))),
        },
    ]
}

#[test]
fn test_insert_node_into_missing_parent_is_rejected() {
    let before = value();
    let op = Operation::InsertNode {
        parent: "missing".into(),
        index: 0,
        node: Node::text(Text::new("x", Leaves::plain("x"))),
    };

    let err = op.apply(&before).unwrap_err();
    assert_eq!(err.cause(), &ModelError::KeyNotFound("missing".into()));

    // The value is immutable: the document is still the very same allocation
    let after = before.clone();
    assert!(Arc::ptr_eq(after.document_arc(), before.document_arc()));
}

#[test]
fn test_rejections_carry_model_causes() {
    let v = value();
    let cases = vec![
        (
            Operation::InsertText {
                key: "t1".into(),
                offset: 12,
                text: "x".into(),
                marks: None,
            },
            ModelError::OffsetOutOfRange { offset: 12, len: 11 },
        ),
        (
            Operation::InsertNode {
                parent: "b1".into(),
                index: 9,
                node: Node::text(Text::new("x", Leaves::empty())),
            },
            ModelError::IndexOutOfRange { index: 9, len: 3 },
        ),
        (
            Operation::MergeNode { key: "b1".into() },
            ModelError::NoPreviousSibling("b1".into()),
        ),
        (
            Operation::MergeNode { key: "t3".into() },
            ModelError::KindMismatch {
                expected: "inline",
                found: "text",
            },
        ),
        (
            Operation::MoveNode {
                key: "b2".into(),
                new_parent: "b3".into(),
                index: 0,
            },
            ModelError::CycleDetected {
                key: "b2".into(),
                parent: "b3".into(),
            },
        ),
        (
            Operation::RemoveNode { key: "doc".into() },
            ModelError::RootNotAllowed,
        ),
        (
            Operation::AddMark {
                key: "b1".into(),
                offset: 0,
                length: 1,
                mark: Mark::new("bold"),
            },
            ModelError::NotText("b1".into()),
        ),
        (
            Operation::InsertNode {
                parent: "b1".into(),
                index: 0,
                node: Node::text(Text::new("t4", Leaves::empty())),
            },
            ModelError::DuplicateKey("t4".into()),
        ),
    ];

    for (op, cause) in cases {
        let err = op.apply(&v).unwrap_err();
        assert_eq!(err.cause(), &cause, "{}", op.name());
    }
}

#[test]
fn test_range_operations_past_the_text_are_rejected() {
    let v = value();
    let before = serialized(&v);
    let range_ops = |offset: usize, length: usize| {
        vec![
            Operation::RemoveText {
                key: "t1".into(),
                offset,
                length,
            },
            Operation::AddMark {
                key: "t1".into(),
                offset,
                length,
                mark: Mark::new("italic"),
            },
            Operation::RemoveMark {
                key: "t1".into(),
                offset,
                length,
                mark: Mark::new("bold"),
            },
            Operation::SetMark {
                key: "t1".into(),
                offset,
                length,
                mark: Mark::new("bold"),
                properties: MarkProperties::default(),
            },
        ]
    };

    let cases = [
        (4, 8, ModelError::OffsetOutOfRange { offset: 12, len: 11 }),
        (
            1,
            usize::MAX,
            ModelError::OffsetOutOfRange {
                offset: usize::MAX,
                len: 11,
            },
        ),
    ];
    for (offset, length, cause) in cases {
        for op in range_ops(offset, length) {
            let err = op.apply(&v).unwrap_err();
            assert_eq!(err.cause(), &cause, "{}", op.name());
            assert_eq!(op.invert(&v).unwrap_err().cause(), &cause, "{}", op.name());
        }
    }

    assert_eq!(v.version(), 0);
    assert_eq!(serialized(&v), before);
}

#[test]
fn test_every_operation_inverts() {
    for op in all_operations() {
        let before = value();
        let inverses = op.invert(&before).unwrap();
        let mut after = op.apply(&before).unwrap();
        assert_ne!(after.version(), before.version());
        for inverse in &inverses {
            after = inverse.apply(&after).unwrap();
        }
        assert_eq!(serialized(&after), serialized(&before), "{} did not invert", op.name());
    }
}

#[test]
fn test_selection_stays_valid_after_every_operation() {
    for op in all_operations() {
        let next = op.apply(&value()).unwrap();
        assert!(next.selection_is_valid(), "{} left a dangling selection", op.name());
        assert!(next.selection().is_some(), "{} dropped the selection", op.name());
    }
}

#[test]
fn test_removed_selection_reanchors_to_previous_text() {
    let next = Operation::RemoveNode { key: "b2".into() }.apply(&value()).unwrap();
    let selection = next.selection().unwrap();
    assert_eq!(selection.anchor, Point::new("t1", 4));
    assert_eq!(selection.focus, Point::new("t3", 1));
}

#[test]
fn test_remove_text_inverse_restores_marks() {
    let before = value();
    let op = Operation::RemoveText {
        key: "t1".into(),
        offset: 0,
        length: 5,
    };
    let inverses = op.invert(&before).unwrap();
    assert_eq!(
        inverses,
        vec![
            Operation::InsertText {
                key: "t1".into(),
                offset: 0,
                text: "Cat".into(),
                marks: Some(marks(&["bold"])),
            },
            Operation::InsertText {
                key: "t1".into(),
                offset: 3,
                text: " i".into(),
                marks: Some(MarkSet::new()),
            },
        ]
    );
}

#[test]
fn test_operation_log_parses() {
    let ops: Vec<Operation> = serde_json::from_str(
        r#"[
            { "type": "insert_text", "key": "t1", "offset": 0, "text": "A " },
            { "type": "add_mark", "key": "t1", "offset": 0, "length": 1, "mark": { "type": "bold" } },
            { "type": "set_node", "key": "b1", "properties": { "type": "heading" } },
            { "type": "move_node", "key": "b3", "new_parent": "doc", "index": 0 },
            { "type": "set_selection", "selection": null }
        ]"#,
    )
    .unwrap();

    let mut v = value();
    for op in &ops {
        v = op.apply(&v).unwrap();
    }
    assert_eq!(v.version(), 5);
    assert!(v.selection().is_none());
    assert_eq!(v.document().nodes()[0].key(), "b3");
    assert_eq!(
        v.document().get_descendant("b1").unwrap().as_element().unwrap().node_type(),
        "heading"
    );
}
