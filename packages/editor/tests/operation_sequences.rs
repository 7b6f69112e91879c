//! Editor-level sequences: batches, normalization and undo/redo

use folio_editor::{Editor, EditorConfig, EditorError, Operation};
use folio_model::{
    Document, Element, Leaves, Mark, Node, NodeProperties, Point, Range, SerializeOptions, Text, Value,
};
use pretty_assertions::assert_eq;

fn paragraph(key: &str, text_key: &str, text: &str) -> Node {
    Node::block(Element::new(key, "paragraph").with_child(Node::text(Text::new(text_key, Leaves::plain(text)))))
}

fn value() -> Value {
    Value::new(
        Document::new(
            "doc",
            vec![
                paragraph("b1", "t1", "Hello"),
                paragraph("b2", "t2", "big"),
                paragraph("b3", "t3", "World"),
            ],
        )
        .unwrap(),
    )
}

fn snapshot(editor: &Editor) -> serde_json::Value {
    editor
        .value()
        .to_json_value(SerializeOptions {
            preserve_keys: true,
            preserve_selection: false,
        })
        .unwrap()
}

fn insert(key: &str, offset: usize, text: &str) -> Operation {
    Operation::InsertText {
        key: key.into(),
        offset,
        text: text.into(),
        marks: None,
    }
}

#[test]
fn test_delete_across_blocks_undoes_in_one_step() {
    let mut editor = Editor::new(value());
    let original = snapshot(&editor);

    editor
        .change(|c| {
            c.describe("Delete");
            c.select(&Range::new(Point::new("t1", 2), Point::new("t3", 3)))?;
            c.delete_selection()?;
            Ok(())
        })
        .unwrap();

    let doc = editor.value().document();
    assert_eq!(doc.text(), "Held");
    assert_eq!(doc.nodes().len(), 1);
    // The merged texts are joined by normalization
    assert_eq!(doc.texts().len(), 1);
    assert_eq!(editor.value().selection().unwrap().anchor, Point::new("t1", 2));
    assert_eq!(editor.history().undo_levels(), 1);
    assert_eq!(editor.history().undo_description(), Some("Delete"));

    assert!(editor.undo().unwrap());
    assert_eq!(snapshot(&editor), original);

    assert!(editor.redo().unwrap());
    assert_eq!(editor.value().document().text(), "Held");
}

#[test]
fn test_wrap_then_unwrap_restores_structure() {
    let mut editor = Editor::new(value());
    let original = snapshot(&editor);

    let mut wrapper = String::new();
    editor
        .change(|c| {
            wrapper = c.wrap_block("b2", "quote")?;
            Ok(())
        })
        .unwrap();
    {
        let doc = editor.value().document();
        assert_eq!(doc.parent_of("b2").unwrap(), (wrapper.clone(), 0));
        assert_eq!(doc.get_descendant(&wrapper).unwrap().as_element().unwrap().node_type(), "quote");
    }

    editor.change(|c| c.unwrap_block(&wrapper).map(|_| ())).unwrap();
    assert_eq!(snapshot(&editor), original);
    assert_eq!(editor.history().undo_levels(), 2);

    editor.undo().unwrap();
    assert!(editor.value().document().has_descendant(&wrapper));
    editor.undo().unwrap();
    assert_eq!(snapshot(&editor), original);
}

#[test]
fn test_split_block_then_type() {
    let mut editor = Editor::new(value());
    let original = snapshot(&editor);

    let mut new_block = String::new();
    editor
        .change(|c| {
            new_block = c.split_block_at(&Point::new("t1", 2))?;
            c.insert_text_at(&Point::new(new_block.clone(), 0), "X")?;
            Ok(())
        })
        .unwrap();

    let doc = editor.value().document();
    assert_eq!(doc.nodes().len(), 4);
    assert_eq!(doc.get_descendant("b1").unwrap().text_content(), "He");
    assert_eq!(doc.get_descendant(&new_block).unwrap().text_content(), "Xllo");

    editor.undo().unwrap();
    assert_eq!(snapshot(&editor), original);
}

#[test]
fn test_emptied_element_gets_a_text_back() {
    let mut editor = Editor::new(value());
    editor.apply(Operation::RemoveNode { key: "t2".into() }).unwrap();

    let b2 = editor.value().document().get_descendant("b2").unwrap();
    assert_eq!(b2.nodes().len(), 1);
    assert!(b2.nodes()[0].is_text());
    assert_eq!(b2.text_content(), "");
    assert!(editor.value().selection_is_valid());

    editor.undo().unwrap();
    assert_eq!(editor.value().document().assert_text("t2").unwrap().text(), "big");
    assert_eq!(editor.value().document().get_descendant("b2").unwrap().nodes().len(), 1);
}

#[test]
fn test_normalization_can_be_disabled() {
    let config = EditorConfig {
        normalize: false,
        ..EditorConfig::default()
    };
    let mut editor = Editor::with_config(value(), config);
    editor
        .apply(Operation::SplitNode {
            key: "t1".into(),
            position: 2,
            new_key: "t1b".into(),
            properties: None,
        })
        .unwrap();
    assert_eq!(editor.value().document().get_descendant("b1").unwrap().nodes().len(), 2);
}

#[test]
fn test_apply_all_records_separate_steps() {
    let mut editor = Editor::new(value());
    editor
        .apply_all(vec![insert("t1", 5, "!"), insert("t2", 0, "so "), insert("t3", 5, ".")])
        .unwrap();
    assert_eq!(editor.value().document().text(), "Hello!so bigWorld.");
    assert_eq!(editor.history().undo_levels(), 3);

    editor.undo().unwrap();
    assert_eq!(editor.value().document().text(), "Hello!so bigWorld");
}

#[test]
fn test_apply_all_stops_at_first_failure() {
    let mut editor = Editor::new(value());
    let err = editor
        .apply_all(vec![insert("t1", 5, "!"), insert("t2", 99, "x"), insert("t3", 0, "never")])
        .unwrap_err();
    assert!(matches!(err, EditorError::Operation(_)));
    assert_eq!(editor.value().document().text(), "Hello!bigWorld");
    assert_eq!(editor.history().undo_levels(), 1);
}

#[test]
fn test_manual_batch_groups_applies() {
    let mut editor = Editor::new(value());
    editor.begin_batch();
    editor.apply(insert("t1", 0, "Oh ")).unwrap();
    editor
        .apply(Operation::SetNode {
            key: "b1".into(),
            properties: NodeProperties::node_type("heading"),
        })
        .unwrap();
    editor.end_batch();

    assert_eq!(editor.history().undo_levels(), 1);
    editor.undo().unwrap();
    let doc = editor.value().document();
    assert_eq!(doc.text(), "HellobigWorld");
    assert_eq!(doc.get_descendant("b1").unwrap().as_element().unwrap().node_type(), "paragraph");
}

#[test]
fn test_max_undo_levels() {
    let config = EditorConfig {
        max_undo_levels: 2,
        ..EditorConfig::default()
    };
    let mut editor = Editor::with_config(value(), config);
    for (i, s) in ["a", "b", "c"].iter().enumerate() {
        editor.apply(insert("t1", 5 + i, s)).unwrap();
    }
    assert_eq!(editor.history().undo_levels(), 2);

    assert!(editor.undo().unwrap());
    assert!(editor.undo().unwrap());
    assert!(!editor.undo().unwrap());
    assert_eq!(editor.value().document().assert_text("t1").unwrap().text(), "Helloa");
}

#[test]
fn test_new_edit_clears_redo() {
    let mut editor = Editor::new(value());
    editor.apply(insert("t1", 0, "A")).unwrap();
    editor.undo().unwrap();
    assert!(editor.history().can_redo());

    editor
        .change(|c| {
            c.add_mark_in_range(&Range::new(Point::new("t1", 0), Point::new("t1", 5)), &Mark::new("bold"))?;
            Ok(())
        })
        .unwrap();
    assert!(!editor.history().can_redo());
    assert!(!editor.redo().unwrap());
}

#[test]
fn test_version_increases_with_each_operation() {
    let mut editor = Editor::new(value());
    let start = editor.value().version();
    editor.apply(insert("t1", 0, "A")).unwrap();
    editor.apply(insert("t1", 0, "B")).unwrap();
    assert_eq!(editor.value().version(), start + 2);
    editor.undo().unwrap();
    assert!(editor.value().version() > start + 2);
}
