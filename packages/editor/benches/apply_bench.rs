use criterion::{black_box, criterion_group, criterion_main, Criterion};
use folio_editor::{Editor, Operation};
use folio_model::{Document, Element, Leaves, Node, Point, Range, Text, Value};

fn large_value(blocks: usize) -> Value {
    let nodes = (0..blocks)
        .map(|i| {
            Node::block(
                Element::new(format!("b{i}"), "paragraph").with_child(Node::text(Text::new(
                    format!("t{i}"),
                    Leaves::plain("The quick brown fox jumps over the lazy dog"),
                ))),
            )
        })
        .collect();
    Value::new(Document::new("doc", nodes).unwrap())
}

fn insert_text_in_large_document(c: &mut Criterion) {
    let value = large_value(2_000);
    let op = Operation::InsertText {
        key: "t1500".to_string(),
        offset: 4,
        text: "very ".to_string(),
        marks: None,
    };

    c.bench_function("insert_text_2000_blocks", |b| {
        b.iter(|| op.apply(black_box(&value)).unwrap())
    });
}

fn split_and_merge_block(c: &mut Criterion) {
    let value = large_value(2_000);
    let split = Operation::SplitNode {
        key: "b1000".to_string(),
        position: 0,
        new_key: "b-new".to_string(),
        properties: None,
    };
    let merge = Operation::MergeNode {
        key: "b-new".to_string(),
    };

    c.bench_function("split_merge_2000_blocks", |b| {
        b.iter(|| {
            let split_value = split.apply(black_box(&value)).unwrap();
            merge.apply(&split_value).unwrap()
        })
    });
}

fn editor_typing_session(c: &mut Criterion) {
    c.bench_function("editor_type_100_chars", |b| {
        b.iter(|| {
            let mut editor = Editor::new(large_value(200));
            editor
                .apply(Operation::SetSelection {
                    selection: Some(Range::collapsed(Point::new("t100", 0))),
                })
                .unwrap();
            for i in 0..100 {
                editor
                    .apply(Operation::InsertText {
                        key: "t100".to_string(),
                        offset: i,
                        text: "x".to_string(),
                        marks: None,
                    })
                    .unwrap();
            }
            editor
        })
    });
}

criterion_group!(
    benches,
    insert_text_in_large_document,
    split_and_merge_block,
    editor_typing_session
);
criterion_main!(benches);
