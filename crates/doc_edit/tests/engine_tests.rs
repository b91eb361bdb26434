//! End-to-end editing sessions through the engine

use doc_core::{CellMerge, Document, NodeId, NodeType};
use doc_edit::{
    ClearBookmarks, Command, EditError, EditingEngine, InsertBookmark, InsertClone, InsertRun,
    MergeCells, RenameBookmark, SetRunText, SplitTable,
};
use proptest::prelude::*;

fn document_with_table() -> (Document, NodeId) {
    let mut doc = Document::with_empty_paragraph();
    let section = doc.first_section().unwrap();
    let table = doc.create_table_with_widths(&[50.0, 50.0]);
    doc.append_child(section, table).unwrap();
    for r in 0..3 {
        let row = doc.create_row();
        doc.append_child(table, row).unwrap();
        for c in 0..2 {
            let cell = doc.create_cell_with_width(50.0);
            doc.append_child(row, cell).unwrap();
            let para = doc.create_paragraph();
            doc.append_child(cell, para).unwrap();
            let run = doc.create_run(format!("r{}c{}", r, c));
            doc.append_child(para, run).unwrap();
        }
    }
    (doc, table)
}

fn root_text(engine: &EditingEngine) -> String {
    let doc = engine.document();
    doc.text(doc.root()).unwrap()
}

#[test]
fn test_bookmark_session() {
    let mut engine = EditingEngine::new();
    let para = engine.document().paragraphs()[0];
    engine.execute(Box::new(InsertRun::new(para, None, "Dear "))).unwrap();
    engine.execute(Box::new(InsertRun::new(para, None, "customer"))).unwrap();
    let name_run = engine.document().children(para)[1];

    engine
        .execute(Box::new(InsertBookmark::new("Recipient", name_run, name_run)))
        .unwrap();
    engine
        .execute(Box::new(RenameBookmark::new("Recipient", "Addressee")))
        .unwrap();
    assert_eq!(
        engine.document().bookmarks().text("Addressee").unwrap(),
        "customer"
    );

    engine.undo().unwrap();
    assert!(engine.document().bookmarks().contains("Recipient"));
    engine.undo().unwrap();
    assert!(engine.document().bookmarks().is_empty());
    assert_eq!(root_text(&engine), "Dear customer\r\u{c}");

    engine.redo().unwrap();
    engine.redo().unwrap();
    assert_eq!(engine.document().bookmarks().names(), vec!["Addressee"]);
}

#[test]
fn test_failed_rename_keeps_history() {
    let mut engine = EditingEngine::new();
    let para = engine.document().paragraphs()[0];
    engine.execute(Box::new(InsertRun::new(para, None, "a"))).unwrap();
    engine.execute(Box::new(InsertRun::new(para, None, "b"))).unwrap();
    let runs = engine.document().children(para).to_vec();
    engine.execute(Box::new(InsertBookmark::new("x", runs[0], runs[0]))).unwrap();
    engine.execute(Box::new(InsertBookmark::new("y", runs[1], runs[1]))).unwrap();

    let err = engine
        .execute(Box::new(RenameBookmark::new("x", "y")))
        .unwrap_err();
    assert!(matches!(err, EditError::DocModel(_)));
    assert_eq!(engine.undo_name(), Some("Insert Bookmark"));
    assert_eq!(engine.document().bookmarks().names(), vec!["x", "y"]);
}

#[test]
fn test_table_session() {
    let (doc, table) = document_with_table();
    let mut engine = EditingEngine::with_document(doc);
    let before = root_text(&engine);

    engine.execute(Box::new(MergeCells::new(table, (0, 0), (0, 1)))).unwrap();
    let grid = engine.document().resolve_grid(table).unwrap();
    assert_eq!(grid.slot(0, 0).unwrap().horizontal_merge, CellMerge::First);
    assert_eq!(grid.slot(0, 1).unwrap().horizontal_merge, CellMerge::Previous);

    engine.execute(Box::new(SplitTable::new(table, 1))).unwrap();
    assert_eq!(engine.document().tables().len(), 2);

    engine.undo().unwrap();
    engine.undo().unwrap();
    assert_eq!(engine.document().tables(), vec![table]);
    assert_eq!(root_text(&engine), before);
    let grid = engine.document().resolve_grid(table).unwrap();
    assert!(grid.merged_regions().is_empty());
}

#[test]
fn test_clone_row_and_undo() {
    let (doc, table) = document_with_table();
    let last_row = doc.last_child(table).unwrap();
    let mut engine = EditingEngine::with_document(doc);

    engine
        .execute(Box::new(InsertClone::new(last_row, table, None, true)))
        .unwrap();
    assert_eq!(engine.document().row_count(table).unwrap(), 4);
    let copy = engine.document().last_child(table).unwrap();
    assert_eq!(engine.document().text(copy).unwrap(), "r2c0\r\u{7}r2c1\r\u{7}\u{7}");

    engine.undo().unwrap();
    assert_eq!(engine.document().row_count(table).unwrap(), 3);
    assert!(!engine.document().contains(copy));
}

#[test]
fn test_clear_bookmarks_undo_restores_all() {
    let (mut doc, table) = document_with_table();
    let paras = doc.descendants_of_type(table, NodeType::Paragraph);
    doc.bookmarks_mut().insert("first", paras[0], paras[0]).unwrap();
    doc.bookmarks_mut().insert("span", paras[2], paras[5]).unwrap();
    let text = doc.text(doc.root()).unwrap();

    let mut engine = EditingEngine::with_document(doc);
    engine.execute(Box::new(ClearBookmarks)).unwrap();
    assert!(engine.document().bookmarks().is_empty());
    assert_eq!(root_text(&engine), text);

    engine.undo().unwrap();
    assert_eq!(engine.document().bookmarks().names(), vec!["first", "span"]);
}

#[derive(Debug, Clone)]
enum Step {
    Insert(String),
    Edit(usize, String),
}

fn step_strategy() -> impl Strategy<Value = Step> {
    prop_oneof![
        "[a-z]{1,6}".prop_map(Step::Insert),
        (any::<usize>(), "[A-Z]{1,6}").prop_map(|(i, t)| Step::Edit(i, t)),
    ]
}

fn command_for(doc: &Document, para: NodeId, step: &Step) -> Box<dyn Command> {
    match step {
        Step::Insert(text) => Box::new(InsertRun::new(para, None, text.clone())),
        Step::Edit(i, text) => {
            let runs = doc.children(para);
            if runs.is_empty() {
                Box::new(InsertRun::new(para, Some(0), text.clone()))
            } else {
                Box::new(SetRunText::new(runs[i % runs.len()], text.clone()))
            }
        }
    }
}

proptest! {
    #[test]
    fn prop_undo_all_restores_text(steps in prop::collection::vec(step_strategy(), 1..12)) {
        let mut engine = EditingEngine::new();
        let para = engine.document().paragraphs()[0];
        let mut texts = vec![root_text(&engine)];
        for step in &steps {
            let command = command_for(engine.document(), para, step);
            engine.execute(command).unwrap();
            texts.push(root_text(&engine));
        }

        for expected in texts.iter().rev().skip(1) {
            engine.undo().unwrap();
            prop_assert_eq!(&root_text(&engine), expected);
        }
        prop_assert!(!engine.can_undo());

        for expected in texts.iter().skip(1) {
            engine.redo().unwrap();
            prop_assert_eq!(&root_text(&engine), expected);
        }
        prop_assert!(!engine.can_redo());
    }
}
