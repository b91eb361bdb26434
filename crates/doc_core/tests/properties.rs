//! Property-based tests for the node tree, bookmarks, and table operations

use doc_core::{CellMerge, DocModelError, Document, NodeId, NodeType};
use std::cmp::Ordering;
use std::collections::HashMap;
use proptest::prelude::*;

/// One random structural edit. Selectors index into the handle pool modulo
/// its length, so any value is usable.
#[derive(Debug, Clone)]
enum TreeOp {
    Create(u8),
    /// Bookmark start (`true`) or end marker named `bm{n}`
    Marker(bool, u8),
    Insert { parent: usize, child: usize, position: usize },
    Detach(usize),
    Remove(usize),
}

fn tree_op_strategy() -> impl Strategy<Value = TreeOp> {
    prop_oneof![
        (0u8..6).prop_map(TreeOp::Create),
        (any::<bool>(), 0u8..3).prop_map(|(start, n)| TreeOp::Marker(start, n)),
        (any::<usize>(), any::<usize>(), 0usize..4)
            .prop_map(|(parent, child, position)| TreeOp::Insert { parent, child, position }),
        any::<usize>().prop_map(TreeOp::Detach),
        any::<usize>().prop_map(TreeOp::Remove),
    ]
}

fn create(doc: &mut Document, kind: u8) -> NodeId {
    match kind {
        0 => doc.create_section(),
        1 => doc.create_paragraph(),
        2 => doc.create_run("x"),
        3 => doc.create_table(),
        4 => doc.create_row(),
        _ => doc.create_cell(),
    }
}

fn pick(pool: &[NodeId], i: usize) -> NodeId {
    pool[i % pool.len()]
}

fn apply(doc: &mut Document, pool: &mut Vec<NodeId>, op: &TreeOp) {
    match *op {
        TreeOp::Create(kind) => {
            let id = create(doc, kind);
            pool.push(id);
        }
        TreeOp::Marker(start, n) => {
            let name = format!("bm{}", n);
            let marker = if start {
                doc.create_bookmark_start(name)
            } else {
                doc.create_bookmark_end(name)
            };
            pool.extend(marker.ok());
        }
        TreeOp::Insert { parent, child, position } => {
            let (parent, child) = (pick(pool, parent), pick(pool, child));
            let index = position.min(doc.children(parent).len());
            let _ = doc.insert_child(parent, index, child);
        }
        TreeOp::Detach(i) => {
            let _ = doc.detach(pick(pool, i));
        }
        TreeOp::Remove(i) => {
            let _ = doc.remove(pick(pool, i));
        }
    }
}

fn assert_tree_consistent(doc: &Document, pool: &[NodeId]) {
    assert!(doc.parent(doc.root()).is_none());
    let limit = doc.node_count();
    for &id in pool.iter().filter(|&&id| doc.contains(id)) {
        // Acyclic: walking up terminates within the number of live nodes.
        assert!(doc.ancestors(id).count() < limit);
        assert!(doc.ancestors(id).all(|a| a != id));

        if let Some(parent) = doc.parent(id) {
            assert!(doc.contains(parent));
            let occurrences = doc.children(parent).iter().filter(|&&c| c == id).count();
            assert_eq!(occurrences, 1, "node {} listed {} times", id, occurrences);
        }
        for &child in doc.children(id) {
            assert_eq!(doc.parent(child), Some(id));
            let (pt, ct) = (doc.node_type(id).unwrap(), doc.node_type(child).unwrap());
            assert!(pt.can_contain(ct));
        }
    }
}

/// The index agrees with the attached markers, and every complete bookmark
/// starts before it ends.
fn assert_bookmarks_consistent(doc: &Document) {
    let mut starts: HashMap<String, Vec<NodeId>> = HashMap::new();
    let mut ends: HashMap<String, Vec<NodeId>> = HashMap::new();
    for id in doc.descendants(doc.root()) {
        let node = doc.node(id).unwrap();
        let Some(name) = node.bookmark_name() else { continue };
        let bucket = if node.node_type() == NodeType::BookmarkStart {
            &mut starts
        } else {
            &mut ends
        };
        bucket.entry(name.to_string()).or_default().push(id);
    }
    assert!(starts.values().chain(ends.values()).all(|ids| ids.len() == 1));

    let bookmarks = doc.bookmarks();
    assert_eq!(bookmarks.len(), starts.len());
    for bookmark in bookmarks.iter() {
        assert_eq!(starts.get(&bookmark.name), Some(&vec![bookmark.start]));
        assert_eq!(bookmark.end.map(|e| vec![e]), ends.get(&bookmark.name).cloned());
        if let Some(end) = bookmark.end {
            assert_eq!(doc.compare_document_order(bookmark.start, end), Some(Ordering::Less));
        }
    }
}

fn paragraph_with_runs(doc: &mut Document, texts: &[String]) -> (NodeId, Vec<NodeId>) {
    let para = doc.paragraphs()[0];
    let runs: Vec<NodeId> = texts
        .iter()
        .map(|t| {
            let run = doc.create_run(t.clone());
            doc.append_child(para, run).unwrap();
            run
        })
        .collect();
    (para, runs)
}

fn grid_table(doc: &mut Document, rows: usize, cols: usize) -> NodeId {
    let section = doc.first_section().unwrap();
    let table = doc.create_table_with_widths(&vec![72.0; cols]);
    doc.append_child(section, table).unwrap();
    for r in 0..rows {
        let row = doc.create_row();
        doc.append_child(table, row).unwrap();
        for c in 0..cols {
            let cell = doc.create_cell_with_width(72.0);
            doc.append_child(row, cell).unwrap();
            let para = doc.create_paragraph();
            doc.append_child(cell, para).unwrap();
            let run = doc.create_run(format!("{}:{}", r, c));
            doc.append_child(para, run).unwrap();
        }
    }
    table
}

proptest! {
    #[test]
    fn tree_stays_acyclic_with_single_parents(ops in prop::collection::vec(tree_op_strategy(), 1..60)) {
        let mut doc = Document::default();
        let mut pool = vec![doc.root()];
        pool.extend(doc.descendants(doc.root()));
        for op in &ops {
            apply(&mut doc, &mut pool, op);
            assert_tree_consistent(&doc, &pool);
            assert_bookmarks_consistent(&doc);
        }
    }

    #[test]
    fn deep_clone_preserves_text(texts in prop::collection::vec("[a-z ]{0,8}", 0..6)) {
        let mut doc = Document::default();
        paragraph_with_runs(&mut doc, &texts);
        let section = doc.first_section().unwrap();
        let table = grid_table(&mut doc, 2, 2);

        for node in [section, table] {
            let copy = doc.clone_node(node, true).unwrap();
            prop_assert_eq!(doc.text(copy).unwrap(), doc.text(node).unwrap());
            prop_assert!(doc.parent(copy).is_none());
        }
    }

    #[test]
    fn removing_bookmark_keeps_content(
        texts in prop::collection::vec("[a-z]{1,5}", 1..8),
        a in any::<usize>(),
        b in any::<usize>(),
    ) {
        let mut doc = Document::default();
        let (para, runs) = paragraph_with_runs(&mut doc, &texts);
        let (i, j) = (a % runs.len(), b % runs.len());
        let (first, last) = (runs[i.min(j)], runs[i.max(j)]);
        doc.bookmarks_mut().insert("range", first, last).unwrap();
        let before = doc.text(para).unwrap();

        doc.bookmarks_mut().remove("range").unwrap();
        prop_assert_eq!(doc.children(para), runs.as_slice());
        prop_assert_eq!(doc.text(para).unwrap(), before);
        prop_assert!(doc.bookmarks().is_empty());
    }

    #[test]
    fn rename_collision_changes_nothing(names in prop::collection::hash_set("[A-Za-z][a-z0-9_]{0,6}", 2..5)) {
        let names: Vec<String> = names.into_iter().collect();
        let mut doc = Document::default();
        let texts: Vec<String> = names.iter().map(|_| "t".to_string()).collect();
        let (_, runs) = paragraph_with_runs(&mut doc, &texts);
        for (name, &run) in names.iter().zip(&runs) {
            doc.bookmarks_mut().insert(name, run, run).unwrap();
        }
        let before = doc.bookmarks().names();

        let result = doc.bookmarks_mut().rename(&names[0], &names[1]);
        prop_assert!(matches!(result, Err(DocModelError::DuplicateName(_))));
        prop_assert_eq!(doc.bookmarks().names(), before);
    }

    #[test]
    fn merge_marks_every_cell_with_one_first_per_group(
        rows in 2usize..5,
        cols in 2usize..5,
        r0 in 0usize..4, c0 in 0usize..4,
        r1 in 0usize..4, c1 in 0usize..4,
    ) {
        let (r0, r1) = (r0 % rows, r1 % rows);
        let (c0, c1) = (c0 % cols, c1 % cols);
        let (top, bottom, left, right) = (r0.min(r1), r0.max(r1), c0.min(c1), c0.max(c1));
        let (height, width) = (bottom - top + 1, right - left + 1);
        prop_assume!(height * width >= 2);

        let mut doc = Document::default();
        let table = grid_table(&mut doc, rows, cols);
        doc.merge_cells(table, (r0, c0), (r1, c1)).unwrap();

        let mut merged = 0;
        for r in 0..rows {
            let mut horizontal_firsts = 0;
            for c in 0..cols {
                let cell = doc.cell_at(table, r, c).unwrap().unwrap();
                let format = doc.node(cell).unwrap().as_cell().unwrap().clone();
                let inside = (top..=bottom).contains(&r) && (left..=right).contains(&c);
                prop_assert_eq!(format.is_merged(), inside);
                if format.is_merged() {
                    merged += 1;
                }
                if format.horizontal_merge == CellMerge::First {
                    horizontal_firsts += 1;
                }
            }
            let expected = usize::from(width > 1 && (top..=bottom).contains(&r));
            prop_assert_eq!(horizontal_firsts, expected);
        }
        prop_assert_eq!(merged, height * width);

        for c in 0..cols {
            let vertical_firsts = (0..rows)
                .filter(|&r| {
                    let cell = doc.cell_at(table, r, c).unwrap().unwrap();
                    doc.node(cell).unwrap().as_cell().unwrap().vertical_merge == CellMerge::First
                })
                .count();
            let expected = usize::from(height > 1 && (left..=right).contains(&c));
            prop_assert_eq!(vertical_firsts, expected);
        }

        let regions = doc.resolve_grid(table).unwrap().merged_regions();
        prop_assert_eq!(regions.len(), 1);
        prop_assert_eq!((regions[0].row_span(), regions[0].col_span()), (height, width));
    }

    #[test]
    fn split_then_combine_preserves_rows(rows in 2usize..8, at in 1usize..8) {
        prop_assume!(at < rows);
        let mut doc = Document::default();
        let table = grid_table(&mut doc, rows, 2);
        let original = doc.rows(table).unwrap();

        let second = doc.split_table(table, at).unwrap();
        let mut joined = doc.rows(table).unwrap();
        joined.extend(doc.rows(second).unwrap());
        prop_assert_eq!(&joined, &original);
        prop_assert_eq!(doc.node_type(second), Some(NodeType::Table));

        doc.combine_tables(table, second).unwrap();
        prop_assert_eq!(doc.rows(table).unwrap(), original);
    }
}
