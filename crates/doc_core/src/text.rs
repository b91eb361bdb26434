//! Plain-text extraction
//!
//! Text is produced by a visitor and carries control characters marking the
//! end of structural nodes.

use crate::{Document, DocumentVisitor, Node, NodeId, Result, VisitorAction};

/// Emitted after each paragraph
pub const PARAGRAPH_BREAK: char = '\r';
/// Emitted after each cell
pub const CELL_END: char = '\u{7}';
/// Emitted after each row, following the last cell's `CELL_END`
pub const ROW_END: char = '\u{7}';
/// Emitted after each section
pub const SECTION_BREAK: char = '\u{c}';

/// Collects text, optionally only between a pair of bookmark markers
struct TextCollector {
    out: String,
    bounds: Option<(NodeId, NodeId)>,
    capturing: bool,
}

impl TextCollector {
    fn whole() -> Self {
        Self {
            out: String::new(),
            bounds: None,
            capturing: true,
        }
    }

    fn between(start: NodeId, end: NodeId) -> Self {
        Self {
            out: String::new(),
            bounds: Some((start, end)),
            capturing: false,
        }
    }

    fn push(&mut self, c: char) -> VisitorAction {
        if self.capturing {
            self.out.push(c);
        }
        VisitorAction::Continue
    }
}

impl DocumentVisitor for TextCollector {
    fn visit_run(&mut self, run: &Node) -> VisitorAction {
        if self.capturing {
            self.out.push_str(run.text().unwrap_or_default());
        }
        VisitorAction::Continue
    }

    fn visit_paragraph_end(&mut self, _: &Node) -> VisitorAction {
        self.push(PARAGRAPH_BREAK)
    }

    fn visit_cell_end(&mut self, _: &Node) -> VisitorAction {
        self.push(CELL_END)
    }

    fn visit_row_end(&mut self, _: &Node) -> VisitorAction {
        self.push(ROW_END)
    }

    fn visit_section_end(&mut self, _: &Node) -> VisitorAction {
        self.push(SECTION_BREAK)
    }

    fn visit_bookmark_start(&mut self, marker: &Node) -> VisitorAction {
        if self.bounds.is_some_and(|(start, _)| start == marker.id()) {
            self.capturing = true;
        }
        VisitorAction::Continue
    }

    fn visit_bookmark_end(&mut self, marker: &Node) -> VisitorAction {
        if self.bounds.is_some_and(|(_, end)| end == marker.id()) {
            self.capturing = false;
            return VisitorAction::Stop;
        }
        VisitorAction::Continue
    }
}

impl Document {
    /// Text of a subtree
    pub fn text(&self, node: NodeId) -> Result<String> {
        let mut collector = TextCollector::whole();
        self.accept(node, &mut collector)?;
        Ok(collector.out)
    }

    /// Text within `scope` strictly between two markers
    pub(crate) fn text_between(&self, scope: NodeId, start: NodeId, end: NodeId) -> Result<String> {
        let mut collector = TextCollector::between(start, end);
        self.accept(scope, &mut collector)?;
        Ok(collector.out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paragraph_text() {
        let mut doc = Document::default();
        let para = doc.paragraphs()[0];
        for text in ["Hello", ", ", "world"] {
            let run = doc.create_run(text);
            doc.append_child(para, run).unwrap();
        }
        assert_eq!(doc.text(para).unwrap(), "Hello, world\r");
        assert_eq!(doc.text(doc.root()).unwrap(), "Hello, world\r\u{c}");
    }

    #[test]
    fn test_table_text() {
        let mut doc = Document::default();
        let section = doc.first_section().unwrap();
        let table = doc.create_table();
        doc.append_child(section, table).unwrap();
        for texts in [["Apples", "20"], ["Bananas", "50"]] {
            let row = doc.create_row();
            doc.append_child(table, row).unwrap();
            for text in texts {
                let cell = doc.create_cell();
                doc.append_child(row, cell).unwrap();
                let para = doc.create_paragraph();
                doc.append_child(cell, para).unwrap();
                let run = doc.create_run(text);
                doc.append_child(para, run).unwrap();
            }
        }

        let first_row = doc.first_child(table).unwrap();
        assert_eq!(doc.text(first_row).unwrap(), "Apples\r\u{7}20\r\u{7}\u{7}");
        let last_cell = doc.last_child(doc.last_child(table).unwrap()).unwrap();
        assert_eq!(doc.text(last_cell).unwrap(), "50\r\u{7}");
    }

    #[test]
    fn test_empty_run_and_leaf() {
        let mut doc = Document::new();
        let run = doc.create_run("");
        assert_eq!(doc.text(run).unwrap(), "");
        let marker = doc.create_bookmark_start("b").unwrap();
        assert_eq!(doc.text(marker).unwrap(), "");
    }
}
