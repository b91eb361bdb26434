//! Visitor traversal over the node tree
//!
//! Composite nodes get a start and an end callback, leaves a single one.
//! Every callback steers the walk through its [`VisitorAction`].

use crate::{Document, Node, NodeId, NodeKind, Result};

/// What the traversal should do after a callback
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VisitorAction {
    /// Keep going
    #[default]
    Continue,
    /// Skip the children (and end callback) of the current node
    SkipThisNode,
    /// Abort the whole traversal
    Stop,
}

/// Callbacks for a document walk. Every method defaults to `Continue`.
#[allow(unused_variables)]
pub trait DocumentVisitor {
    fn visit_document_start(&mut self, document: &Node) -> VisitorAction {
        VisitorAction::Continue
    }
    fn visit_document_end(&mut self, document: &Node) -> VisitorAction {
        VisitorAction::Continue
    }
    fn visit_section_start(&mut self, section: &Node) -> VisitorAction {
        VisitorAction::Continue
    }
    fn visit_section_end(&mut self, section: &Node) -> VisitorAction {
        VisitorAction::Continue
    }
    fn visit_paragraph_start(&mut self, paragraph: &Node) -> VisitorAction {
        VisitorAction::Continue
    }
    fn visit_paragraph_end(&mut self, paragraph: &Node) -> VisitorAction {
        VisitorAction::Continue
    }
    fn visit_table_start(&mut self, table: &Node) -> VisitorAction {
        VisitorAction::Continue
    }
    fn visit_table_end(&mut self, table: &Node) -> VisitorAction {
        VisitorAction::Continue
    }
    fn visit_row_start(&mut self, row: &Node) -> VisitorAction {
        VisitorAction::Continue
    }
    fn visit_row_end(&mut self, row: &Node) -> VisitorAction {
        VisitorAction::Continue
    }
    fn visit_cell_start(&mut self, cell: &Node) -> VisitorAction {
        VisitorAction::Continue
    }
    fn visit_cell_end(&mut self, cell: &Node) -> VisitorAction {
        VisitorAction::Continue
    }
    fn visit_run(&mut self, run: &Node) -> VisitorAction {
        VisitorAction::Continue
    }
    fn visit_bookmark_start(&mut self, marker: &Node) -> VisitorAction {
        VisitorAction::Continue
    }
    fn visit_bookmark_end(&mut self, marker: &Node) -> VisitorAction {
        VisitorAction::Continue
    }
}

impl Document {
    /// Walk the subtree rooted at `node` in document order.
    ///
    /// Returns `Stop` if a callback stopped the walk, `Continue` otherwise.
    pub fn accept<V: DocumentVisitor + ?Sized>(
        &self,
        node: NodeId,
        visitor: &mut V,
    ) -> Result<VisitorAction> {
        tracing::trace!(node = %node, "visitor walk");
        self.accept_node(node, visitor)
    }

    fn accept_node<V: DocumentVisitor + ?Sized>(
        &self,
        id: NodeId,
        visitor: &mut V,
    ) -> Result<VisitorAction> {
        let node = self.node(id)?;

        let start = match node.kind() {
            NodeKind::Run { .. } => return Ok(stop_or_continue(visitor.visit_run(node))),
            NodeKind::BookmarkStart { .. } => {
                return Ok(stop_or_continue(visitor.visit_bookmark_start(node)))
            }
            NodeKind::BookmarkEnd { .. } => {
                return Ok(stop_or_continue(visitor.visit_bookmark_end(node)))
            }
            NodeKind::Document => visitor.visit_document_start(node),
            NodeKind::Section(_) => visitor.visit_section_start(node),
            NodeKind::Paragraph(_) => visitor.visit_paragraph_start(node),
            NodeKind::Table(_) => visitor.visit_table_start(node),
            NodeKind::Row(_) => visitor.visit_row_start(node),
            NodeKind::Cell(_) => visitor.visit_cell_start(node),
        };
        match start {
            VisitorAction::Stop => return Ok(VisitorAction::Stop),
            VisitorAction::SkipThisNode => return Ok(VisitorAction::Continue),
            VisitorAction::Continue => {}
        }

        for &child in node.children() {
            if self.accept_node(child, visitor)? == VisitorAction::Stop {
                return Ok(VisitorAction::Stop);
            }
        }

        let end = match node.kind() {
            NodeKind::Document => visitor.visit_document_end(node),
            NodeKind::Section(_) => visitor.visit_section_end(node),
            NodeKind::Paragraph(_) => visitor.visit_paragraph_end(node),
            NodeKind::Table(_) => visitor.visit_table_end(node),
            NodeKind::Row(_) => visitor.visit_row_end(node),
            NodeKind::Cell(_) => visitor.visit_cell_end(node),
            _ => VisitorAction::Continue,
        };
        Ok(stop_or_continue(end))
    }
}

fn stop_or_continue(action: VisitorAction) -> VisitorAction {
    match action {
        VisitorAction::Stop => VisitorAction::Stop,
        _ => VisitorAction::Continue,
    }
}
