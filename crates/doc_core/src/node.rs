//! Node types and payloads stored in the document arena

use crate::{CellFormat, DocumentId, NodeId, RowProperties, TableProperties};
use serde::{Deserialize, Serialize};

/// Discriminator for every node kind in the document tree
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeType {
    Document,
    Section,
    Paragraph,
    Run,
    Table,
    Row,
    Cell,
    BookmarkStart,
    BookmarkEnd,
}

impl NodeType {
    /// Whether nodes of this type may own children
    pub fn is_composite(self) -> bool {
        matches!(
            self,
            NodeType::Document
                | NodeType::Section
                | NodeType::Paragraph
                | NodeType::Table
                | NodeType::Row
                | NodeType::Cell
        )
    }

    /// Whether a node of type `child` may be placed directly under this type
    pub fn can_contain(self, child: NodeType) -> bool {
        use NodeType::*;
        match self {
            Document => child == Section,
            Section | Cell => matches!(child, Paragraph | Table),
            Paragraph => matches!(child, Run | BookmarkStart | BookmarkEnd),
            Table => child == Row,
            Row => child == Cell,
            Run | BookmarkStart | BookmarkEnd => false,
        }
    }

    /// Whether this is a bookmark marker
    pub fn is_bookmark_marker(self) -> bool {
        matches!(self, NodeType::BookmarkStart | NodeType::BookmarkEnd)
    }
}

impl std::fmt::Display for NodeType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

// =============================================================================
// Payloads
// =============================================================================

/// Page setup configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageSetup {
    /// Page width in points
    pub width: f32,
    /// Page height in points
    pub height: f32,
    pub margin_top: f32,
    pub margin_bottom: f32,
    pub margin_left: f32,
    pub margin_right: f32,
}

impl Default for PageSetup {
    fn default() -> Self {
        // US Letter with 1-inch margins
        Self {
            width: 612.0,
            height: 792.0,
            margin_top: 72.0,
            margin_bottom: 72.0,
            margin_left: 72.0,
            margin_right: 72.0,
        }
    }
}

impl PageSetup {
    /// Width available between the left and right margins
    pub fn content_width(&self) -> f32 {
        (self.width - self.margin_left - self.margin_right).max(0.0)
    }
}

/// Section-level properties
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SectionProperties {
    pub page_setup: PageSetup,
}

/// Text alignment options
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Alignment {
    #[default]
    Left,
    Center,
    Right,
    Justify,
}

/// Paragraph-level formatting
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParagraphProperties {
    /// Style ID reference
    pub style_id: Option<String>,
    pub alignment: Option<Alignment>,
    /// Space after paragraph in points
    pub space_after: Option<f32>,
}

/// Character-level formatting
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunProperties {
    pub bold: Option<bool>,
    pub italic: Option<bool>,
    /// Font size in points
    pub font_size: Option<f32>,
    pub font_family: Option<String>,
}

/// The typed payload of a node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum NodeKind {
    Document,
    Section(SectionProperties),
    Paragraph(ParagraphProperties),
    Run { text: String, properties: RunProperties },
    Table(TableProperties),
    Row(RowProperties),
    Cell(CellFormat),
    BookmarkStart { name: String },
    BookmarkEnd { name: String },
}

impl NodeKind {
    /// The discriminator for this payload
    pub fn node_type(&self) -> NodeType {
        match self {
            NodeKind::Document => NodeType::Document,
            NodeKind::Section(_) => NodeType::Section,
            NodeKind::Paragraph(_) => NodeType::Paragraph,
            NodeKind::Run { .. } => NodeType::Run,
            NodeKind::Table(_) => NodeType::Table,
            NodeKind::Row(_) => NodeType::Row,
            NodeKind::Cell(_) => NodeType::Cell,
            NodeKind::BookmarkStart { .. } => NodeType::BookmarkStart,
            NodeKind::BookmarkEnd { .. } => NodeType::BookmarkEnd,
        }
    }
}

// =============================================================================
// Node
// =============================================================================

/// A node stored in a document arena.
///
/// Parent and children are handles into the same arena; the arena owns every
/// node, so there is no ownership cycle between a parent and its children.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Node {
    id: NodeId,
    document: DocumentId,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    kind: NodeKind,
}

impl Node {
    pub(crate) fn new(id: NodeId, kind: NodeKind) -> Self {
        Self {
            id,
            document: id.document(),
            parent: None,
            children: Vec::new(),
            kind,
        }
    }

    /// Get the ID of this node
    pub fn id(&self) -> NodeId {
        self.id
    }

    /// The document that owns this node
    pub fn document(&self) -> DocumentId {
        self.document
    }

    /// Get the type of this node
    pub fn node_type(&self) -> NodeType {
        self.kind.node_type()
    }

    /// Get the typed payload
    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }

    pub(crate) fn kind_mut(&mut self) -> &mut NodeKind {
        &mut self.kind
    }

    /// Get the ID of the parent node (None for the root and detached nodes)
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub(crate) fn set_parent(&mut self, parent: Option<NodeId>) {
        self.parent = parent;
    }

    /// Get the IDs of child nodes in order
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub(crate) fn children_mut(&mut self) -> &mut Vec<NodeId> {
        &mut self.children
    }

    /// Check if this node can have children
    pub fn is_composite(&self) -> bool {
        self.node_type().is_composite()
    }

    /// Text of a run
    pub fn text(&self) -> Option<&str> {
        match &self.kind {
            NodeKind::Run { text, .. } => Some(text),
            _ => None,
        }
    }

    /// Name carried by a bookmark marker
    pub fn bookmark_name(&self) -> Option<&str> {
        match &self.kind {
            NodeKind::BookmarkStart { name } | NodeKind::BookmarkEnd { name } => Some(name),
            _ => None,
        }
    }

    /// Table properties, if this is a table
    pub fn as_table(&self) -> Option<&TableProperties> {
        match &self.kind {
            NodeKind::Table(props) => Some(props),
            _ => None,
        }
    }

    /// Row properties, if this is a row
    pub fn as_row(&self) -> Option<&RowProperties> {
        match &self.kind {
            NodeKind::Row(props) => Some(props),
            _ => None,
        }
    }

    /// Cell format, if this is a cell
    pub fn as_cell(&self) -> Option<&CellFormat> {
        match &self.kind {
            NodeKind::Cell(format) => Some(format),
            _ => None,
        }
    }

    pub(crate) fn as_cell_mut(&mut self) -> Option<&mut CellFormat> {
        match &mut self.kind {
            NodeKind::Cell(format) => Some(format),
            _ => None,
        }
    }
}
