//! Document arena and node tree operations
//!
//! A [`Document`] owns every node it has ever created in a slot arena.
//! Nodes refer to each other through [`NodeId`] handles, so parent links are
//! plain identifiers and the whole tree can be cloned or serialized as data.
//!
//! Structural edits (insert, detach, remove) validate all preconditions before
//! touching the arena. Bookmark markers are registered in the bookmark index
//! when the subtree holding them becomes reachable from the root, and dropped
//! from it when that subtree is detached.

use crate::bookmark::{validate_bookmark_name, BookmarkIndex};
use crate::{
    CellFormat, DocModelError, DocumentId, ModelConfig, Node, NodeId, NodeKind, NodeType,
    ParagraphProperties, Result, RowProperties, RunProperties, SectionProperties,
    TableProperties,
};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// One arena slot. `generation` survives the node so stale handles miss.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct Slot {
    generation: u32,
    node: Option<Node>,
}

/// A document: the arena owning all nodes plus the indexes kept over them
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    id: DocumentId,
    root: NodeId,
    slots: Vec<Slot>,
    free: Vec<u32>,
    pub(crate) bookmark_index: BookmarkIndex,
    config: ModelConfig,
}

impl Document {
    /// Create an empty document containing only the root node
    pub fn new() -> Self {
        Self::build(ModelConfig::default())
    }

    /// Create an empty document with the given configuration
    pub fn with_config(config: ModelConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::build(config))
    }

    fn build(config: ModelConfig) -> Self {
        let id = DocumentId::new();
        let mut doc = Self {
            id,
            root: NodeId::new(id, 0, 0),
            slots: Vec::new(),
            free: Vec::new(),
            bookmark_index: BookmarkIndex::default(),
            config,
        };
        doc.root = doc.alloc(NodeKind::Document);
        doc
    }

    /// Create a document with one section holding one empty paragraph
    pub fn with_empty_paragraph() -> Self {
        let mut doc = Self::new();
        let root = doc.root;
        let section = doc.create_section();
        let para = doc.create_paragraph();
        // Both inserts are valid by construction.
        doc.link(root, 0, section);
        doc.link(section, 0, para);
        doc
    }

    /// Get the document ID
    pub fn id(&self) -> DocumentId {
        self.id
    }

    /// Get the root node ID
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Get the configuration
    pub fn config(&self) -> &ModelConfig {
        &self.config
    }

    /// Replace the configuration. Existing content is not re-validated.
    pub fn set_config(&mut self, config: ModelConfig) -> Result<()> {
        config.validate()?;
        self.config = config;
        Ok(())
    }

    /// Number of live nodes in the arena (attached or not)
    pub fn node_count(&self) -> usize {
        self.slots.iter().filter(|slot| slot.node.is_some()).count()
    }

    // =========================================================================
    // Arena
    // =========================================================================

    fn alloc(&mut self, kind: NodeKind) -> NodeId {
        // Skip free-list entries that do not name an empty slot.
        while let Some(index) = self.free.pop() {
            if let Some(slot) = self.slots.get_mut(index as usize) {
                if slot.node.is_none() {
                    let id = NodeId::new(self.id, index, slot.generation);
                    slot.node = Some(Node::new(id, kind));
                    return id;
                }
            }
        }

        let index = self.slots.len() as u32;
        let id = NodeId::new(self.id, index, 0);
        self.slots.push(Slot {
            generation: 0,
            node: Some(Node::new(id, kind)),
        });
        id
    }

    fn free_slot(&mut self, id: NodeId) {
        if let Some(slot) = self.slots.get_mut(id.index() as usize) {
            if slot.generation == id.generation() && slot.node.is_some() {
                slot.node = None;
                slot.generation = slot.generation.wrapping_add(1);
                self.free.push(id.index());
            }
        }
    }

    /// Get a node by ID
    pub fn get(&self, id: NodeId) -> Option<&Node> {
        if id.document() != self.id {
            return None;
        }
        let slot = self.slots.get(id.index() as usize)?;
        if slot.generation != id.generation() {
            return None;
        }
        slot.node.as_ref()
    }

    fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        if id.document() != self.id {
            return None;
        }
        let slot = self.slots.get_mut(id.index() as usize)?;
        if slot.generation != id.generation() {
            return None;
        }
        slot.node.as_mut()
    }

    /// Get a node by ID, failing with `NotFound`
    pub fn node(&self, id: NodeId) -> Result<&Node> {
        self.get(id)
            .ok_or_else(|| DocModelError::not_found(format!("node {}", id)))
    }

    pub(crate) fn node_mut(&mut self, id: NodeId) -> Result<&mut Node> {
        self.get_mut(id)
            .ok_or_else(|| DocModelError::not_found(format!("node {}", id)))
    }

    /// Check whether a handle still refers to a live node
    pub fn contains(&self, id: NodeId) -> bool {
        self.get(id).is_some()
    }

    /// Get the node type for a given ID
    pub fn node_type(&self, id: NodeId) -> Option<NodeType> {
        self.get(id).map(Node::node_type)
    }

    fn expect_type(&self, id: NodeId, expected: NodeType) -> Result<&Node> {
        let node = self.node(id)?;
        if node.node_type() != expected {
            return Err(DocModelError::invalid(format!(
                "node {} is a {}, expected a {}",
                id,
                node.node_type(),
                expected
            )));
        }
        Ok(node)
    }

    // =========================================================================
    // Factories (nodes are created detached)
    // =========================================================================

    /// Create a detached node from a payload
    pub fn create_node(&mut self, kind: NodeKind) -> Result<NodeId> {
        match &kind {
            NodeKind::Document => {
                return Err(DocModelError::invalid(
                    "a document has exactly one root node",
                ))
            }
            NodeKind::BookmarkStart { name } | NodeKind::BookmarkEnd { name } => {
                validate_bookmark_name(name, &self.config.bookmarks)?;
            }
            _ => {}
        }
        Ok(self.alloc(kind))
    }

    /// Create a detached section
    pub fn create_section(&mut self) -> NodeId {
        self.alloc(NodeKind::Section(SectionProperties::default()))
    }

    /// Create a detached, empty paragraph
    pub fn create_paragraph(&mut self) -> NodeId {
        self.alloc(NodeKind::Paragraph(ParagraphProperties::default()))
    }

    /// Create a detached run with text content
    pub fn create_run(&mut self, text: impl Into<String>) -> NodeId {
        self.alloc(NodeKind::Run {
            text: text.into(),
            properties: RunProperties::default(),
        })
    }

    /// Create a detached table without reference column widths
    pub fn create_table(&mut self) -> NodeId {
        self.alloc(NodeKind::Table(TableProperties::default()))
    }

    /// Create a detached table with reference column widths in points
    pub fn create_table_with_widths(&mut self, widths: &[f32]) -> NodeId {
        self.alloc(NodeKind::Table(TableProperties::with_column_widths(widths)))
    }

    /// Create a detached row
    pub fn create_row(&mut self) -> NodeId {
        self.alloc(NodeKind::Row(RowProperties::default()))
    }

    /// Create a detached cell with no preferred width
    pub fn create_cell(&mut self) -> NodeId {
        self.alloc(NodeKind::Cell(CellFormat::default()))
    }

    /// Create a detached cell with a preferred width in points
    pub fn create_cell_with_width(&mut self, width: f32) -> NodeId {
        self.alloc(NodeKind::Cell(CellFormat::with_width(width)))
    }

    /// Create a detached bookmark start marker
    pub fn create_bookmark_start(&mut self, name: impl Into<String>) -> Result<NodeId> {
        self.create_node(NodeKind::BookmarkStart { name: name.into() })
    }

    /// Create a detached bookmark end marker
    pub fn create_bookmark_end(&mut self, name: impl Into<String>) -> Result<NodeId> {
        self.create_node(NodeKind::BookmarkEnd { name: name.into() })
    }

    // =========================================================================
    // Payload access
    // =========================================================================

    /// Replace the text of a run
    pub fn set_run_text(&mut self, id: NodeId, new_text: impl Into<String>) -> Result<()> {
        match self.node_mut(id)?.kind_mut() {
            NodeKind::Run { text, .. } => {
                *text = new_text.into();
                Ok(())
            }
            _ => Err(DocModelError::invalid(format!("node {} is not a run", id))),
        }
    }

    /// Mutable access to a run's formatting
    pub fn run_properties_mut(&mut self, id: NodeId) -> Result<&mut RunProperties> {
        match self.node_mut(id)?.kind_mut() {
            NodeKind::Run { properties, .. } => Ok(properties),
            _ => Err(DocModelError::invalid(format!("node {} is not a run", id))),
        }
    }

    /// Mutable access to a paragraph's formatting
    pub fn paragraph_properties_mut(&mut self, id: NodeId) -> Result<&mut ParagraphProperties> {
        match self.node_mut(id)?.kind_mut() {
            NodeKind::Paragraph(props) => Ok(props),
            _ => Err(DocModelError::invalid(format!("node {} is not a paragraph", id))),
        }
    }

    /// Mutable access to a section's properties
    pub fn section_properties_mut(&mut self, id: NodeId) -> Result<&mut SectionProperties> {
        match self.node_mut(id)?.kind_mut() {
            NodeKind::Section(props) => Ok(props),
            _ => Err(DocModelError::invalid(format!("node {} is not a section", id))),
        }
    }

    /// Mutable access to a table's properties
    pub fn table_properties_mut(&mut self, id: NodeId) -> Result<&mut TableProperties> {
        match self.node_mut(id)?.kind_mut() {
            NodeKind::Table(props) => Ok(props),
            _ => Err(DocModelError::invalid(format!("node {} is not a table", id))),
        }
    }

    /// Mutable access to a row's properties
    pub fn row_properties_mut(&mut self, id: NodeId) -> Result<&mut RowProperties> {
        match self.node_mut(id)?.kind_mut() {
            NodeKind::Row(props) => Ok(props),
            _ => Err(DocModelError::invalid(format!("node {} is not a row", id))),
        }
    }

    /// Mutable access to a cell's format (width and merge flags)
    pub fn cell_format_mut(&mut self, id: NodeId) -> Result<&mut CellFormat> {
        self.node_mut(id)?
            .as_cell_mut()
            .ok_or_else(|| DocModelError::invalid(format!("node {} is not a cell", id)))
    }

    // =========================================================================
    // Navigation
    // =========================================================================

    /// Get the parent of a node
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(Node::parent)
    }

    /// Get the children of a node (empty for leaves and unknown IDs)
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.get(id).map(Node::children).unwrap_or(&[])
    }

    pub fn first_child(&self, id: NodeId) -> Option<NodeId> {
        self.children(id).first().copied()
    }

    pub fn last_child(&self, id: NodeId) -> Option<NodeId> {
        self.children(id).last().copied()
    }

    /// Index of a node within its parent's children
    pub fn index_in_parent(&self, id: NodeId) -> Option<usize> {
        let parent = self.parent(id)?;
        self.children(parent).iter().position(|&c| c == id)
    }

    /// Index of `child` among the children of `parent`
    pub fn index_of(&self, parent: NodeId, child: NodeId) -> Option<usize> {
        self.children(parent).iter().position(|&c| c == child)
    }

    pub fn next_sibling(&self, id: NodeId) -> Option<NodeId> {
        let parent = self.parent(id)?;
        let index = self.index_in_parent(id)?;
        self.children(parent).get(index + 1).copied()
    }

    pub fn previous_sibling(&self, id: NodeId) -> Option<NodeId> {
        let parent = self.parent(id)?;
        let index = self.index_in_parent(id)?;
        index
            .checked_sub(1)
            .and_then(|i| self.children(parent).get(i).copied())
    }

    /// Iterate over the strict ancestors of a node, nearest first
    pub fn ancestors(&self, id: NodeId) -> Ancestors<'_> {
        Ancestors {
            doc: self,
            next: self.parent(id),
        }
    }

    /// Nearest strict ancestor of the given type
    pub fn get_ancestor(&self, id: NodeId, node_type: NodeType) -> Option<NodeId> {
        self.ancestors(id)
            .find(|&a| self.node_type(a) == Some(node_type))
    }

    /// Top-most ancestor (the node itself when it has no parent)
    pub fn top(&self, id: NodeId) -> NodeId {
        self.ancestors(id).last().unwrap_or(id)
    }

    /// Whether the node is reachable from the document root
    pub fn is_attached(&self, id: NodeId) -> bool {
        self.contains(id) && self.top(id) == self.root
    }

    /// Iterate over all descendants of a node in document (pre-)order
    pub fn descendants(&self, id: NodeId) -> Descendants<'_> {
        let mut stack: Vec<NodeId> = self.children(id).to_vec();
        stack.reverse();
        Descendants { doc: self, stack }
    }

    /// Descendants of a given type in document order
    pub fn descendants_of_type(&self, id: NodeId, node_type: NodeType) -> Vec<NodeId> {
        self.descendants(id)
            .filter(|&d| self.node_type(d) == Some(node_type))
            .collect()
    }

    /// Direct children of a given type
    pub fn children_of_type(&self, id: NodeId, node_type: NodeType) -> Vec<NodeId> {
        self.children(id)
            .iter()
            .copied()
            .filter(|&c| self.node_type(c) == Some(node_type))
            .collect()
    }

    /// Sections of the document in order
    pub fn sections(&self) -> Vec<NodeId> {
        self.children_of_type(self.root, NodeType::Section)
    }

    pub fn first_section(&self) -> Option<NodeId> {
        self.sections().first().copied()
    }

    /// All attached tables (nested ones included) in document order
    pub fn tables(&self) -> Vec<NodeId> {
        self.descendants_of_type(self.root, NodeType::Table)
    }

    /// All attached paragraphs in document order
    pub fn paragraphs(&self) -> Vec<NodeId> {
        self.descendants_of_type(self.root, NodeType::Paragraph)
    }

    /// Child indices leading from the node's top-most ancestor down to it
    pub(crate) fn position_path(&self, id: NodeId) -> Vec<usize> {
        let mut path = Vec::new();
        let mut current = id;
        while let Some(parent) = self.parent(current) {
            if let Some(index) = self.index_of(parent, current) {
                path.push(index);
            }
            current = parent;
        }
        path.reverse();
        path
    }

    /// Compare two nodes by document order.
    ///
    /// Returns `None` when the nodes do not share a tree. An ancestor sorts
    /// before its descendants.
    pub fn compare_document_order(&self, a: NodeId, b: NodeId) -> Option<Ordering> {
        if !self.contains(a) || !self.contains(b) || self.top(a) != self.top(b) {
            return None;
        }
        Some(self.position_path(a).cmp(&self.position_path(b)))
    }

    // =========================================================================
    // Structure
    // =========================================================================

    /// Append a detached node as the last child of `parent`
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> Result<()> {
        let index = self.node(parent)?.children().len();
        self.insert_child(parent, index, child)
    }

    /// Insert a detached node as the first child of `parent`
    pub fn prepend_child(&mut self, parent: NodeId, child: NodeId) -> Result<()> {
        self.insert_child(parent, 0, child)
    }

    /// Insert a detached node immediately before `reference`
    pub fn insert_before(&mut self, reference: NodeId, child: NodeId) -> Result<()> {
        let (parent, index) = self.sibling_slot(reference)?;
        self.insert_child(parent, index, child)
    }

    /// Insert a detached node immediately after `reference`
    pub fn insert_after(&mut self, reference: NodeId, child: NodeId) -> Result<()> {
        let (parent, index) = self.sibling_slot(reference)?;
        self.insert_child(parent, index + 1, child)
    }

    fn sibling_slot(&self, reference: NodeId) -> Result<(NodeId, usize)> {
        let parent = self.node(reference)?.parent().ok_or_else(|| {
            DocModelError::invalid(format!("reference node {} has no parent", reference))
        })?;
        let index = self.index_of(parent, reference).ok_or_else(|| {
            DocModelError::invalid(format!("node {} is not listed under its parent", reference))
        })?;
        Ok((parent, index))
    }

    /// Insert a detached node at `index` among the children of `parent`.
    ///
    /// Fails with `InvalidOperation` if the child already has a parent, would
    /// create a cycle, is not allowed under the parent's type, or would nest
    /// tables too deeply. If the parent is attached, the child's bookmark
    /// markers must keep names unique and starts before ends
    /// (`DuplicateName` / `InvalidOperation`).
    pub fn insert_child(&mut self, parent: NodeId, index: usize, child: NodeId) -> Result<()> {
        self.validate_attach(parent, index, child)?;

        let markers = if self.is_attached(parent) {
            self.check_bookmark_attach(parent, index, child)?
        } else {
            Vec::new()
        };

        self.link(parent, index, child);
        for marker in markers {
            self.bookmark_index.register(&marker.name, marker.is_start, marker.id);
        }

        tracing::trace!(parent = %parent, child = %child, index, "inserted node");
        Ok(())
    }

    /// Link without validation; callers guarantee the preconditions.
    fn link(&mut self, parent: NodeId, index: usize, child: NodeId) {
        if let Some(node) = self.get_mut(child) {
            node.set_parent(Some(parent));
        }
        if let Some(node) = self.get_mut(parent) {
            let index = index.min(node.children().len());
            node.children_mut().insert(index, child);
        }
    }

    fn validate_attach(&self, parent: NodeId, index: usize, child: NodeId) -> Result<()> {
        if parent.document() != self.id || child.document() != self.id {
            return Err(DocModelError::invalid(
                "node belongs to another document; use import_node",
            ));
        }
        let parent_node = self.node(parent)?;
        let child_node = self.node(child)?;

        if child == self.root {
            return Err(DocModelError::invalid("the document root cannot be inserted"));
        }
        if child_node.parent().is_some() {
            return Err(DocModelError::invalid(format!(
                "node {} already has a parent",
                child
            )));
        }
        let (parent_type, child_type) = (parent_node.node_type(), child_node.node_type());
        if !parent_type.can_contain(child_type) {
            return Err(DocModelError::invalid(format!(
                "a {} cannot be a child of a {}",
                child_type, parent_type
            )));
        }
        if parent == child || self.ancestors(parent).any(|a| a == child) {
            return Err(DocModelError::invalid(
                "inserting a node under itself would create a cycle",
            ));
        }
        if index > parent_node.children().len() {
            return Err(DocModelError::invalid(format!(
                "index {} out of range for {} children",
                index,
                parent_node.children().len()
            )));
        }
        self.check_table_nesting(parent, child)
    }

    fn check_table_nesting(&self, parent: NodeId, child: NodeId) -> Result<()> {
        let outer = std::iter::once(parent)
            .chain(self.ancestors(parent))
            .filter(|&a| self.node_type(a) == Some(NodeType::Table))
            .count();

        let limit = self.config.tables.max_nesting_depth;
        let mut stack = vec![(child, outer)];
        while let Some((id, tables_above)) = stack.pop() {
            let Some(node) = self.get(id) else { continue };
            let below = if node.node_type() == NodeType::Table {
                if tables_above > limit {
                    return Err(DocModelError::invalid(format!(
                        "table nesting depth {} exceeds the limit of {}",
                        tables_above, limit
                    )));
                }
                tables_above + 1
            } else {
                tables_above
            };
            stack.extend(node.children().iter().map(|&c| (c, below)));
        }
        Ok(())
    }

    /// Unlink a node from its parent, keeping the subtree alive for reuse
    pub fn detach(&mut self, id: NodeId) -> Result<()> {
        if id == self.root {
            return Err(DocModelError::invalid("the document root cannot be detached"));
        }
        let Some(parent) = self.node(id)?.parent() else {
            return Ok(());
        };

        if self.is_attached(parent) {
            self.unregister_bookmarks(id);
        }
        self.node_mut(parent)?.children_mut().retain(|&c| c != id);
        self.node_mut(id)?.set_parent(None);

        tracing::trace!(node = %id, parent = %parent, "detached node");
        Ok(())
    }

    /// Detach a node and destroy it together with all of its descendants
    pub fn remove(&mut self, id: NodeId) -> Result<()> {
        if id == self.root {
            return Err(DocModelError::invalid("the document root cannot be removed"));
        }
        self.detach(id)?;

        let doomed: Vec<NodeId> = std::iter::once(id).chain(self.descendants(id)).collect();
        let count = doomed.len();
        for node in doomed {
            self.free_slot(node);
        }

        tracing::debug!(node = %id, count, "removed subtree");
        Ok(())
    }

    /// Remove (destroy) every child of a node
    pub fn remove_all_children(&mut self, id: NodeId) -> Result<()> {
        let children = self.node(id)?.children().to_vec();
        for child in children {
            self.remove(child)?;
        }
        Ok(())
    }

    /// Copy a node into a new detached node.
    ///
    /// A deep clone copies the whole subtree preserving order; a shallow
    /// clone copies only the node's own attributes.
    pub fn clone_node(&mut self, id: NodeId, deep: bool) -> Result<NodeId> {
        let items = snapshot_subtree(self, id, deep)?;
        Ok(self.build_subtree(items))
    }

    /// Copy a node from another document into this one (detached)
    pub fn import_node(&mut self, source: &Document, id: NodeId, deep: bool) -> Result<NodeId> {
        let items = snapshot_subtree(source, id, deep)?;
        Ok(self.build_subtree(items))
    }

    fn build_subtree(&mut self, items: Vec<(NodeKind, Option<usize>)>) -> NodeId {
        let mut created: Vec<NodeId> = Vec::with_capacity(items.len());
        for (kind, parent_index) in items {
            let id = self.alloc(kind);
            if let Some(parent) = parent_index.and_then(|i| created.get(i).copied()) {
                let index = self.children(parent).len();
                self.link(parent, index, id);
            }
            created.push(id);
        }
        created[0]
    }

    /// Give a container the minimum content needed to be well formed.
    ///
    /// Tables get a row, rows a cell, and cells and sections end with a
    /// paragraph. The document root gets a section.
    pub fn ensure_minimum(&mut self, id: NodeId) -> Result<()> {
        match self.node(id)?.node_type() {
            NodeType::Document => {
                if self.children(id).is_empty() {
                    let section = self.create_section();
                    self.append_child(id, section)?;
                }
                for section in self.children(id).to_vec() {
                    self.ensure_minimum(section)?;
                }
            }
            NodeType::Section | NodeType::Cell => {
                let last_is_paragraph = self
                    .last_child(id)
                    .and_then(|c| self.node_type(c))
                    == Some(NodeType::Paragraph);
                if !last_is_paragraph {
                    let para = self.create_paragraph();
                    self.append_child(id, para)?;
                }
            }
            NodeType::Table => {
                if self.children(id).is_empty() {
                    let row = self.create_row();
                    self.append_child(id, row)?;
                }
                for row in self.children(id).to_vec() {
                    self.ensure_minimum(row)?;
                }
            }
            NodeType::Row => {
                if self.children(id).is_empty() {
                    let cell = self.create_cell();
                    self.append_child(id, cell)?;
                }
                for cell in self.children(id).to_vec() {
                    self.ensure_minimum(cell)?;
                }
            }
            NodeType::Paragraph | NodeType::Run | NodeType::BookmarkStart | NodeType::BookmarkEnd => {}
        }
        Ok(())
    }

    /// Run a multi-step edit, restoring the previous state if any step fails
    pub(crate) fn atomically<T>(
        &mut self,
        edit: impl FnOnce(&mut Self) -> Result<T>,
    ) -> Result<T> {
        let backup = self.clone();
        match edit(self) {
            Ok(value) => Ok(value),
            Err(e) => {
                *self = backup;
                Err(e)
            }
        }
    }

    pub(crate) fn free_marker(&mut self, id: NodeId) {
        if let Some(parent) = self.parent(id) {
            if let Some(node) = self.get_mut(parent) {
                node.children_mut().retain(|&c| c != id);
            }
        }
        self.free_slot(id);
    }

    pub(crate) fn expect_table(&self, id: NodeId) -> Result<&TableProperties> {
        self.expect_type(id, NodeType::Table)?
            .as_table()
            .ok_or_else(|| DocModelError::invalid(format!("node {} is not a table", id)))
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::with_empty_paragraph()
    }
}

/// Pre-order copy of a subtree: each entry holds a payload and the index of
/// its parent entry.
fn snapshot_subtree(
    source: &Document,
    id: NodeId,
    deep: bool,
) -> Result<Vec<(NodeKind, Option<usize>)>> {
    let node = source.node(id)?;
    if node.node_type() == NodeType::Document {
        return Err(DocModelError::invalid("the document root cannot be cloned"));
    }

    let mut items = vec![(node.kind().clone(), None)];
    if !deep {
        return Ok(items);
    }

    let mut stack: Vec<(NodeId, usize)> = node.children().iter().rev().map(|&c| (c, 0)).collect();
    while let Some((child, parent_index)) = stack.pop() {
        let child_node = source.node(child)?;
        let index = items.len();
        items.push((child_node.kind().clone(), Some(parent_index)));
        stack.extend(child_node.children().iter().rev().map(|&c| (c, index)));
    }
    Ok(items)
}

/// Iterator over the strict ancestors of a node
pub struct Ancestors<'a> {
    doc: &'a Document,
    next: Option<NodeId>,
}

impl Iterator for Ancestors<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let current = self.next?;
        self.next = self.doc.parent(current);
        Some(current)
    }
}

/// Pre-order iterator over the descendants of a node
pub struct Descendants<'a> {
    doc: &'a Document,
    stack: Vec<NodeId>,
}

impl Iterator for Descendants<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let current = self.stack.pop()?;
        self.stack
            .extend(self.doc.children(current).iter().rev().copied());
        Some(current)
    }
}
