//! Table commands: cell merging, splitting and combining tables, and
//! converting width spans into merged cells

use crate::command::apply_with_snapshot;
use crate::{Command, CommandResult, Result};
use doc_core::{CellMerge, Document, NodeId, NodeType};
use serde::{Deserialize, Serialize};

/// Merge flags of one cell, as captured before an edit
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CellMergeState {
    pub cell: NodeId,
    pub horizontal: CellMerge,
    pub vertical: CellMerge,
}

fn capture_merge_state(document: &Document, table: NodeId) -> Vec<CellMergeState> {
    document
        .descendants_of_type(table, NodeType::Cell)
        .into_iter()
        .filter(|&cell| document.get_ancestor(cell, NodeType::Table) == Some(table))
        .filter_map(|cell| {
            let format = document.get(cell)?.as_cell()?;
            Some(CellMergeState {
                cell,
                horizontal: format.horizontal_merge,
                vertical: format.vertical_merge,
            })
        })
        .collect()
}

/// Put back previously captured merge flags
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RestoreMergeFlags {
    pub table: NodeId,
    pub states: Vec<CellMergeState>,
}

impl Command for RestoreMergeFlags {
    fn apply(&self, document: &Document) -> Result<CommandResult> {
        let inverse = RestoreMergeFlags {
            table: self.table,
            states: capture_merge_state(document, self.table),
        };
        let mut new_document = document.clone();
        for state in &self.states {
            let format = new_document.cell_format_mut(state.cell)?;
            format.horizontal_merge = state.horizontal;
            format.vertical_merge = state.vertical;
        }
        Ok(CommandResult {
            document: new_document,
            inverse: Box::new(inverse),
        })
    }

    fn display_name(&self) -> &str {
        "Restore Merge Flags"
    }

    fn clone_box(&self) -> Box<dyn Command> {
        Box::new(self.clone())
    }
}

/// Merge a rectangle of grid slots
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MergeCells {
    pub table: NodeId,
    /// (row, column) of one corner
    pub from: (usize, usize),
    /// (row, column) of the opposite corner
    pub to: (usize, usize),
}

impl MergeCells {
    pub fn new(table: NodeId, from: (usize, usize), to: (usize, usize)) -> Self {
        Self { table, from, to }
    }
}

impl Command for MergeCells {
    fn apply(&self, document: &Document) -> Result<CommandResult> {
        let before = RestoreMergeFlags {
            table: self.table,
            states: capture_merge_state(document, self.table),
        };
        let mut new_document = document.clone();
        new_document.merge_cells(self.table, self.from, self.to)?;

        Ok(CommandResult {
            document: new_document,
            inverse: Box::new(before),
        })
    }

    fn display_name(&self) -> &str {
        "Merge Cells"
    }

    fn clone_box(&self) -> Box<dyn Command> {
        Box::new(self.clone())
    }
}

/// Clear the merged region covering a slot
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnmergeCells {
    pub table: NodeId,
    pub row: usize,
    pub col: usize,
}

impl UnmergeCells {
    pub fn new(table: NodeId, row: usize, col: usize) -> Self {
        Self { table, row, col }
    }
}

impl Command for UnmergeCells {
    fn apply(&self, document: &Document) -> Result<CommandResult> {
        let before = RestoreMergeFlags {
            table: self.table,
            states: capture_merge_state(document, self.table),
        };
        let mut new_document = document.clone();
        new_document.unmerge_cells(self.table, self.row, self.col)?;

        Ok(CommandResult {
            document: new_document,
            inverse: Box::new(before),
        })
    }

    fn display_name(&self) -> &str {
        "Unmerge Cells"
    }

    fn clone_box(&self) -> Box<dyn Command> {
        Box::new(self.clone())
    }
}

/// Split a table before a row
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SplitTable {
    pub table: NodeId,
    pub row_index: usize,
}

impl SplitTable {
    pub fn new(table: NodeId, row_index: usize) -> Self {
        Self { table, row_index }
    }
}

impl Command for SplitTable {
    fn apply(&self, document: &Document) -> Result<CommandResult> {
        // The new table is allocated, so undo restores the arena exactly.
        apply_with_snapshot(document, self.display_name(), |doc| {
            doc.split_table(self.table, self.row_index)?;
            Ok(())
        })
    }

    fn display_name(&self) -> &str {
        "Split Table"
    }

    fn clone_box(&self) -> Box<dyn Command> {
        Box::new(self.clone())
    }
}

/// Move all rows of `second` into `first` and delete `second`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CombineTables {
    pub first: NodeId,
    pub second: NodeId,
}

impl CombineTables {
    pub fn new(first: NodeId, second: NodeId) -> Self {
        Self { first, second }
    }
}

impl Command for CombineTables {
    fn apply(&self, document: &Document) -> Result<CommandResult> {
        apply_with_snapshot(document, self.display_name(), |doc| {
            doc.combine_tables(self.first, self.second)?;
            Ok(())
        })
    }

    fn display_name(&self) -> &str {
        "Combine Tables"
    }

    fn clone_box(&self) -> Box<dyn Command> {
        Box::new(self.clone())
    }
}

/// Replace width-spanning cells with explicitly merged single-column cells
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConvertToMergedCells {
    pub table: NodeId,
}

impl ConvertToMergedCells {
    pub fn new(table: NodeId) -> Self {
        Self { table }
    }
}

impl Command for ConvertToMergedCells {
    fn apply(&self, document: &Document) -> Result<CommandResult> {
        apply_with_snapshot(document, self.display_name(), |doc| {
            doc.convert_to_horizontally_merged_cells(self.table)?;
            Ok(())
        })
    }

    fn display_name(&self) -> &str {
        "Convert To Merged Cells"
    }

    fn clone_box(&self) -> Box<dyn Command> {
        Box::new(self.clone())
    }
}
