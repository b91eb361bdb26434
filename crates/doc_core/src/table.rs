//! Table model - cell, row and table payloads plus table-level edits
//!
//! Merge state lives on each cell as a pair of flags. The logical grid is
//! never stored: it is recomputed by [`crate::resolve_grid`] from the cells'
//! widths, their flags and the table's reference column widths. The edit
//! operations here read that grid, validate the request against it and then
//! rewrite flags or move rows.

use crate::{
    DocModelError, Document, MergedCellRegion, NodeId, NodeType, Result, TableGrid,
};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

// =============================================================================
// Merge Flags
// =============================================================================

/// Merge state of a cell along one axis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum CellMerge {
    /// Cell is not part of a merge
    #[default]
    None,
    /// Cell starts a merged group
    First,
    /// Cell continues the group started before it (covered)
    Previous,
}

/// Vertical alignment within a cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CellVerticalAlign {
    #[default]
    Top,
    Center,
    Bottom,
}

/// How row height is determined
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum HeightRule {
    #[default]
    Auto,
    Exact,
    AtLeast,
}

// =============================================================================
// Payloads
// =============================================================================

/// Cell format: preferred width and merge flags
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CellFormat {
    /// Preferred width in points (0 = unspecified, occupies one column)
    pub width: f32,
    pub horizontal_merge: CellMerge,
    pub vertical_merge: CellMerge,
    pub vertical_align: CellVerticalAlign,
    /// Background color (CSS color string)
    pub shading: Option<String>,
}

impl CellFormat {
    pub fn with_width(width: f32) -> Self {
        Self {
            width,
            ..Default::default()
        }
    }

    /// Check if the cell carries any merge flag
    pub fn is_merged(&self) -> bool {
        self.horizontal_merge != CellMerge::None || self.vertical_merge != CellMerge::None
    }

    /// Check if the cell is covered by a cell to its left or above
    pub fn is_covered(&self) -> bool {
        self.horizontal_merge == CellMerge::Previous || self.vertical_merge == CellMerge::Previous
    }

    pub fn clear_merge(&mut self) {
        self.horizontal_merge = CellMerge::None;
        self.vertical_merge = CellMerge::None;
    }
}

/// Row properties
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RowProperties {
    /// Row height in points
    pub height: Option<f32>,
    pub height_rule: HeightRule,
    /// Repeat this row at the top of each page
    pub is_header: bool,
    /// Prevent the row from breaking across pages
    pub cant_split: bool,
}

/// Table properties
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TableProperties {
    /// Reference column widths in points, left to right
    pub column_widths: Vec<f32>,
    pub style_id: Option<String>,
    /// Indentation from the leading margin in points
    pub indent: Option<f32>,
}

impl TableProperties {
    pub fn with_column_widths(widths: &[f32]) -> Self {
        Self {
            column_widths: widths.to_vec(),
            ..Default::default()
        }
    }

    /// Sum of the reference column widths
    pub fn total_width(&self) -> f32 {
        self.column_widths.iter().sum()
    }
}

// =============================================================================
// Table Operations
// =============================================================================

impl Document {
    /// Rows of a table in order
    pub fn rows(&self, table: NodeId) -> Result<Vec<NodeId>> {
        self.expect_table(table)?;
        Ok(self.children(table).to_vec())
    }

    /// Number of rows in a table
    pub fn row_count(&self, table: NodeId) -> Result<usize> {
        self.expect_table(table)?;
        Ok(self.children(table).len())
    }

    /// Physical cell lookup: the `col`-th cell node of the `row`-th row
    pub fn cell_at(&self, table: NodeId, row: usize, col: usize) -> Result<Option<NodeId>> {
        self.expect_table(table)?;
        Ok(self
            .children(table)
            .get(row)
            .and_then(|&r| self.children(r).get(col).copied()))
    }

    /// Number of tables enclosing this one (0 for a top-level table)
    pub fn table_nesting_depth(&self, table: NodeId) -> Result<usize> {
        self.expect_table(table)?;
        let mut depth = 0;
        let mut current = table;
        while let Some(outer) = self.get_ancestor(current, NodeType::Table) {
            depth += 1;
            current = outer;
        }
        Ok(depth)
    }

    /// Number of tables nested directly inside this table's cells
    pub fn child_table_count(&self, table: NodeId) -> Result<usize> {
        self.expect_table(table)?;
        Ok(self
            .descendants_of_type(table, NodeType::Table)
            .into_iter()
            .filter(|&t| self.get_ancestor(t, NodeType::Table) == Some(table))
            .count())
    }

    /// Merge the rectangle spanned by two grid corners into one cell region.
    ///
    /// Every slot in the rectangle must hold a cell that lies entirely inside
    /// it, and the rectangle must not cut through an existing merged region.
    /// Cells on the left edge become horizontal `First`, the rest `Previous`;
    /// cells on the top edge become vertical `First`, the rest `Previous`.
    /// An axis of extent 1 gets no flag.
    pub fn merge_cells(
        &mut self,
        table: NodeId,
        corner_a: (usize, usize),
        corner_b: (usize, usize),
    ) -> Result<MergedCellRegion> {
        let grid = self.resolve_grid(table)?;
        let (top, bottom) = (corner_a.0.min(corner_b.0), corner_a.0.max(corner_b.0));
        let (left, right) = (corner_a.1.min(corner_b.1), corner_a.1.max(corner_b.1));

        if bottom >= grid.row_count() || right >= grid.column_count() {
            return Err(DocModelError::invalid(format!(
                "merge range ({}, {})..({}, {}) is outside the {}x{} grid",
                top,
                left,
                bottom,
                right,
                grid.row_count(),
                grid.column_count()
            )));
        }
        let (row_extent, col_extent) = (bottom - top + 1, right - left + 1);
        if row_extent * col_extent < 2 {
            return Err(DocModelError::invalid("Need at least 2 cells to merge"));
        }

        let targets = cells_within(&grid, top, bottom, left, right)?;

        for region in grid.merged_regions() {
            let overlaps = region.start_row <= bottom
                && region.end_row >= top
                && region.start_col <= right
                && region.end_col >= left;
            let inside = region.start_row >= top
                && region.end_row <= bottom
                && region.start_col >= left
                && region.end_col <= right;
            if overlaps && !inside {
                return Err(DocModelError::invalid(format!(
                    "merge range partially overlaps the merged region anchored at ({}, {})",
                    region.start_row, region.start_col
                )));
            }
        }

        for &(cell, row, col) in &targets {
            let format = self.cell_format_mut(cell)?;
            format.horizontal_merge = edge_flag(col_extent, col == left);
            format.vertical_merge = edge_flag(row_extent, row == top);
        }

        let anchor = targets
            .first()
            .map(|&(cell, _, _)| cell)
            .ok_or_else(|| DocModelError::invalid("merge range holds no cells"))?;

        tracing::debug!(
            table = %table,
            top, left, bottom, right,
            cells = targets.len(),
            "merged cells"
        );
        Ok(MergedCellRegion::new(anchor, top, left, bottom, right))
    }

    /// Clear the merge flags of every cell in the region covering a slot
    pub fn unmerge_cells(&mut self, table: NodeId, row: usize, col: usize) -> Result<MergedCellRegion> {
        let grid = self.resolve_grid(table)?;
        let region = grid
            .merged_regions()
            .into_iter()
            .find(|r| r.contains(row, col))
            .ok_or_else(|| {
                DocModelError::invalid(format!("slot ({}, {}) is not part of a merged region", row, col))
            })?;

        let targets = cells_within(
            &grid,
            region.start_row,
            region.end_row,
            region.start_col,
            region.end_col,
        )?;
        for (cell, _, _) in targets {
            self.cell_format_mut(cell)?.clear_merge();
        }

        tracing::debug!(table = %table, row, col, "unmerged cells");
        Ok(region)
    }

    /// Split a table in two before `row_index`.
    ///
    /// Rows `row_index..` move, in order, into a shallow clone of the table
    /// inserted directly after it. Returns the new table.
    pub fn split_table(&mut self, table: NodeId, row_index: usize) -> Result<NodeId> {
        let rows = self.rows(table)?;
        if row_index == 0 || row_index >= rows.len() {
            return Err(DocModelError::invalid(format!(
                "split index {} must be within 1..{}",
                row_index,
                rows.len()
            )));
        }
        if self.parent(table).is_none() {
            return Err(DocModelError::invalid("cannot split a table without a parent"));
        }

        let new_table = self.atomically(|doc| {
            let new_table = doc.clone_node(table, false)?;
            doc.insert_after(table, new_table)?;
            // Detach everything first so bookmarks spanning the moved rows
            // are re-registered only once both ends are in place.
            let moving = &rows[row_index..];
            for &row in moving {
                doc.detach(row)?;
            }
            for &row in moving {
                doc.append_child(new_table, row)?;
            }
            Ok(new_table)
        })?;

        tracing::debug!(table = %table, new_table = %new_table, row_index, "split table");
        Ok(new_table)
    }

    /// Append all rows of `second` to `first`, then remove `second`
    pub fn combine_tables(&mut self, first: NodeId, second: NodeId) -> Result<()> {
        self.expect_table(first)?;
        let rows = self.rows(second)?;
        if first == second {
            return Err(DocModelError::invalid("cannot combine a table with itself"));
        }
        if self.ancestors(first).any(|a| a == second) || self.ancestors(second).any(|a| a == first) {
            return Err(DocModelError::invalid("cannot combine a table with a table nested in it"));
        }

        self.atomically(|doc| {
            for &row in &rows {
                doc.detach(row)?;
            }
            for &row in &rows {
                doc.append_child(first, row)?;
            }
            doc.remove(second)
        })?;

        tracing::debug!(first = %first, second = %second, rows = rows.len(), "combined tables");
        Ok(())
    }

    /// Replace width-spanning cells with one cell per logical column.
    ///
    /// The original cell keeps its content and the first column's width; the
    /// inserted cells are empty, flagged horizontal `Previous` and inherit the
    /// original's vertical flag. Returns the number of cells inserted.
    pub fn convert_to_horizontally_merged_cells(&mut self, table: NodeId) -> Result<usize> {
        let grid = self.resolve_grid(table)?;
        let widths = self.expect_table(table)?.column_widths.clone();

        let mut spans = Vec::new();
        for (row_index, row) in grid.rows().iter().enumerate() {
            let mut col = 0;
            while col < row.len() {
                let Some(cell) = row[col].cell else {
                    col += 1;
                    continue;
                };
                let span = grid.cell_span(row_index, col);
                if span > 1 {
                    spans.push((cell, col, span, row[col].horizontal_merge));
                }
                col += span;
            }
        }

        let inserted = self.atomically(|doc| {
            let mut inserted = 0;
            for &(cell, col, span, first_flag) in &spans {
                let vertical = doc.node(cell)?.as_cell().map(|f| f.vertical_merge).unwrap_or_default();
                {
                    let format = doc.cell_format_mut(cell)?;
                    format.width = widths.get(col).copied().unwrap_or(format.width);
                    format.horizontal_merge = first_flag;
                }
                let mut previous = cell;
                for offset in 1..span {
                    let width = widths.get(col + offset).copied().unwrap_or_default();
                    let new_cell = doc.create_cell_with_width(width);
                    {
                        let format = doc.cell_format_mut(new_cell)?;
                        format.horizontal_merge = CellMerge::Previous;
                        format.vertical_merge = vertical;
                    }
                    doc.ensure_minimum(new_cell)?;
                    doc.insert_after(previous, new_cell)?;
                    previous = new_cell;
                    inserted += 1;
                }
            }
            Ok(inserted)
        })?;

        tracing::debug!(table = %table, inserted, "converted width spans to merged cells");
        Ok(inserted)
    }
}

fn edge_flag(extent: usize, on_leading_edge: bool) -> CellMerge {
    match (extent, on_leading_edge) {
        (1, _) => CellMerge::None,
        (_, true) => CellMerge::First,
        (_, false) => CellMerge::Previous,
    }
}

/// Distinct cells of a rectangle with their first slot, checking that every
/// slot is filled and no cell sticks out of the rectangle.
fn cells_within(
    grid: &TableGrid,
    top: usize,
    bottom: usize,
    left: usize,
    right: usize,
) -> Result<Vec<(NodeId, usize, usize)>> {
    let mut seen = HashSet::new();
    let mut cells = Vec::new();
    for row in top..=bottom {
        for col in left..=right {
            let cell = grid.slot(row, col).and_then(|s| s.cell).ok_or_else(|| {
                DocModelError::invalid(format!("grid slot ({}, {}) has no cell", row, col))
            })?;
            if !seen.insert(cell) {
                continue;
            }
            let (first_col, span) = grid.cell_extent(row, cell).unwrap_or((col, 1));
            if first_col < left || first_col + span - 1 > right {
                return Err(DocModelError::invalid(format!(
                    "cell {} extends beyond the merge range",
                    cell
                )));
            }
            cells.push((cell, row, first_col));
        }
    }
    Ok(cells)
}
