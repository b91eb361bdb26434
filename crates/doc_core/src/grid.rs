//! Table grid resolution
//!
//! Turns a table's rows of physical cells into a rectangular grid of logical
//! slots. A cell covers as many reference columns as its width needs; its
//! merge flags are then normalized against its neighbours so that every
//! `Previous` continues a real group and every `First` is continued.

use crate::{CellMerge, Document, NodeId, Result};
use serde::{Deserialize, Serialize};

/// One logical position in a resolved table grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct GridSlot {
    /// Cell occupying the slot; `None` for padding in short rows
    pub cell: Option<NodeId>,
    pub horizontal_merge: CellMerge,
    pub vertical_merge: CellMerge,
}

impl GridSlot {
    /// Padding slot
    pub fn empty() -> Self {
        Self::default()
    }

    /// Whether this slot is the top-left corner of a merged region
    pub fn is_merge_anchor(&self) -> bool {
        self.horizontal_merge != CellMerge::Previous
            && self.vertical_merge != CellMerge::Previous
            && (self.horizontal_merge == CellMerge::First || self.vertical_merge == CellMerge::First)
    }

    /// Whether this slot is covered by a slot to its left or above
    pub fn is_covered(&self) -> bool {
        self.horizontal_merge == CellMerge::Previous || self.vertical_merge == CellMerge::Previous
    }
}

/// A rectangular merged region of a table grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergedCellRegion {
    /// The cell at the top-left corner
    pub anchor_cell: NodeId,
    pub start_row: usize,
    pub start_col: usize,
    /// Ending row index (inclusive)
    pub end_row: usize,
    /// Ending column index (inclusive)
    pub end_col: usize,
}

impl MergedCellRegion {
    pub fn new(
        anchor_cell: NodeId,
        start_row: usize,
        start_col: usize,
        end_row: usize,
        end_col: usize,
    ) -> Self {
        Self {
            anchor_cell,
            start_row: start_row.min(end_row),
            start_col: start_col.min(end_col),
            end_row: start_row.max(end_row),
            end_col: start_col.max(end_col),
        }
    }

    pub fn row_span(&self) -> usize {
        self.end_row - self.start_row + 1
    }

    pub fn col_span(&self) -> usize {
        self.end_col - self.start_col + 1
    }

    /// Check if a grid position is within this region
    pub fn contains(&self, row: usize, col: usize) -> bool {
        row >= self.start_row && row <= self.end_row && col >= self.start_col && col <= self.end_col
    }
}

/// The logical grid of a table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableGrid {
    table: NodeId,
    rows: Vec<Vec<GridSlot>>,
    column_count: usize,
}

impl TableGrid {
    /// The table this grid was resolved from
    pub fn table(&self) -> NodeId {
        self.table
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn column_count(&self) -> usize {
        self.column_count
    }

    /// All rows; each has exactly `column_count` slots
    pub fn rows(&self) -> &[Vec<GridSlot>] {
        &self.rows
    }

    pub fn slot(&self, row: usize, col: usize) -> Option<&GridSlot> {
        self.rows.get(row).and_then(|r| r.get(col))
    }

    /// Grid position of the first slot a cell occupies
    pub fn cell_position(&self, cell: NodeId) -> Option<(usize, usize)> {
        self.rows.iter().enumerate().find_map(|(r, row)| {
            row.iter()
                .position(|slot| slot.cell == Some(cell))
                .map(|c| (r, c))
        })
    }

    /// Number of consecutive slots, starting at `col`, held by the same cell
    pub fn cell_span(&self, row: usize, col: usize) -> usize {
        let Some(slots) = self.rows.get(row) else {
            return 0;
        };
        let Some(cell) = slots.get(col).and_then(|s| s.cell) else {
            return 1;
        };
        slots[col..]
            .iter()
            .take_while(|slot| slot.cell == Some(cell))
            .count()
    }

    /// First column and column count of a cell within a row
    pub fn cell_extent(&self, row: usize, cell: NodeId) -> Option<(usize, usize)> {
        let slots = self.rows.get(row)?;
        let first = slots.iter().position(|slot| slot.cell == Some(cell))?;
        Some((first, self.cell_span(row, first)))
    }

    /// Every merged region, in row-major order of their anchors
    pub fn merged_regions(&self) -> Vec<MergedCellRegion> {
        let mut regions = Vec::new();
        for (r, row) in self.rows.iter().enumerate() {
            for (c, slot) in row.iter().enumerate() {
                if !slot.is_merge_anchor() {
                    continue;
                }
                let Some(anchor) = slot.cell else { continue };

                let mut end_col = c;
                if slot.horizontal_merge == CellMerge::First {
                    while row
                        .get(end_col + 1)
                        .is_some_and(|s| s.horizontal_merge == CellMerge::Previous)
                    {
                        end_col += 1;
                    }
                }
                let mut end_row = r;
                if slot.vertical_merge == CellMerge::First {
                    while self
                        .slot(end_row + 1, c)
                        .is_some_and(|s| s.vertical_merge == CellMerge::Previous)
                    {
                        end_row += 1;
                    }
                }
                regions.push(MergedCellRegion::new(anchor, r, c, end_row, end_col));
            }
        }
        regions
    }
}

/// Number of reference columns a cell of `width` covers when placed at `start`
fn column_span(widths: &[f32], start: usize, width: f32, tolerance: f32) -> usize {
    if width <= 0.0 || start >= widths.len() {
        return 1;
    }
    let mut sum = 0.0;
    for (k, w) in widths[start..].iter().enumerate() {
        sum += w;
        if sum + tolerance >= width {
            return k + 1;
        }
    }
    widths.len() - start
}

/// Resolve the logical grid of a table
pub fn resolve_grid(doc: &Document, table: NodeId) -> Result<TableGrid> {
    let props = doc.expect_table(table)?;
    let widths = &props.column_widths;
    let tolerance = doc.config().tables.width_tolerance;

    let mut rows: Vec<Vec<GridSlot>> = Vec::new();
    for &row in doc.children(table) {
        let mut slots = Vec::new();
        for &cell in doc.children(row) {
            let format = doc.node(cell)?.as_cell().cloned().unwrap_or_default();
            let span = column_span(widths, slots.len(), format.width, tolerance);
            for k in 0..span {
                let horizontal_merge = match (span, k, format.horizontal_merge) {
                    (1, _, declared) => declared,
                    (_, 0, CellMerge::Previous) => CellMerge::Previous,
                    (_, 0, _) => CellMerge::First,
                    _ => CellMerge::Previous,
                };
                slots.push(GridSlot {
                    cell: Some(cell),
                    horizontal_merge,
                    vertical_merge: format.vertical_merge,
                });
            }
        }
        rows.push(slots);
    }

    let column_count = rows.iter().map(Vec::len).max().unwrap_or(0);
    let mut padded = 0;
    for row in &mut rows {
        if row.len() < column_count {
            padded += 1;
            row.resize(column_count, GridSlot::empty());
        }
    }
    if padded > 0 {
        tracing::warn!(table = %table, rows = padded, "padded short table rows");
    }

    let dropped = normalize_flags(&mut rows, column_count);
    if dropped > 0 {
        tracing::warn!(table = %table, flags = dropped, "dropped orphan merge flags");
    }

    tracing::trace!(
        table = %table,
        rows = rows.len(),
        columns = column_count,
        "resolved table grid"
    );
    Ok(TableGrid {
        table,
        rows,
        column_count,
    })
}

/// Clear `Previous` flags that continue nothing and `First` flags that
/// nothing continues. Returns the number of flags cleared.
fn normalize_flags(rows: &mut [Vec<GridSlot>], column_count: usize) -> usize {
    let mut dropped = 0;

    for row in rows.iter_mut() {
        for c in 0..column_count {
            let continues = c > 0 && row[c - 1].horizontal_merge != CellMerge::None;
            if row[c].horizontal_merge == CellMerge::Previous && !continues {
                row[c].horizontal_merge = CellMerge::None;
                dropped += 1;
            }
        }
        for c in 0..column_count {
            let continued = row
                .get(c + 1)
                .is_some_and(|s| s.horizontal_merge == CellMerge::Previous);
            if row[c].horizontal_merge == CellMerge::First && !continued {
                row[c].horizontal_merge = CellMerge::None;
                dropped += 1;
            }
        }
    }

    for c in 0..column_count {
        for r in 0..rows.len() {
            let continues = r > 0 && rows[r - 1][c].vertical_merge != CellMerge::None;
            if rows[r][c].vertical_merge == CellMerge::Previous && !continues {
                rows[r][c].vertical_merge = CellMerge::None;
                dropped += 1;
            }
        }
        for r in 0..rows.len() {
            let continued = rows
                .get(r + 1)
                .is_some_and(|row| row[c].vertical_merge == CellMerge::Previous);
            if rows[r][c].vertical_merge == CellMerge::First && !continued {
                rows[r][c].vertical_merge = CellMerge::None;
                dropped += 1;
            }
        }
    }

    dropped
}

impl Document {
    /// Resolve the logical grid of a table
    pub fn resolve_grid(&self, table: NodeId) -> Result<TableGrid> {
        resolve_grid(self, table)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::DocModelError;

    fn table_with_rows(doc: &mut Document, widths: &[f32], rows: &[&[(f32, CellMerge, CellMerge)]]) -> NodeId {
        let section = doc.first_section().unwrap();
        let table = doc.create_table_with_widths(widths);
        doc.append_child(section, table).unwrap();
        for cells in rows {
            let row = doc.create_row();
            doc.append_child(table, row).unwrap();
            for &(width, h, v) in cells.iter() {
                let cell = doc.create_cell_with_width(width);
                let format = doc.cell_format_mut(cell).unwrap();
                format.horizontal_merge = h;
                format.vertical_merge = v;
                doc.append_child(row, cell).unwrap();
            }
        }
        table
    }

    const N: CellMerge = CellMerge::None;
    const F: CellMerge = CellMerge::First;
    const P: CellMerge = CellMerge::Previous;

    #[test]
    fn test_column_span() {
        let widths = [50.0, 50.0, 50.0];
        assert_eq!(column_span(&widths, 0, 50.0, 0.5), 1);
        assert_eq!(column_span(&widths, 0, 99.8, 0.5), 2);
        assert_eq!(column_span(&widths, 1, 100.0, 0.5), 2);
        assert_eq!(column_span(&widths, 0, 500.0, 0.5), 3);
        assert_eq!(column_span(&widths, 0, 0.0, 0.5), 1);
        assert_eq!(column_span(&widths, 3, 100.0, 0.5), 1);
        assert_eq!(column_span(&[], 0, 100.0, 0.5), 1);
    }

    #[test]
    fn test_width_spans_produce_horizontal_groups() {
        let mut doc = Document::default();
        let table = table_with_rows(
            &mut doc,
            &[50.0, 50.0, 50.0],
            &[&[(100.0, N, N), (50.0, N, N)], &[(50.0, N, N), (50.0, N, N), (50.0, N, N)]],
        );
        let grid = doc.resolve_grid(table).unwrap();
        assert_eq!(grid.column_count(), 3);
        let row0: Vec<CellMerge> = grid.rows()[0].iter().map(|s| s.horizontal_merge).collect();
        assert_eq!(row0, vec![F, P, N]);
        assert_eq!(grid.slot(0, 0).unwrap().cell, grid.slot(0, 1).unwrap().cell);
        assert_eq!(grid.cell_span(0, 0), 2);

        let regions = grid.merged_regions();
        assert_eq!(regions.len(), 1);
        assert_eq!((regions[0].row_span(), regions[0].col_span()), (1, 2));
    }

    #[test]
    fn test_short_rows_are_padded() {
        let mut doc = Document::default();
        let table = table_with_rows(
            &mut doc,
            &[],
            &[&[(0.0, N, N), (0.0, N, N), (0.0, N, N)], &[(0.0, N, N)]],
        );
        let grid = doc.resolve_grid(table).unwrap();
        assert_eq!(grid.column_count(), 3);
        assert_eq!(grid.rows()[1].len(), 3);
        assert_eq!(grid.slot(1, 2), Some(&GridSlot::empty()));
    }

    #[test]
    fn test_orphan_flags_are_dropped() {
        let mut doc = Document::default();
        let table = table_with_rows(
            &mut doc,
            &[],
            &[&[(0.0, P, F), (0.0, F, N)], &[(0.0, N, N), (0.0, N, P)]],
        );
        let grid = doc.resolve_grid(table).unwrap();
        for row in grid.rows() {
            for slot in row {
                assert_eq!((slot.horizontal_merge, slot.vertical_merge), (N, N));
            }
        }
        assert!(grid.merged_regions().is_empty());
    }

    #[test]
    fn test_vertical_groups() {
        let mut doc = Document::default();
        let table = table_with_rows(
            &mut doc,
            &[],
            &[&[(0.0, N, F), (0.0, N, N)], &[(0.0, N, P), (0.0, N, N)], &[(0.0, N, P), (0.0, N, N)]],
        );
        let grid = doc.resolve_grid(table).unwrap();
        let regions = grid.merged_regions();
        assert_eq!(regions.len(), 1);
        assert_eq!((regions[0].start_row, regions[0].end_row), (0, 2));
        assert_eq!(regions[0].col_span(), 1);
        assert!(grid.slot(2, 0).unwrap().is_covered());
    }

    #[test]
    fn test_cell_position() {
        let mut doc = Document::default();
        let table = table_with_rows(&mut doc, &[], &[&[(0.0, N, N)], &[(0.0, N, N), (0.0, N, N)]]);
        let grid = doc.resolve_grid(table).unwrap();
        let cell = doc.cell_at(table, 1, 1).unwrap().unwrap();
        assert_eq!(grid.cell_position(cell), Some((1, 1)));
        assert_eq!(grid.table(), table);
    }

    #[test]
    fn test_resolve_requires_table() {
        let doc = Document::default();
        let section = doc.first_section().unwrap();
        assert!(matches!(doc.resolve_grid(section), Err(DocModelError::InvalidOperation(_))));
    }

    #[test]
    fn test_empty_table() {
        let mut doc = Document::default();
        let table = table_with_rows(&mut doc, &[100.0], &[]);
        let grid = doc.resolve_grid(table).unwrap();
        assert_eq!((grid.row_count(), grid.column_count()), (0, 0));
    }
}
