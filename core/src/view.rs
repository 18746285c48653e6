//! The backend-agnostic view contract.
//!
//! Every input format adapts to [`SpreadsheetView`]: a read-only, sparse
//! view of sheets, rows and cells. The engine consumes nothing else, so a
//! new format only has to implement these traits.
//!
//! # Ordering contract
//!
//! Sheets are exposed in workbook order. Within a sheet, stored rows are
//! exposed in strictly ascending row order and stored cells in strictly
//! ascending column order. The cell stream verifies this while pulling
//! and fails the run on any violation; it never sorts.

use crate::addressing::index_to_address;
use crate::style::{FontDescriptor, StyleSnapshot};
use crate::workbook::{CellValue, MacroPresence};
use serde::{Deserialize, Serialize};

/// Default column width when a sheet specifies none: 8.43 characters in
/// 1/256ths of a character.
pub const DEFAULT_COLUMN_WIDTH: u32 = 2158;

/// A read-only workbook exposed by a backend.
pub trait SpreadsheetView {
    /// Number of sheets in workbook order.
    fn sheet_count(&self) -> u32;

    /// The sheet at `index`, for `index < sheet_count()`.
    fn sheet(&self, index: u32) -> Option<&dyn SheetView>;

    /// Resolve a font index from a [`StyleSnapshot`]. `None` means the
    /// index does not resolve; the comparator reports that as its own
    /// finding rather than failing the run.
    fn font(&self, index: u32) -> Option<&FontDescriptor>;

    /// Whether this workbook carries a macro project.
    fn macro_presence(&self) -> MacroPresence;

    /// The extended layout capability, when the backend has one. Feature
    /// comparison runs only when both sides return `Some`.
    fn layout(&self) -> Option<&dyn WorkbookLayout> {
        None
    }
}

/// One sheet of a [`SpreadsheetView`]. Sparse: only stored rows and
/// stored cells appear.
pub trait SheetView {
    /// Display name of the sheet.
    fn name(&self) -> &str;

    /// Number of stored rows (not the grid height).
    fn row_count(&self) -> u32;

    /// The stored row at storage position `pos`, for `pos < row_count()`.
    fn row(&self, pos: u32) -> Option<RowRef<'_>>;
}

/// Sheet-level layout features, per sheet of a workbook.
pub trait WorkbookLayout {
    /// Layout of the sheet at `index`, parallel to
    /// [`SpreadsheetView::sheet`].
    fn sheet_layout(&self, index: u32) -> Option<&dyn SheetLayout>;
}

/// Layout features of one sheet.
pub trait SheetLayout {
    /// Width of a column in 1/256ths of a character, falling back to the
    /// sheet default when no explicit width is set.
    fn column_width(&self, col: u32) -> u32;

    /// The frozen/split pane, if any.
    fn freeze_pane(&self) -> Option<FreezePane>;

    /// Merged regions in stored order.
    fn merged_regions(&self) -> &[MergedRegion];

    /// `(row, outline level)` for rows with a non-default level, in
    /// ascending row order.
    fn row_outline_levels(&self) -> &[(u32, u8)];
}

/// A borrowed stored row: its row index and its cells in ascending
/// column order.
#[derive(Debug, Clone, Copy)]
pub struct RowRef<'a> {
    pub row: u32,
    pub cells: &'a [Cell],
}

/// One stored cell: column, evaluated value, and formatting snapshot.
#[derive(Debug, Clone, PartialEq)]
pub struct Cell {
    pub col: u32,
    pub value: CellValue,
    pub style: StyleSnapshot,
}

/// Owned sheet storage shared by the materializing backends.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SheetData {
    pub name: String,
    pub rows: Vec<RowData>,
}

impl SheetData {
    pub fn cell_count(&self) -> usize {
        self.rows.iter().map(|r| r.cells.len()).sum()
    }
}

impl SheetView for SheetData {
    fn name(&self) -> &str {
        &self.name
    }

    fn row_count(&self) -> u32 {
        self.rows.len() as u32
    }

    fn row(&self, pos: u32) -> Option<RowRef<'_>> {
        self.rows.get(pos as usize).map(|r| RowRef {
            row: r.row,
            cells: &r.cells,
        })
    }
}

/// One stored row of a [`SheetData`].
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RowData {
    pub row: u32,
    pub cells: Vec<Cell>,
}

/// Which pane is active in a frozen/split sheet, named after the stored
/// attribute values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PaneCorner {
    BottomRight,
    TopRight,
    BottomLeft,
    #[default]
    TopLeft,
}

impl PaneCorner {
    pub fn from_attr(value: &str) -> Option<PaneCorner> {
        Some(match value {
            "bottomRight" => PaneCorner::BottomRight,
            "topRight" => PaneCorner::TopRight,
            "bottomLeft" => PaneCorner::BottomLeft,
            "topLeft" => PaneCorner::TopLeft,
            _ => return None,
        })
    }

    fn token(&self) -> &'static str {
        match self {
            PaneCorner::BottomRight => "bottomRight",
            PaneCorner::TopRight => "topRight",
            PaneCorner::BottomLeft => "bottomLeft",
            PaneCorner::TopLeft => "topLeft",
        }
    }
}

impl std::fmt::Display for PaneCorner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.token())
    }
}

/// A frozen or split pane: the active corner, the split position in
/// columns/rows, and the top-left visible cell of the scrolled area.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FreezePane {
    pub corner: PaneCorner,
    pub x_split: u32,
    pub y_split: u32,
    pub top_row: u32,
    pub left_col: u32,
}

/// An inclusive rectangle of merged cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergedRegion {
    pub first_row: u32,
    pub last_row: u32,
    pub first_col: u32,
    pub last_col: u32,
}

impl MergedRegion {
    pub fn cell_count(&self) -> u64 {
        let rows = (self.last_row - self.first_row + 1) as u64;
        let cols = (self.last_col - self.first_col + 1) as u64;
        rows * cols
    }

    /// Covers every column of its rows.
    pub fn is_full_row_range(&self) -> bool {
        self.first_col == 0 && self.last_col == crate::addressing::MAX_COL_INDEX
    }

    /// Covers every row of its columns.
    pub fn is_full_column_range(&self) -> bool {
        self.first_row == 0 && self.last_row == crate::addressing::MAX_ROW_INDEX
    }
}

impl std::fmt::Display for MergedRegion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}:{}",
            index_to_address(self.first_row, self.first_col),
            index_to_address(self.last_row, self.last_col)
        )
    }
}

/// An explicit width for a run of columns (inclusive endpoints).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnWidthRange {
    pub first_col: u32,
    pub last_col: u32,
    pub width: u32,
}

/// Owned per-sheet layout storage shared by backends with the layout
/// capability.
#[derive(Debug, Clone, PartialEq)]
pub struct SheetLayoutData {
    pub default_column_width: u32,
    pub column_widths: Vec<ColumnWidthRange>,
    pub freeze_pane: Option<FreezePane>,
    pub merged_regions: Vec<MergedRegion>,
    pub row_outline_levels: Vec<(u32, u8)>,
}

impl Default for SheetLayoutData {
    fn default() -> SheetLayoutData {
        SheetLayoutData {
            default_column_width: DEFAULT_COLUMN_WIDTH,
            column_widths: Vec::new(),
            freeze_pane: None,
            merged_regions: Vec::new(),
            row_outline_levels: Vec::new(),
        }
    }
}

impl SheetLayout for SheetLayoutData {
    fn column_width(&self, col: u32) -> u32 {
        self.column_widths
            .iter()
            .find(|r| r.first_col <= col && col <= r.last_col)
            .map(|r| r.width)
            .unwrap_or(self.default_column_width)
    }

    fn freeze_pane(&self) -> Option<FreezePane> {
        self.freeze_pane
    }

    fn merged_regions(&self) -> &[MergedRegion] {
        &self.merged_regions
    }

    fn row_outline_levels(&self) -> &[(u32, u8)] {
        &self.row_outline_levels
    }
}
