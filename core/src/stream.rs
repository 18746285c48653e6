//! The ordered cell stream: a single-pass pull cursor that flattens one
//! [`SpreadsheetView`] into `(address, value, style)` triples in strictly
//! increasing address order.
//!
//! The stream trusts the view's ordering contract and verifies it while
//! pulling; it never sorts. A non-increasing step is a fatal
//! [`DiffError::Consistency`]. Whole-sheet ignore rules skip a sheet
//! before any of its rows are touched; cell-level rules filter cells as
//! they are pulled.

use crate::diff::DiffError;
use crate::ignore::{SheetIgnores, WorkbookIgnores};
use crate::style::StyleSnapshot;
use crate::view::{RowRef, SheetView, SpreadsheetView};
use crate::workbook::{CellAddress, CellValue};

/// One pulled cell, borrowed from the view.
#[derive(Debug, Clone, Copy)]
pub struct StreamCell<'v> {
    pub addr: CellAddress,
    pub sheet_name: &'v str,
    pub value: &'v CellValue,
    pub style: &'v StyleSnapshot,
}

struct SheetCursor<'v> {
    index: u32,
    sheet: &'v dyn SheetView,
    rules: Option<&'v SheetIgnores>,
    row_pos: u32,
    current_row: Option<RowRef<'v>>,
    cell_idx: usize,
}

/// A pull cursor over one side of a diff. Single-pass and fused.
pub struct CellStream<'v> {
    view: &'v dyn SpreadsheetView,
    ignores: &'v WorkbookIgnores,
    next_sheet: u32,
    cursor: Option<SheetCursor<'v>>,
    last: Option<CellAddress>,
    done: bool,
}

impl<'v> CellStream<'v> {
    pub fn new(view: &'v dyn SpreadsheetView, ignores: &'v WorkbookIgnores) -> CellStream<'v> {
        CellStream {
            view,
            ignores,
            next_sheet: 0,
            cursor: None,
            last: None,
            done: false,
        }
    }

    /// Pull the next non-ignored cell, or `None` once the view is
    /// exhausted. Every yielded address is strictly greater than the
    /// previous one; a view that breaks that ordering fails the pull.
    pub fn next_cell(&mut self) -> Result<Option<StreamCell<'v>>, DiffError> {
        if self.done {
            return Ok(None);
        }
        loop {
            if self.cursor.is_none() && !self.advance_sheet()? {
                self.done = true;
                return Ok(None);
            }
            // Cursor is present here; a missing row ends the sheet.
            let cursor = self.cursor.as_mut().ok_or_else(|| DiffError::Consistency {
                message: "cell stream lost its sheet cursor".into(),
            })?;

            let row = match cursor.current_row {
                Some(row) => row,
                None => match cursor.sheet.row(cursor.row_pos) {
                    Some(row) => {
                        cursor.current_row = Some(row);
                        cursor.cell_idx = 0;
                        row
                    }
                    None => {
                        self.cursor = None;
                        continue;
                    }
                },
            };

            if cursor.cell_idx >= row.cells.len() {
                cursor.row_pos += 1;
                cursor.current_row = None;
                continue;
            }

            let cell = &row.cells[cursor.cell_idx];
            cursor.cell_idx += 1;

            if let Some(rules) = cursor.rules {
                if rules.is_ignored(row.row, cell.col) {
                    continue;
                }
            }

            let addr = CellAddress::new(cursor.index, row.row, cell.col);
            if let Some(last) = self.last {
                if addr <= last {
                    let sheet_name = cursor.sheet.name().to_string();
                    self.done = true;
                    return Err(DiffError::Consistency {
                        message: format!(
                            "sheet '{}' yields {} at or before {}",
                            sheet_name,
                            addr.to_a1(),
                            last.to_a1()
                        ),
                    });
                }
            }
            self.last = Some(addr);

            return Ok(Some(StreamCell {
                addr,
                sheet_name: cursor.sheet.name(),
                value: &cell.value,
                style: &cell.style,
            }));
        }
    }

    /// Position the cursor on the next sheet that is not ignored whole.
    /// Returns false once all sheets are consumed.
    fn advance_sheet(&mut self) -> Result<bool, DiffError> {
        while self.next_sheet < self.view.sheet_count() {
            let index = self.next_sheet;
            self.next_sheet += 1;
            let sheet = self.view.sheet(index).ok_or_else(|| DiffError::Consistency {
                message: format!("view reports {} sheets but sheet {} is missing", self.view.sheet_count(), index),
            })?;
            let rules = self.ignores.sheet(sheet.name());
            if rules.is_some_and(SheetIgnores::entire_sheet) {
                continue;
            }
            self.cursor = Some(SheetCursor {
                index,
                sheet,
                rules,
                row_pos: 0,
                current_row: None,
                cell_idx: 0,
            });
            return Ok(true);
        }
        Ok(false)
    }
}
