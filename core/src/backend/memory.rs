//! An in-memory [`SpreadsheetView`] assembled through a builder.
//!
//! Used by generators that hold a workbook in memory and by tests that
//! need a precise fixture. Rows and cells are stored exactly as given,
//! nothing is re-sorted here; feeding rows out of order is how the
//! stream's ordering check gets exercised.

use super::{baseline_font, baseline_snapshot};
use crate::style::{FontDescriptor, StyleSnapshot};
use crate::view::{
    Cell, RowData, SheetData, SheetLayout, SheetLayoutData, SheetView, SpreadsheetView,
    WorkbookLayout,
};
use crate::workbook::{CellValue, MacroPresence};

/// A workbook built cell by cell.
pub struct MemorySpreadsheet {
    sheets: Vec<SheetData>,
    layouts: Option<Vec<SheetLayoutData>>,
    fonts: Vec<FontDescriptor>,
    macros: MacroPresence,
}

impl MemorySpreadsheet {
    pub fn builder() -> MemorySpreadsheetBuilder {
        MemorySpreadsheetBuilder {
            sheets: Vec::new(),
            layouts: Vec::new(),
            fonts: vec![baseline_font()],
            macros: MacroPresence::Unknown,
        }
    }
}

/// Builder for [`MemorySpreadsheet`]. `sheet` opens a sheet, `row` opens
/// a row in the latest sheet, `cell` appends to the latest row.
///
/// # Panics
///
/// `row` panics without a preceding `sheet`, and `cell`, `cell_styled`
/// and `sheet_layout` panic without the structure they extend.
pub struct MemorySpreadsheetBuilder {
    sheets: Vec<SheetData>,
    layouts: Vec<Option<SheetLayoutData>>,
    fonts: Vec<FontDescriptor>,
    macros: MacroPresence,
}

impl MemorySpreadsheetBuilder {
    pub fn sheet(mut self, name: impl Into<String>) -> Self {
        self.sheets.push(SheetData {
            name: name.into(),
            rows: Vec::new(),
        });
        self.layouts.push(None);
        self
    }

    pub fn row(mut self, row: u32) -> Self {
        self.current_sheet().rows.push(RowData {
            row,
            cells: Vec::new(),
        });
        self
    }

    pub fn cell(self, col: u32, value: CellValue) -> Self {
        self.cell_styled(col, value, baseline_snapshot())
    }

    pub fn cell_styled(mut self, col: u32, value: CellValue, style: StyleSnapshot) -> Self {
        let row = self
            .current_sheet()
            .rows
            .last_mut()
            .unwrap_or_else(|| panic!("cell() requires a row"));
        row.cells.push(Cell { col, value, style });
        self
    }

    /// Replaces the font table. An empty table makes every font index
    /// unresolvable.
    pub fn fonts(mut self, fonts: Vec<FontDescriptor>) -> Self {
        self.fonts = fonts;
        self
    }

    pub fn macro_presence(mut self, macros: MacroPresence) -> Self {
        self.macros = macros;
        self
    }

    /// Attaches a layout to the latest sheet. Setting any layout enables
    /// the workbook's layout capability; sheets without one fall back to
    /// an empty default layout.
    pub fn sheet_layout(mut self, layout: SheetLayoutData) -> Self {
        if self.layouts.is_empty() {
            panic!("sheet_layout() requires a sheet");
        }
        let last = self.layouts.len() - 1;
        self.layouts[last] = Some(layout);
        self
    }

    pub fn build(self) -> MemorySpreadsheet {
        let layouts = if self.layouts.iter().any(Option::is_some) {
            Some(
                self.layouts
                    .into_iter()
                    .map(Option::unwrap_or_default)
                    .collect(),
            )
        } else {
            None
        };
        MemorySpreadsheet {
            sheets: self.sheets,
            layouts,
            fonts: self.fonts,
            macros: self.macros,
        }
    }

    fn current_sheet(&mut self) -> &mut SheetData {
        self.sheets
            .last_mut()
            .unwrap_or_else(|| panic!("row() requires a sheet"))
    }
}

impl SpreadsheetView for MemorySpreadsheet {
    fn sheet_count(&self) -> u32 {
        self.sheets.len() as u32
    }

    fn sheet(&self, index: u32) -> Option<&dyn SheetView> {
        self.sheets.get(index as usize).map(|s| s as &dyn SheetView)
    }

    fn font(&self, index: u32) -> Option<&FontDescriptor> {
        self.fonts.get(index as usize)
    }

    fn macro_presence(&self) -> MacroPresence {
        self.macros
    }

    fn layout(&self) -> Option<&dyn WorkbookLayout> {
        self.layouts.as_ref().map(|_| self as &dyn WorkbookLayout)
    }
}

impl WorkbookLayout for MemorySpreadsheet {
    fn sheet_layout(&self, index: u32) -> Option<&dyn SheetLayout> {
        self.layouts
            .as_ref()
            .and_then(|layouts| layouts.get(index as usize))
            .map(|l| l as &dyn SheetLayout)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::view::FreezePane;

    #[test]
    fn builder_assembles_sheets_rows_and_cells() {
        let workbook = MemorySpreadsheet::builder()
            .sheet("First")
            .row(0)
            .cell(0, CellValue::Number(1.0))
            .cell(2, CellValue::Text("x".into()))
            .sheet("Second")
            .row(4)
            .cell(1, CellValue::Bool(true))
            .macro_presence(MacroPresence::Present)
            .build();

        assert_eq!(workbook.sheet_count(), 2);
        let first = workbook.sheet(0).expect("sheet");
        assert_eq!(first.name(), "First");
        let row = first.row(0).expect("row");
        assert_eq!(row.cells.len(), 2);
        assert_eq!(row.cells[1].col, 2);
        let second = workbook.sheet(1).expect("sheet");
        assert_eq!(second.row(0).expect("row").row, 4);
        assert_eq!(workbook.macro_presence(), MacroPresence::Present);
    }

    #[test]
    fn rows_are_stored_exactly_as_given() {
        let workbook = MemorySpreadsheet::builder()
            .sheet("Data")
            .row(5)
            .cell(0, CellValue::Number(1.0))
            .row(2)
            .cell(0, CellValue::Number(2.0))
            .build();
        let sheet = workbook.sheet(0).expect("sheet");
        assert_eq!(sheet.row(0).expect("row").row, 5);
        assert_eq!(sheet.row(1).expect("row").row, 2);
    }

    #[test]
    fn layout_capability_requires_an_explicit_layout() {
        let plain = MemorySpreadsheet::builder().sheet("Data").build();
        assert!(plain.layout().is_none());

        let pane = FreezePane {
            corner: Default::default(),
            x_split: 0,
            y_split: 1,
            top_row: 1,
            left_col: 0,
        };
        let with_layout = MemorySpreadsheet::builder()
            .sheet("Data")
            .sheet("Other")
            .sheet_layout(SheetLayoutData {
                freeze_pane: Some(pane),
                ..Default::default()
            })
            .build();
        let layout = with_layout.layout().expect("capability");
        // The first sheet never got a layout and falls back to defaults.
        let default_layout = layout.sheet_layout(0).expect("default");
        assert!(default_layout.freeze_pane().is_none());
        assert_eq!(
            default_layout.column_width(3),
            crate::view::DEFAULT_COLUMN_WIDTH
        );
        let second = layout.sheet_layout(1).expect("layout");
        assert_eq!(second.freeze_pane(), Some(pane));
    }

    #[test]
    #[should_panic(expected = "row() requires a sheet")]
    fn row_without_sheet_panics() {
        let _ = MemorySpreadsheet::builder().row(0);
    }
}
