//! sheetcmp: compare two spreadsheets and report what changed.
//!
//! Built for regression checks over generated workbooks: load two
//! sources (`.xlsx`/`.xlsm`, `.ods`, or an in-memory build), walk both
//! cell streams in lockstep, and report value, style, font, sheet
//! feature and macro-presence differences as a stream of events or a
//! collected [`DiffReport`].
//!
//! Expected differences are suppressed with per-side ignore rules of the
//! form `sheet:rows:cols:cells` (see [`WorkbookIgnores`]).
//!
//! # Quick start
//!
//! ```
//! use sheetcmp::{diff_spreadsheets, CellValue, DiffConfig, MemorySpreadsheet};
//!
//! let a = MemorySpreadsheet::builder()
//!     .sheet("Data")
//!     .row(0)
//!     .cell(0, CellValue::Number(1.0))
//!     .build();
//! let b = MemorySpreadsheet::builder()
//!     .sheet("Data")
//!     .row(0)
//!     .cell(0, CellValue::Number(2.0))
//!     .build();
//!
//! let report = diff_spreadsheets(&a, &b, &DiffConfig::default())?;
//! assert!(report.differs);
//! assert_eq!(report.events.len(), 1);
//! # Ok::<(), sheetcmp::DiffError>(())
//! ```

mod addressing;
mod backend;
mod config;
mod container;
mod diff;
mod engine;
pub mod error_codes;
mod ignore;
mod output;
mod sink;
mod stream;
mod style;
mod view;
mod workbook;

pub use addressing::{
    address_to_index, column_label, column_letters_to_index, index_to_address, MAX_COL_INDEX,
    MAX_ROW_INDEX,
};
#[cfg(feature = "std-fs")]
pub use backend::open_spreadsheet_path;
pub use backend::{
    open_spreadsheet_bytes, EmptySpreadsheet, ExcelSpreadsheet, LoadError, LoadedSpreadsheet,
    MemorySpreadsheet, MemorySpreadsheetBuilder, OdsError, OdsSpreadsheet, SourceFormat,
    XlsxError, XmlParseError,
};
pub use config::{DiffConfig, DiffConfigBuilder};
pub use container::{ArchiveContainer, ContainerError, ContainerLimits};
pub use diff::{CellLocation, DiffError, DiffEvent, DiffReport, DiffSummary, SheetRef, Side};
pub use engine::{diff_spreadsheets, diff_spreadsheets_streaming};
pub use ignore::{IgnoreError, SheetIgnores, WorkbookIgnores};
pub use output::json::{deserialize_report, serialize_report, serialize_report_pretty};
pub use output::json_lines::JsonLinesSink;
pub use sink::{CallbackSink, DiffSink, VecSink};
pub use stream::{CellStream, StreamCell};
pub use style::{
    BorderStyle, Color, FillPattern, FontDescriptor, HorizontalAlignment, StyleSnapshot,
    VerticalAlignment,
};
pub use view::{
    Cell, ColumnWidthRange, FreezePane, MergedRegion, PaneCorner, RowData, RowRef, SheetData,
    SheetLayout, SheetLayoutData, SheetView, SpreadsheetView, WorkbookLayout,
    DEFAULT_COLUMN_WIDTH,
};
pub use workbook::{CellAddress, CellValue, MacroPresence};
