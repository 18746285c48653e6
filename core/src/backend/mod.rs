//! Input backends: each file format adapts to
//! [`SpreadsheetView`](crate::view::SpreadsheetView) here.
//!
//! [`open_spreadsheet_bytes`] and [`open_spreadsheet_path`] probe the
//! formats: the extension picks which format is tried first, and a probe
//! that finds no package marker falls through to the other format. The
//! null device loads as an empty spreadsheet so a file can be compared
//! against nothing.

use thiserror::Error;

use crate::error_codes;
use crate::style::{Color, FontDescriptor, StyleSnapshot};
use crate::view::{SheetView, SpreadsheetView};
use crate::workbook::MacroPresence;

pub mod excel_open_xml;
pub mod memory;
pub mod ods;
mod sheet_parser;
mod styles_parser;

pub use excel_open_xml::{ExcelSpreadsheet, XlsxError};
pub use memory::{MemorySpreadsheet, MemorySpreadsheetBuilder};
pub use ods::{OdsError, OdsSpreadsheet};
pub use sheet_parser::XmlParseError;

/// Which backend produced a loaded view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    Excel,
    Ods,
    Empty,
}

impl std::fmt::Display for SourceFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            SourceFormat::Excel => "xlsx",
            SourceFormat::Ods => "ods",
            SourceFormat::Empty => "empty",
        })
    }
}

/// A view together with the format that produced it.
pub struct LoadedSpreadsheet {
    pub view: Box<dyn SpreadsheetView>,
    pub format: SourceFormat,
}

impl std::fmt::Debug for LoadedSpreadsheet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoadedSpreadsheet")
            .field("format", &self.format)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum LoadError {
    #[error(
        "[SHEETCMP_FMT_001] cannot read '{source_name}' as a spreadsheet: {reason}. \
         Suggestion: expected an .xlsx or .ods file; check that the file is not corrupted."
    )]
    Unreadable { source_name: String, reason: String },
    #[cfg(feature = "std-fs")]
    #[error(
        "[SHEETCMP_FMT_002] cannot open '{path}': {source}. \
         Suggestion: check that the path exists and is readable."
    )]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

impl LoadError {
    pub fn code(&self) -> &'static str {
        match self {
            LoadError::Unreadable { .. } => error_codes::LOAD_UNREADABLE,
            #[cfg(feature = "std-fs")]
            LoadError::Io { .. } => error_codes::LOAD_IO,
        }
    }
}

/// Opens a spreadsheet from an in-memory buffer. Tries Excel first, then
/// OpenDocument when the buffer carries no Excel package marker.
pub fn open_spreadsheet_bytes(
    bytes: &[u8],
    source_name: &str,
) -> Result<LoadedSpreadsheet, LoadError> {
    open_with_primary(bytes, source_name, false)
}

/// Opens a spreadsheet from a path. The null device (`/dev/null`, `NUL`)
/// yields an empty view; otherwise the extension picks the format to try
/// first.
#[cfg(feature = "std-fs")]
pub fn open_spreadsheet_path(
    path: impl AsRef<std::path::Path>,
) -> Result<LoadedSpreadsheet, LoadError> {
    let path = path.as_ref();
    if is_null_device(path) {
        return Ok(LoadedSpreadsheet {
            view: Box::new(EmptySpreadsheet),
            format: SourceFormat::Empty,
        });
    }
    let bytes = std::fs::read(path).map_err(|source| LoadError::Io {
        path: path.display().to_string(),
        source,
    })?;
    let prefer_ods = path
        .extension()
        .map(|ext| ext.eq_ignore_ascii_case("ods"))
        .unwrap_or(false);
    open_with_primary(&bytes, &path.display().to_string(), prefer_ods)
}

#[cfg(feature = "std-fs")]
fn is_null_device(path: &std::path::Path) -> bool {
    let raw = path.as_os_str().to_string_lossy();
    if raw == "/dev/null" {
        return true;
    }
    let trimmed = raw.strip_prefix(r"\\.\").unwrap_or(&raw);
    trimmed.eq_ignore_ascii_case("nul")
}

fn open_with_primary(
    bytes: &[u8],
    source_name: &str,
    prefer_ods: bool,
) -> Result<LoadedSpreadsheet, LoadError> {
    if prefer_ods {
        match load_ods(bytes) {
            Ok(loaded) => Ok(loaded),
            Err(primary @ OdsError::NotPackage { .. }) => match load_excel(bytes) {
                Ok(loaded) => Ok(loaded),
                Err(secondary) => Err(unreadable(
                    source_name,
                    format!("{primary}; also tried xlsx: {secondary}"),
                )),
            },
            Err(primary) => Err(unreadable(source_name, primary.to_string())),
        }
    } else {
        match load_excel(bytes) {
            Ok(loaded) => Ok(loaded),
            Err(primary @ XlsxError::NotPackage { .. }) => match load_ods(bytes) {
                Ok(loaded) => Ok(loaded),
                Err(secondary) => Err(unreadable(
                    source_name,
                    format!("{primary}; also tried ods: {secondary}"),
                )),
            },
            Err(primary) => Err(unreadable(source_name, primary.to_string())),
        }
    }
}

fn load_excel(bytes: &[u8]) -> Result<LoadedSpreadsheet, XlsxError> {
    ExcelSpreadsheet::from_bytes(bytes).map(|view| LoadedSpreadsheet {
        view: Box::new(view),
        format: SourceFormat::Excel,
    })
}

fn load_ods(bytes: &[u8]) -> Result<LoadedSpreadsheet, OdsError> {
    OdsSpreadsheet::from_bytes(bytes).map(|view| LoadedSpreadsheet {
        view: Box::new(view),
        format: SourceFormat::Ods,
    })
}

fn unreadable(source_name: &str, reason: String) -> LoadError {
    LoadError::Unreadable {
        source_name: source_name.to_string(),
        reason,
    }
}

/// A workbook with no sheets, no fonts, and definitely no macros.
pub struct EmptySpreadsheet;

impl SpreadsheetView for EmptySpreadsheet {
    fn sheet_count(&self) -> u32 {
        0
    }

    fn sheet(&self, _index: u32) -> Option<&dyn SheetView> {
        None
    }

    fn font(&self, _index: u32) -> Option<&FontDescriptor> {
        None
    }

    fn macro_presence(&self) -> MacroPresence {
        MacroPresence::Absent
    }
}

/// The formatting both file backends treat as unstyled: the default
/// Excel cell format.
pub(crate) fn baseline_snapshot() -> StyleSnapshot {
    StyleSnapshot {
        locked: true,
        data_format: "General".into(),
        ..StyleSnapshot::default()
    }
}

pub(crate) fn baseline_font() -> FontDescriptor {
    FontDescriptor {
        bold_weight: 400,
        color: Color::Auto,
        height: 220,
        name: "Calibri".into(),
    }
}
