use anyhow::{Context, Result};
use sheetcmp::{open_spreadsheet_path, MacroPresence};
use std::io::{self, Write};
use std::path::Path;
use std::process::ExitCode;

pub fn run(path: &str) -> Result<ExitCode> {
    let loaded = open_spreadsheet_path(path)
        .with_context(|| format!("Failed to open spreadsheet: {}", path))?;

    let stdout = io::stdout();
    let mut handle = stdout.lock();

    let filename = Path::new(path)
        .file_name()
        .map(|s| s.to_string_lossy())
        .unwrap_or_else(|| path.into());

    writeln!(handle, "Spreadsheet: {}", filename)?;
    writeln!(handle, "Format: {}", loaded.format)?;
    let macros = match loaded.view.macro_presence() {
        MacroPresence::Present => "present",
        MacroPresence::Absent => "absent",
        MacroPresence::Unknown => "unknown",
    };
    writeln!(handle, "Macros: {}", macros)?;
    let layout = if loaded.view.layout().is_some() {
        "available"
    } else {
        "not available"
    };
    writeln!(handle, "Layout data: {}", layout)?;
    writeln!(handle, "Sheets: {}", loaded.view.sheet_count())?;

    for index in 0..loaded.view.sheet_count() {
        if let Some(sheet) = loaded.view.sheet(index) {
            let mut cells = 0usize;
            for pos in 0..sheet.row_count() {
                if let Some(row) = sheet.row(pos) {
                    cells += row.cells.len();
                }
            }
            writeln!(
                handle,
                "  - \"{}\": {} stored rows, {} cells",
                sheet.name(),
                sheet.row_count(),
                cells
            )?;
        }
    }

    Ok(ExitCode::from(0))
}
