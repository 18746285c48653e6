//! Common test utilities shared across integration tests.

#![allow(dead_code)]

use std::io::{Cursor, Write};

use sheetcmp::{
    diff_spreadsheets, CellValue, DiffConfig, DiffEvent, DiffReport, MemorySpreadsheet,
    SpreadsheetView,
};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

/// Builds a single-sheet workbook named `name` from `(row, col, value)`
/// triples. Triples must already be in row-major order; the builder
/// stores them exactly as given.
pub fn grid(name: &str, cells: &[(u32, u32, f64)]) -> MemorySpreadsheet {
    workbook(&[(name, cells)])
}

/// Multi-sheet variant of [`grid`].
pub fn workbook(sheets: &[(&str, &[(u32, u32, f64)])]) -> MemorySpreadsheet {
    let mut builder = MemorySpreadsheet::builder();
    for (name, cells) in sheets {
        builder = builder.sheet(*name);
        let mut open_row = None;
        for &(row, col, value) in *cells {
            if open_row != Some(row) {
                builder = builder.row(row);
                open_row = Some(row);
            }
            builder = builder.cell(col, CellValue::Number(value));
        }
    }
    builder.build()
}

pub fn diff(a: &dyn SpreadsheetView, b: &dyn SpreadsheetView) -> DiffReport {
    diff_with(a, b, &DiffConfig::default())
}

pub fn diff_with(
    a: &dyn SpreadsheetView,
    b: &dyn SpreadsheetView,
    config: &DiffConfig,
) -> DiffReport {
    diff_spreadsheets(a, b, config).expect("diff run succeeds")
}

/// The descriptions of every style and sheet-feature finding, in
/// emission order.
pub fn descriptions(report: &DiffReport) -> Vec<&str> {
    report
        .events
        .iter()
        .filter_map(|event| match event {
            DiffEvent::StyleDiff { description, .. } => Some(description.as_str()),
            DiffEvent::SimpleDiff { description, .. } => Some(description.as_str()),
            _ => None,
        })
        .collect()
}

/// Writes an in-memory ZIP with the given parts, stored uncompressed.
pub fn package(parts: &[(&str, &str)]) -> Vec<u8> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Stored);
    for (name, content) in parts {
        writer.start_file(*name, options).expect("start zip entry");
        writer
            .write_all(content.as_bytes())
            .expect("write zip entry");
    }
    writer.finish().expect("finish zip").into_inner()
}

pub const WORKBOOK_XML: &str = r#"<workbook><sheets>
<sheet name="Data" sheetId="1" r:id="rId1"/>
</sheets></workbook>"#;

pub const WORKBOOK_RELS: &str = r#"<Relationships>
<Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet1.xml"/>
</Relationships>"#;

/// A minimal xlsx package with one sheet named "Data".
pub fn xlsx_bytes(sheet_xml: &str) -> Vec<u8> {
    package(&[
        ("[Content_Types].xml", "<Types/>"),
        ("xl/workbook.xml", WORKBOOK_XML),
        ("xl/_rels/workbook.xml.rels", WORKBOOK_RELS),
        ("xl/worksheets/sheet1.xml", sheet_xml),
    ])
}

/// A minimal ods package wrapping the given `<table:table>` elements.
pub fn ods_bytes(tables_xml: &str) -> Vec<u8> {
    let content = format!(
        "<office:document-content><office:body><office:spreadsheet>{tables_xml}</office:spreadsheet></office:body></office:document-content>"
    );
    package(&[
        (
            "mimetype",
            "application/vnd.oasis.opendocument.spreadsheet",
        ),
        ("content.xml", &content),
    ])
}
