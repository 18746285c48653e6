//! The Excel OOXML backend: loads `.xlsx`/`.xlsm` packages into an
//! in-memory [`SpreadsheetView`] with the full layout capability.

use std::io::Cursor;

use thiserror::Error;

use super::sheet_parser::{
    parse_relationships, parse_shared_strings, parse_sheet_xml, parse_workbook_xml,
    resolve_sheet_target, WorkbookRels, XmlParseError,
};
use super::styles_parser::{parse_styles_xml, StyleCatalog};
use crate::container::{ArchiveContainer, ContainerError, ContainerLimits};
use crate::error_codes;
use crate::style::FontDescriptor;
use crate::view::{
    SheetData, SheetLayout, SheetLayoutData, SheetView, SpreadsheetView, WorkbookLayout,
};
use crate::workbook::MacroPresence;

const CONTENT_TYPES_PART: &str = "[Content_Types].xml";
const WORKBOOK_PART: &str = "xl/workbook.xml";
const WORKBOOK_RELS_PART: &str = "xl/_rels/workbook.xml.rels";
const SHARED_STRINGS_PART: &str = "xl/sharedStrings.xml";
const STYLES_PART: &str = "xl/styles.xml";
const VBA_PART: &str = "xl/vbaProject.bin";

/// Failure while reading an Excel package.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum XlsxError {
    /// The bytes are not an OOXML spreadsheet package at all. Callers
    /// probing for formats key on this variant.
    #[error("not an Excel package: {reason}")]
    NotPackage { reason: String },
    #[error("required part '{name}' is missing")]
    MissingPart { name: String },
    #[error(transparent)]
    Parse(#[from] XmlParseError),
    #[error(transparent)]
    Container(#[from] ContainerError),
}

impl XlsxError {
    pub fn code(&self) -> &'static str {
        match self {
            XlsxError::NotPackage { .. } => error_codes::XLSX_NOT_PACKAGE,
            XlsxError::MissingPart { .. } => error_codes::XLSX_MISSING_PART,
            XlsxError::Parse(_) => error_codes::XLSX_XML,
            XlsxError::Container(_) => error_codes::XLSX_CONTAINER,
        }
    }
}

/// A fully materialized Excel workbook.
#[derive(Debug)]
pub struct ExcelSpreadsheet {
    sheets: Vec<SheetData>,
    layouts: Vec<SheetLayoutData>,
    fonts: Vec<FontDescriptor>,
    macros: MacroPresence,
}

impl ExcelSpreadsheet {
    pub fn from_bytes(bytes: &[u8]) -> Result<ExcelSpreadsheet, XlsxError> {
        Self::from_bytes_with_limits(bytes, ContainerLimits::default())
    }

    pub fn from_bytes_with_limits(
        bytes: &[u8],
        limits: ContainerLimits,
    ) -> Result<ExcelSpreadsheet, XlsxError> {
        let mut container =
            ArchiveContainer::open_from_reader_with_limits(Cursor::new(bytes), limits).map_err(
                |err| match err {
                    ContainerError::NotZip => XlsxError::NotPackage {
                        reason: "not a ZIP archive".into(),
                    },
                    other => XlsxError::Container(other),
                },
            )?;
        if !container.has_part(CONTENT_TYPES_PART) {
            return Err(XlsxError::NotPackage {
                reason: format!("missing {CONTENT_TYPES_PART}"),
            });
        }

        let workbook_xml = read_required(&mut container, WORKBOOK_PART)?;
        let entries = parse_workbook_xml(&workbook_xml)?;

        let rels = match container.read_part_optional(WORKBOOK_RELS_PART)? {
            Some(xml) => parse_relationships(&xml)?,
            None => WorkbookRels::default(),
        };
        let shared_strings = match container.read_part_optional(SHARED_STRINGS_PART)? {
            Some(xml) => parse_shared_strings(&xml)?,
            None => Vec::new(),
        };
        let styles = match container.read_part_optional(STYLES_PART)? {
            Some(xml) => parse_styles_xml(&xml)?,
            None => StyleCatalog::default(),
        };

        // The package form is definitive: a macro project is either in
        // the archive or it is not.
        let macros = if rels.has_vba_project || container.has_part(VBA_PART) {
            MacroPresence::Present
        } else {
            MacroPresence::Absent
        };

        let mut sheets = Vec::with_capacity(entries.len());
        let mut layouts = Vec::with_capacity(entries.len());
        for (index, entry) in entries.iter().enumerate() {
            let target = resolve_sheet_target(entry, &rels, index);
            let xml = read_required(&mut container, &target)?;
            let (sheet, layout) = parse_sheet_xml(&xml, &entry.name, &shared_strings, &styles)?;
            sheets.push(sheet);
            layouts.push(layout);
        }

        Ok(ExcelSpreadsheet {
            sheets,
            layouts,
            fonts: styles.fonts,
            macros,
        })
    }
}

fn read_required(container: &mut ArchiveContainer<'_>, name: &str) -> Result<Vec<u8>, XlsxError> {
    container.read_part(name).map_err(|err| match err {
        ContainerError::PartMissing { name } => XlsxError::MissingPart { name },
        other => XlsxError::Container(other),
    })
}

impl SpreadsheetView for ExcelSpreadsheet {
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
        Some(self)
    }
}

impl WorkbookLayout for ExcelSpreadsheet {
    fn sheet_layout(&self, index: u32) -> Option<&dyn SheetLayout> {
        self.layouts
            .get(index as usize)
            .map(|l| l as &dyn SheetLayout)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workbook::CellValue;
    use std::io::Write;
    use zip::write::SimpleFileOptions;
    use zip::{CompressionMethod, ZipWriter};

    fn package(parts: &[(&str, &str)]) -> Vec<u8> {
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        let options = SimpleFileOptions::default().compression_method(CompressionMethod::Stored);
        for (name, content) in parts {
            writer.start_file(*name, options).expect("start file");
            writer.write_all(content.as_bytes()).expect("write part");
        }
        writer.finish().expect("finish").into_inner()
    }

    const WORKBOOK: &str = r#"<workbook><sheets>
<sheet name="Data" sheetId="1" r:id="rId1"/>
</sheets></workbook>"#;

    const RELS: &str = r#"<Relationships>
<Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet1.xml"/>
</Relationships>"#;

    #[test]
    fn minimal_package_loads() {
        let bytes = package(&[
            ("[Content_Types].xml", "<Types/>"),
            ("xl/workbook.xml", WORKBOOK),
            ("xl/_rels/workbook.xml.rels", RELS),
            (
                "xl/worksheets/sheet1.xml",
                r#"<worksheet><sheetData>
<row r="1"><c r="A1"><v>42</v></c></row>
</sheetData></worksheet>"#,
            ),
        ]);
        let workbook = ExcelSpreadsheet::from_bytes(&bytes).expect("loads");
        assert_eq!(workbook.sheet_count(), 1);
        let sheet = workbook.sheet(0).expect("sheet");
        assert_eq!(sheet.name(), "Data");
        let row = sheet.row(0).expect("row");
        assert_eq!(row.cells[0].value, CellValue::Number(42.0));
        assert_eq!(workbook.macro_presence(), MacroPresence::Absent);
        let layout = workbook.layout().expect("capability");
        let sheet_layout = layout.sheet_layout(0).expect("layout");
        assert_eq!(sheet_layout.column_width(0), crate::view::DEFAULT_COLUMN_WIDTH);
    }

    #[test]
    fn missing_rels_falls_back_to_conventional_paths() {
        let bytes = package(&[
            ("[Content_Types].xml", "<Types/>"),
            ("xl/workbook.xml", WORKBOOK),
            (
                "xl/worksheets/sheet1.xml",
                r#"<worksheet><sheetData><row r="1"><c r="A1"><v>1</v></c></row></sheetData></worksheet>"#,
            ),
        ]);
        let workbook = ExcelSpreadsheet::from_bytes(&bytes).expect("loads");
        assert_eq!(workbook.sheet_count(), 1);
    }

    #[test]
    fn shared_strings_and_styles_are_wired_through() {
        let bytes = package(&[
            ("[Content_Types].xml", "<Types/>"),
            ("xl/workbook.xml", WORKBOOK),
            ("xl/_rels/workbook.xml.rels", RELS),
            (
                "xl/sharedStrings.xml",
                r#"<sst><si><t>hello</t></si></sst>"#,
            ),
            (
                "xl/styles.xml",
                r#"<styleSheet>
<fonts count="2"><font><sz val="11"/><name val="Calibri"/></font><font><b/><sz val="11"/><name val="Calibri"/></font></fonts>
<cellXfs count="2"><xf numFmtId="0" fontId="0"/><xf numFmtId="0" fontId="1"/></cellXfs>
</styleSheet>"#,
            ),
            (
                "xl/worksheets/sheet1.xml",
                r#"<worksheet><sheetData>
<row r="1"><c r="A1" t="s" s="1"><v>0</v></c></row>
</sheetData></worksheet>"#,
            ),
        ]);
        let workbook = ExcelSpreadsheet::from_bytes(&bytes).expect("loads");
        let sheet = workbook.sheet(0).expect("sheet");
        let cell = &sheet.row(0).expect("row").cells[0];
        assert_eq!(cell.value, CellValue::Text("hello".into()));
        assert_eq!(cell.style.font_index, 1);
        let font = workbook.font(cell.style.font_index).expect("font");
        assert_eq!(font.bold_weight, 700);
    }

    #[test]
    fn vba_relationship_marks_macros_present() {
        let bytes = package(&[
            ("[Content_Types].xml", "<Types/>"),
            ("xl/workbook.xml", WORKBOOK),
            (
                "xl/_rels/workbook.xml.rels",
                r#"<Relationships>
<Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet1.xml"/>
<Relationship Id="rId2" Type="http://schemas.microsoft.com/office/2006/relationships/vbaProject" Target="vbaProject.bin"/>
</Relationships>"#,
            ),
            (
                "xl/worksheets/sheet1.xml",
                "<worksheet><sheetData/></worksheet>",
            ),
        ]);
        let workbook = ExcelSpreadsheet::from_bytes(&bytes).expect("loads");
        assert_eq!(workbook.macro_presence(), MacroPresence::Present);
    }

    #[test]
    fn non_zip_bytes_are_not_a_package() {
        let err = ExcelSpreadsheet::from_bytes(b"plain text").expect_err("not a package");
        assert!(matches!(err, XlsxError::NotPackage { .. }));
        assert_eq!(err.code(), "SHEETCMP_XLSX_001");
    }

    #[test]
    fn zip_without_content_types_is_not_a_package() {
        let bytes = package(&[("readme.txt", "hello")]);
        let err = ExcelSpreadsheet::from_bytes(&bytes).expect_err("not a package");
        assert!(matches!(err, XlsxError::NotPackage { .. }));
    }

    #[test]
    fn missing_workbook_part_is_reported_by_name() {
        let bytes = package(&[("[Content_Types].xml", "<Types/>")]);
        let err = ExcelSpreadsheet::from_bytes(&bytes).expect_err("missing part");
        match &err {
            XlsxError::MissingPart { name } => assert_eq!(name, "xl/workbook.xml"),
            other => panic!("expected MissingPart, got {other:?}"),
        }
        assert_eq!(err.code(), "SHEETCMP_XLSX_002");
    }
}
