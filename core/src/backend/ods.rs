//! The OpenDocument spreadsheet backend.
//!
//! ODS stores the grid positionally, with run-length compressed rows and
//! cells. Loading expands those runs into the same sparse storage the
//! Excel backend uses, so the engine sees one shape. Values only: cells
//! carry the shared default formatting, macro presence is unknown, and
//! there is no layout capability.

use std::io::Cursor;

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use thiserror::Error;

use super::{baseline_font, baseline_snapshot};
use crate::container::{ArchiveContainer, ContainerError, ContainerLimits};
use crate::error_codes;
use crate::style::FontDescriptor;
use crate::view::{Cell, RowData, SheetData, SheetView, SpreadsheetView};
use crate::workbook::{CellValue, MacroPresence};

const MIMETYPE_PART: &str = "mimetype";
const CONTENT_PART: &str = "content.xml";
const ODS_MIMETYPE: &str = "application/vnd.oasis.opendocument.spreadsheet";

/// Cap on materialized copies of one repeated row or cell. Repeats past
/// the cap still advance the position counters, so trailing filler in
/// real files stays cheap and later content keeps its true address.
const REPEAT_LIMIT: u32 = 10_000;

/// Failure while reading an OpenDocument package.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum OdsError {
    /// The bytes are not an ODS package. Callers probing for formats key
    /// on this variant.
    #[error("not an OpenDocument spreadsheet: {reason}")]
    NotPackage { reason: String },
    #[error("content.xml parse error: {message}")]
    Xml { message: String },
    #[error(transparent)]
    Container(#[from] ContainerError),
}

impl OdsError {
    pub fn code(&self) -> &'static str {
        match self {
            OdsError::NotPackage { .. } => error_codes::ODS_NOT_PACKAGE,
            OdsError::Xml { .. } => error_codes::ODS_XML,
            OdsError::Container(_) => error_codes::ODS_CONTAINER,
        }
    }
}

/// A fully materialized ODS workbook.
#[derive(Debug)]
pub struct OdsSpreadsheet {
    sheets: Vec<SheetData>,
    default_font: FontDescriptor,
}

impl OdsSpreadsheet {
    pub fn from_bytes(bytes: &[u8]) -> Result<OdsSpreadsheet, OdsError> {
        Self::from_bytes_with_limits(bytes, ContainerLimits::default())
    }

    pub fn from_bytes_with_limits(
        bytes: &[u8],
        limits: ContainerLimits,
    ) -> Result<OdsSpreadsheet, OdsError> {
        let mut container =
            ArchiveContainer::open_from_reader_with_limits(Cursor::new(bytes), limits).map_err(
                |err| match err {
                    ContainerError::NotZip => OdsError::NotPackage {
                        reason: "not a ZIP archive".into(),
                    },
                    other => OdsError::Container(other),
                },
            )?;

        if let Some(mimetype) = container.read_part_optional(MIMETYPE_PART)? {
            let mimetype = String::from_utf8_lossy(&mimetype);
            if !mimetype.contains(ODS_MIMETYPE) {
                return Err(OdsError::NotPackage {
                    reason: format!("mimetype is '{}'", mimetype.trim()),
                });
            }
        }
        let content = container
            .read_part_optional(CONTENT_PART)?
            .ok_or_else(|| OdsError::NotPackage {
                reason: format!("missing {CONTENT_PART}"),
            })?;

        Ok(OdsSpreadsheet {
            sheets: parse_content(&content)?,
            default_font: baseline_font(),
        })
    }
}

impl SpreadsheetView for OdsSpreadsheet {
    fn sheet_count(&self) -> u32 {
        self.sheets.len() as u32
    }

    fn sheet(&self, index: u32) -> Option<&dyn SheetView> {
        self.sheets.get(index as usize).map(|s| s as &dyn SheetView)
    }

    fn font(&self, _index: u32) -> Option<&FontDescriptor> {
        Some(&self.default_font)
    }

    fn macro_presence(&self) -> MacroPresence {
        MacroPresence::Unknown
    }
}

fn parse_content(xml: &[u8]) -> Result<Vec<SheetData>, OdsError> {
    let mut reader = Reader::from_reader(xml);
    reader.config_mut().trim_text(false);
    let mut buf = Vec::new();
    let mut sheets = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) if e.name().as_ref() == b"table:table" => {
                let name = table_name(&e, sheets.len())?;
                sheets.push(parse_table(&mut reader, name)?);
            }
            Ok(Event::Empty(e)) if e.name().as_ref() == b"table:table" => {
                let name = table_name(&e, sheets.len())?;
                sheets.push(SheetData {
                    name,
                    rows: Vec::new(),
                });
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(xml_err(e)),
            _ => {}
        }
        buf.clear();
    }

    Ok(sheets)
}

fn table_name(e: &BytesStart<'_>, existing: usize) -> Result<String, OdsError> {
    Ok(ods_attr(e, b"table:name")?.unwrap_or_else(|| format!("Sheet{}", existing + 1)))
}

fn parse_table(reader: &mut Reader<&[u8]>, name: String) -> Result<SheetData, OdsError> {
    let mut rows: Vec<RowData> = Vec::new();
    let mut next_row: u32 = 0;
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) if e.name().as_ref() == b"table:table-row" => {
                let repeat = repeat_attr(&e, b"table:number-rows-repeated")?;
                let cells = parse_row(reader)?;
                flush_row(&mut rows, &mut next_row, cells, repeat);
            }
            Ok(Event::Empty(e)) if e.name().as_ref() == b"table:table-row" => {
                let repeat = repeat_attr(&e, b"table:number-rows-repeated")?;
                next_row = next_row.saturating_add(repeat);
            }
            Ok(Event::End(e)) if e.name().as_ref() == b"table:table" => break,
            Ok(Event::Eof) => {
                return Err(OdsError::Xml {
                    message: "unexpected EOF inside table".into(),
                });
            }
            Err(e) => return Err(xml_err(e)),
            _ => {}
        }
        buf.clear();
    }

    Ok(SheetData { name, rows })
}

fn flush_row(rows: &mut Vec<RowData>, next_row: &mut u32, cells: Vec<Cell>, repeat: u32) {
    if !cells.is_empty() {
        let copies = repeat.min(REPEAT_LIMIT);
        for i in 0..copies {
            rows.push(RowData {
                row: next_row.saturating_add(i),
                cells: cells.clone(),
            });
        }
    }
    *next_row = next_row.saturating_add(repeat);
}

fn parse_row(reader: &mut Reader<&[u8]>) -> Result<Vec<Cell>, OdsError> {
    let mut cells: Vec<Cell> = Vec::new();
    let mut next_col: u32 = 0;
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) if e.name().as_ref() == b"table:table-cell" => {
                let attrs = CellAttrs::from_element(&e)?;
                let text = collect_cell_text(reader)?;
                let value = build_value(&attrs, text);
                push_cell(&mut cells, &mut next_col, value, attrs.columns_repeated);
            }
            Ok(Event::Empty(e)) if e.name().as_ref() == b"table:table-cell" => {
                let attrs = CellAttrs::from_element(&e)?;
                let value = build_value(&attrs, None);
                push_cell(&mut cells, &mut next_col, value, attrs.columns_repeated);
            }
            Ok(Event::Start(e)) if e.name().as_ref() == b"table:covered-table-cell" => {
                let repeat = repeat_attr(&e, b"table:number-columns-repeated")?;
                reader
                    .read_to_end(e.name())
                    .map_err(|err| OdsError::Xml {
                        message: err.to_string(),
                    })?;
                next_col = next_col.saturating_add(repeat);
            }
            Ok(Event::Empty(e)) if e.name().as_ref() == b"table:covered-table-cell" => {
                let repeat = repeat_attr(&e, b"table:number-columns-repeated")?;
                next_col = next_col.saturating_add(repeat);
            }
            Ok(Event::End(e)) if e.name().as_ref() == b"table:table-row" => break,
            Ok(Event::Eof) => {
                return Err(OdsError::Xml {
                    message: "unexpected EOF inside table row".into(),
                });
            }
            Err(e) => return Err(xml_err(e)),
            _ => {}
        }
        buf.clear();
    }

    Ok(cells)
}

fn push_cell(cells: &mut Vec<Cell>, next_col: &mut u32, value: Option<CellValue>, repeat: u32) {
    if let Some(value) = value {
        let copies = repeat.min(REPEAT_LIMIT);
        for i in 0..copies {
            cells.push(Cell {
                col: next_col.saturating_add(i),
                value: value.clone(),
                style: baseline_snapshot(),
            });
        }
    }
    *next_col = next_col.saturating_add(repeat);
}

#[derive(Default)]
struct CellAttrs {
    value_type: Option<String>,
    value: Option<String>,
    boolean_value: Option<String>,
    string_value: Option<String>,
    date_value: Option<String>,
    time_value: Option<String>,
    formula: Option<String>,
    columns_repeated: u32,
}

impl CellAttrs {
    fn from_element(element: &BytesStart<'_>) -> Result<CellAttrs, OdsError> {
        let mut attrs = CellAttrs {
            columns_repeated: 1,
            ..Default::default()
        };
        for attr in element.attributes() {
            let attr = attr.map_err(|e| OdsError::Xml {
                message: e.to_string(),
            })?;
            let value = attr
                .unescape_value()
                .map_err(|e| OdsError::Xml {
                    message: e.to_string(),
                })?
                .into_owned();
            match attr.key.as_ref() {
                b"office:value-type" => attrs.value_type = Some(value),
                b"office:value" => attrs.value = Some(value),
                b"office:boolean-value" => attrs.boolean_value = Some(value),
                b"office:string-value" => attrs.string_value = Some(value),
                b"office:date-value" => attrs.date_value = Some(value),
                b"office:time-value" => attrs.time_value = Some(value),
                b"table:formula" => attrs.formula = Some(value),
                b"table:number-columns-repeated" => {
                    if let Ok(n) = value.parse::<u32>() {
                        attrs.columns_repeated = n.max(1);
                    }
                }
                _ => {}
            }
        }
        Ok(attrs)
    }
}

/// Builds the stored value from typed attributes, display text and the
/// optional formula. Returns `None` for a cell that carries nothing.
fn build_value(attrs: &CellAttrs, text: Option<String>) -> Option<CellValue> {
    let base = match attrs.value_type.as_deref() {
        Some("float") | Some("percentage") | Some("currency") => attrs
            .value
            .as_deref()
            .and_then(|v| v.parse::<f64>().ok())
            .map(CellValue::Number)
            .or_else(|| text.map(CellValue::Text)),
        Some("boolean") => attrs
            .boolean_value
            .as_deref()
            .map(|v| CellValue::Bool(v == "true")),
        Some("date") => attrs
            .date_value
            .clone()
            .map(CellValue::Text)
            .or_else(|| text.map(CellValue::Text)),
        Some("time") => attrs
            .time_value
            .clone()
            .map(CellValue::Text)
            .or_else(|| text.map(CellValue::Text)),
        Some("string") => Some(CellValue::Text(
            attrs
                .string_value
                .clone()
                .or(text)
                .unwrap_or_default(),
        )),
        _ => text.map(CellValue::Text),
    };

    match &attrs.formula {
        Some(raw) => {
            let text = raw.strip_prefix("of:").unwrap_or(raw).to_string();
            Some(CellValue::Formula {
                text,
                value: Box::new(base.unwrap_or_else(|| CellValue::Text(String::new()))),
            })
        }
        None => base,
    }
}

/// Collects the display text of one cell: its `text:p` paragraphs joined
/// with newlines. Annotations are skipped, they are not cell content.
fn collect_cell_text(reader: &mut Reader<&[u8]>) -> Result<Option<String>, OdsError> {
    let mut paragraphs: Vec<String> = Vec::new();
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) if e.name().as_ref() == b"text:p" => {
                paragraphs.push(collect_paragraph(reader)?);
            }
            Ok(Event::Empty(e)) if e.name().as_ref() == b"text:p" => {
                paragraphs.push(String::new());
            }
            Ok(Event::Start(e)) if e.name().as_ref() == b"office:annotation" => {
                reader
                    .read_to_end(e.name())
                    .map_err(|err| OdsError::Xml {
                        message: err.to_string(),
                    })?;
            }
            Ok(Event::End(e)) if e.name().as_ref() == b"table:table-cell" => break,
            Ok(Event::Eof) => {
                return Err(OdsError::Xml {
                    message: "unexpected EOF inside cell".into(),
                });
            }
            Err(e) => return Err(xml_err(e)),
            _ => {}
        }
        buf.clear();
    }

    Ok(if paragraphs.is_empty() {
        None
    } else {
        Some(paragraphs.join("\n"))
    })
}

fn collect_paragraph(reader: &mut Reader<&[u8]>) -> Result<String, OdsError> {
    let mut out = String::new();
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Text(t)) => {
                let text = t.unescape().map_err(|e| OdsError::Xml {
                    message: e.to_string(),
                })?;
                out.push_str(&text);
            }
            Ok(Event::Start(e)) | Ok(Event::Empty(e)) => match e.name().as_ref() {
                b"text:s" => {
                    let count = ods_attr(&e, b"text:c")?
                        .and_then(|v| v.parse::<usize>().ok())
                        .unwrap_or(1);
                    for _ in 0..count.min(REPEAT_LIMIT as usize) {
                        out.push(' ');
                    }
                }
                b"text:tab" => out.push('\t'),
                b"text:line-break" => out.push('\n'),
                _ => {}
            },
            Ok(Event::End(e)) if e.name().as_ref() == b"text:p" => break,
            Ok(Event::Eof) => {
                return Err(OdsError::Xml {
                    message: "unexpected EOF inside paragraph".into(),
                });
            }
            Err(e) => return Err(xml_err(e)),
            _ => {}
        }
        buf.clear();
    }

    Ok(out)
}

fn repeat_attr(e: &BytesStart<'_>, key: &[u8]) -> Result<u32, OdsError> {
    Ok(ods_attr(e, key)?
        .and_then(|v| v.parse::<u32>().ok())
        .map(|n| n.max(1))
        .unwrap_or(1))
}

fn ods_attr(element: &BytesStart<'_>, key: &[u8]) -> Result<Option<String>, OdsError> {
    for attr in element.attributes() {
        let attr = attr.map_err(|e| OdsError::Xml {
            message: e.to_string(),
        })?;
        if attr.key.as_ref() == key {
            return Ok(Some(
                attr.unescape_value()
                    .map_err(|e| OdsError::Xml {
                        message: e.to_string(),
                    })?
                    .into_owned(),
            ));
        }
    }
    Ok(None)
}

fn xml_err(err: quick_xml::Error) -> OdsError {
    OdsError::Xml {
        message: err.to_string(),
    }
}
