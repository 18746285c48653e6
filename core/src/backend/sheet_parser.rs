//! XML parsing for Excel workbook structure and worksheet grids.
//!
//! Covers `workbook.xml`, the workbook relationships, `sharedStrings.xml`
//! and the per-sheet worksheet parts. Cells are re-sorted while loading,
//! so a part with out-of-order rows still satisfies the view ordering
//! contract.

use std::collections::BTreeMap;

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use rustc_hash::FxHashMap;
use thiserror::Error;

use super::styles_parser::StyleCatalog;
use crate::addressing::address_to_index;
use crate::view::{
    Cell, ColumnWidthRange, FreezePane, MergedRegion, PaneCorner, RowData, SheetData,
    SheetLayoutData, DEFAULT_COLUMN_WIDTH,
};
use crate::workbook::CellValue;

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum XmlParseError {
    #[error("XML parse error: {0}")]
    Xml(String),
    #[error("invalid cell address: {0}")]
    InvalidAddress(String),
    #[error("shared string index {0} out of bounds")]
    SharedStringOutOfBounds(usize),
}

/// One `<sheet>` entry of `workbook.xml`, in workbook order.
pub(crate) struct SheetEntry {
    pub(crate) name: String,
    pub(crate) rel_id: Option<String>,
    pub(crate) sheet_id: Option<u32>,
}

/// The workbook-level relationships: worksheet part targets plus whether
/// a VBA project is referenced.
#[derive(Default)]
pub(crate) struct WorkbookRels {
    pub(crate) worksheet_targets: FxHashMap<String, String>,
    pub(crate) has_vba_project: bool,
}

pub(crate) fn parse_workbook_xml(xml: &[u8]) -> Result<Vec<SheetEntry>, XmlParseError> {
    let mut reader = Reader::from_reader(xml);
    reader.config_mut().trim_text(true);
    let mut buf = Vec::new();
    let mut sheets = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) | Ok(Event::Empty(e)) if e.name().as_ref() == b"sheet" => {
                let mut name = None;
                let mut rel_id = None;
                let mut sheet_id = None;
                for attr in e.attributes() {
                    let attr = attr.map_err(|e| XmlParseError::Xml(e.to_string()))?;
                    match attr.key.as_ref() {
                        b"name" => {
                            name = Some(attr.unescape_value().map_err(to_xml_err)?.into_owned())
                        }
                        b"sheetId" => {
                            let parsed = attr.unescape_value().map_err(to_xml_err)?;
                            sheet_id = parsed.parse::<u32>().ok();
                        }
                        b"r:id" => {
                            rel_id = Some(attr.unescape_value().map_err(to_xml_err)?.into_owned())
                        }
                        _ => {}
                    }
                }
                if let Some(name) = name {
                    sheets.push(SheetEntry {
                        name,
                        rel_id,
                        sheet_id,
                    });
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(XmlParseError::Xml(e.to_string())),
            _ => {}
        }
        buf.clear();
    }

    Ok(sheets)
}

pub(crate) fn parse_relationships(xml: &[u8]) -> Result<WorkbookRels, XmlParseError> {
    let mut reader = Reader::from_reader(xml);
    reader.config_mut().trim_text(true);
    let mut buf = Vec::new();
    let mut rels = WorkbookRels::default();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) | Ok(Event::Empty(e)) if e.name().as_ref() == b"Relationship" => {
                let mut id = None;
                let mut target = None;
                let mut rel_type = None;
                for attr in e.attributes() {
                    let attr = attr.map_err(|e| XmlParseError::Xml(e.to_string()))?;
                    match attr.key.as_ref() {
                        b"Id" => id = Some(attr.unescape_value().map_err(to_xml_err)?.into_owned()),
                        b"Target" => {
                            target = Some(attr.unescape_value().map_err(to_xml_err)?.into_owned())
                        }
                        b"Type" => {
                            rel_type = Some(attr.unescape_value().map_err(to_xml_err)?.into_owned())
                        }
                        _ => {}
                    }
                }

                if let Some(rel_type) = rel_type {
                    if rel_type.ends_with("/vbaProject") {
                        rels.has_vba_project = true;
                    }
                    if rel_type.contains("worksheet") {
                        if let (Some(id), Some(target)) = (id, target) {
                            rels.worksheet_targets.insert(id, target);
                        }
                    }
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(XmlParseError::Xml(e.to_string())),
            _ => {}
        }
        buf.clear();
    }

    Ok(rels)
}

pub(crate) fn resolve_sheet_target(
    entry: &SheetEntry,
    rels: &WorkbookRels,
    index: usize,
) -> String {
    if let Some(rel_id) = &entry.rel_id {
        if let Some(target) = rels.worksheet_targets.get(rel_id) {
            return normalize_target(target);
        }
    }

    let guessed = entry
        .sheet_id
        .map(|id| format!("xl/worksheets/sheet{id}.xml"))
        .unwrap_or_else(|| format!("xl/worksheets/sheet{}.xml", index + 1));
    normalize_target(&guessed)
}

fn normalize_target(target: &str) -> String {
    let trimmed = target.trim_start_matches('/');
    if trimmed.starts_with("xl/") {
        trimmed.to_string()
    } else {
        format!("xl/{trimmed}")
    }
}

pub(crate) fn parse_shared_strings(xml: &[u8]) -> Result<Vec<String>, XmlParseError> {
    let mut reader = Reader::from_reader(xml);
    reader.config_mut().trim_text(false);
    let mut buf = Vec::new();
    let mut strings = Vec::new();
    let mut current = String::new();
    let mut in_si = false;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) if e.name().as_ref() == b"si" => {
                current.clear();
                in_si = true;
            }
            Ok(Event::Start(e)) if e.name().as_ref() == b"t" && in_si => {
                let text = reader
                    .read_text(e.name())
                    .map_err(|e| XmlParseError::Xml(e.to_string()))?
                    .into_owned();
                current.push_str(&text);
            }
            Ok(Event::End(e)) if e.name().as_ref() == b"si" => {
                strings.push(current.clone());
                in_si = false;
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(XmlParseError::Xml(e.to_string())),
            _ => {}
        }
        buf.clear();
    }

    Ok(strings)
}

/// Parses one worksheet part into sheet storage plus its layout.
pub(crate) fn parse_sheet_xml(
    xml: &[u8],
    name: &str,
    shared_strings: &[String],
    styles: &StyleCatalog,
) -> Result<(SheetData, SheetLayoutData), XmlParseError> {
    let mut reader = Reader::from_reader(xml);
    reader.config_mut().trim_text(false);
    let mut buf = Vec::new();

    let mut rows: BTreeMap<u32, BTreeMap<u32, Cell>> = BTreeMap::new();
    let mut outline_levels: BTreeMap<u32, u8> = BTreeMap::new();
    let mut default_column_width = DEFAULT_COLUMN_WIDTH;
    let mut column_widths = Vec::new();
    let mut freeze_pane = None;
    let mut merged_regions = Vec::new();

    // Running positions for rows and cells without an explicit address.
    let mut current_row: u32 = 0;
    let mut next_row: u32 = 0;
    let mut next_col: u32 = 0;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) | Ok(Event::Empty(e))
                if e.name().as_ref() == b"sheetFormatPr" =>
            {
                if let Some(raw) = get_attr_value(&e, b"defaultColWidth")? {
                    if let Ok(chars) = raw.parse::<f64>() {
                        default_column_width = (chars * 256.0).round() as u32;
                    }
                }
            }
            Ok(Event::Start(e)) | Ok(Event::Empty(e)) if e.name().as_ref() == b"col" => {
                if let Some(range) = parse_col_element(&e)? {
                    column_widths.push(range);
                }
            }
            Ok(Event::Start(e)) | Ok(Event::Empty(e)) if e.name().as_ref() == b"pane" => {
                freeze_pane = Some(parse_pane_element(&e)?);
            }
            Ok(Event::Start(e)) | Ok(Event::Empty(e)) if e.name().as_ref() == b"mergeCell" => {
                if let Some(raw) = get_attr_value(&e, b"ref")? {
                    merged_regions.push(parse_merge_ref(&raw)?);
                }
            }
            Ok(Event::Start(e)) | Ok(Event::Empty(e)) if e.name().as_ref() == b"row" => {
                let row = match get_attr_value(&e, b"r")? {
                    Some(raw) => raw
                        .parse::<u32>()
                        .ok()
                        .and_then(|r| r.checked_sub(1))
                        .ok_or_else(|| XmlParseError::InvalidAddress(raw.clone()))?,
                    None => next_row,
                };
                current_row = row;
                next_row = row.saturating_add(1);
                next_col = 0;
                if let Some(raw) = get_attr_value(&e, b"outlineLevel")? {
                    if let Ok(level) = raw.parse::<u8>() {
                        if level > 0 {
                            outline_levels.insert(row, level);
                        }
                    }
                }
            }
            Ok(Event::Start(e)) if e.name().as_ref() == b"c" => {
                let parsed = parse_cell(&mut reader, &e, current_row, next_col, shared_strings)?;
                next_col = parsed.col.saturating_add(1);
                store_cell(&mut rows, styles, parsed);
            }
            Ok(Event::Empty(e)) if e.name().as_ref() == b"c" => {
                let parsed = parse_empty_cell(&e, current_row, next_col)?;
                next_col = parsed.col.saturating_add(1);
                store_cell(&mut rows, styles, parsed);
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(XmlParseError::Xml(e.to_string())),
            _ => {}
        }
        buf.clear();
    }

    let sheet = SheetData {
        name: name.to_string(),
        rows: rows
            .into_iter()
            .map(|(row, cells)| RowData {
                row,
                cells: cells.into_values().collect(),
            })
            .collect(),
    };
    let layout = SheetLayoutData {
        default_column_width,
        column_widths,
        freeze_pane,
        merged_regions,
        row_outline_levels: outline_levels.into_iter().collect(),
    };
    Ok((sheet, layout))
}

struct ParsedCell {
    row: u32,
    col: u32,
    style_index: Option<usize>,
    value: Option<CellValue>,
}

fn store_cell(rows: &mut BTreeMap<u32, BTreeMap<u32, Cell>>, styles: &StyleCatalog, parsed: ParsedCell) {
    // A cell with neither a value nor an explicit style carries nothing.
    let value = match (parsed.value, parsed.style_index) {
        (Some(value), _) => value,
        (None, Some(_)) => CellValue::Text(String::new()),
        (None, None) => return,
    };
    rows.entry(parsed.row).or_default().insert(
        parsed.col,
        Cell {
            col: parsed.col,
            value,
            style: styles.style_for(parsed.style_index),
        },
    );
}

fn parse_cell(
    reader: &mut Reader<&[u8]>,
    start: &BytesStart,
    current_row: u32,
    next_col: u32,
    shared_strings: &[String],
) -> Result<ParsedCell, XmlParseError> {
    let (row, col) = cell_position(start, current_row, next_col)?;
    let cell_type = get_attr_value(start, b"t")?;
    let style_index = parse_style_index(start)?;

    let mut value_text: Option<String> = None;
    let mut formula_text: Option<String> = None;
    let mut inline_text: Option<String> = None;
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) if e.name().as_ref() == b"v" => {
                let text = reader
                    .read_text(e.name())
                    .map_err(|e| XmlParseError::Xml(e.to_string()))?
                    .into_owned();
                value_text = Some(text);
            }
            Ok(Event::Start(e)) if e.name().as_ref() == b"f" => {
                let text = reader
                    .read_text(e.name())
                    .map_err(|e| XmlParseError::Xml(e.to_string()))?
                    .into_owned();
                let unescaped = quick_xml::escape::unescape(&text)
                    .map_err(|e| XmlParseError::Xml(e.to_string()))?
                    .into_owned();
                formula_text = Some(unescaped);
            }
            Ok(Event::Start(e)) if e.name().as_ref() == b"is" => {
                inline_text = Some(read_inline_string(reader)?);
            }
            Ok(Event::End(e)) if e.name().as_ref() == b"c" => break,
            Ok(Event::Eof) => {
                return Err(XmlParseError::Xml("unexpected EOF inside cell".into()));
            }
            Err(e) => return Err(XmlParseError::Xml(e.to_string())),
            _ => {}
        }
        buf.clear();
    }

    let base_value = match inline_text {
        Some(text) => Some(CellValue::Text(text)),
        None => convert_value(value_text.as_deref(), cell_type.as_deref(), shared_strings)?,
    };
    let value = match formula_text {
        Some(text) => Some(CellValue::Formula {
            text,
            value: Box::new(base_value.unwrap_or_else(|| CellValue::Text(String::new()))),
        }),
        None => base_value,
    };

    Ok(ParsedCell {
        row,
        col,
        style_index,
        value,
    })
}

fn parse_empty_cell(
    start: &BytesStart,
    current_row: u32,
    next_col: u32,
) -> Result<ParsedCell, XmlParseError> {
    let (row, col) = cell_position(start, current_row, next_col)?;
    Ok(ParsedCell {
        row,
        col,
        style_index: parse_style_index(start)?,
        value: None,
    })
}

fn cell_position(
    start: &BytesStart,
    current_row: u32,
    next_col: u32,
) -> Result<(u32, u32), XmlParseError> {
    match get_attr_value(start, b"r")? {
        Some(raw) => address_to_index(&raw).ok_or(XmlParseError::InvalidAddress(raw)),
        None => Ok((current_row, next_col)),
    }
}

fn parse_style_index(start: &BytesStart) -> Result<Option<usize>, XmlParseError> {
    Ok(get_attr_value(start, b"s")?.and_then(|raw| raw.parse::<usize>().ok()))
}

fn read_inline_string(reader: &mut Reader<&[u8]>) -> Result<String, XmlParseError> {
    let mut buf = Vec::new();
    let mut value = String::new();
    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) if e.name().as_ref() == b"t" => {
                let text = reader
                    .read_text(e.name())
                    .map_err(|e| XmlParseError::Xml(e.to_string()))?
                    .into_owned();
                value.push_str(&text);
            }
            Ok(Event::End(e)) if e.name().as_ref() == b"is" => break,
            Ok(Event::Eof) => {
                return Err(XmlParseError::Xml(
                    "unexpected EOF inside inline string".into(),
                ));
            }
            Err(e) => return Err(XmlParseError::Xml(e.to_string())),
            _ => {}
        }
        buf.clear();
    }
    Ok(value)
}

fn convert_value(
    value_text: Option<&str>,
    cell_type: Option<&str>,
    shared_strings: &[String],
) -> Result<Option<CellValue>, XmlParseError> {
    let raw = match value_text {
        Some(t) => t,
        None => return Ok(None),
    };

    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(Some(CellValue::Text(String::new())));
    }

    match cell_type {
        Some("s") => {
            let idx = trimmed
                .parse::<usize>()
                .map_err(|e| XmlParseError::Xml(e.to_string()))?;
            let text = shared_strings
                .get(idx)
                .ok_or(XmlParseError::SharedStringOutOfBounds(idx))?;
            Ok(Some(CellValue::Text(text.clone())))
        }
        Some("b") => Ok(match trimmed {
            "1" => Some(CellValue::Bool(true)),
            "0" => Some(CellValue::Bool(false)),
            _ => None,
        }),
        Some("e") => Ok(Some(CellValue::Error(trimmed.to_string()))),
        Some("str") | Some("inlineStr") => Ok(Some(CellValue::Text(raw.to_string()))),
        _ => {
            if let Ok(n) = trimmed.parse::<f64>() {
                Ok(Some(CellValue::Number(n)))
            } else {
                Ok(Some(CellValue::Text(trimmed.to_string())))
            }
        }
    }
}

fn parse_col_element(e: &BytesStart) -> Result<Option<ColumnWidthRange>, XmlParseError> {
    let min = get_attr_value(e, b"min")?.and_then(|v| v.parse::<u32>().ok());
    let max = get_attr_value(e, b"max")?.and_then(|v| v.parse::<u32>().ok());
    let width = get_attr_value(e, b"width")?.and_then(|v| v.parse::<f64>().ok());
    match (min, max, width) {
        (Some(min), Some(max), Some(width)) if min >= 1 && max >= min => {
            Ok(Some(ColumnWidthRange {
                first_col: min - 1,
                last_col: max - 1,
                width: (width * 256.0).round() as u32,
            }))
        }
        _ => Ok(None),
    }
}

fn parse_pane_element(e: &BytesStart) -> Result<FreezePane, XmlParseError> {
    let x_split = get_attr_value(e, b"xSplit")?
        .and_then(|v| v.parse::<f64>().ok())
        .map(|v| v.round() as u32)
        .unwrap_or(0);
    let y_split = get_attr_value(e, b"ySplit")?
        .and_then(|v| v.parse::<f64>().ok())
        .map(|v| v.round() as u32)
        .unwrap_or(0);
    let (top_row, left_col) = match get_attr_value(e, b"topLeftCell")? {
        Some(raw) => address_to_index(&raw).ok_or(XmlParseError::InvalidAddress(raw))?,
        None => (0, 0),
    };
    let corner = get_attr_value(e, b"activePane")?
        .and_then(|v| PaneCorner::from_attr(&v))
        .unwrap_or_default();
    Ok(FreezePane {
        corner,
        x_split,
        y_split,
        top_row,
        left_col,
    })
}

fn parse_merge_ref(raw: &str) -> Result<MergedRegion, XmlParseError> {
    let mut parts = raw.split(':');
    let start = parts.next().unwrap_or(raw);
    let end = parts.next().unwrap_or(start);
    let (first_row, first_col) =
        address_to_index(start).ok_or_else(|| XmlParseError::InvalidAddress(raw.to_string()))?;
    let (last_row, last_col) =
        address_to_index(end).ok_or_else(|| XmlParseError::InvalidAddress(raw.to_string()))?;
    Ok(MergedRegion {
        first_row: first_row.min(last_row),
        last_row: first_row.max(last_row),
        first_col: first_col.min(last_col),
        last_col: first_col.max(last_col),
    })
}

pub(super) fn get_attr_value(
    element: &BytesStart<'_>,
    key: &[u8],
) -> Result<Option<String>, XmlParseError> {
    for attr in element.attributes() {
        let attr = attr.map_err(|e| XmlParseError::Xml(e.to_string()))?;
        if attr.key.as_ref() == key {
            return Ok(Some(
                attr.unescape_value().map_err(to_xml_err)?.into_owned(),
            ));
        }
    }
    Ok(None)
}

pub(super) fn to_xml_err(err: quick_xml::Error) -> XmlParseError {
    XmlParseError::Xml(err.to_string())
}
