//! `styles.xml` parsing: number formats, fonts, fills, borders and the
//! `cellXfs` records that tie them together.
//!
//! The catalog resolves a cell's `s` attribute to a complete
//! [`StyleSnapshot`]. Only `cellXfs` entries become cell styles;
//! `cellStyleXfs` and `dxfs` carry look-alike records that must not be
//! indexed by cells.

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use rustc_hash::FxHashMap;

use super::sheet_parser::{get_attr_value, XmlParseError};
use super::{baseline_font, baseline_snapshot};
use crate::style::{
    BorderStyle, Color, FillPattern, FontDescriptor, HorizontalAlignment, StyleSnapshot,
    VerticalAlignment,
};

/// The resolved style tables of one workbook.
pub(crate) struct StyleCatalog {
    pub(crate) fonts: Vec<FontDescriptor>,
    pub(crate) cell_styles: Vec<StyleSnapshot>,
}

impl Default for StyleCatalog {
    fn default() -> Self {
        StyleCatalog {
            fonts: vec![baseline_font()],
            cell_styles: vec![baseline_snapshot()],
        }
    }
}

impl StyleCatalog {
    /// Resolves a cell's style index; a missing `s` attribute means
    /// record zero.
    pub(crate) fn style_for(&self, index: Option<usize>) -> StyleSnapshot {
        let index = index.unwrap_or(0);
        self.cell_styles
            .get(index)
            .cloned()
            .unwrap_or_else(baseline_snapshot)
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Section {
    None,
    NumFmts,
    Fonts,
    Fills,
    Borders,
    CellXfs,
    /// `cellStyleXfs` and `dxfs` nest the same element names and are
    /// skipped wholesale.
    Skipped,
}

#[derive(Default, Clone)]
struct FillSpec {
    pattern: FillPattern,
    foreground: Color,
    background: Color,
}

#[derive(Default, Clone)]
struct EdgeSpec {
    style: BorderStyle,
    color: Color,
}

#[derive(Default, Clone)]
struct BorderSpec {
    left: EdgeSpec,
    right: EdgeSpec,
    top: EdgeSpec,
    bottom: EdgeSpec,
}

#[derive(Clone, Copy)]
enum BorderEdge {
    Left,
    Right,
    Top,
    Bottom,
}

struct XfRecord {
    num_fmt_id: u32,
    font_id: usize,
    fill_id: usize,
    border_id: usize,
    horizontal: HorizontalAlignment,
    vertical: VerticalAlignment,
    wrap_text: bool,
    rotation: u16,
    indention: u16,
    locked: bool,
    hidden: bool,
}

impl Default for XfRecord {
    fn default() -> Self {
        XfRecord {
            num_fmt_id: 0,
            font_id: 0,
            fill_id: 0,
            border_id: 0,
            horizontal: HorizontalAlignment::default(),
            vertical: VerticalAlignment::default(),
            wrap_text: false,
            rotation: 0,
            indention: 0,
            // Cells are locked unless protection says otherwise.
            locked: true,
            hidden: false,
        }
    }
}

pub(crate) fn parse_styles_xml(xml: &[u8]) -> Result<StyleCatalog, XmlParseError> {
    let mut reader = Reader::from_reader(xml);
    reader.config_mut().trim_text(true);
    let mut buf = Vec::new();

    let mut custom_formats: FxHashMap<u32, String> = FxHashMap::default();
    let mut fonts: Vec<FontDescriptor> = Vec::new();
    let mut fills: Vec<FillSpec> = Vec::new();
    let mut borders: Vec<BorderSpec> = Vec::new();
    let mut xfs: Vec<XfRecord> = Vec::new();
    let mut section = Section::None;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => match e.name().as_ref() {
                b"numFmts" => section = Section::NumFmts,
                b"fonts" => section = Section::Fonts,
                b"fills" => section = Section::Fills,
                b"borders" => section = Section::Borders,
                b"cellXfs" => section = Section::CellXfs,
                b"cellStyleXfs" | b"dxfs" => section = Section::Skipped,
                b"numFmt" if section == Section::NumFmts => collect_num_fmt(&e, &mut custom_formats)?,
                b"font" if section == Section::Fonts => fonts.push(parse_font(&mut reader)?),
                b"fill" if section == Section::Fills => fills.push(parse_fill(&mut reader)?),
                b"border" if section == Section::Borders => {
                    borders.push(parse_border(&mut reader)?)
                }
                b"xf" if section == Section::CellXfs => {
                    let mut xf = xf_from_attrs(&e)?;
                    read_xf_children(&mut reader, &mut xf)?;
                    xfs.push(xf);
                }
                _ => {}
            },
            Ok(Event::Empty(e)) => match e.name().as_ref() {
                b"numFmt" if section == Section::NumFmts => collect_num_fmt(&e, &mut custom_formats)?,
                b"font" if section == Section::Fonts => fonts.push(baseline_font()),
                b"fill" if section == Section::Fills => fills.push(FillSpec::default()),
                b"border" if section == Section::Borders => borders.push(BorderSpec::default()),
                b"xf" if section == Section::CellXfs => xfs.push(xf_from_attrs(&e)?),
                _ => {}
            },
            Ok(Event::End(e)) => match e.name().as_ref() {
                b"numFmts" | b"fonts" | b"fills" | b"borders" | b"cellXfs" | b"cellStyleXfs"
                | b"dxfs" => section = Section::None,
                _ => {}
            },
            Ok(Event::Eof) => break,
            Err(e) => return Err(XmlParseError::Xml(e.to_string())),
            _ => {}
        }
        buf.clear();
    }

    if fonts.is_empty() {
        fonts.push(baseline_font());
    }
    let cell_styles = if xfs.is_empty() {
        vec![baseline_snapshot()]
    } else {
        xfs.into_iter()
            .map(|xf| assemble_snapshot(xf, &fills, &borders, &custom_formats))
            .collect()
    };

    Ok(StyleCatalog { fonts, cell_styles })
}

fn assemble_snapshot(
    xf: XfRecord,
    fills: &[FillSpec],
    borders: &[BorderSpec],
    custom_formats: &FxHashMap<u32, String>,
) -> StyleSnapshot {
    let fill = fills.get(xf.fill_id).cloned().unwrap_or_default();
    let border = borders.get(xf.border_id).cloned().unwrap_or_default();
    let foreground_index = fill.foreground.indexed_or_zero();
    let background_index = fill.background.indexed_or_zero();

    StyleSnapshot {
        locked: xf.locked,
        horizontal_alignment: xf.horizontal,
        border_bottom: border.bottom.style,
        border_left: border.left.style,
        border_right: border.right.style,
        border_top: border.top.style,
        wrap_text: xf.wrap_text,
        vertical_alignment: xf.vertical,
        top_border_color: border.top.color,
        rotation: xf.rotation,
        right_border_color: border.right.color,
        left_border_color: border.left.color,
        indention: xf.indention,
        hidden: xf.hidden,
        fill_pattern: fill.pattern,
        fill_foreground_color: fill.foreground,
        fill_foreground_color_index: foreground_index,
        data_format: format_code(xf.num_fmt_id, custom_formats),
        bottom_border_color: border.bottom.color,
        fill_background_color_index: background_index,
        fill_background_color: fill.background,
        font_index: xf.font_id as u32,
    }
}

fn collect_num_fmt(
    e: &BytesStart,
    custom_formats: &mut FxHashMap<u32, String>,
) -> Result<(), XmlParseError> {
    let id = get_attr_value(e, b"numFmtId")?.and_then(|v| v.parse::<u32>().ok());
    let code = get_attr_value(e, b"formatCode")?;
    if let (Some(id), Some(code)) = (id, code) {
        custom_formats.insert(id, code);
    }
    Ok(())
}

fn xf_from_attrs(e: &BytesStart) -> Result<XfRecord, XmlParseError> {
    let mut xf = XfRecord::default();
    if let Some(v) = get_attr_value(e, b"numFmtId")? {
        if let Ok(id) = v.parse::<u32>() {
            xf.num_fmt_id = id;
        }
    }
    if let Some(v) = get_attr_value(e, b"fontId")? {
        if let Ok(id) = v.parse::<usize>() {
            xf.font_id = id;
        }
    }
    if let Some(v) = get_attr_value(e, b"fillId")? {
        if let Ok(id) = v.parse::<usize>() {
            xf.fill_id = id;
        }
    }
    if let Some(v) = get_attr_value(e, b"borderId")? {
        if let Ok(id) = v.parse::<usize>() {
            xf.border_id = id;
        }
    }
    Ok(xf)
}

fn read_xf_children(reader: &mut Reader<&[u8]>, xf: &mut XfRecord) -> Result<(), XmlParseError> {
    let mut buf = Vec::new();
    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) | Ok(Event::Empty(e)) if e.name().as_ref() == b"alignment" => {
                if let Some(v) = get_attr_value(&e, b"horizontal")? {
                    if let Some(h) = HorizontalAlignment::from_attr(&v) {
                        xf.horizontal = h;
                    }
                }
                if let Some(v) = get_attr_value(&e, b"vertical")? {
                    if let Some(vert) = VerticalAlignment::from_attr(&v) {
                        xf.vertical = vert;
                    }
                }
                if let Some(v) = get_attr_value(&e, b"wrapText")? {
                    xf.wrap_text = bool_attr(&v);
                }
                if let Some(v) = get_attr_value(&e, b"textRotation")? {
                    if let Ok(rotation) = v.parse::<u16>() {
                        xf.rotation = rotation;
                    }
                }
                if let Some(v) = get_attr_value(&e, b"indent")? {
                    if let Ok(indent) = v.parse::<u16>() {
                        xf.indention = indent;
                    }
                }
            }
            Ok(Event::Start(e)) | Ok(Event::Empty(e)) if e.name().as_ref() == b"protection" => {
                if let Some(v) = get_attr_value(&e, b"locked")? {
                    xf.locked = bool_attr(&v);
                }
                if let Some(v) = get_attr_value(&e, b"hidden")? {
                    xf.hidden = bool_attr(&v);
                }
            }
            Ok(Event::End(e)) if e.name().as_ref() == b"xf" => break,
            Ok(Event::Eof) => {
                return Err(XmlParseError::Xml("unexpected EOF inside xf".into()));
            }
            Err(e) => return Err(XmlParseError::Xml(e.to_string())),
            _ => {}
        }
        buf.clear();
    }
    Ok(())
}

fn parse_font(reader: &mut Reader<&[u8]>) -> Result<FontDescriptor, XmlParseError> {
    let mut font = baseline_font();
    let mut buf = Vec::new();
    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) | Ok(Event::Empty(e)) => match e.name().as_ref() {
                b"b" => {
                    let enabled = match get_attr_value(&e, b"val")? {
                        Some(v) => bool_attr(&v),
                        None => true,
                    };
                    font.bold_weight = if enabled { 700 } else { 400 };
                }
                b"sz" => {
                    if let Some(v) = get_attr_value(&e, b"val")? {
                        if let Ok(points) = v.parse::<f64>() {
                            font.height = (points * 20.0).round() as u16;
                        }
                    }
                }
                b"color" => {
                    if let Some(color) = parse_color(&e)? {
                        font.color = color;
                    }
                }
                b"name" => {
                    if let Some(v) = get_attr_value(&e, b"val")? {
                        font.name = v;
                    }
                }
                _ => {}
            },
            Ok(Event::End(e)) if e.name().as_ref() == b"font" => break,
            Ok(Event::Eof) => {
                return Err(XmlParseError::Xml("unexpected EOF inside font".into()));
            }
            Err(e) => return Err(XmlParseError::Xml(e.to_string())),
            _ => {}
        }
        buf.clear();
    }
    Ok(font)
}

fn parse_fill(reader: &mut Reader<&[u8]>) -> Result<FillSpec, XmlParseError> {
    let mut fill = FillSpec::default();
    let mut buf = Vec::new();
    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) | Ok(Event::Empty(e)) => match e.name().as_ref() {
                b"patternFill" => {
                    if let Some(v) = get_attr_value(&e, b"patternType")? {
                        if let Some(pattern) = FillPattern::from_attr(&v) {
                            fill.pattern = pattern;
                        }
                    }
                }
                b"fgColor" => {
                    if let Some(color) = parse_color(&e)? {
                        fill.foreground = color;
                    }
                }
                b"bgColor" => {
                    if let Some(color) = parse_color(&e)? {
                        fill.background = color;
                    }
                }
                _ => {}
            },
            Ok(Event::End(e)) if e.name().as_ref() == b"fill" => break,
            Ok(Event::Eof) => {
                return Err(XmlParseError::Xml("unexpected EOF inside fill".into()));
            }
            Err(e) => return Err(XmlParseError::Xml(e.to_string())),
            _ => {}
        }
        buf.clear();
    }
    Ok(fill)
}

fn parse_border(reader: &mut Reader<&[u8]>) -> Result<BorderSpec, XmlParseError> {
    let mut border = BorderSpec::default();
    let mut current: Option<BorderEdge> = None;
    let mut buf = Vec::new();
    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) | Ok(Event::Empty(e)) => {
                if let Some(edge) = edge_for(e.name().as_ref()) {
                    if let Some(v) = get_attr_value(&e, b"style")? {
                        if let Some(style) = BorderStyle::from_attr(&v) {
                            edge_slot(&mut border, edge).style = style;
                        }
                    }
                    current = Some(edge);
                } else if e.name().as_ref() == b"color" {
                    if let Some(edge) = current {
                        if let Some(color) = parse_color(&e)? {
                            edge_slot(&mut border, edge).color = color;
                        }
                    }
                }
            }
            Ok(Event::End(e)) => {
                if edge_for(e.name().as_ref()).is_some() {
                    current = None;
                } else if e.name().as_ref() == b"border" {
                    break;
                }
            }
            Ok(Event::Eof) => {
                return Err(XmlParseError::Xml("unexpected EOF inside border".into()));
            }
            Err(e) => return Err(XmlParseError::Xml(e.to_string())),
            _ => {}
        }
        buf.clear();
    }
    Ok(border)
}

fn edge_for(name: &[u8]) -> Option<BorderEdge> {
    match name {
        b"left" => Some(BorderEdge::Left),
        b"right" => Some(BorderEdge::Right),
        b"top" => Some(BorderEdge::Top),
        b"bottom" => Some(BorderEdge::Bottom),
        _ => None,
    }
}

fn edge_slot(border: &mut BorderSpec, edge: BorderEdge) -> &mut EdgeSpec {
    match edge {
        BorderEdge::Left => &mut border.left,
        BorderEdge::Right => &mut border.right,
        BorderEdge::Top => &mut border.top,
        BorderEdge::Bottom => &mut border.bottom,
    }
}

fn parse_color(e: &BytesStart) -> Result<Option<Color>, XmlParseError> {
    let mut rgb = None;
    let mut indexed = None;
    let mut theme = None;
    let mut tint = None;
    let mut auto = false;
    for attr in e.attributes() {
        let attr = attr.map_err(|e| XmlParseError::Xml(e.to_string()))?;
        let value = attr
            .unescape_value()
            .map_err(|e| XmlParseError::Xml(e.to_string()))?
            .into_owned();
        match attr.key.as_ref() {
            b"rgb" => rgb = Some(value),
            b"indexed" => indexed = value.parse::<u16>().ok(),
            b"theme" => theme = value.parse::<u32>().ok(),
            b"tint" => tint = Some(value),
            b"auto" => auto = bool_attr(&value),
            _ => {}
        }
    }
    if let Some(rgb) = rgb {
        return Ok(Some(Color::Argb(rgb)));
    }
    if let Some(indexed) = indexed {
        return Ok(Some(Color::Indexed(indexed)));
    }
    if let Some(theme) = theme {
        return Ok(Some(Color::Theme { theme, tint }));
    }
    if auto {
        return Ok(Some(Color::Auto));
    }
    Ok(None)
}

fn bool_attr(value: &str) -> bool {
    value == "1" || value == "true"
}

fn format_code(id: u32, custom_formats: &FxHashMap<u32, String>) -> String {
    if let Some(code) = custom_formats.get(&id) {
        return code.clone();
    }
    match builtin_format(id) {
        Some(code) => code.to_string(),
        None => format!("#{id}"),
    }
}

/// The stock formats files reference by id without declaring them.
fn builtin_format(id: u32) -> Option<&'static str> {
    Some(match id {
        0 => "General",
        1 => "0",
        2 => "0.00",
        3 => "#,##0",
        4 => "#,##0.00",
        5 => r##""$"#,##0_);("$"#,##0)"##,
        6 => r##""$"#,##0_);[Red]("$"#,##0)"##,
        7 => r##""$"#,##0.00_);("$"#,##0.00)"##,
        8 => r##""$"#,##0.00_);[Red]("$"#,##0.00)"##,
        9 => "0%",
        10 => "0.00%",
        11 => "0.00E+00",
        12 => "# ?/?",
        13 => "# ??/??",
        14 => "m/d/yy",
        15 => "d-mmm-yy",
        16 => "d-mmm",
        17 => "mmm-yy",
        18 => "h:mm AM/PM",
        19 => "h:mm:ss AM/PM",
        20 => "h:mm",
        21 => "h:mm:ss",
        22 => "m/d/yy h:mm",
        37 => "#,##0_);(#,##0)",
        38 => "#,##0_);[Red](#,##0)",
        39 => "#,##0.00_);(#,##0.00)",
        40 => "#,##0.00_);[Red](#,##0.00)",
        41 => r##"_(* #,##0_);_(* \(#,##0\);_(* "-"_);_(@_)"##,
        42 => r##"_("$"* #,##0_);_("$"* \(#,##0\);_("$"* "-"_);_(@_)"##,
        43 => r##"_(* #,##0.00_);_(* \(#,##0.00\);_(* "-"??_);_(@_)"##,
        44 => r##"_("$"* #,##0.00_);_("$"* \(#,##0.00\);_("$"* "-"??_);_(@_)"##,
        45 => "mm:ss",
        46 => "[h]:mm:ss",
        47 => "mm:ss.0",
        48 => "##0.0E+0",
        49 => "@",
        _ => return None,
    })
}
