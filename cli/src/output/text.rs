use crate::commands::diff::Verbosity;
use anyhow::Result;
use sheetcmp::{CellValue, DiffEvent, DiffReport};
use std::collections::BTreeMap;
use std::io::Write;

pub fn write_text_report<W: Write>(
    w: &mut W,
    report: &DiffReport,
    verbosity: Verbosity,
) -> Result<()> {
    if verbosity == Verbosity::Normal {
        if report.events.is_empty() {
            writeln!(w, "No differences found.")?;
        } else {
            let (sheet_events, workbook_events) = partition_events(report);

            for (sheet_name, events) in &sheet_events {
                writeln!(w, "Sheet \"{}\":", sheet_name)?;
                for event in events {
                    writeln!(w, "  {}", render_event(event))?;
                }
                writeln!(w)?;
            }

            if !workbook_events.is_empty() {
                writeln!(w, "Workbook:")?;
                for event in &workbook_events {
                    writeln!(w, "  {}", render_event(event))?;
                }
                writeln!(w)?;
            }
        }
    }

    write_summary(w, report)
}

fn partition_events(report: &DiffReport) -> (BTreeMap<&str, Vec<&DiffEvent>>, Vec<&DiffEvent>) {
    let mut sheet_events: BTreeMap<&str, Vec<&DiffEvent>> = BTreeMap::new();
    let mut workbook_events: Vec<&DiffEvent> = Vec::new();

    for event in &report.events {
        match event.sheet_name() {
            Some(name) => sheet_events.entry(name).or_default().push(event),
            None => workbook_events.push(event),
        }
    }

    (sheet_events, workbook_events)
}

fn render_event(event: &DiffEvent) -> String {
    match event {
        DiffEvent::DiffCell {
            location_a,
            value_a,
            value_b,
            ..
        } => {
            format!(
                "Cell {}: {} → {}",
                location_a.addr,
                format_value(value_a),
                format_value(value_b)
            )
        }
        DiffEvent::ExtraCell {
            side,
            location,
            value,
        } => {
            format!(
                "Cell {}: present only in {}: {}",
                location.addr,
                side,
                format_value(value)
            )
        }
        DiffEvent::StyleDiff {
            location_a,
            description,
            ..
        } => {
            format!("Cell {}: {}", location_a.addr, description)
        }
        DiffEvent::SimpleDiff { description, .. } => description.clone(),
        DiffEvent::MacroOnlyIn { side } => {
            format!("Macros present only in {}", side)
        }
        _ => format!("{:?}", event),
    }
}

fn format_value(value: &CellValue) -> String {
    match value.evaluated() {
        CellValue::Number(n) => format_number(*n),
        CellValue::Text(s) => format!("\"{}\"", escape_string(s)),
        CellValue::Bool(true) => "TRUE".to_string(),
        CellValue::Bool(false) => "FALSE".to_string(),
        CellValue::Error(e) => e.clone(),
        CellValue::Formula { .. } => unreachable!("evaluated() never returns Formula"),
    }
}

fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{:.0}", n)
    } else {
        let s = format!("{:.10}", n);
        s.trim_end_matches('0').trim_end_matches('.').to_string()
    }
}

fn escape_string(s: &str) -> String {
    s.replace('\\', "\\\\")
        .replace('\n', "\\n")
        .replace('\r', "\\r")
        .replace('\t', "\\t")
        .replace('"', "\\\"")
}

fn write_summary<W: Write>(w: &mut W, report: &DiffReport) -> Result<()> {
    writeln!(w, "---")?;
    writeln!(w, "Summary:")?;
    writeln!(w, "  Sources: {} vs {}", report.source_a, report.source_b)?;
    writeln!(w, "  Total findings: {}", report.events.len())?;

    let counts = count_events(report);
    if counts.cells > 0 {
        writeln!(w, "  Cell value differences: {}", counts.cells)?;
    }
    if counts.extra > 0 {
        writeln!(w, "  One-sided cells: {}", counts.extra)?;
    }
    if counts.styles > 0 {
        writeln!(w, "  Style differences: {}", counts.styles)?;
    }
    if counts.features > 0 {
        writeln!(w, "  Sheet feature differences: {}", counts.features)?;
    }
    if counts.macros > 0 {
        writeln!(w, "  Macro differences: {}", counts.macros)?;
    }

    let verdict = if report.differs {
        "files differ"
    } else {
        "no differences"
    };
    writeln!(w, "  Verdict: {}", verdict)?;

    Ok(())
}

struct EventCounts {
    cells: usize,
    extra: usize,
    styles: usize,
    features: usize,
    macros: usize,
}

fn count_events(report: &DiffReport) -> EventCounts {
    let mut counts = EventCounts {
        cells: 0,
        extra: 0,
        styles: 0,
        features: 0,
        macros: 0,
    };

    for event in &report.events {
        match event {
            DiffEvent::DiffCell { .. } => counts.cells += 1,
            DiffEvent::ExtraCell { .. } => counts.extra += 1,
            DiffEvent::StyleDiff { .. } => counts.styles += 1,
            DiffEvent::SimpleDiff { .. } => counts.features += 1,
            DiffEvent::MacroOnlyIn { .. } => counts.macros += 1,
            _ => {}
        }
    }

    counts
}
