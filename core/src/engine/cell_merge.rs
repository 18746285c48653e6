//! The merge walk: one synchronized pass over both ordered cell streams.
//!
//! Each iteration consumes at least one head, so the walk takes at most
//! |A| + |B| iterations. Matched addresses are compared by value first;
//! only value-equal pairs go through the style and font comparison.

use std::cmp::Ordering;

use super::context::EmitContext;
use super::style_compare::{self, FontFinding};
use crate::diff::{CellLocation, DiffError, DiffEvent, Side};
use crate::ignore::WorkbookIgnores;
use crate::sink::DiffSink;
use crate::stream::{CellStream, StreamCell};
use crate::view::SpreadsheetView;

pub(super) fn run_cell_pass<S: DiffSink + ?Sized>(
    view_a: &dyn SpreadsheetView,
    view_b: &dyn SpreadsheetView,
    ignores_a: &WorkbookIgnores,
    ignores_b: &WorkbookIgnores,
    all_style_mismatches: bool,
    ctx: &mut EmitContext<'_, S>,
) -> Result<(), DiffError> {
    let mut stream_a = CellStream::new(view_a, ignores_a);
    let mut stream_b = CellStream::new(view_b, ignores_b);
    let mut head_a = stream_a.next_cell()?;
    let mut head_b = stream_b.next_cell()?;

    loop {
        match (head_a, head_b) {
            (None, None) => break,
            (Some(cell_a), None) => {
                ctx.finding(extra(Side::First, &cell_a))?;
                head_a = stream_a.next_cell()?;
            }
            (None, Some(cell_b)) => {
                ctx.finding(extra(Side::Second, &cell_b))?;
                head_b = stream_b.next_cell()?;
            }
            (Some(cell_a), Some(cell_b)) => match cell_a.addr.cmp(&cell_b.addr) {
                Ordering::Less => {
                    ctx.finding(extra(Side::First, &cell_a))?;
                    head_a = stream_a.next_cell()?;
                }
                Ordering::Greater => {
                    ctx.finding(extra(Side::Second, &cell_b))?;
                    head_b = stream_b.next_cell()?;
                }
                Ordering::Equal => {
                    if cell_a.value != cell_b.value {
                        ctx.finding(DiffEvent::diff_cell(
                            location(&cell_a),
                            location(&cell_b),
                            cell_a.value.clone(),
                            cell_b.value.clone(),
                        ))?;
                    } else {
                        emit_format_findings(
                            view_a,
                            view_b,
                            &cell_a,
                            &cell_b,
                            all_style_mismatches,
                            ctx,
                        )?;
                    }
                    head_a = stream_a.next_cell()?;
                    head_b = stream_b.next_cell()?;
                }
            },
        }
    }

    // Both streams must be exhausted once both heads are empty.
    if stream_a.next_cell()?.is_some() || stream_b.next_cell()?.is_some() {
        return Err(DiffError::Consistency {
            message: "cell streams yielded data after the merge walk completed".into(),
        });
    }
    Ok(())
}

fn location(cell: &StreamCell<'_>) -> CellLocation {
    CellLocation::new(cell.sheet_name, cell.addr)
}

fn extra(side: Side, cell: &StreamCell<'_>) -> DiffEvent {
    DiffEvent::extra_cell(side, location(cell), cell.value.clone())
}

/// Style phase, then the font phase if the styles are clean and the pair
/// is not two blank cells.
fn emit_format_findings<S: DiffSink + ?Sized>(
    view_a: &dyn SpreadsheetView,
    view_b: &dyn SpreadsheetView,
    cell_a: &StreamCell<'_>,
    cell_b: &StreamCell<'_>,
    all_style_mismatches: bool,
    ctx: &mut EmitContext<'_, S>,
) -> Result<(), DiffError> {
    let mismatches =
        style_compare::compare_styles(cell_a.style, cell_b.style, all_style_mismatches);
    if !mismatches.is_empty() {
        for m in mismatches {
            ctx.finding(DiffEvent::style_diff(
                location(cell_a),
                location(cell_b),
                format!(
                    "style differs on {}: {} vs {}",
                    m.attribute, m.value_a, m.value_b
                ),
            ))?;
        }
        return Ok(());
    }

    if cell_a.value.is_blank() && cell_b.value.is_blank() {
        return Ok(());
    }
    match style_compare::compare_fonts(view_a, view_b, cell_a.style, cell_b.style) {
        None => {}
        Some(FontFinding::Unavailable { side, index }) => {
            ctx.finding(DiffEvent::style_diff(
                location(cell_a),
                location(cell_b),
                format!("font unavailable on {side}: font index {index} does not resolve"),
            ))?;
        }
        Some(FontFinding::Mismatch(m)) => {
            ctx.finding(DiffEvent::style_diff(
                location(cell_a),
                location(cell_b),
                format!(
                    "font differs on {}: {} vs {} (cell: {})",
                    m.attribute, m.value_a, m.value_b, cell_a.value
                ),
            ))?;
        }
    }
    Ok(())
}
