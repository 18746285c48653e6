//! Sheet feature comparison: column widths, freeze panes, merged
//! regions, row outline levels, and sheet names.
//!
//! Runs only when both views expose the layout capability, over the
//! sheets both sides have (paired by index). The checks are isolated
//! from each other and from the ignore rules: a finding in one never
//! suppresses another, and ignored cells still get their columns
//! checked.

use super::context::EmitContext;
use crate::addressing::column_label;
use crate::diff::{DiffError, DiffEvent, SheetRef, Side};
use crate::sink::DiffSink;
use crate::view::{SheetLayout, SheetView, SpreadsheetView};

pub(super) fn run_feature_pass<S: DiffSink + ?Sized>(
    view_a: &dyn SpreadsheetView,
    view_b: &dyn SpreadsheetView,
    ctx: &mut EmitContext<'_, S>,
) -> Result<(), DiffError> {
    let (layout_a, layout_b) = match (view_a.layout(), view_b.layout()) {
        (Some(a), Some(b)) => (a, b),
        _ => return Ok(()),
    };

    let common = view_a.sheet_count().min(view_b.sheet_count());
    for index in 0..common {
        let (Some(sheet_a), Some(sheet_b)) = (view_a.sheet(index), view_b.sheet(index)) else {
            return Err(DiffError::Consistency {
                message: format!("sheet {index} missing from a view that reports it"),
            });
        };
        let (Some(lay_a), Some(lay_b)) =
            (layout_a.sheet_layout(index), layout_b.sheet_layout(index))
        else {
            return Err(DiffError::Consistency {
                message: format!("sheet {index} has no layout in a view with the capability"),
            });
        };
        let ref_a = SheetRef::new(index, sheet_a.name());
        let ref_b = SheetRef::new(index, sheet_b.name());

        compare_column_widths(sheet_a, lay_a, lay_b, &ref_a, &ref_b, ctx)?;
        compare_freeze_panes(lay_a, lay_b, &ref_a, &ref_b, ctx)?;
        compare_merged_regions(lay_a, lay_b, &ref_a, &ref_b, ctx)?;
        compare_outline_levels(lay_a, lay_b, &ref_a, &ref_b, ctx)?;

        if sheet_a.name() != sheet_b.name() {
            ctx.finding(DiffEvent::simple_diff(
                format!(
                    "sheet name differs: '{}' vs '{}'",
                    sheet_a.name(),
                    sheet_b.name()
                ),
                ref_a.clone(),
                ref_b.clone(),
            ))?;
        }
    }
    Ok(())
}

/// Widths are checked for every column up to the last stored cell column
/// of side A. A sheet with no stored cells gets no width checks.
fn compare_column_widths<S: DiffSink + ?Sized>(
    sheet_a: &dyn SheetView,
    lay_a: &dyn SheetLayout,
    lay_b: &dyn SheetLayout,
    ref_a: &SheetRef,
    ref_b: &SheetRef,
    ctx: &mut EmitContext<'_, S>,
) -> Result<(), DiffError> {
    let mut max_used: Option<u32> = None;
    for pos in 0..sheet_a.row_count() {
        let last = sheet_a.row(pos).and_then(|r| r.cells.last().map(|c| c.col));
        if let Some(col) = last {
            max_used = Some(max_used.map_or(col, |m| m.max(col)));
        }
    }
    let Some(max_col) = max_used else {
        return Ok(());
    };

    for col in 0..=max_col {
        let width_a = lay_a.column_width(col);
        let width_b = lay_b.column_width(col);
        if width_a != width_b {
            ctx.finding(DiffEvent::simple_diff(
                format!(
                    "column width differs for column {}: {} vs {}",
                    column_label(col),
                    width_a,
                    width_b
                ),
                ref_a.clone(),
                ref_b.clone(),
            ))?;
        }
    }
    Ok(())
}

fn compare_freeze_panes<S: DiffSink + ?Sized>(
    lay_a: &dyn SheetLayout,
    lay_b: &dyn SheetLayout,
    ref_a: &SheetRef,
    ref_b: &SheetRef,
    ctx: &mut EmitContext<'_, S>,
) -> Result<(), DiffError> {
    let (pane_a, pane_b) = match (lay_a.freeze_pane(), lay_b.freeze_pane()) {
        (None, None) => return Ok(()),
        (Some(_), None) => {
            return ctx.finding(DiffEvent::simple_diff(
                format!("freeze pane present only in {}", Side::First),
                ref_a.clone(),
                ref_b.clone(),
            ));
        }
        (None, Some(_)) => {
            return ctx.finding(DiffEvent::simple_diff(
                format!("freeze pane present only in {}", Side::Second),
                ref_a.clone(),
                ref_b.clone(),
            ));
        }
        (Some(a), Some(b)) => (a, b),
    };

    if pane_a.corner != pane_b.corner {
        ctx.finding(DiffEvent::simple_diff(
            format!(
                "freeze pane active corner differs: {} vs {}",
                pane_a.corner, pane_b.corner
            ),
            ref_a.clone(),
            ref_b.clone(),
        ))?;
    }
    if pane_a.x_split != pane_b.x_split {
        ctx.finding(DiffEvent::simple_diff(
            format!(
                "freeze pane x split differs: {} vs {}",
                pane_a.x_split, pane_b.x_split
            ),
            ref_a.clone(),
            ref_b.clone(),
        ))?;
    }
    if pane_a.y_split != pane_b.y_split {
        ctx.finding(DiffEvent::simple_diff(
            format!(
                "freeze pane y split differs: {} vs {}",
                pane_a.y_split, pane_b.y_split
            ),
            ref_a.clone(),
            ref_b.clone(),
        ))?;
    }
    if pane_a.top_row != pane_b.top_row {
        ctx.finding(DiffEvent::simple_diff(
            format!(
                "freeze pane top visible row differs: {} vs {}",
                pane_a.top_row + 1,
                pane_b.top_row + 1
            ),
            ref_a.clone(),
            ref_b.clone(),
        ))?;
    }
    if pane_a.left_col != pane_b.left_col {
        ctx.finding(DiffEvent::simple_diff(
            format!(
                "freeze pane left visible column differs: {} vs {}",
                column_label(pane_a.left_col),
                column_label(pane_b.left_col)
            ),
            ref_a.clone(),
            ref_b.clone(),
        ))?;
    }
    Ok(())
}

/// A count difference short-circuits the pairwise comparison; positions
/// would not line up.
fn compare_merged_regions<S: DiffSink + ?Sized>(
    lay_a: &dyn SheetLayout,
    lay_b: &dyn SheetLayout,
    ref_a: &SheetRef,
    ref_b: &SheetRef,
    ctx: &mut EmitContext<'_, S>,
) -> Result<(), DiffError> {
    let regions_a = lay_a.merged_regions();
    let regions_b = lay_b.merged_regions();
    if regions_a.len() != regions_b.len() {
        return ctx.finding(DiffEvent::simple_diff(
            format!(
                "merged region count differs: {} vs {}",
                regions_a.len(),
                regions_b.len()
            ),
            ref_a.clone(),
            ref_b.clone(),
        ));
    }

    for (pos, (region_a, region_b)) in regions_a.iter().zip(regions_b).enumerate() {
        if region_a.first_row != region_b.first_row {
            ctx.finding(DiffEvent::simple_diff(
                format!(
                    "merged region {} first row differs: {} vs {}",
                    pos,
                    region_a.first_row + 1,
                    region_b.first_row + 1
                ),
                ref_a.clone(),
                ref_b.clone(),
            ))?;
        }
        if region_a.last_row != region_b.last_row {
            ctx.finding(DiffEvent::simple_diff(
                format!(
                    "merged region {} last row differs: {} vs {}",
                    pos,
                    region_a.last_row + 1,
                    region_b.last_row + 1
                ),
                ref_a.clone(),
                ref_b.clone(),
            ))?;
        }
        if region_a.first_col != region_b.first_col {
            ctx.finding(DiffEvent::simple_diff(
                format!(
                    "merged region {} first column differs: {} vs {}",
                    pos,
                    column_label(region_a.first_col),
                    column_label(region_b.first_col)
                ),
                ref_a.clone(),
                ref_b.clone(),
            ))?;
        }
        if region_a.last_col != region_b.last_col {
            ctx.finding(DiffEvent::simple_diff(
                format!(
                    "merged region {} last column differs: {} vs {}",
                    pos,
                    column_label(region_a.last_col),
                    column_label(region_b.last_col)
                ),
                ref_a.clone(),
                ref_b.clone(),
            ))?;
        }
        if region_a.cell_count() != region_b.cell_count() {
            ctx.finding(DiffEvent::simple_diff(
                format!(
                    "merged region {} cell count differs: {} vs {}",
                    pos,
                    region_a.cell_count(),
                    region_b.cell_count()
                ),
                ref_a.clone(),
                ref_b.clone(),
            ))?;
        }
        if region_a.is_full_row_range() != region_b.is_full_row_range() {
            ctx.finding(DiffEvent::simple_diff(
                format!(
                    "merged region {} full row span differs: {} vs {}",
                    pos,
                    region_a.is_full_row_range(),
                    region_b.is_full_row_range()
                ),
                ref_a.clone(),
                ref_b.clone(),
            ))?;
        }
        if region_a.is_full_column_range() != region_b.is_full_column_range() {
            ctx.finding(DiffEvent::simple_diff(
                format!(
                    "merged region {} full column span differs: {} vs {}",
                    pos,
                    region_a.is_full_column_range(),
                    region_b.is_full_column_range()
                ),
                ref_a.clone(),
                ref_b.clone(),
            ))?;
        }
    }
    Ok(())
}

/// Levels are compared pairwise in stored order; the walk stops at the
/// shorter list.
fn compare_outline_levels<S: DiffSink + ?Sized>(
    lay_a: &dyn SheetLayout,
    lay_b: &dyn SheetLayout,
    ref_a: &SheetRef,
    ref_b: &SheetRef,
    ctx: &mut EmitContext<'_, S>,
) -> Result<(), DiffError> {
    for ((row_a, level_a), (_row_b, level_b)) in lay_a
        .row_outline_levels()
        .iter()
        .zip(lay_b.row_outline_levels())
    {
        if level_a != level_b {
            ctx.finding(DiffEvent::simple_diff(
                format!(
                    "row outline level differs at row {}: {} vs {}",
                    row_a + 1,
                    level_a,
                    level_b
                ),
                ref_a.clone(),
                ref_b.clone(),
            ))?;
        }
    }
    Ok(())
}
