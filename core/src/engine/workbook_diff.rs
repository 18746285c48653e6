//! Run orchestration: compile the ignore rules, run the passes, emit the
//! trailing run summary.

use super::cell_merge::run_cell_pass;
use super::context::EmitContext;
use super::sheet_features::run_feature_pass;
use crate::config::DiffConfig;
use crate::diff::{DiffError, DiffEvent, DiffReport, DiffSummary, Side};
use crate::sink::{DiffSink, VecSink};
use crate::view::SpreadsheetView;
use crate::workbook::MacroPresence;

/// Runs a full comparison and collects the findings into a
/// [`DiffReport`].
///
/// Fails fast on unparseable ignore rules and on views that violate the
/// ordering contract; a failed run produces no report.
pub fn diff_spreadsheets(
    view_a: &dyn SpreadsheetView,
    view_b: &dyn SpreadsheetView,
    config: &DiffConfig,
) -> Result<DiffReport, DiffError> {
    let mut sink = VecSink::new();
    diff_spreadsheets_streaming(view_a, view_b, config, &mut sink)?;
    Ok(DiffReport::from_events(
        config.source_a.clone(),
        config.source_b.clone(),
        sink.into_events(),
    ))
}

/// Runs a full comparison, pushing each event into `sink` as it is
/// found.
///
/// `sink.begin()` is called before the first event and `sink.finish()`
/// exactly once afterwards, on success and on engine failure alike. On
/// success the last event delivered is a [`DiffEvent::RunSummary`].
pub fn diff_spreadsheets_streaming<S: DiffSink>(
    view_a: &dyn SpreadsheetView,
    view_b: &dyn SpreadsheetView,
    config: &DiffConfig,
    sink: &mut S,
) -> Result<DiffSummary, DiffError> {
    let (ignores_a, ignores_b) = config.compiled_ignores()?;
    sink.begin()?;

    let mut ctx = EmitContext::new(sink);
    run_cell_pass(
        view_a,
        view_b,
        &ignores_a,
        &ignores_b,
        config.all_style_mismatches,
        &mut ctx,
    )?;
    run_feature_pass(view_a, view_b, &mut ctx)?;
    run_macro_check(view_a, view_b, &mut ctx)?;
    ctx.close(config.source_a.clone(), config.source_b.clone())
}

/// Emits [`DiffEvent::MacroOnlyIn`] when one side definitely carries a
/// macro project and the other definitely does not. Any `Unknown`
/// suppresses the check.
fn run_macro_check<S: DiffSink + ?Sized>(
    view_a: &dyn SpreadsheetView,
    view_b: &dyn SpreadsheetView,
    ctx: &mut EmitContext<'_, S>,
) -> Result<(), DiffError> {
    match (view_a.macro_presence(), view_b.macro_presence()) {
        (MacroPresence::Present, MacroPresence::Absent) => {
            ctx.finding(DiffEvent::MacroOnlyIn { side: Side::First })
        }
        (MacroPresence::Absent, MacroPresence::Present) => {
            ctx.finding(DiffEvent::MacroOnlyIn { side: Side::Second })
        }
        _ => Ok(()),
    }
}
