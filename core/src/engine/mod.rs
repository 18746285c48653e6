//! The diff engine: one synchronized walk over two ordered cell streams,
//! followed by the sheet-feature pass and the macro presence check.
//!
//! Entry points are [`diff_spreadsheets`] (collects into a
//! [`crate::diff::DiffReport`]) and [`diff_spreadsheets_streaming`]
//! (pushes every event into a [`crate::sink::DiffSink`] as it is found).
//!
//! ## Module structure
//!
//! - `workbook_diff`: run orchestration, macro check, run summary
//! - `cell_merge`: the merge walk over both cell streams
//! - `style_compare`: the ordered style and font attribute comparison
//! - `sheet_features`: column widths, freeze panes, merged regions,
//!   outline levels, sheet names
//! - `context`: emission bookkeeping shared by the passes

mod cell_merge;
mod context;
mod sheet_features;
mod style_compare;
mod workbook_diff;

pub use workbook_diff::{diff_spreadsheets, diff_spreadsheets_streaming};
