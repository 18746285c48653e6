//! Diff events, errors and reports.
//!
//! This module defines the types the engine emits:
//! - [`DiffEvent`]: one observed difference (or the closing run summary)
//! - [`DiffReport`]: a versioned, collected run
//! - [`DiffError`]: fatal failures of a diff run
//!
//! Events are self-contained: locations carry sheet names alongside
//! indexes so a consumer needs no side table to render them.

use crate::error_codes;
use crate::ignore::IgnoreError;
use crate::workbook::{CellAddress, CellValue};
use thiserror::Error;

/// Which input an event refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    First,
    Second,
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Side::First => f.write_str("first"),
            Side::Second => f.write_str("second"),
        }
    }
}

/// A cell position plus the display name of its sheet.
///
/// The two sides of a pair may disagree on the name while agreeing on
/// the address; events therefore carry one location per side.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct CellLocation {
    pub sheet_name: String,
    pub addr: CellAddress,
}

impl CellLocation {
    pub fn new(sheet_name: impl Into<String>, addr: CellAddress) -> CellLocation {
        CellLocation {
            sheet_name: sheet_name.into(),
            addr,
        }
    }
}

impl std::fmt::Display for CellLocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}!{}", self.sheet_name, self.addr.to_a1())
    }
}

/// A sheet identified by workbook position and display name.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct SheetRef {
    pub index: u32,
    pub name: String,
}

impl SheetRef {
    pub fn new(index: u32, name: impl Into<String>) -> SheetRef {
        SheetRef {
            index,
            name: name.into(),
        }
    }
}

/// Errors that abort a diff run.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum DiffError {
    /// Ignore rules failed to compile. The inner error already carries
    /// its own code and suggestion; nothing is added here.
    #[error("{source}")]
    Config {
        #[from]
        source: IgnoreError,
    },

    #[error("[SHEETCMP_DIFF_002] view consistency violated: {message}. Suggestion: report a bug against the backend that produced this workbook.")]
    Consistency { message: String },

    #[error("[SHEETCMP_DIFF_003] sink error: {message}. Suggestion: check the output destination and retry.")]
    SinkError { message: String },
}

impl DiffError {
    pub fn code(&self) -> &'static str {
        match self {
            DiffError::Config { source } => source.code(),
            DiffError::Consistency { .. } => error_codes::DIFF_CONSISTENCY,
            DiffError::SinkError { .. } => error_codes::DIFF_SINK_ERROR,
        }
    }
}

/// Summary of a streamed diff run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiffSummary {
    /// True iff at least one finding was emitted.
    pub differs: bool,
    /// Total number of events emitted, run summary included.
    pub event_count: usize,
}

/// One observed difference between two workbooks, or the closing
/// [`DiffEvent::RunSummary`].
///
/// The enum is marked `#[non_exhaustive]` to allow future additions.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "kind")]
#[non_exhaustive]
pub enum DiffEvent {
    /// Same address, different evaluated value.
    DiffCell {
        location_a: CellLocation,
        location_b: CellLocation,
        value_a: CellValue,
        value_b: CellValue,
    },
    /// A cell stored on one side only.
    ExtraCell {
        side: Side,
        location: CellLocation,
        value: CellValue,
    },
    /// Value-equal cells that differ in formatting: a style attribute, a
    /// font attribute, or an unresolvable font index.
    StyleDiff {
        location_a: CellLocation,
        location_b: CellLocation,
        description: String,
    },
    /// A sheet-feature finding (column width, freeze pane, merged
    /// region, outline level, sheet name).
    SimpleDiff {
        description: String,
        sheet_a: SheetRef,
        sheet_b: SheetRef,
    },
    /// Macros present on exactly one side.
    MacroOnlyIn { side: Side },
    /// End of run: the overall verdict and both source descriptions.
    RunSummary {
        differs: bool,
        source_a: String,
        source_b: String,
    },
}

impl DiffEvent {
    /// Everything except the run summary counts toward `differs`.
    pub fn is_finding(&self) -> bool {
        !matches!(self, DiffEvent::RunSummary { .. })
    }

    /// The sheet a finding belongs to, for grouping in rendered output.
    /// Workbook-level events return `None`.
    pub fn sheet_name(&self) -> Option<&str> {
        match self {
            DiffEvent::DiffCell { location_a, .. } => Some(&location_a.sheet_name),
            DiffEvent::ExtraCell { location, .. } => Some(&location.sheet_name),
            DiffEvent::StyleDiff { location_a, .. } => Some(&location_a.sheet_name),
            DiffEvent::SimpleDiff { sheet_a, .. } => Some(&sheet_a.name),
            DiffEvent::MacroOnlyIn { .. } | DiffEvent::RunSummary { .. } => None,
        }
    }

    pub fn diff_cell(
        location_a: CellLocation,
        location_b: CellLocation,
        value_a: CellValue,
        value_b: CellValue,
    ) -> DiffEvent {
        debug_assert_eq!(
            location_a.addr, location_b.addr,
            "value diffs pair cells at the same address"
        );
        DiffEvent::DiffCell {
            location_a,
            location_b,
            value_a,
            value_b,
        }
    }

    pub fn extra_cell(side: Side, location: CellLocation, value: CellValue) -> DiffEvent {
        DiffEvent::ExtraCell {
            side,
            location,
            value,
        }
    }

    pub fn style_diff(
        location_a: CellLocation,
        location_b: CellLocation,
        description: impl Into<String>,
    ) -> DiffEvent {
        debug_assert_eq!(
            location_a.addr, location_b.addr,
            "style diffs pair cells at the same address"
        );
        DiffEvent::StyleDiff {
            location_a,
            location_b,
            description: description.into(),
        }
    }

    pub fn simple_diff(
        description: impl Into<String>,
        sheet_a: SheetRef,
        sheet_b: SheetRef,
    ) -> DiffEvent {
        DiffEvent::SimpleDiff {
            description: description.into(),
            sheet_a,
            sheet_b,
        }
    }
}

/// A versioned, collected diff run.
///
/// `events` holds the findings in emission order; the run summary is
/// folded into `differs`/`source_a`/`source_b`. The `version` field is
/// the schema version for forwards compatibility.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct DiffReport {
    /// Schema version (currently "1").
    pub version: String,
    pub source_a: String,
    pub source_b: String,
    /// Whether the run found any difference.
    pub differs: bool,
    pub events: Vec<DiffEvent>,
}

impl DiffReport {
    pub const SCHEMA_VERSION: &'static str = "1";

    /// Build a report from a collected event stream; a trailing
    /// [`DiffEvent::RunSummary`] is folded into the report fields.
    pub fn from_events(
        source_a: impl Into<String>,
        source_b: impl Into<String>,
        mut events: Vec<DiffEvent>,
    ) -> DiffReport {
        let differs = if let Some(DiffEvent::RunSummary { differs, .. }) = events.last() {
            let differs = *differs;
            events.pop();
            differs
        } else {
            events.iter().any(DiffEvent::is_finding)
        };
        DiffReport {
            version: Self::SCHEMA_VERSION.to_string(),
            source_a: source_a.into(),
            source_b: source_b.into(),
            differs,
            events,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn event_count(&self) -> usize {
        self.events.len()
    }
}
