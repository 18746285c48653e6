//! The ignore-rule DSL: `sheetName:rowSpec:colSpec:cellSpec`.
//!
//! Rules suppress expected differences (timestamps, serial numbers,
//! volatile regions) from the cell pass. Each side of a diff carries its
//! own rule list. Compilation is all-or-nothing: one malformed token
//! fails the whole list, naming the offending rule and token.
//!
//! Grammar per rule, colon-separated, trailing components optional:
//! - sheet name (required, exact match),
//! - rows: comma-separated 1-based numbers or inclusive ranges (`5`, `3-7`),
//! - columns: 1-based numbers or bijective base-26 letters, either form
//!   usable as a range endpoint (`2-D`),
//! - cells: A1 references or inclusive rectangles (`B2`, `A1-D10`).
//!
//! A rule with no row/col/cell components ignores the entire sheet.

use crate::addressing::{address_to_index, column_letters_to_index, MAX_COL_INDEX, MAX_ROW_INDEX};
use crate::error_codes;
use rustc_hash::FxHashMap;
use thiserror::Error;

/// A failure compiling an ignore-rule list. Always fatal: no comparison
/// runs with a rule list that did not compile.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum IgnoreError {
    #[error("[SHEETCMP_CFG_001] ignore rule '{rule}' has an empty sheet name. Suggestion: start the rule with the sheet name, e.g. 'Sheet1:5'.")]
    EmptySheetName { rule: String },

    #[error("[SHEETCMP_CFG_002] ignore rule '{rule}' has an unparsable token '{token}'. Suggestion: rows are 1-based numbers or ranges, columns are numbers or letters, cells are A1 references.")]
    MalformedToken { rule: String, token: String },

    #[error("[SHEETCMP_CFG_003] ignore rule '{rule}' has an inverted range '{token}'")]
    InvertedRange { rule: String, token: String },

    #[error("[SHEETCMP_CFG_004] duplicate ignore rule for sheet '{sheet}'")]
    DuplicateSheet { sheet: String },

    #[error("[SHEETCMP_CFG_005] ignore rule '{rule}' has too many components. Suggestion: at most sheetName:rowSpec:colSpec:cellSpec.")]
    TooManyComponents { rule: String },
}

impl IgnoreError {
    pub fn code(&self) -> &'static str {
        match self {
            IgnoreError::EmptySheetName { .. } => error_codes::CFG_EMPTY_SHEET_NAME,
            IgnoreError::MalformedToken { .. } => error_codes::CFG_MALFORMED_TOKEN,
            IgnoreError::InvertedRange { .. } => error_codes::CFG_INVERTED_RANGE,
            IgnoreError::DuplicateSheet { .. } => error_codes::CFG_DUPLICATE_SHEET,
            IgnoreError::TooManyComponents { .. } => error_codes::CFG_TOO_MANY_COMPONENTS,
        }
    }
}

/// An inclusive zero-based index range on one axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexRange {
    pub start: u32,
    pub end: u32,
}

impl IndexRange {
    fn contains(&self, value: u32) -> bool {
        self.start <= value && value <= self.end
    }
}

/// An inclusive zero-based cell rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellRect {
    pub first_row: u32,
    pub first_col: u32,
    pub last_row: u32,
    pub last_col: u32,
}

impl CellRect {
    fn contains(&self, row: u32, col: u32) -> bool {
        self.first_row <= row && row <= self.last_row && self.first_col <= col && col <= self.last_col
    }
}

/// The compiled rule for one sheet.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SheetIgnores {
    whole_sheet: bool,
    rows: Vec<IndexRange>,
    cols: Vec<IndexRange>,
    cells: Vec<CellRect>,
}

impl SheetIgnores {
    /// True for a bare-sheet-name rule: the stream skips the sheet before
    /// visiting any of its rows.
    pub fn entire_sheet(&self) -> bool {
        self.whole_sheet
    }

    /// True when the cell at (row, col) is suppressed: row match, column
    /// match, or containment in any rectangle.
    pub fn is_ignored(&self, row: u32, col: u32) -> bool {
        if self.whole_sheet {
            return true;
        }
        self.rows.iter().any(|r| r.contains(row))
            || self.cols.iter().any(|c| c.contains(col))
            || self.cells.iter().any(|rect| rect.contains(row, col))
    }
}

/// Compiled ignore rules for one side of a diff, keyed by sheet name.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct WorkbookIgnores {
    by_sheet: FxHashMap<String, SheetIgnores>,
}

impl WorkbookIgnores {
    /// No rules; nothing is ignored.
    pub fn empty() -> WorkbookIgnores {
        WorkbookIgnores::default()
    }

    /// Compile a rule list. Fails on the first malformed rule or on two
    /// rules naming the same sheet.
    pub fn compile<S: AsRef<str>>(rules: &[S]) -> Result<WorkbookIgnores, IgnoreError> {
        let mut by_sheet = FxHashMap::default();
        for rule in rules {
            let (sheet, spec) = parse_rule(rule.as_ref())?;
            if by_sheet.insert(sheet.clone(), spec).is_some() {
                return Err(IgnoreError::DuplicateSheet { sheet });
            }
        }
        Ok(WorkbookIgnores { by_sheet })
    }

    /// The compiled rule for a sheet name, if one exists.
    pub fn sheet(&self, name: &str) -> Option<&SheetIgnores> {
        self.by_sheet.get(name)
    }

    pub fn is_empty(&self) -> bool {
        self.by_sheet.is_empty()
    }

    pub fn rule_count(&self) -> usize {
        self.by_sheet.len()
    }
}

fn parse_rule(rule: &str) -> Result<(String, SheetIgnores), IgnoreError> {
    let parts: Vec<&str> = rule.split(':').collect();
    if parts.len() > 4 {
        return Err(IgnoreError::TooManyComponents { rule: rule.into() });
    }

    let sheet = parts[0];
    if sheet.is_empty() {
        return Err(IgnoreError::EmptySheetName { rule: rule.into() });
    }

    let mut spec = SheetIgnores::default();
    if let Some(row_spec) = parts.get(1).filter(|s| !s.is_empty()) {
        for token in row_spec.split(',') {
            spec.rows.push(parse_row_token(rule, token)?);
        }
    }
    if let Some(col_spec) = parts.get(2).filter(|s| !s.is_empty()) {
        for token in col_spec.split(',') {
            spec.cols.push(parse_col_token(rule, token)?);
        }
    }
    if let Some(cell_spec) = parts.get(3).filter(|s| !s.is_empty()) {
        for token in cell_spec.split(',') {
            spec.cells.push(parse_cell_token(rule, token)?);
        }
    }

    spec.whole_sheet = spec.rows.is_empty() && spec.cols.is_empty() && spec.cells.is_empty();
    Ok((sheet.to_string(), spec))
}

fn parse_row_token(rule: &str, token: &str) -> Result<IndexRange, IgnoreError> {
    let malformed = || IgnoreError::MalformedToken {
        rule: rule.into(),
        token: token.into(),
    };
    if let Some((lo, hi)) = token.split_once('-') {
        let start = parse_row_number(lo).ok_or_else(malformed)?;
        let end = parse_row_number(hi).ok_or_else(malformed)?;
        if start > end {
            return Err(IgnoreError::InvertedRange {
                rule: rule.into(),
                token: token.into(),
            });
        }
        Ok(IndexRange { start, end })
    } else {
        let index = parse_row_number(token).ok_or_else(malformed)?;
        Ok(IndexRange {
            start: index,
            end: index,
        })
    }
}

fn parse_col_token(rule: &str, token: &str) -> Result<IndexRange, IgnoreError> {
    let malformed = || IgnoreError::MalformedToken {
        rule: rule.into(),
        token: token.into(),
    };
    if let Some((lo, hi)) = token.split_once('-') {
        let start = parse_col_endpoint(lo).ok_or_else(malformed)?;
        let end = parse_col_endpoint(hi).ok_or_else(malformed)?;
        if start > end {
            return Err(IgnoreError::InvertedRange {
                rule: rule.into(),
                token: token.into(),
            });
        }
        Ok(IndexRange { start, end })
    } else {
        let index = parse_col_endpoint(token).ok_or_else(malformed)?;
        Ok(IndexRange {
            start: index,
            end: index,
        })
    }
}

fn parse_cell_token(rule: &str, token: &str) -> Result<CellRect, IgnoreError> {
    let malformed = || IgnoreError::MalformedToken {
        rule: rule.into(),
        token: token.into(),
    };
    if let Some((first, last)) = token.split_once('-') {
        let (first_row, first_col) = address_to_index(first).ok_or_else(malformed)?;
        let (last_row, last_col) = address_to_index(last).ok_or_else(malformed)?;
        if first_row > last_row || first_col > last_col {
            return Err(IgnoreError::InvertedRange {
                rule: rule.into(),
                token: token.into(),
            });
        }
        Ok(CellRect {
            first_row,
            first_col,
            last_row,
            last_col,
        })
    } else {
        let (row, col) = address_to_index(token).ok_or_else(malformed)?;
        Ok(CellRect {
            first_row: row,
            first_col: col,
            last_row: row,
            last_col: col,
        })
    }
}

/// 1-based row number to zero-based index. Zero and out-of-range rows
/// do not parse.
fn parse_row_number(text: &str) -> Option<u32> {
    if text.is_empty() || !text.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    let number: u32 = text.parse().ok()?;
    if number == 0 || number > MAX_ROW_INDEX + 1 {
        return None;
    }
    Some(number - 1)
}

/// Column endpoint: a 1-based number or a letter run.
fn parse_col_endpoint(text: &str) -> Option<u32> {
    if text.is_empty() {
        return None;
    }
    if text.chars().all(|c| c.is_ascii_digit()) {
        let number: u32 = text.parse().ok()?;
        if number == 0 || number > MAX_COL_INDEX + 1 {
            return None;
        }
        Some(number - 1)
    } else {
        column_letters_to_index(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn compile(rules: &[&str]) -> Result<WorkbookIgnores, IgnoreError> {
        WorkbookIgnores::compile(rules)
    }

    #[test]
    fn bare_sheet_name_ignores_entire_sheet() {
        let ignores = compile(&["Sheet1"]).expect("rule should compile");
        let sheet = ignores.sheet("Sheet1").expect("rule exists");
        assert!(sheet.entire_sheet());
        assert!(sheet.is_ignored(0, 0));
        assert!(sheet.is_ignored(999, 999));
        assert!(ignores.sheet("Sheet2").is_none());
    }

    #[test]
    fn trailing_empty_components_still_mean_entire_sheet() {
        for rule in ["Sheet1:", "Sheet1::", "Sheet1:::"] {
            let ignores = compile(&[rule]).expect("rule should compile");
            assert!(ignores.sheet("Sheet1").expect("rule exists").entire_sheet(), "{rule}");
        }
    }

    #[test]
    fn sheet_name_match_is_exact() {
        let ignores = compile(&["Sheet1"]).expect("rule should compile");
        assert!(ignores.sheet("sheet1").is_none());
        assert!(ignores.sheet("Sheet1 ").is_none());
    }

    #[test]
    fn row_numbers_are_one_based() {
        let ignores = compile(&["Data:1,5"]).expect("rule should compile");
        let sheet = ignores.sheet("Data").expect("rule exists");
        assert!(!sheet.entire_sheet());
        assert!(sheet.is_ignored(0, 3));
        assert!(sheet.is_ignored(4, 0));
        assert!(!sheet.is_ignored(1, 0));
    }

    #[test]
    fn row_ranges_are_inclusive() {
        let ignores = compile(&["Data:3-7"]).expect("rule should compile");
        let sheet = ignores.sheet("Data").expect("rule exists");
        assert!(!sheet.is_ignored(1, 0));
        assert!(sheet.is_ignored(2, 0));
        assert!(sheet.is_ignored(6, 0));
        assert!(!sheet.is_ignored(7, 0));
    }

    #[test]
    fn column_spec_takes_numbers_and_letters() {
        let ignores = compile(&["Data::2,D"]).expect("rule should compile");
        let sheet = ignores.sheet("Data").expect("rule exists");
        assert!(sheet.is_ignored(0, 1), "column 2 is index 1");
        assert!(sheet.is_ignored(41, 3), "column D is index 3");
        assert!(!sheet.is_ignored(0, 0));
        assert!(!sheet.is_ignored(0, 2));
    }

    #[test]
    fn column_range_endpoints_mix_forms() {
        let ignores = compile(&["Data::2-D"]).expect("rule should compile");
        let sheet = ignores.sheet("Data").expect("rule exists");
        assert!(!sheet.is_ignored(0, 0));
        assert!(sheet.is_ignored(0, 1));
        assert!(sheet.is_ignored(0, 3));
        assert!(!sheet.is_ignored(0, 4));
    }

    #[test]
    fn multi_letter_columns_count_in_bijective_base_26() {
        let ignores = compile(&["Data::AA"]).expect("rule should compile");
        assert!(ignores.sheet("Data").expect("rule exists").is_ignored(0, 26));
    }

    #[test]
    fn cell_spec_takes_single_cells_and_rectangles() {
        let ignores = compile(&["Data:::B2,D4-F6"]).expect("rule should compile");
        let sheet = ignores.sheet("Data").expect("rule exists");
        assert!(sheet.is_ignored(1, 1));
        assert!(!sheet.is_ignored(1, 2));
        assert!(sheet.is_ignored(3, 3));
        assert!(sheet.is_ignored(5, 5));
        assert!(!sheet.is_ignored(6, 5));
    }

    #[test]
    fn components_combine_with_or() {
        let ignores = compile(&["Data:2:C:E5"]).expect("rule should compile");
        let sheet = ignores.sheet("Data").expect("rule exists");
        assert!(sheet.is_ignored(1, 17), "row match");
        assert!(sheet.is_ignored(400, 2), "column match");
        assert!(sheet.is_ignored(4, 4), "cell match");
        assert!(!sheet.is_ignored(0, 0));
    }

    #[test]
    fn multiple_sheets_compile_independently() {
        let ignores = compile(&["Summary", "Data:1"]).expect("rules should compile");
        assert_eq!(ignores.rule_count(), 2);
        assert!(ignores.sheet("Summary").expect("rule exists").entire_sheet());
        assert!(!ignores.sheet("Data").expect("rule exists").entire_sheet());
    }

    #[test]
    fn duplicate_sheet_rules_are_rejected() {
        let err = compile(&["Data:1", "Data:2"]).expect_err("duplicate should fail");
        assert_eq!(
            err,
            IgnoreError::DuplicateSheet {
                sheet: "Data".into()
            }
        );
        assert_eq!(err.code(), "SHEETCMP_CFG_004");
    }

    #[test]
    fn empty_sheet_name_is_rejected() {
        let err = compile(&[":1"]).expect_err("empty sheet name should fail");
        assert!(matches!(err, IgnoreError::EmptySheetName { .. }));
        let err = compile(&[""]).expect_err("empty rule should fail");
        assert!(matches!(err, IgnoreError::EmptySheetName { .. }));
    }

    #[test]
    fn too_many_components_are_rejected() {
        let err = compile(&["Data:1:2:A1:extra"]).expect_err("five components should fail");
        assert!(matches!(err, IgnoreError::TooManyComponents { .. }));
    }

    #[test]
    fn malformed_tokens_identify_the_offender() {
        let err = compile(&["Data:1,x,3"]).expect_err("bad row token should fail");
        assert_eq!(
            err,
            IgnoreError::MalformedToken {
                rule: "Data:1,x,3".into(),
                token: "x".into()
            }
        );
    }

    #[test]
    fn zero_row_and_column_are_malformed() {
        assert!(matches!(
            compile(&["Data:0"]),
            Err(IgnoreError::MalformedToken { .. })
        ));
        assert!(matches!(
            compile(&["Data::0"]),
            Err(IgnoreError::MalformedToken { .. })
        ));
    }

    #[test]
    fn inverted_ranges_are_rejected() {
        assert!(matches!(
            compile(&["Data:7-3"]),
            Err(IgnoreError::InvertedRange { .. })
        ));
        assert!(matches!(
            compile(&["Data::D-2"]),
            Err(IgnoreError::InvertedRange { .. })
        ));
        assert!(matches!(
            compile(&["Data:::D10-A1"]),
            Err(IgnoreError::InvertedRange { .. })
        ));
    }

    #[test]
    fn open_ended_and_negative_ranges_are_malformed() {
        for rule in ["Data:5-", "Data:-5", "Data:3-7-9", "Data::A-"] {
            assert!(
                matches!(compile(&[rule]), Err(IgnoreError::MalformedToken { .. })),
                "{rule} should be malformed"
            );
        }
    }

    #[test]
    fn empty_list_tokens_are_malformed() {
        assert!(matches!(
            compile(&["Data:1,,3"]),
            Err(IgnoreError::MalformedToken { .. })
        ));
    }

    #[test]
    fn one_bad_rule_fails_the_whole_list() {
        let err = compile(&["Good:1", "Bad:zzz1zzz:"]);
        assert!(err.is_err());
    }

    #[test]
    fn bad_cell_tokens_are_malformed() {
        for rule in ["Data:::A0", "Data:::1A", "Data:::A", "Data:::A1-"] {
            assert!(
                matches!(compile(&[rule]), Err(IgnoreError::MalformedToken { .. })),
                "{rule} should be malformed"
            );
        }
    }
}
