//! Stable machine-readable error codes.
//!
//! Every fatal error carries one of these codes in its message (bracketed
//! prefix) and exposes it through a `code()` accessor. Codes are part of
//! the public contract: test harnesses match on them, so existing codes
//! must never be renumbered or reused.

// Ignore-rule compilation (configuration errors).
pub const CFG_EMPTY_SHEET_NAME: &str = "SHEETCMP_CFG_001";
pub const CFG_MALFORMED_TOKEN: &str = "SHEETCMP_CFG_002";
pub const CFG_INVERTED_RANGE: &str = "SHEETCMP_CFG_003";
pub const CFG_DUPLICATE_SHEET: &str = "SHEETCMP_CFG_004";
pub const CFG_TOO_MANY_COMPONENTS: &str = "SHEETCMP_CFG_005";

// Diff run failures.
pub const DIFF_INVALID_CONFIG: &str = "SHEETCMP_DIFF_001";
pub const DIFF_CONSISTENCY: &str = "SHEETCMP_DIFF_002";
pub const DIFF_SINK_ERROR: &str = "SHEETCMP_DIFF_003";

// Container layer.
pub const CONTAINER_IO: &str = "SHEETCMP_CONT_001";
pub const CONTAINER_ZIP: &str = "SHEETCMP_CONT_002";
pub const CONTAINER_NOT_ZIP: &str = "SHEETCMP_CONT_003";
pub const CONTAINER_TOO_MANY_PARTS: &str = "SHEETCMP_CONT_004";
pub const CONTAINER_PART_TOO_LARGE: &str = "SHEETCMP_CONT_005";
pub const CONTAINER_TOTAL_TOO_LARGE: &str = "SHEETCMP_CONT_006";
pub const CONTAINER_PART_MISSING: &str = "SHEETCMP_CONT_007";

// XLSX backend.
pub const XLSX_NOT_PACKAGE: &str = "SHEETCMP_XLSX_001";
pub const XLSX_MISSING_PART: &str = "SHEETCMP_XLSX_002";
pub const XLSX_XML: &str = "SHEETCMP_XLSX_003";
pub const XLSX_CONTAINER: &str = "SHEETCMP_XLSX_004";

// ODS backend.
pub const ODS_NOT_PACKAGE: &str = "SHEETCMP_ODS_001";
pub const ODS_XML: &str = "SHEETCMP_ODS_002";
pub const ODS_CONTAINER: &str = "SHEETCMP_ODS_003";

// Loader.
pub const LOAD_UNREADABLE: &str = "SHEETCMP_FMT_001";
pub const LOAD_IO: &str = "SHEETCMP_FMT_002";
