//! Core value types shared by every backend and the diff engine:
//! [`CellAddress`] (the canonical ordering key), [`CellValue`] (evaluated
//! cell content), and [`MacroPresence`].

use crate::addressing::index_to_address;
use serde::{Deserialize, Serialize};
use std::hash::{Hash, Hasher};

/// A cell position within a workbook.
///
/// All three components are zero-based. The derived ordering (sheet, then
/// row, then column) is the canonical traversal order of the whole engine:
/// cell streams yield addresses strictly increasing under it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CellAddress {
    /// Zero-based sheet index in workbook order.
    pub sheet: u32,
    /// Zero-based row index.
    pub row: u32,
    /// Zero-based column index.
    pub col: u32,
}

impl CellAddress {
    pub fn new(sheet: u32, row: u32, col: u32) -> CellAddress {
        CellAddress { sheet, row, col }
    }

    /// The A1 rendering of the row/col part (e.g. "B2"). The sheet is
    /// identified separately wherever addresses are shown to people.
    pub fn to_a1(&self) -> String {
        index_to_address(self.row, self.col)
    }
}

impl std::fmt::Display for CellAddress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_a1())
    }
}

/// The evaluated content of a cell.
///
/// `Formula` carries the stored formula text alongside the cached result;
/// equality looks through it and compares cached results only, so a
/// formula cell equals a plain cell holding the same value. Numbers
/// compare by exact bit pattern: `NaN == NaN` and `0.0 != -0.0`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum CellValue {
    Number(f64),
    Text(String),
    Bool(bool),
    /// An error value such as `#DIV/0!` or `#N/A`.
    Error(String),
    /// A formula with its cached evaluated result.
    Formula { text: String, value: Box<CellValue> },
}

impl CellValue {
    /// The value a comparison sees: formulas resolve to their cached result.
    pub fn evaluated(&self) -> &CellValue {
        let mut v = self;
        while let CellValue::Formula { value, .. } = v {
            v = value;
        }
        v
    }

    /// Blank means the evaluated value renders to a string that trims to
    /// empty. Numbers, booleans and errors are never blank.
    pub fn is_blank(&self) -> bool {
        matches!(self.evaluated(), CellValue::Text(s) if s.trim().is_empty())
    }

    pub fn as_text(&self) -> Option<&str> {
        if let CellValue::Text(s) = self.evaluated() {
            Some(s)
        } else {
            None
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        if let CellValue::Number(n) = self.evaluated() {
            Some(*n)
        } else {
            None
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        if let CellValue::Bool(b) = self.evaluated() {
            Some(*b)
        } else {
            None
        }
    }
}

impl PartialEq for CellValue {
    fn eq(&self, other: &Self) -> bool {
        match (self.evaluated(), other.evaluated()) {
            (CellValue::Number(a), CellValue::Number(b)) => a.to_bits() == b.to_bits(),
            (CellValue::Text(a), CellValue::Text(b)) => a == b,
            (CellValue::Bool(a), CellValue::Bool(b)) => a == b,
            (CellValue::Error(a), CellValue::Error(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for CellValue {}

impl Hash for CellValue {
    fn hash<H: Hasher>(&self, state: &mut H) {
        // Must agree with PartialEq: hash the evaluated value.
        match self.evaluated() {
            CellValue::Number(n) => {
                0u8.hash(state);
                n.to_bits().hash(state);
            }
            CellValue::Text(s) => {
                1u8.hash(state);
                s.hash(state);
            }
            CellValue::Bool(b) => {
                2u8.hash(state);
                b.hash(state);
            }
            CellValue::Error(e) => {
                3u8.hash(state);
                e.hash(state);
            }
            CellValue::Formula { .. } => unreachable!("evaluated() never returns Formula"),
        }
    }
}

impl std::fmt::Display for CellValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.evaluated() {
            CellValue::Number(n) => write!(f, "{n}"),
            CellValue::Text(s) => f.write_str(s),
            CellValue::Bool(true) => f.write_str("TRUE"),
            CellValue::Bool(false) => f.write_str("FALSE"),
            CellValue::Error(e) => f.write_str(e),
            CellValue::Formula { .. } => unreachable!("evaluated() never returns Formula"),
        }
    }
}

/// Whether a workbook carries a macro project.
///
/// `Unknown` means the backend cannot tell; any `Unknown` side disables
/// the macro presence check for the run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MacroPresence {
    Present,
    Absent,
    Unknown,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::hash_map::DefaultHasher;

    fn hash_of(value: &CellValue) -> u64 {
        let mut hasher = DefaultHasher::new();
        value.hash(&mut hasher);
        hasher.finish()
    }

    #[test]
    fn address_order_is_sheet_then_row_then_col() {
        let a = CellAddress::new(0, 5, 5);
        let b = CellAddress::new(1, 0, 0);
        let c = CellAddress::new(1, 0, 1);
        let d = CellAddress::new(1, 1, 0);
        assert!(a < b);
        assert!(b < c);
        assert!(c < d);
    }

    #[test]
    fn address_renders_a1() {
        assert_eq!(CellAddress::new(0, 0, 0).to_string(), "A1");
        assert_eq!(CellAddress::new(3, 9, 27).to_a1(), "AB10");
    }

    #[test]
    fn formula_equals_plain_value_with_same_result() {
        let formula = CellValue::Formula {
            text: "SUM(A1:A3)".into(),
            value: Box::new(CellValue::Number(6.0)),
        };
        assert_eq!(formula, CellValue::Number(6.0));
        assert_ne!(formula, CellValue::Number(7.0));
    }

    #[test]
    fn formula_text_alone_does_not_distinguish() {
        let a = CellValue::Formula {
            text: "A1+A2".into(),
            value: Box::new(CellValue::Number(3.0)),
        };
        let b = CellValue::Formula {
            text: "SUM(A1:A2)".into(),
            value: Box::new(CellValue::Number(3.0)),
        };
        assert_eq!(a, b);
    }

    #[test]
    fn numbers_compare_by_bit_pattern() {
        assert_eq!(CellValue::Number(f64::NAN), CellValue::Number(f64::NAN));
        assert_ne!(CellValue::Number(0.0), CellValue::Number(-0.0));
        assert_ne!(CellValue::Number(1.0), CellValue::Number(1.0000000000000002));
    }

    #[test]
    fn cross_kind_values_are_unequal() {
        assert_ne!(CellValue::Number(1.0), CellValue::Bool(true));
        assert_ne!(CellValue::Text("1".into()), CellValue::Number(1.0));
        assert_ne!(CellValue::Error("#N/A".into()), CellValue::Text("#N/A".into()));
    }

    #[test]
    fn hash_agrees_with_equality_across_formula_wrapping() {
        let formula = CellValue::Formula {
            text: "B1*2".into(),
            value: Box::new(CellValue::Number(10.0)),
        };
        assert_eq!(hash_of(&formula), hash_of(&CellValue::Number(10.0)));
    }

    #[test]
    fn blank_is_whitespace_only_text() {
        assert!(CellValue::Text(String::new()).is_blank());
        assert!(CellValue::Text("   ".into()).is_blank());
        assert!(!CellValue::Text("x".into()).is_blank());
        assert!(!CellValue::Number(0.0).is_blank());
        assert!(!CellValue::Bool(false).is_blank());
        assert!(!CellValue::Error("#REF!".into()).is_blank());
        let blank_formula = CellValue::Formula {
            text: "IF(1,\"\",\"\")".into(),
            value: Box::new(CellValue::Text(String::new())),
        };
        assert!(blank_formula.is_blank());
    }

    #[test]
    fn display_renders_evaluated_values() {
        assert_eq!(CellValue::Number(5.0).to_string(), "5");
        assert_eq!(CellValue::Number(2.5).to_string(), "2.5");
        assert_eq!(CellValue::Bool(true).to_string(), "TRUE");
        assert_eq!(CellValue::Error("#DIV/0!".into()).to_string(), "#DIV/0!");
        let formula = CellValue::Formula {
            text: "1+1".into(),
            value: Box::new(CellValue::Number(2.0)),
        };
        assert_eq!(formula.to_string(), "2");
    }
}
