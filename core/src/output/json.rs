//! JSON rendering of a collected [`DiffReport`].
//!
//! The schema is the serde shape of [`DiffReport`]: events are tagged by
//! `kind`, and the report carries its schema version so consumers can
//! detect incompatible changes.

use crate::diff::DiffReport;

pub fn serialize_report(report: &DiffReport) -> serde_json::Result<String> {
    serde_json::to_string(report)
}

pub fn serialize_report_pretty(report: &DiffReport) -> serde_json::Result<String> {
    serde_json::to_string_pretty(report)
}

pub fn deserialize_report(json: &str) -> serde_json::Result<DiffReport> {
    serde_json::from_str(json)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::addressing::address_to_index;
    use crate::diff::{CellLocation, DiffEvent, Side};
    use crate::workbook::{CellAddress, CellValue};

    fn location(sheet: &str, a1: &str) -> CellLocation {
        let (row, col) = address_to_index(a1).expect("valid address");
        CellLocation::new(sheet, CellAddress::new(0, row, col))
    }

    fn sample_report() -> DiffReport {
        DiffReport::from_events(
            "a.xlsx",
            "b.xlsx",
            vec![
                DiffEvent::diff_cell(
                    location("Data", "B2"),
                    location("Data", "B2"),
                    CellValue::Number(1.0),
                    CellValue::Number(2.0),
                ),
                DiffEvent::extra_cell(
                    Side::Second,
                    location("Data", "C9"),
                    CellValue::Text("only here".into()),
                ),
            ],
        )
    }

    #[test]
    fn events_serialize_with_kind_tags() {
        let json = serialize_report(&sample_report()).expect("serializes");
        assert!(json.contains(r#""version":"1""#));
        assert!(json.contains(r#""kind":"DiffCell""#));
        assert!(json.contains(r#""kind":"ExtraCell""#));
        assert!(json.contains(r#""differs":true"#));
    }

    #[test]
    fn reports_round_trip() {
        let report = sample_report();
        let json = serialize_report_pretty(&report).expect("serializes");
        assert!(json.contains('\n'));
        let back = deserialize_report(&json).expect("deserializes");
        assert_eq!(back, report);
    }

    #[test]
    fn clean_report_serializes_without_events() {
        let report = DiffReport::from_events("a.xlsx", "b.xlsx", Vec::new());
        let json = serialize_report(&report).expect("serializes");
        assert!(json.contains(r#""differs":false"#));
        assert!(json.contains(r#""events":[]"#));
    }
}
