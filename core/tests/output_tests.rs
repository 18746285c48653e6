mod common;

use common::{diff, grid};
use sheetcmp::{
    deserialize_report, serialize_report, serialize_report_pretty, CellAddress, CellLocation,
    CellValue, DiffEvent, DiffReport, SheetRef, Side,
};

fn location(sheet: &str, row: u32, col: u32) -> CellLocation {
    CellLocation::new(sheet, CellAddress::new(0, row, col))
}

#[test]
fn reports_round_trip_through_json() {
    let a = grid("Data", &[(0, 0, 1.0), (2, 1, 5.0)]);
    let b = grid("Data", &[(0, 0, 2.0)]);
    let report = diff(&a, &b);
    assert!(report.differs);

    let json = serialize_report(&report).expect("serializes");
    let back = deserialize_report(&json).expect("deserializes");
    assert_eq!(back, report);

    let pretty = serialize_report_pretty(&report).expect("serializes");
    assert!(pretty.contains("\n  "), "pretty output is indented");
    assert_eq!(deserialize_report(&pretty).expect("deserializes"), report);
}

#[test]
fn a_trailing_run_summary_is_folded_into_the_report() {
    let events = vec![
        DiffEvent::MacroOnlyIn { side: Side::First },
        DiffEvent::RunSummary {
            differs: true,
            source_a: "a.xlsx".into(),
            source_b: "b.xlsx".into(),
        },
    ];
    let report = DiffReport::from_events("a.xlsx", "b.xlsx", events);
    assert!(report.differs);
    assert_eq!(report.event_count(), 1);
    assert!(matches!(
        report.events.as_slice(),
        [DiffEvent::MacroOnlyIn { .. }]
    ));

    let clean = DiffReport::from_events(
        "a.xlsx",
        "b.xlsx",
        vec![DiffEvent::RunSummary {
            differs: false,
            source_a: "a.xlsx".into(),
            source_b: "b.xlsx".into(),
        }],
    );
    assert!(!clean.differs);
    assert!(clean.is_empty());
}

#[test]
fn differs_is_computed_when_no_summary_is_present() {
    let event = DiffEvent::style_diff(
        location("Data", 0, 0),
        location("Data", 0, 0),
        "style differs on wrap_text: false vs true",
    );
    let report = DiffReport::from_events("a", "b", vec![event]);
    assert!(report.differs);

    let clean = DiffReport::from_events("a", "b", Vec::new());
    assert!(!clean.differs);
    assert_eq!(clean.version, "1");
}

#[test]
fn kind_tags_are_stable() {
    let cell = location("Data", 1, 1);
    let cases = [
        (
            DiffEvent::diff_cell(
                cell.clone(),
                cell.clone(),
                CellValue::Number(1.0),
                CellValue::Number(2.0),
            ),
            "DiffCell",
        ),
        (
            DiffEvent::extra_cell(Side::First, cell.clone(), CellValue::Text("x".into())),
            "ExtraCell",
        ),
        (
            DiffEvent::style_diff(
                cell.clone(),
                cell.clone(),
                "style differs on wrap_text: false vs true",
            ),
            "StyleDiff",
        ),
        (
            DiffEvent::simple_diff(
                "sheet name differs: 'A' vs 'B'",
                SheetRef::new(0, "A"),
                SheetRef::new(0, "B"),
            ),
            "SimpleDiff",
        ),
        (DiffEvent::MacroOnlyIn { side: Side::Second }, "MacroOnlyIn"),
        (
            DiffEvent::RunSummary {
                differs: false,
                source_a: "a".into(),
                source_b: "b".into(),
            },
            "RunSummary",
        ),
    ];

    for (event, expected) in cases {
        let value = serde_json::to_value(&event).expect("event serializes");
        assert_eq!(value["kind"], expected, "tag for {event:?}");
    }
}

#[test]
fn located_events_expose_their_sheet() {
    let extra = DiffEvent::extra_cell(
        Side::First,
        location("Metrics", 0, 0),
        CellValue::Number(1.0),
    );
    assert_eq!(extra.sheet_name(), Some("Metrics"));
    assert!(extra.is_finding());

    let macros = DiffEvent::MacroOnlyIn { side: Side::First };
    assert_eq!(macros.sheet_name(), None);
    assert!(macros.is_finding());

    let summary = DiffEvent::RunSummary {
        differs: false,
        source_a: "a".into(),
        source_b: "b".into(),
    };
    assert_eq!(summary.sheet_name(), None);
    assert!(!summary.is_finding());
}

#[test]
fn display_forms_are_user_facing() {
    assert_eq!(Side::First.to_string(), "first");
    assert_eq!(Side::Second.to_string(), "second");
    assert_eq!(location("Data", 1, 1).to_string(), "Data!B2");
}
