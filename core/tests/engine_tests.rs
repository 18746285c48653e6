mod common;

use common::{diff, diff_with, grid, workbook};
use sheetcmp::{CellValue, DiffConfig, DiffEvent, MacroPresence, MemorySpreadsheet, Side};

#[test]
fn identical_workbooks_produce_a_clean_report() {
    let cells: &[(u32, u32, f64)] = &[(0, 0, 1.0), (0, 2, 2.0), (4, 1, 3.0)];
    let report = diff(&grid("Data", cells), &grid("Data", cells));
    assert!(!report.differs);
    assert!(report.is_empty());
}

#[test]
fn value_difference_reports_location_and_both_values() {
    let a = grid("Data", &[(1, 1, 10.0)]);
    let b = grid("Data", &[(1, 1, 20.0)]);
    let report = diff(&a, &b);
    assert!(report.differs);
    assert_eq!(report.events.len(), 1);
    match &report.events[0] {
        DiffEvent::DiffCell {
            location_a,
            location_b,
            value_a,
            value_b,
        } => {
            assert_eq!(location_a.sheet_name, "Data");
            assert_eq!(location_a.addr.to_a1(), "B2");
            assert_eq!(location_b.addr, location_a.addr);
            assert_eq!(*value_a, CellValue::Number(10.0));
            assert_eq!(*value_b, CellValue::Number(20.0));
        }
        other => panic!("expected DiffCell, got {other:?}"),
    }
}

#[test]
fn one_sided_cells_become_extra_cell_events() {
    let a = grid("Data", &[(0, 0, 1.0), (2, 0, 9.0)]);
    let b = grid("Data", &[(0, 0, 1.0)]);

    let report = diff(&a, &b);
    assert_eq!(report.events.len(), 1);
    match &report.events[0] {
        DiffEvent::ExtraCell {
            side,
            location,
            value,
        } => {
            assert_eq!(*side, Side::First);
            assert_eq!(location.addr.to_a1(), "A3");
            assert_eq!(*value, CellValue::Number(9.0));
        }
        other => panic!("expected ExtraCell, got {other:?}"),
    }

    let report = diff(&b, &a);
    assert!(matches!(
        report.events.as_slice(),
        [DiffEvent::ExtraCell {
            side: Side::Second,
            ..
        }]
    ));
}

#[test]
fn extra_cells_interleave_with_value_diffs_in_address_order() {
    let a = grid("Data", &[(0, 0, 1.0), (0, 1, 2.0)]);
    let b = grid("Data", &[(0, 1, 3.0)]);
    let report = diff(&a, &b);
    assert_eq!(report.events.len(), 2);
    assert!(matches!(
        &report.events[0],
        DiffEvent::ExtraCell { side: Side::First, location, .. }
            if location.addr.to_a1() == "A1"
    ));
    assert!(matches!(
        &report.events[1],
        DiffEvent::DiffCell { location_a, .. } if location_a.addr.to_a1() == "B1"
    ));
}

#[test]
fn sheets_pair_by_position_and_events_carry_both_names() {
    let a = workbook(&[("Alpha", &[(0, 0, 1.0)]), ("Beta", &[(0, 0, 2.0)])]);
    let b = workbook(&[("Alpha", &[(0, 0, 1.0)]), ("Gamma", &[(0, 0, 5.0)])]);
    let report = diff(&a, &b);
    assert_eq!(report.events.len(), 1);
    match &report.events[0] {
        DiffEvent::DiffCell {
            location_a,
            location_b,
            ..
        } => {
            assert_eq!(location_a.sheet_name, "Beta");
            assert_eq!(location_b.sheet_name, "Gamma");
            assert_eq!(location_a.addr, location_b.addr);
        }
        other => panic!("expected DiffCell, got {other:?}"),
    }
}

#[test]
fn unpaired_sheet_reports_every_stored_cell() {
    let a = workbook(&[
        ("Data", &[(0, 0, 1.0)]),
        ("Extra", &[(0, 0, 7.0), (1, 1, 8.0)]),
    ]);
    let b = workbook(&[("Data", &[(0, 0, 1.0)])]);
    let report = diff(&a, &b);
    assert_eq!(report.events.len(), 2);
    for event in &report.events {
        match event {
            DiffEvent::ExtraCell { side, location, .. } => {
                assert_eq!(*side, Side::First);
                assert_eq!(location.sheet_name, "Extra");
            }
            other => panic!("expected ExtraCell, got {other:?}"),
        }
    }
    assert_eq!(report.events[0].sheet_name(), Some("Extra"));
}

#[test]
fn formula_cells_compare_by_cached_value() {
    let formula = |text: &str, value: f64| CellValue::Formula {
        text: text.into(),
        value: Box::new(CellValue::Number(value)),
    };

    let a = MemorySpreadsheet::builder()
        .sheet("Calc")
        .row(0)
        .cell(0, formula("=SUM(B1:B2)", 3.0))
        .build();
    let b = MemorySpreadsheet::builder()
        .sheet("Calc")
        .row(0)
        .cell(0, CellValue::Number(3.0))
        .build();
    assert!(!diff(&a, &b).differs, "cached value matches plain value");

    // A different formula text with the same cached result is no finding.
    let c = MemorySpreadsheet::builder()
        .sheet("Calc")
        .row(0)
        .cell(0, formula("=B1+B2", 3.0))
        .build();
    assert!(!diff(&a, &c).differs);

    let d = MemorySpreadsheet::builder()
        .sheet("Calc")
        .row(0)
        .cell(0, formula("=SUM(B1:B2)", 4.0))
        .build();
    assert!(diff(&a, &d).differs, "cached values disagree");
}

#[test]
fn textual_and_numeric_forms_of_the_same_digits_differ() {
    let a = MemorySpreadsheet::builder()
        .sheet("Data")
        .row(0)
        .cell(0, CellValue::Text("1".into()))
        .build();
    let b = grid("Data", &[(0, 0, 1.0)]);
    let report = diff(&a, &b);
    assert!(matches!(
        report.events.as_slice(),
        [DiffEvent::DiffCell { .. }]
    ));
}

#[test]
fn numbers_compare_by_bit_pattern_end_to_end() {
    let a = grid("Data", &[(0, 0, f64::NAN)]);
    let b = grid("Data", &[(0, 0, f64::NAN)]);
    assert!(!diff(&a, &b).differs, "NaN pairs with NaN");

    let a = grid("Data", &[(0, 0, 0.0)]);
    let b = grid("Data", &[(0, 0, -0.0)]);
    assert!(diff(&a, &b).differs, "signed zeroes are distinct");
}

#[test]
fn one_sided_ignore_turns_the_other_head_into_an_extra_cell() {
    let a = grid("Data", &[(0, 0, 1.0)]);
    let b = grid("Data", &[(0, 0, 2.0)]);
    let config = DiffConfig::builder()
        .ignore_a(vec!["Data:::A1".into()])
        .build()
        .expect("rule compiles");

    let report = diff_with(&a, &b, &config);
    assert!(matches!(
        report.events.as_slice(),
        [DiffEvent::ExtraCell {
            side: Side::Second,
            ..
        }]
    ));
}

#[test]
fn matching_ignores_on_both_sides_suppress_the_finding() {
    let a = grid("Data", &[(0, 0, 1.0)]);
    let b = grid("Data", &[(0, 0, 2.0)]);
    let config = DiffConfig::builder()
        .ignore_a(vec!["Data:::A1".into()])
        .ignore_b(vec!["Data:::A1".into()])
        .build()
        .expect("rules compile");
    assert!(!diff_with(&a, &b, &config).differs);
}

#[test]
fn row_and_column_components_of_one_rule_are_a_union() {
    // Rule "Data:2:B" drops all of row 2 and all of column B.
    let cells: &[(u32, u32, f64)] = &[(0, 0, 1.0), (0, 1, 2.0), (1, 0, 3.0), (2, 2, 4.0)];
    let changed: &[(u32, u32, f64)] = &[(0, 0, 10.0), (0, 1, 20.0), (1, 0, 30.0), (2, 2, 40.0)];
    let rules = vec!["Data:2:B".to_string()];
    let config = DiffConfig::builder()
        .ignore_a(rules.clone())
        .ignore_b(rules)
        .build()
        .expect("rule compiles");

    let report = diff_with(&grid("Data", cells), &grid("Data", changed), &config);
    let addrs: Vec<String> = report
        .events
        .iter()
        .map(|event| match event {
            DiffEvent::DiffCell { location_a, .. } => location_a.addr.to_a1(),
            other => panic!("expected DiffCell, got {other:?}"),
        })
        .collect();
    assert_eq!(addrs, ["A1", "C3"]);
}

#[test]
fn whole_sheet_ignore_leaves_other_sheets_alone() {
    let a = workbook(&[("Log", &[(0, 0, 1.0)]), ("Data", &[(0, 0, 5.0)])]);
    let b = workbook(&[("Log", &[(0, 0, 2.0)]), ("Data", &[(0, 0, 6.0)])]);
    let config = DiffConfig::builder()
        .ignore_a(vec!["Log".into()])
        .ignore_b(vec!["Log".into()])
        .build()
        .expect("rule compiles");

    let report = diff_with(&a, &b, &config);
    assert_eq!(report.events.len(), 1);
    assert_eq!(report.events[0].sheet_name(), Some("Data"));
}

#[test]
fn out_of_order_view_fails_the_run_with_a_consistency_error() {
    let a = MemorySpreadsheet::builder()
        .sheet("Data")
        .row(5)
        .cell(0, CellValue::Number(1.0))
        .row(2)
        .cell(0, CellValue::Number(2.0))
        .build();
    let b = MemorySpreadsheet::builder().sheet("Data").build();

    let err = sheetcmp::diff_spreadsheets(&a, &b, &DiffConfig::default())
        .expect_err("ordering violation fails the run");
    assert_eq!(err.code(), "SHEETCMP_DIFF_002");
    let message = err.to_string();
    assert!(message.contains("at or before"), "{message}");
    assert!(message.contains("Data"), "{message}");
}

#[test]
fn macro_difference_is_emitted_after_the_cell_pass() {
    let a = MemorySpreadsheet::builder()
        .sheet("Data")
        .row(0)
        .cell(0, CellValue::Number(1.0))
        .macro_presence(MacroPresence::Present)
        .build();
    let b = MemorySpreadsheet::builder()
        .sheet("Data")
        .row(0)
        .cell(0, CellValue::Number(2.0))
        .macro_presence(MacroPresence::Absent)
        .build();

    let report = diff(&a, &b);
    assert_eq!(report.events.len(), 2);
    assert!(matches!(report.events[0], DiffEvent::DiffCell { .. }));
    assert!(matches!(
        report.events[1],
        DiffEvent::MacroOnlyIn { side: Side::First }
    ));
}

#[test]
fn unknown_macro_presence_suppresses_the_check() {
    let a = MemorySpreadsheet::builder()
        .sheet("Data")
        .macro_presence(MacroPresence::Present)
        .build();
    let b = MemorySpreadsheet::builder()
        .sheet("Data")
        .macro_presence(MacroPresence::Unknown)
        .build();
    assert!(!diff(&a, &b).differs);
}

#[test]
fn report_echoes_sources_and_folds_the_run_summary() {
    let a = grid("Data", &[(0, 0, 1.0)]);
    let b = grid("Data", &[(0, 0, 2.0)]);
    let config = DiffConfig::builder()
        .source_a("old.xlsx")
        .source_b("new.xlsx")
        .build()
        .expect("valid config");

    let report = diff_with(&a, &b, &config);
    assert_eq!(report.version, "1");
    assert_eq!(report.source_a, "old.xlsx");
    assert_eq!(report.source_b, "new.xlsx");
    assert!(report.differs);
    assert!(
        !report
            .events
            .iter()
            .any(|e| matches!(e, DiffEvent::RunSummary { .. })),
        "the trailing summary is folded into the report fields"
    );
}
