//! Workbook generation tests
//!
//! Each test builds a payload, generates the xlsx bytes and reads the sheet
//! back with calamine.

use calamine::{open_workbook_from_rs, Data, Range, Reader, Xlsx};
use excel_creator::excel::{build_grid, create_excel};
use excel_creator::types::{ColumnConfig, ColumnType, ExcelConfig, ExcelPayload, RawCell};
use excel_creator::ExcelError;
use pretty_assertions::assert_eq;
use serde_json::json;
use std::io::{Cursor, Read};

struct Sheet {
    values: Range<Data>,
    formulas: Range<String>,
}

impl Sheet {
    /// Value at a 1-based (row, column) position
    fn value(&self, row: u32, column: u32) -> Data {
        self.values
            .get_value((row - 1, column - 1))
            .cloned()
            .unwrap_or(Data::Empty)
    }

    fn number(&self, row: u32, column: u32) -> f64 {
        match self.value(row, column) {
            Data::Float(f) => f,
            Data::Int(i) => i as f64,
            Data::DateTime(dt) => dt.as_f64(),
            other => panic!("expected a number at ({}, {}), got {:?}", row, column, other),
        }
    }

    fn text(&self, row: u32, column: u32) -> String {
        match self.value(row, column) {
            Data::String(s) => s,
            other => panic!("expected text at ({}, {}), got {:?}", row, column, other),
        }
    }

    fn formula(&self, row: u32, column: u32) -> Option<String> {
        self.formulas
            .get_value((row - 1, column - 1))
            .filter(|f| !f.is_empty())
            .cloned()
    }
}

fn payload(config: ExcelConfig, data: serde_json::Value) -> ExcelPayload {
    let rows: Vec<Vec<RawCell>> = serde_json::from_value(data).unwrap();
    ExcelPayload::new(config, rows)
}

fn render(payload: &ExcelPayload) -> Sheet {
    let bytes = create_excel(payload).unwrap();
    let mut workbook: Xlsx<_> = open_workbook_from_rs(Cursor::new(bytes)).unwrap();
    let values = workbook
        .worksheet_range(&payload.config.sheet_name)
        .unwrap();
    let formulas = workbook
        .worksheet_formula(&payload.config.sheet_name)
        .unwrap();
    Sheet { values, formulas }
}

/// Raw XML of one part of the xlsx package
fn xlsx_part(bytes: &[u8], name: &str) -> String {
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
    let mut part = archive.by_name(name).unwrap();
    let mut xml = String::new();
    part.read_to_string(&mut xml).unwrap();
    xml
}

fn people_config() -> ExcelConfig {
    ExcelConfig::new(
        "People",
        vec![
            ColumnConfig::new("Name", ColumnType::String),
            ColumnConfig::new("Age", ColumnType::Integer),
            ColumnConfig::new("Salary", ColumnType::Money),
        ],
    )
}

// ═══════════════════════════════════════════════════════════════════════════
// HEADERS AND LAYOUT
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn test_headers_in_first_row() {
    let sheet = render(&payload(people_config(), json!([["John", 30, 50000.5]])));

    assert_eq!(sheet.text(1, 1), "Name");
    assert_eq!(sheet.text(1, 2), "Age");
    assert_eq!(sheet.text(1, 3), "Salary");
}

#[test]
fn test_sheet_is_named_from_config() {
    let bytes = create_excel(&payload(people_config(), json!([]))).unwrap();
    let workbook: Xlsx<_> = open_workbook_from_rs(Cursor::new(bytes)).unwrap();
    assert_eq!(workbook.sheet_names(), vec!["People".to_string()]);
}

#[test]
fn test_no_rows_gives_header_only_sheet() {
    let sheet = render(&payload(people_config(), json!([])));
    assert_eq!(sheet.values.height(), 1);
    assert_eq!(sheet.text(1, 1), "Name");
}

// ═══════════════════════════════════════════════════════════════════════════
// TYPED COERCION
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn test_typed_values_round_trip_through_workbook() {
    let config = ExcelConfig::new(
        "Typed",
        vec![
            ColumnConfig::new("Name", ColumnType::String),
            ColumnConfig::new("Age", ColumnType::Integer),
            ColumnConfig::new("Salary", ColumnType::Money),
            ColumnConfig::new("Score", ColumnType::Percentage),
            ColumnConfig::new("Active", ColumnType::Boolean),
            ColumnConfig::new("Ratio", ColumnType::Decimal),
        ],
    );
    let sheet = render(&payload(
        config,
        json!([["John", 30, 50000.50, 95.5, true, "2.25"]]),
    ));

    assert_eq!(sheet.text(2, 1), "John");
    assert_eq!(sheet.number(2, 2), 30.0);
    assert_eq!(sheet.number(2, 3), 50000.5);
    assert!((sheet.number(2, 4) - 0.955).abs() < 1e-12);
    assert_eq!(sheet.value(2, 5), Data::Bool(true));
    assert_eq!(sheet.number(2, 6), 2.25);
}

#[test]
fn test_integer_column_truncates_fractions() {
    let config = ExcelConfig::new("Ints", vec![ColumnConfig::new("N", ColumnType::Integer)]);
    let sheet = render(&payload(config, json!([["30.7"], [30.7], [-30.7], ["42"]])));

    assert_eq!(sheet.number(2, 1), 30.0);
    assert_eq!(sheet.number(3, 1), 30.0);
    assert_eq!(sheet.number(4, 1), -30.0);
    assert_eq!(sheet.number(5, 1), 42.0);
}

#[test]
fn test_uncoercible_values_fall_back_to_text() {
    let config = ExcelConfig::new(
        "Fallback",
        vec![
            ColumnConfig::new("Age", ColumnType::Integer),
            ColumnConfig::new("When", ColumnType::Date),
            ColumnConfig::new("Flag", ColumnType::Boolean),
        ],
    );
    let sheet = render(&payload(config, json!([["abc", "not a date", "yes"]])));

    assert_eq!(sheet.text(2, 1), "abc");
    assert_eq!(sheet.text(2, 2), "not a date");
    assert_eq!(sheet.text(2, 3), "yes");
}

#[test]
fn test_date_column_writes_serial_date() {
    let config = ExcelConfig::new("Dates", vec![ColumnConfig::new("When", ColumnType::Date)]);
    let sheet = render(&payload(config, json!([["2024-01-15"]])));

    // 2024-01-15 is serial 45306 in the 1900 date system
    assert_eq!(sheet.number(2, 1), 45306.0);
}

#[test]
fn test_money_is_clipped_to_fifteen_significant_digits() {
    let config = ExcelConfig::new("Money", vec![ColumnConfig::new("M", ColumnType::Money)]);
    let sheet = render(&payload(config, json!([["1234.12345678901234567890"]])));

    assert!((sheet.number(2, 1) - 1234.12345678901).abs() < 1e-9);
}

#[test]
fn test_string_column_keeps_numbers_as_text() {
    let config = ExcelConfig::new("Text", vec![ColumnConfig::new("Code", ColumnType::String)]);
    let sheet = render(&payload(config, json!([[7], [true]])));

    assert_eq!(sheet.text(2, 1), "7");
    assert_eq!(sheet.text(3, 1), "true");
}

// ═══════════════════════════════════════════════════════════════════════════
// ROW SHAPES
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn test_short_rows_and_nulls_leave_empty_cells() {
    let sheet = render(&payload(
        people_config(),
        json!([["John"], ["Jane", null, 100]]),
    ));

    assert_eq!(sheet.text(2, 1), "John");
    assert_eq!(sheet.value(2, 2), Data::Empty);
    assert_eq!(sheet.value(3, 2), Data::Empty);
    assert_eq!(sheet.number(3, 3), 100.0);
}

#[test]
fn test_extra_columns_are_written_as_text() {
    let config = ExcelConfig::new("Extra", vec![ColumnConfig::new("A", ColumnType::Integer)]);
    let sheet = render(&payload(config, json!([[1, 2.5, "x"]])));

    assert_eq!(sheet.number(2, 1), 1.0);
    assert_eq!(sheet.text(2, 2), "2.5");
    assert_eq!(sheet.text(2, 3), "x");
    // No header beyond the configured columns
    assert_eq!(sheet.value(1, 2), Data::Empty);
}

// ═══════════════════════════════════════════════════════════════════════════
// FORMULAS
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn test_row_formulas_use_output_row() {
    let mut config = people_config();
    config
        .columns
        .push(ColumnConfig::new("Double", ColumnType::Money).with_formula("=C{row}*2"));
    let sheet = render(&payload(
        config,
        json!([["John", 30, 100], ["Jane", 31, 200]]),
    ));

    assert_eq!(sheet.text(1, 4), "Double");
    assert_eq!(sheet.formula(2, 4).as_deref(), Some("C2*2"));
    assert_eq!(sheet.formula(3, 4).as_deref(), Some("C3*2"));
}

#[test]
fn test_formula_wins_over_data() {
    let config = ExcelConfig::new(
        "Conflict",
        vec![
            ColumnConfig::new("A", ColumnType::Integer),
            ColumnConfig::new("B", ColumnType::Integer).with_formula("A{row}+1"),
        ],
    );
    let sheet = render(&payload(config, json!([[1, 99], [2, null]])));

    assert_eq!(sheet.formula(2, 2).as_deref(), Some("A2+1"));
    assert_eq!(sheet.formula(3, 2).as_deref(), Some("A3+1"));
}

#[test]
fn test_conflicts_are_counted_on_the_grid() {
    let config = ExcelConfig::new(
        "Conflict",
        vec![
            ColumnConfig::new("A", ColumnType::Integer),
            ColumnConfig::new("B", ColumnType::Integer).with_formula("A{row}+1"),
        ],
    );
    let grid = build_grid(&payload(config, json!([[1, 99], [2, null], [3]]))).unwrap();
    assert_eq!(grid.conflict_count(), 1);
}

// ═══════════════════════════════════════════════════════════════════════════
// CONFIGURATION ERRORS
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn test_unknown_column_type_produces_no_bytes() {
    let config: ExcelConfig = serde_json::from_value(json!({
        "sheetName": "Bad",
        "columns": [{"header": "X", "type": "Currency"}]
    }))
    .unwrap();
    let result = create_excel(&payload(config, json!([[1]])));

    match result {
        Err(ExcelError::UnknownColumnType { index, name }) => {
            assert_eq!(index, 0);
            assert_eq!(name, "Currency");
        }
        other => panic!("expected UnknownColumnType, got {:?}", other.map(|b| b.len())),
    }
}

#[test]
fn test_unknown_placeholder_is_rejected() {
    let config = ExcelConfig::new(
        "Bad",
        vec![ColumnConfig::new("X", ColumnType::Integer).with_formula("=A{col}")],
    );
    let err = create_excel(&payload(config, json!([]))).unwrap_err();
    assert!(err.is_config_error());
    assert!(matches!(err, ExcelError::InvalidFormula { index: 0, .. }));
}

#[test]
fn test_column_type_is_case_insensitive() {
    let config: ExcelConfig = serde_json::from_value(json!({
        "sheetName": "Case",
        "columns": [{"header": "M", "type": "money"}]
    }))
    .unwrap();
    let sheet = render(&payload(config, json!([[12.5]])));
    assert_eq!(sheet.number(2, 1), 12.5);
}

#[test]
fn test_full_json_payload() {
    let payload: ExcelPayload = serde_json::from_value(json!({
        "data": [["John", 30, 50000.50, "2024-01-15", 95.5, true]],
        "config": {
            "fileName": "report.xlsx",
            "sheetName": "Report",
            "freezeColumns": 1,
            "columns": [
                {"header": "Name", "type": "String"},
                {"header": "Age", "type": "Integer"},
                {"header": "Salary", "type": "Money"},
                {"header": "Start", "type": "Date"},
                {"header": "Score", "type": "Percentage"},
                {"header": "Active", "type": "Boolean"},
                {"header": "Bonus", "type": "Money", "formula": "=C{row}*0.1"}
            ]
        }
    }))
    .unwrap();

    assert_eq!(payload.config.download_name(), "report.xlsx");
    let sheet = render(&payload);
    assert_eq!(sheet.text(2, 1), "John");
    assert_eq!(sheet.number(2, 4), 45306.0);
    assert_eq!(sheet.formula(2, 7).as_deref(), Some("C2*0.1"));
}

// ═══════════════════════════════════════════════════════════════════════════
// PACKAGE CONTENTS
// ═══════════════════════════════════════════════════════════════════════════

fn styled_payload() -> ExcelPayload {
    let mut config = ExcelConfig::new(
        "Styled",
        vec![
            ColumnConfig::new("A", ColumnType::Integer),
            ColumnConfig::new("B", ColumnType::Integer),
            ColumnConfig::new("Total", ColumnType::Money).with_formula("=A{row}+B{row}"),
        ],
    );
    config.freeze_columns = Some(1);
    payload(config, json!([[1, 2, 5], [3, 4]]))
}

#[test]
fn test_sheet_xml_has_auto_filter_and_frozen_pane() {
    let bytes = create_excel(&styled_payload()).unwrap();
    let sheet = xlsx_part(&bytes, "xl/worksheets/sheet1.xml");

    assert!(sheet.contains(r#"<autoFilter ref="A1:C3"/>"#), "{}", sheet);
    assert!(sheet.contains(r#"<pane xSplit="1""#), "{}", sheet);
}

#[test]
fn test_conflict_note_is_written() {
    let bytes = create_excel(&styled_payload()).unwrap();
    let comments = xlsx_part(&bytes, "xl/comments1.xml");

    assert!(comments.contains("ERR: Both formula (A2+B2) and data (5)"));
    assert!(comments.contains("Excel Creator"));
}

#[test]
fn test_styles_carry_number_formats_and_conflict_fill() {
    let bytes = create_excel(&styled_payload()).unwrap();
    let styles = xlsx_part(&bytes, "xl/styles.xml");

    assert!(styles.contains("€ #,##0.00"));
    assert!(styles.contains("#,##0"));
    assert!(styles.contains(r#"rgb="FFFF0000""#));
}

#[test]
fn test_no_freeze_without_configuration() {
    let bytes = create_excel(&payload(people_config(), json!([["John", 30, 1]]))).unwrap();
    let sheet = xlsx_part(&bytes, "xl/worksheets/sheet1.xml");

    assert!(!sheet.contains("<pane"));
    assert!(sheet.contains(r#"<autoFilter ref="A1:C2"/>"#));
}

// ═══════════════════════════════════════════════════════════════════════════
// DATA EDGES
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn test_overlong_text_is_truncated_not_fatal() {
    let config = ExcelConfig::new("Long", vec![ColumnConfig::new("Text", ColumnType::String)]);
    let payload = payload(config, json!([["z".repeat(40_000)], ["ok"]]));
    let bytes = create_excel(&payload).unwrap();

    let comments = xlsx_part(&bytes, "xl/comments1.xml");
    assert!(comments.contains("Text truncated to 32767 of 40000 characters"));

    let sheet = render(&payload);
    assert_eq!(sheet.text(2, 1).chars().count(), 32_767);
    assert_eq!(sheet.text(3, 1), "ok");
}

#[test]
fn test_pre_1900_date_is_written_as_text() {
    let config = ExcelConfig::new("Dates", vec![ColumnConfig::new("When", ColumnType::Date)]);
    let sheet = render(&payload(config, json!([["2024-01-15"], ["1850-06-01"]])));

    assert_eq!(sheet.number(2, 1), 45306.0);
    assert_eq!(sheet.text(3, 1), "1850-06-01");
}

#[test]
fn test_grouped_money_is_written_as_number() {
    let config = ExcelConfig::new("Money", vec![ColumnConfig::new("M", ColumnType::Money)]);
    let sheet = render(&payload(config, json!([["1,234.56"]])));

    assert_eq!(sheet.number(2, 1), 1234.56);
}

#[test]
fn test_tiny_number_in_string_column_keeps_text() {
    let config = ExcelConfig::new("Text", vec![ColumnConfig::new("S", ColumnType::String)]);
    let rows: Vec<Vec<RawCell>> = serde_json::from_str("[[1e-30]]").unwrap();
    let sheet = render(&ExcelPayload::new(config, rows));

    assert_eq!(sheet.text(2, 1), "1e-30");
}
