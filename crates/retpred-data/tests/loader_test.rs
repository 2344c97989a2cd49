//! Integration tests for panel loading

use retpred_data::{DEFAULT_SHEET, DataError, PanelFormat, PeriodRange, load_panel};
use rstest::rstest;
use rust_xlsxwriter::Workbook;
use std::io::Write;
use std::path::Path;
use tempfile::Builder;

fn write_csv(contents: &str) -> tempfile::NamedTempFile {
    let mut file = Builder::new().suffix(".csv").tempfile().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

#[test]
fn test_load_csv_panel() {
    let file = write_csv(
        "yyyymm,Price,E12,ret,cay\n\
         194912,16.76,2.32,0.05,NaN\n\
         195001,17.05,2.35,0.02,\n\
         195002,17.22,2.38,0.01,0.3\n",
    );

    let panel = load_panel(file.path(), DEFAULT_SHEET).unwrap();

    assert_eq!(panel.height(), 3);
    assert_eq!(panel.column_names(), vec!["price", "e12", "ret", "cay"]);
    assert_eq!(panel.periods().unwrap(), vec![194912, 195001, 195002]);
    assert_eq!(panel.values("cay").unwrap(), vec![None, None, Some(0.3)]);

    let modern = panel.range(PeriodRange::starting(195001)).unwrap();
    assert_eq!(modern.periods().unwrap(), vec![195001, 195002]);
}

/// Two-row "Monthly" sheet with float periods, a "NaN" string and a blank cell.
fn write_workbook() -> tempfile::NamedTempFile {
    let file = Builder::new().suffix(".xlsx").tempfile().unwrap();
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    sheet.set_name("Monthly").unwrap();
    for (col, name) in ["yyyymm", "Price", "cay"].iter().enumerate() {
        sheet.write_string(0, col as u16, *name).unwrap();
    }
    sheet.write_number(1, 0, 194912.0).unwrap();
    sheet.write_number(1, 1, 16.76).unwrap();
    sheet.write_string(1, 2, "NaN").unwrap();
    sheet.write_number(2, 0, 195001.0).unwrap();
    sheet.write_number(2, 1, 17.05).unwrap();
    workbook.save(file.path()).unwrap();
    file
}

#[test]
fn test_load_workbook_sheet() {
    let file = write_workbook();
    let panel = load_panel(file.path(), "Monthly").unwrap();

    assert_eq!(panel.column_names(), vec!["price", "cay"]);
    assert_eq!(panel.periods().unwrap(), vec![194912, 195001]);
    assert_eq!(panel.values("price").unwrap(), vec![Some(16.76), Some(17.05)]);
    assert_eq!(panel.values("cay").unwrap(), vec![None, None]);
}

#[test]
fn test_unknown_sheet_lists_available() {
    let file = write_workbook();
    let err = load_panel(file.path(), "Annual").unwrap_err();
    match err {
        DataError::SheetNotFound { sheet, available } => {
            assert_eq!(sheet, "Annual");
            assert_eq!(available, vec!["Monthly".to_string()]);
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_missing_file_surfaces_not_found() {
    let err = load_panel("does/not/exist.xlsx", DEFAULT_SHEET).unwrap_err();
    assert!(matches!(err, DataError::FileNotFound(_)));
}

#[test]
fn test_unordered_csv_rejected() {
    let file = write_csv("yyyymm,ret\n195002,0.1\n195001,0.2\n");
    let err = load_panel(file.path(), DEFAULT_SHEET).unwrap_err();
    assert!(matches!(err, DataError::UnorderedPeriods { .. }));
}

#[test]
fn test_header_only_csv_is_empty() {
    let file = write_csv("yyyymm,ret\n");
    let err = load_panel(file.path(), DEFAULT_SHEET).unwrap_err();
    assert!(matches!(err, DataError::Empty(_)));
}

#[rstest]
#[case("PredictorData2023.xlsx", Some(PanelFormat::Workbook))]
#[case("legacy.XLS", Some(PanelFormat::Workbook))]
#[case("monthly.ods", Some(PanelFormat::Workbook))]
#[case("monthly.csv", Some(PanelFormat::Csv))]
#[case("monthly.parquet", None)]
#[case("monthly", None)]
fn test_format_detection(#[case] path: &str, #[case] expected: Option<PanelFormat>) {
    assert_eq!(PanelFormat::from_path(Path::new(path)).ok(), expected);
}
