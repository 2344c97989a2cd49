//! Spreadsheet input via calamine.

use super::table::{TableBuilder, parse_number};
use crate::error::{DataError, Result};
use calamine::{Data, Reader, open_workbook_auto};
use std::path::Path;

fn cell_value(cell: &Data) -> Option<f64> {
    match cell {
        Data::Float(v) => Some(*v),
        Data::Int(v) => Some(*v as f64),
        Data::String(text) => parse_number(text),
        _ => None,
    }
}

/// Read `sheet` from the workbook at `path`.
pub(super) fn read_sheet(path: &Path, sheet: &str) -> Result<TableBuilder> {
    let mut workbook = open_workbook_auto(path)?;

    let available = workbook.sheet_names();
    if !available.iter().any(|name| name == sheet) {
        return Err(DataError::SheetNotFound {
            sheet: sheet.to_string(),
            available,
        });
    }

    let range = workbook.worksheet_range(sheet)?;
    let mut rows = range.rows();
    let header = rows
        .next()
        .ok_or_else(|| DataError::Empty(format!("sheet '{sheet}' is empty")))?;

    let mut table = TableBuilder::new(header.iter().map(ToString::to_string).collect())?;
    for row in rows {
        let cells: Vec<Option<f64>> = row.iter().map(cell_value).collect();
        table.push_row(&cells)?;
    }
    Ok(table)
}
