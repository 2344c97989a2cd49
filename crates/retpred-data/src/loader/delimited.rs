//! CSV input.

use super::table::{TableBuilder, parse_number};
use crate::error::Result;
use csv::ReaderBuilder;
use std::path::Path;

/// Read a CSV file whose first column is the period.
pub(super) fn read_csv(path: &Path) -> Result<TableBuilder> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_path(path)?;

    let headers = reader.headers()?.iter().map(str::to_string).collect();
    let mut table = TableBuilder::new(headers)?;

    for record in reader.records() {
        let record = record?;
        let cells: Vec<Option<f64>> = record.iter().map(parse_number).collect();
        table.push_row(&cells)?;
    }
    Ok(table)
}
