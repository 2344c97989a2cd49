//! Row-wise accumulation shared by the workbook and CSV readers.

use crate::error::{DataError, Result};
use crate::panel::PredictorPanel;
use std::collections::HashSet;
use tracing::warn;

/// Parse a numeric cell. Blanks and non-numeric text become `None`.
pub(super) fn parse_number(text: &str) -> Option<f64> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }
    text.parse::<f64>().ok()
}

/// Columnar buffer for a raw table whose first column is the period.
#[derive(Debug)]
pub(super) struct TableBuilder {
    names: Vec<String>,
    /// Source column index for each entry in `names`
    sources: Vec<usize>,
    periods: Vec<i64>,
    columns: Vec<Vec<Option<f64>>>,
}

impl TableBuilder {
    /// Start a table from its header row. The first header names the period.
    pub(super) fn new(headers: Vec<String>) -> Result<Self> {
        if headers.is_empty() {
            return Err(DataError::Empty("input has no header row".to_string()));
        }

        let mut seen = HashSet::new();
        let mut names = Vec::new();
        let mut sources = Vec::new();
        for (idx, header) in headers.iter().enumerate().skip(1) {
            let name = header.trim().to_lowercase();
            if name.is_empty() {
                warn!(column = idx + 1, "skipping column without header");
                continue;
            }
            if !seen.insert(name.clone()) {
                return Err(DataError::DuplicateColumn(name));
            }
            names.push(name);
            sources.push(idx);
        }

        let columns = vec![Vec::new(); names.len()];
        Ok(Self {
            names,
            sources,
            periods: Vec::new(),
            columns,
        })
    }

    /// Append one row of parsed cells; `cells[0]` is the period.
    ///
    /// Rows with no values at all are skipped.
    pub(super) fn push_row(&mut self, cells: &[Option<f64>]) -> Result<()> {
        if cells.iter().all(Option::is_none) {
            return Ok(());
        }

        let row = self.periods.len() + 2;
        let period = cells
            .first()
            .copied()
            .flatten()
            .ok_or_else(|| DataError::Parse(format!("missing period on data row {row}")))?;
        if period.fract() != 0.0 || !period.is_finite() {
            return Err(DataError::Parse(format!(
                "period {period} on data row {row} is not a year-month integer"
            )));
        }

        self.periods.push(period as i64);
        for (column, &source) in self.columns.iter_mut().zip(&self.sources) {
            column.push(cells.get(source).copied().flatten());
        }
        Ok(())
    }

    /// Finish the table as a validated panel.
    pub(super) fn into_panel(self) -> Result<PredictorPanel> {
        if self.periods.is_empty() {
            return Err(DataError::Empty("input has no data rows".to_string()));
        }
        let columns = self.names.into_iter().zip(self.columns).collect();
        PredictorPanel::from_columns(self.periods, columns)
    }
}
