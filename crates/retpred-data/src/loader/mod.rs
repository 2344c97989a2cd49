//! Predictor panel loaders.
//!
//! The first column of the input is the year-month period; every other column
//! is a numeric series. Workbooks are read through `calamine` from a named
//! sheet, CSV files through the `csv` crate. Both produce the same
//! [`PredictorPanel`] layout.

mod delimited;
mod table;
mod workbook;

use crate::error::{DataError, Result};
use crate::panel::PredictorPanel;
use std::path::Path;
use tracing::{debug, info};

/// Sheet holding monthly observations in the predictor workbook.
pub const DEFAULT_SHEET: &str = "Monthly";

/// Input formats understood by [`load_panel`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanelFormat {
    /// Spreadsheet workbook (`xlsx`, `xlsm`, `xlsb`, `xls`, `ods`)
    Workbook,
    /// Comma-separated values with a header row
    Csv,
}

impl PanelFormat {
    /// Detect the format from a file extension.
    pub fn from_path(path: &Path) -> Result<Self> {
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();

        match extension.as_str() {
            "xlsx" | "xlsm" | "xlsb" | "xls" | "ods" => Ok(Self::Workbook),
            "csv" => Ok(Self::Csv),
            _ => Err(DataError::UnsupportedFormat(path.display().to_string())),
        }
    }
}

/// Load a predictor panel from `path`.
///
/// `sheet` names the worksheet for workbook inputs and is ignored for CSV.
///
/// # Errors
/// Fails when the file or sheet is missing, the format is unsupported, a
/// period cell cannot be parsed, or periods are not strictly increasing.
pub fn load_panel(path: impl AsRef<Path>, sheet: &str) -> Result<PredictorPanel> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(DataError::FileNotFound(path.to_path_buf()));
    }

    let format = PanelFormat::from_path(path)?;
    debug!(path = %path.display(), ?format, "reading predictor panel");

    let table = match format {
        PanelFormat::Workbook => workbook::read_sheet(path, sheet)?,
        PanelFormat::Csv => delimited::read_csv(path)?,
    };
    let panel = table.into_panel()?;

    info!(
        path = %path.display(),
        rows = panel.height(),
        columns = panel.column_names().len(),
        "loaded predictor panel"
    );
    Ok(panel)
}
