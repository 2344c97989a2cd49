//! Period-indexed predictor panel.

use crate::error::{DataError, Result};
use crate::range::PeriodRange;
use polars::prelude::*;
use std::collections::HashSet;

/// Name of the year-month index column.
pub const PERIOD_COLUMN: &str = "period";

/// Monthly table of candidate predictors indexed by year-month period.
///
/// Invariants upheld by every constructor:
/// - `period` is the first column, `Int64`, strictly increasing and null-free
/// - every other column is `Float64`, with NaN normalized to null
#[derive(Debug, Clone)]
pub struct PredictorPanel {
    frame: DataFrame,
}

impl PredictorPanel {
    /// Wrap a frame holding a `period` column, normalizing column types.
    pub fn new(frame: DataFrame) -> Result<Self> {
        let period = frame
            .column(PERIOD_COLUMN)
            .map_err(|_| DataError::MissingColumn(PERIOD_COLUMN.to_string()))?;

        let mut columns = Vec::with_capacity(frame.width());
        columns.push(
            period
                .as_materialized_series()
                .cast(&DataType::Int64)?
                .into_column(),
        );

        for column in frame.get_columns() {
            let series = column.as_materialized_series();
            if series.name().as_str() == PERIOD_COLUMN {
                continue;
            }
            let floats = series.cast(&DataType::Float64)?;
            let cleaned: Float64Chunked = floats
                .f64()?
                .into_iter()
                .map(|v| v.filter(|x| !x.is_nan()))
                .collect();
            columns.push(cleaned.with_name(series.name().clone()).into_column());
        }

        let frame = DataFrame::new(columns)?;
        validate_periods(&period_values(&frame)?)?;
        Ok(Self { frame })
    }

    /// Build a panel from periods and named value columns.
    pub fn from_columns(periods: Vec<i64>, columns: Vec<(String, Vec<Option<f64>>)>) -> Result<Self> {
        let mut seen = HashSet::from([PERIOD_COLUMN.to_string()]);
        let mut frame_columns = Vec::with_capacity(columns.len() + 1);
        frame_columns.push(Column::new(PERIOD_COLUMN.into(), periods));

        for (name, values) in columns {
            if !seen.insert(name.clone()) {
                return Err(DataError::DuplicateColumn(name));
            }
            frame_columns.push(Column::new(name.as_str().into(), values));
        }

        Self::new(DataFrame::new(frame_columns)?)
    }

    /// Underlying frame, `period` first.
    pub const fn frame(&self) -> &DataFrame {
        &self.frame
    }

    /// Consume the panel and return its frame.
    pub fn into_frame(self) -> DataFrame {
        self.frame
    }

    /// Lazy view of the panel for expression pipelines.
    pub fn lazy(&self) -> LazyFrame {
        self.frame.clone().lazy()
    }

    /// Number of rows.
    pub fn height(&self) -> usize {
        self.frame.height()
    }

    /// Whether the panel has no rows.
    pub fn is_empty(&self) -> bool {
        self.frame.height() == 0
    }

    /// Value column names in panel order, excluding `period`.
    pub fn column_names(&self) -> Vec<String> {
        self.frame
            .get_column_names()
            .into_iter()
            .filter(|name| name.as_str() != PERIOD_COLUMN)
            .map(|name| name.to_string())
            .collect()
    }

    /// Whether the panel has a value column called `name`.
    pub fn has_column(&self, name: &str) -> bool {
        name != PERIOD_COLUMN && self.frame.get_column_index(name).is_some()
    }

    /// Period index values.
    pub fn periods(&self) -> Result<Vec<i64>> {
        period_values(&self.frame)
    }

    /// First and last period, if the panel has rows.
    pub fn span(&self) -> Result<Option<(i64, i64)>> {
        let periods = self.periods()?;
        Ok(periods.first().copied().zip(periods.last().copied()))
    }

    /// Values of one column, nulls as `None`.
    pub fn values(&self, name: &str) -> Result<Vec<Option<f64>>> {
        if !self.has_column(name) {
            return Err(DataError::MissingColumn(name.to_string()));
        }
        let series = self
            .frame
            .column(name)?
            .as_materialized_series()
            .cast(&DataType::Float64)?;
        Ok(series.f64()?.into_iter().collect())
    }

    /// Rows whose period lies inside `range`.
    pub fn range(&self, range: PeriodRange) -> Result<Self> {
        let mut predicate = lit(true);
        if let Some(start) = range.start() {
            predicate = predicate.and(col(PERIOD_COLUMN).gt_eq(lit(start)));
        }
        if let Some(end) = range.end() {
            predicate = predicate.and(col(PERIOD_COLUMN).lt_eq(lit(end)));
        }

        let frame = self.lazy().filter(predicate).collect()?;
        Ok(Self { frame })
    }

    /// Rows from `start` onward, i.e. `[start:]`.
    pub fn since(&self, start: i64) -> Result<Self> {
        self.range(PeriodRange::starting(start))
    }

    /// Rows up to and including `end`, i.e. `[:end]`.
    pub fn until(&self, end: i64) -> Result<Self> {
        self.range(PeriodRange::ending(end))
    }

    /// Keep `period` plus the named columns, in the given order.
    pub fn select<S: AsRef<str>>(&self, names: &[S]) -> Result<Self> {
        let mut selection = Vec::with_capacity(names.len() + 1);
        selection.push(PERIOD_COLUMN);
        for name in names {
            let name = name.as_ref();
            if !self.has_column(name) {
                return Err(DataError::MissingColumn(name.to_string()));
            }
            selection.push(name);
        }

        let frame = self.frame.select(selection)?;
        Ok(Self { frame })
    }

    /// Remove the named columns. Every name must exist.
    pub fn drop<S: AsRef<str>>(&self, names: &[S]) -> Result<Self> {
        let mut dropped = HashSet::with_capacity(names.len());
        for name in names {
            let name = name.as_ref();
            if !self.has_column(name) {
                return Err(DataError::MissingColumn(name.to_string()));
            }
            dropped.insert(name);
        }

        let keep: Vec<String> = self
            .column_names()
            .into_iter()
            .filter(|name| !dropped.contains(name.as_str()))
            .collect();
        self.select(&keep)
    }

    /// Remove every row holding a null in any column.
    pub fn drop_incomplete(&self) -> Result<Self> {
        let frame = self.frame.drop_nulls::<String>(None)?;
        Ok(Self { frame })
    }
}

fn period_values(frame: &DataFrame) -> Result<Vec<i64>> {
    let series = frame
        .column(PERIOD_COLUMN)
        .map_err(|_| DataError::MissingColumn(PERIOD_COLUMN.to_string()))?
        .as_materialized_series()
        .cast(&DataType::Int64)?;

    series
        .i64()?
        .into_iter()
        .enumerate()
        .map(|(row, period)| {
            period.ok_or_else(|| DataError::Parse(format!("missing period on row {}", row + 1)))
        })
        .collect()
}

fn validate_periods(periods: &[i64]) -> Result<()> {
    for pair in periods.windows(2) {
        if pair[1] <= pair[0] {
            return Err(DataError::UnorderedPeriods {
                previous: pair[0],
                next: pair[1],
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_panel() -> PredictorPanel {
        let periods = vec![194912, 195001, 195002, 195003, 201211, 201212, 201301];
        let n = periods.len();
        let ret = (0..n).map(|i| Some(0.01 * i as f64)).collect();
        let price = (0..n).map(|i| Some(10.0 + i as f64)).collect();
        PredictorPanel::from_columns(
            periods,
            vec![("ret".to_string(), ret), ("price".to_string(), price)],
        )
        .unwrap()
    }

    #[test]
    fn test_range_composition_matches_direct_range() {
        let panel = sample_panel();
        let composed = panel.since(195001).unwrap().until(201212).unwrap();
        let direct = panel
            .range(PeriodRange::between(195001, 201212).unwrap())
            .unwrap();

        assert!(composed.frame().equals_missing(direct.frame()));
        assert_eq!(
            composed.periods().unwrap(),
            vec![195001, 195002, 195003, 201211, 201212]
        );
    }

    #[test]
    fn test_bound_need_not_exist() {
        let panel = sample_panel();
        let through = panel.until(201214).unwrap();
        assert_eq!(through.span().unwrap(), Some((194912, 201212)));
    }

    #[test]
    fn test_duplicate_period_rejected() {
        let err = PredictorPanel::from_columns(
            vec![195001, 195001],
            vec![("ret".to_string(), vec![Some(0.1), Some(0.2)])],
        )
        .unwrap_err();
        assert!(matches!(err, DataError::UnorderedPeriods { .. }));
    }

    #[test]
    fn test_decreasing_period_rejected() {
        let err = PredictorPanel::from_columns(
            vec![195002, 195001],
            vec![("ret".to_string(), vec![Some(0.1), Some(0.2)])],
        )
        .unwrap_err();
        assert!(matches!(
            err,
            DataError::UnorderedPeriods {
                previous: 195002,
                next: 195001
            }
        ));
    }

    #[test]
    fn test_nan_normalized_to_null() {
        let panel = PredictorPanel::from_columns(
            vec![195001, 195002],
            vec![("ret".to_string(), vec![Some(f64::NAN), Some(0.2)])],
        )
        .unwrap();
        assert_eq!(panel.values("ret").unwrap(), vec![None, Some(0.2)]);
    }

    #[test]
    fn test_select_and_drop() {
        let panel = sample_panel();
        let selected = panel.select(&["price"]).unwrap();
        assert_eq!(selected.column_names(), vec!["price"]);

        let dropped = panel.drop(&["price"]).unwrap();
        assert_eq!(dropped.column_names(), vec!["ret"]);

        assert!(matches!(
            panel.drop(&["missing"]).unwrap_err(),
            DataError::MissingColumn(name) if name == "missing"
        ));
    }

    #[test]
    fn test_drop_incomplete() {
        let panel = PredictorPanel::from_columns(
            vec![195001, 195002, 195003],
            vec![
                ("a".to_string(), vec![Some(1.0), None, Some(3.0)]),
                ("b".to_string(), vec![Some(1.0), Some(2.0), Some(3.0)]),
            ],
        )
        .unwrap();

        let complete = panel.drop_incomplete().unwrap();
        assert_eq!(complete.periods().unwrap(), vec![195001, 195003]);
    }

    #[test]
    fn test_duplicate_column_rejected() {
        let err = PredictorPanel::from_columns(
            vec![195001],
            vec![
                ("a".to_string(), vec![Some(1.0)]),
                ("a".to_string(), vec![Some(2.0)]),
            ],
        )
        .unwrap_err();
        assert!(matches!(err, DataError::DuplicateColumn(name) if name == "a"));
    }
}
