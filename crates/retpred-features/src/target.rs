//! Next-period target alignment.
//!
//! Predictive regressions pair predictors observed at `t` with the return
//! realized at `t + 1`. The return series is led by one period over the
//! `source` panel and joined onto the predictor window by period, so a window
//! cut from a longer panel keeps the return that follows its last row.

use crate::error::FeatureError;
use polars::prelude::*;
use retpred_data::{PERIOD_COLUMN, PredictorPanel};
use tracing::debug;

/// Replace `column` in `window` with the next period's value from `source`.
///
/// Rows whose future value is missing are removed; when `source` ends where
/// `window` ends, this drops the last row.
pub fn align_next_period_target(
    window: &PredictorPanel,
    source: &PredictorPanel,
    column: &str,
) -> Result<PredictorPanel, FeatureError> {
    if !source.has_column(column) {
        return Err(FeatureError::MissingColumn {
            feature: "next_period_target".to_string(),
            column: column.to_string(),
        });
    }

    let future = source
        .lazy()
        .sort([PERIOD_COLUMN], Default::default())
        .select([
            col(PERIOD_COLUMN),
            col(column).shift(lit(-1i64)).alias(column),
        ]);

    let mut predictors = vec![col(PERIOD_COLUMN)];
    predictors.extend(
        window
            .column_names()
            .iter()
            .filter(|name| name.as_str() != column)
            .map(|name| col(name.as_str())),
    );

    let aligned = window
        .lazy()
        .select(predictors)
        .join(
            future,
            [col(PERIOD_COLUMN)],
            [col(PERIOD_COLUMN)],
            JoinArgs::new(JoinType::Left),
        )
        .filter(col(column).is_not_null())
        .sort([PERIOD_COLUMN], Default::default())
        .collect()?;

    let aligned = PredictorPanel::new(aligned)?;
    debug!(
        rows_in = window.height(),
        rows_out = aligned.height(),
        target = column,
        "aligned next-period target"
    );
    Ok(aligned)
}
