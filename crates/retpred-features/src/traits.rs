//! Feature trait and application over a panel.

use crate::error::FeatureError;
use polars::prelude::*;
use retpred_data::PredictorPanel;
use std::collections::HashSet;
use tracing::debug;

/// A column derived from other panel columns.
pub trait Feature {
    /// Name of the output column.
    fn name(&self) -> &str;

    /// Columns that must be present before the feature is computed.
    fn required_columns(&self) -> Vec<&str>;

    /// Append the feature column to `data`, which is sorted by period.
    fn compute(&self, data: LazyFrame) -> Result<LazyFrame, FeatureError>;
}

/// Compute `features` in order and append them to the panel.
///
/// A feature may depend on the output of an earlier one in the list.
pub fn apply_features(
    panel: &PredictorPanel,
    features: &[&dyn Feature],
) -> Result<PredictorPanel, FeatureError> {
    let mut available: HashSet<String> = panel.column_names().into_iter().collect();
    for feature in features {
        for column in feature.required_columns() {
            if !available.contains(column) {
                return Err(FeatureError::MissingColumn {
                    feature: feature.name().to_string(),
                    column: column.to_string(),
                });
            }
        }
        available.insert(feature.name().to_string());
    }

    let mut data = panel.lazy();
    for feature in features {
        data = feature.compute(data)?;
        debug!(feature = feature.name(), "computed feature");
    }

    Ok(PredictorPanel::new(data.collect()?)?)
}
