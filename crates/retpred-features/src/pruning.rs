//! Static column pruning.
//!
//! Some monthly series in the predictor workbook only start late in the
//! sample or are reported at a lower frequency. Keeping them would make a
//! row-complete table far shorter, so they are removed by name before feature
//! construction.

use crate::error::FeatureError;
use retpred_data::PredictorPanel;
use tracing::debug;

/// Monthly columns with sparse or partial history.
pub const SPARSE_MONTHLY_COLUMNS: [&str; 12] = [
    "gpce", "gip", "house", "eqis", "cay", "i/k", "pce", "govik", "skew", "crdstd", "accrul",
    "cfacc",
];

/// Drop `columns` from the panel. Every listed column must be present.
pub fn prune_columns<S: AsRef<str>>(
    panel: &PredictorPanel,
    columns: &[S],
) -> Result<PredictorPanel, FeatureError> {
    let pruned = panel.drop(columns)?;
    debug!(
        dropped = columns.len(),
        remaining = pruned.column_names().len(),
        "pruned static columns"
    );
    Ok(pruned)
}
