//! Feature construction errors.

use polars::prelude::PolarsError;
use retpred_data::DataError;
use thiserror::Error;

/// Errors raised while deriving features or aligning the target.
#[derive(Debug, Error)]
pub enum FeatureError {
    /// An input column required by a feature is absent
    #[error("Feature '{feature}' requires missing column '{column}'")]
    MissingColumn {
        /// Feature being computed
        feature: String,
        /// Column that was not found
        column: String,
    },

    /// Rolling window length must be positive
    #[error("Invalid window length: {0}")]
    InvalidWindow(usize),

    /// Panel error
    #[error("Data error: {0}")]
    Data(#[from] DataError),

    /// Polars error
    #[error("Polars error: {0}")]
    Polars(#[from] PolarsError),
}
