//! Regression errors.

use retpred_data::DataError;
use thiserror::Error;

/// Errors that can occur while building or fitting a regression
#[derive(Debug, Error)]
pub enum OlsError {
    /// Dimension mismatch
    #[error("Dimension mismatch for {context}: expected {expected}, got {actual}")]
    DimensionMismatch {
        /// Expected dimension
        expected: usize,
        /// Actual dimension
        actual: usize,
        /// What was being compared
        context: String,
    },

    /// Not enough observations for the number of regressors
    #[error("Insufficient data: need at least {required} observations, got {actual}")]
    InsufficientData {
        /// Required number of observations
        required: usize,
        /// Actual number of observations
        actual: usize,
    },

    /// Design matrix is singular (perfectly collinear regressors)
    #[error("Singular design matrix: '{column}' is a linear combination of earlier regressors")]
    Singular {
        /// First regressor found to be linearly dependent
        column: String,
    },

    /// Non-finite value in the regression inputs
    #[error("Missing or non-finite values in '{column}'")]
    MissingValues {
        /// Offending column
        column: String,
    },

    /// Model has no regressors
    #[error("Design matrix has no columns")]
    EmptyDesign,

    /// Regressor name appears twice
    #[error("Duplicate regressor: {0}")]
    DuplicateColumn(String),

    /// Referenced regressor is not in the design
    #[error("Missing regressor: {0}")]
    MissingColumn(String),

    /// Formula could not be parsed
    #[error("Invalid formula '{formula}': {reason}")]
    Formula {
        /// Formula text
        formula: String,
        /// What went wrong
        reason: String,
    },

    /// Reference distribution could not be constructed
    #[error("Distribution error: {0}")]
    Distribution(String),

    /// Panel error
    #[error("Data error: {0}")]
    Data(#[from] DataError),
}
