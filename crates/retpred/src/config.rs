//! Analysis configuration.
//!
//! Every field has a default matching the standard two-pass study, so a JSON file
//! only needs the fields it changes:
//! ```json
//! { "baseline_end": 200212, "cov_type": { "hac": { "lags": 12 } } }
//! ```

use retpred_data::DEFAULT_SHEET;
use retpred_features::{EarningsPriceConfig, SPARSE_MONTHLY_COLUMNS, TrailingMeanConfig};
use retpred_ols::CovarianceType;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Errors from reading or validating a configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// File could not be read
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// File is not valid JSON for this schema
    #[error("Invalid configuration JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// A field holds an unusable value
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Parameters of the two study passes
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Workbook sheet (default: "Monthly")
    pub sheet: String,
    /// First period of both samples (default: 195001)
    pub start: i64,
    /// Last period of the baseline sample (default: 201212)
    pub baseline_end: i64,
    /// Last period of the extended sample (default: 201214, i.e. through 201212)
    pub extended_end: i64,
    /// Correlation screen for the baseline pass (default: 0.05)
    pub baseline_threshold: f64,
    /// Correlation screen for the extended pass (default: 0.15)
    pub extended_threshold: f64,
    /// Baseline predictors (default: ep, infl12, lty, ntis)
    pub baseline_predictors: Vec<String>,
    /// Formula fits run in the baseline pass
    pub baseline_formulas: Vec<String>,
    /// Return column led by one period (default: "ret")
    pub target: String,
    /// Columns never used as regressors in the extended pass
    pub excluded_regressors: Vec<String>,
    /// Columns pruned before the extended pass
    pub sparse_columns: Vec<String>,
    /// Earnings/price feature
    pub earnings_price: EarningsPriceConfig,
    /// Trailing inflation feature
    pub inflation: TrailingMeanConfig,
    /// Covariance estimator for every fit (default: nonrobust)
    pub cov_type: CovarianceType,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            sheet: DEFAULT_SHEET.to_string(),
            start: 195001,
            baseline_end: 201212,
            extended_end: 201214,
            baseline_threshold: 0.05,
            extended_threshold: 0.15,
            baseline_predictors: ["ep", "infl12", "lty", "ntis"].map(String::from).to_vec(),
            baseline_formulas: vec![
                "ret ~ ep + infl12".to_string(),
                "ret ~ ep + infl12 + lty + ntis".to_string(),
            ],
            target: "ret".to_string(),
            excluded_regressors: ["retx", "ret", "price"].map(String::from).to_vec(),
            sparse_columns: SPARSE_MONTHLY_COLUMNS.map(String::from).to_vec(),
            earnings_price: EarningsPriceConfig::default(),
            inflation: TrailingMeanConfig::default(),
            cov_type: CovarianceType::NonRobust,
        }
    }
}

impl AnalysisConfig {
    /// Parse and validate a JSON configuration.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read and validate a JSON configuration file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    /// Check ranges, thresholds and column lists.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, end) in [("baseline_end", self.baseline_end), ("extended_end", self.extended_end)] {
            if end < self.start {
                return Err(ConfigError::Invalid(format!(
                    "{name} {end} precedes start {}",
                    self.start
                )));
            }
        }
        for (name, threshold) in [
            ("baseline_threshold", self.baseline_threshold),
            ("extended_threshold", self.extended_threshold),
        ] {
            if !(0.0..1.0).contains(&threshold) {
                return Err(ConfigError::Invalid(format!(
                    "{name} must lie in [0, 1), got {threshold}"
                )));
            }
        }
        if self.baseline_predictors.is_empty() {
            return Err(ConfigError::Invalid("baseline_predictors is empty".to_string()));
        }
        if self.baseline_predictors.contains(&self.target) {
            return Err(ConfigError::Invalid(format!(
                "target '{}' listed as a baseline predictor",
                self.target
            )));
        }
        if self.target.trim().is_empty() {
            return Err(ConfigError::Invalid("target is empty".to_string()));
        }
        if self.inflation.window == 0 {
            return Err(ConfigError::Invalid("inflation window must be positive".to_string()));
        }
        Ok(())
    }
}
