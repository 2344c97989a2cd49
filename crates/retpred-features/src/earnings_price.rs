//! Earnings/Price Feature
//!
//! Ratio of trailing twelve-month earnings to the index price, a valuation
//! predictor. Undefined (null) where the price is zero or either input is
//! missing.

use crate::error::FeatureError;
use crate::traits::Feature;
use polars::prelude::*;
use serde::{Deserialize, Serialize};

/// Configuration for the earnings/price feature
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EarningsPriceConfig {
    /// Trailing earnings column (default: "e12")
    pub earnings_column: String,
    /// Price column (default: "price")
    pub price_column: String,
    /// Output column (default: "ep")
    pub output: String,
}

impl Default for EarningsPriceConfig {
    fn default() -> Self {
        Self {
            earnings_column: "e12".to_string(),
            price_column: "price".to_string(),
            output: "ep".to_string(),
        }
    }
}

/// Computes `ep = e12 / price`
#[derive(Debug, Default)]
pub struct EarningsPriceFeature {
    config: EarningsPriceConfig,
}

impl EarningsPriceFeature {
    /// Create the feature with a custom configuration.
    pub const fn with_config(config: EarningsPriceConfig) -> Self {
        Self { config }
    }

    /// Active configuration.
    pub const fn config(&self) -> &EarningsPriceConfig {
        &self.config
    }
}

impl Feature for EarningsPriceFeature {
    fn name(&self) -> &str {
        &self.config.output
    }

    fn required_columns(&self) -> Vec<&str> {
        vec![
            self.config.earnings_column.as_str(),
            self.config.price_column.as_str(),
        ]
    }

    fn compute(&self, data: LazyFrame) -> Result<LazyFrame, FeatureError> {
        let earnings = col(self.config.earnings_column.as_str());
        let price = col(self.config.price_column.as_str());

        // A null price makes the predicate null, which falls through to otherwise
        Ok(data.with_columns([when(price.clone().neq(lit(0.0)))
            .then(earnings / price)
            .otherwise(lit(NULL))
            .alias(self.config.output.as_str())]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::apply_features;
    use retpred_data::PredictorPanel;

    #[test]
    fn test_ratio_and_undefined_cases() {
        let panel = PredictorPanel::from_columns(
            vec![195001, 195002, 195003, 195004],
            vec![
                (
                    "e12".to_string(),
                    vec![Some(2.0), Some(3.0), None, Some(1.0)],
                ),
                (
                    "price".to_string(),
                    vec![Some(16.0), Some(0.0), Some(20.0), None],
                ),
            ],
        )
        .unwrap();

        let feature = EarningsPriceFeature::default();
        let out = apply_features(&panel, &[&feature]).unwrap();

        assert_eq!(
            out.values("ep").unwrap(),
            vec![Some(2.0 / 16.0), None, None, None]
        );
    }

    #[test]
    fn test_custom_columns() {
        let config = EarningsPriceConfig {
            earnings_column: "d12".to_string(),
            price_column: "index".to_string(),
            output: "dp".to_string(),
        };
        let feature = EarningsPriceFeature::with_config(config);
        assert_eq!(feature.name(), "dp");
        assert_eq!(feature.required_columns(), vec!["d12", "index"]);
    }
}
