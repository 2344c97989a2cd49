//! Trailing Mean Feature
//!
//! Arithmetic mean of a series over the trailing `window` periods, current
//! period included. Null until a full window of non-null values exists.
//! With the defaults this is `infl12`, the 12-month average of inflation.

use crate::error::FeatureError;
use crate::traits::Feature;
use polars::prelude::*;
use retpred_data::PERIOD_COLUMN;
use serde::{Deserialize, Serialize};

/// Configuration for the trailing mean feature
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TrailingMeanConfig {
    /// Input series (default: "infl")
    pub source: String,
    /// Window length in periods (default: 12)
    pub window: usize,
    /// Output column (default: "infl12")
    pub output: String,
}

impl Default for TrailingMeanConfig {
    fn default() -> Self {
        Self {
            source: "infl".to_string(),
            window: 12,
            output: "infl12".to_string(),
        }
    }
}

/// Rolling mean over a fixed trailing window
#[derive(Debug)]
pub struct TrailingMeanFeature {
    config: TrailingMeanConfig,
}

impl TrailingMeanFeature {
    /// Create the feature, rejecting an empty window.
    pub fn with_config(config: TrailingMeanConfig) -> Result<Self, FeatureError> {
        if config.window == 0 {
            return Err(FeatureError::InvalidWindow(config.window));
        }
        Ok(Self { config })
    }

    /// Active configuration.
    pub const fn config(&self) -> &TrailingMeanConfig {
        &self.config
    }
}

impl Default for TrailingMeanFeature {
    fn default() -> Self {
        Self {
            config: TrailingMeanConfig::default(),
        }
    }
}

impl Feature for TrailingMeanFeature {
    fn name(&self) -> &str {
        &self.config.output
    }

    fn required_columns(&self) -> Vec<&str> {
        vec![self.config.source.as_str()]
    }

    fn compute(&self, data: LazyFrame) -> Result<LazyFrame, FeatureError> {
        let window = self.config.window;

        Ok(data
            .sort([PERIOD_COLUMN], Default::default())
            .with_columns([col(self.config.source.as_str())
                .rolling_mean(RollingOptionsFixedWindow {
                    window_size: window,
                    min_periods: window,
                    ..Default::default()
                })
                .alias(self.config.output.as_str())]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::apply_features;
    use approx::assert_relative_eq;
    use retpred_data::PredictorPanel;
    use rstest::rstest;

    fn inflation_panel(n: usize) -> PredictorPanel {
        let periods = (0..n as i64)
            .map(|i| 195001 + (i / 12) * 100 + i % 12)
            .collect();
        let infl = (0..n)
            .map(|i| Some(0.002 * (i as f64 * 0.7).sin() + 0.001 * i as f64))
            .collect();
        PredictorPanel::from_columns(periods, vec![("infl".to_string(), infl)]).unwrap()
    }

    #[test]
    fn test_infl12_matches_window_mean() {
        let panel = inflation_panel(30);
        let feature = TrailingMeanFeature::default();
        let out = apply_features(&panel, &[&feature]).unwrap();

        let infl: Vec<f64> = out
            .values("infl")
            .unwrap()
            .into_iter()
            .map(Option::unwrap)
            .collect();
        let infl12 = out.values("infl12").unwrap();

        for (t, value) in infl12.iter().enumerate() {
            if t < 11 {
                assert!(value.is_none(), "row {t} should be undefined");
            } else {
                let expected = infl[t - 11..=t].iter().sum::<f64>() / 12.0;
                assert_relative_eq!(value.unwrap(), expected, epsilon = 1e-12);
            }
        }
    }

    #[rstest]
    #[case(1)]
    #[case(3)]
    #[case(12)]
    #[case(24)]
    fn test_leading_rows_without_full_window(#[case] window: usize) {
        let feature = TrailingMeanFeature::with_config(TrailingMeanConfig {
            window,
            output: "trailing".to_string(),
            ..Default::default()
        })
        .unwrap();
        let out = apply_features(&inflation_panel(30), &[&feature]).unwrap();

        let values = out.values("trailing").unwrap();
        let undefined = values.iter().take_while(|v| v.is_none()).count();
        assert_eq!(undefined, window - 1);
        assert!(values[window - 1..].iter().all(Option::is_some));
    }

    #[test]
    fn test_window_with_null_is_undefined() {
        let mut infl: Vec<Option<f64>> = (0..5).map(|i| Some(i as f64)).collect();
        infl[3] = None;
        let panel = PredictorPanel::from_columns(
            vec![195001, 195002, 195003, 195004, 195005],
            vec![("infl".to_string(), infl)],
        )
        .unwrap();

        let feature = TrailingMeanFeature::with_config(TrailingMeanConfig {
            window: 2,
            ..Default::default()
        })
        .unwrap();
        let out = apply_features(&panel, &[&feature]).unwrap();

        assert_eq!(
            out.values("infl12").unwrap(),
            vec![None, Some(0.5), Some(1.5), None, None]
        );
    }

    #[test]
    fn test_zero_window_rejected() {
        let result = TrailingMeanFeature::with_config(TrailingMeanConfig {
            window: 0,
            ..Default::default()
        });
        assert!(matches!(result, Err(FeatureError::InvalidWindow(0))));
    }

    #[test]
    fn test_missing_source_column() {
        let panel = PredictorPanel::from_columns(
            vec![195001],
            vec![("ret".to_string(), vec![Some(0.1)])],
        )
        .unwrap();
        let feature = TrailingMeanFeature::default();
        let err = apply_features(&panel, &[&feature]).unwrap_err();
        assert!(matches!(
            err,
            FeatureError::MissingColumn { ref column, .. } if column == "infl"
        ));
    }
}
