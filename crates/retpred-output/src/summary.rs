//! Regression results summary.
//!
//! Renders an [`OlsResults`] in the familiar three-block layout: fit
//! statistics, coefficient table, residual diagnostics, followed by notes on
//! the covariance estimator and conditioning.

use crate::TABLE_WIDTH;
use crate::format::{centered, number, p_value, truncated};
use retpred_ols::{Coefficient, CovarianceType, FitStatistics, OlsResults, ResidualDiagnostics};
use std::fmt;

/// Condition number above which a multicollinearity note is added.
pub const CONDITION_WARNING: f64 = 1000.0;

/// Printable summary of one fitted regression.
#[derive(Debug, Clone, PartialEq)]
pub struct RegressionSummary {
    /// Heading line
    pub title: String,
    /// Dependent variable
    pub dependent: String,
    /// Formula the model was built from, if any
    pub formula: Option<String>,
    /// Sample description, e.g. a period range
    pub sample: Option<String>,
    /// Covariance estimator
    pub cov_type: CovarianceType,
    /// Fit statistics
    pub statistics: FitStatistics,
    /// Residual diagnostics
    pub diagnostics: ResidualDiagnostics,
    /// Coefficient rows with 95% intervals
    pub coefficients: Vec<Coefficient>,
}

impl RegressionSummary {
    /// Summarize fitted results.
    pub fn from_results(results: &OlsResults) -> Self {
        Self {
            title: "OLS Regression Results".to_string(),
            dependent: results.dependent().to_string(),
            formula: None,
            sample: None,
            cov_type: results.cov_type(),
            statistics: *results.statistics(),
            diagnostics: *results.diagnostics(),
            coefficients: results.coefficients(),
        }
    }

    /// Replace the heading.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Record the formula the model came from.
    pub fn with_formula(mut self, formula: impl Into<String>) -> Self {
        self.formula = Some(formula.into());
        self
    }

    /// Record the estimation sample.
    pub fn with_sample(mut self, sample: impl Into<String>) -> Self {
        self.sample = Some(sample.into());
        self
    }

    /// Footnotes on the covariance estimator and conditioning.
    pub fn notes(&self) -> Vec<String> {
        let mut notes = Vec::new();
        notes.push(match self.cov_type {
            CovarianceType::NonRobust => {
                "Standard Errors assume that the covariance matrix of the errors is correctly specified."
                    .to_string()
            }
            CovarianceType::HC0 => "Standard Errors are heteroscedasticity robust (HC0)".to_string(),
            CovarianceType::Hac { .. } => {
                let lags = self.cov_type.hac_lags(self.statistics.nobs).unwrap_or(0);
                let correction = if self.cov_type.small_sample_correction() {
                    "with"
                } else {
                    "without"
                };
                format!(
                    "Standard Errors are heteroscedasticity and autocorrelation robust (HAC) using {lags} lags and {correction} small sample correction"
                )
            }
        });

        let cond = self.statistics.condition_number;
        if cond > CONDITION_WARNING {
            notes.push(format!(
                "The condition number is large, {cond:.3e}. This might indicate that there are strong multicollinearity or other numerical problems."
            ));
        }
        notes
    }

    /// Format as ASCII table for terminal display.
    pub fn to_ascii_table(&self) -> String {
        let stats = &self.statistics;
        let diag = &self.diagnostics;
        let double = "=".repeat(TABLE_WIDTH);
        let single = "-".repeat(TABLE_WIDTH);
        let mut output = String::new();

        output.push_str(&centered(&self.title, TABLE_WIDTH));
        output.push('\n');
        output.push_str(&double);
        output.push('\n');

        let rows = [
            (
                ("Dep. Variable:", self.dependent.clone()),
                ("R-squared:", number(stats.rsquared, 3)),
            ),
            (
                ("Model:", "OLS".to_string()),
                ("Adj. R-squared:", number(stats.rsquared_adj, 3)),
            ),
            (
                ("Method:", "Least Squares".to_string()),
                ("F-statistic:", number(stats.fvalue, 3)),
            ),
            (
                ("No. Observations:", stats.nobs.to_string()),
                ("Prob (F-statistic):", number(stats.f_pvalue, 4)),
            ),
            (
                ("Df Residuals:", format!("{:.0}", stats.df_resid)),
                ("Log-Likelihood:", number(stats.llf, 2)),
            ),
            (
                ("Df Model:", format!("{:.0}", stats.df_model)),
                ("AIC:", number(stats.aic, 1)),
            ),
            (
                ("Covariance Type:", self.cov_type.to_string()),
                ("BIC:", number(stats.bic, 1)),
            ),
        ];
        for ((left_label, left), (right_label, right)) in rows {
            output.push_str(&pair_row(left_label, &left, right_label, &right));
        }
        if let Some(formula) = &self.formula {
            output.push_str(&format!("{:<20}{}\n", "Formula:", formula));
        }
        if let Some(sample) = &self.sample {
            output.push_str(&format!("{:<20}{}\n", "Sample:", sample));
        }

        output.push_str(&double);
        output.push('\n');

        let (stat_label, p_label) = if self.cov_type.uses_t() {
            ("t", "P>|t|")
        } else {
            ("z", "P>|z|")
        };
        output.push_str(&format!(
            "{:<14}{:>11}{:>11}{:>11}{:>11}{:>11}{:>11}\n",
            "", "coef", "std err", stat_label, p_label, "[0.025", "0.975]"
        ));
        output.push_str(&single);
        output.push('\n');
        for coef in &self.coefficients {
            output.push_str(&format!(
                "{:<14}{:>11}{:>11}{:>11}{:>11}{:>11}{:>11}\n",
                truncated(&coef.name, 13),
                number(coef.estimate, 4),
                number(coef.std_err, 3),
                number(coef.statistic, 3),
                p_value(coef.p_value),
                number(coef.lower, 3),
                number(coef.upper, 3),
            ));
        }

        output.push_str(&double);
        output.push('\n');
        output.push_str(&pair_row(
            "Durbin-Watson:",
            &number(diag.durbin_watson, 3),
            "Jarque-Bera (JB):",
            &number(diag.jarque_bera, 3),
        ));
        output.push_str(&pair_row(
            "Skew:",
            &number(diag.skew, 3),
            "Prob(JB):",
            &number(diag.jb_pvalue, 3),
        ));
        output.push_str(&pair_row(
            "Kurtosis:",
            &number(diag.kurtosis, 3),
            "Cond. No.",
            &number(stats.condition_number, 1),
        ));
        output.push_str(&double);
        output.push('\n');

        let notes = self.notes();
        if !notes.is_empty() {
            output.push_str("\nNotes:\n");
            for (i, note) in notes.iter().enumerate() {
                output.push_str(&format!("[{}] {}\n", i + 1, note));
            }
        }

        output
    }
}

impl fmt::Display for RegressionSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_ascii_table())
    }
}

fn pair_row(left_label: &str, left: &str, right_label: &str, right: &str) -> String {
    format!("{left_label:<20}{left:>18}    {right_label:<20}{right:>18}\n")
}
