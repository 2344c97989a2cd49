//! Parameter covariance estimators.
//!
//! Given the bread `B = (X'X)⁻¹` and residuals `u`:
//! ```text
//! nonrobust:  s² B,                    s² = u'u / (n - k)
//! HC0:        B (Σ_t u_t² x_t x_t') B
//! HAC:        B S B, times n/(n - k) with `correction`
//!             S = Γ_0 + Σ_{l=1}^{L} w_l (Γ_l + Γ_l')
//!             Γ_l = Σ_{t=l}^{n-1} u_t u_{t-l} x_t x_{t-l}'
//!             w_l = 1 - l/(L+1)        (Bartlett)
//! ```
//!
//! # References
//! - White, H. (1980). "A Heteroskedasticity-Consistent Covariance Matrix
//!   Estimator and a Direct Test for Heteroskedasticity." Econometrica, 48(4).
//! - Newey, W. K., & West, K. D. (1987). "A Simple, Positive Semi-Definite,
//!   Heteroskedasticity and Autocorrelation Consistent Covariance Matrix."
//!   Econometrica, 55(3), 703-708.

use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};
use std::fmt;

/// How parameter standard errors are computed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CovarianceType {
    /// Classical homoskedastic errors
    #[default]
    #[serde(rename = "nonrobust")]
    NonRobust,
    /// White heteroskedasticity-robust errors
    #[serde(rename = "hc0")]
    HC0,
    /// Newey-West autocorrelation-robust errors
    Hac {
        /// Lag truncation; `None` selects `ceil(4 (n/100)^(2/9))`
        lags: Option<usize>,
        /// Scale by `n / (n - k)`; off by default, as in statsmodels
        #[serde(default)]
        correction: bool,
    },
}

impl CovarianceType {
    /// Whether inference uses Student-t and F rather than normal and χ².
    ///
    /// Robust covariances are asymptotic, so their z-statistics are read
    /// against the normal distribution.
    pub const fn uses_t(&self) -> bool {
        matches!(self, Self::NonRobust)
    }

    /// Lag truncation actually applied for `n` observations.
    pub fn hac_lags(&self, n: usize) -> Option<usize> {
        match self {
            Self::Hac { lags, .. } => {
                let lags = lags.unwrap_or_else(|| automatic_lags(n));
                Some(lags.min(n.saturating_sub(1)))
            }
            _ => None,
        }
    }

    /// Whether the `n / (n - k)` small-sample correction is applied.
    pub const fn small_sample_correction(&self) -> bool {
        matches!(self, Self::Hac { correction: true, .. })
    }

    /// Label used in regression summaries.
    pub const fn label(&self) -> &'static str {
        match self {
            Self::NonRobust => "nonrobust",
            Self::HC0 => "HC0",
            Self::Hac { .. } => "HAC",
        }
    }
}

impl fmt::Display for CovarianceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Hac {
                lags: Some(lags), ..
            } => write!(f, "HAC({lags})"),
            other => f.write_str(other.label()),
        }
    }
}

/// Newey-West rule of thumb: `ceil(4 (n/100)^(2/9))`.
pub fn automatic_lags(n: usize) -> usize {
    let lags = 4.0 * (n as f64 / 100.0).powf(2.0 / 9.0);
    lags.ceil() as usize
}

/// Bartlett kernel weight for `lag` under truncation `max_lag`.
pub fn bartlett_weight(lag: usize, max_lag: usize) -> f64 {
    if lag == 0 {
        1.0
    } else if lag <= max_lag {
        1.0 - (lag as f64) / (max_lag as f64 + 1.0)
    } else {
        0.0
    }
}

/// Parameter covariance for a fitted regression.
pub(crate) fn parameter_covariance(
    cov_type: CovarianceType,
    x: &Array2<f64>,
    residuals: &Array1<f64>,
    bread: &Array2<f64>,
) -> Array2<f64> {
    let (n, k) = x.dim();
    let df_resid = (n - k) as f64;

    match cov_type {
        CovarianceType::NonRobust => {
            let scale = residuals.dot(residuals) / df_resid;
            bread * scale
        }
        CovarianceType::HC0 => sandwich(bread, &lagged_score_product(x, residuals, 0)),
        CovarianceType::Hac { .. } => {
            let max_lag = cov_type.hac_lags(n).unwrap_or(0);
            let mut meat = lagged_score_product(x, residuals, 0);
            for lag in 1..=max_lag {
                let weight = bartlett_weight(lag, max_lag);
                let gamma = lagged_score_product(x, residuals, lag);
                meat = meat + (&gamma + &gamma.t()) * weight;
            }
            let hac = sandwich(bread, &meat);
            if cov_type.small_sample_correction() {
                hac * (n as f64 / df_resid)
            } else {
                hac
            }
        }
    }
}

/// `Γ_l = Σ_{t=l}^{n-1} u_t u_{t-l} x_t x_{t-l}'`
fn lagged_score_product(x: &Array2<f64>, residuals: &Array1<f64>, lag: usize) -> Array2<f64> {
    let (n, k) = x.dim();
    let mut gamma = Array2::<f64>::zeros((k, k));

    for t in lag..n {
        let weight = residuals[t] * residuals[t - lag];
        for i in 0..k {
            let xi = x[[t, i]] * weight;
            for j in 0..k {
                gamma[[i, j]] += xi * x[[t - lag, j]];
            }
        }
    }

    gamma
}

fn sandwich(bread: &Array2<f64>, meat: &Array2<f64>) -> Array2<f64> {
    bread.dot(meat).dot(bread)
}
