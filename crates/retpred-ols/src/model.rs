//! OLS estimator and fitted results.

use crate::covariance::{CovarianceType, parameter_covariance};
use crate::design::{Design, Target};
use crate::error::OlsError;
use crate::linalg::{condition_number, least_squares, spd_inverse};
use ndarray::{Array1, Array2, Axis};
use statrs::distribution::{ChiSquared, ContinuousCDF, FisherSnedecor, Normal, StudentsT};
use tracing::debug;

/// Linear regression of a target on a design, fit by ordinary least squares.
#[derive(Debug, Clone)]
pub struct OlsModel {
    target: Target,
    design: Design,
}

impl OlsModel {
    /// Pair a target with a design of the same length.
    ///
    /// The design is used as given; call [`crate::add_constant`] first for a
    /// model with an intercept.
    pub fn new(target: Target, design: Design) -> Result<Self, OlsError> {
        if target.len() != design.nobs() {
            return Err(OlsError::DimensionMismatch {
                expected: design.nobs(),
                actual: target.len(),
                context: format!("target '{}'", target.name()),
            });
        }
        Ok(Self { target, design })
    }

    /// Dependent variable.
    pub const fn target(&self) -> &Target {
        &self.target
    }

    /// Regressors.
    pub const fn design(&self) -> &Design {
        &self.design
    }

    /// Fit with classical standard errors.
    pub fn fit(&self) -> Result<OlsResults, OlsError> {
        self.fit_with(CovarianceType::NonRobust)
    }

    /// Fit with the given parameter covariance estimator.
    pub fn fit_with(&self, cov_type: CovarianceType) -> Result<OlsResults, OlsError> {
        let x = self.design.matrix();
        let y = self.target.values();
        let (n, k) = x.dim();

        if k == 0 {
            return Err(OlsError::EmptyDesign);
        }
        if let Some(j) = self.design.first_non_finite() {
            return Err(OlsError::MissingValues {
                column: self.design.names()[j].clone(),
            });
        }
        if y.iter().any(|v| !v.is_finite()) {
            return Err(OlsError::MissingValues {
                column: self.target.name().to_string(),
            });
        }
        if n <= k {
            return Err(OlsError::InsufficientData {
                required: k + 1,
                actual: n,
            });
        }

        debug!(
            dependent = self.target.name(),
            nobs = n,
            regressors = k,
            cov_type = %cov_type,
            "fitting OLS"
        );

        let solution = least_squares(x, y).map_err(|e| OlsError::Singular {
            column: self.design.names()[e.index].clone(),
        })?;
        let params = solution.coefficients;
        let fitted = x.dot(&params);
        let residuals = y - &fitted;
        let cov_params = parameter_covariance(cov_type, x, &residuals, &solution.normalized_cov);

        let constant = self.design.constant_index();
        let k_constant = usize::from(constant.is_some());
        let nobs = n as f64;
        let df_resid = (n - k) as f64;
        let df_model = (k - k_constant) as f64;

        let ssr = residuals.dot(&residuals);
        let mean_y = y.sum() / nobs;
        let tss = if constant.is_some() {
            y.iter().map(|v| (v - mean_y).powi(2)).sum()
        } else {
            y.dot(y)
        };
        let rsquared = 1.0 - ssr / tss;
        let rsquared_adj = 1.0 - (nobs - k_constant as f64) / df_resid * (1.0 - rsquared);

        let reference = Reference::new(cov_type, df_resid)?;
        let bse = cov_params.diag().mapv(f64::sqrt);
        let tvalues = &params / &bse;
        let pvalues = tvalues.mapv(|t| reference.two_sided_p(t));

        let slopes: Vec<usize> = (0..k).filter(|&j| Some(j) != constant).collect();
        let (fvalue, f_pvalue) = wald_f(&params, &cov_params, &slopes, df_resid)?;

        let llf = -nobs / 2.0 * ((2.0 * std::f64::consts::PI).ln() + (ssr / nobs).ln() + 1.0);
        let k_params = k as f64;

        let statistics = FitStatistics {
            nobs: n,
            df_model,
            df_resid,
            rsquared,
            rsquared_adj,
            fvalue,
            f_pvalue,
            llf,
            aic: -2.0 * llf + 2.0 * k_params,
            bic: -2.0 * llf + nobs.ln() * k_params,
            ssr,
            condition_number: condition_number(x),
        };
        let diagnostics = ResidualDiagnostics::from_residuals(&residuals)?;

        Ok(OlsResults {
            dependent: self.target.name().to_string(),
            names: self.design.names().to_vec(),
            params,
            bse,
            tvalues,
            pvalues,
            cov_params,
            cov_type,
            reference,
            has_constant: constant.is_some(),
            fitted,
            residuals,
            statistics,
            diagnostics,
        })
    }
}

/// Goodness-of-fit summary of a regression.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FitStatistics {
    /// Number of observations
    pub nobs: usize,
    /// Regressors excluding the constant
    pub df_model: f64,
    /// Residual degrees of freedom, `n - k`
    pub df_resid: f64,
    /// R², centered when the model has a constant
    pub rsquared: f64,
    /// Adjusted R²
    pub rsquared_adj: f64,
    /// F-statistic for all non-constant coefficients being zero
    pub fvalue: f64,
    /// p-value of the F-statistic
    pub f_pvalue: f64,
    /// Gaussian log-likelihood
    pub llf: f64,
    /// Akaike information criterion
    pub aic: f64,
    /// Bayesian information criterion
    pub bic: f64,
    /// Sum of squared residuals
    pub ssr: f64,
    /// Condition number of the design
    pub condition_number: f64,
}

/// Normality and autocorrelation diagnostics of the residuals.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResidualDiagnostics {
    /// Durbin-Watson statistic
    pub durbin_watson: f64,
    /// Jarque-Bera statistic
    pub jarque_bera: f64,
    /// p-value of the Jarque-Bera statistic under χ²(2)
    pub jb_pvalue: f64,
    /// Sample skewness
    pub skew: f64,
    /// Sample kurtosis (3 for a normal distribution)
    pub kurtosis: f64,
}

impl ResidualDiagnostics {
    fn from_residuals(residuals: &Array1<f64>) -> Result<Self, OlsError> {
        let n = residuals.len() as f64;
        let ssr = residuals.dot(residuals);

        let durbin_watson = residuals
            .windows(2)
            .into_iter()
            .map(|w| (w[1] - w[0]).powi(2))
            .sum::<f64>()
            / ssr;

        let mean = residuals.sum() / n;
        let central_moment =
            |p: i32| residuals.iter().map(|r| (r - mean).powi(p)).sum::<f64>() / n;
        let m2 = central_moment(2);
        let skew = central_moment(3) / m2.powf(1.5);
        let kurtosis = central_moment(4) / (m2 * m2);

        let jarque_bera = n / 6.0 * (skew * skew + (kurtosis - 3.0).powi(2) / 4.0);
        let chi2 = ChiSquared::new(2.0).map_err(distribution_error)?;
        let jb_pvalue = if jarque_bera.is_finite() {
            chi2.sf(jarque_bera)
        } else {
            f64::NAN
        };

        Ok(Self {
            durbin_watson,
            jarque_bera,
            jb_pvalue,
            skew,
            kurtosis,
        })
    }
}

/// One row of a coefficient table.
#[derive(Debug, Clone, PartialEq)]
pub struct Coefficient {
    /// Regressor name
    pub name: String,
    /// Point estimate
    pub estimate: f64,
    /// Standard error
    pub std_err: f64,
    /// t- or z-statistic
    pub statistic: f64,
    /// Two-sided p-value
    pub p_value: f64,
    /// Lower confidence bound
    pub lower: f64,
    /// Upper confidence bound
    pub upper: f64,
}

/// Fitted OLS regression. Read-only.
#[derive(Debug, Clone)]
pub struct OlsResults {
    dependent: String,
    names: Vec<String>,
    params: Array1<f64>,
    bse: Array1<f64>,
    tvalues: Array1<f64>,
    pvalues: Array1<f64>,
    cov_params: Array2<f64>,
    cov_type: CovarianceType,
    reference: Reference,
    has_constant: bool,
    fitted: Array1<f64>,
    residuals: Array1<f64>,
    statistics: FitStatistics,
    diagnostics: ResidualDiagnostics,
}

impl OlsResults {
    /// Name of the dependent variable.
    pub fn dependent(&self) -> &str {
        &self.dependent
    }

    /// Regressor names, in coefficient order.
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Coefficient estimates.
    pub const fn params(&self) -> &Array1<f64> {
        &self.params
    }

    /// Estimate for a named regressor.
    pub fn param(&self, name: &str) -> Option<f64> {
        self.names.iter().position(|n| n == name).map(|j| self.params[j])
    }

    /// Standard errors.
    pub const fn bse(&self) -> &Array1<f64> {
        &self.bse
    }

    /// t-statistics (z-statistics under a robust covariance).
    pub const fn tvalues(&self) -> &Array1<f64> {
        &self.tvalues
    }

    /// Two-sided p-values.
    pub const fn pvalues(&self) -> &Array1<f64> {
        &self.pvalues
    }

    /// Parameter covariance matrix.
    pub const fn cov_params(&self) -> &Array2<f64> {
        &self.cov_params
    }

    /// Covariance estimator used.
    pub const fn cov_type(&self) -> CovarianceType {
        self.cov_type
    }

    /// Whether the design held a constant column.
    pub const fn has_constant(&self) -> bool {
        self.has_constant
    }

    /// In-sample fitted values.
    pub const fn fitted_values(&self) -> &Array1<f64> {
        &self.fitted
    }

    /// In-sample residuals.
    pub const fn residuals(&self) -> &Array1<f64> {
        &self.residuals
    }

    /// Goodness-of-fit statistics.
    pub const fn statistics(&self) -> &FitStatistics {
        &self.statistics
    }

    /// Residual diagnostics.
    pub const fn diagnostics(&self) -> &ResidualDiagnostics {
        &self.diagnostics
    }

    /// Shorthand for `statistics().rsquared`.
    pub const fn rsquared(&self) -> f64 {
        self.statistics.rsquared
    }

    /// Confidence intervals at level `1 - alpha`, one `[lower, upper]` row per
    /// coefficient.
    pub fn conf_int(&self, alpha: f64) -> Array2<f64> {
        let q = self.reference.critical_value(alpha);
        let mut intervals = Array2::<f64>::zeros((self.params.len(), 2));
        for (j, mut row) in intervals.axis_iter_mut(Axis(0)).enumerate() {
            row[0] = self.params[j] - q * self.bse[j];
            row[1] = self.params[j] + q * self.bse[j];
        }
        intervals
    }

    /// Coefficient table with 95% confidence intervals.
    pub fn coefficients(&self) -> Vec<Coefficient> {
        let intervals = self.conf_int(0.05);
        self.names
            .iter()
            .enumerate()
            .map(|(j, name)| Coefficient {
                name: name.clone(),
                estimate: self.params[j],
                std_err: self.bse[j],
                statistic: self.tvalues[j],
                p_value: self.pvalues[j],
                lower: intervals[[j, 0]],
                upper: intervals[[j, 1]],
            })
            .collect()
    }

    /// Predictions for a design holding the same regressors.
    ///
    /// Columns are matched by name, so their order may differ.
    pub fn predict(&self, design: &Design) -> Result<Array1<f64>, OlsError> {
        let aligned = design.select(&self.names)?;
        Ok(aligned.matrix().dot(&self.params))
    }
}

/// Reference distribution for coefficient tests.
#[derive(Debug, Clone)]
enum Reference {
    StudentT(StudentsT),
    Normal(Normal),
}

impl Reference {
    fn new(cov_type: CovarianceType, df_resid: f64) -> Result<Self, OlsError> {
        let reference = if cov_type.uses_t() {
            StudentsT::new(0.0, 1.0, df_resid).map(Self::StudentT).map_err(distribution_error)?
        } else {
            Normal::new(0.0, 1.0).map(Self::Normal).map_err(distribution_error)?
        };
        Ok(reference)
    }

    fn two_sided_p(&self, statistic: f64) -> f64 {
        if statistic.is_nan() {
            return f64::NAN;
        }
        if statistic.is_infinite() {
            return 0.0;
        }
        let tail = match self {
            Self::StudentT(dist) => dist.sf(statistic.abs()),
            Self::Normal(dist) => dist.sf(statistic.abs()),
        };
        2.0 * tail
    }

    fn critical_value(&self, alpha: f64) -> f64 {
        let p = 1.0 - alpha / 2.0;
        match self {
            Self::StudentT(dist) => dist.inverse_cdf(p),
            Self::Normal(dist) => dist.inverse_cdf(p),
        }
    }
}

/// Wald F-test that the coefficients at `restricted` are jointly zero.
///
/// With classical errors this equals `(ESS / q) / s²`; with robust errors it
/// uses the robust covariance. NaN when nothing is restricted or the
/// restricted covariance block is not invertible.
fn wald_f(
    params: &Array1<f64>,
    cov_params: &Array2<f64>,
    restricted: &[usize],
    df_resid: f64,
) -> Result<(f64, f64), OlsError> {
    if restricted.is_empty() {
        return Ok((f64::NAN, f64::NAN));
    }

    let beta = params.select(Axis(0), restricted);
    let block = cov_params.select(Axis(0), restricted).select(Axis(1), restricted);
    let Ok(inverse) = spd_inverse(&block) else {
        return Ok((f64::NAN, f64::NAN));
    };

    let q = restricted.len() as f64;
    let fvalue = beta.dot(&inverse.dot(&beta)) / q;
    let dist = FisherSnedecor::new(q, df_resid).map_err(distribution_error)?;
    let f_pvalue = if fvalue.is_finite() {
        dist.sf(fvalue)
    } else {
        f64::NAN
    };

    Ok((fvalue, f_pvalue))
}

fn distribution_error(err: impl std::fmt::Display) -> OlsError {
    OlsError::Distribution(err.to_string())
}
