//! Pearson correlations and threshold screening of predictors.

use crate::design::{Design, Target};
use crate::error::OlsError;
use ndarray::{Array2, ArrayView1};

/// Pearson correlation of two equal-length series.
///
/// NaN when fewer than two observations are given or either series has zero
/// variance.
pub fn pearson(a: ArrayView1<'_, f64>, b: ArrayView1<'_, f64>) -> f64 {
    let n = a.len();
    if n < 2 || n != b.len() {
        return f64::NAN;
    }

    let mean_a = a.sum() / n as f64;
    let mean_b = b.sum() / n as f64;

    let mut cov = 0.0;
    let mut var_a = 0.0;
    let mut var_b = 0.0;
    for (x, y) in a.iter().zip(b.iter()) {
        let da = x - mean_a;
        let db = y - mean_b;
        cov += da * db;
        var_a += da * da;
        var_b += db * db;
    }

    if var_a == 0.0 || var_b == 0.0 {
        return f64::NAN;
    }
    cov / (var_a * var_b).sqrt()
}

/// Ordered correlations of each predictor with one target.
#[derive(Debug, Clone, PartialEq)]
pub struct CorrelationVector {
    target: String,
    entries: Vec<(String, f64)>,
}

impl CorrelationVector {
    /// Create a vector from `(predictor, correlation)` pairs.
    pub fn new(target: impl Into<String>, entries: Vec<(String, f64)>) -> Self {
        Self {
            target: target.into(),
            entries,
        }
    }

    /// Target the correlations were computed against.
    pub fn target(&self) -> &str {
        &self.target
    }

    /// Number of predictors.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether there are no predictors.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// `(predictor, correlation)` pairs in column order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.entries.iter().map(|(name, rho)| (name.as_str(), *rho))
    }

    /// Predictor names in column order.
    pub fn names(&self) -> Vec<&str> {
        self.entries.iter().map(|(name, _)| name.as_str()).collect()
    }

    /// Correlation for a named predictor.
    pub fn get(&self, name: &str) -> Option<f64> {
        self.entries.iter().find(|(n, _)| n == name).map(|(_, rho)| *rho)
    }

    /// Predictors with `|ρ| > threshold`, order preserved.
    ///
    /// NaN correlations never pass.
    pub fn above(&self, threshold: f64) -> Self {
        let entries = self
            .entries
            .iter()
            .filter(|(_, rho)| rho.abs() > threshold)
            .cloned()
            .collect();
        Self::new(self.target.clone(), entries)
    }
}

/// Correlation of every design column with the target.
pub fn corr_with(design: &Design, target: &Target) -> Result<CorrelationVector, OlsError> {
    if design.nobs() != target.len() {
        return Err(OlsError::DimensionMismatch {
            expected: design.nobs(),
            actual: target.len(),
            context: format!("target '{}'", target.name()),
        });
    }

    let y = target.values().view();
    let entries = design
        .names()
        .iter()
        .zip(design.matrix().columns())
        .map(|(name, column)| (name.clone(), pearson(column, y)))
        .collect();

    Ok(CorrelationVector::new(target.name(), entries))
}

/// Pairwise correlations between design columns.
pub fn correlation_matrix(design: &Design) -> Array2<f64> {
    let k = design.ncols();
    let matrix = design.matrix();
    let mut corr = Array2::<f64>::zeros((k, k));

    for i in 0..k {
        for j in i..k {
            let rho = if i == j {
                let own = pearson(matrix.column(i), matrix.column(i));
                if own.is_nan() { f64::NAN } else { 1.0 }
            } else {
                pearson(matrix.column(i), matrix.column(j))
            };
            corr[[i, j]] = rho;
            corr[[j, i]] = rho;
        }
    }

    corr
}
