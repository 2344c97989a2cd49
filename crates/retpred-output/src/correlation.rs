//! Correlation tables.

use crate::TABLE_WIDTH;
use crate::format::{number, truncated};
use ndarray::Array2;
use retpred_ols::CorrelationVector;
use std::fmt;

/// Correlations of predictors with the target, optionally screened.
#[derive(Debug, Clone, PartialEq)]
pub struct CorrelationTable {
    /// Target variable
    pub target: String,
    /// Screening threshold on `|ρ|`, if one was applied
    pub threshold: Option<f64>,
    /// `(predictor, ρ)` in column order
    pub rows: Vec<(String, f64)>,
}

impl CorrelationTable {
    /// Table for a correlation vector.
    pub fn new(correlations: &CorrelationVector, threshold: Option<f64>) -> Self {
        Self {
            target: correlations.target().to_string(),
            threshold,
            rows: correlations
                .iter()
                .map(|(name, rho)| (name.to_string(), rho))
                .collect(),
        }
    }

    /// Predictors passing the threshold; all of them when there is none.
    pub fn retained(&self) -> Vec<&str> {
        self.rows
            .iter()
            .filter(|(_, rho)| self.threshold.is_none_or(|t| rho.abs() > t))
            .map(|(name, _)| name.as_str())
            .collect()
    }

    /// Format as ASCII table for terminal display.
    pub fn to_ascii_table(&self) -> String {
        let mut output = String::new();

        match self.threshold {
            Some(t) => output.push_str(&format!(
                "Correlation with {} (retain |rho| > {})\n",
                self.target, t
            )),
            None => output.push_str(&format!("Correlation with {}\n", self.target)),
        }
        output.push_str(&"-".repeat(TABLE_WIDTH));
        output.push('\n');
        output.push_str(&format!(
            "{:<20} {:>12} {:>12} {:>10}\n",
            "Predictor", "rho", "|rho|", "Retained"
        ));
        output.push_str(&"-".repeat(TABLE_WIDTH));
        output.push('\n');

        for (name, rho) in &self.rows {
            let retained = match self.threshold {
                Some(t) if rho.abs() > t => "yes",
                Some(_) => "no",
                None => "",
            };
            output.push_str(&format!(
                "{:<20} {:>12} {:>12} {:>10}\n",
                truncated(name, 20),
                number(*rho, 4),
                number(rho.abs(), 4),
                retained
            ));
        }

        if self.threshold.is_some() {
            output.push_str(&format!(
                "{} of {} predictors retained\n",
                self.retained().len(),
                self.rows.len()
            ));
        }

        output
    }
}

impl fmt::Display for CorrelationTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_ascii_table())
    }
}

/// Pairwise correlation matrix among predictors.
#[derive(Debug, Clone, PartialEq)]
pub struct CorrelationMatrixTable {
    /// Predictor names, one per row and column
    pub names: Vec<String>,
    /// Symmetric correlation matrix
    pub matrix: Array2<f64>,
}

impl CorrelationMatrixTable {
    /// Table for a named square matrix.
    pub fn new(names: Vec<String>, matrix: Array2<f64>) -> Self {
        Self { names, matrix }
    }

    /// Largest `|ρ|` between two distinct predictors, with their names.
    pub fn strongest_pair(&self) -> Option<(&str, &str, f64)> {
        let k = self.names.len();
        let mut best: Option<(&str, &str, f64)> = None;
        for i in 0..k {
            for j in (i + 1)..k {
                let rho = self.matrix[[i, j]];
                if rho.is_nan() {
                    continue;
                }
                if best.is_none_or(|(_, _, b)| rho.abs() > b.abs()) {
                    best = Some((&self.names[i], &self.names[j], rho));
                }
            }
        }
        best
    }

    /// Format as ASCII table for terminal display.
    pub fn to_ascii_table(&self) -> String {
        const CELL: usize = 9;
        let mut output = String::new();

        output.push_str(&format!("{:<12}", ""));
        for name in &self.names {
            output.push_str(&format!(" {:>CELL$}", truncated(name, CELL)));
        }
        output.push('\n');
        output.push_str(&"-".repeat(12 + self.names.len() * (CELL + 1)));
        output.push('\n');

        for (i, name) in self.names.iter().enumerate() {
            output.push_str(&format!("{:<12}", truncated(name, 12)));
            for j in 0..self.names.len() {
                output.push_str(&format!(" {:>CELL$}", number(self.matrix[[i, j]], 3)));
            }
            output.push('\n');
        }

        if let Some((a, b, rho)) = self.strongest_pair() {
            output.push_str(&format!("Strongest pair: {a} / {b} (rho = {})\n", number(rho, 3)));
        }

        output
    }
}

impl fmt::Display for CorrelationMatrixTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_ascii_table())
    }
}
