//! Named design matrices and regression targets.

use crate::error::OlsError;
use ndarray::{Array1, Array2, ArrayView1, Axis};
use retpred_data::PredictorPanel;
use std::collections::HashSet;

/// Name given to the column added by [`add_constant`].
pub const CONSTANT_NAME: &str = "const";

/// Regressor matrix with one name per column.
///
/// Observations are rows. Missing panel values become NaN here; the
/// estimator rejects them, so callers drop incomplete rows first.
#[derive(Debug, Clone, PartialEq)]
pub struct Design {
    names: Vec<String>,
    matrix: Array2<f64>,
}

impl Design {
    /// Create a design from column names and an `n × k` matrix.
    pub fn new(names: Vec<String>, matrix: Array2<f64>) -> Result<Self, OlsError> {
        if names.len() != matrix.ncols() {
            return Err(OlsError::DimensionMismatch {
                expected: matrix.ncols(),
                actual: names.len(),
                context: "design column names".to_string(),
            });
        }
        let mut seen = HashSet::with_capacity(names.len());
        for name in &names {
            if !seen.insert(name.as_str()) {
                return Err(OlsError::DuplicateColumn(name.clone()));
            }
        }
        Ok(Self { names, matrix })
    }

    /// Build a design from panel columns, in the given order.
    pub fn from_panel<S: AsRef<str>>(panel: &PredictorPanel, columns: &[S]) -> Result<Self, OlsError> {
        let n = panel.height();
        let mut matrix = Array2::<f64>::zeros((n, columns.len()));
        let mut names = Vec::with_capacity(columns.len());

        for (j, column) in columns.iter().enumerate() {
            let column = column.as_ref();
            let values = panel.values(column)?;
            for (i, value) in values.into_iter().enumerate() {
                matrix[[i, j]] = value.unwrap_or(f64::NAN);
            }
            names.push(column.to_string());
        }

        Self::new(names, matrix)
    }

    /// Column names.
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// The `n × k` matrix.
    pub const fn matrix(&self) -> &Array2<f64> {
        &self.matrix
    }

    /// Number of observations.
    pub fn nobs(&self) -> usize {
        self.matrix.nrows()
    }

    /// Number of regressors.
    pub fn ncols(&self) -> usize {
        self.matrix.ncols()
    }

    /// Position of a named column.
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.names.iter().position(|n| n == name)
    }

    /// View of a named column.
    pub fn column(&self, name: &str) -> Option<ArrayView1<'_, f64>> {
        self.index_of(name).map(|j| self.matrix.column(j))
    }

    /// Sub-design holding the named columns, in the given order.
    pub fn select<S: AsRef<str>>(&self, names: &[S]) -> Result<Self, OlsError> {
        let mut indices = Vec::with_capacity(names.len());
        for name in names {
            let name = name.as_ref();
            let index = self
                .index_of(name)
                .ok_or_else(|| OlsError::MissingColumn(name.to_string()))?;
            indices.push(index);
        }

        let matrix = self.matrix.select(Axis(1), &indices);
        let names = indices.iter().map(|&j| self.names[j].clone()).collect();
        Self::new(names, matrix)
    }

    /// Index of a constant column, if any.
    ///
    /// A column counts as constant when it is finite, non-zero and identical
    /// on every row.
    pub fn constant_index(&self) -> Option<usize> {
        (0..self.ncols()).find(|&j| is_constant(self.matrix.column(j)))
    }

    /// Whether the design holds a constant column.
    pub fn has_constant(&self) -> bool {
        self.constant_index().is_some()
    }

    /// Prepend a column of ones named `name`.
    pub fn with_intercept(&self, name: &str) -> Result<Self, OlsError> {
        let n = self.nobs();
        let mut matrix = Array2::<f64>::ones((n, self.ncols() + 1));
        matrix.slice_mut(ndarray::s![.., 1..]).assign(&self.matrix);

        let mut names = Vec::with_capacity(self.names.len() + 1);
        names.push(name.to_string());
        names.extend(self.names.iter().cloned());
        Self::new(names, matrix)
    }

    /// Index of the first column holding a non-finite value.
    pub fn first_non_finite(&self) -> Option<usize> {
        (0..self.ncols()).find(|&j| self.matrix.column(j).iter().any(|v| !v.is_finite()))
    }
}

/// Prepend a `const` column of ones unless a constant column already exists.
pub fn add_constant(design: &Design) -> Result<Design, OlsError> {
    if design.has_constant() {
        return Ok(design.clone());
    }
    design.with_intercept(CONSTANT_NAME)
}

/// Named dependent variable.
#[derive(Debug, Clone, PartialEq)]
pub struct Target {
    name: String,
    values: Array1<f64>,
}

impl Target {
    /// Create a target from a name and values.
    pub fn new(name: impl Into<String>, values: Array1<f64>) -> Self {
        Self {
            name: name.into(),
            values,
        }
    }

    /// Read a target column from a panel, nulls as NaN.
    pub fn from_panel(panel: &PredictorPanel, column: &str) -> Result<Self, OlsError> {
        let values = panel
            .values(column)?
            .into_iter()
            .map(|v| v.unwrap_or(f64::NAN))
            .collect();
        Ok(Self::new(column, values))
    }

    /// Variable name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Observations.
    pub const fn values(&self) -> &Array1<f64> {
        &self.values
    }

    /// Number of observations.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether the target has no observations.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

fn is_constant(column: ArrayView1<'_, f64>) -> bool {
    let Some(&first) = column.first() else {
        return false;
    };
    first.is_finite() && first != 0.0 && column.iter().all(|&v| v == first)
}
