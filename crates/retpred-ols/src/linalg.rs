//! Dense linear algebra for least squares.
//!
//! Small, self-contained routines on `ndarray` matrices: a Householder QR
//! least-squares solver, a Cholesky inverse for symmetric positive definite
//! matrices, and a Jacobi eigendecomposition used for condition numbers.
//! Design matrices here have a handful of columns, so clarity wins over
//! blocking or LAPACK bindings.

use ndarray::{Array1, Array2, s};
use thiserror::Error;

/// Relative tolerance below which a pivot counts as zero.
pub const RANK_TOLERANCE: f64 = 1e-10;

/// A matrix turned out to be singular at the given column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("matrix is singular at column {index}")]
pub struct SingularMatrix {
    /// Zero-based column where a zero pivot was found
    pub index: usize,
}

/// Solution of a full-rank least-squares problem.
#[derive(Debug, Clone)]
pub struct LeastSquares {
    /// Coefficients minimizing `||y - Xb||²`
    pub coefficients: Array1<f64>,
    /// `(X'X)⁻¹`, the unscaled parameter covariance
    pub normalized_cov: Array2<f64>,
}

/// Solve `min ||y - Xb||²` via Householder QR.
///
/// Column `j` is rejected as dependent when the part of it orthogonal to
/// columns `0..j` has norm below `RANK_TOLERANCE` times its own norm.
pub fn least_squares(x: &Array2<f64>, y: &Array1<f64>) -> Result<LeastSquares, SingularMatrix> {
    let (n, k) = x.dim();
    let column_norms: Vec<f64> = x.columns().into_iter().map(|c| c.dot(&c).sqrt()).collect();

    let mut a = x.clone();
    let mut b = y.clone();

    for j in 0..k {
        if j >= n {
            return Err(SingularMatrix { index: j });
        }

        let tail_norm = {
            let tail = a.slice(s![j.., j]);
            tail.dot(&tail).sqrt()
        };
        if tail_norm <= RANK_TOLERANCE * column_norms[j] {
            return Err(SingularMatrix { index: j });
        }

        let alpha = if a[[j, j]] > 0.0 { -tail_norm } else { tail_norm };
        let mut v = a.slice(s![j.., j]).to_owned();
        v[0] -= alpha;
        let v_norm_sq = v.dot(&v);

        for c in j..k {
            let mut column = a.slice_mut(s![j.., c]);
            let factor = 2.0 * v.dot(&column) / v_norm_sq;
            column.scaled_add(-factor, &v);
        }
        let mut tail = b.slice_mut(s![j..]);
        let factor = 2.0 * v.dot(&tail) / v_norm_sq;
        tail.scaled_add(-factor, &v);
    }

    let r = a.slice(s![..k, ..k]).to_owned();
    let r_inv = upper_triangular_inverse(&r)?;
    let coefficients = r_inv.dot(&b.slice(s![..k]));
    let normalized_cov = r_inv.dot(&r_inv.t());

    Ok(LeastSquares {
        coefficients,
        normalized_cov,
    })
}

/// Inverse of an upper triangular matrix by back substitution.
pub fn upper_triangular_inverse(r: &Array2<f64>) -> Result<Array2<f64>, SingularMatrix> {
    let k = r.nrows();
    let mut inv = Array2::<f64>::zeros((k, k));

    for col in 0..k {
        for row in (0..=col).rev() {
            let diag = r[[row, row]];
            if diag == 0.0 {
                return Err(SingularMatrix { index: row });
            }
            let rhs = if row == col { 1.0 } else { 0.0 };
            let mut sum = rhs;
            for m in (row + 1)..=col {
                sum -= r[[row, m]] * inv[[m, col]];
            }
            inv[[row, col]] = sum / diag;
        }
    }

    Ok(inv)
}

/// Lower Cholesky factor `L` with `A = LL'`.
pub fn cholesky(matrix: &Array2<f64>) -> Result<Array2<f64>, SingularMatrix> {
    let n = matrix.nrows();
    let mut l = Array2::<f64>::zeros((n, n));

    for j in 0..n {
        let mut diag = matrix[[j, j]];
        for m in 0..j {
            diag -= l[[j, m]] * l[[j, m]];
        }
        if diag.is_nan() || diag <= RANK_TOLERANCE * matrix[[j, j]].abs() {
            return Err(SingularMatrix { index: j });
        }
        let pivot = diag.sqrt();
        l[[j, j]] = pivot;

        for i in (j + 1)..n {
            let mut sum = matrix[[i, j]];
            for m in 0..j {
                sum -= l[[i, m]] * l[[j, m]];
            }
            l[[i, j]] = sum / pivot;
        }
    }

    Ok(l)
}

/// Inverse of a symmetric positive definite matrix.
pub fn spd_inverse(matrix: &Array2<f64>) -> Result<Array2<f64>, SingularMatrix> {
    let l = cholesky(matrix)?;
    // L' is upper triangular, so A⁻¹ = (L')⁻¹ (L')⁻ᵀ
    let lt_inv = upper_triangular_inverse(&l.t().to_owned())?;
    Ok(lt_inv.dot(&lt_inv.t()))
}

/// Eigenvalues and eigenvectors of a symmetric matrix.
#[derive(Debug, Clone)]
pub struct EigenDecomposition {
    /// Eigenvalues, descending
    pub eigenvalues: Array1<f64>,
    /// Eigenvectors as columns, matching `eigenvalues`
    pub eigenvectors: Array2<f64>,
}

/// Jacobi eigenvalue decomposition for symmetric matrices.
///
/// Repeatedly annihilates the largest off-diagonal entry until it falls
/// below `tolerance` or `max_rotations` is reached.
pub fn jacobi_eigendecomp(
    matrix: &Array2<f64>,
    max_rotations: usize,
    tolerance: f64,
) -> EigenDecomposition {
    let n = matrix.nrows();
    let mut a = matrix.clone();
    let mut v = Array2::<f64>::eye(n);

    for _ in 0..max_rotations {
        let Some((p, q)) = largest_off_diagonal(&a) else {
            break;
        };
        if a[[p, q]].abs() < tolerance {
            break;
        }
        let (cos, sin) = rotation(a[[p, p]], a[[q, q]], a[[p, q]]);
        rotate(&mut a, &mut v, p, q, cos, sin);
    }

    let mut order: Vec<usize> = (0..n).collect();
    order.sort_by(|&i, &j| a[[j, j]].total_cmp(&a[[i, i]]));

    let eigenvalues = order.iter().map(|&i| a[[i, i]]).collect();
    let mut eigenvectors = Array2::<f64>::zeros((n, n));
    for (target, &source) in order.iter().enumerate() {
        eigenvectors.column_mut(target).assign(&v.column(source));
    }

    EigenDecomposition {
        eigenvalues,
        eigenvectors,
    }
}

/// Condition number of a design matrix.
///
/// `sqrt(λmax / λmin)` of `X'X`, i.e. the ratio of the extreme singular
/// values of `X`. Infinite when `X'X` is numerically singular.
pub fn condition_number(x: &Array2<f64>) -> f64 {
    let xtx = x.t().dot(x);
    let k = xtx.nrows();
    if k == 0 {
        return f64::NAN;
    }

    // Off-diagonals are judged relative to the matrix scale
    let scale = xtx.diag().iter().fold(0.0_f64, |acc, v| acc.max(v.abs()));
    let decomp = jacobi_eigendecomp(&xtx, 100 * k * k, 1e-15 * scale.max(f64::MIN_POSITIVE));

    let max_eig = decomp.eigenvalues[0];
    let min_eig = decomp.eigenvalues[k - 1];
    if min_eig <= 0.0 {
        f64::INFINITY
    } else {
        (max_eig / min_eig).sqrt()
    }
}

fn largest_off_diagonal(matrix: &Array2<f64>) -> Option<(usize, usize)> {
    let n = matrix.nrows();
    let mut best = None;
    let mut max_val = -1.0;

    for i in 0..n {
        for j in (i + 1)..n {
            let val = matrix[[i, j]].abs();
            if val > max_val {
                max_val = val;
                best = Some((i, j));
            }
        }
    }

    best
}

fn rotation(app: f64, aqq: f64, apq: f64) -> (f64, f64) {
    if apq == 0.0 {
        return (1.0, 0.0);
    }

    let tau = (aqq - app) / (2.0 * apq);
    let t = if tau >= 0.0 {
        1.0 / (tau + (1.0 + tau * tau).sqrt())
    } else {
        -1.0 / (-tau + (1.0 + tau * tau).sqrt())
    };

    let cos = 1.0 / (1.0 + t * t).sqrt();
    (cos, t * cos)
}

fn rotate(a: &mut Array2<f64>, v: &mut Array2<f64>, p: usize, q: usize, cos: f64, sin: f64) {
    let n = a.nrows();
    let app = a[[p, p]];
    let aqq = a[[q, q]];
    let apq = a[[p, q]];

    a[[p, p]] = cos * cos * app - 2.0 * cos * sin * apq + sin * sin * aqq;
    a[[q, q]] = sin * sin * app + 2.0 * cos * sin * apq + cos * cos * aqq;
    a[[p, q]] = 0.0;
    a[[q, p]] = 0.0;

    for i in 0..n {
        if i != p && i != q {
            let aip = a[[i, p]];
            let aiq = a[[i, q]];
            a[[i, p]] = cos * aip - sin * aiq;
            a[[p, i]] = a[[i, p]];
            a[[i, q]] = sin * aip + cos * aiq;
            a[[q, i]] = a[[i, q]];
        }
    }

    for i in 0..n {
        let vip = v[[i, p]];
        let viq = v[[i, q]];
        v[[i, p]] = cos * vip - sin * viq;
        v[[i, q]] = sin * vip + cos * viq;
    }
}
