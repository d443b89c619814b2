//! Dense LU factorization with partial pivoting
//!
//! The direct path of the interior solves: small meshes and reference
//! solutions in tests. Row exchanges are kept as a permutation so the
//! factors can be reused for several right-hand sides.

use crate::traits::RealField;
use ndarray::{Array1, Array2, Axis, Zip, s};
use thiserror::Error;

/// Errors that can occur during LU factorization
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LuError {
    /// A pivot vanished during elimination
    #[error("Matrix is singular or nearly singular")]
    SingularMatrix,
    /// The matrix is not square or the right-hand side has the wrong length
    #[error("Matrix dimensions mismatch: expected {expected}, got {got}")]
    DimensionMismatch {
        /// Expected length
        expected: usize,
        /// Actual length
        got: usize,
    },
}

/// Factors `P·A = L·U` of a square matrix
///
/// `L` is unit lower triangular and shares storage with `U`.
#[derive(Debug, Clone)]
pub struct LuFactorization<T: RealField> {
    factors: Array2<T>,
    /// `permutation[i]` is the row of `A` that ended up in row `i`
    permutation: Vec<usize>,
}

impl<T: RealField> LuFactorization<T> {
    /// Matrix dimension
    pub fn dim(&self) -> usize {
        self.permutation.len()
    }

    /// Solve `A·x = b`
    pub fn solve(&self, b: &Array1<T>) -> Result<Array1<T>, LuError> {
        let n = self.dim();
        if b.len() != n {
            return Err(LuError::DimensionMismatch {
                expected: n,
                got: b.len(),
            });
        }

        let mut x: Array1<T> = self.permutation.iter().map(|&row| b[row]).collect();

        // L·y = P·b
        for i in 1..n {
            let dot = self.factors.slice(s![i, ..i]).dot(&x.slice(s![..i]));
            x[i] -= dot;
        }

        // U·x = y
        for i in (0..n).rev() {
            let dot = self
                .factors
                .slice(s![i, i + 1..])
                .dot(&x.slice(s![i + 1..]));
            x[i] = (x[i] - dot) / self.factors[[i, i]];
        }

        Ok(x)
    }
}

/// Factorize a square matrix
///
/// A pivot is treated as zero when it falls below `n·ε·max|a_ij|`.
pub fn lu_factorize<T: RealField>(a: &Array2<T>) -> Result<LuFactorization<T>, LuError> {
    let n = a.nrows();
    if n != a.ncols() {
        return Err(LuError::DimensionMismatch {
            expected: n,
            got: a.ncols(),
        });
    }

    let scale = a.iter().fold(T::zero(), |m, v| m.max(v.abs()));
    let threshold = scale * T::epsilon() * T::from_real(n.max(1) as f64);

    let mut factors = a.clone();
    let mut permutation: Vec<usize> = (0..n).collect();

    for k in 0..n {
        let (offset, pivot_abs) = factors
            .slice(s![k.., k])
            .iter()
            .enumerate()
            .fold((0, T::zero()), |best, (i, v)| {
                if v.abs() > best.1 {
                    (i, v.abs())
                } else {
                    best
                }
            });
        if pivot_abs <= threshold {
            return Err(LuError::SingularMatrix);
        }

        let p = k + offset;
        if p != k {
            let (mut upper, mut lower) = factors.view_mut().split_at(Axis(0), p);
            Zip::from(upper.row_mut(k))
                .and(lower.row_mut(0))
                .for_each(std::mem::swap);
            permutation.swap(k, p);
        }

        let pivot = factors[[k, k]];
        let pivot_row = factors.slice(s![k, k + 1..]).to_owned();
        for i in k + 1..n {
            let multiplier = factors[[i, k]] / pivot;
            factors[[i, k]] = multiplier;
            factors
                .slice_mut(s![i, k + 1..])
                .scaled_add(-multiplier, &pivot_row);
        }
    }

    Ok(LuFactorization {
        factors,
        permutation,
    })
}

/// Solve `A·x = b` with a one-off factorization
pub fn lu_solve<T: RealField>(a: &Array2<T>, b: &Array1<T>) -> Result<Array1<T>, LuError> {
    lu_factorize(a)?.solve(b)
}
