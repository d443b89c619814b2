//! Core traits for linear algebra operations
//!
//! This module defines the fundamental abstractions used throughout the solver library:
//! - [`RealField`]: Trait for real scalar types
//! - [`LinearOperator`]: Trait for matrix-like objects that can perform matrix-vector products
//! - [`Preconditioner`]: Trait for preconditioning operations

use ndarray::{Array1, Array2};
use num_traits::{Float, FromPrimitive, NumAssign, ToPrimitive};
use std::fmt::Debug;

/// Trait for scalar types that can be used in linear algebra operations.
///
/// The potential problems solved in this workspace are real-valued, so the
/// trait is a thin layer over [`num_traits::Float`] with the extra bounds the
/// parallel kernels need.
///
/// # Implementations
///
/// Provided for:
/// - `f64` (default everywhere)
/// - `f32` (for memory-constrained applications)
pub trait RealField:
    Float + NumAssign + FromPrimitive + ToPrimitive + Send + Sync + Debug + 'static
{
    /// Convert an `f64` constant into this type
    fn from_real(r: f64) -> Self;
}

impl RealField for f64 {
    #[inline]
    fn from_real(r: f64) -> Self {
        r
    }
}

impl RealField for f32 {
    #[inline]
    fn from_real(r: f64) -> Self {
        r as f32
    }
}

/// Trait for linear operators (matrices) that can perform matrix-vector products.
///
/// This abstraction allows solvers to work with dense and sparse matrices
/// interchangeably.
pub trait LinearOperator<T: RealField>: Send + Sync {
    /// Number of rows in the operator
    fn num_rows(&self) -> usize;

    /// Number of columns in the operator
    fn num_cols(&self) -> usize;

    /// Apply the operator: y = A * x
    fn apply(&self, x: &Array1<T>) -> Array1<T>;
}

impl<T: RealField> LinearOperator<T> for Array2<T> {
    fn num_rows(&self) -> usize {
        self.nrows()
    }

    fn num_cols(&self) -> usize {
        self.ncols()
    }

    fn apply(&self, x: &Array1<T>) -> Array1<T> {
        self.dot(x)
    }
}

/// Trait for preconditioners used in iterative solvers.
///
/// A preconditioner M approximates A^(-1), so that M*A is better conditioned
/// than A alone. This accelerates convergence of iterative methods.
pub trait Preconditioner<T: RealField>: Send + Sync {
    /// Apply the preconditioner: y = M * r
    ///
    /// This should approximate solving A * y = r
    fn apply(&self, r: &Array1<T>) -> Array1<T>;
}

/// Identity preconditioner (no preconditioning)
#[derive(Clone, Debug, Default)]
pub struct IdentityPreconditioner;

impl<T: RealField> Preconditioner<T> for IdentityPreconditioner {
    fn apply(&self, r: &Array1<T>) -> Array1<T> {
        r.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::array;

    #[test]
    fn test_f64_field() {
        assert_relative_eq!(<f64 as RealField>::from_real(2.5), 2.5);
    }

    #[test]
    fn test_f32_field() {
        assert_relative_eq!(<f32 as RealField>::from_real(0.25), 0.25_f32);
    }

    #[test]
    fn test_dense_operator() {
        let a = array![[2.0_f64, 1.0], [0.0, 3.0]];
        let y = LinearOperator::apply(&a, &array![1.0, 2.0]);
        assert_relative_eq!(y[0], 4.0);
        assert_relative_eq!(y[1], 6.0);
        assert_eq!(LinearOperator::<f64>::num_cols(&a), 2);
    }

    #[test]
    fn test_identity_preconditioner() {
        let precond = IdentityPreconditioner;
        let r = array![1.0_f64, 2.0, 3.0];
        let y = precond.apply(&r);
        assert_eq!(r, y);
    }
}
