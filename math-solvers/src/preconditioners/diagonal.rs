//! Diagonal (Jacobi) preconditioner
//!
//! Scales by the inverse diagonal of A. For P1 stiffness matrices on graded
//! meshes this removes most of the element-size dependence of the spectrum.

use crate::sparse::CsrMatrix;
use crate::traits::{Preconditioner, RealField};
use ndarray::Array1;

/// Diagonal (Jacobi) preconditioner
///
/// M = diag(A), so M^(-1) scales each component by 1/A_ii
#[derive(Debug, Clone)]
pub struct DiagonalPreconditioner<T: RealField> {
    /// Inverse diagonal elements
    inv_diag: Array1<T>,
}

impl<T: RealField> DiagonalPreconditioner<T> {
    /// Create a diagonal preconditioner from a CSR matrix
    pub fn from_csr(matrix: &CsrMatrix<T>) -> Self {
        Self::from_diagonal(&matrix.diagonal())
    }

    /// Create from a diagonal vector directly
    ///
    /// Vanishing diagonal entries are left unscaled.
    pub fn from_diagonal(diag: &Array1<T>) -> Self {
        let tiny = T::from_real(1e-30);
        let inv_diag = diag.mapv(|d| if d.abs() > tiny { d.recip() } else { T::one() });
        Self { inv_diag }
    }
}

impl<T: RealField> Preconditioner<T> for DiagonalPreconditioner<T> {
    fn apply(&self, r: &Array1<T>) -> Array1<T> {
        r * &self.inv_diag
    }
}
