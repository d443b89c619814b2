//! Linear solvers for the FEM-BEM demagnetization workspace
//!
//! This crate provides the sparse and dense linear algebra used by the interior
//! potential solves: a CSR matrix, a preconditioned Conjugate Gradient solver,
//! a Jacobi preconditioner and a dense LU factorization.
//!
//! # Features
//!
//! - **Iterative Solvers**: CG / preconditioned CG with optional initial guess
//! - **Direct Solvers**: LU decomposition with partial pivoting
//! - **Preconditioners**: Identity, Jacobi (diagonal)
//! - **Sparse Matrices**: CSR format with (optionally parallel) matrix-vector products
//! - **Generic Scalar Types**: Works with f64 and f32
//!
//! # Example
//!
//! ```ignore
//! use math_magnetics_solvers::{CsrMatrix, CgConfig, DiagonalPreconditioner, pcg};
//!
//! let matrix = CsrMatrix::from_triplets(n, n, triplets);
//! let precond = DiagonalPreconditioner::from_csr(&matrix);
//! let solution = pcg(&matrix, &precond, &rhs, &CgConfig::default());
//! ```

pub mod direct;
pub mod iterative;
pub mod parallel;
pub mod preconditioners;
pub mod sparse;
pub mod traits;

// Re-export main types
pub use sparse::CsrMatrix;
pub use traits::{LinearOperator, Preconditioner, RealField};

// Re-export iterative solvers
pub use iterative::{CgConfig, CgSolution, cg, pcg, pcg_with_guess};

// Re-export direct solvers
pub use direct::{LuError, LuFactorization, lu_factorize, lu_solve};

// Re-export preconditioners
pub use preconditioners::{DiagonalPreconditioner, IdentityPreconditioner};
