//! FEM solvers for the assembled potential problems
//!
//! Both interior problems of the demagnetization solver are symmetric
//! positive definite once their boundary data is imposed, so the iterative
//! path is Conjugate Gradient from the `math-solvers` crate.
//!
//! # Solver Types
//!
//! - **Direct**: dense LU factorization (for small problems and debugging)
//! - **Cg**: unpreconditioned Conjugate Gradient
//! - **CgJacobi**: CG with Jacobi (diagonal) preconditioning (default)

use ndarray::Array1;
use serde::{Deserialize, Serialize};
use solvers::{
    CgConfig, CsrMatrix, DiagonalPreconditioner, IdentityPreconditioner, LuError, lu_solve,
    pcg_with_guess,
};
use std::time::Instant;
use thiserror::Error;

/// Solver configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverConfig {
    /// Solver type to use
    pub solver_type: SolverType,
    /// Relative residual tolerance for iterative solvers
    pub tolerance: f64,
    /// Iteration cap for iterative solvers
    pub max_iterations: usize,
    /// Verbosity level (0 = quiet, 1 = summary, 2+ = per-iteration)
    pub verbosity: usize,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            solver_type: SolverType::CgJacobi,
            tolerance: 1e-10,
            max_iterations: 5000,
            verbosity: 0,
        }
    }
}

impl SolverConfig {
    /// Direct LU configuration
    pub fn direct() -> Self {
        Self {
            solver_type: SolverType::Direct,
            ..Self::default()
        }
    }

    /// Set the solver type
    pub fn with_solver_type(mut self, solver_type: SolverType) -> Self {
        self.solver_type = solver_type;
        self
    }

    /// Set the relative tolerance
    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Set the iteration cap
    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }
}

/// Type of solver to use
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SolverType {
    /// Direct LU factorization (dense, O(n³))
    Direct,
    /// Conjugate Gradient without preconditioning
    Cg,
    /// Conjugate Gradient with Jacobi preconditioning
    CgJacobi,
}

/// Solution result from the solver
#[derive(Debug, Clone)]
pub struct Solution {
    /// Solution vector
    pub values: Array1<f64>,
    /// Number of iterations (0 for direct solver)
    pub iterations: usize,
    /// Final relative residual
    pub residual: f64,
    /// Whether the solver converged
    pub converged: bool,
}

/// Solver errors
#[derive(Debug, Error, Clone, PartialEq)]
pub enum SolverError {
    #[error("Solver failed to converge after {0} iterations (residual: {1})")]
    ConvergenceFailure(usize, f64),
    #[error("Direct solver failed: singular matrix")]
    SingularMatrix,
    #[error("Matrix dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },
}

impl From<LuError> for SolverError {
    fn from(err: LuError) -> Self {
        match err {
            LuError::SingularMatrix => SolverError::SingularMatrix,
            LuError::DimensionMismatch { expected, got } => SolverError::DimensionMismatch {
                expected,
                actual: got,
            },
        }
    }
}

/// Solve a sparse system starting from zero
pub fn solve_csr(
    csr: &CsrMatrix<f64>,
    rhs: &Array1<f64>,
    config: &SolverConfig,
) -> Result<Solution, SolverError> {
    solve_csr_with_guess(csr, rhs, None, config)
}

/// Solve a sparse system with an optional initial guess
///
/// The guess is ignored by the direct solver. Failure to reach the
/// tolerance within `max_iterations` is an error, not a partial result.
pub fn solve_csr_with_guess(
    csr: &CsrMatrix<f64>,
    rhs: &Array1<f64>,
    guess: Option<&Array1<f64>>,
    config: &SolverConfig,
) -> Result<Solution, SolverError> {
    if csr.num_rows != csr.num_cols {
        return Err(SolverError::DimensionMismatch {
            expected: csr.num_rows,
            actual: csr.num_cols,
        });
    }
    if rhs.len() != csr.num_rows {
        return Err(SolverError::DimensionMismatch {
            expected: csr.num_rows,
            actual: rhs.len(),
        });
    }
    if let Some(g) = guess {
        if g.len() != csr.num_rows {
            return Err(SolverError::DimensionMismatch {
                expected: csr.num_rows,
                actual: g.len(),
            });
        }
    }

    if config.verbosity > 1 {
        log::debug!(
            "[FEM] System: {} DOFs, {} nnz, sparsity {:.4}%",
            csr.num_rows,
            csr.nnz(),
            csr.sparsity() * 100.0
        );
    }

    let solve_start = Instant::now();
    let result = match config.solver_type {
        SolverType::Direct => solve_direct(csr, rhs),
        SolverType::Cg => solve_cg(csr, rhs, guess, config, false),
        SolverType::CgJacobi => solve_cg(csr, rhs, guess, config, true),
    };
    let solve_time = solve_start.elapsed();

    if config.verbosity > 0 {
        if let Ok(ref sol) = result {
            log::info!(
                "[FEM] Solve ({:?}): {} iters, residual {:.2e}, time {:.1}ms",
                config.solver_type,
                sol.iterations,
                sol.residual,
                solve_time.as_secs_f64() * 1000.0
            );
        }
    }

    result
}

/// Solve using direct LU factorization
fn solve_direct(csr: &CsrMatrix<f64>, rhs: &Array1<f64>) -> Result<Solution, SolverError> {
    let dense = csr.to_dense();
    let values = lu_solve(&dense, rhs)?;

    let residual_vec = &csr.matvec(&values) - rhs;
    let rhs_norm = rhs.dot(rhs).sqrt();
    let residual = if rhs_norm > 0.0 {
        residual_vec.dot(&residual_vec).sqrt() / rhs_norm
    } else {
        0.0
    };

    Ok(Solution {
        values,
        iterations: 0,
        residual,
        converged: true,
    })
}

/// Solve using (Jacobi-preconditioned) CG
fn solve_cg(
    csr: &CsrMatrix<f64>,
    rhs: &Array1<f64>,
    guess: Option<&Array1<f64>>,
    config: &SolverConfig,
    jacobi: bool,
) -> Result<Solution, SolverError> {
    let cg_config = CgConfig {
        max_iterations: config.max_iterations,
        tolerance: config.tolerance,
        print_interval: if config.verbosity > 1 { 50 } else { 0 },
    };

    let result = if jacobi {
        let precond = DiagonalPreconditioner::from_csr(csr);
        pcg_with_guess(csr, &precond, rhs, guess, &cg_config)
    } else {
        pcg_with_guess(csr, &IdentityPreconditioner, rhs, guess, &cg_config)
    };

    if !result.converged {
        return Err(SolverError::ConvergenceFailure(
            result.iterations,
            result.residual,
        ));
    }

    Ok(Solution {
        values: result.x,
        iterations: result.iterations,
        residual: result.residual,
        converged: true,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn laplacian_1d(n: usize) -> CsrMatrix<f64> {
        let mut triplets = Vec::new();
        for i in 0..n {
            triplets.push((i, i, 2.0));
            if i + 1 < n {
                triplets.push((i, i + 1, -1.0));
                triplets.push((i + 1, i, -1.0));
            }
        }
        CsrMatrix::from_triplets(n, n, triplets)
    }

    #[test]
    fn test_all_solver_types_agree() {
        let a = laplacian_1d(20);
        let b = Array1::from_iter((0..20).map(|i| (i as f64 * 0.3).cos()));

        let reference = solve_csr(&a, &b, &SolverConfig::direct()).unwrap();
        for solver_type in [SolverType::Cg, SolverType::CgJacobi] {
            let config = SolverConfig::default()
                .with_solver_type(solver_type)
                .with_tolerance(1e-12);
            let sol = solve_csr(&a, &b, &config).unwrap();
            assert!(sol.converged);
            for i in 0..20 {
                assert_relative_eq!(sol.values[i], reference.values[i], epsilon = 1e-8);
            }
        }
    }

    #[test]
    fn test_convergence_failure_is_error() {
        let a = laplacian_1d(100);
        let b = Array1::from_elem(100, 1.0);
        let config = SolverConfig::default().with_max_iterations(3);
        assert!(matches!(
            solve_csr(&a, &b, &config),
            Err(SolverError::ConvergenceFailure(3, _))
        ));
    }

    #[test]
    fn test_singular_direct_solve() {
        // Pure Neumann Laplacian: constant vectors span the kernel
        let a = CsrMatrix::from_triplets(
            2,
            2,
            vec![(0, 0, 1.0), (0, 1, -1.0), (1, 0, -1.0), (1, 1, 1.0)],
        );
        let b = Array1::from_vec(vec![1.0, -1.0]);
        assert_eq!(
            solve_csr(&a, &b, &SolverConfig::direct()).unwrap_err(),
            SolverError::SingularMatrix
        );
    }

    #[test]
    fn test_dimension_mismatch() {
        let a = laplacian_1d(4);
        let b = Array1::zeros(3);
        assert_eq!(
            solve_csr(&a, &b, &SolverConfig::default()).unwrap_err(),
            SolverError::DimensionMismatch {
                expected: 4,
                actual: 3
            }
        );
    }

    #[test]
    fn test_config_defaults_from_partial_json() {
        let config: SolverConfig = serde_json::from_str(r#"{"solver_type":"cg"}"#).unwrap();
        assert_eq!(config.solver_type, SolverType::Cg);
        assert_eq!(config.max_iterations, SolverConfig::default().max_iterations);
    }
}
