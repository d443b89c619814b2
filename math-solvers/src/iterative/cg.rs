//! CG (Conjugate Gradient) solver
//!
//! The preconditioned Conjugate Gradient method for symmetric positive definite
//! systems. Both interior potential problems (Poisson with a pinned node and
//! Laplace with Dirichlet elimination) produce SPD matrices, so CG is the
//! default iterative method.

use crate::traits::{IdentityPreconditioner, LinearOperator, Preconditioner, RealField};
use ndarray::{Array1, Zip};

/// CG solver configuration
#[derive(Debug, Clone)]
pub struct CgConfig<R> {
    /// Maximum number of iterations
    pub max_iterations: usize,
    /// Relative tolerance for convergence
    pub tolerance: R,
    /// Print progress every N iterations (0 = no output)
    pub print_interval: usize,
}

impl Default for CgConfig<f64> {
    fn default() -> Self {
        Self {
            max_iterations: 1000,
            tolerance: 1e-6,
            print_interval: 0,
        }
    }
}

/// CG solver result
#[derive(Debug, Clone)]
pub struct CgSolution<T: RealField> {
    /// Solution vector
    pub x: Array1<T>,
    /// Number of iterations
    pub iterations: usize,
    /// Final relative residual
    pub residual: T,
    /// Whether convergence was achieved
    pub converged: bool,
}

/// Solve Ax = b using the Conjugate Gradient method
///
/// Note: This method is only correct for symmetric positive definite matrices.
pub fn cg<T, A>(operator: &A, b: &Array1<T>, config: &CgConfig<T>) -> CgSolution<T>
where
    T: RealField,
    A: LinearOperator<T>,
{
    pcg_with_guess(operator, &IdentityPreconditioner, b, None, config)
}

/// Solve Ax = b using preconditioned CG starting from zero
pub fn pcg<T, A, P>(
    operator: &A,
    precond: &P,
    b: &Array1<T>,
    config: &CgConfig<T>,
) -> CgSolution<T>
where
    T: RealField,
    A: LinearOperator<T>,
    P: Preconditioner<T>,
{
    pcg_with_guess(operator, precond, b, None, config)
}

/// Solve Ax = b using preconditioned CG with an optional initial guess
///
/// A warm start from the previous time step's potential typically saves most
/// of the iterations when the magnetization changes slowly.
pub fn pcg_with_guess<T, A, P>(
    operator: &A,
    precond: &P,
    b: &Array1<T>,
    x0: Option<&Array1<T>>,
    config: &CgConfig<T>,
) -> CgSolution<T>
where
    T: RealField,
    A: LinearOperator<T>,
    P: Preconditioner<T>,
{
    let n = b.len();
    let b_norm = vector_norm(b);
    let breakdown = T::min_positive_value();
    if b_norm < breakdown {
        return CgSolution {
            x: Array1::from_elem(n, T::zero()),
            iterations: 0,
            residual: T::zero(),
            converged: true,
        };
    }

    let mut x = match x0 {
        Some(guess) => guess.clone(),
        None => Array1::from_elem(n, T::zero()),
    };

    // r = b - Ax
    let mut r = if x0.is_some() {
        b - &operator.apply(&x)
    } else {
        b.clone()
    };

    let mut rel_residual = vector_norm(&r) / b_norm;
    if rel_residual < config.tolerance {
        return CgSolution {
            x,
            iterations: 0,
            residual: rel_residual,
            converged: true,
        };
    }

    let mut z = precond.apply(&r);
    let mut p = z.clone();
    let mut rz = inner_product(&r, &z);

    for iter in 0..config.max_iterations {
        // q = A * p
        let q = operator.apply(&p);

        let pq = inner_product(&p, &q);
        if pq.abs() < breakdown {
            return CgSolution {
                x,
                iterations: iter,
                residual: rel_residual,
                converged: false,
            };
        }

        let alpha = rz / pq;

        // x += alpha * p, r -= alpha * q
        Zip::from(&mut x).and(&p).for_each(|xi, &pi| *xi += alpha * pi);
        Zip::from(&mut r).and(&q).for_each(|ri, &qi| *ri -= alpha * qi);

        rel_residual = vector_norm(&r) / b_norm;

        if config.print_interval > 0 && (iter + 1) % config.print_interval == 0 {
            log::info!(
                "CG iteration {}: relative residual = {:.6e}",
                iter + 1,
                rel_residual.to_f64().unwrap_or(0.0)
            );
        }

        if rel_residual < config.tolerance {
            return CgSolution {
                x,
                iterations: iter + 1,
                residual: rel_residual,
                converged: true,
            };
        }

        z = precond.apply(&r);
        let rz_new = inner_product(&r, &z);
        if rz.abs() < breakdown {
            return CgSolution {
                x,
                iterations: iter + 1,
                residual: rel_residual,
                converged: false,
            };
        }

        let beta = rz_new / rz;
        rz = rz_new;

        // p = z + beta * p
        Zip::from(&mut p).and(&z).for_each(|pi, &zi| *pi = zi + beta * *pi);
    }

    CgSolution {
        x,
        iterations: config.max_iterations,
        residual: rel_residual,
        converged: false,
    }
}

#[inline]
fn inner_product<T: RealField>(x: &Array1<T>, y: &Array1<T>) -> T {
    x.iter()
        .zip(y.iter())
        .fold(T::zero(), |acc, (&xi, &yi)| acc + xi * yi)
}

#[inline]
fn vector_norm<T: RealField>(x: &Array1<T>) -> T {
    inner_product(x, x).sqrt()
}
