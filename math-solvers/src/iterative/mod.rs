//! Iterative solvers for linear systems
//!
//! This module provides Krylov subspace methods for the sparse interior systems:
//! - [`cg`]: Conjugate Gradient - for symmetric positive definite systems
//! - [`pcg`] / [`pcg_with_guess`]: preconditioned CG, optionally warm-started

mod cg;

pub use cg::{CgConfig, CgSolution, cg, pcg, pcg_with_guess};
