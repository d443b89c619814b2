//! Preconditioners for iterative solvers
//!
//! Preconditioners approximate A^(-1) to accelerate convergence of iterative methods.
//!
//! # Available Preconditioners
//!
//! - **IdentityPreconditioner**: No preconditioning
//! - **DiagonalPreconditioner** (Jacobi): Simple diagonal scaling, fully parallel

mod diagonal;

pub use diagonal::DiagonalPreconditioner;

// Re-export IdentityPreconditioner from traits
pub use crate::traits::IdentityPreconditioner;
