//! Error types for the demagnetization solver

use fem::boundary::BoundaryError;
use fem::mesh::MeshError;
use fem::solver::SolverError;
use std::fmt;
use thiserror::Error;

/// Stage of a field evaluation that runs a linear solve
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolveStage {
    /// Interior problem sourced by the magnetization (φ_a / φ_1)
    Poisson,
    /// Dirichlet problem for the boundary correction (φ_b / φ_2)
    Laplace,
    /// Consistent-mass projection of the field onto the nodes
    Projection,
}

impl fmt::Display for SolveStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SolveStage::Poisson => write!(f, "Poisson (phi_a)"),
            SolveStage::Laplace => write!(f, "Laplace (phi_b)"),
            SolveStage::Projection => write!(f, "field projection"),
        }
    }
}

/// Demagnetization solver errors
#[derive(Debug, Error)]
pub enum DemagError {
    /// The mesh cannot support a BEM boundary (no faces, open or non-manifold surface)
    #[error("Setup failed: {0}")]
    Setup(String),

    /// An interior linear solve failed
    #[error(
        "{stage} solve failed on a mesh with {num_nodes} nodes and {num_boundary_dofs} boundary dofs: {source}"
    )]
    LinearSolve {
        /// Which solve failed
        stage: SolveStage,
        /// Number of mesh nodes
        num_nodes: usize,
        /// Number of boundary dofs
        num_boundary_dofs: usize,
        /// Underlying solver error
        #[source]
        source: SolverError,
    },

    /// A vector does not match the length of the dof map it is used with
    #[error("Index alignment error in {context}: expected length {expected}, got {actual}")]
    IndexAlignment {
        /// Operation that detected the mismatch
        context: &'static str,
        /// Expected length
        expected: usize,
        /// Actual length
        actual: usize,
    },

    /// Caller-supplied field data is malformed
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Configuration value out of range or unparsable
    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl DemagError {
    /// Wrap a solver error with the stage and problem size
    pub(crate) fn linear_solve(
        stage: SolveStage,
        num_nodes: usize,
        num_boundary_dofs: usize,
    ) -> impl FnOnce(SolverError) -> Self {
        move |source| DemagError::LinearSolve {
            stage,
            num_nodes,
            num_boundary_dofs,
            source,
        }
    }
}

impl From<MeshError> for DemagError {
    fn from(err: MeshError) -> Self {
        DemagError::Setup(err.to_string())
    }
}

impl From<BoundaryError> for DemagError {
    fn from(err: BoundaryError) -> Self {
        DemagError::Setup(err.to_string())
    }
}

impl From<serde_json::Error> for DemagError {
    fn from(err: serde_json::Error) -> Self {
        DemagError::Config(err.to_string())
    }
}
