//! Tetrahedral P1 finite elements for magnetostatic potential problems
//!
//! This crate provides the interior half of a hybrid FEM-BEM
//! demagnetization solver: meshes, weak-form assembly, boundary conditions
//! and the sparse solve driver.
//!
//! # Features
//!
//! - **Tetrahedral meshes** with outward-oriented boundary faces
//! - **Generators** for boxes and balls
//! - **Assembly**: P1 stiffness, lumped and consistent mass, magnetization charge load
//! - **Dirichlet elimination** that keeps SPD systems SPD
//! - **Post-processing**: cell gradients, lumped or L2 nodal projection
//!
//! # Example
//!
//! ```ignore
//! use math_magnetics_fem::{assembly, boundary, mesh, solver};
//!
//! let mesh = mesh::ball_mesh_tetrahedra(1.0, 6)?;
//! let stiffness = assembly::assemble_stiffness(&mesh).to_csr();
//! let mut rhs = ndarray::Array1::zeros(mesh.num_nodes());
//! let pinned = boundary::apply_dirichlet(&stiffness, &mut rhs, &[(0, 0.0)])?;
//! let solution = solver::solve_csr(&pinned, &rhs, &solver::SolverConfig::default())?;
//! ```

pub mod assembly;
pub mod boundary;
pub mod mesh;
pub mod postprocess;
pub mod solver;

/// Library version
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
