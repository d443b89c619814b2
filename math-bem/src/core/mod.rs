//! Hybrid FEM-BEM demagnetizing field solver
//!
//! ## Architecture
//!
//! - `constants`: physical and numerical constants
//! - `error`: error taxonomy of setup and field evaluation
//! - `config`: serde-backed solver configuration
//! - `mesh`: boundary dofs, normals and the closed panel surface
//! - `integration`: closed-form solid angle, double- and single-layer panel integrals
//! - `assembly`: dense BEM matrix assembly
//! - `solver`: two-stage potential solver and source vector strategies
//! - `postprocess`: field statistics

pub mod assembly;
pub mod config;
pub mod constants;
pub mod error;
pub mod integration;
pub mod mesh;
pub mod postprocess;
pub mod solver;

// Re-exports for convenience
pub use assembly::{BemKernel, BemMatrix};
pub use config::{DemagConfig, DemagMethod, SourceVectorMethod};
pub use error::{DemagError, SolveStage};
pub use mesh::{BoundaryDofMap, BoundarySurface, NormalTable};
pub use postprocess::{ComponentStatistics, FieldStatistics, average_field};
pub use solver::{DemagSolution, FemBemDemag, SourceVectorAssembler, StageTimings};
