//! # Magnetics BEM: hybrid FEM-BEM demagnetizing field solver
//!
//! Computes the magnetostatic self field of a magnetized body meshed with
//! tetrahedra. The open exterior is represented by a dense boundary element
//! matrix assembled once per mesh from exact panel integrals.
//!
//! ## Features
//!
//! - Fredkin–Koehler (double layer) and Garcia-Cervera–Roma (single layer) formulations
//! - Parallel BEM row assembly with Rayon
//! - JSON configuration
//!
//! ```ignore
//! use math_magnetics_bem::{DemagConfig, FemBemDemag};
//!
//! let demag = FemBemDemag::new(mesh, DemagConfig::default().with_verbose(true))?;
//! let solution = demag.compute_field(&m, &ms)?;
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod core;

// Re-exports
pub use crate::core::{
    BemMatrix, BoundaryDofMap, DemagConfig, DemagError, DemagMethod, DemagSolution,
    FemBemDemag, FieldStatistics, SourceVectorMethod,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Git commit hash (set during build)
pub const GIT_HASH: &str = env!("GIT_HASH");
