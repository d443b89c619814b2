//! Boundary view of the FEM mesh
//!
//! - [`dofs`] - boundary dof extraction, restriction and extension
//! - [`normals`] - averaged outward normals per boundary dof
//! - [`surface`] - closed panel surface used by the BEM kernels

pub mod dofs;
pub mod normals;
pub mod surface;

pub use dofs::BoundaryDofMap;
pub use normals::NormalTable;
pub use surface::{BoundarySurface, SurfacePanel};
