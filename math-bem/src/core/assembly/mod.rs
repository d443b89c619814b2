//! BEM matrix assembly
//!
//! Only the dense all-pairs assembly is provided; every entry is an exact
//! panel integral, so the matrix carries no approximation error.

pub mod dense;

pub use dense::{BemKernel, BemMatrix};
