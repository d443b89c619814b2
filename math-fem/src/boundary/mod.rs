//! Boundary condition handling for finite element problems

mod dirichlet;

pub use dirichlet::*;
