//! Finite element matrix assembly
//!
//! Assembles stiffness and mass matrices and the magnetization charge load
//! for P1 tetrahedra.

mod load;
mod mass;
mod stiffness;

pub use load::*;
pub use mass::*;
pub use stiffness::*;
