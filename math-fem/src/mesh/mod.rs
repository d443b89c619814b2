//! Tetrahedral mesh types and generators

mod generators;
mod types;

pub use generators::*;
pub use types::*;
