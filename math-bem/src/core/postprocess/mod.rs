//! Post-processing of computed fields

pub mod statistics;

pub use statistics::{ComponentStatistics, FieldStatistics, average_field};
