//! Physical and numerical constants

use std::f64::consts::PI;

/// 4π
pub const PI4: f64 = 4.0 * PI;

/// Vacuum permeability μ0 (T·m/A)
pub const MU0: f64 = 4.0e-7 * PI;

/// Default length of one mesh unit in metres (nanometre meshes)
pub const DEFAULT_UNIT_LENGTH: f64 = 1.0e-9;

/// Field points closer than this (relative to the panel size) to a panel's
/// plane are treated as lying in it
pub const IN_PLANE_RTOL: f64 = 1.0e-12;
