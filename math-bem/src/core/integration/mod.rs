//! Closed-form integrals over flat triangular panels
//!
//! ## Module Organization
//!
//! - [`panel`] - panel geometry, shape functions and edge integrals
//! - [`double_layer`] - solid angle and Lindholm double-layer coefficients
//! - [`single_layer`] - single layer with linear density
//!
//! All integrals are exact for flat panels, so no quadrature rules are needed.

pub mod double_layer;
pub mod panel;
pub mod single_layer;

pub use double_layer::{double_layer_coefficients, double_layer_on_panel, solid_angle};
pub use panel::{PanelGeometry, edge_log};
pub use single_layer::{single_layer_coefficients, single_layer_on_panel};
