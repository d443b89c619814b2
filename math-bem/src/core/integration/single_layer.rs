//! Closed-form single layer of a flat panel with linear density
//!
//! S_j(x) = ∫_T N_j(y) / |x − y| dS_y = N_j(p) I₁ + ∇N_j · I_ρ with
//!
//! I₁  = ∫_T 1/R dS  = Σ_e t_e P_e − h Ω
//! I_ρ = ∫_T ρ/R dS = Σ_e m_e · ½ [R₀² P_e + s⁺R⁺ − s⁻R⁻]
//!
//! where ρ = y − p, t_e = (r_a − p)·m_e is the in-plane distance to edge e,
//! R₀² = t_e² + h² and s^± are the edge end coordinates along ξ_e measured
//! from the foot of the perpendicular. The integrand is weakly singular, so
//! the formulas stay finite for points on the panel, including its vertices.

use fem::mesh::Point;

use super::double_layer::solid_angle;
use super::panel::{PanelGeometry, edge_log};

/// Single-layer coefficients of the three panel vertices at x
pub fn single_layer_coefficients(x: &Point, p0: &Point, p1: &Point, p2: &Point) -> [f64; 3] {
    match PanelGeometry::new(*p0, *p1, *p2) {
        Some(panel) => single_layer_on_panel(x, &panel),
        None => [0.0; 3],
    }
}

/// Single-layer coefficients for precomputed panel geometry
pub fn single_layer_on_panel(x: &Point, panel: &PanelGeometry) -> [f64; 3] {
    let mut h = panel.height(x);
    let omega = if panel.is_in_plane(h) {
        h = 0.0;
        0.0
    } else {
        let [p0, p1, p2] = panel.vertices;
        solid_angle(x, &p0, &p1, &p2)
    };
    let p = panel.project(x, h);

    let mut i1 = -h * omega;
    let mut i_rho = Point::zero();
    for e in 0..3 {
        let (a, b) = panel.edge(e);
        let (xi, m, len) = panel.edge_frame(e);
        let r_minus = a.distance(x);
        let r_plus = b.distance(x);
        let pe = edge_log(r_minus, r_plus, len);

        let t = (a - p).dot(&m);
        let s_minus = (a - p).dot(&xi);
        let s_plus = (b - p).dot(&xi);
        let r0_sq = t * t + h * h;

        i1 += t * pe;
        i_rho = i_rho + m * (0.5 * (r0_sq * pe + s_plus * r_plus - s_minus * r_minus));
    }

    let n_at_p = panel.shape_values(&p);
    let grads = panel.shape_gradients();
    std::array::from_fn(|j| n_at_p[j] * i1 + grads[j].dot(&i_rho))
}
