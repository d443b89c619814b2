//! Solid angle and the Lindholm double-layer coefficients
//!
//! For a flat panel T with unit normal n and a field point x, the double
//! layer with linear density N_j has the closed form
//!
//! D_j(x) = ∫_T N_j(y) (y − x)·n / |y − x|³ dS_y
//!        = N_j(p) Ω − h Σ_e (∇N_j · m_e) P_e
//!
//! where h = (p0 − x)·n, p is the projection of x onto the plane, Ω the
//! signed solid angle of T seen from x and P_e the edge integrals of 1/|x−y|.
//! Σ_j D_j = Ω for every x.

use fem::mesh::Point;

use super::panel::{PanelGeometry, edge_log};

/// Signed solid angle of triangle (p0, p1, p2) seen from x
///
/// Van Oosterom–Strackee formula. Positive when x lies behind the panel
/// (on the side opposite to the right-hand-rule normal), so the panels of a
/// closed outward-oriented surface sum to 4π at an interior point and to 0
/// outside. In-plane points give 0 (or ±2π inside the triangle, where the
/// solid angle is discontinuous); callers treat in-plane points separately.
pub fn solid_angle(x: &Point, p0: &Point, p1: &Point, p2: &Point) -> f64 {
    let a = *p0 - *x;
    let b = *p1 - *x;
    let c = *p2 - *x;
    let la = a.norm();
    let lb = b.norm();
    let lc = c.norm();

    let numerator = a.dot(&b.cross(&c));
    let denominator = la * lb * lc + a.dot(&b) * lc + a.dot(&c) * lb + b.dot(&c) * la;
    2.0 * numerator.atan2(denominator)
}

/// Double-layer coefficients of the three panel vertices at x
///
/// Field points in the panel's plane (including its own vertices) return
/// zeros: the kernel (y − x)·n vanishes identically there.
pub fn double_layer_coefficients(x: &Point, p0: &Point, p1: &Point, p2: &Point) -> [f64; 3] {
    match PanelGeometry::new(*p0, *p1, *p2) {
        Some(panel) => double_layer_on_panel(x, &panel),
        None => [0.0; 3],
    }
}

/// Double-layer coefficients for precomputed panel geometry
pub fn double_layer_on_panel(x: &Point, panel: &PanelGeometry) -> [f64; 3] {
    let h = panel.height(x);
    if panel.is_in_plane(h) {
        return [0.0; 3];
    }

    let [p0, p1, p2] = panel.vertices;
    let omega = solid_angle(x, &p0, &p1, &p2);
    let p = panel.project(x, h);
    let n_at_p = panel.shape_values(&p);
    let grads = panel.shape_gradients();

    let mut edge_terms = [Point::zero(); 3];
    for (e, term) in edge_terms.iter_mut().enumerate() {
        let (a, b) = panel.edge(e);
        let (_, m, len) = panel.edge_frame(e);
        let pe = edge_log(a.distance(x), b.distance(x), len);
        *term = m * pe;
    }
    let edge_sum = edge_terms[0] + edge_terms[1] + edge_terms[2];

    std::array::from_fn(|j| n_at_p[j] * omega - h * grads[j].dot(&edge_sum))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use std::f64::consts::PI;

    fn tri() -> [Point; 3] {
        [
            Point::new_3d(0.0, 0.0, 0.0),
            Point::new_3d(1.0, 0.0, 0.0),
            Point::new_3d(0.0, 1.0, 0.0),
        ]
    }

    /// Brute-force ∫ N_j (y − x)·n / |y − x|³ with a midpoint rule on a
    /// uniformly subdivided triangle
    fn quadrature(x: &Point, v: &[Point; 3], n_sub: usize) -> [f64; 3] {
        let panel = PanelGeometry::new(v[0], v[1], v[2]).unwrap();
        let mut out = [0.0; 3];
        let h = 1.0 / n_sub as f64;
        let sub_area = panel.area * h * h;
        for i in 0..n_sub {
            for j in 0..(n_sub - i) {
                // Upright and (when present) inverted sub-triangles
                let mut centres = vec![((i as f64 + 1.0 / 3.0) * h, (j as f64 + 1.0 / 3.0) * h)];
                if i + j + 1 < n_sub {
                    centres.push(((i as f64 + 2.0 / 3.0) * h, (j as f64 + 2.0 / 3.0) * h));
                }
                for (s, t) in centres {
                    let y = v[0] + (v[1] - v[0]) * s + (v[2] - v[0]) * t;
                    let r = y - *x;
                    let k = r.dot(&panel.normal) / r.norm().powi(3);
                    let nv = [1.0 - s - t, s, t];
                    for c in 0..3 {
                        out[c] += nv[c] * k * sub_area;
                    }
                }
            }
        }
        out
    }

    #[test]
    fn test_solid_angle_octant() {
        // Triangle (e1, e2, e3) seen from the origin spans one octant of the sphere
        let omega = solid_angle(
            &Point::zero(),
            &Point::new_3d(1.0, 0.0, 0.0),
            &Point::new_3d(0.0, 1.0, 0.0),
            &Point::new_3d(0.0, 0.0, 1.0),
        );
        assert_abs_diff_eq!(omega, 4.0 * PI / 8.0, epsilon = 1e-14);
    }

    #[test]
    fn test_solid_angle_sign_and_limits() {
        let [p0, p1, p2] = tri();
        // Normal is +z; a point below sees the panel from behind
        let below = solid_angle(&Point::new_3d(0.2, 0.2, -1e-9), &p0, &p1, &p2);
        let above = solid_angle(&Point::new_3d(0.2, 0.2, 1e-9), &p0, &p1, &p2);
        assert_abs_diff_eq!(below, 2.0 * PI, epsilon = 1e-6);
        assert_abs_diff_eq!(above, -2.0 * PI, epsilon = 1e-6);

        let far = solid_angle(&Point::new_3d(0.2, 0.2, -1e4), &p0, &p1, &p2);
        assert_abs_diff_eq!(far, 0.5 / 1e8, epsilon = 1e-11);
    }

    #[test]
    fn test_coefficients_sum_to_solid_angle() {
        let v = tri();
        for x in [
            Point::new_3d(0.3, 0.3, -0.5),
            Point::new_3d(2.0, -1.0, 0.7),
            Point::new_3d(-0.1, 0.4, -0.01),
        ] {
            let d = double_layer_coefficients(&x, &v[0], &v[1], &v[2]);
            let omega = solid_angle(&x, &v[0], &v[1], &v[2]);
            assert_abs_diff_eq!(d[0] + d[1] + d[2], omega, epsilon = 1e-13);
        }
    }

    #[test]
    fn test_coefficients_match_quadrature() {
        let v = [
            Point::new_3d(0.0, 0.0, 0.0),
            Point::new_3d(1.0, 0.2, 0.1),
            Point::new_3d(0.3, 0.9, -0.2),
        ];
        for x in [Point::new_3d(0.4, 0.3, -1.0), Point::new_3d(2.0, 2.0, 1.5)] {
            let exact = double_layer_coefficients(&x, &v[0], &v[1], &v[2]);
            let approx = quadrature(&x, &v, 200);
            for j in 0..3 {
                assert_abs_diff_eq!(exact[j], approx[j], epsilon = 1e-5);
            }
        }
    }

    #[test]
    fn test_in_plane_points_give_zero() {
        let [p0, p1, p2] = tri();
        assert_eq!(double_layer_coefficients(&p0, &p0, &p1, &p2), [0.0; 3]);
        assert_eq!(
            double_layer_coefficients(&Point::new_3d(3.0, 2.0, 0.0), &p0, &p1, &p2),
            [0.0; 3]
        );
    }
}
