//! Flat triangular panel geometry shared by the analytic kernels
//!
//! Conventions: the panel normal follows the right-hand rule of the vertex
//! order. Edge `e` runs from vertex `e` to vertex `e + 1` and has the unit
//! in-plane normal `m_e = ξ_e × n`, which points out of the triangle.

use fem::mesh::Point;

use crate::core::constants::IN_PLANE_RTOL;

/// Precomputed geometry of a triangle for a given field point
#[derive(Debug, Clone, Copy)]
pub struct PanelGeometry {
    /// Vertices
    pub vertices: [Point; 3],
    /// Unit normal (right-hand rule)
    pub normal: Point,
    /// Area
    pub area: f64,
    /// Longest edge, the length scale for tolerances
    pub diameter: f64,
}

impl PanelGeometry {
    /// Build the geometry; `None` for a degenerate (zero-area) triangle
    pub fn new(p0: Point, p1: Point, p2: Point) -> Option<Self> {
        let cross = (p1 - p0).cross(&(p2 - p0));
        let normal = cross.normalized()?;
        let diameter = p0.distance(&p1).max(p1.distance(&p2)).max(p2.distance(&p0));
        Some(Self {
            vertices: [p0, p1, p2],
            normal,
            area: 0.5 * cross.norm(),
            diameter,
        })
    }

    /// Signed height `h = (p0 - x)·n` of the plane above the field point
    ///
    /// Positive when the field point lies behind the panel (inside the body
    /// for an outward-oriented boundary).
    #[inline]
    pub fn height(&self, x: &Point) -> f64 {
        (self.vertices[0] - *x).dot(&self.normal)
    }

    /// Whether `x` lies (numerically) in the panel's plane
    #[inline]
    pub fn is_in_plane(&self, h: f64) -> bool {
        h.abs() <= IN_PLANE_RTOL * self.diameter
    }

    /// Projection of `x` onto the panel's plane, given its height
    #[inline]
    pub fn project(&self, x: &Point, h: f64) -> Point {
        *x + self.normal * h
    }

    /// Edge `e` endpoints (vertex e to vertex e+1)
    #[inline]
    pub fn edge(&self, e: usize) -> (Point, Point) {
        (self.vertices[e], self.vertices[(e + 1) % 3])
    }

    /// Unit tangent and outward in-plane normal of edge `e`
    pub fn edge_frame(&self, e: usize) -> (Point, Point, f64) {
        let (a, b) = self.edge(e);
        let d = b - a;
        let len = d.norm();
        let xi = d * (1.0 / len);
        (xi, xi.cross(&self.normal), len)
    }

    /// Gradients of the three linear shape functions (constant in-plane)
    ///
    /// ∇N_j = n × (r_{j+2} − r_{j+1}) / (2A)
    pub fn shape_gradients(&self) -> [Point; 3] {
        let inv = 1.0 / (2.0 * self.area);
        std::array::from_fn(|j| {
            let r1 = self.vertices[(j + 1) % 3];
            let r2 = self.vertices[(j + 2) % 3];
            self.normal.cross(&(r2 - r1)) * inv
        })
    }

    /// Linear shape functions (barycentric coordinates) at an in-plane point
    pub fn shape_values(&self, p: &Point) -> [f64; 3] {
        let inv = 1.0 / (2.0 * self.area);
        std::array::from_fn(|j| {
            let r1 = self.vertices[(j + 1) % 3] - *p;
            let r2 = self.vertices[(j + 2) % 3] - *p;
            r1.cross(&r2).dot(&self.normal) * inv
        })
    }
}

/// Edge integral P_e = ∫_e dl / |x − y| in its numerically stable form
///
/// `ln((R_a + R_b + s) / (R_a + R_b − s))`. When x lies on the edge segment
/// the integral diverges; the callers multiply it by a factor that vanishes
/// there, so 0 is returned.
#[inline]
pub fn edge_log(ra: f64, rb: f64, len: f64) -> f64 {
    let den = ra + rb - len;
    if den <= f64::EPSILON * (ra + rb + len) {
        0.0
    } else {
        ((ra + rb + len) / den).ln()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn unit_triangle() -> PanelGeometry {
        PanelGeometry::new(
            Point::new_3d(0.0, 0.0, 0.0),
            Point::new_3d(1.0, 0.0, 0.0),
            Point::new_3d(0.0, 1.0, 0.0),
        )
        .unwrap()
    }

    #[test]
    fn test_shape_functions() {
        let panel = unit_triangle();
        let g = panel.shape_gradients();
        assert_abs_diff_eq!(g[0].x, -1.0, epsilon = 1e-15);
        assert_abs_diff_eq!(g[0].y, -1.0, epsilon = 1e-15);
        assert_abs_diff_eq!(g[1].x, 1.0, epsilon = 1e-15);
        assert_abs_diff_eq!(g[2].y, 1.0, epsilon = 1e-15);

        let n = panel.shape_values(&Point::new_3d(0.25, 0.5, 0.0));
        assert_abs_diff_eq!(n[0], 0.25, epsilon = 1e-15);
        assert_abs_diff_eq!(n[1], 0.25, epsilon = 1e-15);
        assert_abs_diff_eq!(n[2], 0.5, epsilon = 1e-15);
    }

    #[test]
    fn test_edge_normals_point_outward() {
        let panel = unit_triangle();
        let centroid = Point::new_3d(1.0 / 3.0, 1.0 / 3.0, 0.0);
        for e in 0..3 {
            let (a, _) = panel.edge(e);
            let (_, m, _) = panel.edge_frame(e);
            assert!(m.dot(&(a - centroid)) > 0.0);
            assert_abs_diff_eq!(m.dot(&panel.normal), 0.0, epsilon = 1e-15);
        }
    }

    #[test]
    fn test_degenerate_panel() {
        let p = Point::new_3d(1.0, 1.0, 1.0);
        assert!(PanelGeometry::new(p, p * 2.0, p * 3.0).is_none());
    }
}
