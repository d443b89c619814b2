//! Magnetization charge load vector
//!
//! The weak form of Δu = ∇·M with natural boundary data is
//! ∫ ∇u·∇v = ∫ M·∇v, so the load is b_i = ∫ M·∇φ_i dΩ. With M interpolated
//! linearly from nodal values, the integral over a tetrahedron is the cell
//! volume times the vertex mean of M dotted with the constant basis gradient.

use crate::mesh::{Mesh, Point};
use ndarray::{Array1, Array2};

/// Assemble b_i = ∫ M·∇φ_i over the mesh
///
/// `magnetization` holds one row (Mx, My, Mz) per node.
pub fn assemble_divergence_load(mesh: &Mesh, magnetization: &Array2<f64>) -> Array1<f64> {
    let mut load = Array1::zeros(mesh.num_nodes());

    for (elem_idx, elem) in mesh.elements.iter().enumerate() {
        let mean = elem
            .nodes
            .iter()
            .fold(Point::zero(), |acc, &n| {
                acc + Point::new_3d(
                    magnetization[[n, 0]],
                    magnetization[[n, 1]],
                    magnetization[[n, 2]],
                )
            })
            * 0.25;

        let volume = mesh.element_measure(elem_idx);
        let grads = mesh.element_gradients(elem_idx);
        for (a, &node) in elem.nodes.iter().enumerate() {
            load[node] += volume * mean.dot(&grads[a]);
        }
    }

    load
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::{ball_mesh_tetrahedra, unit_cube_tetrahedra};
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_load_sums_to_zero() {
        // Basis functions sum to one, so their gradients sum to zero
        let mesh = ball_mesh_tetrahedra(1.0, 3).unwrap();
        let m = Array2::from_shape_fn((mesh.num_nodes(), 3), |(i, c)| {
            (i as f64 * 0.37 + c as f64).sin()
        });
        let load = assemble_divergence_load(&mesh, &m);
        assert_abs_diff_eq!(load.sum(), 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_uniform_magnetization_only_loads_boundary() {
        // ∫ M·∇φ_i = ∮ φ_i M·n for uniform M, which vanishes at interior nodes
        let mesh = unit_cube_tetrahedra(3).unwrap();
        let mut m = Array2::zeros((mesh.num_nodes(), 3));
        m.column_mut(0).fill(1.0);
        let load = assemble_divergence_load(&mesh, &m);

        let boundary = mesh.boundary_nodes();
        for i in 0..mesh.num_nodes() {
            if boundary.binary_search(&i).is_err() {
                assert_abs_diff_eq!(load[i], 0.0, epsilon = 1e-12);
            }
        }

        // Face x = 1 carries total flux +1
        let plus: f64 = (0..mesh.num_nodes())
            .filter(|&i| mesh.nodes[i].x > 1.0 - 1e-12)
            .map(|i| load[i])
            .sum();
        assert_abs_diff_eq!(plus, 1.0, epsilon = 1e-12);
    }
}
