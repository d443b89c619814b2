//! Mass matrix assembly
//!
//! Consistent P1 mass M_ij = ∫ φ_i · φ_j dΩ, which on a tetrahedron is
//! V/20 · (1 + δ_ij), and its row-summed (lumped) diagonal V/4 per vertex.

use crate::mesh::Mesh;
use ndarray::Array1;
use solvers::CsrMatrix;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Assembled mass matrix in triplet format
#[derive(Debug, Clone)]
pub struct MassMatrix {
    /// Row indices
    pub rows: Vec<usize>,
    /// Column indices
    pub cols: Vec<usize>,
    /// Values
    pub values: Vec<f64>,
    /// Matrix dimension
    pub dim: usize,
}

impl MassMatrix {
    pub fn new(dim: usize) -> Self {
        Self {
            rows: Vec::new(),
            cols: Vec::new(),
            values: Vec::new(),
            dim,
        }
    }

    pub fn add(&mut self, i: usize, j: usize, value: f64) {
        self.rows.push(i);
        self.cols.push(j);
        self.values.push(value);
    }

    pub fn nnz(&self) -> usize {
        self.values.len()
    }

    /// Convert to CSR, summing duplicate entries
    pub fn to_csr(&self) -> CsrMatrix<f64> {
        let triplets = self
            .rows
            .iter()
            .zip(&self.cols)
            .zip(&self.values)
            .map(|((&i, &j), &v)| (i, j, v))
            .collect();
        CsrMatrix::from_triplets(self.dim, self.dim, triplets)
    }
}

fn compute_element_mass(mesh: &Mesh, elem_idx: usize) -> Vec<(usize, usize, f64)> {
    let nodes = mesh.elements[elem_idx].nodes;
    let off = mesh.element_measure(elem_idx) / 20.0;

    let mut triplets = Vec::with_capacity(16);
    for a in 0..4 {
        for b in 0..4 {
            let value = if a == b { 2.0 * off } else { off };
            triplets.push((nodes[a], nodes[b], value));
        }
    }
    triplets
}

/// Assemble the consistent mass matrix
pub fn assemble_consistent_mass(mesh: &Mesh) -> MassMatrix {
    #[cfg(feature = "parallel")]
    let all_triplets: Vec<Vec<(usize, usize, f64)>> = (0..mesh.num_elements())
        .into_par_iter()
        .map(|elem_idx| compute_element_mass(mesh, elem_idx))
        .collect();
    #[cfg(not(feature = "parallel"))]
    let all_triplets: Vec<Vec<(usize, usize, f64)>> = (0..mesh.num_elements())
        .map(|elem_idx| compute_element_mass(mesh, elem_idx))
        .collect();

    let mut matrix = MassMatrix::new(mesh.num_nodes());
    for triplets in all_triplets {
        for (i, j, v) in triplets {
            matrix.add(i, j, v);
        }
    }
    matrix
}

/// Assemble the lumped (diagonal) mass: each vertex receives a quarter of
/// the volume of every incident tetrahedron
pub fn assemble_lumped_mass(mesh: &Mesh) -> Array1<f64> {
    let mut lumped = Array1::zeros(mesh.num_nodes());
    for (elem_idx, elem) in mesh.elements.iter().enumerate() {
        let share = 0.25 * mesh.element_measure(elem_idx);
        for &node in &elem.nodes {
            lumped[node] += share;
        }
    }
    lumped
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::{ball_mesh_tetrahedra, box_mesh_tetrahedra};
    use approx::assert_relative_eq;

    #[test]
    fn test_lumped_mass_sums_to_volume() {
        let mesh = box_mesh_tetrahedra(0.0, 2.0, 0.0, 1.0, 0.0, 0.5, 3, 2, 2).unwrap();
        let lumped = assemble_lumped_mass(&mesh);
        assert_relative_eq!(lumped.sum(), 1.0, epsilon = 1e-12);
        assert!(lumped.iter().all(|&m| m > 0.0));
    }

    #[test]
    fn test_consistent_mass_row_sums_match_lumped() {
        let mesh = ball_mesh_tetrahedra(1.0, 3).unwrap();
        let consistent = assemble_consistent_mass(&mesh).to_csr();
        let lumped = assemble_lumped_mass(&mesh);

        let sums = consistent.row_sums();
        for i in 0..mesh.num_nodes() {
            assert_relative_eq!(sums[i], lumped[i], epsilon = 1e-12);
        }
    }
}
