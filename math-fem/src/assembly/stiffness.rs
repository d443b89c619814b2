//! Stiffness matrix assembly
//!
//! Assembles the P1 Laplacian K where K_ij = ∫ ∇φ_i · ∇φ_j dΩ. The basis
//! gradients are constant on a tetrahedron, so the element matrix is exact:
//! K_e = V_e (∇φ_a · ∇φ_b).

use crate::mesh::Mesh;
use solvers::CsrMatrix;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Assembled stiffness matrix in triplet format
#[derive(Debug, Clone)]
pub struct StiffnessMatrix {
    /// Row indices
    pub rows: Vec<usize>,
    /// Column indices
    pub cols: Vec<usize>,
    /// Values
    pub values: Vec<f64>,
    /// Matrix dimension
    pub dim: usize,
}

impl StiffnessMatrix {
    pub fn new(dim: usize) -> Self {
        Self {
            rows: Vec::new(),
            cols: Vec::new(),
            values: Vec::new(),
            dim,
        }
    }

    /// Add a triplet (i, j, value)
    pub fn add(&mut self, i: usize, j: usize, value: f64) {
        self.rows.push(i);
        self.cols.push(j);
        self.values.push(value);
    }

    /// Number of stored triplets (duplicates not yet summed)
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

/// Element stiffness contributions as global triplets
fn compute_element_stiffness(mesh: &Mesh, elem_idx: usize) -> Vec<(usize, usize, f64)> {
    let nodes = mesh.elements[elem_idx].nodes;
    let grads = mesh.element_gradients(elem_idx);
    let volume = mesh.element_measure(elem_idx);

    let mut triplets = Vec::with_capacity(16);
    for a in 0..4 {
        for b in 0..4 {
            triplets.push((nodes[a], nodes[b], volume * grads[a].dot(&grads[b])));
        }
    }
    triplets
}

/// Assemble the global stiffness matrix
pub fn assemble_stiffness(mesh: &Mesh) -> StiffnessMatrix {
    #[cfg(feature = "parallel")]
    {
        assemble_stiffness_parallel(mesh)
    }
    #[cfg(not(feature = "parallel"))]
    {
        assemble_stiffness_sequential(mesh)
    }
}

/// Sequential stiffness assembly
#[cfg(not(feature = "parallel"))]
fn assemble_stiffness_sequential(mesh: &Mesh) -> StiffnessMatrix {
    let mut matrix = StiffnessMatrix::new(mesh.num_nodes());
    for elem_idx in 0..mesh.num_elements() {
        for (gi, gj, val) in compute_element_stiffness(mesh, elem_idx) {
            matrix.add(gi, gj, val);
        }
    }
    matrix
}

/// Parallel stiffness assembly using rayon
#[cfg(feature = "parallel")]
fn assemble_stiffness_parallel(mesh: &Mesh) -> StiffnessMatrix {
    let all_triplets: Vec<Vec<(usize, usize, f64)>> = (0..mesh.num_elements())
        .into_par_iter()
        .map(|elem_idx| compute_element_stiffness(mesh, elem_idx))
        .collect();

    let total: usize = all_triplets.iter().map(|t| t.len()).sum();
    let mut matrix = StiffnessMatrix::new(mesh.num_nodes());
    matrix.rows.reserve(total);
    matrix.cols.reserve(total);
    matrix.values.reserve(total);

    for triplets in all_triplets {
        for (i, j, v) in triplets {
            matrix.add(i, j, v);
        }
    }
    matrix
}
