//! Dirichlet (essential) boundary conditions
//!
//! Implements u = g on a node set by symmetric elimination: constrained rows
//! and columns are removed from the matrix (diagonal set to 1), their column
//! couplings are moved to the right-hand side, and the constrained RHS
//! entries are set to g. An SPD matrix stays SPD.

use ndarray::Array1;
use solvers::CsrMatrix;
use thiserror::Error;

/// Errors raised while imposing Dirichlet data
#[derive(Debug, Error, Clone, PartialEq)]
pub enum BoundaryError {
    #[error("Dirichlet node {node} out of range for a system of size {size}")]
    NodeOutOfRange { node: usize, size: usize },
    #[error("Expected {expected} Dirichlet values, got {actual}")]
    ValueCountMismatch { expected: usize, actual: usize },
    #[error("Right-hand side has length {actual}, system size is {expected}")]
    RhsLengthMismatch { expected: usize, actual: usize },
}

/// A matrix with a fixed set of Dirichlet nodes eliminated
///
/// The elimination depends only on which nodes are constrained, so it is
/// built once and reused for every new set of boundary values.
#[derive(Debug, Clone)]
pub struct DirichletElimination {
    /// System matrix with constrained rows/columns replaced by identity
    matrix: CsrMatrix<f64>,
    /// Entries A[free_row, constrained_col], columns numbered by constraint
    couplings: CsrMatrix<f64>,
    /// Constrained nodes, in the order their values are supplied
    nodes: Vec<usize>,
}

impl DirichletElimination {
    /// Eliminate `nodes` from `matrix`
    ///
    /// Duplicate nodes keep their first occurrence.
    pub fn new(matrix: &CsrMatrix<f64>, nodes: &[usize]) -> Result<Self, BoundaryError> {
        let n = matrix.num_rows;
        let mut constraint_of: Vec<Option<usize>> = vec![None; n];
        let mut unique = Vec::with_capacity(nodes.len());
        for &node in nodes {
            if node >= n {
                return Err(BoundaryError::NodeOutOfRange { node, size: n });
            }
            if constraint_of[node].is_none() {
                constraint_of[node] = Some(unique.len());
                unique.push(node);
            }
        }

        let mut reduced = Vec::with_capacity(matrix.nnz());
        let mut couplings = Vec::new();
        for row in 0..n {
            if constraint_of[row].is_some() {
                reduced.push((row, row, 1.0));
                continue;
            }
            for (col, value) in matrix.row_entries(row) {
                match constraint_of[col] {
                    Some(k) => couplings.push((row, k, value)),
                    None => reduced.push((row, col, value)),
                }
            }
        }

        Ok(Self {
            matrix: CsrMatrix::from_triplets(n, n, reduced),
            couplings: CsrMatrix::from_triplets(n, unique.len(), couplings),
            nodes: unique,
        })
    }

    /// The eliminated system matrix
    pub fn matrix(&self) -> &CsrMatrix<f64> {
        &self.matrix
    }

    /// Constrained nodes, deduplicated, in value order
    pub fn nodes(&self) -> &[usize] {
        &self.nodes
    }

    /// Right-hand side for the eliminated system with boundary values `g`
    pub fn rhs(&self, rhs: &Array1<f64>, values: &Array1<f64>) -> Result<Array1<f64>, BoundaryError> {
        if rhs.len() != self.matrix.num_rows {
            return Err(BoundaryError::RhsLengthMismatch {
                expected: self.matrix.num_rows,
                actual: rhs.len(),
            });
        }
        if values.len() != self.nodes.len() {
            return Err(BoundaryError::ValueCountMismatch {
                expected: self.nodes.len(),
                actual: values.len(),
            });
        }

        let mut lifted = rhs - &self.couplings.matvec(values);
        for (&node, &g) in self.nodes.iter().zip(values.iter()) {
            lifted[node] = g;
        }
        Ok(lifted)
    }
}

/// Apply Dirichlet conditions `(node, value)` to a system
///
/// Returns the eliminated matrix; `rhs` is updated in place. When a node is
/// listed more than once the first value wins.
pub fn apply_dirichlet(
    matrix: &CsrMatrix<f64>,
    rhs: &mut Array1<f64>,
    constraints: &[(usize, f64)],
) -> Result<CsrMatrix<f64>, BoundaryError> {
    let nodes: Vec<usize> = constraints.iter().map(|&(node, _)| node).collect();
    let elimination = DirichletElimination::new(matrix, &nodes)?;

    let mut seen = vec![false; matrix.num_rows];
    let values: Array1<f64> = constraints
        .iter()
        .filter(|&&(node, _)| !std::mem::replace(&mut seen[node], true))
        .map(|&(_, value)| value)
        .collect();

    *rhs = elimination.rhs(rhs, &values)?;
    Ok(elimination.matrix)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assembly::assemble_stiffness;
    use crate::mesh::unit_cube_tetrahedra;
    use approx::assert_abs_diff_eq;
    use solvers::lu_solve;

    #[test]
    fn test_linear_field_reproduced_exactly() {
        let mesh = unit_cube_tetrahedra(3).unwrap();
        let k = assemble_stiffness(&mesh).to_csr();
        let exact = |x: f64, y: f64, z: f64| 1.0 + 2.0 * x - 0.5 * y + 0.25 * z;

        let constraints: Vec<(usize, f64)> = mesh
            .boundary_nodes()
            .into_iter()
            .map(|i| {
                let p = mesh.nodes[i];
                (i, exact(p.x, p.y, p.z))
            })
            .collect();

        let mut rhs = Array1::zeros(mesh.num_nodes());
        let a = apply_dirichlet(&k, &mut rhs, &constraints).unwrap();
        let u = lu_solve(&a.to_dense(), &rhs).unwrap();

        for (i, p) in mesh.nodes.iter().enumerate() {
            assert_abs_diff_eq!(u[i], exact(p.x, p.y, p.z), epsilon = 1e-10);
        }
    }

    #[test]
    fn test_elimination_keeps_symmetry() {
        let mesh = unit_cube_tetrahedra(2).unwrap();
        let k = assemble_stiffness(&mesh).to_csr();
        let elim = DirichletElimination::new(&k, &mesh.boundary_nodes()).unwrap();
        let dense = elim.matrix().to_dense();
        let n = mesh.num_nodes();
        for i in 0..n {
            for j in 0..n {
                assert_abs_diff_eq!(dense[[i, j]], dense[[j, i]], epsilon = 1e-14);
            }
        }
    }

    #[test]
    fn test_duplicate_nodes_first_value_wins() {
        let k: CsrMatrix<f64> = CsrMatrix::identity(3);
        let mut rhs = Array1::zeros(3);
        apply_dirichlet(&k, &mut rhs, &[(1, 5.0), (1, 7.0)]).unwrap();
        assert_eq!(rhs[1], 5.0);
    }

    #[test]
    fn test_errors() {
        let k: CsrMatrix<f64> = CsrMatrix::identity(3);
        assert_eq!(
            DirichletElimination::new(&k, &[3]).unwrap_err(),
            BoundaryError::NodeOutOfRange { node: 3, size: 3 }
        );

        let elim = DirichletElimination::new(&k, &[0, 2]).unwrap();
        assert_eq!(
            elim.rhs(&Array1::zeros(3), &Array1::zeros(1)).unwrap_err(),
            BoundaryError::ValueCountMismatch {
                expected: 2,
                actual: 1
            }
        );
    }
}
