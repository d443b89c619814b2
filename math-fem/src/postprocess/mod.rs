//! Gradients of P1 fields and their projection back onto the nodes
//!
//! The gradient of a P1 function is constant per tetrahedron. Consumers of
//! the demagnetizing field want nodal values in the same space as the
//! magnetization, so cell values are projected either by the lumped mass
//! (volume-weighted average of incident cells) or by a full L2 projection.

use crate::assembly::{assemble_consistent_mass, assemble_lumped_mass};
use crate::mesh::Mesh;
use crate::solver::{SolverConfig, SolverError, SolverType, solve_csr_with_guess};
use ndarray::{Array1, Array2, Zip};
use serde::{Deserialize, Serialize};
use solvers::CsrMatrix;

/// How cell-constant values are mapped to nodal values
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectionMethod {
    /// Lumped-mass projection (volume-weighted average)
    #[default]
    Lumped,
    /// Consistent-mass L2 projection, solved with CG
    L2,
}

/// Gradient of a nodal P1 field, one row per element
pub fn cell_gradients(mesh: &Mesh, u: &Array1<f64>) -> Result<Array2<f64>, SolverError> {
    if u.len() != mesh.num_nodes() {
        return Err(SolverError::DimensionMismatch {
            expected: mesh.num_nodes(),
            actual: u.len(),
        });
    }

    let mut grads = Array2::zeros((mesh.num_elements(), 3));
    for (elem_idx, elem) in mesh.elements.iter().enumerate() {
        let basis = mesh.element_gradients(elem_idx);
        let mut g = [0.0; 3];
        for (a, &node) in elem.nodes.iter().enumerate() {
            let b = basis[a].to_array();
            for c in 0..3 {
                g[c] += u[node] * b[c];
            }
        }
        for c in 0..3 {
            grads[[elem_idx, c]] = g[c];
        }
    }
    Ok(grads)
}

/// Reusable projector from cell values to nodal values
///
/// Holds the mass data for one mesh so repeated projections skip assembly.
#[derive(Debug, Clone)]
pub struct NodalProjector {
    method: ProjectionMethod,
    lumped: Array1<f64>,
    consistent: Option<CsrMatrix<f64>>,
    config: SolverConfig,
}

impl NodalProjector {
    /// Build the mass data for `mesh`
    pub fn new(mesh: &Mesh, method: ProjectionMethod) -> Self {
        let consistent = match method {
            ProjectionMethod::Lumped => None,
            ProjectionMethod::L2 => Some(assemble_consistent_mass(mesh).to_csr()),
        };
        Self {
            method,
            lumped: assemble_lumped_mass(mesh),
            consistent,
            config: SolverConfig::default()
                .with_solver_type(SolverType::CgJacobi)
                .with_tolerance(1e-12)
                .with_max_iterations(1000),
        }
    }

    /// Projection method in use
    pub fn method(&self) -> ProjectionMethod {
        self.method
    }

    /// Lumped nodal masses (vertex volume shares)
    pub fn lumped_mass(&self) -> &Array1<f64> {
        &self.lumped
    }

    /// Project per-cell rows onto the nodes
    ///
    /// The right-hand side of both projections is ∫ φ_i g = Σ_T g_T V_T / 4.
    pub fn project(&self, mesh: &Mesh, cell_values: &Array2<f64>) -> Result<Array2<f64>, SolverError> {
        if cell_values.nrows() != mesh.num_elements() {
            return Err(SolverError::DimensionMismatch {
                expected: mesh.num_elements(),
                actual: cell_values.nrows(),
            });
        }

        let ncomp = cell_values.ncols();
        let mut rhs = Array2::zeros((mesh.num_nodes(), ncomp));
        for (elem_idx, elem) in mesh.elements.iter().enumerate() {
            let share = 0.25 * mesh.element_measure(elem_idx);
            for &node in &elem.nodes {
                for c in 0..ncomp {
                    rhs[[node, c]] += share * cell_values[[elem_idx, c]];
                }
            }
        }

        match (&self.method, &self.consistent) {
            (ProjectionMethod::L2, Some(mass)) => {
                let mut nodal = Array2::zeros(rhs.raw_dim());
                for c in 0..ncomp {
                    let b = rhs.column(c).to_owned();
                    // Lumped solution is a good starting point
                    let guess = &b / &self.lumped;
                    let sol = solve_csr_with_guess(mass, &b, Some(&guess), &self.config)?;
                    nodal.column_mut(c).assign(&sol.values);
                }
                Ok(nodal)
            }
            _ => {
                Zip::from(rhs.rows_mut())
                    .and(&self.lumped)
                    .for_each(|mut row, &m| row /= m);
                Ok(rhs)
            }
        }
    }
}

/// Project per-cell values onto the nodes with the given method
pub fn project_to_nodes(
    mesh: &Mesh,
    cell_values: &Array2<f64>,
    method: ProjectionMethod,
) -> Result<Array2<f64>, SolverError> {
    NodalProjector::new(mesh, method).project(mesh, cell_values)
}

/// Nodal gradient of a P1 field
pub fn nodal_gradient(
    mesh: &Mesh,
    u: &Array1<f64>,
    method: ProjectionMethod,
) -> Result<Array2<f64>, SolverError> {
    project_to_nodes(mesh, &cell_gradients(mesh, u)?, method)
}
