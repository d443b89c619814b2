//! Result of one demagnetizing field evaluation

use std::time::Duration;

use fem::assembly::assemble_lumped_mass;
use fem::mesh::Mesh;
use ndarray::{Array1, Array2};

use crate::core::constants::MU0;
use crate::core::error::DemagError;
use crate::core::postprocess::{FieldStatistics, average_field};

/// Wall-clock time spent in each stage of a field evaluation
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct StageTimings {
    /// First interior solve (φ_a or φ_1)
    pub poisson: Duration,
    /// Boundary source vector
    pub source_vector: Duration,
    /// Dense BEM product
    pub bem_product: Duration,
    /// Dirichlet correction solve (φ_b or φ_2)
    pub laplace: Duration,
    /// Gradient and nodal projection of the field
    pub projection: Duration,
}

impl StageTimings {
    /// Sum over all stages
    pub fn total(&self) -> Duration {
        self.poisson + self.source_vector + self.bem_product + self.laplace + self.projection
    }
}

/// Potentials and field of one evaluation
///
/// Potentials, including the boundary trace `phi_b_boundary`, are in
/// physical units (A), i.e. scaled by the unit length. The field and the GCR
/// surface charge are in the units of the magnetization (A/m).
#[derive(Debug, Clone)]
pub struct DemagSolution {
    /// Potential of the first interior solve
    pub phi_a: Array1<f64>,
    /// Dirichlet correction potential
    pub phi_b: Array1<f64>,
    /// Total scalar potential `φ_a + φ_b`
    pub phi: Array1<f64>,
    /// Boundary source vector the BEM matrix was applied to: the trace of
    /// `phi_a` for FK (A), the surface charge for GCR (A/m)
    pub q: Array1<f64>,
    /// BEM output on the boundary, the Dirichlet data of `phi_b` (A)
    pub phi_b_boundary: Array1<f64>,
    /// Nodal demagnetizing field, N×3
    pub field: Array2<f64>,
    /// CG iterations of the first solve
    pub poisson_iterations: usize,
    /// CG iterations of the correction solve
    pub laplace_iterations: usize,
    /// Per-stage timings
    pub timings: StageTimings,
    /// Length of one mesh unit in metres
    pub unit_length: f64,
}

impl DemagSolution {
    /// Demagnetization energy `−(μ0/2) ∫ M·H dV` in joules
    ///
    /// Uses the lumped mass of `mesh`; `magnetization` is the nodal `Ms·m`.
    pub fn energy(&self, mesh: &Mesh, magnetization: &Array2<f64>) -> Result<f64, DemagError> {
        let n = self.field.nrows();
        if mesh.num_nodes() != n || magnetization.dim() != (n, 3) {
            return Err(DemagError::InvalidInput(format!(
                "energy needs {n} nodes and an {n}x3 magnetization, got {} nodes and {:?}",
                mesh.num_nodes(),
                magnetization.dim()
            )));
        }

        let mass = assemble_lumped_mass(mesh);
        let m_dot_h: f64 = (0..n)
            .map(|i| {
                let dot: f64 = (0..3).map(|c| magnetization[[i, c]] * self.field[[i, c]]).sum();
                mass[i] * dot
            })
            .sum();
        Ok(-0.5 * MU0 * m_dot_h * self.unit_length.powi(3))
    }

    /// Per-component statistics of the field, weighted by `weights`
    pub fn statistics(&self, weights: &Array1<f64>) -> Result<FieldStatistics, DemagError> {
        FieldStatistics::compute(&self.field, weights)
    }

    /// Weighted average field
    pub fn average_field(&self, weights: &Array1<f64>) -> Result<[f64; 3], DemagError> {
        average_field(&self.field, weights)
    }
}
