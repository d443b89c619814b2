//! Boundary source vectors
//!
//! The BEM operator acts on one value per boundary dof. For the single-layer
//! formulation this is the magnetic surface charge left after the grounded
//! interior solve, `q = n·(M − ∇φ_a)`; for the double-layer formulation it is
//! the boundary trace of the free-boundary potential.

use std::fmt;

use fem::mesh::{Mesh, Point};
use fem::postprocess::{NodalProjector, cell_gradients};
use ndarray::{Array1, Array2};
use solvers::parallel::parallel_map_indexed;

use crate::core::config::{DemagMethod, SourceVectorMethod};
use crate::core::error::{DemagError, SolveStage};
use crate::core::mesh::BoundarySurface;

/// Everything a source vector strategy may read for one field evaluation
#[derive(Debug, Clone, Copy)]
pub struct SourceInput<'a> {
    /// Volume mesh
    pub mesh: &'a Mesh,
    /// Boundary surface with its dof map and normals
    pub surface: &'a BoundarySurface,
    /// Nodal magnetization `Ms·m`, N×3
    pub magnetization: &'a Array2<f64>,
    /// Potential of the first interior solve, length N
    pub potential: &'a Array1<f64>,
    /// Lumped projector for nodal gradients
    pub projector: &'a NodalProjector,
}

impl SourceInput<'_> {
    fn magnetization_at(&self, node: usize) -> Point {
        Point::new_3d(
            self.magnetization[[node, 0]],
            self.magnetization[[node, 1]],
            self.magnetization[[node, 2]],
        )
    }

    fn potential_gradients(&self) -> Result<Array2<f64>, DemagError> {
        cell_gradients(self.mesh, self.potential).map_err(DemagError::linear_solve(
            SolveStage::Projection,
            self.mesh.num_nodes(),
            self.surface.num_dofs(),
        ))
    }
}

/// Strategy that turns an interior solution into the BEM input vector
pub trait SourceVectorAssembler: Send + Sync + fmt::Debug {
    /// Boundary-sized source vector, in boundary dof order
    fn assemble_source_vector(&self, input: &SourceInput<'_>) -> Result<Array1<f64>, DemagError>;
}

/// `q_i = n_i · (M_i − ∇φ_a(x_i))` with the lumped nodal gradient
#[derive(Debug, Clone, Copy, Default)]
pub struct PointEvaluation;

impl SourceVectorAssembler for PointEvaluation {
    fn assemble_source_vector(&self, input: &SourceInput<'_>) -> Result<Array1<f64>, DemagError> {
        let cells = input.potential_gradients()?;
        let nodal = input.projector.project(input.mesh, &cells).map_err(DemagError::linear_solve(
            SolveStage::Projection,
            input.mesh.num_nodes(),
            input.surface.num_dofs(),
        ))?;

        let dofs = input.surface.dofs();
        let normals = input.surface.normals();
        let q = parallel_map_indexed(dofs.num_boundary_dofs(), |local| {
            let node = dofs.to_full(local);
            let grad = Point::new_3d(nodal[[node, 0]], nodal[[node, 1]], nodal[[node, 2]]);
            normals
                .normal(local)
                .dot(&(input.magnetization_at(node) - grad))
        });
        Ok(Array1::from(q))
    }
}

/// Area-weighted average of `n_f · (M̄_f − ∇φ_a|cell)` over incident panels
///
/// Uses the facet normal and the gradient of the owning tetrahedron, so no
/// nodal projection is needed.
#[derive(Debug, Clone, Copy, Default)]
pub struct BoxAverage;

impl SourceVectorAssembler for BoxAverage {
    fn assemble_source_vector(&self, input: &SourceInput<'_>) -> Result<Array1<f64>, DemagError> {
        let cells = input.potential_gradients()?;
        let dofs = input.surface.dofs();
        let b = dofs.num_boundary_dofs();
        let mut charge = Array1::<f64>::zeros(b);
        let mut area = Array1::<f64>::zeros(b);

        for panel in input.surface.panels() {
            let mean_m = panel
                .nodes
                .iter()
                .fold(Point::zero(), |acc, &local| acc + input.magnetization_at(dofs.to_full(local)))
                * (1.0 / 3.0);
            let e = panel.element_idx;
            let grad = Point::new_3d(cells[[e, 0]], cells[[e, 1]], cells[[e, 2]]);
            let flux = panel.geometry.normal.dot(&(mean_m - grad));
            for &local in &panel.nodes {
                charge[local] += panel.geometry.area * flux;
                area[local] += panel.geometry.area;
            }
        }

        Ok(charge / area)
    }
}

/// Boundary trace of the interior potential
#[derive(Debug, Clone, Copy, Default)]
pub struct PotentialTrace;

impl SourceVectorAssembler for PotentialTrace {
    fn assemble_source_vector(&self, input: &SourceInput<'_>) -> Result<Array1<f64>, DemagError> {
        input.surface.dofs().restrict(input.potential)
    }
}

/// Strategy for a formulation
///
/// The double-layer formulation always takes the potential trace; the
/// charge strategy only applies to the single-layer one.
pub fn source_assembler(
    method: DemagMethod,
    source_vector: SourceVectorMethod,
) -> Box<dyn SourceVectorAssembler> {
    match (method, source_vector) {
        (DemagMethod::Fk, _) => Box::new(PotentialTrace),
        (DemagMethod::Gcr, SourceVectorMethod::PointEvaluation) => Box::new(PointEvaluation),
        (DemagMethod::Gcr, SourceVectorMethod::BoxAverage) => Box::new(BoxAverage),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use fem::mesh::unit_cube_tetrahedra;
    use fem::postprocess::ProjectionMethod;

    struct Fixture {
        mesh: Mesh,
        surface: BoundarySurface,
        projector: NodalProjector,
        magnetization: Array2<f64>,
    }

    fn fixture() -> Fixture {
        let mesh = unit_cube_tetrahedra(2).unwrap();
        let surface = BoundarySurface::new(&mesh).unwrap();
        let projector = NodalProjector::new(&mesh, ProjectionMethod::Lumped);
        let mut magnetization = Array2::zeros((mesh.num_nodes(), 3));
        magnetization.column_mut(0).fill(1.0);
        Fixture {
            mesh,
            surface,
            projector,
            magnetization,
        }
    }

    fn input<'a>(f: &'a Fixture, potential: &'a Array1<f64>) -> SourceInput<'a> {
        SourceInput {
            mesh: &f.mesh,
            surface: &f.surface,
            magnetization: &f.magnetization,
            potential,
            projector: &f.projector,
        }
    }

    #[test]
    fn test_charge_on_cube_faces() {
        let f = fixture();
        let zero = Array1::zeros(f.mesh.num_nodes());
        let dofs = f.surface.dofs();
        // Centres of the x = 1 and x = 0 faces, and of the y = 0 face
        let plus_x = dofs.to_boundary(9 + 3 + 2).unwrap();
        let minus_x = dofs.to_boundary(9 + 3).unwrap();
        let minus_y = dofs.to_boundary(9 + 1).unwrap();

        for assembler in [
            &PointEvaluation as &dyn SourceVectorAssembler,
            &BoxAverage as &dyn SourceVectorAssembler,
        ] {
            let q = assembler.assemble_source_vector(&input(&f, &zero)).unwrap();
            assert_eq!(q.len(), 26);
            assert_abs_diff_eq!(q[plus_x], 1.0, epsilon = 1e-12);
            assert_abs_diff_eq!(q[minus_x], -1.0, epsilon = 1e-12);
            assert_abs_diff_eq!(q[minus_y], 0.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_gradient_cancels_magnetization() {
        // φ = x has ∇φ = M, so no charge is left anywhere
        let f = fixture();
        let potential = Array1::from_iter(f.mesh.nodes.iter().map(|p| p.x));
        for assembler in [
            &PointEvaluation as &dyn SourceVectorAssembler,
            &BoxAverage as &dyn SourceVectorAssembler,
        ] {
            let q = assembler.assemble_source_vector(&input(&f, &potential)).unwrap();
            for &v in &q {
                assert_abs_diff_eq!(v, 0.0, epsilon = 1e-12);
            }
        }
    }

    #[test]
    fn test_potential_trace_and_selection() {
        let f = fixture();
        let potential = Array1::from_iter((0..f.mesh.num_nodes()).map(|i| i as f64));
        let q = PotentialTrace
            .assemble_source_vector(&input(&f, &potential))
            .unwrap();
        let expected: Array1<f64> = f
            .surface
            .dofs()
            .boundary_to_full()
            .iter()
            .map(|&i| i as f64)
            .collect();
        assert_eq!(q, expected);

        let fk = source_assembler(DemagMethod::Fk, SourceVectorMethod::BoxAverage);
        assert!(format!("{fk:?}").contains("PotentialTrace"));
        let gcr = source_assembler(DemagMethod::Gcr, SourceVectorMethod::BoxAverage);
        assert!(format!("{gcr:?}").contains("BoxAverage"));
    }

    #[test]
    fn test_wrong_potential_length() {
        let f = fixture();
        let short = Array1::zeros(3);
        assert!(PointEvaluation
            .assemble_source_vector(&input(&f, &short))
            .is_err());
        assert!(matches!(
            PotentialTrace.assemble_source_vector(&input(&f, &short)),
            Err(DemagError::IndexAlignment { .. })
        ));
    }
}
