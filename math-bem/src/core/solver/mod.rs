//! Hybrid FEM-BEM demagnetizing field solver
//!
//! The field of a magnetized body is `H = −∇φ` with `Δφ = ∇·M` inside,
//! `Δφ = 0` outside and `φ → 0` at infinity. The exterior is handled by a
//! dense boundary matrix built once per mesh; each evaluation then runs
//!
//! 1. an interior solve sourced by the magnetization,
//! 2. a boundary source vector from that solution,
//! 3. a dense BEM product giving boundary potentials,
//! 4. a Dirichlet Laplace solve with those potentials,
//! 5. superposition and a nodal projection of `−∇φ`.
//!
//! # Example
//!
//! ```ignore
//! use math_magnetics_bem::core::{DemagConfig, FemBemDemag};
//! use math_magnetics_fem::mesh::ball_mesh_tetrahedra;
//!
//! let mesh = ball_mesh_tetrahedra(10.0, 6)?;
//! let demag = FemBemDemag::new(mesh, DemagConfig::default())?;
//! let solution = demag.compute_field(&m, &ms)?;
//! println!("<H> = {:?}", solution.average_field(demag.lumped_mass())?);
//! ```

pub mod solution;
pub mod source_vector;

pub use solution::{DemagSolution, StageTimings};
pub use source_vector::{
    BoxAverage, PointEvaluation, PotentialTrace, SourceInput, SourceVectorAssembler,
    source_assembler,
};

use std::time::Instant;

use fem::assembly::{assemble_divergence_load, assemble_stiffness};
use fem::boundary::DirichletElimination;
use fem::mesh::Mesh;
use fem::postprocess::{NodalProjector, ProjectionMethod, cell_gradients};
use fem::solver::{SolverConfig, solve_csr_with_guess};
use ndarray::{Array1, Array2, Axis};
use solvers::parallel::is_parallel_available;

use crate::core::assembly::BemMatrix;
use crate::core::config::{DemagConfig, DemagMethod};
use crate::core::error::{DemagError, SolveStage};
use crate::core::mesh::BoundarySurface;

/// Constraint set of the first interior solve
#[derive(Debug, Clone)]
enum PoissonSystem {
    /// Natural boundary data, one node pinned to zero (FK)
    Pinned(DirichletElimination),
    /// Homogeneous Dirichlet data on the whole boundary (GCR)
    Grounded,
}

/// Demagnetizing field solver for one fixed mesh
///
/// Setup builds the boundary surface, the BEM matrix and the eliminated
/// interior systems. [`compute_field`](Self::compute_field) borrows `self`
/// immutably and owns all per-call buffers, so one instance can serve
/// several threads.
#[derive(Debug)]
pub struct FemBemDemag {
    mesh: Mesh,
    config: DemagConfig,
    surface: BoundarySurface,
    bem: BemMatrix,
    poisson: PoissonSystem,
    boundary_system: DirichletElimination,
    source: Box<dyn SourceVectorAssembler>,
    gradient_projector: NodalProjector,
    field_projector: NodalProjector,
}

impl FemBemDemag {
    /// Set up the solver for `mesh`
    ///
    /// Boundary faces are detected if the mesh has none yet. Fails with
    /// [`DemagError::Setup`] for meshes without a closed boundary and with
    /// [`DemagError::Config`] for invalid configuration values.
    pub fn new(mut mesh: Mesh, config: DemagConfig) -> Result<Self, DemagError> {
        config.validate()?;
        let start = Instant::now();

        mesh.validate()?;
        if mesh.boundaries.is_empty() {
            mesh.detect_boundaries()?;
        }
        let surface = BoundarySurface::new(&mesh)?;

        let bem_start = Instant::now();
        let bem = match config.method {
            DemagMethod::Fk => BemMatrix::double_layer(&surface)?,
            DemagMethod::Gcr => BemMatrix::single_layer(&surface)?,
        };
        let bem_time = bem_start.elapsed();

        let stiffness = assemble_stiffness(&mesh).to_csr();
        let boundary_system =
            DirichletElimination::new(&stiffness, surface.dofs().boundary_to_full())?;
        let poisson = match config.method {
            DemagMethod::Fk => {
                // The pure Neumann problem fixes φ only up to a constant
                let pin = surface.dofs().to_full(0);
                PoissonSystem::Pinned(DirichletElimination::new(&stiffness, &[pin])?)
            }
            DemagMethod::Gcr => PoissonSystem::Grounded,
        };

        let gradient_projector = NodalProjector::new(&mesh, ProjectionMethod::Lumped);
        let field_projector = NodalProjector::new(&mesh, config.projection);
        let source = source_assembler(config.method, config.source_vector);

        if config.verbose {
            log::info!(
                "[Demag] Setup ({:?}): {} nodes, {} elements, {} boundary dofs, {} panels, parallel: {}",
                config.method,
                mesh.num_nodes(),
                mesh.num_elements(),
                surface.num_dofs(),
                surface.num_panels(),
                is_parallel_available()
            );
            log::info!(
                "[Demag] BEM matrix {}x{} ({:.1} MB) in {:.1}ms, setup total {:.1}ms",
                bem.size(),
                bem.size(),
                (bem.size() * bem.size() * std::mem::size_of::<f64>()) as f64 / 1.0e6,
                bem_time.as_secs_f64() * 1000.0,
                start.elapsed().as_secs_f64() * 1000.0
            );
        }

        Ok(Self {
            mesh,
            config,
            surface,
            bem,
            poisson,
            boundary_system,
            source,
            gradient_projector,
            field_projector,
        })
    }

    /// The mesh the solver was built for
    pub fn mesh(&self) -> &Mesh {
        &self.mesh
    }

    /// Configuration in use
    pub fn config(&self) -> &DemagConfig {
        &self.config
    }

    /// Boundary surface, dof map and normals
    pub fn surface(&self) -> &BoundarySurface {
        &self.surface
    }

    /// The BEM matrix
    pub fn bem(&self) -> &BemMatrix {
        &self.bem
    }

    /// Lumped nodal masses, the natural weights for field averages
    pub fn lumped_mass(&self) -> &Array1<f64> {
        self.gradient_projector.lumped_mass()
    }

    /// Nodal magnetization `M_i = Ms_i · m_i`
    pub fn magnetization(&self, m: &Array2<f64>, ms: &Array1<f64>) -> Result<Array2<f64>, DemagError> {
        let n = self.mesh.num_nodes();
        if m.dim() != (n, 3) {
            return Err(DemagError::InvalidInput(format!(
                "magnetization must be {n}x3, got {:?}",
                m.dim()
            )));
        }
        if ms.len() != n {
            return Err(DemagError::InvalidInput(format!(
                "saturation magnetization must have {n} entries, got {}",
                ms.len()
            )));
        }
        if m.iter().chain(ms.iter()).any(|v| !v.is_finite()) {
            return Err(DemagError::InvalidInput(
                "magnetization contains non-finite values".to_string(),
            ));
        }
        Ok(m * &ms.view().insert_axis(Axis(1)))
    }

    /// Compute the demagnetizing field of `Ms · m`
    ///
    /// `m` is the N×3 nodal direction field and `ms` the nodal saturation
    /// magnetization. The returned field has the units of `ms`.
    pub fn compute_field(&self, m: &Array2<f64>, ms: &Array1<f64>) -> Result<DemagSolution, DemagError> {
        let magnetization = self.magnetization(m, ms)?;
        let n = self.mesh.num_nodes();
        let b = self.surface.num_dofs();
        let dofs = self.surface.dofs();

        let stage_start = Instant::now();
        let load = assemble_divergence_load(&self.mesh, &magnetization);
        let (phi_a, poisson_iterations) = match &self.poisson {
            PoissonSystem::Pinned(system) => {
                let rhs = system.rhs(&load, &Array1::zeros(1))?;
                self.solve(SolveStage::Poisson, system, &rhs, None, &self.config.poisson_solver)?
            }
            PoissonSystem::Grounded => {
                let rhs = self.boundary_system.rhs(&load, &Array1::zeros(b))?;
                self.solve(
                    SolveStage::Poisson,
                    &self.boundary_system,
                    &rhs,
                    None,
                    &self.config.poisson_solver,
                )?
            }
        };
        let poisson_time = stage_start.elapsed();

        let stage_start = Instant::now();
        let q = self.source.assemble_source_vector(&SourceInput {
            mesh: &self.mesh,
            surface: &self.surface,
            magnetization: &magnetization,
            potential: &phi_a,
            projector: &self.gradient_projector,
        })?;
        let source_time = stage_start.elapsed();

        let stage_start = Instant::now();
        let phi_b_boundary = self.bem.apply(&q)?;
        let bem_time = stage_start.elapsed();

        let stage_start = Instant::now();
        let rhs = self.boundary_system.rhs(&Array1::zeros(n), &phi_b_boundary)?;
        let guess = dofs.extend(&phi_b_boundary)?;
        let (phi_b, laplace_iterations) = self.solve(
            SolveStage::Laplace,
            &self.boundary_system,
            &rhs,
            Some(&guess),
            &self.config.laplace_solver,
        )?;
        let laplace_time = stage_start.elapsed();

        let stage_start = Instant::now();
        let phi = &phi_a + &phi_b;
        let gradients = cell_gradients(&self.mesh, &phi)
            .map_err(DemagError::linear_solve(SolveStage::Projection, n, b))?;
        let field = -self
            .field_projector
            .project(&self.mesh, &gradients)
            .map_err(DemagError::linear_solve(SolveStage::Projection, n, b))?;
        let projection_time = stage_start.elapsed();

        let timings = StageTimings {
            poisson: poisson_time,
            source_vector: source_time,
            bem_product: bem_time,
            laplace: laplace_time,
            projection: projection_time,
        };

        if self.config.verbose {
            log::info!(
                "[Demag] Field: poisson {} iters, laplace {} iters, total {:.1}ms",
                poisson_iterations,
                laplace_iterations,
                timings.total().as_secs_f64() * 1000.0
            );
            log::debug!("[Demag] Stage timings: {timings:?}");
        }

        let scale = self.config.unit_length;
        // The FK source is a potential trace, the GCR source a surface charge
        let q = match self.config.method {
            DemagMethod::Fk => q * scale,
            DemagMethod::Gcr => q,
        };
        Ok(DemagSolution {
            phi_a: phi_a * scale,
            phi_b: phi_b * scale,
            phi: phi * scale,
            q,
            phi_b_boundary: phi_b_boundary * scale,
            field,
            poisson_iterations,
            laplace_iterations,
            timings,
            unit_length: scale,
        })
    }

    fn solve(
        &self,
        stage: SolveStage,
        system: &DirichletElimination,
        rhs: &Array1<f64>,
        guess: Option<&Array1<f64>>,
        config: &SolverConfig,
    ) -> Result<(Array1<f64>, usize), DemagError> {
        let solution = solve_csr_with_guess(system.matrix(), rhs, guess, config).map_err(
            DemagError::linear_solve(stage, self.mesh.num_nodes(), self.surface.num_dofs()),
        )?;
        log::debug!(
            "[Demag] {stage}: {} iters, residual {:.2e}",
            solution.iterations,
            solution.residual
        );
        Ok((solution.values, solution.iterations))
    }
}
