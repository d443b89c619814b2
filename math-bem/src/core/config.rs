//! Demagnetization solver configuration
//!
//! All fields have defaults, so a partial JSON document such as
//! `{"method": "gcr"}` is a valid configuration.

use fem::postprocess::ProjectionMethod;
use fem::solver::{SolverConfig, SolverType};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use super::constants::DEFAULT_UNIT_LENGTH;
use super::error::DemagError;

/// Hybrid FEM-BEM formulation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DemagMethod {
    /// Fredkin–Koehler: natural-boundary Poisson solve, double-layer BEM
    #[default]
    Fk,
    /// Garcia-Cervera–Roma: Dirichlet Poisson solve, single-layer BEM
    Gcr,
}

/// How the boundary charge vector q is formed (GCR only)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceVectorMethod {
    /// Nodal normal dotted with nodal M − ∇φ_a
    #[default]
    PointEvaluation,
    /// Area-weighted average over incident boundary facets
    BoxAverage,
}

/// Configuration of a [`FemBemDemag`](super::solver::FemBemDemag) instance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DemagConfig {
    /// Formulation
    pub method: DemagMethod,
    /// Charge vector strategy
    pub source_vector: SourceVectorMethod,
    /// Solver for the magnetization-sourced interior problem
    pub poisson_solver: SolverConfig,
    /// Solver for the Dirichlet correction problem
    pub laplace_solver: SolverConfig,
    /// Projection of the cell-wise field onto the nodes
    pub projection: ProjectionMethod,
    /// Length of one mesh unit in metres
    pub unit_length: f64,
    /// Log setup and per-evaluation summaries
    pub verbose: bool,
}

impl Default for DemagConfig {
    fn default() -> Self {
        Self {
            method: DemagMethod::default(),
            source_vector: SourceVectorMethod::default(),
            poisson_solver: SolverConfig::default(),
            laplace_solver: SolverConfig::default(),
            projection: ProjectionMethod::default(),
            unit_length: DEFAULT_UNIT_LENGTH,
            verbose: false,
        }
    }
}

impl DemagConfig {
    /// Create a configuration with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the formulation
    pub fn with_method(mut self, method: DemagMethod) -> Self {
        self.method = method;
        self
    }

    /// Set the charge vector strategy
    pub fn with_source_vector(mut self, source_vector: SourceVectorMethod) -> Self {
        self.source_vector = source_vector;
        self
    }

    /// Set the Poisson solver
    pub fn with_poisson_solver(mut self, solver: SolverConfig) -> Self {
        self.poisson_solver = solver;
        self
    }

    /// Set the Laplace solver
    pub fn with_laplace_solver(mut self, solver: SolverConfig) -> Self {
        self.laplace_solver = solver;
        self
    }

    /// Use the same solver for both interior problems
    pub fn with_solver(self, solver: SolverConfig) -> Self {
        self.with_poisson_solver(solver.clone())
            .with_laplace_solver(solver)
    }

    /// Set the nodal projection
    pub fn with_projection(mut self, projection: ProjectionMethod) -> Self {
        self.projection = projection;
        self
    }

    /// Set the mesh unit length in metres
    pub fn with_unit_length(mut self, unit_length: f64) -> Self {
        self.unit_length = unit_length;
        self
    }

    /// Enable verbose output
    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Check value ranges
    pub fn validate(&self) -> Result<(), DemagError> {
        if !(self.unit_length > 0.0 && self.unit_length.is_finite()) {
            return Err(DemagError::Config(format!(
                "unit_length must be positive and finite, got {}",
                self.unit_length
            )));
        }
        for (name, solver) in [
            ("poisson_solver", &self.poisson_solver),
            ("laplace_solver", &self.laplace_solver),
        ] {
            if solver.solver_type == SolverType::Direct {
                continue;
            }
            if solver.max_iterations == 0 {
                return Err(DemagError::Config(format!(
                    "{name}.max_iterations must be positive"
                )));
            }
            if !(solver.tolerance > 0.0 && solver.tolerance.is_finite()) {
                return Err(DemagError::Config(format!(
                    "{name}.tolerance must be positive, got {}",
                    solver.tolerance
                )));
            }
        }
        Ok(())
    }

    /// Parse and validate a JSON configuration
    pub fn from_json(json: &str) -> Result<Self, DemagError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize to pretty-printed JSON
    pub fn to_json(&self) -> Result<String, DemagError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Load and validate a JSON configuration file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, DemagError> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)
            .map_err(|e| DemagError::Config(format!("cannot read {}: {e}", path.display())))?;
        Self::from_json(&contents)
    }

    /// Write the configuration as JSON
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), DemagError> {
        let path = path.as_ref();
        fs::write(path, self.to_json()?)
            .map_err(|e| DemagError::Config(format!("cannot write {}: {e}", path.display())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_uses_defaults() {
        let config = DemagConfig::from_json(r#"{"method": "gcr", "verbose": true}"#).unwrap();
        assert_eq!(config.method, DemagMethod::Gcr);
        assert!(config.verbose);
        assert_eq!(config.unit_length, DEFAULT_UNIT_LENGTH);
        assert_eq!(config.poisson_solver, SolverConfig::default());
    }

    #[test]
    fn test_json_round_trip() {
        let config = DemagConfig::new()
            .with_method(DemagMethod::Gcr)
            .with_source_vector(SourceVectorMethod::BoxAverage)
            .with_projection(ProjectionMethod::L2)
            .with_unit_length(5e-9)
            .with_laplace_solver(SolverConfig::direct());
        let parsed = DemagConfig::from_json(&config.to_json().unwrap()).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_file_round_trip() {
        let path = std::env::temp_dir().join(format!("demag_config_{}.json", std::process::id()));
        let config = DemagConfig::new().with_verbose(true);
        config.save(&path).unwrap();
        let loaded = DemagConfig::load(&path).unwrap();
        std::fs::remove_file(&path).ok();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_validation_rejects_bad_values() {
        assert!(matches!(
            DemagConfig::new().with_unit_length(0.0).validate(),
            Err(DemagError::Config(_))
        ));
        assert!(matches!(
            DemagConfig::new()
                .with_poisson_solver(SolverConfig::default().with_max_iterations(0))
                .validate(),
            Err(DemagError::Config(_))
        ));
        assert!(matches!(
            DemagConfig::from_json(r#"{"laplace_solver": {"tolerance": -1.0}}"#),
            Err(DemagError::Config(_))
        ));
        assert!(matches!(
            DemagConfig::from_json(r#"{"method": "fmm"}"#),
            Err(DemagError::Config(_))
        ));
        // Iteration settings are irrelevant to the direct solver
        assert!(DemagConfig::new()
            .with_solver(SolverConfig::direct().with_max_iterations(0))
            .validate()
            .is_ok());
    }
}
