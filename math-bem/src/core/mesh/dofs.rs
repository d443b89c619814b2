//! Boundary dof extraction and restriction/extension
//!
//! P1 dofs coincide with mesh nodes. The boundary dofs are the nodes of the
//! boundary faces, numbered 0..B in ascending full-mesh order, so the map is
//! the same on every call for the same mesh.

use fem::mesh::Mesh;
use ndarray::Array1;

use crate::core::error::DemagError;

/// Bidirectional map between full-mesh dofs and boundary-local dofs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoundaryDofMap {
    boundary_to_full: Vec<usize>,
    full_to_boundary: Vec<Option<usize>>,
}

impl BoundaryDofMap {
    /// Extract the boundary dofs of a mesh
    pub fn from_mesh(mesh: &Mesh) -> Result<Self, DemagError> {
        if mesh.boundaries.is_empty() {
            return Err(DemagError::Setup(
                "mesh has no boundary faces".to_string(),
            ));
        }
        Self::from_boundary_nodes(mesh.num_nodes(), mesh.boundary_nodes())
    }

    /// Build the map from a list of boundary nodes
    ///
    /// Nodes are sorted and deduplicated before numbering.
    pub fn from_boundary_nodes(
        num_full_dofs: usize,
        mut nodes: Vec<usize>,
    ) -> Result<Self, DemagError> {
        nodes.sort_unstable();
        nodes.dedup();
        if nodes.is_empty() {
            return Err(DemagError::Setup(
                "boundary dof extraction yielded no dofs".to_string(),
            ));
        }
        if let Some(&last) = nodes.last() {
            if last >= num_full_dofs {
                return Err(DemagError::Setup(format!(
                    "boundary node {last} out of range for {num_full_dofs} dofs"
                )));
            }
        }

        let mut full_to_boundary = vec![None; num_full_dofs];
        for (local, &full) in nodes.iter().enumerate() {
            full_to_boundary[full] = Some(local);
        }

        Ok(Self {
            boundary_to_full: nodes,
            full_to_boundary,
        })
    }

    /// Number of boundary dofs B
    pub fn num_boundary_dofs(&self) -> usize {
        self.boundary_to_full.len()
    }

    /// Number of full-mesh dofs N
    pub fn num_full_dofs(&self) -> usize {
        self.full_to_boundary.len()
    }

    /// Full-mesh index of every boundary dof, in boundary order
    pub fn boundary_to_full(&self) -> &[usize] {
        &self.boundary_to_full
    }

    /// Full-mesh index of boundary dof `local`
    #[inline]
    pub fn to_full(&self, local: usize) -> usize {
        self.boundary_to_full[local]
    }

    /// Boundary-local index of a full-mesh dof, `None` for interior dofs
    #[inline]
    pub fn to_boundary(&self, full: usize) -> Option<usize> {
        self.full_to_boundary.get(full).copied().flatten()
    }

    fn check_len(&self, context: &'static str, expected: usize, actual: usize) -> Result<(), DemagError> {
        if expected != actual {
            return Err(DemagError::IndexAlignment {
                context,
                expected,
                actual,
            });
        }
        Ok(())
    }

    /// Select the boundary entries of a full-mesh vector, in boundary order
    pub fn restrict(&self, full: &Array1<f64>) -> Result<Array1<f64>, DemagError> {
        self.check_len("restrict", self.num_full_dofs(), full.len())?;
        Ok(self.boundary_to_full.iter().map(|&i| full[i]).collect())
    }

    /// Scatter a boundary vector into a zero full-mesh vector
    pub fn extend(&self, boundary: &Array1<f64>) -> Result<Array1<f64>, DemagError> {
        self.check_len("extend", self.num_boundary_dofs(), boundary.len())?;
        let mut full = Array1::zeros(self.num_full_dofs());
        for (&i, &v) in self.boundary_to_full.iter().zip(boundary.iter()) {
            full[i] = v;
        }
        Ok(full)
    }
}
