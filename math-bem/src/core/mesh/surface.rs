//! Boundary surface of a tetrahedral mesh as a set of BEM panels
//!
//! Panels are the oriented boundary faces of the FEM mesh with their vertices
//! renumbered into boundary-local dofs. The surface must be closed: every
//! panel edge is shared by exactly two panels.

use std::collections::BTreeMap;

use fem::mesh::Mesh;

use super::dofs::BoundaryDofMap;
use super::normals::NormalTable;
use crate::core::error::DemagError;
use crate::core::integration::PanelGeometry;

/// One boundary triangle
#[derive(Debug, Clone, Copy)]
pub struct SurfacePanel {
    /// Vertices as boundary-local dofs, wound with the outward normal
    pub nodes: [usize; 3],
    /// Tetrahedron the face belongs to
    pub element_idx: usize,
    /// Flat-panel geometry
    pub geometry: PanelGeometry,
}

impl SurfacePanel {
    /// Whether boundary dof `local` is one of the panel's vertices
    #[inline]
    pub fn touches(&self, local: usize) -> bool {
        self.nodes.contains(&local)
    }
}

/// Boundary dofs, their normals and the panels connecting them
///
/// Built once per mesh; everything downstream indexes boundary data through
/// the same dof map held here.
#[derive(Debug, Clone)]
pub struct BoundarySurface {
    dofs: BoundaryDofMap,
    normals: NormalTable,
    panels: Vec<SurfacePanel>,
}

impl BoundarySurface {
    /// Extract the boundary surface of a mesh with detected boundaries
    pub fn new(mesh: &Mesh) -> Result<Self, DemagError> {
        let dofs = BoundaryDofMap::from_mesh(mesh)?;
        let normals = NormalTable::new(mesh, &dofs)?;

        let mut panels = Vec::with_capacity(mesh.boundaries.len());
        for (face_idx, face) in mesh.boundaries.iter().enumerate() {
            let mut nodes = [0usize; 3];
            for (slot, &full) in nodes.iter_mut().zip(face.nodes.iter()) {
                *slot = dofs.to_boundary(full).ok_or_else(|| {
                    DemagError::Setup(format!("boundary face {face_idx} uses unmapped node {full}"))
                })?;
            }
            let [a, b, c] = face.nodes.map(|n| mesh.nodes[n]);
            let geometry = PanelGeometry::new(a, b, c).ok_or_else(|| {
                DemagError::Setup(format!("boundary face {face_idx} has zero area"))
            })?;
            panels.push(SurfacePanel {
                nodes,
                element_idx: face.element_idx,
                geometry,
            });
        }

        check_closed(&panels)?;

        Ok(Self {
            dofs,
            normals,
            panels,
        })
    }

    /// Boundary dof map
    pub fn dofs(&self) -> &BoundaryDofMap {
        &self.dofs
    }

    /// Normal and coordinate table
    pub fn normals(&self) -> &NormalTable {
        &self.normals
    }

    /// Boundary panels in mesh face order
    pub fn panels(&self) -> &[SurfacePanel] {
        &self.panels
    }

    /// Number of boundary dofs
    pub fn num_dofs(&self) -> usize {
        self.dofs.num_boundary_dofs()
    }

    /// Number of panels
    pub fn num_panels(&self) -> usize {
        self.panels.len()
    }

    /// Total surface area
    pub fn area(&self) -> f64 {
        self.panels.iter().map(|p| p.geometry.area).sum()
    }
}

/// Every edge must be shared by exactly two panels
fn check_closed(panels: &[SurfacePanel]) -> Result<(), DemagError> {
    let mut edges: BTreeMap<(usize, usize), usize> = BTreeMap::new();
    for panel in panels {
        for e in 0..3 {
            let a = panel.nodes[e];
            let b = panel.nodes[(e + 1) % 3];
            *edges.entry((a.min(b), a.max(b))).or_insert(0) += 1;
        }
    }

    match edges.iter().find(|&(_, &count)| count != 2) {
        Some((&(a, b), &count)) => Err(DemagError::Setup(format!(
            "boundary surface is not closed: edge ({a}, {b}) is shared by {count} panels"
        ))),
        None => Ok(()),
    }
}
