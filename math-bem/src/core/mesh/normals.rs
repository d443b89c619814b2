//! Per-dof outward normals and coordinates of the boundary

use fem::mesh::{Mesh, Point};

use super::dofs::BoundaryDofMap;
use crate::core::error::DemagError;

/// Outward unit normal and coordinate of every boundary dof
#[derive(Debug, Clone, PartialEq)]
pub struct NormalTable {
    normals: Vec<Point>,
    coordinates: Vec<Point>,
}

impl NormalTable {
    /// Tabulate normals as the area-weighted mean of incident face normals
    pub fn new(mesh: &Mesh, dofs: &BoundaryDofMap) -> Result<Self, DemagError> {
        let b = dofs.num_boundary_dofs();
        let mut sums = vec![Point::zero(); b];

        for face in &mesh.boundaries {
            let (normal, area) = mesh.face_normal_and_area(face);
            for &node in &face.nodes {
                let local = dofs.to_boundary(node).ok_or_else(|| {
                    DemagError::Setup(format!("boundary face node {node} missing from dof map"))
                })?;
                sums[local] = sums[local] + normal * area;
            }
        }

        let normals = sums
            .iter()
            .enumerate()
            .map(|(local, s)| {
                s.normalized().ok_or_else(|| {
                    DemagError::Setup(format!(
                        "incident face normals cancel at boundary node {}",
                        dofs.to_full(local)
                    ))
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let coordinates = dofs
            .boundary_to_full()
            .iter()
            .map(|&i| mesh.nodes[i])
            .collect();

        Ok(Self {
            normals,
            coordinates,
        })
    }

    /// Outward unit normal of boundary dof `local`
    #[inline]
    pub fn normal(&self, local: usize) -> Point {
        self.normals[local]
    }

    /// Coordinate of boundary dof `local`
    #[inline]
    pub fn coordinate(&self, local: usize) -> Point {
        self.coordinates[local]
    }

    /// All coordinates in boundary order
    pub fn coordinates(&self) -> &[Point] {
        &self.coordinates
    }

    /// Number of tabulated dofs
    pub fn len(&self) -> usize {
        self.normals.len()
    }

    /// Whether the table is empty
    pub fn is_empty(&self) -> bool {
        self.normals.is_empty()
    }
}
