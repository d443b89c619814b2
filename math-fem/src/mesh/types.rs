//! Mesh types for 3D tetrahedral finite element analysis
//!
//! A [`Mesh`] owns node coordinates, P1 tetrahedra and the list of boundary
//! faces. Boundary faces are stored with a winding whose right-hand normal
//! points out of the body, which is what the boundary element kernels expect.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::ops::{Add, Mul, Sub};
use thiserror::Error;

/// Relative volume below which a tetrahedron is considered degenerate
const DEGENERATE_VOLUME_RTOL: f64 = 1e-14;

/// Errors raised while building or validating a mesh
#[derive(Debug, Error, Clone, PartialEq)]
pub enum MeshError {
    #[error("Mesh has no nodes or no elements")]
    Empty,
    #[error("Element {element} references node {node}, but the mesh has {num_nodes} nodes")]
    NodeIndexOutOfRange {
        element: usize,
        node: usize,
        num_nodes: usize,
    },
    #[error("Element {element} is degenerate (volume {volume:e})")]
    DegenerateElement { element: usize, volume: f64 },
    #[error("Face {nodes:?} is shared by {count} elements (non-manifold)")]
    NonManifoldFace { nodes: [usize; 3], count: usize },
    #[error("Invalid mesh parameter: {0}")]
    InvalidParameter(String),
}

/// A point (or vector) in 3D space
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Point {
    /// Create a 3D point
    pub const fn new_3d(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Origin / zero vector
    pub const fn zero() -> Self {
        Self::new_3d(0.0, 0.0, 0.0)
    }

    /// Coordinates as an array
    pub fn to_array(self) -> [f64; 3] {
        [self.x, self.y, self.z]
    }

    /// Dot product
    #[inline]
    pub fn dot(&self, other: &Point) -> f64 {
        self.x * other.x + self.y * other.y + self.z * other.z
    }

    /// Cross product
    #[inline]
    pub fn cross(&self, other: &Point) -> Point {
        Point::new_3d(
            self.y * other.z - self.z * other.y,
            self.z * other.x - self.x * other.z,
            self.x * other.y - self.y * other.x,
        )
    }

    /// Euclidean norm
    #[inline]
    pub fn norm(&self) -> f64 {
        self.dot(self).sqrt()
    }

    /// Maximum-norm |x|∞
    #[inline]
    pub fn max_norm(&self) -> f64 {
        self.x.abs().max(self.y.abs()).max(self.z.abs())
    }

    /// Unit vector in the same direction, or `None` for a (near) zero vector
    pub fn normalized(&self) -> Option<Point> {
        let n = self.norm();
        if n > 1e-300 {
            Some(*self * (1.0 / n))
        } else {
            None
        }
    }

    /// Euclidean distance to another point
    pub fn distance(&self, other: &Point) -> f64 {
        (*self - *other).norm()
    }
}

impl Add for Point {
    type Output = Point;
    fn add(self, rhs: Point) -> Point {
        Point::new_3d(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl Sub for Point {
    type Output = Point;
    fn sub(self, rhs: Point) -> Point {
        Point::new_3d(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl Mul<f64> for Point {
    type Output = Point;
    fn mul(self, s: f64) -> Point {
        Point::new_3d(self.x * s, self.y * s, self.z * s)
    }
}

impl From<(f64, f64, f64)> for Point {
    fn from(p: (f64, f64, f64)) -> Self {
        Point::new_3d(p.0, p.1, p.2)
    }
}

/// A linear (P1) tetrahedron
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tetrahedron {
    /// Vertex node indices
    pub nodes: [usize; 4],
}

impl Tetrahedron {
    /// Local faces, each listed with the local index of the opposite vertex
    pub const LOCAL_FACES: [([usize; 3], usize); 4] = [
        ([1, 2, 3], 0),
        ([0, 2, 3], 1),
        ([0, 1, 3], 2),
        ([0, 1, 2], 3),
    ];

    /// Tetrahedron with the given vertex nodes
    pub fn new(nodes: [usize; 4]) -> Self {
        Self { nodes }
    }

}

/// A boundary face of the tetrahedral mesh
///
/// `nodes` are ordered counter-clockwise when seen from outside, so
/// `(p1 - p0) × (p2 - p0)` is the outward normal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoundaryFace {
    /// Node indices of the triangle, outward winding
    pub nodes: [usize; 3],
    /// Owning element index
    pub element_idx: usize,
    /// Local face index within the element (index of the opposite vertex)
    pub local_idx: usize,
}

/// A tetrahedral finite element mesh
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Mesh {
    /// Node coordinates
    pub nodes: Vec<Point>,
    /// Tetrahedral elements
    pub elements: Vec<Tetrahedron>,
    /// Boundary faces, outward oriented, sorted by their node set
    pub boundaries: Vec<BoundaryFace>,
}

impl Mesh {
    /// Create a new empty mesh
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a validated mesh from coordinates and connectivity
    ///
    /// Checks node indices and element volumes, then detects the boundary.
    pub fn from_parts(nodes: Vec<Point>, elements: Vec<[usize; 4]>) -> Result<Self, MeshError> {
        let mut mesh = Self {
            nodes,
            elements: elements.into_iter().map(Tetrahedron::new).collect(),
            boundaries: Vec::new(),
        };
        mesh.validate()?;
        mesh.detect_boundaries()?;
        Ok(mesh)
    }

    /// Number of nodes
    pub fn num_nodes(&self) -> usize {
        self.nodes.len()
    }

    /// Number of elements
    pub fn num_elements(&self) -> usize {
        self.elements.len()
    }

    /// Get node coordinates
    pub fn node(&self, idx: usize) -> &Point {
        &self.nodes[idx]
    }

    /// Get element
    pub fn element(&self, idx: usize) -> &Tetrahedron {
        &self.elements[idx]
    }

    /// Check connectivity and element volumes
    pub fn validate(&self) -> Result<(), MeshError> {
        if self.nodes.is_empty() || self.elements.is_empty() {
            return Err(MeshError::Empty);
        }
        let num_nodes = self.nodes.len();
        for (element, elem) in self.elements.iter().enumerate() {
            if let Some(&node) = elem.nodes.iter().find(|&&n| n >= num_nodes) {
                return Err(MeshError::NodeIndexOutOfRange {
                    element,
                    node,
                    num_nodes,
                });
            }
        }

        let scale = self.characteristic_length();
        let min_volume = DEGENERATE_VOLUME_RTOL * scale * scale * scale;
        for element in 0..self.elements.len() {
            let volume = self.element_measure(element);
            if volume <= min_volume {
                return Err(MeshError::DegenerateElement { element, volume });
            }
        }
        Ok(())
    }

    /// Find the boundary faces and store them with outward orientation
    ///
    /// Faces referenced by exactly one element are boundary faces; a face
    /// shared by more than two elements makes the mesh non-manifold. The
    /// result is sorted by node set, so repeated calls give identical output.
    pub fn detect_boundaries(&mut self) -> Result<(), MeshError> {
        self.boundaries.clear();

        // Sorted triple -> (owning element, local face, count)
        let mut face_count: BTreeMap<[usize; 3], (usize, usize, usize)> = BTreeMap::new();

        for (elem_idx, elem) in self.elements.iter().enumerate() {
            for (local_idx, (face, _)) in Tetrahedron::LOCAL_FACES.iter().enumerate() {
                let mut key = [
                    elem.nodes[face[0]],
                    elem.nodes[face[1]],
                    elem.nodes[face[2]],
                ];
                key.sort_unstable();
                face_count
                    .entry(key)
                    .and_modify(|e| e.2 += 1)
                    .or_insert((elem_idx, local_idx, 1));
            }
        }

        for (key, (elem_idx, local_idx, count)) in face_count {
            match count {
                1 => {
                    let nodes = self.outward_face(elem_idx, local_idx);
                    self.boundaries.push(BoundaryFace {
                        nodes,
                        element_idx: elem_idx,
                        local_idx,
                    });
                }
                2 => {}
                _ => return Err(MeshError::NonManifoldFace { nodes: key, count }),
            }
        }

        Ok(())
    }

    /// Local face of an element, wound so that its normal points away from
    /// the opposite vertex
    fn outward_face(&self, elem_idx: usize, local_idx: usize) -> [usize; 3] {
        let elem = &self.elements[elem_idx];
        let (face, opposite) = Tetrahedron::LOCAL_FACES[local_idx];
        let a = elem.nodes[face[0]];
        let b = elem.nodes[face[1]];
        let c = elem.nodes[face[2]];
        let pa = self.nodes[a];
        let normal = (self.nodes[b] - pa).cross(&(self.nodes[c] - pa));
        let to_opposite = self.nodes[elem.nodes[opposite]] - pa;
        if normal.dot(&to_opposite) > 0.0 {
            [a, c, b]
        } else {
            [a, b, c]
        }
    }

    /// All nodes lying on a boundary face, sorted ascending and deduplicated
    pub fn boundary_nodes(&self) -> Vec<usize> {
        let mut nodes: Vec<usize> = self
            .boundaries
            .iter()
            .flat_map(|b| b.nodes.iter().copied())
            .collect();
        nodes.sort_unstable();
        nodes.dedup();
        nodes
    }

    /// Outward unit normal and area of a boundary face
    pub fn face_normal_and_area(&self, face: &BoundaryFace) -> (Point, f64) {
        let [a, b, c] = face.nodes.map(|i| self.nodes[i]);
        let n = (b - a).cross(&(c - a));
        let twice_area = n.norm();
        let unit = n.normalized().unwrap_or_else(Point::zero);
        (unit, 0.5 * twice_area)
    }

    /// Vertex coordinates of an element
    pub fn element_points(&self, elem_idx: usize) -> [Point; 4] {
        self.elements[elem_idx].nodes.map(|i| self.nodes[i])
    }

    /// Compute element centroid
    pub fn element_centroid(&self, elem_idx: usize) -> Point {
        let p = self.element_points(elem_idx);
        (p[0] + p[1] + p[2] + p[3]) * 0.25
    }

    /// Signed volume (positive for right-handed vertex order)
    pub fn element_signed_volume(&self, elem_idx: usize) -> f64 {
        let p = self.element_points(elem_idx);
        let e1 = p[1] - p[0];
        let e2 = p[2] - p[0];
        let e3 = p[3] - p[0];
        e1.dot(&e2.cross(&e3)) / 6.0
    }

    /// Element volume
    pub fn element_measure(&self, elem_idx: usize) -> f64 {
        self.element_signed_volume(elem_idx).abs()
    }

    /// Total volume of the mesh
    pub fn total_volume(&self) -> f64 {
        (0..self.num_elements())
            .map(|i| self.element_measure(i))
            .sum()
    }

    /// Gradients of the four P1 basis functions (constant on the element)
    pub fn element_gradients(&self, elem_idx: usize) -> [Point; 4] {
        let p = self.element_points(elem_idx);
        let e1 = p[1] - p[0];
        let e2 = p[2] - p[0];
        let e3 = p[3] - p[0];
        let det = e1.dot(&e2.cross(&e3));
        let inv = if det.abs() > 0.0 { 1.0 / det } else { 0.0 };
        let g1 = e2.cross(&e3) * inv;
        let g2 = e3.cross(&e1) * inv;
        let g3 = e1.cross(&e2) * inv;
        let g0 = (g1 + g2 + g3) * -1.0;
        [g0, g1, g2, g3]
    }

    /// Axis-aligned bounding box (min, max)
    pub fn bounding_box(&self) -> (Point, Point) {
        let mut lo = Point::new_3d(f64::INFINITY, f64::INFINITY, f64::INFINITY);
        let mut hi = Point::new_3d(f64::NEG_INFINITY, f64::NEG_INFINITY, f64::NEG_INFINITY);
        for p in &self.nodes {
            lo = Point::new_3d(lo.x.min(p.x), lo.y.min(p.y), lo.z.min(p.z));
            hi = Point::new_3d(hi.x.max(p.x), hi.y.max(p.y), hi.z.max(p.z));
        }
        (lo, hi)
    }

    /// Bounding box diagonal, used as the length scale for tolerances
    pub fn characteristic_length(&self) -> f64 {
        if self.nodes.is_empty() {
            return 0.0;
        }
        let (lo, hi) = self.bounding_box();
        lo.distance(&hi)
    }
}
