//! Mesh generators for common domains
//!
//! Structured tetrahedral meshes for boxes and balls. Both use the Kuhn
//! split of a hexahedral grid, so every element is positively oriented.

use super::types::{Mesh, MeshError, Point};

/// Generate a box mesh with tetrahedral elements
#[allow(clippy::too_many_arguments)]
pub fn box_mesh_tetrahedra(
    x_min: f64,
    x_max: f64,
    y_min: f64,
    y_max: f64,
    z_min: f64,
    z_max: f64,
    nx: usize,
    ny: usize,
    nz: usize,
) -> Result<Mesh, MeshError> {
    if nx == 0 || ny == 0 || nz == 0 {
        return Err(MeshError::InvalidParameter(format!(
            "box subdivisions must be positive, got ({nx}, {ny}, {nz})"
        )));
    }
    if !(x_max > x_min && y_max > y_min && z_max > z_min) {
        return Err(MeshError::InvalidParameter(
            "box extents must satisfy min < max on every axis".to_string(),
        ));
    }

    let dx = (x_max - x_min) / nx as f64;
    let dy = (y_max - y_min) / ny as f64;
    let dz = (z_max - z_min) / nz as f64;

    let (grid, elements) = kuhn_grid(nx, ny, nz);
    let nodes = grid
        .into_iter()
        .map(|[i, j, k]| {
            Point::new_3d(
                x_min + i as f64 * dx,
                y_min + j as f64 * dy,
                z_min + k as f64 * dz,
            )
        })
        .collect();

    Mesh::from_parts(nodes, elements)
}

/// Generate a unit cube mesh with tetrahedra
pub fn unit_cube_tetrahedra(n: usize) -> Result<Mesh, MeshError> {
    box_mesh_tetrahedra(0.0, 1.0, 0.0, 1.0, 0.0, 1.0, n, n, n)
}

/// Generate a ball mesh centred at the origin
///
/// The cube [-1, 1]³ split into `n` cells per axis is mapped radially onto
/// the ball with `x -> radius * x * |x|∞ / |x|₂`. Cube faces land on the
/// sphere, so every boundary node lies exactly at distance `radius`.
pub fn ball_mesh_tetrahedra(radius: f64, n: usize) -> Result<Mesh, MeshError> {
    if n == 0 {
        return Err(MeshError::InvalidParameter(
            "ball subdivisions must be positive".to_string(),
        ));
    }
    if !(radius > 0.0 && radius.is_finite()) {
        return Err(MeshError::InvalidParameter(format!(
            "ball radius must be positive and finite, got {radius}"
        )));
    }

    let h = 2.0 / n as f64;
    let (grid, elements) = kuhn_grid(n, n, n);
    let nodes = grid
        .into_iter()
        .map(|[i, j, k]| {
            let p = Point::new_3d(
                -1.0 + i as f64 * h,
                -1.0 + j as f64 * h,
                -1.0 + k as f64 * h,
            );
            let r2 = p.norm();
            if r2 > 0.0 {
                p * (radius * p.max_norm() / r2)
            } else {
                p
            }
        })
        .collect();

    Mesh::from_parts(nodes, elements)
}

/// Grid indices and Kuhn connectivity for an nx × ny × nz block of cells
fn kuhn_grid(nx: usize, ny: usize, nz: usize) -> (Vec<[usize; 3]>, Vec<[usize; 4]>) {
    let mut grid = Vec::with_capacity((nx + 1) * (ny + 1) * (nz + 1));
    for k in 0..=nz {
        for j in 0..=ny {
            for i in 0..=nx {
                grid.push([i, j, k]);
            }
        }
    }

    let node_idx =
        |i: usize, j: usize, k: usize| -> usize { k * (ny + 1) * (nx + 1) + j * (nx + 1) + i };

    let mut elements = Vec::with_capacity(6 * nx * ny * nz);
    for k in 0..nz {
        for j in 0..ny {
            for i in 0..nx {
                let n000 = node_idx(i, j, k);
                let n100 = node_idx(i + 1, j, k);
                let n010 = node_idx(i, j + 1, k);
                let n110 = node_idx(i + 1, j + 1, k);
                let n001 = node_idx(i, j, k + 1);
                let n101 = node_idx(i + 1, j, k + 1);
                let n011 = node_idx(i, j + 1, k + 1);
                let n111 = node_idx(i + 1, j + 1, k + 1);

                // Six tetrahedra around the main diagonal
                elements.push([n000, n100, n110, n111]);
                elements.push([n000, n110, n010, n111]);
                elements.push([n000, n010, n011, n111]);
                elements.push([n000, n011, n001, n111]);
                elements.push([n000, n001, n101, n111]);
                elements.push([n000, n101, n100, n111]);
            }
        }
    }

    (grid, elements)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_box_mesh_tetrahedra() {
        let mesh = box_mesh_tetrahedra(0.0, 2.0, 0.0, 1.0, 0.0, 1.0, 2, 2, 2).unwrap();
        assert_eq!(mesh.num_nodes(), 27);
        assert_eq!(mesh.num_elements(), 48);
        assert_relative_eq!(mesh.total_volume(), 2.0, epsilon = 1e-12);
        for e in 0..mesh.num_elements() {
            assert!(mesh.element_signed_volume(e) > 0.0);
        }
    }

    #[test]
    fn test_boundary_detection() {
        let mesh = unit_cube_tetrahedra(2).unwrap();
        // 6 cube faces, 2x2 squares each, 2 triangles per square
        assert_eq!(mesh.boundaries.len(), 48);
        // Every grid node except the centre one
        assert_eq!(mesh.boundary_nodes().len(), 26);

        let area: f64 = mesh
            .boundaries
            .iter()
            .map(|f| mesh.face_normal_and_area(f).1)
            .sum();
        assert_relative_eq!(area, 6.0, epsilon = 1e-12);
    }

    #[test]
    fn test_ball_mesh_boundary_on_sphere() {
        let radius = 2.5;
        let mesh = ball_mesh_tetrahedra(radius, 4).unwrap();
        assert_eq!(mesh.num_nodes(), 125);

        for &node in &mesh.boundary_nodes() {
            assert_relative_eq!(mesh.nodes[node].norm(), radius, epsilon = 1e-12);
        }
        for e in 0..mesh.num_elements() {
            assert!(mesh.element_signed_volume(e) > 0.0);
        }

        let exact = 4.0 / 3.0 * std::f64::consts::PI * radius.powi(3);
        let volume = mesh.total_volume();
        assert!(volume < exact && volume > 0.8 * exact);
    }

    #[test]
    fn test_ball_mesh_boundary_count() {
        let mesh = ball_mesh_tetrahedra(1.0, 6).unwrap();
        assert_eq!(mesh.num_nodes(), 343);
        assert_eq!(mesh.boundary_nodes().len(), 343 - 125);
    }

    #[test]
    fn test_invalid_parameters() {
        assert!(matches!(
            ball_mesh_tetrahedra(1.0, 0),
            Err(MeshError::InvalidParameter(_))
        ));
        assert!(matches!(
            ball_mesh_tetrahedra(-1.0, 2),
            Err(MeshError::InvalidParameter(_))
        ));
        assert!(matches!(
            box_mesh_tetrahedra(1.0, 0.0, 0.0, 1.0, 0.0, 1.0, 1, 1, 1),
            Err(MeshError::InvalidParameter(_))
        ));
    }
}
