//! Boundary bookkeeping and BEM operator properties
//!
//! Checks that do not depend on the accuracy of the interior solves: solid
//! angle completeness, dof map consistency, linearity of the boundary
//! operator and determinism of setup.

use approx::{assert_abs_diff_eq, assert_relative_eq};
use fem::mesh::{Point, ball_mesh_tetrahedra, box_mesh_tetrahedra};
use math_magnetics_bem::core::integration::solid_angle;
use math_magnetics_bem::core::{
    BemMatrix, BoundarySurface, DemagConfig, DemagError, DemagMethod, FemBemDemag,
};
use ndarray::{Array1, Array2};
use std::f64::consts::PI;

fn total_solid_angle(surface: &BoundarySurface, x: &Point) -> f64 {
    surface
        .panels()
        .iter()
        .map(|p| {
            let [a, b, c] = p.geometry.vertices;
            solid_angle(x, &a, &b, &c)
        })
        .sum()
}

/// Deterministic, non-trivial boundary vector
fn test_vector(len: usize) -> Array1<f64> {
    Array1::from_iter((0..len).map(|i| ((i * 37 % 101) as f64 - 50.0) / 17.0))
}

#[test]
fn test_closed_surface_solid_angles() {
    let mesh = ball_mesh_tetrahedra(2.0, 4).unwrap();
    let surface = BoundarySurface::new(&mesh).unwrap();

    for inside in [Point::zero(), Point::new_3d(0.5, -0.7, 1.1)] {
        assert_abs_diff_eq!(total_solid_angle(&surface, &inside), 4.0 * PI, epsilon = 1e-10);
    }
    for outside in [Point::new_3d(3.0, 0.0, 0.0), Point::new_3d(-5.0, 4.0, 2.0)] {
        assert_abs_diff_eq!(total_solid_angle(&surface, &outside), 0.0, epsilon = 1e-10);
    }
}

#[test]
fn test_box_completeness_and_row_sums() {
    let mesh = box_mesh_tetrahedra(0.0, 3.0, 0.0, 2.0, 0.0, 1.0, 3, 2, 2).unwrap();
    let surface = BoundarySurface::new(&mesh).unwrap();
    let bem = BemMatrix::double_layer(&surface).unwrap();

    println!("Completeness error: {:.3e}", bem.completeness_error());
    assert!(bem.completeness_error() < 1e-12);

    for (i, row) in bem.matrix().rows().into_iter().enumerate() {
        assert_abs_diff_eq!(row.sum(), -1.0, epsilon = 1e-12);
        // Faces see 2π, edges π, corners π/2
        let omega = bem.raw_row_sums()[i];
        let quarter_turns = omega / (PI / 2.0);
        assert_abs_diff_eq!(quarter_turns, quarter_turns.round(), epsilon = 1e-10);
        assert!([1.0, 2.0, 4.0].contains(&quarter_turns.round()));
    }
}

#[test]
fn test_dof_map_bijection() {
    let mesh = ball_mesh_tetrahedra(1.0, 5).unwrap();
    let surface = BoundarySurface::new(&mesh).unwrap();
    let dofs = surface.dofs();
    assert_eq!(dofs.num_boundary_dofs(), 6 * 25 + 2);

    for i in 0..dofs.num_boundary_dofs() {
        assert_eq!(dofs.to_boundary(dofs.to_full(i)), Some(i));
    }
    let interior = (0..dofs.num_full_dofs())
        .filter(|&n| dofs.to_boundary(n).is_none())
        .count();
    assert_eq!(interior, dofs.num_full_dofs() - dofs.num_boundary_dofs());

    let v = test_vector(dofs.num_boundary_dofs());
    let full = dofs.extend(&v).unwrap();
    assert_eq!(dofs.restrict(&full).unwrap(), v);
    for n in 0..dofs.num_full_dofs() {
        if dofs.to_boundary(n).is_none() {
            assert_eq!(full[n], 0.0);
        }
    }

    // Normal table rows line up with the dof map
    for i in 0..dofs.num_boundary_dofs() {
        assert_eq!(surface.normals().coordinate(i), mesh.nodes[dofs.to_full(i)]);
    }
}

#[test]
fn test_misaligned_vectors_fail_loudly() {
    let mesh = ball_mesh_tetrahedra(1.0, 3).unwrap();
    let demag = FemBemDemag::new(mesh, DemagConfig::default()).unwrap();
    let b = demag.surface().num_dofs();
    let n = demag.mesh().num_nodes();

    assert!(matches!(
        demag.bem().apply(&Array1::zeros(b + 1)),
        Err(DemagError::IndexAlignment { .. })
    ));
    assert!(matches!(
        demag.surface().dofs().restrict(&Array1::zeros(n - 1)),
        Err(DemagError::IndexAlignment { .. })
    ));
    assert!(matches!(
        demag.surface().dofs().extend(&Array1::zeros(n)),
        Err(DemagError::IndexAlignment { .. })
    ));
}

#[test]
fn test_boundary_operator_is_linear() {
    for method in [DemagMethod::Fk, DemagMethod::Gcr] {
        let mesh = ball_mesh_tetrahedra(1.0, 4).unwrap();
        let demag = FemBemDemag::new(mesh, DemagConfig::default().with_method(method)).unwrap();
        let bem = demag.bem();

        let q = test_vector(bem.size());
        let single = bem.apply(&q).unwrap();
        let double = bem.apply(&(&q * 2.0)).unwrap();
        for (s, d) in single.iter().zip(double.iter()) {
            assert_abs_diff_eq!(2.0 * s, *d, epsilon = 1e-12 * s.abs().max(1.0));
        }

        // Doubling Ms doubles the source and the boundary potential
        let n = demag.mesh().num_nodes();
        let mut m = Array2::zeros((n, 3));
        for (i, p) in demag.mesh().nodes.iter().enumerate() {
            m[[i, 0]] = 1.0;
            m[[i, 1]] = 0.3 * p.z;
        }
        let one = demag.compute_field(&m, &Array1::ones(n)).unwrap();
        let two = demag.compute_field(&m, &Array1::from_elem(n, 2.0)).unwrap();
        for (a, b) in one.q.iter().zip(two.q.iter()) {
            assert_relative_eq!(2.0 * a, *b, max_relative = 1e-9, epsilon = 1e-24);
        }
        for (a, b) in one.phi_b_boundary.iter().zip(two.phi_b_boundary.iter()) {
            assert_relative_eq!(2.0 * a, *b, max_relative = 1e-9, epsilon = 1e-24);
        }
    }
}

#[test]
fn test_setup_is_idempotent() {
    for method in [DemagMethod::Fk, DemagMethod::Gcr] {
        let config = DemagConfig::default().with_method(method);
        let first = FemBemDemag::new(ball_mesh_tetrahedra(1.0, 3).unwrap(), config.clone()).unwrap();
        let second = FemBemDemag::new(ball_mesh_tetrahedra(1.0, 3).unwrap(), config).unwrap();

        assert_eq!(first.surface().dofs(), second.surface().dofs());
        assert_eq!(first.surface().normals(), second.surface().normals());
        assert_eq!(first.bem().matrix(), second.bem().matrix());
        assert_eq!(first.bem().self_terms(), second.bem().self_terms());
    }
}

#[test]
fn test_solver_from_json_config() {
    let config = DemagConfig::from_json(
        r#"{"method": "gcr", "source_vector": "box_average", "unit_length": 1e-8}"#,
    )
    .unwrap();
    let demag = FemBemDemag::new(ball_mesh_tetrahedra(1.0, 3).unwrap(), config).unwrap();
    assert_eq!(demag.config().method, DemagMethod::Gcr);
    assert_eq!(demag.config().unit_length, 1e-8);

    assert!(matches!(
        DemagConfig::from_json(r#"{"unit_length": 0.0}"#),
        Err(DemagError::Config(_))
    ));
}
