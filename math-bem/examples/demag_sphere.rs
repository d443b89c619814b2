//! Demagnetizing field of a uniformly magnetized sphere
//!
//! Runs both formulations on a structured ball mesh and compares the mean
//! field with the analytic value H = −Ms/3.
//!
//! ```sh
//! RUST_LOG=info cargo run --release --example demag_sphere -- 8
//! ```

use anyhow::{Context, Result};
use fem::mesh::ball_mesh_tetrahedra;
use math_magnetics_bem::core::constants::MU0;
use math_magnetics_bem::{DemagConfig, DemagMethod, FemBemDemag};
use ndarray::{Array1, Array2};

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let subdivisions: usize = match std::env::args().nth(1) {
        Some(arg) => arg.parse().context("subdivisions must be a positive integer")?,
        None => 6,
    };
    let radius = 10.0;
    let ms = 8.0e5;
    let unit_length = 1e-9;

    println!("=== Uniformly Magnetized Sphere ===");
    println!("Radius: {radius} nm, Ms: {ms:.3e} A/m, subdivisions: {subdivisions}");
    println!("Analytic field: Hx = {:.4e} A/m", -ms / 3.0);
    println!();

    for method in [DemagMethod::Fk, DemagMethod::Gcr] {
        let mesh = ball_mesh_tetrahedra(radius, subdivisions)?;
        let config = DemagConfig::default()
            .with_method(method)
            .with_unit_length(unit_length)
            .with_verbose(true);
        let demag = FemBemDemag::new(mesh, config)?;

        let n = demag.mesh().num_nodes();
        let mut m = Array2::zeros((n, 3));
        m.column_mut(0).fill(1.0);
        let saturation = Array1::from_elem(n, ms);

        let solution = demag.compute_field(&m, &saturation)?;
        let stats = solution.statistics(demag.lumped_mass())?;
        let energy = solution.energy(demag.mesh(), &demag.magnetization(&m, &saturation)?)?;
        let volume = demag.mesh().total_volume() * unit_length.powi(3);

        println!("--- {method:?} ---");
        println!("Boundary dofs: {}", demag.surface().num_dofs());
        println!(
            "Hx: mean {:.4e}, min {:.4e}, max {:.4e}, std {:.3e}",
            stats.x.average, stats.x.min, stats.x.max, stats.x.std_dev
        );
        println!("Hy mean {:.3e}, Hz mean {:.3e}", stats.y.average, stats.z.average);
        println!(
            "Relative error of <Hx>: {:.2}%",
            100.0 * (stats.x.average + ms / 3.0).abs() / (ms / 3.0)
        );
        println!(
            "Energy: {:.4e} J (analytic {:.4e} J)",
            energy,
            MU0 / 6.0 * ms * ms * volume
        );
        println!("Timings: {:?}", solution.timings);
        println!();
    }

    Ok(())
}
