//! Dense O(B²) BEM matrix assembly
//!
//! Every boundary dof is a collocation point; every panel contributes its
//! three closed-form vertex coefficients to the row of that point. Rows are
//! independent and are filled in parallel into disjoint slices of the matrix.
//!
//! Two operators are provided:
//!
//! - double layer (FK): panels touching the collocation point are skipped,
//!   the self term comes from the solid-angle identity
//!   `Σ_j raw_ij + self_i = 4π`, and the matrix is normalised as
//!   `B = −(raw + diag(self)) / 4π`, so each row sums to −1;
//! - single layer (GCR): all panels contribute, `G = S / 4π`.

use std::time::Instant;

use ndarray::{Array1, Array2};
use solvers::parallel::parallel_chunks_mut;

use crate::core::constants::PI4;
use crate::core::error::DemagError;
use crate::core::integration::{double_layer_on_panel, single_layer_on_panel};
use crate::core::mesh::BoundarySurface;

/// Boundary integral operator held by a [`BemMatrix`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BemKernel {
    /// Double layer with solid-angle diagonal
    DoubleLayer,
    /// Single layer with linear density
    SingleLayer,
}

/// Dense boundary matrix mapping boundary sources to boundary potentials
#[derive(Debug, Clone)]
pub struct BemMatrix {
    kernel: BemKernel,
    matrix: Array2<f64>,
    raw_row_sums: Array1<f64>,
    self_terms: Array1<f64>,
}

impl BemMatrix {
    /// Assemble the normalised double-layer operator
    pub fn double_layer(surface: &BoundarySurface) -> Result<Self, DemagError> {
        let start = Instant::now();
        let mut raw = assemble_rows(surface, |i, x, row| {
            for panel in surface.panels() {
                if panel.touches(i) {
                    continue;
                }
                let coeffs = double_layer_on_panel(x, &panel.geometry);
                for (&j, c) in panel.nodes.iter().zip(coeffs) {
                    row[j] += c;
                }
            }
        })?;

        let raw_row_sums: Array1<f64> = raw.rows().into_iter().map(|r| r.sum()).collect();
        let self_terms = raw_row_sums.mapv(|s| PI4 - s);
        for (i, &s) in self_terms.iter().enumerate() {
            raw[[i, i]] += s;
        }
        raw.mapv_inplace(|v| -v / PI4);

        let bem = Self {
            kernel: BemKernel::DoubleLayer,
            matrix: raw,
            raw_row_sums,
            self_terms,
        };
        bem.log_solid_angles();
        log::debug!(
            "[BEM] Double layer: {} dofs x {} panels in {:.1}ms",
            surface.num_dofs(),
            surface.num_panels(),
            start.elapsed().as_secs_f64() * 1000.0
        );
        Ok(bem)
    }

    /// Assemble the single-layer operator
    pub fn single_layer(surface: &BoundarySurface) -> Result<Self, DemagError> {
        let start = Instant::now();
        let b = surface.num_dofs();
        let mut self_terms = Array1::zeros(b);
        let mut matrix = assemble_rows(surface, |_, x, row| {
            for panel in surface.panels() {
                let coeffs = single_layer_on_panel(x, &panel.geometry);
                for (&j, c) in panel.nodes.iter().zip(coeffs) {
                    row[j] += c;
                }
            }
        })?;

        let raw_row_sums: Array1<f64> = matrix.rows().into_iter().map(|r| r.sum()).collect();
        for i in 0..b {
            self_terms[i] = matrix[[i, i]];
        }
        matrix.mapv_inplace(|v| v / PI4);

        log::debug!(
            "[BEM] Single layer: {} dofs x {} panels in {:.1}ms",
            b,
            surface.num_panels(),
            start.elapsed().as_secs_f64() * 1000.0
        );
        Ok(Self {
            kernel: BemKernel::SingleLayer,
            matrix,
            raw_row_sums,
            self_terms,
        })
    }

    /// Operator kind
    pub fn kernel(&self) -> BemKernel {
        self.kernel
    }

    /// Number of boundary dofs B
    pub fn size(&self) -> usize {
        self.matrix.nrows()
    }

    /// The normalised B×B matrix
    pub fn matrix(&self) -> &Array2<f64> {
        &self.matrix
    }

    /// Row sums of the unnormalised kernel before the diagonal was added
    ///
    /// For the double layer this is the solid angle of the body seen from
    /// each boundary dof.
    pub fn raw_row_sums(&self) -> &Array1<f64> {
        &self.raw_row_sums
    }

    /// Unnormalised diagonal self terms
    pub fn self_terms(&self) -> &Array1<f64> {
        &self.self_terms
    }

    /// Largest deviation of `raw_row_sum + self_term` from 4π (double layer)
    pub fn completeness_error(&self) -> f64 {
        self.raw_row_sums
            .iter()
            .zip(self.self_terms.iter())
            .map(|(r, s)| (r + s - PI4).abs())
            .fold(0.0, f64::max)
    }

    /// Boundary potential `G · q`
    pub fn apply(&self, q: &Array1<f64>) -> Result<Array1<f64>, DemagError> {
        if q.len() != self.size() {
            return Err(DemagError::IndexAlignment {
                context: "bem apply",
                expected: self.size(),
                actual: q.len(),
            });
        }
        Ok(self.matrix.dot(q))
    }

    /// Report how far the interior solid angles stray from (0, 4π)
    fn log_solid_angles(&self) {
        let (min, max) = self
            .raw_row_sums
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| (lo.min(v), hi.max(v)));
        let deviation = (-min).max(max - PI4).max(0.0);
        if deviation > 0.0 {
            log::warn!(
                "[BEM] Interior solid angle outside (0, 4pi) by {deviation:.3e}; check boundary orientation"
            );
        } else {
            log::debug!("[BEM] Interior solid angles in [{min:.4}, {max:.4}]");
        }
    }
}

/// Fill a B×B matrix row by row, `fill(i, x_i, row_i)`
fn assemble_rows<F>(surface: &BoundarySurface, fill: F) -> Result<Array2<f64>, DemagError>
where
    F: Fn(usize, &fem::mesh::Point, &mut [f64]) + Sync + Send,
{
    let b = surface.num_dofs();
    let mut matrix = Array2::zeros((b, b));
    let data = matrix
        .as_slice_mut()
        .ok_or_else(|| DemagError::Setup("BEM matrix storage is not contiguous".to_string()))?;
    let coordinates = surface.normals().coordinates();
    parallel_chunks_mut(data, b, |i, row| fill(i, &coordinates[i], row));
    Ok(matrix)
}
