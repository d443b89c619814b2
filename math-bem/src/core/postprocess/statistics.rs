//! Weighted statistics of nodal vector fields

use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};

use crate::core::error::DemagError;

/// Statistics of one field component
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ComponentStatistics {
    /// Weighted mean
    pub average: f64,
    /// Smallest nodal value
    pub min: f64,
    /// Largest nodal value
    pub max: f64,
    /// Weighted standard deviation
    pub std_dev: f64,
}

/// Statistics of the x, y and z components of a nodal field
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FieldStatistics {
    /// x component
    pub x: ComponentStatistics,
    /// y component
    pub y: ComponentStatistics,
    /// z component
    pub z: ComponentStatistics,
}

impl FieldStatistics {
    /// Compute statistics of an N×3 field with nodal weights (usually the
    /// lumped mass)
    pub fn compute(field: &Array2<f64>, weights: &Array1<f64>) -> Result<Self, DemagError> {
        let total = check(field, weights)?;
        let component = |c: usize| {
            let column = field.column(c);
            let average = column.dot(weights) / total;
            let variance = column
                .iter()
                .zip(weights.iter())
                .map(|(v, w)| w * (v - average).powi(2))
                .sum::<f64>()
                / total;
            ComponentStatistics {
                average,
                min: column.iter().copied().fold(f64::INFINITY, f64::min),
                max: column.iter().copied().fold(f64::NEG_INFINITY, f64::max),
                std_dev: variance.sqrt(),
            }
        };
        Ok(Self {
            x: component(0),
            y: component(1),
            z: component(2),
        })
    }

    /// Averages as an array
    pub fn average(&self) -> [f64; 3] {
        [self.x.average, self.y.average, self.z.average]
    }
}

/// Weighted average of an N×3 field
pub fn average_field(field: &Array2<f64>, weights: &Array1<f64>) -> Result<[f64; 3], DemagError> {
    let total = check(field, weights)?;
    Ok(std::array::from_fn(|c| field.column(c).dot(weights) / total))
}

fn check(field: &Array2<f64>, weights: &Array1<f64>) -> Result<f64, DemagError> {
    if field.ncols() != 3 || field.nrows() != weights.len() {
        return Err(DemagError::InvalidInput(format!(
            "field of shape {:?} does not match {} weights",
            field.dim(),
            weights.len()
        )));
    }
    let total = weights.sum();
    if field.nrows() == 0 || total <= 0.0 {
        return Err(DemagError::InvalidInput(
            "statistics need a non-empty field with positive total weight".to_string(),
        ));
    }
    Ok(total)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::array;

    #[test]
    fn test_weighted_statistics() {
        let field = array![[1.0, 0.0, 2.0], [3.0, 0.0, 2.0]];
        let weights = array![1.0, 3.0];
        let stats = FieldStatistics::compute(&field, &weights).unwrap();

        assert_abs_diff_eq!(stats.x.average, 2.5, epsilon = 1e-15);
        assert_abs_diff_eq!(stats.x.min, 1.0, epsilon = 1e-15);
        assert_abs_diff_eq!(stats.x.max, 3.0, epsilon = 1e-15);
        // Weighted variance: (1·2.25 + 3·0.25) / 4 = 0.75
        assert_abs_diff_eq!(stats.x.std_dev, 0.75f64.sqrt(), epsilon = 1e-15);
        assert_abs_diff_eq!(stats.z.std_dev, 0.0, epsilon = 1e-15);
        assert_eq!(stats.average(), average_field(&field, &weights).unwrap());
    }

    #[test]
    fn test_shape_errors() {
        let field = Array2::zeros((2, 3));
        assert!(matches!(
            average_field(&field, &array![1.0]),
            Err(DemagError::InvalidInput(_))
        ));
        assert!(matches!(
            FieldStatistics::compute(&field, &array![0.0, 0.0]),
            Err(DemagError::InvalidInput(_))
        ));
    }
}
