//! Compressed Sparse Row matrices
//!
//! Row `i` owns `values[row_ptrs[i]..row_ptrs[i + 1]]` with the matching
//! column indices, sorted by column inside each row.

use crate::parallel::parallel_map_indexed;
use crate::traits::{LinearOperator, RealField};
use ndarray::{Array1, Array2};

/// Rows below which `matvec` stays on the calling thread
const PARALLEL_MATVEC_MIN_ROWS: usize = 256;

/// Sparse matrix in CSR layout
#[derive(Debug, Clone, PartialEq)]
pub struct CsrMatrix<T: RealField> {
    /// Number of rows
    pub num_rows: usize,
    /// Number of columns
    pub num_cols: usize,
    /// Stored entries, row by row
    pub values: Vec<T>,
    /// Column of each stored entry
    pub col_indices: Vec<usize>,
    /// Row offsets into `values`, `num_rows + 1` long
    pub row_ptrs: Vec<usize>,
}

impl<T: RealField> CsrMatrix<T> {
    /// All-zero matrix
    pub fn new(num_rows: usize, num_cols: usize) -> Self {
        Self {
            num_rows,
            num_cols,
            values: Vec::new(),
            col_indices: Vec::new(),
            row_ptrs: vec![0; num_rows + 1],
        }
    }

    /// Keep the entries of `dense` whose magnitude exceeds `threshold`
    pub fn from_dense(dense: &Array2<T>, threshold: T) -> Self {
        let (num_rows, num_cols) = dense.dim();
        let mut matrix = Self::new(num_rows, num_cols);
        for (i, row) in dense.outer_iter().enumerate() {
            for (j, &v) in row.iter().enumerate().filter(|(_, v)| v.abs() > threshold) {
                matrix.values.push(v);
                matrix.col_indices.push(j);
            }
            matrix.row_ptrs[i + 1] = matrix.values.len();
        }
        matrix
    }

    /// Build from `(row, col, value)` triplets, summing duplicates
    ///
    /// Finite element assembly emits one triplet per element contribution,
    /// so the same position usually appears several times.
    pub fn from_triplets(
        num_rows: usize,
        num_cols: usize,
        triplets: Vec<(usize, usize, T)>,
    ) -> Self {
        let mut rows: Vec<Vec<(usize, T)>> = vec![Vec::new(); num_rows];
        for (i, j, v) in triplets {
            rows[i].push((j, v));
        }

        let mut matrix = Self::new(num_rows, num_cols);
        for (i, mut row) in rows.into_iter().enumerate() {
            row.sort_unstable_by_key(|&(j, _)| j);
            for (j, v) in row {
                let repeated = matrix.values.len() > matrix.row_ptrs[i]
                    && matrix.col_indices.last() == Some(&j);
                match matrix.values.last_mut() {
                    Some(acc) if repeated => *acc += v,
                    _ => {
                        matrix.values.push(v);
                        matrix.col_indices.push(j);
                    }
                }
            }
            matrix.row_ptrs[i + 1] = matrix.values.len();
        }
        matrix
    }

    /// Identity of size `n`
    pub fn identity(n: usize) -> Self {
        Self {
            num_rows: n,
            num_cols: n,
            values: vec![T::one(); n],
            col_indices: (0..n).collect(),
            row_ptrs: (0..=n).collect(),
        }
    }

    /// Number of stored entries
    pub fn nnz(&self) -> usize {
        self.values.len()
    }

    /// Fraction of the dense size that is stored
    pub fn sparsity(&self) -> f64 {
        match self.num_rows * self.num_cols {
            0 => 0.0,
            total => self.nnz() as f64 / total as f64,
        }
    }

    /// `(col, value)` pairs of one row
    pub fn row_entries(&self, row: usize) -> impl Iterator<Item = (usize, T)> + '_ {
        let range = self.row_ptrs[row]..self.row_ptrs[row + 1];
        self.col_indices[range.clone()]
            .iter()
            .copied()
            .zip(self.values[range].iter().copied())
    }

    fn row_dot(&self, row: usize, x: &Array1<T>) -> T {
        self.row_entries(row).fold(T::zero(), |acc, (j, v)| acc + v * x[j])
    }

    /// `y = A·x`
    ///
    /// Rows are spread over the thread pool for large matrices.
    ///
    /// # Panics
    ///
    /// If `x.len() != num_cols`.
    pub fn matvec(&self, x: &Array1<T>) -> Array1<T> {
        assert_eq!(x.len(), self.num_cols, "Input vector size mismatch");
        if self.num_rows >= PARALLEL_MATVEC_MIN_ROWS {
            Array1::from(parallel_map_indexed(self.num_rows, |i| self.row_dot(i, x)))
        } else {
            (0..self.num_rows).map(|i| self.row_dot(i, x)).collect()
        }
    }

    /// Stored value at `(i, j)`, zero when absent
    pub fn get(&self, i: usize, j: usize) -> T {
        let range = self.row_ptrs[i]..self.row_ptrs[i + 1];
        match self.col_indices[range.clone()].binary_search(&j) {
            Ok(k) => self.values[range.start + k],
            Err(_) => T::zero(),
        }
    }

    /// Main diagonal
    pub fn diagonal(&self) -> Array1<T> {
        (0..self.num_rows.min(self.num_cols))
            .map(|i| self.get(i, i))
            .collect()
    }

    /// Sum of every row
    pub fn row_sums(&self) -> Array1<T> {
        (0..self.num_rows)
            .map(|i| self.row_entries(i).fold(T::zero(), |acc, (_, v)| acc + v))
            .collect()
    }

    /// Dense copy, for small matrices and the direct solver
    pub fn to_dense(&self) -> Array2<T> {
        let mut dense = Array2::zeros((self.num_rows, self.num_cols));
        for i in 0..self.num_rows {
            for (j, v) in self.row_entries(i) {
                dense[[i, j]] = v;
            }
        }
        dense
    }
}

impl<T: RealField> LinearOperator<T> for CsrMatrix<T> {
    fn num_rows(&self) -> usize {
        self.num_rows
    }

    fn num_cols(&self) -> usize {
        self.num_cols
    }

    fn apply(&self, x: &Array1<T>) -> Array1<T> {
        self.matvec(x)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::array;

    #[test]
    fn test_from_dense_drops_small_entries() {
        let dense = array![[1.0_f64, 1e-20, 2.0], [0.0, 3.0, 0.0], [4.0, 0.0, 5.0]];
        let csr = CsrMatrix::from_dense(&dense, 1e-15);

        assert_eq!(csr.nnz(), 5);
        assert_eq!(csr.row_ptrs, vec![0, 2, 3, 5]);
        assert_relative_eq!(csr.get(0, 2), 2.0);
        assert_relative_eq!(csr.get(2, 0), 4.0);
        assert_eq!(csr.get(0, 1), 0.0);
    }

    #[test]
    fn test_triplets_sum_duplicates_and_keep_empty_rows() {
        let triplets = vec![
            (2, 2, 5.0_f64),
            (0, 1, 2.0),
            (2, 0, 4.0),
            (2, 2, -1.0),
            (0, 1, 0.5),
        ];
        let csr = CsrMatrix::from_triplets(4, 3, triplets);

        assert_eq!(csr.row_ptrs, vec![0, 1, 1, 3, 3]);
        assert_eq!(csr.col_indices, vec![1, 0, 2]);
        assert_relative_eq!(csr.get(0, 1), 2.5);
        assert_relative_eq!(csr.get(2, 2), 4.0);
        assert_eq!(csr.row_sums(), array![2.5, 0.0, 8.0, 0.0]);
    }

    #[test]
    fn test_identity_dense_and_diagonal() {
        let id: CsrMatrix<f64> = CsrMatrix::identity(3);
        assert_eq!(id.diagonal(), array![1.0, 1.0, 1.0]);
        assert_eq!(id.to_dense(), Array2::<f64>::eye(3));
        assert_eq!(CsrMatrix::from_dense(&Array2::<f64>::eye(3), 0.0), id);
        assert_relative_eq!(id.sparsity(), 1.0 / 3.0);
    }

    #[test]
    fn test_matvec_small_and_large_agree_with_dense() {
        for n in [4, 300] {
            let mut triplets = Vec::new();
            for i in 0..n {
                triplets.push((i, i, 2.0_f64));
                if i + 1 < n {
                    triplets.push((i, i + 1, -1.0));
                    triplets.push((i + 1, i, -1.0));
                }
            }
            let csr = CsrMatrix::from_triplets(n, n, triplets);
            let x = Array1::from_iter((0..n).map(|i| (i as f64).sin()));

            let y = csr.matvec(&x);
            let y_dense = csr.to_dense().dot(&x);
            for i in 0..n {
                assert_relative_eq!(y[i], y_dense[i], epsilon = 1e-12);
            }
        }
    }
}
