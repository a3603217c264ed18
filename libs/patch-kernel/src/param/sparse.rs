//! Square sparse systems in CSR layout.

use nalgebra::DVector;
use nalgebra_sparse::{CooMatrix, CsrMatrix};

/// Square sparse matrix backed by a [`CsrMatrix`].
#[derive(Debug, Clone, PartialEq)]
pub struct SparseMatrix {
    matrix: CsrMatrix<f64>,
}

impl SparseMatrix {
    /// Assembles a `dim × dim` matrix from `(row, col, value)` triplets.
    ///
    /// Duplicate coordinates are summed. Triplets outside the matrix are
    /// dropped.
    ///
    /// # Example
    ///
    /// ```rust
    /// use nalgebra::DVector;
    /// use patch_kernel::param::SparseMatrix;
    ///
    /// let m = SparseMatrix::from_triplets(2, [(0, 0, 1.0), (0, 0, 1.0), (1, 0, -1.0)]);
    /// assert_eq!(m.nnz(), 2);
    /// assert_eq!(m.get(0, 0), 2.0);
    /// assert_eq!(m.mul_vec(&DVector::from_vec(vec![1.0, 1.0])), DVector::from_vec(vec![2.0, -1.0]));
    /// ```
    pub fn from_triplets(dim: usize, triplets: impl IntoIterator<Item = (usize, usize, f64)>) -> Self {
        let mut coo = CooMatrix::new(dim, dim);
        for (row, col, value) in triplets {
            if row < dim && col < dim {
                coo.push(row, col, value);
            }
        }
        Self {
            matrix: CsrMatrix::from(&coo),
        }
    }

    /// Number of rows (and columns).
    #[inline]
    pub fn dim(&self) -> usize {
        self.matrix.nrows()
    }

    /// Number of stored entries.
    #[inline]
    pub fn nnz(&self) -> usize {
        self.matrix.nnz()
    }

    /// Entry at `(row, col)`; zero when not stored.
    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.matrix
            .get_entry(row, col)
            .map_or(0.0, |entry| entry.into_value())
    }

    /// Main diagonal.
    pub fn diagonal(&self) -> DVector<f64> {
        DVector::from_fn(self.dim(), |i, _| self.get(i, i))
    }

    /// Computes `A·x`. `x` must have length `dim`.
    pub fn mul_vec(&self, x: &DVector<f64>) -> DVector<f64> {
        &self.matrix * x
    }

    /// Returns true if `A == Aᵀ` within `tolerance`.
    pub fn is_symmetric(&self, tolerance: f64) -> bool {
        self.matrix
            .triplet_iter()
            .all(|(row, col, &v)| (self.get(col, row) - v).abs() <= tolerance)
    }

    /// The underlying CSR matrix.
    pub fn as_csr(&self) -> &CsrMatrix<f64> {
        &self.matrix
    }
}
