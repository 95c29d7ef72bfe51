//! Sparse boolean matrices over the boolean semiring (`+` = OR, `·` = AND).

use std::collections::BTreeSet;
use std::fmt;

use crate::errors::ShapeError;

/// Backend tag selecting a [`BoolMatrix`] implementation at the API surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatrixBackend {
    /// CPU-resident sparse matrices ([`SparseBitMatrix`]).
    Cpu,
    /// GPU-resident matrices. No GPU backend is compiled into this build, so
    /// selecting this tag reports an unsupported-backend error.
    Gpu,
}

/// Capabilities a boolean matrix must provide to back an automaton.
///
/// Shapes are fixed at construction. Binary operations validate shapes and
/// report a [`ShapeError`] on mismatch; `(0, 0)` matrices are legal operands.
pub trait BoolMatrix: Clone + fmt::Debug + PartialEq {
    /// All-zero matrix of the given shape.
    fn zeros(rows: usize, cols: usize) -> Self;

    /// `(rows, cols)` of this matrix.
    fn shape(&self) -> (usize, usize);

    /// Sets the cell at `(row, col)` to one.
    ///
    /// # Panics
    ///
    /// Panics if the position is out of bounds.
    fn set(&mut self, row: usize, col: usize);

    /// Reads the cell at `(row, col)`.
    ///
    /// # Panics
    ///
    /// Panics if the position is out of bounds.
    fn get(&self, row: usize, col: usize) -> bool;

    /// Number of nonzero cells. Must be cheap.
    fn nnz(&self) -> usize;

    /// Nonzero cells in row-major order.
    fn nonzeros(&self) -> Vec<(usize, usize)>;

    /// Column indices of the nonzero cells in `row`, ascending.
    fn row_nonzeros(&self, row: usize) -> Vec<usize>;

    /// Elementwise OR. Requires equal shapes.
    fn or(&self, other: &Self) -> Result<Self, ShapeError>;

    /// Cells set in `self` but not in `other`. Requires equal shapes.
    fn sub(&self, other: &Self) -> Result<Self, ShapeError>;

    /// Boolean matrix product: `(a, b) × (b, c) → (a, c)`.
    fn mul(&self, other: &Self) -> Result<Self, ShapeError>;

    /// Kronecker product: `result[i·r_B + k, j·c_B + l] = self[i, j] ∧ other[k, l]`.
    fn kron(&self, other: &Self) -> Self;
}

/// Row-oriented sparse boolean matrix.
///
/// Each row stores the set of its nonzero columns; most rows are expected to
/// stay empty under the workloads here, and the nonzero count is maintained
/// incrementally so `nnz` is `O(1)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SparseBitMatrix {
    rows: Vec<BTreeSet<usize>>,
    cols: usize,
    nnz: usize,
}

impl SparseBitMatrix {
    fn check_bounds(&self, row: usize, col: usize) {
        assert!(
            row < self.rows.len() && col < self.cols,
            "position ({row}, {col}) out of bounds for shape {:?}",
            self.shape()
        );
    }

    fn same_shape(&self, other: &Self, op: &'static str) -> Result<(), ShapeError> {
        if self.shape() == other.shape() {
            Ok(())
        } else {
            Err(ShapeError::new(op, self.shape(), other.shape()))
        }
    }
}

impl BoolMatrix for SparseBitMatrix {
    fn zeros(rows: usize, cols: usize) -> Self {
        Self {
            rows: vec![BTreeSet::new(); rows],
            cols,
            nnz: 0,
        }
    }

    fn shape(&self) -> (usize, usize) {
        (self.rows.len(), self.cols)
    }

    fn set(&mut self, row: usize, col: usize) {
        self.check_bounds(row, col);
        if self.rows[row].insert(col) {
            self.nnz += 1;
        }
    }

    fn get(&self, row: usize, col: usize) -> bool {
        self.check_bounds(row, col);
        self.rows[row].contains(&col)
    }

    fn nnz(&self) -> usize {
        self.nnz
    }

    fn nonzeros(&self) -> Vec<(usize, usize)> {
        self.rows
            .iter()
            .enumerate()
            .flat_map(|(i, row)| row.iter().map(move |&j| (i, j)))
            .collect()
    }

    fn row_nonzeros(&self, row: usize) -> Vec<usize> {
        self.rows[row].iter().copied().collect()
    }

    fn or(&self, other: &Self) -> Result<Self, ShapeError> {
        self.same_shape(other, "or")?;
        let mut out = self.clone();
        for (i, row) in other.rows.iter().enumerate() {
            for &j in row {
                if out.rows[i].insert(j) {
                    out.nnz += 1;
                }
            }
        }
        Ok(out)
    }

    fn sub(&self, other: &Self) -> Result<Self, ShapeError> {
        self.same_shape(other, "sub")?;
        let mut out = Self::zeros(self.rows.len(), self.cols);
        for (i, row) in self.rows.iter().enumerate() {
            for &j in row {
                if !other.rows[i].contains(&j) {
                    out.rows[i].insert(j);
                    out.nnz += 1;
                }
            }
        }
        Ok(out)
    }

    fn mul(&self, other: &Self) -> Result<Self, ShapeError> {
        if self.cols != other.rows.len() {
            return Err(ShapeError::new("mul", self.shape(), other.shape()));
        }
        let mut out = Self::zeros(self.rows.len(), other.cols);
        for (i, row) in self.rows.iter().enumerate() {
            let mut acc = BTreeSet::new();
            for &j in row {
                acc.extend(other.rows[j].iter().copied());
            }
            out.nnz += acc.len();
            out.rows[i] = acc;
        }
        Ok(out)
    }

    fn kron(&self, other: &Self) -> Self {
        let (r_b, c_b) = other.shape();
        let mut out = Self::zeros(self.rows.len() * r_b, self.cols * c_b);
        for (i, row) in self.rows.iter().enumerate() {
            for &j in row {
                for (k, other_row) in other.rows.iter().enumerate() {
                    for &l in other_row {
                        out.set(i * r_b + k, j * c_b + l);
                    }
                }
            }
        }
        out
    }
}
