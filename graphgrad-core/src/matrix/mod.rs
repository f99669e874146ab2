//! Two-dimensional tensors.
//!
//! A [`Matrix`] addresses its elements row-major (`pos = row * cols + col`)
//! and implements the full [`TensorOps`] contract. Besides owned storage it
//! can be a non-owning view over tensors it does not copy:
//!
//! * [`Matrix::column_repetition`]: every row is the same vector (read-only),
//! * [`Matrix::wrap_rows`]: a list of row tensors presented as one matrix,
//! * [`Matrix::transposed`]: the transpose of another matrix.
//!
//! Writes through a writable view land in the backing tensors, and mutating
//! a backing tensor is visible through every view of it. View shapes are
//! derived from the backing data when the view is created.

use crate::error::GraphGradError;
use crate::tensor::{Positions, StorageKind, Tensor, TensorOps};
use std::fmt;

mod linalg;

/// Number of elements of a `rows x cols` matrix.
fn checked_size(rows: usize, cols: usize) -> Result<usize, GraphGradError> {
    rows.checked_mul(cols)
        .ok_or(GraphGradError::ShapeOverflow { rows, cols })
}

#[derive(Clone, Debug)]
enum MatrixStorage {
    Owned(Tensor),
    /// Rows are all the wrapped vector.
    ColumnRepetition(Tensor),
    WrapRows(Vec<Tensor>),
    Transposed(Box<Matrix>),
}

/// A `rows x cols` tensor with row/column semantics.
#[derive(Clone, Debug)]
pub struct Matrix {
    rows: usize,
    cols: usize,
    storage: MatrixStorage,
}

impl Matrix {
    /// Creates a zero-filled matrix with the given storage policy.
    ///
    /// # Errors
    /// `ShapeOverflow` if `rows * cols` does not fit in `usize`.
    pub fn zeros(rows: usize, cols: usize, kind: StorageKind) -> Result<Self, GraphGradError> {
        let size = checked_size(rows, cols)?;
        Ok(Matrix {
            rows,
            cols,
            storage: MatrixStorage::Owned(Tensor::zeros(size, kind)),
        })
    }

    pub fn dense(rows: usize, cols: usize) -> Result<Self, GraphGradError> {
        Self::zeros(rows, cols, StorageKind::Dense)
    }

    pub fn sparse(rows: usize, cols: usize) -> Result<Self, GraphGradError> {
        Self::zeros(rows, cols, StorageKind::Sparse)
    }

    /// Owned zero matrix with the shape of `self`, whose size is known to fit.
    fn zeros_shaped_like(&self, kind: StorageKind) -> Matrix {
        Matrix {
            rows: self.rows,
            cols: self.cols,
            storage: MatrixStorage::Owned(Tensor::zeros(self.size(), kind)),
        }
    }

    /// Creates a dense matrix from row vectors.
    ///
    /// # Errors
    /// `DimensionMismatch` if the rows differ in length, `NanValue` on NaN.
    pub fn from_rows(rows: &[Vec<f64>]) -> Result<Self, GraphGradError> {
        let cols = rows.first().map_or(0, Vec::len);
        let mut values = Vec::with_capacity(rows.len() * cols);
        for (row, data) in rows.iter().enumerate() {
            if data.len() != cols {
                return Err(GraphGradError::mismatch(
                    format!("row 0 ({} columns)", cols),
                    format!("row {} ({} columns)", row, data.len()),
                    "from_rows",
                ));
            }
            values.extend_from_slice(data);
        }
        Ok(Matrix {
            rows: rows.len(),
            cols,
            storage: MatrixStorage::Owned(Tensor::from_vec(values)?),
        })
    }

    /// Sparse identity matrix of size `n x n`.
    pub fn eye(n: usize) -> Result<Self, GraphGradError> {
        let res = Matrix::sparse(n, n)?;
        res.set_main_diagonal(1.0)?;
        Ok(res)
    }

    /// View with `times` rows, each of which is `vector`.
    ///
    /// The view is read-only: `put` fails, but writes to `vector` show up in
    /// every row.
    ///
    /// # Errors
    /// `ShapeOverflow` if `times * vector.size()` does not fit in `usize`.
    pub fn column_repetition(times: usize, vector: Tensor) -> Result<Self, GraphGradError> {
        checked_size(times, vector.size())?;
        Ok(Matrix {
            rows: times,
            cols: vector.size(),
            storage: MatrixStorage::ColumnRepetition(vector),
        })
    }

    /// Writable view presenting `rows` as the rows of a matrix.
    ///
    /// # Errors
    /// `DimensionMismatch` if the row tensors differ in size, `ShapeOverflow`
    /// if the combined size does not fit in `usize`.
    pub fn wrap_rows(rows: Vec<Tensor>) -> Result<Self, GraphGradError> {
        let cols = rows.first().map_or(0, TensorOps::size);
        for row in &rows {
            if row.size() != cols {
                return Err(GraphGradError::mismatch(
                    rows[0].describe(),
                    row.describe(),
                    "wrap_rows",
                ));
            }
        }
        checked_size(rows.len(), cols)?;
        Ok(Matrix {
            rows: rows.len(),
            cols,
            storage: MatrixStorage::WrapRows(rows),
        })
    }

    /// Writable transposed view of this matrix.
    pub fn transposed(&self) -> Matrix {
        if let MatrixStorage::Transposed(inner) = &self.storage {
            return inner.as_ref().clone();
        }
        Matrix {
            rows: self.cols,
            cols: self.rows,
            storage: MatrixStorage::Transposed(Box::new(self.clone())),
        }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Storage policy of the owned or backing data.
    pub fn storage_kind(&self) -> StorageKind {
        match &self.storage {
            MatrixStorage::Owned(tensor) | MatrixStorage::ColumnRepetition(tensor) => {
                tensor.storage_kind()
            }
            MatrixStorage::WrapRows(rows) => rows
                .first()
                .map_or(StorageKind::Dense, Tensor::storage_kind),
            MatrixStorage::Transposed(inner) => inner.storage_kind(),
        }
    }

    /// Whether this matrix is a view rather than owned storage.
    pub fn is_view(&self) -> bool {
        !matches!(self.storage, MatrixStorage::Owned(_))
    }

    fn check_cell(&self, row: usize, col: usize) -> Result<(), GraphGradError> {
        if row >= self.rows || col >= self.cols {
            return Err(GraphGradError::IndexOutOfBounds {
                pos: row.saturating_mul(self.cols).saturating_add(col),
                size: self.size(),
            });
        }
        Ok(())
    }

    pub fn get_at(&self, row: usize, col: usize) -> Result<f64, GraphGradError> {
        self.check_cell(row, col)?;
        match &self.storage {
            MatrixStorage::Owned(tensor) => tensor.get(row * self.cols + col),
            MatrixStorage::ColumnRepetition(vector) => vector.get(col),
            MatrixStorage::WrapRows(rows) => rows[row].get(col),
            MatrixStorage::Transposed(inner) => inner.get_at(col, row),
        }
    }

    pub fn put_at(&self, row: usize, col: usize, value: f64) -> Result<&Self, GraphGradError> {
        self.check_cell(row, col)?;
        match &self.storage {
            MatrixStorage::Owned(tensor) => {
                tensor.put(row * self.cols + col, value)?;
            }
            MatrixStorage::ColumnRepetition(_) => {
                return Err(GraphGradError::UnsupportedOperation(format!(
                    "cannot write to read-only view {}",
                    self.describe()
                )));
            }
            MatrixStorage::WrapRows(rows) => {
                rows[row].put(col, value)?;
            }
            MatrixStorage::Transposed(inner) => {
                inner.put_at(col, row, value)?;
            }
        }
        Ok(self)
    }

    /// `(row, col)` pairs of entries genuinely held by the storage.
    ///
    /// For views this walks the backing tensors only, never the full repeated
    /// extent of absent entries.
    pub fn non_zero_entries(&self) -> Result<Vec<(usize, usize)>, GraphGradError> {
        let cols = self.cols;
        Ok(self
            .positions()?
            .map(|pos| (pos / cols, pos % cols))
            .collect())
    }

    /// Dense copy of row `row`.
    pub fn row(&self, row: usize) -> Result<Tensor, GraphGradError> {
        let res = Tensor::dense(self.cols);
        for col in 0..self.cols {
            res.put(col, self.get_at(row, col)?)?;
        }
        Ok(res)
    }

    /// Owned dense deep copy.
    pub fn to_dense(&self) -> Result<Matrix, GraphGradError> {
        self.convert(StorageKind::Dense)
    }

    /// Owned sparse deep copy.
    pub fn to_sparse(&self) -> Result<Matrix, GraphGradError> {
        self.convert(StorageKind::Sparse)
    }

    fn convert(&self, kind: StorageKind) -> Result<Matrix, GraphGradError> {
        let res = self.zeros_shaped_like(kind);
        for pos in self.positions()? {
            res.put(pos, self.get(pos)?)?;
        }
        Ok(res)
    }

    fn kind_label(&self) -> String {
        match &self.storage {
            MatrixStorage::Owned(tensor) => format!("{} matrix", tensor.storage_kind()),
            MatrixStorage::ColumnRepetition(_) => "Column repetition".to_string(),
            MatrixStorage::WrapRows(_) => "Wrapped rows".to_string(),
            MatrixStorage::Transposed(inner) => format!("Transposed {}", inner.kind_label()),
        }
    }
}

impl TensorOps for Matrix {
    fn size(&self) -> usize {
        self.rows * self.cols
    }

    fn get(&self, pos: usize) -> Result<f64, GraphGradError> {
        if pos >= self.size() {
            return Err(GraphGradError::IndexOutOfBounds {
                pos,
                size: self.size(),
            });
        }
        self.get_at(pos / self.cols, pos % self.cols)
    }

    fn put(&self, pos: usize, value: f64) -> Result<&Self, GraphGradError> {
        if pos >= self.size() {
            return Err(GraphGradError::IndexOutOfBounds {
                pos,
                size: self.size(),
            });
        }
        self.put_at(pos / self.cols, pos % self.cols, value)
    }

    fn positions(&self) -> Result<Positions, GraphGradError> {
        let cols = self.cols;
        match &self.storage {
            MatrixStorage::Owned(tensor) => tensor.positions(),
            MatrixStorage::ColumnRepetition(vector) => {
                let present: Vec<usize> = vector.positions()?.collect();
                let mut listed = Vec::with_capacity(present.len() * self.rows);
                for row in 0..self.rows {
                    listed.extend(present.iter().map(|col| row * cols + col));
                }
                Ok(Positions::listed(listed))
            }
            MatrixStorage::WrapRows(rows) => {
                let mut listed = Vec::new();
                for (row, tensor) in rows.iter().enumerate() {
                    listed.extend(tensor.positions()?.map(|col| row * cols + col));
                }
                Ok(Positions::listed(listed))
            }
            MatrixStorage::Transposed(inner) => {
                let listed = inner
                    .non_zero_entries()?
                    .into_iter()
                    .map(|(row, col)| col * cols + row)
                    .collect();
                Ok(Positions::listed(listed))
            }
        }
    }

    /// Views produce owned matrices of their backing storage kind.
    fn zero_copy(&self) -> Self {
        self.zeros_shaped_like(self.storage_kind())
    }

    fn describe(&self) -> String {
        format!("{} ({},{})", self.kind_label(), self.rows, self.cols)
    }

    fn is_matching(&self, other: &Self) -> bool {
        self.rows == other.rows && self.cols == other.cols
    }
}

impl PartialEq for Matrix {
    /// Shape and element-wise equality, regardless of storage or views.
    fn eq(&self, other: &Self) -> bool {
        if !self.is_matching(other) {
            return false;
        }
        match (self.to_vec(), other.to_vec()) {
            (Ok(left), Ok(right)) => left == right,
            _ => false,
        }
    }
}

impl fmt::Display for Matrix {
    /// One line per row, comma separated.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in 0..self.rows {
            let values = self.row(row).map_err(|_| fmt::Error)?;
            writeln!(f, "{}", values)?;
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "matrix_test.rs"]
mod tests;
