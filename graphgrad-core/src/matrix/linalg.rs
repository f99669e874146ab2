use super::Matrix;
use crate::error::GraphGradError;
use crate::tensor::{StorageKind, TensorOps};
use log::debug;
use std::collections::HashMap;

impl Matrix {
    /// Matrix product honoring transpose flags.
    ///
    /// Computes `op(self) · op(other)` where `op` transposes its argument when
    /// the matching flag is set. Only the present entries of both operands are
    /// visited. The result is sparse when both operands are sparse and dense
    /// otherwise.
    ///
    /// # Errors
    /// `DimensionMismatch` when the inner dimensions disagree after the
    /// transpose flags are applied.
    pub fn matmul(
        &self,
        other: &Matrix,
        transpose_self: bool,
        transpose_other: bool,
    ) -> Result<Matrix, GraphGradError> {
        let left = if transpose_self {
            self.transposed()
        } else {
            self.clone()
        };
        let right = if transpose_other {
            other.transposed()
        } else {
            other.clone()
        };
        if left.cols() != right.rows() {
            return Err(GraphGradError::mismatch(
                left.describe(),
                right.describe(),
                "matmul",
            ));
        }

        let kind = if left.storage_kind() == StorageKind::Sparse
            && right.storage_kind() == StorageKind::Sparse
        {
            StorageKind::Sparse
        } else {
            StorageKind::Dense
        };
        let res = Matrix::zeros(left.rows(), right.cols(), kind)?;

        // Index the right operand by row so each left entry touches only the
        // present entries of the matching row.
        let mut right_rows: HashMap<usize, Vec<(usize, f64)>> = HashMap::new();
        for (row, col) in right.non_zero_entries()? {
            let value = right.get_at(row, col)?;
            if value != 0.0 {
                right_rows.entry(row).or_default().push((col, value));
            }
        }
        for (row, inner) in left.non_zero_entries()? {
            let value = left.get_at(row, inner)?;
            if value == 0.0 {
                continue;
            }
            if let Some(entries) = right_rows.get(&inner) {
                for &(col, other_value) in entries {
                    let pos = row * res.cols() + col;
                    res.put_add(pos, value * other_value)?;
                }
            }
        }
        Ok(res)
    }

    /// Writes `value` on every main diagonal entry of a square matrix.
    pub fn set_main_diagonal(&self, value: f64) -> Result<&Self, GraphGradError> {
        if self.rows() != self.cols() {
            return Err(GraphGradError::UnsupportedOperation(format!(
                "main diagonal of non-square {}",
                self.describe()
            )));
        }
        for i in 0..self.rows() {
            self.put_at(i, i, value)?;
        }
        Ok(self)
    }

    /// Symmetric normalization `A(r,c) / sqrt(rowsum(r) * colsum(c))`, in place.
    ///
    /// For a symmetric adjacency matrix this is `D^-1/2 A D^-1/2`. Entries in a
    /// row or column summing to zero are left untouched.
    pub fn set_to_symmetric_normalization(&self) -> Result<&Self, GraphGradError> {
        let entries = self.non_zero_entries()?;
        let mut row_sums = vec![0.0; self.rows()];
        let mut col_sums = vec![0.0; self.cols()];
        for &(row, col) in &entries {
            let value = self.get_at(row, col)?;
            row_sums[row] += value;
            col_sums[col] += value;
        }
        for &(row, col) in &entries {
            let divisor = (row_sums[row] * col_sums[col]).sqrt();
            if divisor != 0.0 && divisor.is_finite() {
                let value = self.get_at(row, col)?;
                self.put_at(row, col, value / divisor)?;
            }
        }
        debug!(
            "Symmetrically normalized {} over {} entries",
            self.describe(),
            entries.len()
        );
        Ok(self)
    }
}
