// src/tensor/mod.rs

use crate::error::GraphGradError;
use std::fmt;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

pub(crate) mod storage;
mod traits;

pub use storage::{Positions, StorageKind};
pub use traits::TensorOps;

use storage::Storage;

/// A fixed-size one-dimensional numeric container.
///
/// `Tensor` uses `Arc<RwLock<Storage>>` internally to allow for:
/// 1.  **Shared Ownership:** cloning a `Tensor` is cheap and yields a handle to
///     the *same* elements. Views such as `Matrix::column_repetition` rely on
///     this to present a tensor without copying it.
/// 2.  **Interior Mutability:** `put` takes `&self`; read/write locks keep
///     element access thread-safe.
///
/// Use [`TensorOps::copy`] for an independent deep copy.
///
/// The size is fixed at construction. Storage is either dense (every position
/// materialized) or sparse (only non-zero positions materialized).
#[derive(Clone)]
pub struct Tensor {
    size: usize,
    kind: StorageKind,
    storage: Arc<RwLock<Storage>>,
}

impl Tensor {
    fn with_storage(size: usize, kind: StorageKind, storage: Storage) -> Self {
        Tensor {
            size,
            kind,
            storage: Arc::new(RwLock::new(storage)),
        }
    }

    /// Creates a zero-filled tensor with the given storage policy.
    pub fn zeros(size: usize, kind: StorageKind) -> Self {
        Self::with_storage(size, kind, Storage::zeros(kind, size))
    }

    /// Creates a zero-filled dense tensor.
    pub fn dense(size: usize) -> Self {
        Self::zeros(size, StorageKind::Dense)
    }

    /// Creates an empty sparse tensor; unwritten positions read as zero.
    pub fn sparse(size: usize) -> Self {
        Self::zeros(size, StorageKind::Sparse)
    }

    /// Creates a dense tensor owning `values`.
    ///
    /// # Errors
    /// `NanValue` if any element is NaN.
    pub fn from_vec(values: Vec<f64>) -> Result<Self, GraphGradError> {
        if let Some(pos) = values.iter().position(|value| value.is_nan()) {
            return Err(GraphGradError::NanValue { pos });
        }
        Ok(Self::with_storage(
            values.len(),
            StorageKind::Dense,
            Storage::Dense(values),
        ))
    }

    /// Creates a dense tensor of size 1.
    pub fn from_double(value: f64) -> Result<Self, GraphGradError> {
        Self::from_vec(vec![value])
    }

    /// Creates a dense tensor holding `start, start+1, ..., end-1`.
    pub fn from_range(start: usize, end: usize) -> Self {
        let values = (start..end.max(start)).map(|value| value as f64).collect();
        Self::with_storage(end.saturating_sub(start), StorageKind::Dense, Storage::Dense(values))
    }

    /// Returns the storage policy of this tensor.
    pub fn storage_kind(&self) -> StorageKind {
        self.kind
    }

    /// Returns a dense deep copy.
    pub fn to_dense(&self) -> Result<Tensor, GraphGradError> {
        self.convert(StorageKind::Dense)
    }

    /// Returns a sparse deep copy.
    pub fn to_sparse(&self) -> Result<Tensor, GraphGradError> {
        self.convert(StorageKind::Sparse)
    }

    fn convert(&self, kind: StorageKind) -> Result<Tensor, GraphGradError> {
        let res = Tensor::zeros(self.size, kind);
        for pos in self.positions()? {
            res.put(pos, self.get(pos)?)?;
        }
        Ok(res)
    }

    /// Whether both handles alias the same storage.
    pub fn shares_storage_with(&self, other: &Tensor) -> bool {
        Arc::ptr_eq(&self.storage, &other.storage)
    }

    fn read_storage(&self) -> Result<RwLockReadGuard<'_, Storage>, GraphGradError> {
        self.storage.read().map_err(|_| GraphGradError::LockError {
            reason: "tensor storage lock poisoned (read)".to_string(),
        })
    }

    fn write_storage(&self) -> Result<RwLockWriteGuard<'_, Storage>, GraphGradError> {
        self.storage.write().map_err(|_| GraphGradError::LockError {
            reason: "tensor storage lock poisoned (write)".to_string(),
        })
    }

    fn check_bounds(&self, pos: usize) -> Result<(), GraphGradError> {
        if pos >= self.size {
            return Err(GraphGradError::IndexOutOfBounds {
                pos,
                size: self.size,
            });
        }
        Ok(())
    }
}

impl TensorOps for Tensor {
    fn size(&self) -> usize {
        self.size
    }

    fn get(&self, pos: usize) -> Result<f64, GraphGradError> {
        self.check_bounds(pos)?;
        Ok(self.read_storage()?.get(pos))
    }

    fn put(&self, pos: usize, value: f64) -> Result<&Self, GraphGradError> {
        self.check_bounds(pos)?;
        if value.is_nan() {
            return Err(GraphGradError::NanValue { pos });
        }
        self.write_storage()?.put(pos, value);
        Ok(self)
    }

    fn positions(&self) -> Result<Positions, GraphGradError> {
        Ok(self.read_storage()?.positions(self.size))
    }

    fn zero_copy(&self) -> Self {
        Tensor::zeros(self.size, self.kind)
    }

    fn describe(&self) -> String {
        format!("Tensor ({}, {})", self.size, self.kind)
    }
}

impl PartialEq for Tensor {
    /// Element-wise equality, regardless of storage kind.
    fn eq(&self, other: &Self) -> bool {
        if self.size != other.size {
            return false;
        }
        match (self.to_vec(), other.to_vec()) {
            (Ok(left), Ok(right)) => left == right,
            _ => false,
        }
    }
}

impl fmt::Debug for Tensor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.to_vec() {
            Ok(values) => f
                .debug_struct("Tensor")
                .field("size", &self.size)
                .field("kind", &self.kind)
                .field("values", &values)
                .finish(),
            Err(err) => write!(f, "Tensor(<unreadable: {}>)", err),
        }
    }
}

impl fmt::Display for Tensor {
    /// Comma separated values of every position.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let values = self.to_vec().map_err(|_| fmt::Error)?;
        let rendered: Vec<String> = values.iter().map(|value| value.to_string()).collect();
        write!(f, "{}", rendered.join(","))
    }
}

#[cfg(test)]
#[path = "tensor_test.rs"]
mod tests;
