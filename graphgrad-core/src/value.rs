use crate::error::GraphGradError;
use crate::matrix::Matrix;
use crate::tensor::{Positions, StorageKind, Tensor, TensorOps};
use std::fmt;

/// The data flowing along graph edges: a vector or a matrix.
///
/// `Value` forwards the whole [`TensorOps`] contract to the wrapped tensor, so
/// gradient accumulation and optimizer arithmetic do not need to know which
/// one they hold. Binary operations only match values of the same variant and
/// shape.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    Vector(Tensor),
    Matrix(Matrix),
}

impl Value {
    /// Borrows the wrapped vector.
    ///
    /// # Errors
    /// `ValueKind` if this value is a matrix.
    pub fn as_vector(&self) -> Result<&Tensor, GraphGradError> {
        match self {
            Value::Vector(tensor) => Ok(tensor),
            Value::Matrix(matrix) => Err(GraphGradError::ValueKind {
                expected: "vector",
                actual: matrix.describe(),
            }),
        }
    }

    /// Borrows the wrapped matrix.
    ///
    /// # Errors
    /// `ValueKind` if this value is a vector.
    pub fn as_matrix(&self) -> Result<&Matrix, GraphGradError> {
        match self {
            Value::Matrix(matrix) => Ok(matrix),
            Value::Vector(tensor) => Err(GraphGradError::ValueKind {
                expected: "matrix",
                actual: tensor.describe(),
            }),
        }
    }

    pub fn is_matrix(&self) -> bool {
        matches!(self, Value::Matrix(_))
    }

    pub fn storage_kind(&self) -> StorageKind {
        match self {
            Value::Vector(tensor) => tensor.storage_kind(),
            Value::Matrix(matrix) => matrix.storage_kind(),
        }
    }
}

impl From<Tensor> for Value {
    fn from(tensor: Tensor) -> Self {
        Value::Vector(tensor)
    }
}

impl From<Matrix> for Value {
    fn from(matrix: Matrix) -> Self {
        Value::Matrix(matrix)
    }
}

impl TensorOps for Value {
    fn size(&self) -> usize {
        match self {
            Value::Vector(tensor) => tensor.size(),
            Value::Matrix(matrix) => matrix.size(),
        }
    }

    fn get(&self, pos: usize) -> Result<f64, GraphGradError> {
        match self {
            Value::Vector(tensor) => tensor.get(pos),
            Value::Matrix(matrix) => matrix.get(pos),
        }
    }

    fn put(&self, pos: usize, value: f64) -> Result<&Self, GraphGradError> {
        match self {
            Value::Vector(tensor) => {
                tensor.put(pos, value)?;
            }
            Value::Matrix(matrix) => {
                matrix.put(pos, value)?;
            }
        }
        Ok(self)
    }

    fn positions(&self) -> Result<Positions, GraphGradError> {
        match self {
            Value::Vector(tensor) => tensor.positions(),
            Value::Matrix(matrix) => matrix.positions(),
        }
    }

    fn zero_copy(&self) -> Self {
        match self {
            Value::Vector(tensor) => Value::Vector(tensor.zero_copy()),
            Value::Matrix(matrix) => Value::Matrix(matrix.zero_copy()),
        }
    }

    fn describe(&self) -> String {
        match self {
            Value::Vector(tensor) => tensor.describe(),
            Value::Matrix(matrix) => matrix.describe(),
        }
    }

    fn is_matching(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Vector(left), Value::Vector(right)) => left.is_matching(right),
            (Value::Matrix(left), Value::Matrix(right)) => left.is_matching(right),
            _ => false,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Vector(tensor) => write!(f, "{}", tensor),
            Value::Matrix(matrix) => write!(f, "{}", matrix),
        }
    }
}
