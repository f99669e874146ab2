//! Tensor algebra, operation nodes and a reverse-mode autodiff engine for
//! small graph-neural-network style models.

pub mod autograd;
pub mod error;
pub mod matrix;
pub mod ops;
pub mod tensor;
pub mod utils;
pub mod value;

pub use autograd::{Graph, NodeId, NodeKind, Parameter, ParameterId};
pub use error::GraphGradError;
pub use matrix::Matrix;
pub use tensor::{Positions, StorageKind, Tensor, TensorOps};
pub use value::Value;

// Re-export the distribution crate used by `TensorOps::set_to_random_with`.
pub use rand_distr;
