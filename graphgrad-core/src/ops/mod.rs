//! Operation nodes of the computation graph.
//!
//! Every operation is a stateless rule pair: `forward` computes the node's
//! value from the current values of its inputs and `partial` maps the error at
//! the node's output to the error of one input. Inputs are never mutated.

use crate::error::GraphGradError;
use crate::value::Value;
use std::fmt::Debug;

pub mod activation;
pub mod arithmetic;
pub mod linalg;
pub mod reduction;
pub mod view;

pub use activation::{Relu, Sigmoid, Tanh};
pub use arithmetic::{Add, Multiply};
pub use linalg::MatMul;
pub use reduction::Sum;
pub use view::{Repeat, Transpose};

/// A differentiable unit of computation with a fixed number of inputs.
pub trait Operation: Debug + Send + Sync {
    /// Short name used in logs and error messages.
    fn name(&self) -> &'static str;

    /// Number of inputs the operation takes.
    fn arity(&self) -> usize;

    /// Computes the output from the current input values.
    fn forward(&self, inputs: &[Value]) -> Result<Value, GraphGradError>;

    /// Gradient for input `input_id`, given the cached `output` and the
    /// `error` (gradient of the loss w.r.t. `output`).
    ///
    /// Returns `Ok(None)` when no gradient flows to that input.
    fn partial(
        &self,
        input_id: usize,
        inputs: &[Value],
        output: &Value,
        error: &Value,
    ) -> Result<Option<Value>, GraphGradError>;
}

/// Fails unless `inputs` holds exactly `op.arity()` values.
pub(crate) fn check_arity(op: &dyn Operation, inputs: &[Value]) -> Result<(), GraphGradError> {
    if inputs.len() != op.arity() {
        return Err(GraphGradError::ArityMismatch {
            operation: op.name().to_string(),
            expected: op.arity(),
            actual: inputs.len(),
        });
    }
    Ok(())
}

pub(crate) fn invalid_input(op: &dyn Operation, input_id: usize) -> GraphGradError {
    GraphGradError::UnsupportedOperation(format!(
        "{} has no input {} (arity {})",
        op.name(),
        input_id,
        op.arity()
    ))
}
