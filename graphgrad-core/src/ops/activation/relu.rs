use crate::error::GraphGradError;
use crate::ops::activation::elementwise_partial;
use crate::ops::{check_arity, invalid_input, Operation};
use crate::tensor::TensorOps;
use crate::value::Value;

/// ReLU(x) = max(0, x)
pub fn relu(x: f64) -> f64 {
    if x > 0.0 {
        x
    } else {
        0.0
    }
}

/// Subgradient of ReLU; zero at the kink.
pub fn relu_derivative(x: f64) -> f64 {
    if x > 0.0 {
        1.0
    } else {
        0.0
    }
}

/// Rectified Linear Unit activation.
#[derive(Debug, Clone, Copy, Default)]
pub struct Relu;

impl Operation for Relu {
    fn name(&self) -> &'static str {
        "relu"
    }

    fn arity(&self) -> usize {
        1
    }

    fn forward(&self, inputs: &[Value]) -> Result<Value, GraphGradError> {
        check_arity(self, inputs)?;
        inputs[0].map(relu)
    }

    fn partial(
        &self,
        input_id: usize,
        inputs: &[Value],
        _output: &Value,
        error: &Value,
    ) -> Result<Option<Value>, GraphGradError> {
        check_arity(self, inputs)?;
        if input_id != 0 {
            return Err(invalid_input(self, input_id));
        }
        elementwise_partial(&inputs[0], error, relu_derivative).map(Some)
    }
}
