use crate::error::GraphGradError;
use crate::ops::activation::elementwise_partial;
use crate::ops::{check_arity, invalid_input, Operation};
use crate::tensor::TensorOps;
use crate::value::Value;

/// Logistic function `1 / (1 + e^-x)`.
pub fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

pub fn sigmoid_derivative(x: f64) -> f64 {
    let s = sigmoid(x);
    s * (1.0 - s)
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Sigmoid;

impl Operation for Sigmoid {
    fn name(&self) -> &'static str {
        "sigmoid"
    }

    fn arity(&self) -> usize {
        1
    }

    fn forward(&self, inputs: &[Value]) -> Result<Value, GraphGradError> {
        check_arity(self, inputs)?;
        inputs[0].map(sigmoid)
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
        elementwise_partial(&inputs[0], error, sigmoid_derivative).map(Some)
    }
}
