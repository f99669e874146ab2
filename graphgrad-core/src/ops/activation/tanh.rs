use crate::error::GraphGradError;
use crate::ops::activation::elementwise_partial;
use crate::ops::{check_arity, invalid_input, Operation};
use crate::tensor::TensorOps;
use crate::value::Value;

pub fn tanh(x: f64) -> f64 {
    x.tanh()
}

pub fn tanh_derivative(x: f64) -> f64 {
    let t = x.tanh();
    1.0 - t * t
}

/// Hyperbolic tangent activation.
#[derive(Debug, Clone, Copy, Default)]
pub struct Tanh;

impl Operation for Tanh {
    fn name(&self) -> &'static str {
        "tanh"
    }

    fn arity(&self) -> usize {
        1
    }

    fn forward(&self, inputs: &[Value]) -> Result<Value, GraphGradError> {
        check_arity(self, inputs)?;
        inputs[0].map(tanh)
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
        elementwise_partial(&inputs[0], error, tanh_derivative).map(Some)
    }
}
