use crate::error::GraphGradError;
use crate::ops::{check_arity, invalid_input, Operation};
use crate::tensor::TensorOps;
use crate::value::Value;

/// Elementwise (Hadamard) product of two matching values.
///
/// Backward: `dA = E ⊙ B`, `dB = E ⊙ A`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Multiply;

impl Operation for Multiply {
    fn name(&self) -> &'static str {
        "multiply"
    }

    fn arity(&self) -> usize {
        2
    }

    fn forward(&self, inputs: &[Value]) -> Result<Value, GraphGradError> {
        check_arity(self, inputs)?;
        inputs[0].mul(&inputs[1])
    }

    fn partial(
        &self,
        input_id: usize,
        inputs: &[Value],
        _output: &Value,
        error: &Value,
    ) -> Result<Option<Value>, GraphGradError> {
        check_arity(self, inputs)?;
        let other = match input_id {
            0 => &inputs[1],
            1 => &inputs[0],
            _ => return Err(invalid_input(self, input_id)),
        };
        error.mul(other).map(Some)
    }
}

#[cfg(test)]
#[path = "mul_test.rs"]
mod tests;
