use crate::error::GraphGradError;
use crate::ops::{check_arity, invalid_input, Operation};
use crate::tensor::TensorOps;
use crate::value::Value;

/// Elementwise sum of two matching values.
///
/// The gradient w.r.t. both inputs is the incoming error.
#[derive(Debug, Clone, Copy, Default)]
pub struct Add;

impl Operation for Add {
    fn name(&self) -> &'static str {
        "add"
    }

    fn arity(&self) -> usize {
        2
    }

    fn forward(&self, inputs: &[Value]) -> Result<Value, GraphGradError> {
        check_arity(self, inputs)?;
        inputs[0].add(&inputs[1])
    }

    fn partial(
        &self,
        input_id: usize,
        inputs: &[Value],
        _output: &Value,
        error: &Value,
    ) -> Result<Option<Value>, GraphGradError> {
        check_arity(self, inputs)?;
        if input_id > 1 {
            return Err(invalid_input(self, input_id));
        }
        inputs[input_id].assert_matching(error, "add backward")?;
        error.copy().map(Some)
    }
}

#[cfg(test)]
#[path = "add_test.rs"]
mod tests;
