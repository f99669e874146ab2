use crate::error::GraphGradError;
use crate::ops::{check_arity, invalid_input, Operation};
use crate::value::Value;

/// Matrix product `W · H` of two matrix inputs.
///
/// Backward: `dW = E · Hᵗ`, `dH = Wᵗ · E`.
#[derive(Debug, Clone, Copy, Default)]
pub struct MatMul;

impl Operation for MatMul {
    fn name(&self) -> &'static str {
        "matmul"
    }

    fn arity(&self) -> usize {
        2
    }

    fn forward(&self, inputs: &[Value]) -> Result<Value, GraphGradError> {
        check_arity(self, inputs)?;
        let w = inputs[0].as_matrix()?;
        let h = inputs[1].as_matrix()?;
        Ok(Value::Matrix(w.matmul(h, false, false)?))
    }

    fn partial(
        &self,
        input_id: usize,
        inputs: &[Value],
        _output: &Value,
        error: &Value,
    ) -> Result<Option<Value>, GraphGradError> {
        check_arity(self, inputs)?;
        let error = error.as_matrix()?;
        let grad = match input_id {
            0 => error.matmul(inputs[1].as_matrix()?, false, true)?,
            1 => inputs[0].as_matrix()?.matmul(error, true, false)?,
            _ => return Err(invalid_input(self, input_id)),
        };
        Ok(Some(Value::Matrix(grad)))
    }
}

#[cfg(test)]
#[path = "matmul_test.rs"]
mod tests;
