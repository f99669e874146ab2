use crate::error::GraphGradError;
use crate::ops::{check_arity, invalid_input, Operation};
use crate::tensor::TensorOps;
use crate::value::Value;

/// Matrix transpose as a view; backward transposes the error.
#[derive(Debug, Clone, Copy, Default)]
pub struct Transpose;

impl Operation for Transpose {
    fn name(&self) -> &'static str {
        "transpose"
    }

    fn arity(&self) -> usize {
        1
    }

    fn forward(&self, inputs: &[Value]) -> Result<Value, GraphGradError> {
        check_arity(self, inputs)?;
        Ok(Value::Matrix(inputs[0].as_matrix()?.transposed()))
    }

    fn partial(
        &self,
        input_id: usize,
        inputs: &[Value],
        output: &Value,
        error: &Value,
    ) -> Result<Option<Value>, GraphGradError> {
        check_arity(self, inputs)?;
        if input_id != 0 {
            return Err(invalid_input(self, input_id));
        }
        output.assert_matching(error, "transpose backward")?;
        let grad = error.as_matrix()?.transposed().copy()?;
        Ok(Some(Value::Matrix(grad)))
    }
}
