use crate::error::GraphGradError;
use crate::matrix::Matrix;
use crate::ops::{check_arity, invalid_input, Operation};
use crate::tensor::{Tensor, TensorOps};
use crate::value::Value;
use num_traits::ToPrimitive;

/// Repeats a vector as the rows of a matrix.
///
/// Inputs: the vector, then a single-element vector holding the repetition
/// count. The output is a read-only [`Matrix::column_repetition`] view with
/// `count` rows, so the vector is not copied.
///
/// Backward sums the error's columns back into a vector, visiting only the
/// entries the error holds. The count receives no gradient.
#[derive(Debug, Clone, Copy, Default)]
pub struct Repeat;

/// Reads a repetition count, rejecting negative, fractional and NaN values.
fn repetition_count(value: &Value) -> Result<usize, GraphGradError> {
    let raw = value.as_vector()?.to_double()?;
    match raw.to_usize() {
        Some(count) if raw.fract() == 0.0 => Ok(count),
        _ => Err(GraphGradError::ValueKind {
            expected: "non-negative integer repetition count",
            actual: raw.to_string(),
        }),
    }
}

impl Operation for Repeat {
    fn name(&self) -> &'static str {
        "repeat"
    }

    fn arity(&self) -> usize {
        2
    }

    fn forward(&self, inputs: &[Value]) -> Result<Value, GraphGradError> {
        check_arity(self, inputs)?;
        let vector = inputs[0].as_vector()?;
        let times = repetition_count(&inputs[1])?;
        Ok(Value::Matrix(Matrix::column_repetition(
            times,
            vector.clone(),
        )?))
    }

    fn partial(
        &self,
        input_id: usize,
        inputs: &[Value],
        output: &Value,
        error: &Value,
    ) -> Result<Option<Value>, GraphGradError> {
        check_arity(self, inputs)?;
        match input_id {
            0 => {
                let vector = inputs[0].as_vector()?;
                let error_matrix = error.as_matrix()?;
                output.assert_matching(error, "repeat backward")?;
                let grad: Tensor = vector.zero_copy();
                for (row, col) in error_matrix.non_zero_entries()? {
                    grad.put_add(col, error_matrix.get_at(row, col)?)?;
                }
                Ok(Some(Value::Vector(grad)))
            }
            1 => Ok(None),
            _ => Err(invalid_input(self, input_id)),
        }
    }
}
