use crate::error::GraphGradError;
use crate::ops::{check_arity, invalid_input, Operation};
use crate::tensor::{Tensor, TensorOps};
use crate::value::Value;

/// Sum reduction.
///
/// A matrix input reduces to the vector of its row sums; a vector input
/// reduces to a single-element vector holding its total.
///
/// Backward for a matrix input writes each row's error on the entries the
/// input actually holds, so the gradient of a sparse input keeps the input's
/// sparsity pattern. Backward for a vector input broadcasts the scalar error
/// to every element.
#[derive(Debug, Clone, Copy, Default)]
pub struct Sum;

impl Operation for Sum {
    fn name(&self) -> &'static str {
        "sum"
    }

    fn arity(&self) -> usize {
        1
    }

    fn forward(&self, inputs: &[Value]) -> Result<Value, GraphGradError> {
        check_arity(self, inputs)?;
        match &inputs[0] {
            Value::Matrix(matrix) => {
                let res = Tensor::dense(matrix.rows());
                for (row, col) in matrix.non_zero_entries()? {
                    res.put_add(row, matrix.get_at(row, col)?)?;
                }
                Ok(Value::Vector(res))
            }
            Value::Vector(tensor) => Ok(Value::Vector(Tensor::from_double(tensor.sum()?)?)),
        }
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
        let error = error.as_vector()?;
        let grad = match &inputs[0] {
            Value::Matrix(matrix) => {
                if error.size() != matrix.rows() {
                    return Err(GraphGradError::mismatch(
                        error.describe(),
                        matrix.describe(),
                        "sum backward",
                    ));
                }
                let res = matrix.zero_copy();
                for (row, col) in matrix.non_zero_entries()? {
                    res.put_at(row, col, error.get(row)?)?;
                }
                Value::Matrix(res)
            }
            Value::Vector(tensor) => {
                let res = tensor.zero_copy();
                res.fill_(error.to_double()?)?;
                Value::Vector(res)
            }
        };
        Ok(Some(grad))
    }
}

#[cfg(test)]
#[path = "sum_test.rs"]
mod tests;
