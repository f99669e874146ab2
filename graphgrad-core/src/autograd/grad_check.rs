use crate::autograd::graph::Graph;
use crate::error::GraphGradError;
use crate::ops::Operation;
use crate::tensor::TensorOps;
use crate::value::Value;
use log::debug;
use thiserror::Error;

/// Error type specifically for gradient checking failures.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GradCheckError {
    #[error("Gradient check failed for {input} at element {element_index}: analytical {analytical_grad:?} != numerical {numerical_grad:?} (difference {difference:?})")]
    GradientMismatch {
        input: String,
        element_index: usize,
        analytical_grad: f64,
        numerical_grad: f64,
        difference: f64,
    },

    #[error("Forward pass failed during gradient check: {0}")]
    ForwardPassError(GraphGradError),

    #[error("Backward pass failed during gradient check: {0}")]
    BackwardPassError(GraphGradError),

    #[error("{input} received no analytical gradient")]
    MissingAnalyticalGrad { input: String },

    #[error("Numerical gradient is NaN or infinite for {input}, element {element_index}: loss+ {loss_plus:?}, loss- {loss_minus:?}")]
    NumericalGradNaNOrInfinite {
        input: String,
        element_index: usize,
        loss_plus: f64,
        loss_minus: f64,
    },

    #[error("Tensor error during gradient check: {0}")]
    TensorError(GraphGradError),
}

impl From<GraphGradError> for GradCheckError {
    fn from(err: GraphGradError) -> Self {
        GradCheckError::TensorError(err)
    }
}

/// Central difference `(f(x+eps) - f(x-eps)) / 2eps` for one element of
/// `target`, restoring the element afterwards.
fn numerical_derivative<F>(
    target: &Value,
    pos: usize,
    epsilon: f64,
    input: &str,
    mut loss: F,
) -> Result<f64, GradCheckError>
where
    F: FnMut() -> Result<f64, GradCheckError>,
{
    let original = target.get(pos)?;
    target.put(pos, original + epsilon)?;
    let loss_plus = loss();
    target.put(pos, original - epsilon)?;
    let loss_minus = loss();
    target.put(pos, original)?;

    let (loss_plus, loss_minus) = (loss_plus?, loss_minus?);
    let numerical = (loss_plus - loss_minus) / (2.0 * epsilon);
    if !numerical.is_finite() {
        return Err(GradCheckError::NumericalGradNaNOrInfinite {
            input: input.to_string(),
            element_index: pos,
            loss_plus,
            loss_minus,
        });
    }
    Ok(numerical)
}

fn compare(
    input: &str,
    element_index: usize,
    analytical_grad: f64,
    numerical_grad: f64,
    tolerance: f64,
) -> Result<(), GradCheckError> {
    let difference = (analytical_grad - numerical_grad).abs();
    if difference > tolerance * (1.0 + numerical_grad.abs()) {
        return Err(GradCheckError::GradientMismatch {
            input: input.to_string(),
            element_index,
            analytical_grad,
            numerical_grad,
            difference,
        });
    }
    Ok(())
}

/// Checks every `partial` rule of `op` against finite differences.
///
/// The scalar being differentiated is `sum(op(inputs) ⊙ output_error)`, so
/// the analytical gradient of input `i` is `op.partial(i, ..., output_error)`.
/// Inputs for which `partial` returns `None` are skipped. Every position of
/// every differentiable input is perturbed, so absent sparse entries are
/// checked too.
pub fn check_operation(
    op: &dyn Operation,
    inputs: &[Value],
    output_error: &Value,
    epsilon: f64,
    tolerance: f64,
) -> Result<(), GradCheckError> {
    // Work on deep copies so the caller's values are never touched.
    let working: Vec<Value> = inputs
        .iter()
        .map(TensorOps::copy)
        .collect::<Result<_, _>>()?;

    let output = op.forward(&working).map_err(GradCheckError::ForwardPassError)?;
    output.assert_matching(output_error, "check_operation")?;

    for input_id in 0..working.len() {
        let analytical = match op
            .partial(input_id, &working, &output, output_error)
            .map_err(GradCheckError::BackwardPassError)?
        {
            Some(grad) => grad,
            None => continue,
        };
        let label = format!("{} input {}", op.name(), input_id);
        analytical.assert_matching(&working[input_id], "check_operation")?;

        for pos in 0..working[input_id].size() {
            let numerical = numerical_derivative(&working[input_id], pos, epsilon, &label, || {
                let perturbed = op
                    .forward(&working)
                    .map_err(GradCheckError::ForwardPassError)?;
                Ok(perturbed.dot(output_error)?)
            })?;
            compare(&label, pos, analytical.get(pos)?, numerical, tolerance)?;
        }
    }
    debug!("Gradient check passed for {}", op.name());
    Ok(())
}

/// Checks the gradients a graph computes for its parameters.
///
/// Runs forward and backward with `output_error` as the seed, then compares
/// each parameter's gradient with central finite differences of
/// `sum(output ⊙ output_error)`. Parameter storage is perturbed in place and
/// restored afterwards, so the graph is left in its original state apart from
/// its caches. Parameters the output does not depend on are skipped.
pub fn check_grad(
    graph: &mut Graph,
    output_error: &Value,
    epsilon: f64,
    tolerance: f64,
) -> Result<(), GradCheckError> {
    graph.forward().map_err(GradCheckError::ForwardPassError)?;
    graph
        .backward(output_error)
        .map_err(GradCheckError::BackwardPassError)?;

    let mut analytical = Vec::new();
    for (node, parameter) in graph.reachable_parameters()? {
        let label = match parameter.name() {
            Some(name) => format!("parameter {} ({})", parameter.id(), name),
            None => format!("parameter {}", parameter.id()),
        };
        match graph.gradient(node)? {
            Some(grad) => analytical.push((label, parameter, grad.copy()?)),
            None => return Err(GradCheckError::MissingAnalyticalGrad { input: label }),
        }
    }

    for (label, parameter, grad) in &analytical {
        let target: &Value = parameter;
        for pos in 0..target.size() {
            let numerical = numerical_derivative(target, pos, epsilon, label, || {
                let output = graph.forward().map_err(GradCheckError::ForwardPassError)?;
                Ok(output.dot(output_error)?)
            })?;
            compare(label, pos, grad.get(pos)?, numerical, tolerance)?;
        }
    }
    debug!("Gradient check passed for {} parameters", analytical.len());
    Ok(())
}
