// graphgrad-optim/src/sgd.rs

use crate::adam::check_learning_rate;
use crate::Optimizer;
use graphgrad_core::{GraphGradError, Parameter, TensorOps, Value};

/// Plain gradient descent.
///
/// Updates parameters `p` according to the rule `p = p - lr * grad(p)`.
/// Stateless, so concurrent updates only contend on the parameter storage.
#[derive(Debug, Clone)]
pub struct GradientDescent {
    learning_rate: f64,
}

impl GradientDescent {
    /// # Errors
    ///
    /// `ConfigurationError` unless `learning_rate` is finite and positive.
    pub fn new(learning_rate: f64) -> Result<Self, GraphGradError> {
        check_learning_rate(learning_rate)?;
        Ok(GradientDescent { learning_rate })
    }

    pub fn learning_rate(&self) -> f64 {
        self.learning_rate
    }
}

impl Optimizer for GradientDescent {
    fn update(&self, parameter: &Parameter, gradient: &Value) -> Result<(), GraphGradError> {
        parameter.add_(&gradient.scale(-self.learning_rate)?)?;
        Ok(())
    }

    fn reset(&self) {}
}
