//! Optimizers consuming the gradients computed by a `graphgrad_core::Graph`.

use graphgrad_core::{Graph, GraphGradError, Parameter, Value};

pub mod adam;
pub mod batch;
pub mod sgd;

pub use adam::{Adam, AdamConfig, SecondMomentEstimate};
pub use batch::BatchOptimizer;
pub use sgd::GradientDescent;

/// Trait defining the common interface for all optimizers.
///
/// Optimizers mutate a parameter's value in place from its gradient. They
/// are shared by reference between worker threads, so every method takes
/// `&self` and implementations synchronize their own state.
pub trait Optimizer: Send + Sync {
    /// Applies one update step to `parameter` using `gradient`.
    ///
    /// # Errors
    ///
    /// `DimensionMismatch` if `gradient` does not match the parameter's value.
    fn update(&self, parameter: &Parameter, gradient: &Value) -> Result<(), GraphGradError>;

    /// Discards all per-parameter state, e.g. to restart training.
    fn reset(&self);

    /// Updates every parameter of `graph` that received a gradient during its
    /// last backward pass.
    fn apply(&self, graph: &Graph) -> Result<(), GraphGradError> {
        for (parameter, gradient) in graph.parameter_gradients() {
            self.update(&parameter, &gradient)?;
        }
        Ok(())
    }
}
