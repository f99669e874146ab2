// src/ops/activation/mod.rs

//! # Activation Functions
//!
//! Elementwise non-linearities. Each one applies its scalar function to every
//! position of a vector or matrix input (zeros included, since `f(0)` need not
//! be zero) and backpropagates `f'(input) ⊙ error`.
//!
//! The scalar functions and their derivatives are public so loss code outside
//! the graph can reuse them.

use crate::error::GraphGradError;
use crate::tensor::TensorOps;
use crate::value::Value;

pub mod relu;
pub mod sigmoid;
pub mod tanh;

pub use relu::{relu, relu_derivative, Relu};
pub use sigmoid::{sigmoid, sigmoid_derivative, Sigmoid};
pub use tanh::{tanh, tanh_derivative, Tanh};

/// `f'(input) ⊙ error`, the shared backward rule of every activation.
pub(crate) fn elementwise_partial<F>(
    input: &Value,
    error: &Value,
    derivative: F,
) -> Result<Value, GraphGradError>
where
    F: Fn(f64) -> f64,
{
    input.assert_matching(error, "activation backward")?;
    input.map(derivative)?.mul(error)
}

#[cfg(test)]
#[path = "activation_test.rs"]
mod tests;
