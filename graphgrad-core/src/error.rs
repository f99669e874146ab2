use crate::autograd::graph::NodeId;
use thiserror::Error;

/// Custom error type for the graphgrad framework.
///
/// Every variant is unrecoverable at the point it is raised: the caller either
/// wired the graph incorrectly or training diverged numerically.
#[derive(Error, Debug, PartialEq, Clone)] // PartialEq for easier testing
pub enum GraphGradError {
    #[error("Non-compliant operands for {operation}: {left} vs {right}")]
    DimensionMismatch {
        left: String,
        right: String,
        operation: String,
    },

    #[error("Index out of bounds: position {pos} for size {size}")]
    IndexOutOfBounds { pos: usize, size: usize },

    #[error("Matrix shape {rows}x{cols} exceeds the addressable size")]
    ShapeOverflow { rows: usize, cols: usize },

    #[error("Cannot store NaN at position {pos}")]
    NanValue { pos: usize },

    #[error("Did not find a finite value: {value} at position {pos}")]
    NonFinite { pos: usize, value: f64 },

    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    #[error("Unsupported operation: {0}")]
    UnsupportedOperation(String),

    #[error("Expected a {expected} value, got {actual}")]
    ValueKind { expected: &'static str, actual: String },

    #[error("Operation {operation} expects {expected} inputs, got {actual}")]
    ArityMismatch {
        operation: String,
        expected: usize,
        actual: usize,
    },

    #[error("Unknown node {0:?}")]
    UnknownNode(NodeId),

    #[error("Node {0:?} has no value; run forward() first or feed the constant")]
    MissingValue(NodeId),

    #[error("No output node has been designated for the graph")]
    NoOutput,

    #[error("Node {node:?} ({operation}) failed: {source}")]
    NodeFailed {
        node: NodeId,
        operation: String,
        source: Box<GraphGradError>,
    },

    #[error("Lock error: {reason}")]
    LockError { reason: String },
}

impl GraphGradError {
    /// Shorthand for a dimension mismatch between two described operands.
    pub(crate) fn mismatch(left: String, right: String, operation: &str) -> Self {
        GraphGradError::DimensionMismatch {
            left,
            right,
            operation: operation.to_string(),
        }
    }

    /// Strips any `NodeFailed` wrappers and returns the underlying error.
    pub fn root_cause(&self) -> &GraphGradError {
        match self {
            GraphGradError::NodeFailed { source, .. } => source.root_cause(),
            other => other,
        }
    }
}
