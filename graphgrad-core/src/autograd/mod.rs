//! Reverse-mode automatic differentiation over a graph of operation nodes.

pub mod grad_check;
pub mod graph;
pub mod parameter;

pub use graph::{Graph, NodeId, NodeKind};
pub use parameter::{Parameter, ParameterId};
