use crate::autograd::parameter::Parameter;
use crate::error::GraphGradError;
use crate::ops::Operation;
use crate::tensor::TensorOps;
use crate::value::Value;
use log::{debug, warn};
use std::collections::BinaryHeap;
use std::fmt;
use std::sync::Arc;

/// Stable handle of a node inside one [`Graph`].
///
/// Handles are arena indices. A node's inputs always have smaller handles
/// than the node itself, so handle order is a topological order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "node {}", self.0)
    }
}

/// What a node computes.
#[derive(Debug, Clone)]
pub enum NodeKind {
    /// A fed value that never receives a trainable gradient.
    Constant(Value),
    /// A trainable value whose gradient is handed to an optimizer.
    Parameter(Parameter),
    Operation(Arc<dyn Operation>),
}

impl NodeKind {
    fn label(&self) -> &'static str {
        match self {
            NodeKind::Constant(_) => "constant",
            NodeKind::Parameter(_) => "parameter",
            NodeKind::Operation(op) => op.name(),
        }
    }
}

#[derive(Debug, Clone)]
struct Node {
    kind: NodeKind,
    inputs: Vec<NodeId>,
    /// Output of the last forward pass.
    value: Option<Value>,
    /// Error accumulated during the current backward pass.
    error: Option<Value>,
}

/// A computation graph owning its nodes in an arena.
///
/// Cloning a graph yields a replica that shares operation definitions and
/// parameter storage but has its own constant slots and caches, so replicas
/// can run forward/backward on different threads against one optimizer.
#[derive(Debug, Clone, Default)]
pub struct Graph {
    nodes: Vec<Node>,
    output: Option<NodeId>,
}

impl Graph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    fn push(&mut self, kind: NodeKind, inputs: Vec<NodeId>) -> NodeId {
        let id = NodeId(self.nodes.len());
        debug!("Adding {} ({}) with inputs {:?}", id, kind.label(), inputs);
        self.nodes.push(Node {
            kind,
            inputs,
            value: None,
            error: None,
        });
        id
    }

    fn node(&self, id: NodeId) -> Result<&Node, GraphGradError> {
        self.nodes.get(id.0).ok_or(GraphGradError::UnknownNode(id))
    }

    pub fn add_constant(&mut self, value: impl Into<Value>) -> NodeId {
        self.push(NodeKind::Constant(value.into()), Vec::new())
    }

    /// Adds a parameter node, or returns the existing node for the same
    /// parameter identity.
    pub fn add_parameter(&mut self, parameter: Parameter) -> NodeId {
        let existing = self.nodes.iter().position(|node| {
            matches!(&node.kind, NodeKind::Parameter(p) if p.id() == parameter.id())
        });
        match existing {
            Some(index) => NodeId(index),
            None => self.push(NodeKind::Parameter(parameter), Vec::new()),
        }
    }

    /// Adds an operation node over existing nodes.
    ///
    /// # Errors
    /// `ArityMismatch` if `inputs` does not match the operation's arity,
    /// `UnknownNode` if an input is not a node of this graph.
    pub fn add_operation<O>(&mut self, op: O, inputs: &[NodeId]) -> Result<NodeId, GraphGradError>
    where
        O: Operation + 'static,
    {
        self.add_shared_operation(Arc::new(op), inputs)
    }

    /// Like [`Graph::add_operation`] for an operation shared between nodes.
    pub fn add_shared_operation(
        &mut self,
        op: Arc<dyn Operation>,
        inputs: &[NodeId],
    ) -> Result<NodeId, GraphGradError> {
        if inputs.len() != op.arity() {
            return Err(GraphGradError::ArityMismatch {
                operation: op.name().to_string(),
                expected: op.arity(),
                actual: inputs.len(),
            });
        }
        for &input in inputs {
            self.node(input)?;
        }
        Ok(self.push(NodeKind::Operation(op), inputs.to_vec()))
    }

    /// Replaces the value of a constant node.
    pub fn feed(&mut self, id: NodeId, value: impl Into<Value>) -> Result<(), GraphGradError> {
        let node = self
            .nodes
            .get_mut(id.0)
            .ok_or(GraphGradError::UnknownNode(id))?;
        match &mut node.kind {
            NodeKind::Constant(slot) => {
                *slot = value.into();
                Ok(())
            }
            other => Err(GraphGradError::UnsupportedOperation(format!(
                "cannot feed {} node {}",
                other.label(),
                id
            ))),
        }
    }

    pub fn set_output(&mut self, id: NodeId) -> Result<(), GraphGradError> {
        self.node(id)?;
        self.output = Some(id);
        Ok(())
    }

    pub fn output(&self) -> Option<NodeId> {
        self.output
    }

    pub fn kind(&self, id: NodeId) -> Result<&NodeKind, GraphGradError> {
        Ok(&self.node(id)?.kind)
    }

    pub fn inputs(&self, id: NodeId) -> Result<&[NodeId], GraphGradError> {
        Ok(&self.node(id)?.inputs)
    }

    /// Value cached by the last forward pass.
    pub fn value(&self, id: NodeId) -> Result<&Value, GraphGradError> {
        self.node(id)?
            .value
            .as_ref()
            .ok_or(GraphGradError::MissingValue(id))
    }

    /// Error accumulated at `id` by the last backward pass, if any reached it.
    pub fn gradient(&self, id: NodeId) -> Result<Option<&Value>, GraphGradError> {
        Ok(self.node(id)?.error.as_ref())
    }

    /// Every parameter node with its parameter.
    pub fn parameters(&self) -> Vec<(NodeId, Parameter)> {
        self.nodes
            .iter()
            .enumerate()
            .filter_map(|(index, node)| match &node.kind {
                NodeKind::Parameter(parameter) => Some((NodeId(index), parameter.clone())),
                _ => None,
            })
            .collect()
    }

    /// Parameter nodes the designated output depends on.
    ///
    /// # Errors
    /// `NoOutput` without a designated output.
    pub fn reachable_parameters(&self) -> Result<Vec<(NodeId, Parameter)>, GraphGradError> {
        let reachable = self.reachable_from(self.designated_output()?);
        Ok(self
            .parameters()
            .into_iter()
            .filter(|(id, _)| reachable[id.0])
            .collect())
    }

    /// Parameters paired with the gradient the last backward pass left them.
    /// Parameters that received no gradient are omitted.
    pub fn parameter_gradients(&self) -> Vec<(Parameter, Value)> {
        self.nodes
            .iter()
            .filter_map(|node| match (&node.kind, &node.error) {
                (NodeKind::Parameter(parameter), Some(error)) => {
                    Some((parameter.clone(), error.clone()))
                }
                _ => None,
            })
            .collect()
    }

    fn reachable_from(&self, output: NodeId) -> Vec<bool> {
        let mut reachable = vec![false; self.nodes.len()];
        let mut stack = vec![output];
        while let Some(id) = stack.pop() {
            if reachable[id.0] {
                continue;
            }
            reachable[id.0] = true;
            stack.extend(self.nodes[id.0].inputs.iter().copied());
        }
        reachable
    }

    fn input_values(&self, id: NodeId) -> Result<Vec<Value>, GraphGradError> {
        self.nodes[id.0]
            .inputs
            .iter()
            .map(|&input| self.value(input).cloned())
            .collect()
    }

    fn designated_output(&self) -> Result<NodeId, GraphGradError> {
        let output = self.output.ok_or(GraphGradError::NoOutput)?;
        self.node(output)?;
        Ok(output)
    }

    /// Evaluates every node the output depends on, in handle order, and
    /// returns the output value.
    ///
    /// # Errors
    /// `NoOutput` without a designated output; `NodeFailed` naming the first
    /// node whose operation fails.
    pub fn forward(&mut self) -> Result<Value, GraphGradError> {
        let output = self.designated_output()?;
        let reachable = self.reachable_from(output);
        let mut evaluated = 0;

        for index in 0..=output.0 {
            if !reachable[index] {
                continue;
            }
            let id = NodeId(index);
            let value = match &self.nodes[index].kind {
                NodeKind::Constant(value) => value.clone(),
                NodeKind::Parameter(parameter) => parameter.value().clone(),
                NodeKind::Operation(op) => {
                    let inputs = self.input_values(id)?;
                    op.forward(&inputs)
                        .map_err(|err| GraphGradError::NodeFailed {
                            node: id,
                            operation: op.name().to_string(),
                            source: Box::new(err),
                        })?
                }
            };
            self.nodes[index].value = Some(value);
            evaluated += 1;
        }

        debug!("Forward pass evaluated {} of {} nodes", evaluated, self.nodes.len());
        self.value(output).cloned()
    }

    /// Propagates `error` from the output back to every node it depends on.
    ///
    /// A node fires its `partial` rules only once all of its consumers have
    /// contributed to its accumulator, so fan-out points receive the sum of
    /// every downstream contribution. Accumulators from a previous pass are
    /// discarded first.
    ///
    /// # Errors
    /// `MissingValue` if forward has not run, `DimensionMismatch` if `error`
    /// does not match the output value, `NodeFailed` if a backward rule fails.
    pub fn backward(&mut self, error: &Value) -> Result<(), GraphGradError> {
        let output = self.designated_output()?;
        self.value(output)?.assert_matching(error, "backward")?;
        let reachable = self.reachable_from(output);

        for node in &mut self.nodes {
            node.error = None;
        }

        // Number of consumer edges each node still waits on.
        let mut pending = vec![0usize; self.nodes.len()];
        for (index, node) in self.nodes.iter().enumerate() {
            if reachable[index] {
                for input in &node.inputs {
                    pending[input.0] += 1;
                }
            }
        }

        self.nodes[output.0].error = Some(error.copy()?);
        let mut ready = BinaryHeap::new();
        ready.push(output);
        let mut fired = 0;

        while let Some(id) = ready.pop() {
            let contributions = self.node_partials(id)?;
            if !contributions.is_empty() {
                fired += 1;
            }
            for (input, grad) in contributions {
                self.accumulate(id, input, grad)?;
            }
            for input in self.nodes[id.0].inputs.clone() {
                pending[input.0] -= 1;
                if pending[input.0] == 0 {
                    ready.push(input);
                }
            }
        }

        for (index, node) in self.nodes.iter().enumerate() {
            if reachable[index] && node.error.is_none() {
                if let NodeKind::Parameter(parameter) = &node.kind {
                    warn!(
                        "Parameter {} at {} received no gradient",
                        parameter.id(),
                        NodeId(index)
                    );
                }
            }
        }
        debug!("Backward pass fired {} operation nodes", fired);
        Ok(())
    }

    /// Gradients an operation node sends to its non-constant inputs; empty
    /// for leaves and for nodes no error reached.
    fn node_partials(&self, id: NodeId) -> Result<Vec<(NodeId, Value)>, GraphGradError> {
        let node = &self.nodes[id.0];
        let (op, error) = match (&node.kind, &node.error) {
            (NodeKind::Operation(op), Some(error)) => (op, error),
            _ => return Ok(Vec::new()),
        };
        let output = node.value.as_ref().ok_or(GraphGradError::MissingValue(id))?;
        let inputs = self.input_values(id)?;

        let mut contributions = Vec::with_capacity(inputs.len());
        for (input_id, &input) in node.inputs.iter().enumerate() {
            if matches!(self.nodes[input.0].kind, NodeKind::Constant(_)) {
                continue;
            }
            let partial = op
                .partial(input_id, &inputs, output, error)
                .map_err(|err| GraphGradError::NodeFailed {
                    node: id,
                    operation: op.name().to_string(),
                    source: Box::new(err),
                })?;
            if let Some(grad) = partial {
                contributions.push((input, grad));
            }
        }
        Ok(contributions)
    }

    /// Sums `grad` into the accumulator of `input`.
    fn accumulate(&mut self, from: NodeId, input: NodeId, grad: Value) -> Result<(), GraphGradError> {
        let wrap = |err: GraphGradError, graph: &Graph| GraphGradError::NodeFailed {
            node: from,
            operation: graph.nodes[from.0].kind.label().to_string(),
            source: Box::new(err),
        };
        if let Err(err) = self.value(input)?.assert_matching(&grad, "gradient") {
            return Err(wrap(err, self));
        }
        let summed = match &self.nodes[input.0].error {
            None => grad,
            Some(previous) => previous.add(&grad).map_err(|err| wrap(err, self))?,
        };
        self.nodes[input.0].error = Some(summed);
        Ok(())
    }
}

#[cfg(test)]
#[path = "graph_test.rs"]
mod tests;
