use graphgrad_core::rand_distr::Normal;
use graphgrad_core::ops::{Add, MatMul, Repeat, Sigmoid, Sum};
use graphgrad_core::{Graph, Matrix, NodeId, Parameter, Tensor, TensorOps};
use rand::rngs::StdRng;
use rand::SeedableRng;

// Each integration test crate uses a different subset of these helpers.
#[allow(dead_code)]
pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Symmetric 4-node path graph with self loops, normalized.
#[allow(dead_code)]
pub fn normalized_adjacency() -> Matrix {
    let adjacency = Matrix::sparse(4, 4).unwrap();
    for (a, b) in [(0, 1), (1, 2), (2, 3)] {
        adjacency.put_at(a, b, 1.0).unwrap();
        adjacency.put_at(b, a, 1.0).unwrap();
    }
    adjacency.set_main_diagonal(1.0).unwrap();
    adjacency.set_to_symmetric_normalization().unwrap();
    adjacency
}

#[allow(dead_code)]
pub fn features() -> Matrix {
    Matrix::from_rows(&[
        vec![1.0, 0.0, 0.5],
        vec![0.0, 1.0, -0.5],
        vec![0.5, 0.5, 0.0],
        vec![-1.0, 0.0, 1.0],
    ])
    .unwrap()
}

/// Handles of a one-layer graph convolution `sum_rows(sigmoid(A X W + 1 bᵀ))`.
#[allow(dead_code)]
pub struct GcnLayer {
    pub graph: Graph,
    pub adjacency: NodeId,
    pub features: NodeId,
    pub weights: Parameter,
    pub bias: Parameter,
}

#[allow(dead_code)]
pub fn gcn_layer(adjacency: Matrix, seed: u64) -> GcnLayer {
    let mut rng = StdRng::seed_from_u64(seed);
    let normal = Normal::new(0.0, 0.5).unwrap();
    let weights = Matrix::dense(3, 2).unwrap();
    weights.set_to_random_with(&mut rng, &normal).unwrap();
    let weights = Parameter::named(weights, "weights");
    let bias = Parameter::named(Tensor::from_vec(vec![0.1, -0.1]).unwrap(), "bias");

    let mut graph = Graph::new();
    let a = graph.add_constant(adjacency);
    let x = graph.add_constant(features());
    let w = graph.add_parameter(weights.clone());
    let b = graph.add_parameter(bias.clone());
    let rows = graph.add_constant(Tensor::from_double(4.0).unwrap());

    let xw = graph.add_operation(MatMul, &[x, w]).unwrap();
    let axw = graph.add_operation(MatMul, &[a, xw]).unwrap();
    let repeated_bias = graph.add_operation(Repeat, &[b, rows]).unwrap();
    let pre_activation = graph.add_operation(Add, &[axw, repeated_bias]).unwrap();
    let activation = graph.add_operation(Sigmoid, &[pre_activation]).unwrap();
    let output = graph.add_operation(Sum, &[activation]).unwrap();
    graph.set_output(output).unwrap();

    GcnLayer {
        graph,
        adjacency: a,
        features: x,
        weights,
        bias,
    }
}
