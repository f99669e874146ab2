use super::*;
use crate::autograd::grad_check::check_operation;
use crate::matrix::Matrix;
use crate::tensor::TensorOps;
use crate::utils::testing::check_matrix_near;

fn w_2x3() -> Value {
    Value::Matrix(Matrix::from_rows(&[vec![1.0, -2.0, 3.0], vec![0.5, 4.0, -1.0]]).unwrap())
}

fn h_3x2() -> Value {
    Value::Matrix(
        Matrix::from_rows(&[vec![2.0, 1.0], vec![-1.0, 0.5], vec![3.0, -2.0]]).unwrap(),
    )
}

fn error_2x2() -> Value {
    Value::Matrix(Matrix::from_rows(&[vec![1.0, -0.5], vec![2.0, 0.25]]).unwrap())
}

#[test]
fn test_matmul_forward() {
    let output = MatMul.forward(&[w_2x3(), h_3x2()]).unwrap();
    // Row 0: [2 + 2 + 9, 1 - 1 - 6]; row 1: [1 - 4 - 3, 0.5 + 2 + 2]
    check_matrix_near(
        output.as_matrix().unwrap(),
        (2, 2),
        &[13.0, -6.0, -6.0, 4.5],
        1e-12,
    );
}

#[test]
fn test_matmul_partials_match_closed_form() {
    let inputs = [w_2x3(), h_3x2()];
    let output = MatMul.forward(&inputs).unwrap();
    let error = error_2x2();
    let e = error.as_matrix().unwrap();
    let w = inputs[0].as_matrix().unwrap();
    let h = inputs[1].as_matrix().unwrap();

    let grad_w = MatMul.partial(0, &inputs, &output, &error).unwrap().unwrap();
    let expected_w = e.matmul(&h.transposed().copy().unwrap(), false, false).unwrap();
    assert_eq!(grad_w.as_matrix().unwrap(), &expected_w);
    assert_eq!((expected_w.rows(), expected_w.cols()), (2, 3));

    let grad_h = MatMul.partial(1, &inputs, &output, &error).unwrap().unwrap();
    let expected_h = w.transposed().copy().unwrap().matmul(e, false, false).unwrap();
    assert_eq!(grad_h.as_matrix().unwrap(), &expected_h);
    assert_eq!((expected_h.rows(), expected_h.cols()), (3, 2));
}

#[test]
fn test_matmul_partials_match_finite_differences() {
    check_operation(&MatMul, &[w_2x3(), h_3x2()], &error_2x2(), 1e-6, 1e-5)
        .expect("MatMul gradient check failed");
}

#[test]
fn test_matmul_sparse_operands() {
    let adjacency = Matrix::sparse(3, 3).unwrap();
    adjacency.put_at(0, 1, 1.0).unwrap().put_at(2, 0, 0.5).unwrap();
    let features = Value::Matrix(
        Matrix::from_rows(&[vec![1.0, 2.0], vec![3.0, 4.0], vec![5.0, 6.0]]).unwrap(),
    );
    let error = Value::Matrix(Matrix::from_rows(&[vec![1.0, 0.0], vec![0.0, 1.0], vec![1.0, 1.0]]).unwrap());
    check_operation(
        &MatMul,
        &[Value::Matrix(adjacency.to_dense().unwrap()), features.clone()],
        &error,
        1e-6,
        1e-5,
    )
    .expect("MatMul gradient check failed on adjacency product");

    let output = MatMul.forward(&[Value::Matrix(adjacency), features]).unwrap();
    check_matrix_near(
        output.as_matrix().unwrap(),
        (3, 2),
        &[3.0, 4.0, 0.0, 0.0, 0.5, 1.0],
        1e-12,
    );
}

#[test]
fn test_matmul_rejects_vectors_and_bad_arity() {
    let vector = Value::Vector(crate::tensor::Tensor::dense(3));
    assert!(matches!(
        MatMul.forward(&[w_2x3(), vector]),
        Err(GraphGradError::ValueKind { expected: "matrix", .. })
    ));
    assert!(matches!(
        MatMul.forward(&[w_2x3()]),
        Err(GraphGradError::ArityMismatch { expected: 2, actual: 1, .. })
    ));
    assert!(matches!(
        MatMul.forward(&[w_2x3(), w_2x3()]),
        Err(GraphGradError::DimensionMismatch { .. })
    ));
}
