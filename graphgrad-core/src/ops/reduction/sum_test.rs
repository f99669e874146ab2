use super::*;
use crate::autograd::grad_check::check_operation;
use crate::matrix::Matrix;
use crate::utils::testing::{check_matrix_near, check_tensor_near};

#[test]
fn test_sum_matrix_forward_gives_row_sums() {
    let m = Value::Matrix(Matrix::from_rows(&[vec![1.0, 2.0, 3.0], vec![-1.0, 0.0, 0.5]]).unwrap());
    let output = Sum.forward(&[m]).unwrap();
    check_tensor_near(output.as_vector().unwrap(), &[6.0, -0.5], 1e-12);
}

#[test]
fn test_sum_vector_forward_gives_scalar() {
    let v = Value::Vector(Tensor::from_vec(vec![1.0, 2.0, -4.0]).unwrap());
    let output = Sum.forward(&[v]).unwrap();
    assert_eq!(output.size(), 1);
    assert_eq!(output.as_vector().unwrap().to_double().unwrap(), -1.0);
}

#[test]
fn test_sum_matrix_backward_broadcasts_row_error() {
    let m = Value::Matrix(Matrix::from_rows(&[vec![1.0, 2.0], vec![3.0, 4.0]]).unwrap());
    let output = Sum.forward(&[m.clone()]).unwrap();
    let error = Value::Vector(Tensor::from_vec(vec![0.5, -2.0]).unwrap());
    let grad = Sum.partial(0, &[m], &output, &error).unwrap().unwrap();
    check_matrix_near(grad.as_matrix().unwrap(), (2, 2), &[0.5, 0.5, -2.0, -2.0], 1e-12);
}

#[test]
fn test_sum_sparse_backward_keeps_pattern() {
    let sparse = Matrix::sparse(2, 3).unwrap();
    sparse.put_at(0, 2, 1.0).unwrap().put_at(1, 0, 7.0).unwrap();
    let input = Value::Matrix(sparse);
    let output = Sum.forward(&[input.clone()]).unwrap();
    check_tensor_near(output.as_vector().unwrap(), &[1.0, 7.0], 1e-12);

    let error = Value::Vector(Tensor::from_vec(vec![3.0, 4.0]).unwrap());
    let grad = Sum.partial(0, &[input], &output, &error).unwrap().unwrap();
    let grad = grad.as_matrix().unwrap();
    assert_eq!(grad.non_zero_entries().unwrap(), vec![(0, 2), (1, 0)]);
    check_matrix_near(grad, (2, 3), &[0.0, 0.0, 3.0, 4.0, 0.0, 0.0], 1e-12);
}

#[test]
fn test_sum_vector_backward_fills_every_element() {
    let v = Value::Vector(Tensor::sparse(4));
    let output = Sum.forward(&[v.clone()]).unwrap();
    let error = Value::Vector(Tensor::from_double(2.5).unwrap());
    let grad = Sum.partial(0, &[v], &output, &error).unwrap().unwrap();
    check_tensor_near(grad.as_vector().unwrap(), &[2.5, 2.5, 2.5, 2.5], 1e-12);
}

#[test]
fn test_sum_partials_match_finite_differences() {
    let m = Value::Matrix(Matrix::from_rows(&[vec![1.0, 2.0, 3.0], vec![-1.0, 0.25, 0.5]]).unwrap());
    let error = Value::Vector(Tensor::from_vec(vec![1.5, -0.5]).unwrap());
    check_operation(&Sum, &[m], &error, 1e-6, 1e-6).expect("Matrix sum gradient check failed");

    let v = Value::Vector(Tensor::from_vec(vec![1.0, -2.0, 3.0]).unwrap());
    let error = Value::Vector(Tensor::from_double(0.75).unwrap());
    check_operation(&Sum, &[v], &error, 1e-6, 1e-6).expect("Vector sum gradient check failed");
}

#[test]
fn test_sum_backward_checks_error_size() {
    let m = Value::Matrix(Matrix::dense(2, 2).unwrap());
    let output = Sum.forward(&[m.clone()]).unwrap();
    let error = Value::Vector(Tensor::dense(3));
    assert!(matches!(
        Sum.partial(0, &[m], &output, &error),
        Err(GraphGradError::DimensionMismatch { .. })
    ));
    assert!(Sum.partial(1, &[Value::Matrix(Matrix::dense(1, 1).unwrap())], &output, &error).is_err());
}
