use crate::matrix::Matrix;
use crate::tensor::TensorOps;

/// Checks that `actual` holds `expected_data` element-wise within `tolerance`.
/// Panics with the first offending position otherwise.
pub fn check_tensor_near<T: TensorOps>(actual: &T, expected_data: &[f64], tolerance: f64) {
    let actual_data = actual
        .to_vec()
        .expect("Failed to read tensor data in check_tensor_near");

    assert_eq!(
        actual_data.len(),
        expected_data.len(),
        "Data length mismatch for {}",
        actual.describe()
    );

    for (i, (a, e)) in actual_data.iter().zip(expected_data.iter()).enumerate() {
        let diff = (a - e).abs();
        if diff > tolerance {
            panic!(
                "Data mismatch at index {}: actual={:?}, expected={:?}, diff={:?}, tolerance={:?}",
                i, a, e, diff, tolerance
            );
        }
    }
}

/// Like [`check_tensor_near`], also checking the `(rows, cols)` shape.
pub fn check_matrix_near(
    actual: &Matrix,
    expected_shape: (usize, usize),
    expected_data: &[f64],
    tolerance: f64,
) {
    assert_eq!(
        (actual.rows(), actual.cols()),
        expected_shape,
        "Shape mismatch"
    );
    check_tensor_near(actual, expected_data, tolerance);
}
