use super::*;
use crate::error::GraphGradError;
use approx::assert_relative_eq;

fn w_2x3() -> Matrix {
    Matrix::from_rows(&[vec![1.0, 2.0, 3.0], vec![4.0, 5.0, 6.0]]).unwrap()
}

fn h_3x2() -> Matrix {
    Matrix::from_rows(&[vec![7.0, 8.0], vec![9.0, 10.0], vec![11.0, 12.0]]).unwrap()
}

#[test]
fn test_row_major_addressing() -> Result<(), GraphGradError> {
    let m = w_2x3();
    assert_eq!((m.rows(), m.cols(), m.size()), (2, 3, 6));
    assert_eq!(m.get_at(1, 0)?, 4.0);
    assert_eq!(m.get(4)?, 5.0);

    m.put(5, -1.0)?;
    assert_eq!(m.get_at(1, 2)?, -1.0);
    assert!(matches!(
        m.get_at(2, 0),
        Err(GraphGradError::IndexOutOfBounds { .. })
    ));
    assert!(matches!(
        m.put_at(0, 3, 1.0),
        Err(GraphGradError::IndexOutOfBounds { .. })
    ));
    Ok(())
}

#[test]
fn test_from_rows_rejects_ragged_rows() {
    let result = Matrix::from_rows(&[vec![1.0, 2.0], vec![3.0]]);
    assert!(matches!(
        result,
        Err(GraphGradError::DimensionMismatch { ref operation, .. }) if operation == "from_rows"
    ));
}

#[test]
fn test_matmul_plain() -> Result<(), GraphGradError> {
    let product = w_2x3().matmul(&h_3x2(), false, false)?;
    let expected = Matrix::from_rows(&[vec![58.0, 64.0], vec![139.0, 154.0]])?;
    assert_eq!(product, expected);
    Ok(())
}

#[test]
fn test_matmul_honors_transpose_flags() -> Result<(), GraphGradError> {
    let w = w_2x3();

    let outer = w.matmul(&w, false, true)?;
    assert_eq!((outer.rows(), outer.cols()), (2, 2));
    assert_eq!(
        outer,
        Matrix::from_rows(&[vec![14.0, 32.0], vec![32.0, 77.0]])?
    );

    let inner = w.matmul(&w, true, false)?;
    assert_eq!(
        inner,
        Matrix::from_rows(&[
            vec![17.0, 22.0, 27.0],
            vec![22.0, 29.0, 36.0],
            vec![27.0, 36.0, 45.0],
        ])?
    );

    // Both flags: (Hᵗ)(Wᵗ) = (W H)ᵗ
    let both = h_3x2().matmul(&w, true, true)?;
    assert_eq!(both, w.matmul(&h_3x2(), false, false)?.transposed());
    Ok(())
}

#[test]
fn test_matmul_inner_dimension_mismatch() {
    let w = w_2x3();
    match w.matmul(&w, false, false) {
        Err(GraphGradError::DimensionMismatch {
            left,
            right,
            operation,
        }) => {
            assert_eq!(operation, "matmul");
            assert_eq!(left, "dense matrix (2,3)");
            assert_eq!(right, "dense matrix (2,3)");
        }
        other => panic!("Expected DimensionMismatch, got {:?}", other),
    }
}

#[test]
fn test_matmul_storage_of_result() -> Result<(), GraphGradError> {
    let a = Matrix::sparse(2, 2).unwrap();
    a.put_at(0, 1, 2.0)?;
    let b = Matrix::sparse(2, 2).unwrap();
    b.put_at(1, 0, 3.0)?;

    let sparse_product = a.matmul(&b, false, false)?;
    assert_eq!(sparse_product.storage_kind(), StorageKind::Sparse);
    assert_eq!(sparse_product.non_zero_entries()?, vec![(0, 0)]);
    assert_eq!(sparse_product.get_at(0, 0)?, 6.0);

    let mixed = a.matmul(&b.to_dense()?, false, false)?;
    assert_eq!(mixed.storage_kind(), StorageKind::Dense);
    assert_eq!(mixed, sparse_product);
    Ok(())
}

#[test]
fn test_column_repetition_is_a_read_only_view() -> Result<(), GraphGradError> {
    let vector = Tensor::from_vec(vec![1.0, 0.0, 3.0])?;
    let view = Matrix::column_repetition(2, vector.clone()).unwrap();
    assert_eq!((view.rows(), view.cols()), (2, 3));
    assert!(view.is_view());
    assert_eq!(view.get_at(1, 2)?, 3.0);

    assert!(matches!(
        view.put_at(0, 0, 5.0),
        Err(GraphGradError::UnsupportedOperation(_))
    ));

    // Mutating the backing vector shows through every row.
    vector.put(1, 7.0)?;
    assert_eq!(view.get_at(0, 1)?, 7.0);
    assert_eq!(view.get_at(1, 1)?, 7.0);
    Ok(())
}

#[test]
fn test_column_repetition_walks_only_present_entries() -> Result<(), GraphGradError> {
    let vector = Tensor::sparse(3);
    vector.put(0, 1.0)?.put(2, 2.0)?;
    let view = Matrix::column_repetition(2, vector).unwrap();
    assert_eq!(
        view.non_zero_entries()?,
        vec![(0, 0), (0, 2), (1, 0), (1, 2)]
    );
    assert_eq!(view.num_non_zero_elements()?, 4);
    Ok(())
}

#[test]
fn test_wrap_rows_writes_through() -> Result<(), GraphGradError> {
    let first = Tensor::sparse(3);
    let second = Tensor::dense(3);
    let view = Matrix::wrap_rows(vec![first.clone(), second.clone()])?;
    assert_eq!((view.rows(), view.cols()), (2, 3));

    view.put_at(0, 2, 4.0)?;
    view.put_at(1, 0, 5.0)?;
    assert_eq!(first.get(2)?, 4.0);
    assert_eq!(second.get(0)?, 5.0);

    second.put(1, 6.0)?;
    assert_eq!(view.get(4)?, 6.0);

    // Sparse first row contributes one entry, dense second row all three.
    assert_eq!(
        view.non_zero_entries()?,
        vec![(0, 2), (1, 0), (1, 1), (1, 2)]
    );
    Ok(())
}

#[test]
fn test_wrap_rows_rejects_ragged_rows() {
    let result = Matrix::wrap_rows(vec![Tensor::dense(3), Tensor::dense(2)]);
    assert!(matches!(
        result,
        Err(GraphGradError::DimensionMismatch { ref operation, .. }) if operation == "wrap_rows"
    ));
}

#[test]
fn test_transposed_view() -> Result<(), GraphGradError> {
    let m = w_2x3();
    let t = m.transposed();
    assert_eq!((t.rows(), t.cols()), (3, 2));
    assert_eq!(t.get_at(2, 1)?, 6.0);
    assert_eq!(t.describe(), "Transposed dense matrix (3,2)");

    t.put_at(0, 1, -4.0)?;
    assert_eq!(m.get_at(1, 0)?, -4.0);

    assert_eq!(t.transposed(), m);
    Ok(())
}

#[test]
fn test_transposed_sparse_positions() -> Result<(), GraphGradError> {
    let m = Matrix::sparse(2, 3).unwrap();
    m.put_at(0, 2, 1.0)?.put_at(1, 0, 2.0)?;
    let t = m.transposed();
    let mut entries = t.non_zero_entries()?;
    entries.sort_unstable();
    assert_eq!(entries, vec![(0, 1), (2, 0)]);
    assert_eq!(t.get_at(2, 0)?, 1.0);
    Ok(())
}

#[test]
fn test_elementwise_ops_check_shape_not_size() -> Result<(), GraphGradError> {
    let w = w_2x3();
    let h = h_3x2();
    assert_eq!(w.size(), h.size());
    assert!(matches!(
        w.add(&h),
        Err(GraphGradError::DimensionMismatch { .. })
    ));

    let doubled = w.add(&w)?;
    assert_eq!(doubled, w.scale(2.0)?);
    assert_eq!(doubled.rows(), 2);
    Ok(())
}

#[test]
fn test_view_ops_produce_owned_results() -> Result<(), GraphGradError> {
    let vector = Tensor::from_vec(vec![1.0, 2.0])?;
    let view = Matrix::column_repetition(3, vector).unwrap();
    let copy = view.copy()?;
    assert!(!copy.is_view());
    copy.put_at(0, 0, 10.0)?;
    assert_eq!(view.get_at(0, 0)?, 1.0);
    assert_eq!(view.sum()?, 9.0);
    Ok(())
}

#[test]
fn test_eye_and_main_diagonal() -> Result<(), GraphGradError> {
    let eye = Matrix::eye(3)?;
    assert_eq!(eye.storage_kind(), StorageKind::Sparse);
    assert_eq!(eye.non_zero_entries()?, vec![(0, 0), (1, 1), (2, 2)]);

    let m = w_2x3();
    assert_eq!(m.matmul(&eye, false, false)?, m);

    assert!(matches!(
        m.set_main_diagonal(1.0),
        Err(GraphGradError::UnsupportedOperation(_))
    ));
    Ok(())
}

#[test]
fn test_symmetric_normalization() -> Result<(), GraphGradError> {
    let adjacency = Matrix::sparse(3, 3).unwrap();
    adjacency
        .put_at(0, 1, 1.0)?
        .put_at(1, 0, 1.0)?
        .put_at(0, 2, 1.0)?
        .put_at(2, 0, 1.0)?;
    adjacency.set_to_symmetric_normalization()?;

    let expected = 1.0 / 2.0_f64.sqrt();
    assert_relative_eq!(adjacency.get_at(0, 1)?, expected, epsilon = 1e-12);
    assert_relative_eq!(adjacency.get_at(2, 0)?, expected, epsilon = 1e-12);
    assert_eq!(adjacency.get_at(1, 2)?, 0.0);
    assert_eq!(adjacency.num_non_zero_elements()?, 4);
    Ok(())
}

#[test]
fn test_row_and_display() -> Result<(), GraphGradError> {
    let m = w_2x3();
    assert_eq!(m.row(1)?, Tensor::from_vec(vec![4.0, 5.0, 6.0])?);
    assert_eq!(m.to_string(), "1,2,3\n4,5,6\n");
    Ok(())
}

#[test]
fn test_far_out_of_range_cells_are_errors() {
    let m = Matrix::dense(2, 2).unwrap();
    match m.get_at(usize::MAX, 0) {
        Err(GraphGradError::IndexOutOfBounds { pos, size }) => {
            assert_eq!(pos, usize::MAX);
            assert_eq!(size, 4);
        }
        other => panic!("expected IndexOutOfBounds, got {:?}", other),
    }
    assert!(m.put_at(1, usize::MAX, 1.0).is_err());
    assert!(m.transposed().get_at(0, usize::MAX).is_err());
}

#[test]
fn test_oversized_shapes_are_rejected() {
    assert_eq!(
        Matrix::sparse(usize::MAX, 2).unwrap_err(),
        GraphGradError::ShapeOverflow {
            rows: usize::MAX,
            cols: 2
        }
    );
    let vector = Tensor::from_vec(vec![1.0, 2.0, 3.0]).unwrap();
    assert!(matches!(
        Matrix::column_repetition(usize::MAX / 2, vector),
        Err(GraphGradError::ShapeOverflow { .. })
    ));
    let wide = Matrix::sparse(1, usize::MAX / 2).unwrap();
    let tall = Matrix::sparse(usize::MAX / 2, 1).unwrap();
    assert!(matches!(
        tall.matmul(&wide, false, false),
        Err(GraphGradError::ShapeOverflow { .. })
    ));
}
