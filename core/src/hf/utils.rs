use nalgebra::{DMatrix, DVector, SymmetricEigen};

/// Create a symmetric, square matrix. Function is only run for upper triangle of the matrix
#[inline(always)]
pub(crate) fn symmetric_matrix(
    n: usize,
    mut func: impl FnMut(usize, usize) -> f64,
) -> DMatrix<f64> {
    let m = DMatrix::from_fn(n, n, |i, j| if i <= j { func(i, j) } else { 0.0 });
    DMatrix::from_fn(n, n, |i, j| if i <= j { m[(i, j)] } else { m[(j, i)] })
}

pub(crate) fn eigs(matrix: DMatrix<f64>) -> (DMatrix<f64>, DVector<f64>) {
    let eigs = SymmetricEigen::new(matrix);
    (eigs.eigenvectors, eigs.eigenvalues)
}

pub(crate) fn sorted_eigs(matrix: DMatrix<f64>) -> (DMatrix<f64>, DVector<f64>) {
    let (eigenvectors, eigenvalues) = eigs(matrix);

    let mut val_vec_pairs = eigenvalues
        .iter()
        .copied()
        .zip(eigenvectors.column_iter())
        .collect::<Vec<_>>();

    val_vec_pairs.sort_unstable_by(|(a, _), (b, _)| a.total_cmp(b));

    let (values, vectors): (Vec<_>, Vec<_>) = val_vec_pairs.into_iter().unzip();

    (
        DMatrix::from_columns(&vectors),
        DVector::from_column_slice(&values),
    )
}

/// Symmetric orthogonalisation matrix X = S^(-1/2), so that X^T S X = 1
pub(crate) fn symmetric_orthogonalization(overlap: &DMatrix<f64>) -> DMatrix<f64> {
    let (u, values) = eigs(overlap.clone());
    let diagonal_inv_sqrt = DMatrix::from_diagonal(&values.map(|value| value.sqrt().recip()));
    &u * (diagonal_inv_sqrt * u.transpose())
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    #[test]
    fn symmetric_matrix_mirrors_upper_triangle() {
        let mut calls = 0;
        let m = symmetric_matrix(3, |i, j| {
            calls += 1;
            (10 * i + j) as f64
        });

        assert_eq!(calls, 6);
        assert_eq!(m, m.transpose());
        assert_eq!(m[(2, 0)], 2.0);
    }

    #[test]
    fn eigenvalues_are_sorted() {
        let matrix = DMatrix::from_row_slice(3, 3, &[2.0, 1.0, 0.0, 1.0, -3.0, 0.5, 0.0, 0.5, 1.0]);
        let (vectors, values) = sorted_eigs(matrix.clone());

        assert!(values.as_slice().windows(2).all(|pair| pair[0] <= pair[1]));
        for (value, vector) in values.iter().zip(vectors.column_iter()) {
            assert_relative_eq!(&matrix * vector, vector * *value, epsilon = 1e-10);
        }
    }

    #[test]
    fn orthogonalization() {
        let overlap = DMatrix::from_row_slice(2, 2, &[1.0, 0.6, 0.6, 1.0]);
        let x = symmetric_orthogonalization(&overlap);

        assert_relative_eq!(x.transpose() * &overlap * &x, DMatrix::identity(2, 2), epsilon = 1e-12);
        assert_relative_eq!(x.clone(), x.transpose(), epsilon = 1e-12);
    }
}
