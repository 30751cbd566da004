use crate::error::ScfError;
use nalgebra::{DMatrix, DVector};
use std::cmp::Ordering;

/// Solves F C = S C ε through the Cholesky factor S = L Lᵗ:
/// F' = L⁻¹ F L⁻ᵗ is diagonalized and C = L⁻ᵗ C'.
pub struct GeneralizedEigensolver {
    l_inv: DMatrix<f64>,
}

impl GeneralizedEigensolver {
    pub fn new(overlap: &DMatrix<f64>) -> Result<Self, ScfError> {
        let n = overlap.nrows();
        let cholesky = overlap
            .clone()
            .cholesky()
            .ok_or_else(|| ScfError::MalformedInput("overlap matrix is not positive definite".to_string()))?;
        let l_inv = cholesky
            .l()
            .solve_lower_triangular(&DMatrix::identity(n, n))
            .ok_or_else(|| ScfError::MalformedInput("Cholesky factor of the overlap is singular".to_string()))?;
        Ok(Self { l_inv })
    }

    /// Eigenvalues in ascending order with matching S-orthonormal columns.
    pub fn solve(&self, fock: &DMatrix<f64>) -> (DVector<f64>, DMatrix<f64>) {
        let f_prime = &self.l_inv * fock * self.l_inv.transpose();
        // symmetric_eigen reads one triangle; symmetrize against round-off
        let f_prime = (&f_prime + f_prime.transpose()) * 0.5;
        let eig = f_prime.symmetric_eigen();

        let mut indices: Vec<usize> = (0..eig.eigenvalues.len()).collect();
        indices.sort_by(|&a, &b| {
            eig.eigenvalues[a]
                .partial_cmp(&eig.eigenvalues[b])
                .unwrap_or(Ordering::Equal)
        });
        let energies = DVector::from_fn(indices.len(), |i, _| eig.eigenvalues[indices[i]]);
        let sorted = eig.eigenvectors.select_columns(&indices);

        let coeffs = self.l_inv.transpose() * sorted;
        (energies, align_eigenvectors(coeffs))
    }
}

/// Flips each column so that its largest-magnitude entry is positive.
pub fn align_eigenvectors(mut eigvecs: DMatrix<f64>) -> DMatrix<f64> {
    for mut col in eigvecs.column_iter_mut() {
        if col.is_empty() {
            continue;
        }
        let idx = col.iamax();
        if col[idx] < 0.0 {
            col.neg_mut();
        }
    }
    eigvecs
}
