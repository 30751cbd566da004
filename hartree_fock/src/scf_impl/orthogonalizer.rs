use crate::error::ScfError;
use nalgebra::{DMatrix, DVector};

/// Overlap eigenvalues below this make S^{-1/2} meaningless.
pub const OVERLAP_EIGENVALUE_THRESHOLD: f64 = 1e-10;

/// Symmetric (Löwdin) orthogonalizer A = S^{-1/2}, so that Aᵗ S A = I.
pub fn orthogonalizer(overlap: &DMatrix<f64>) -> Result<DMatrix<f64>, ScfError> {
    let eig = overlap.clone().symmetric_eigen();

    let mut inv_sqrt_vals = DVector::zeros(eig.eigenvalues.len());
    for (i, &val) in eig.eigenvalues.iter().enumerate() {
        if val < OVERLAP_EIGENVALUE_THRESHOLD {
            return Err(ScfError::DegenerateExtrapolation(format!(
                "overlap eigenvalue {:.3e} is below {:.0e}",
                val, OVERLAP_EIGENVALUE_THRESHOLD
            )));
        }
        inv_sqrt_vals[i] = 1.0 / val.sqrt();
    }

    let inv_sqrt_d = DMatrix::from_diagonal(&inv_sqrt_vals);
    Ok(&eig.eigenvectors * inv_sqrt_d * eig.eigenvectors.transpose())
}
