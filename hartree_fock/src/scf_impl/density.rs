use nalgebra::DMatrix;

/// P_ij = Σ_{k < n_occ} C_ik C_jk over the lowest `n_occ` columns of `coeffs`.
/// Only the lower triangle is evaluated, so the result is exactly symmetric.
pub fn density_matrix(coeffs: &DMatrix<f64>, n_occ: usize) -> DMatrix<f64> {
    let n = coeffs.nrows();
    let occupied = coeffs.columns(0, n_occ);
    let mut density = DMatrix::zeros(n, n);
    for i in 0..n {
        for j in 0..=i {
            let p_ij = occupied.row(i).dot(&occupied.row(j));
            density[(i, j)] = p_ij;
            density[(j, i)] = p_ij;
        }
    }
    density
}

/// Frobenius norm of the change between two densities.
pub fn rms_change(new: &DMatrix<f64>, old: &DMatrix<f64>) -> f64 {
    (new - old).norm()
}
