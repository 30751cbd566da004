//! Fock matrix construction from the packed two-electron tensor.
//!
//! Each (i, j) element is an independent O(n²) contraction, so the builds are
//! data-parallel over the lower triangle and mirrored afterwards.

use basis::eri::EriTensor;
use nalgebra::DMatrix;
use rayon::prelude::*;

fn lower_pairs(n: usize) -> Vec<(usize, usize)> {
    (0..n).flat_map(|i| (0..=i).map(move |j| (i, j))).collect()
}

fn mirror(n: usize, values: impl IntoIterator<Item = ((usize, usize), f64)>) -> DMatrix<f64> {
    let mut m = DMatrix::zeros(n, n);
    for ((i, j), v) in values {
        m[(i, j)] = v;
        m[(j, i)] = v;
    }
    m
}

/// Closed-shell two-electron part G_ij = Σ_kl P_kl [2 (ij|kl) - (ik|jl)],
/// where P is the density of one spin.
pub fn restricted_two_electron(density: &DMatrix<f64>, eri: &EriTensor) -> DMatrix<f64> {
    let n = density.nrows();
    let ij_pairs = lower_pairs(n);

    let g_values: Vec<f64> = ij_pairs
        .par_iter()
        .map(|&(i, j)| {
            let mut g_ij = 0.0;
            for k in 0..n {
                for l in 0..n {
                    let coulomb = eri.get(i, j, k, l);
                    let exchange = eri.get(i, k, j, l);
                    g_ij += density[(k, l)] * (2.0 * coulomb - exchange);
                }
            }
            g_ij
        })
        .collect();

    mirror(n, ij_pairs.into_iter().zip(g_values))
}

pub fn restricted_fock(h_core: &DMatrix<f64>, density: &DMatrix<f64>, eri: &EriTensor) -> DMatrix<f64> {
    h_core + restricted_two_electron(density, eri)
}

/// Spin-resolved two-electron parts
/// Gσ_ij = Σ_kl P_kl (ij|kl) - Pσ_kl (ik|jl), P = Pα + Pβ,
/// evaluated in a single sweep over the tensor.
pub fn unrestricted_two_electron(
    alpha: &DMatrix<f64>,
    beta: &DMatrix<f64>,
    eri: &EriTensor,
) -> (DMatrix<f64>, DMatrix<f64>) {
    let n = alpha.nrows();
    let total = alpha + beta;
    let ij_pairs = lower_pairs(n);

    let g_values: Vec<(f64, f64)> = ij_pairs
        .par_iter()
        .map(|&(i, j)| {
            let mut coulomb = 0.0;
            let mut exchange_alpha = 0.0;
            let mut exchange_beta = 0.0;
            for k in 0..n {
                for l in 0..n {
                    coulomb += total[(k, l)] * eri.get(i, j, k, l);
                    let ikjl = eri.get(i, k, j, l);
                    exchange_alpha += alpha[(k, l)] * ikjl;
                    exchange_beta += beta[(k, l)] * ikjl;
                }
            }
            (coulomb - exchange_alpha, coulomb - exchange_beta)
        })
        .collect();

    let g_alpha = mirror(n, ij_pairs.iter().copied().zip(g_values.iter().map(|g| g.0)));
    let g_beta = mirror(n, ij_pairs.iter().copied().zip(g_values.iter().map(|g| g.1)));
    (g_alpha, g_beta)
}

pub fn unrestricted_fock(
    h_core: &DMatrix<f64>,
    alpha: &DMatrix<f64>,
    beta: &DMatrix<f64>,
    eri: &EriTensor,
) -> [DMatrix<f64>; 2] {
    let (g_alpha, g_beta) = unrestricted_two_electron(alpha, beta, eri);
    [h_core + g_alpha, h_core + g_beta]
}
