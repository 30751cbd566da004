//! Core MP2 implementation

use crate::error::ScfError;
use crate::scf_impl::{MolecularOrbitals, Orbitals, ScfResult};
use basis::eri::EriTensor;
use nalgebra::{DMatrix, DVector};
use rayon::prelude::*;
use tracing::info;

/// Energy denominators smaller than this are skipped.
const DENOMINATOR_CUTOFF: f64 = 1e-10;

/// MO integrals (ia|jb) with i, a from the left orbital set and j, b from
/// the right one. Stored as a dense i-a-j-b array.
#[derive(Debug, Clone)]
pub struct OvovBlock {
    n_occ_left: usize,
    n_vir_left: usize,
    n_occ_right: usize,
    n_vir_right: usize,
    values: Vec<f64>,
}

impl OvovBlock {
    #[inline]
    pub fn get(&self, i: usize, a: usize, j: usize, b: usize) -> f64 {
        self.values[((i * self.n_vir_left + a) * self.n_occ_right + j) * self.n_vir_right + b]
    }

    /// (n_occ_left, n_vir_left, n_occ_right, n_vir_right)
    pub fn dims(&self) -> (usize, usize, usize, usize) {
        (self.n_occ_left, self.n_vir_left, self.n_occ_right, self.n_vir_right)
    }
}

/// (ia|jb) = Σ_μνλσ C_μi C_νa C_λj C_σb (μν|λσ), one index at a time.
///
/// Each occupied i of the left set is transformed independently on the
/// rayon pool.
pub fn transform_ovov(
    eri: &EriTensor,
    c_occ_left: &DMatrix<f64>,
    c_vir_left: &DMatrix<f64>,
    c_occ_right: &DMatrix<f64>,
    c_vir_right: &DMatrix<f64>,
) -> OvovBlock {
    let n = eri.num_basis();
    let n_occ_left = c_occ_left.ncols();
    let n_vir_left = c_vir_left.ncols();
    let n_occ_right = c_occ_right.ncols();
    let n_vir_right = c_vir_right.ncols();

    let blocks: Vec<Vec<f64>> = (0..n_occ_left)
        .into_par_iter()
        .map(|i| {
            // (iν|λσ)
            let mut first = vec![0.0; n * n * n];
            for mu in 0..n {
                let c = c_occ_left[(mu, i)];
                if c == 0.0 {
                    continue;
                }
                for nu in 0..n {
                    for lam in 0..n {
                        let offset = (nu * n + lam) * n;
                        for sig in 0..n {
                            first[offset + sig] += c * eri.get(mu, nu, lam, sig);
                        }
                    }
                }
            }

            // (ia|λσ)
            let mut second = vec![0.0; n_vir_left * n * n];
            for a in 0..n_vir_left {
                for nu in 0..n {
                    let c = c_vir_left[(nu, a)];
                    let src = &first[nu * n * n..(nu + 1) * n * n];
                    let dst = &mut second[a * n * n..(a + 1) * n * n];
                    for (d, s) in dst.iter_mut().zip(src) {
                        *d += c * s;
                    }
                }
            }

            // (ia|jσ)
            let mut third = vec![0.0; n_vir_left * n_occ_right * n];
            for a in 0..n_vir_left {
                for j in 0..n_occ_right {
                    let dst = (a * n_occ_right + j) * n;
                    for lam in 0..n {
                        let c = c_occ_right[(lam, j)];
                        let src = (a * n + lam) * n;
                        for sig in 0..n {
                            third[dst + sig] += c * second[src + sig];
                        }
                    }
                }
            }

            // (ia|jb)
            let mut fourth = vec![0.0; n_vir_left * n_occ_right * n_vir_right];
            for a in 0..n_vir_left {
                for j in 0..n_occ_right {
                    let src = &third[(a * n_occ_right + j) * n..(a * n_occ_right + j + 1) * n];
                    for b in 0..n_vir_right {
                        let value: f64 = src
                            .iter()
                            .enumerate()
                            .map(|(sig, t)| c_vir_right[(sig, b)] * t)
                            .sum();
                        fourth[(a * n_occ_right + j) * n_vir_right + b] = value;
                    }
                }
            }
            fourth
        })
        .collect();

    OvovBlock {
        n_occ_left,
        n_vir_left,
        n_occ_right,
        n_vir_right,
        values: blocks.concat(),
    }
}

/// Components of the MP2 correlation energy in Hartree.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Mp2Energy {
    pub same_spin: f64,
    pub opposite_spin: f64,
    pub correlation: f64,
}

impl Mp2Energy {
    fn new(same_spin: f64, opposite_spin: f64) -> Self {
        Self {
            same_spin,
            opposite_spin,
            correlation: same_spin + opposite_spin,
        }
    }
}

#[derive(Debug, Clone)]
struct OrbitalEnergies {
    occupied: DVector<f64>,
    virtuals: DVector<f64>,
}

impl OrbitalEnergies {
    fn denominator(&self, i: usize, a: usize, other: &OrbitalEnergies, j: usize, b: usize) -> f64 {
        self.occupied[i] + other.occupied[j] - self.virtuals[a] - other.virtuals[b]
    }
}

#[derive(Debug, Clone)]
enum Blocks {
    Restricted {
        ovov: OvovBlock,
        energies: OrbitalEnergies,
    },
    Unrestricted {
        alpha_alpha: OvovBlock,
        beta_beta: OvovBlock,
        alpha_beta: OvovBlock,
        alpha: OrbitalEnergies,
        beta: OrbitalEnergies,
    },
}

/// MO integrals and orbital energies of a converged SCF reference.
#[derive(Debug, Clone)]
pub struct Mp2 {
    blocks: Blocks,
}

fn split(mo: &MolecularOrbitals) -> (DMatrix<f64>, DMatrix<f64>, OrbitalEnergies) {
    let n_vir = mo.num_orbitals() - mo.n_occ;
    let energies = OrbitalEnergies {
        occupied: mo.energies.rows(0, mo.n_occ).into_owned(),
        virtuals: mo.energies.rows(mo.n_occ, n_vir).into_owned(),
    };
    (mo.occupied().into_owned(), mo.virtual_orbitals().into_owned(), energies)
}

impl Mp2 {
    /// Transforms the integrals needed for the reference's MP2 energy.
    /// A result that did not converge is rejected.
    pub fn from_scf(scf: &ScfResult, eri: &EriTensor) -> Result<Self, ScfError> {
        if !scf.is_converged() {
            return Err(ScfError::NotConverged {
                iterations: scf.iterations,
            });
        }
        let n = scf.orbitals.alpha().coefficients.nrows();
        if eri.num_basis() != n {
            return Err(ScfError::MalformedInput(format!(
                "two-electron tensor spans {} basis functions, orbitals span {}",
                eri.num_basis(),
                n
            )));
        }

        info!("MP2 Initialization:");
        info!("  Number of basis functions: {}", n);

        let blocks = match &scf.orbitals {
            Orbitals::Restricted(mo) => {
                let (occ, vir, energies) = split(mo);
                info!("  Occupied / virtual orbitals: {} / {}", occ.ncols(), vir.ncols());
                Blocks::Restricted {
                    ovov: transform_ovov(eri, &occ, &vir, &occ, &vir),
                    energies,
                }
            }
            Orbitals::Unrestricted { alpha, beta } => {
                let (occ_a, vir_a, alpha) = split(alpha);
                let (occ_b, vir_b, beta) = split(beta);
                info!(
                    "  Occupied / virtual orbitals: alpha {} / {}, beta {} / {}",
                    occ_a.ncols(),
                    vir_a.ncols(),
                    occ_b.ncols(),
                    vir_b.ncols()
                );
                Blocks::Unrestricted {
                    alpha_alpha: transform_ovov(eri, &occ_a, &vir_a, &occ_a, &vir_a),
                    beta_beta: transform_ovov(eri, &occ_b, &vir_b, &occ_b, &vir_b),
                    alpha_beta: transform_ovov(eri, &occ_a, &vir_a, &occ_b, &vir_b),
                    alpha,
                    beta,
                }
            }
        };

        Ok(Self { blocks })
    }

    pub fn energy(&self) -> Mp2Energy {
        let energy = match &self.blocks {
            Blocks::Restricted { ovov, energies } => {
                // Σ (ia|jb)[2(ia|jb) - (ib|ja)] / D split into
                // same-spin Σ x(x - y)/D and opposite-spin Σ x²/D
                let (same_spin, opposite_spin) = pair_sum(ovov, energies, energies, |x, y| {
                    (x * (x - y), x * x)
                });
                Mp2Energy::new(same_spin, opposite_spin)
            }
            Blocks::Unrestricted {
                alpha_alpha,
                beta_beta,
                alpha_beta,
                alpha,
                beta,
            } => {
                let same = |x: f64, y: f64| (0.25 * (x - y) * (x - y), 0.0);
                let (ss_alpha, _) = pair_sum(alpha_alpha, alpha, alpha, same);
                let (ss_beta, _) = pair_sum(beta_beta, beta, beta, same);
                let opposite_spin = opposite_sum(alpha_beta, alpha, beta);
                Mp2Energy::new(ss_alpha + ss_beta, opposite_spin)
            }
        };

        info!("MP2 same-spin correlation:     {:.12} Eh", energy.same_spin);
        info!("MP2 opposite-spin correlation: {:.12} Eh", energy.opposite_spin);
        info!("MP2 correlation energy:        {:.12} Eh", energy.correlation);
        energy
    }
}

/// Σ_ijab over a same-spin block, with `term(x, y)` giving the two
/// numerators for x = (ia|jb) and y = (ib|ja).
fn pair_sum<T>(block: &OvovBlock, left: &OrbitalEnergies, right: &OrbitalEnergies, term: T) -> (f64, f64)
where
    T: Fn(f64, f64) -> (f64, f64) + Sync,
{
    let (n_occ, n_vir, n_occ_right, n_vir_right) = block.dims();
    let partial: Vec<(f64, f64)> = (0..n_occ)
        .into_par_iter()
        .map(|i| {
            let mut sum = (0.0, 0.0);
            for j in 0..n_occ_right {
                for a in 0..n_vir {
                    for b in 0..n_vir_right {
                        let denominator = left.denominator(i, a, right, j, b);
                        if denominator.abs() < DENOMINATOR_CUTOFF {
                            continue;
                        }
                        let (first, second) = term(block.get(i, a, j, b), block.get(i, b, j, a));
                        sum.0 += first / denominator;
                        sum.1 += second / denominator;
                    }
                }
            }
            sum
        })
        .collect();
    partial.iter().fold((0.0, 0.0), |acc, p| (acc.0 + p.0, acc.1 + p.1))
}

/// Σ_ijab (ia|jb)² / D with i, a of one spin and j, b of the other.
fn opposite_sum(block: &OvovBlock, left: &OrbitalEnergies, right: &OrbitalEnergies) -> f64 {
    let (n_occ, n_vir, n_occ_right, n_vir_right) = block.dims();
    let partial: Vec<f64> = (0..n_occ)
        .into_par_iter()
        .map(|i| {
            let mut sum = 0.0;
            for a in 0..n_vir {
                for j in 0..n_occ_right {
                    for b in 0..n_vir_right {
                        let denominator = left.denominator(i, a, right, j, b);
                        if denominator.abs() < DENOMINATOR_CUTOFF {
                            continue;
                        }
                        let x = block.get(i, a, j, b);
                        sum += x * x / denominator;
                    }
                }
            }
            sum
        })
        .collect();
    partial.iter().sum()
}
