//! DIIS (Direct Inversion in the Iterative Subspace) convergence accelerator
//!
//! DIIS accelerates SCF convergence by extrapolating the Fock matrix using a linear
//! combination of previous Fock matrices, weighted to minimize the error vector.
//!
//! # Algorithm
//!
//! The error vector of a trial Fock matrix is the orthogonalized commutator
//! e = Aᵗ (FDS - SDF) A with A = S^{-1/2}. It vanishes at self-consistency.
//!
//! The extrapolated Fock matrix is F* = Σ c_i F_i, where c solves the Pulay system
//!
//! ```text
//! [ B   -1 ] [c]   [ 0]
//! [ -1ᵗ  0 ] [λ] = [-1]
//! ```
//!
//! with B_ij = e_i · e_j, which enforces Σ c_i = 1. For unrestricted references
//! B sums over both spin channels and one coefficient vector serves α and β.

use crate::error::ScfError;
use nalgebra::{DMatrix, DVector};
use std::collections::VecDeque;
use tracing::debug;

/// Coefficients larger than this mean the Pulay system is numerically singular.
const MAX_COEFFICIENT_MAGNITUDE: f64 = 1e8;

/// History policy. A bounded window drops the oldest entry when full.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiisCapacity {
    Bounded(usize),
    Unbounded,
}

impl Default for DiisCapacity {
    fn default() -> Self {
        DiisCapacity::Bounded(8)
    }
}

#[derive(Debug, Clone)]
pub struct Extrapolation {
    pub fock: DMatrix<f64>,
    pub coefficients: DVector<f64>,
}

/// Per-spin-channel history of (trial Fock, error) pairs.
#[derive(Debug, Clone)]
pub struct Diis {
    history: VecDeque<(DMatrix<f64>, DMatrix<f64>)>,
    capacity: DiisCapacity,
}

impl Diis {
    pub fn new(capacity: DiisCapacity) -> Self {
        Diis {
            history: VecDeque::new(),
            capacity,
        }
    }

    /// Orthogonalized commutator Aᵗ (FDS - SDF) A.
    pub fn error_vector(
        fock: &DMatrix<f64>,
        density: &DMatrix<f64>,
        overlap: &DMatrix<f64>,
        orthogonalizer: &DMatrix<f64>,
    ) -> DMatrix<f64> {
        let fds = fock * density * overlap;
        let sdf = overlap * density * fock;
        orthogonalizer.transpose() * (fds - sdf) * orthogonalizer
    }

    pub fn push(&mut self, fock: DMatrix<f64>, error: DMatrix<f64>) {
        if let DiisCapacity::Bounded(max) = self.capacity {
            while !self.history.is_empty() && self.history.len() >= max.max(1) {
                self.history.pop_front();
            }
        }
        self.history.push_back((fock, error));
    }

    /// Solves the Pulay system over the current history.
    ///
    /// A singular or ill-conditioned system is reported as
    /// [`ScfError::DegenerateExtrapolation`]; callers fall back to the raw Fock matrix.
    pub fn extrapolate(&self) -> Result<Extrapolation, ScfError> {
        Self::extrapolate_coupled(&[self])?
            .pop()
            .ok_or_else(|| ScfError::DegenerateExtrapolation("empty DIIS history".to_string()))
    }

    /// Solves one Pulay system shared by several spin channels.
    ///
    /// B_ij sums e_i · e_j over the channels and the same coefficients are
    /// applied to every channel's Fock history, so α and β stay consistent.
    /// All histories must hold the same number of entries.
    pub fn extrapolate_coupled(channels: &[&Diis]) -> Result<Vec<Extrapolation>, ScfError> {
        let m = channels.first().map_or(0, |d| d.len());
        if m == 0 {
            return Err(ScfError::DegenerateExtrapolation("empty DIIS history".to_string()));
        }
        if channels.iter().any(|d| d.len() != m) {
            return Err(ScfError::DegenerateExtrapolation(
                "DIIS histories differ in length".to_string(),
            ));
        }

        let mut b = DMatrix::zeros(m + 1, m + 1);
        for diis in channels {
            for (i, (_, e_i)) in diis.history.iter().enumerate() {
                for (j, (_, e_j)) in diis.history.iter().enumerate().take(i + 1) {
                    let b_ij = e_i.dot(e_j);
                    b[(i, j)] += b_ij;
                    if i != j {
                        b[(j, i)] += b_ij;
                    }
                }
            }
        }

        // c is unchanged when B is scaled; λ absorbs the factor.
        let scale = (0..m).map(|i| b[(i, i)]).fold(0.0_f64, f64::max);
        if scale > 0.0 {
            for i in 0..m {
                for j in 0..m {
                    b[(i, j)] /= scale;
                }
            }
        }
        for i in 0..m {
            b[(i, m)] = -1.0;
            b[(m, i)] = -1.0;
        }

        let mut rhs = DVector::zeros(m + 1);
        rhs[m] = -1.0;

        let solution = b
            .lu()
            .solve(&rhs)
            .ok_or_else(|| ScfError::DegenerateExtrapolation("singular DIIS B matrix".to_string()))?;
        let coefficients = solution.rows(0, m).into_owned();

        if coefficients
            .iter()
            .any(|c| !c.is_finite() || c.abs() > MAX_COEFFICIENT_MAGNITUDE)
        {
            return Err(ScfError::DegenerateExtrapolation(
                "ill-conditioned DIIS B matrix".to_string(),
            ));
        }

        debug!("DIIS extrapolation with {} vectors: {:?}", m, coefficients.as_slice());
        Ok(channels
            .iter()
            .map(|diis| {
                let (first, _) = &diis.history[0];
                let mut fock = DMatrix::zeros(first.nrows(), first.ncols());
                for (c, (f, _)) in coefficients.iter().zip(&diis.history) {
                    fock += f * *c;
                }
                Extrapolation {
                    fock,
                    coefficients: coefficients.clone(),
                }
            })
            .collect())
    }

    pub fn len(&self) -> usize {
        self.history.len()
    }

    pub fn is_empty(&self) -> bool {
        self.history.is_empty()
    }

    pub fn capacity(&self) -> DiisCapacity {
        self.capacity
    }

    pub fn reset(&mut self) {
        self.history.clear();
    }

    /// Frobenius norm of the newest error vector.
    pub fn last_error_norm(&self) -> Option<f64> {
        self.history.back().map(|(_, e)| e.norm())
    }
}
