use crate::error::ScfError;
use basis::eri::EriTensor;
use basis::molecule::AoIntegrals;
use nalgebra::DMatrix;

/// Number of occupied orbitals per spin channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Occupation {
    pub alpha: usize,
    pub beta: usize,
}

impl Occupation {
    pub fn new(alpha: usize, beta: usize) -> Self {
        Self { alpha, beta }
    }

    /// Splits `n_electrons` by spin multiplicity M = 2S + 1 with n_α ≥ n_β.
    pub fn from_electrons(n_electrons: usize, multiplicity: usize) -> Result<Self, ScfError> {
        if multiplicity == 0 {
            return Err(ScfError::MalformedInput("multiplicity must be at least 1".to_string()));
        }
        let unpaired = multiplicity - 1;
        if unpaired > n_electrons || (n_electrons - unpaired) % 2 != 0 {
            return Err(ScfError::MalformedInput(format!(
                "multiplicity {} is impossible with {} electrons",
                multiplicity, n_electrons
            )));
        }
        let beta = (n_electrons - unpaired) / 2;
        Ok(Self {
            alpha: beta + unpaired,
            beta,
        })
    }

    pub fn is_closed_shell(&self) -> bool {
        self.alpha == self.beta
    }

    pub fn total(&self) -> usize {
        self.alpha + self.beta
    }
}

/// Integrals and occupations handed to the driver, checked for consistency.
///
/// Only [`ScfInput::new`] and [`ScfInput::from_integrals`] build one, so every
/// instance has matching dimensions.
#[derive(Debug, Clone)]
pub struct ScfInput {
    overlap: DMatrix<f64>,
    h_core: DMatrix<f64>,
    eri: EriTensor,
    occupation: Occupation,
    nuclear_repulsion: f64,
}

impl ScfInput {
    pub fn new(
        overlap: DMatrix<f64>,
        h_core: DMatrix<f64>,
        eri: EriTensor,
        occupation: Occupation,
        nuclear_repulsion: f64,
    ) -> Result<Self, ScfError> {
        let n = overlap.nrows();
        if !overlap.is_square() {
            return Err(ScfError::MalformedInput(format!(
                "overlap matrix is {}x{}, expected square",
                overlap.nrows(),
                overlap.ncols()
            )));
        }
        if h_core.shape() != (n, n) {
            return Err(ScfError::MalformedInput(format!(
                "core Hamiltonian is {}x{}, overlap is {}x{}",
                h_core.nrows(),
                h_core.ncols(),
                n,
                n
            )));
        }
        if eri.num_basis() != n {
            return Err(ScfError::MalformedInput(format!(
                "two-electron tensor spans {} basis functions, overlap spans {}",
                eri.num_basis(),
                n
            )));
        }
        if occupation.alpha > n || occupation.beta > n {
            return Err(ScfError::MalformedInput(format!(
                "occupation ({}, {}) exceeds the {} available orbitals",
                occupation.alpha, occupation.beta, n
            )));
        }
        if !nuclear_repulsion.is_finite() {
            return Err(ScfError::MalformedInput("nuclear repulsion is not finite".to_string()));
        }

        Ok(Self {
            overlap,
            h_core,
            eri,
            occupation,
            nuclear_repulsion,
        })
    }

    pub fn from_integrals(integrals: &AoIntegrals, occupation: Occupation) -> Result<Self, ScfError> {
        Self::new(
            integrals.overlap.clone(),
            integrals.h_core.clone(),
            integrals.eri.clone(),
            occupation,
            integrals.nuclear_repulsion,
        )
    }

    pub fn num_basis(&self) -> usize {
        self.overlap.nrows()
    }

    pub fn overlap(&self) -> &DMatrix<f64> {
        &self.overlap
    }

    pub fn h_core(&self) -> &DMatrix<f64> {
        &self.h_core
    }

    pub fn eri(&self) -> &EriTensor {
        &self.eri
    }

    pub fn occupation(&self) -> Occupation {
        self.occupation
    }

    pub fn nuclear_repulsion(&self) -> f64 {
        self.nuclear_repulsion
    }
}
