//! Hartree-Fock SCF with DIIS acceleration
//!
//! This module provides the building blocks of the self-consistent field
//! iteration (orthogonalizer, density builder, Fock builder, generalized
//! eigensolver, DIIS, convergence test) and the [`ScfDriver`] state machine
//! that strings them together for restricted and unrestricted references.

mod convergence;
mod density;
mod diis;
mod driver;
mod eigen;
mod fock;
mod input;
mod orthogonalizer;

#[cfg(test)]
mod tests;

pub use convergence::{is_converged, ConvergenceCheck, ConvergenceMonitor, Thresholds};
pub use density::{density_matrix, rms_change};
pub use diis::{Diis, DiisCapacity, Extrapolation};
pub use driver::{
    IterationRecord, MolecularOrbitals, Orbitals, Reference, ScfDriver, ScfResult, ScfSettings, ScfState,
    ScfStatus,
};
pub use eigen::{align_eigenvectors, GeneralizedEigensolver};
pub use fock::{restricted_fock, restricted_two_electron, unrestricted_fock, unrestricted_two_electron};
pub use input::{Occupation, ScfInput};
pub use orthogonalizer::{orthogonalizer, OVERLAP_EIGENVALUE_THRESHOLD};
