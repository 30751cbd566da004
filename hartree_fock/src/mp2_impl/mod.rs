//! MP2 (Møller-Plesset perturbation theory, second order) on top of a
//! converged Hartree-Fock reference
//!
//! # Theory
//!
//! For a restricted reference the correlation energy is
//!
//! E_MP2 = Σ_{ijab} (ia|jb) [2 (ia|jb) - (ib|ja)] / (ε_i + ε_j - ε_a - ε_b)
//!
//! with i, j occupied and a, b virtual spatial orbitals. For an unrestricted
//! reference the same-spin pairs contribute ¼ Σ [(ia|jb) - (ib|ja)]² / D in
//! each spin channel and the opposite-spin pairs Σ (ia|jb)² / D.
//!
//! The (ia|jb) block is obtained from the packed AO tensor by four quarter
//! transformations, O(n⁵) in the number of basis functions.
//!
//! # Usage
//!
//! ```ignore
//! let scf = ScfDriver::new(input, ScfSettings::default(), Reference::Restricted)?.run();
//! let mp2 = Mp2::from_scf(&scf, &integrals.eri)?;
//! let energy = mp2.energy();
//! let total = scf.total_energy + energy.correlation;
//! ```

mod mp2;
#[cfg(test)]
mod tests;

pub use mp2::{transform_ovov, Mp2, Mp2Energy, OvovBlock};
