//! Hartree-Fock self-consistent field (restricted and unrestricted) with
//! DIIS acceleration, and second-order Møller-Plesset correlation on top.

pub mod app;
pub mod config;
pub mod error;
pub mod io;
pub mod mp2_impl;
pub mod scf_impl;

pub use error::ScfError;
pub use mp2_impl::{Mp2, Mp2Energy};
pub use scf_impl::{Reference, ScfDriver, ScfInput, ScfResult, ScfSettings, ScfStatus};
