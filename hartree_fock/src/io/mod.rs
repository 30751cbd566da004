//! Input/Output operations for Hartree-Fock calculations
//!
//! This module handles logging setup and result tables.

mod output;

pub use output::{setup_output, write_orbital_table};
