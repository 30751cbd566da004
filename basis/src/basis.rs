#![allow(non_snake_case)]
//! Traits shared by primitive and contracted Gaussian functions, and the error
//! type of the integral provider.

use nalgebra::Vector3;
use std::fmt;
use std::sync::Arc;

/// One-centre basis function with the four integral kinds an SCF run needs.
pub trait Basis {
    fn evaluate(&self, r: &Vector3<f64>) -> f64;

    /// Overlap <a|b>.
    fn Sab(a: &Self, b: &Self) -> f64;
    /// Kinetic energy <a|-1/2 ∇²|b>.
    fn Tab(a: &Self, b: &Self) -> f64;
    /// Attraction <a|-Z/|r-R||b> to a point nucleus of charge `Z` at `R`.
    fn Vab(a: &Self, b: &Self, R: Vector3<f64>, Z: u32) -> f64;
    /// Electron repulsion (ab|cd) in chemists' notation.
    fn JKabcd(a: &Self, b: &Self, c: &Self, d: &Self) -> f64;
}

/// Collection of basis functions attached to one atom.
pub trait AOBasis {
    type BasisType: Basis;

    fn basis_size(&self) -> usize;
    fn get_basis(&self) -> Vec<Arc<Self::BasisType>>;
    fn set_center(&mut self, center: Vector3<f64>);
    fn get_center(&self) -> Option<Vector3<f64>>;
}

#[derive(Debug, Clone, PartialEq)]
pub enum BasisError {
    UnknownElement(String),
    UnsupportedBasis { basis: String, element: String },
    MissingBasis(String),
    InvalidCharge { charge: i32, nuclear_charge: u32 },
    Parse(String),
    PackedLength { expected: usize, found: usize },
}

impl fmt::Display for BasisError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BasisError::UnknownElement(symbol) => write!(f, "unknown element symbol '{}'", symbol),
            BasisError::UnsupportedBasis { basis, element } => {
                write!(f, "basis '{}' is not available for element {}", basis, element)
            }
            BasisError::MissingBasis(symbol) => write!(f, "no basis functions loaded for {}", symbol),
            BasisError::InvalidCharge { charge, nuclear_charge } => write!(
                f,
                "charge {} exceeds the total nuclear charge {}",
                charge, nuclear_charge
            ),
            BasisError::Parse(msg) => write!(f, "malformed basis set data: {}", msg),
            BasisError::PackedLength { expected, found } => write!(
                f,
                "packed two-electron tensor has {} values, expected {}",
                found, expected
            ),
        }
    }
}

impl std::error::Error for BasisError {}
