//! Error type shared by the SCF and MP2 layers.

use basis::basis::BasisError;
use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum ScfError {
    /// Dimension mismatch or impossible occupation; never retried.
    MalformedInput(String),
    /// Singular DIIS system or overlap matrix. The driver recovers locally.
    DegenerateExtrapolation(String),
    /// A consumer was handed an SCF result that did not converge.
    NotConverged { iterations: usize },
    Basis(String),
}

impl fmt::Display for ScfError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScfError::MalformedInput(msg) => write!(f, "malformed SCF input: {}", msg),
            ScfError::DegenerateExtrapolation(msg) => write!(f, "degenerate extrapolation: {}", msg),
            ScfError::NotConverged { iterations } => {
                write!(f, "SCF did not converge within {} iterations", iterations)
            }
            ScfError::Basis(msg) => write!(f, "basis error: {}", msg),
        }
    }
}

impl std::error::Error for ScfError {}

impl From<BasisError> for ScfError {
    fn from(err: BasisError) -> Self {
        ScfError::Basis(err.to_string())
    }
}
