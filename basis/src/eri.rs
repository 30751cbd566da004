//! Two-electron repulsion integrals stored once per canonical quartet.

use crate::basis::BasisError;
use rayon::prelude::*;

/// Compound index of an unordered pair: max(i,j)(max(i,j)+1)/2 + min(i,j).
#[inline]
pub fn compound_index(i: usize, j: usize) -> usize {
    let (hi, lo) = if i >= j { (i, j) } else { (j, i) };
    hi * (hi + 1) / 2 + lo
}

/// Number of unique (ij|kl) values for `n` basis functions.
pub fn packed_len(n: usize) -> usize {
    let pairs = n * (n + 1) / 2;
    pairs * (pairs + 1) / 2
}

/// Packed (ij|kl) tensor with 8-fold permutational symmetry
/// (ij|kl) = (ji|kl) = (ij|lk) = (kl|ij) = ...
#[derive(Debug, Clone, PartialEq)]
pub struct EriTensor {
    n: usize,
    values: Vec<f64>,
}

impl EriTensor {
    /// Evaluates `f` once per canonical quartet i >= j, k >= l, ij >= kl.
    pub fn from_fn<F>(n: usize, f: F) -> Self
    where
        F: Fn(usize, usize, usize, usize) -> f64 + Sync,
    {
        let pairs: Vec<(usize, usize)> = (0..n).flat_map(|i| (0..=i).map(move |j| (i, j))).collect();

        let pairs = &pairs;
        let f = &f;
        let values: Vec<f64> = (0..pairs.len())
            .into_par_iter()
            .flat_map_iter(move |ij| {
                let (i, j) = pairs[ij];
                (0..=ij).map(move |kl| {
                    let (k, l) = pairs[kl];
                    f(i, j, k, l)
                })
            })
            .collect();

        debug_assert_eq!(values.len(), packed_len(n));
        Self { n, values }
    }

    /// Wraps values already laid out in compound-index order.
    pub fn from_packed(n: usize, values: Vec<f64>) -> Result<Self, BasisError> {
        let expected = packed_len(n);
        if values.len() != expected {
            return Err(BasisError::PackedLength {
                expected,
                found: values.len(),
            });
        }
        Ok(Self { n, values })
    }

    #[inline]
    pub fn get(&self, i: usize, j: usize, k: usize, l: usize) -> f64 {
        self.values[compound_index(compound_index(i, j), compound_index(k, l))]
    }

    pub fn num_basis(&self) -> usize {
        self.n
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.values
    }
}
