#![allow(non_snake_case)]
//! Nuclear framework and assembly of the atomic-orbital integral matrices.

use crate::basis::{AOBasis, Basis, BasisError};
use crate::eri::EriTensor;
use nalgebra::{DMatrix, Vector3};
use periodic_table_on_an_enum::Element;
use rayon::prelude::*;
use std::collections::HashMap;
use std::sync::Arc;

pub const ANGSTROM_TO_BOHR: f64 = 1.8897261254578281;

/// Point nucleus; positions are in bohr.
#[derive(Clone)]
pub struct Atom {
    pub element: Element,
    pub position: Vector3<f64>,
}

impl Atom {
    pub fn new(symbol: &str, position: Vector3<f64>) -> Result<Self, BasisError> {
        let element = Element::from_symbol(symbol).ok_or_else(|| BasisError::UnknownElement(symbol.to_string()))?;
        Ok(Self { element, position })
    }

    pub fn symbol(&self) -> String {
        self.element.get_symbol().to_string()
    }

    pub fn nuclear_charge(&self) -> u32 {
        self.element.get_atomic_number() as u32
    }
}

#[derive(Clone, Default)]
pub struct Molecule {
    pub atoms: Vec<Atom>,
}

impl Molecule {
    pub fn new(atoms: Vec<Atom>) -> Self {
        Self { atoms }
    }

    /// Σ_{A<B} Z_A Z_B / R_AB
    pub fn nuclear_repulsion(&self) -> f64 {
        let mut energy = 0.0;
        for (a, atom_a) in self.atoms.iter().enumerate() {
            for atom_b in &self.atoms[..a] {
                let r = (atom_a.position - atom_b.position).norm();
                energy += (atom_a.nuclear_charge() * atom_b.nuclear_charge()) as f64 / r;
            }
        }
        energy
    }

    pub fn nuclear_charge(&self) -> u32 {
        self.atoms.iter().map(Atom::nuclear_charge).sum()
    }

    pub fn num_electrons(&self, charge: i32) -> Result<usize, BasisError> {
        let nuclear_charge = self.nuclear_charge();
        let electrons = nuclear_charge as i64 - charge as i64;
        if electrons < 0 {
            return Err(BasisError::InvalidCharge { charge, nuclear_charge });
        }
        Ok(electrons as usize)
    }

    pub fn elements(&self) -> Vec<String> {
        let mut symbols: Vec<String> = self.atoms.iter().map(Atom::symbol).collect();
        symbols.sort();
        symbols.dedup();
        symbols
    }
}

/// One- and two-electron integrals over the molecular basis.
#[derive(Debug, Clone)]
pub struct AoIntegrals {
    pub overlap: DMatrix<f64>,
    pub kinetic: DMatrix<f64>,
    pub nuclear: DMatrix<f64>,
    pub h_core: DMatrix<f64>,
    pub eri: EriTensor,
    pub nuclear_repulsion: f64,
}

impl AoIntegrals {
    /// Places each element's basis on its atoms (in input order) and
    /// evaluates every integral the SCF needs.
    pub fn compute<B>(molecule: &Molecule, bases: &HashMap<String, B>) -> Result<Self, BasisError>
    where
        B: AOBasis + Clone,
        B::BasisType: Send + Sync,
    {
        let mut functions: Vec<Arc<B::BasisType>> = Vec::new();
        for atom in &molecule.atoms {
            let symbol = atom.symbol();
            let mut basis = bases
                .get(&symbol)
                .cloned()
                .ok_or(BasisError::MissingBasis(symbol))?;
            basis.set_center(atom.position);
            functions.extend(basis.get_basis());
        }
        let n = functions.len();

        let nuclei: Vec<(Vector3<f64>, u32)> = molecule
            .atoms
            .iter()
            .map(|atom| (atom.position, atom.nuclear_charge()))
            .collect();

        let ij_pairs: Vec<(usize, usize)> = (0..n).flat_map(|i| (0..=i).map(move |j| (i, j))).collect();
        let one_electron: Vec<(usize, usize, f64, f64, f64)> = ij_pairs
            .par_iter()
            .map(|&(i, j)| {
                let (a, b) = (functions[i].as_ref(), functions[j].as_ref());
                let s = <B::BasisType as Basis>::Sab(a, b);
                let t = <B::BasisType as Basis>::Tab(a, b);
                let v: f64 = nuclei.iter().map(|&(R, Z)| <B::BasisType as Basis>::Vab(a, b, R, Z)).sum();
                (i, j, s, t, v)
            })
            .collect();

        let mut overlap = DMatrix::zeros(n, n);
        let mut kinetic = DMatrix::zeros(n, n);
        let mut nuclear = DMatrix::zeros(n, n);
        for (i, j, s, t, v) in one_electron {
            overlap[(i, j)] = s;
            overlap[(j, i)] = s;
            kinetic[(i, j)] = t;
            kinetic[(j, i)] = t;
            nuclear[(i, j)] = v;
            nuclear[(j, i)] = v;
        }
        let h_core = &kinetic + &nuclear;

        let eri = EriTensor::from_fn(n, |i, j, k, l| {
            <B::BasisType as Basis>::JKabcd(&functions[i], &functions[j], &functions[k], &functions[l])
        });

        Ok(Self {
            overlap,
            kinetic,
            nuclear,
            h_core,
            eri,
            nuclear_repulsion: molecule.nuclear_repulsion(),
        })
    }

    pub fn num_basis(&self) -> usize {
        self.overlap.nrows()
    }
}
