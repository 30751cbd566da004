#![allow(non_snake_case)]
//! Contracted Gaussian functions and per-element basis sets read from
//! NWChem-formatted text.

use crate::basis::{AOBasis, Basis, BasisError};
use crate::gto::GTO;
use nalgebra::Vector3;
use periodic_table_on_an_enum::Element;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Linear combination of primitives sharing a centre and angular part.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContractedGTO {
    pub primitives: Vec<GTO>,
    pub coefficients: Vec<f64>,
    // 1s, 2s, 2px, 3dxy, ...
    pub shell_type: String,
    pub n: i32,
    pub l: i32,
}

impl ContractedGTO {
    /// Builds the contraction and rescales the coefficients so that <φ|φ> = 1.
    pub fn new(primitives: Vec<GTO>, coefficients: Vec<f64>, shell_type: &str, n: i32, l: i32) -> Self {
        let mut cgto = Self {
            primitives,
            coefficients,
            shell_type: shell_type.to_string(),
            n,
            l,
        };
        cgto.renormalize();
        cgto
    }

    fn renormalize(&mut self) {
        let self_overlap = ContractedGTO::Sab(self, self);
        if self_overlap > 0.0 {
            let scale = self_overlap.sqrt().recip();
            self.coefficients.iter_mut().for_each(|c| *c *= scale);
        }
    }

    pub fn center(&self) -> Option<Vector3<f64>> {
        self.primitives.first().map(|p| p.center)
    }

    pub fn recentered(&self, center: Vector3<f64>) -> Self {
        Self {
            primitives: self.primitives.iter().map(|p| p.recentered(center)).collect(),
            coefficients: self.coefficients.clone(),
            shell_type: self.shell_type.clone(),
            n: self.n,
            l: self.l,
        }
    }

    fn contract2(a: &Self, b: &Self, f: impl Fn(&GTO, &GTO) -> f64) -> f64 {
        let mut val = 0.0;
        for (ca, pa) in a.coefficients.iter().zip(&a.primitives) {
            for (cb, pb) in b.coefficients.iter().zip(&b.primitives) {
                val += ca * cb * f(pa, pb);
            }
        }
        val
    }
}

impl Basis for ContractedGTO {
    fn evaluate(&self, r: &Vector3<f64>) -> f64 {
        self.coefficients
            .iter()
            .zip(&self.primitives)
            .map(|(c, p)| c * p.evaluate(r))
            .sum()
    }

    fn Sab(a: &Self, b: &Self) -> f64 {
        ContractedGTO::contract2(a, b, GTO::Sab)
    }

    fn Tab(a: &Self, b: &Self) -> f64 {
        ContractedGTO::contract2(a, b, GTO::Tab)
    }

    fn Vab(a: &Self, b: &Self, R: Vector3<f64>, Z: u32) -> f64 {
        ContractedGTO::contract2(a, b, |pa, pb| GTO::Vab(pa, pb, R, Z))
    }

    fn JKabcd(a: &Self, b: &Self, c: &Self, d: &Self) -> f64 {
        let mut val = 0.0;
        for (ca, pa) in a.coefficients.iter().zip(&a.primitives) {
            for (cb, pb) in b.coefficients.iter().zip(&b.primitives) {
                let cab = ca * cb;
                for (cc, pc) in c.coefficients.iter().zip(&c.primitives) {
                    for (cd, pd) in d.coefficients.iter().zip(&d.primitives) {
                        val += cab * cc * cd * GTO::JKabcd(pa, pb, pc, pd);
                    }
                }
            }
        }
        val
    }
}

/// Cartesian components of each supported shell, in output order.
fn shell_components(shell: char) -> Option<Vec<(&'static str, Vector3<i32>)>> {
    let comps = match shell {
        'S' => vec![("s", Vector3::new(0, 0, 0))],
        'P' => vec![
            ("px", Vector3::new(1, 0, 0)),
            ("py", Vector3::new(0, 1, 0)),
            ("pz", Vector3::new(0, 0, 1)),
        ],
        'D' => vec![
            ("dxx", Vector3::new(2, 0, 0)),
            ("dxy", Vector3::new(1, 1, 0)),
            ("dxz", Vector3::new(1, 0, 1)),
            ("dyy", Vector3::new(0, 2, 0)),
            ("dyz", Vector3::new(0, 1, 1)),
            ("dzz", Vector3::new(0, 0, 2)),
        ],
        _ => return None,
    };
    Some(comps)
}

fn parse_float(token: &str) -> Result<f64, BasisError> {
    // Fortran exponents show up in older files
    token
        .replace(['D', 'd'], "E")
        .parse::<f64>()
        .map_err(|_| BasisError::Parse(format!("'{}' is not a number", token)))
}

/// Basis functions for one element, optionally placed on a nucleus.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AtomBasis {
    pub name: String,
    pub symbol: String,
    pub atomic_number: u32,
    pub basis_set: Vec<ContractedGTO>,
    center: Option<Vector3<f64>>,
}

struct ShellBlock<'a> {
    kind: &'a str,
    rows: Vec<&'a str>,
}

impl AtomBasis {
    fn expand_block(block: &ShellBlock<'_>, principal: i32) -> Result<Vec<ContractedGTO>, BasisError> {
        let shells: Vec<char> = block.kind.chars().collect();
        let mut exponents = Vec::with_capacity(block.rows.len());
        let mut columns: Vec<Vec<f64>> = vec![Vec::new(); shells.len()];

        for row in &block.rows {
            let tokens: Vec<&str> = row.split_whitespace().collect();
            if tokens.len() < shells.len() + 1 {
                return Err(BasisError::Parse(format!(
                    "{} shell row '{}' needs {} coefficient(s)",
                    block.kind,
                    row,
                    shells.len()
                )));
            }
            exponents.push(parse_float(tokens[0])?);
            for (k, column) in columns.iter_mut().enumerate() {
                column.push(parse_float(tokens[k + 1])?);
            }
        }

        let mut res = Vec::new();
        for (shell, coefficients) in shells.iter().zip(columns) {
            let components = shell_components(*shell).ok_or_else(|| {
                BasisError::Parse(format!("unsupported shell type '{}'", block.kind))
            })?;
            for (label, l_xyz) in components {
                let primitives = exponents
                    .iter()
                    .map(|&alpha| GTO::new(alpha, l_xyz, Vector3::zeros()))
                    .collect();
                let l = l_xyz.x + l_xyz.y + l_xyz.z;
                let shell_type = format!("{}{}", principal, label);
                res.push(ContractedGTO::new(primitives, coefficients.clone(), &shell_type, principal, l));
            }
        }
        Ok(res)
    }

    // Example of nwchem format:
    // BASIS "ao basis" PRINT
    // #BASIS SET: (6s,3p) -> [2s,1p]
    // O    S
    //     130.7093200              0.15432897
    //      23.8088610              0.53532814
    //       6.4436083              0.44463454
    // O    SP
    //       5.0331513             -0.09996723             0.15591627
    //       1.1695961              0.39951283             0.60768372
    //       0.3803890              0.70011547             0.39195739
    // END
    pub fn parse_nwchem(name: &str, input: &str) -> Result<Self, BasisError> {
        let mut symbol: Option<String> = None;
        let mut blocks: Vec<ShellBlock<'_>> = Vec::new();

        for line in input.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let upper = line.to_uppercase();
            if upper.starts_with("BASIS") || upper == "END" {
                continue;
            }

            let tokens: Vec<&str> = line.split_whitespace().collect();
            let is_header = tokens.len() == 2 && tokens[0].chars().all(|c| c.is_ascii_alphabetic());
            if is_header {
                match &symbol {
                    Some(s) if !s.eq_ignore_ascii_case(tokens[0]) => {
                        return Err(BasisError::Parse(format!(
                            "found shells for {} and {} in one atomic basis",
                            s, tokens[0]
                        )));
                    }
                    Some(_) => {}
                    None => symbol = Some(tokens[0].to_string()),
                }
                blocks.push(ShellBlock {
                    kind: tokens[1],
                    rows: Vec::new(),
                });
            } else {
                let block = blocks
                    .last_mut()
                    .ok_or_else(|| BasisError::Parse(format!("data line '{}' before any shell", line)))?;
                block.rows.push(line);
            }
        }

        let symbol = symbol.ok_or_else(|| BasisError::Parse("no shells found".to_string()))?;
        let element = Element::from_symbol(&symbol).ok_or_else(|| BasisError::UnknownElement(symbol.clone()))?;

        let mut basis_set = Vec::new();
        for (index, block) in blocks.iter().enumerate() {
            if block.rows.is_empty() {
                return Err(BasisError::Parse(format!("empty {} shell for {}", block.kind, symbol)));
            }
            basis_set.extend(AtomBasis::expand_block(block, index as i32 + 1)?);
        }

        Ok(AtomBasis {
            name: name.to_string(),
            symbol: element.get_symbol().to_string(),
            atomic_number: element.get_atomic_number() as u32,
            basis_set,
            center: None,
        })
    }

    /// Basis sets shipped with the crate.
    pub fn embedded(basis_name: &str, symbol: &str) -> Result<Self, BasisError> {
        let name = basis_name.to_lowercase();
        let data = match (name.as_str(), symbol.to_lowercase().as_str()) {
            ("sto-3g", "h") => include_str!("../basis_sets/sto-3g.h.nwchem"),
            ("sto-3g", "he") => include_str!("../basis_sets/sto-3g.he.nwchem"),
            ("sto-3g", "c") => include_str!("../basis_sets/sto-3g.c.nwchem"),
            ("sto-3g", "n") => include_str!("../basis_sets/sto-3g.n.nwchem"),
            ("sto-3g", "o") => include_str!("../basis_sets/sto-3g.o.nwchem"),
            ("sto-3g", "f") => include_str!("../basis_sets/sto-3g.f.nwchem"),
            _ => {
                if Element::from_symbol(symbol).is_none() {
                    return Err(BasisError::UnknownElement(symbol.to_string()));
                }
                return Err(BasisError::UnsupportedBasis {
                    basis: basis_name.to_string(),
                    element: symbol.to_string(),
                });
            }
        };
        AtomBasis::parse_nwchem(&name, data)
    }
}

impl AOBasis for AtomBasis {
    type BasisType = ContractedGTO;

    fn basis_size(&self) -> usize {
        self.basis_set.len()
    }

    fn get_basis(&self) -> Vec<Arc<Self::BasisType>> {
        self.basis_set.iter().map(|b| Arc::new(b.clone())).collect()
    }

    fn set_center(&mut self, center: Vector3<f64>) {
        self.basis_set = self.basis_set.iter().map(|b| b.recentered(center)).collect();
        self.center = Some(center);
    }

    fn get_center(&self) -> Option<Vector3<f64>> {
        self.center
    }
}
