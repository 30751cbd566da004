//! Configuration management for Hartree-Fock calculations
//!
//! This module handles the YAML configuration structures and their defaults.
//! Command-line arguments override any value read from the file.

mod args;

pub use args::Args;

use serde::{Deserialize, Serialize};

/// Main configuration structure
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub geometry: Vec<Atom>,
    #[serde(default)]
    pub units: Option<Units>,
    #[serde(default)]
    pub basis: Option<String>,
    #[serde(default)]
    pub charge: Option<i32>,
    #[serde(default)]
    pub multiplicity: Option<usize>,
    #[serde(default)]
    pub reference: Option<ReferenceChoice>,
    #[serde(default)]
    pub scf_params: ScfParams,
    #[serde(default)]
    pub mp2: Option<Mp2Params>,
}

/// Atomic position configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Atom {
    pub element: String,
    pub coords: [f64; 3],
}

/// Length unit of the geometry block
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Units {
    #[default]
    Bohr,
    Angstrom,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ReferenceChoice {
    /// RHF when n_alpha = n_beta, UHF otherwise
    #[default]
    Auto,
    Rhf,
    Uhf,
}

/// SCF-specific parameters
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ScfParams {
    #[serde(default)]
    pub max_cycle: Option<usize>,
    #[serde(default)]
    pub energy_threshold: Option<f64>,
    #[serde(default)]
    pub density_threshold: Option<f64>,
    /// Number of Fock/error pairs kept for DIIS; 0 disables it
    #[serde(default)]
    pub diis_subspace_size: Option<usize>,
}

impl Default for ScfParams {
    fn default() -> Self {
        ScfParams {
            max_cycle: Some(100),
            energy_threshold: Some(1e-9),
            density_threshold: Some(1e-5),
            diis_subspace_size: Some(8),
        }
    }
}

impl ScfParams {
    /// Apply default values to any missing parameters
    pub fn with_defaults(mut self) -> Self {
        let defaults = Self::default();
        if self.max_cycle.is_none() {
            self.max_cycle = defaults.max_cycle;
        }
        if self.energy_threshold.is_none() {
            self.energy_threshold = defaults.energy_threshold;
        }
        if self.density_threshold.is_none() {
            self.density_threshold = defaults.density_threshold;
        }
        if self.diis_subspace_size.is_none() {
            self.diis_subspace_size = defaults.diis_subspace_size;
        }
        self
    }
}

/// MP2 calculation parameters
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Mp2Params {
    #[serde(default)]
    pub enabled: Option<bool>,
}

impl Mp2Params {
    pub fn with_defaults(mut self) -> Self {
        if self.enabled.is_none() {
            self.enabled = Some(false);
        }
        self
    }
}

impl Config {
    /// Apply default values to any missing configuration fields
    pub fn with_defaults(mut self) -> Self {
        self.scf_params = self.scf_params.with_defaults();
        if self.units.is_none() {
            self.units = Some(Units::default());
        }
        if self.basis.is_none() {
            self.basis = Some("sto-3g".to_string());
        }
        if self.reference.is_none() {
            self.reference = Some(ReferenceChoice::default());
        }
        if let Some(mp2) = self.mp2.take() {
            self.mp2 = Some(mp2.with_defaults());
        }
        self
    }

    pub fn basis_name(&self) -> &str {
        self.basis.as_deref().unwrap_or("sto-3g")
    }

    /// Get DIIS subspace size (returns 0 if DIIS is disabled)
    pub fn diis_subspace_size(&self) -> usize {
        self.scf_params.diis_subspace_size.unwrap_or(0)
    }

    pub fn is_mp2_enabled(&self) -> bool {
        self.mp2.as_ref().and_then(|m| m.enabled).unwrap_or(false)
    }
}
