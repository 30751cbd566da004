//! Command-line argument parsing for Hartree-Fock calculations

use super::ReferenceChoice;
use clap::Parser;

/// Hartree-Fock (RHF/UHF) with DIIS and optional MP2, configured from YAML
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to the YAML configuration file
    #[arg(short, long, default_value = "config.yaml")]
    pub config_file: String,

    /// Override output file: (default stdout)
    #[arg(short, long)]
    pub output: Option<String>,

    /// Molecular charge (default: 0 for neutral)
    #[arg(long, allow_hyphen_values = true)]
    pub charge: Option<i32>,

    /// Spin multiplicity (2S+1, default: 1 for singlet)
    #[arg(long)]
    pub multiplicity: Option<usize>,

    /// Reference wavefunction; auto picks RHF for closed shells
    #[arg(long, value_enum)]
    pub reference: Option<ReferenceChoice>,

    /// Override maximum SCF cycles
    #[arg(long)]
    pub max_cycle: Option<usize>,

    /// Override energy convergence threshold (Hartree)
    #[arg(long)]
    pub energy_threshold: Option<f64>,

    /// Override density convergence threshold
    #[arg(long)]
    pub density_threshold: Option<f64>,

    /// Override DIIS subspace size (0 disables DIIS)
    #[arg(long)]
    pub diis_subspace_size: Option<usize>,

    /// Compute the MP2 correlation energy after a converged SCF
    #[arg(long)]
    pub mp2: bool,
}
