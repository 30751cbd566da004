//! Hartree-Fock command-line interface
//!
//! Reads a YAML configuration, runs the SCF and optionally MP2.

use color_eyre::eyre::Result;
use hartree_fock::app::ScfApplication;

fn main() -> Result<()> {
    color_eyre::install()?;
    ScfApplication::from_cli()?.run()
}
