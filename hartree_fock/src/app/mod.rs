mod basis;
mod geometry;
mod report;
mod runner;

pub use self::basis::{BasisLoader, BasisMap, BasisRegistry, EmbeddedBasisLoader};
pub use self::geometry::build_molecule;
pub use self::runner::{
    mp2_requested, resolve_electrons, resolve_reference, resolve_settings, run_mp2, run_scf, ElectronCount,
};

use self::report::{report_mp2_summary, report_scf_summary};
use crate::config::{Args, Config};
use crate::io::setup_output;
use crate::mp2_impl::Mp2Energy;
use crate::scf_impl::ScfResult;
use ::basis::cgto::AtomBasis;
use ::basis::molecule::AoIntegrals;
use clap::Parser;
use color_eyre::eyre::{Result, WrapErr};
use std::fs;
use tracing::{info, warn};

/// Everything a run produced.
#[derive(Debug, Clone)]
pub struct Calculation {
    pub electrons: ElectronCount,
    pub scf: ScfResult,
    /// ⟨S²⟩ of the final determinant
    pub spin_squared: f64,
    /// Present when MP2 was requested and the SCF converged
    pub mp2: Option<Mp2Energy>,
}

pub struct ScfApplication {
    args: Args,
    config: Config,
}

impl ScfApplication {
    pub fn new(args: Args, config: Config) -> Self {
        Self { args, config }
    }

    pub fn from_cli() -> Result<Self> {
        let args = Args::parse();
        let config = load_config(&args)?;
        Ok(Self { args, config })
    }

    pub fn run(self) -> Result<()> {
        setup_output(self.args.output.as_ref())?;
        info!("Configuration loaded from {}", self.args.config_file);
        self.execute()?;
        Ok(())
    }

    /// Geometry, integrals, SCF and (optionally) MP2, with the summary logged.
    pub fn execute(&self) -> Result<Calculation> {
        let molecule = build_molecule(&self.config)?;
        let mut registry = BasisRegistry::<AtomBasis, _>::new(EmbeddedBasisLoader);
        let basis_map = registry.load_for_molecule(self.config.basis_name(), &molecule)?;

        info!("Computing integrals...");
        let integrals = AoIntegrals::compute(&molecule, &basis_map).wrap_err("Integral evaluation failed")?;
        info!("  Number of basis functions: {}", integrals.num_basis());
        info!("  Nuclear repulsion energy: {:.10} au", integrals.nuclear_repulsion);

        let electrons = resolve_electrons(&self.args, &self.config, &molecule)?;
        let reference = resolve_reference(&self.args, &self.config, &electrons.occupation);
        info!(
            "Using {:?} reference with charge={}, multiplicity={}",
            reference, electrons.charge, electrons.multiplicity
        );

        let settings = resolve_settings(&self.args, &self.config);
        let scf = run_scf(&integrals, electrons.occupation, reference, settings)?;
        report_scf_summary(&scf, &integrals.overlap);
        let spin_squared = scf.spin_contamination(&integrals.overlap);

        let mp2 = if mp2_requested(&self.args, &self.config) {
            if scf.is_converged() {
                let energy = run_mp2(&scf, &integrals)?;
                report_mp2_summary(scf.total_energy, &energy);
                Some(energy)
            } else {
                warn!("Skipping MP2: the SCF did not converge");
                None
            }
        } else {
            None
        };

        Ok(Calculation {
            electrons,
            scf,
            spin_squared,
            mp2,
        })
    }
}

pub fn load_config(args: &Args) -> Result<Config> {
    let config_content = fs::read_to_string(&args.config_file)
        .wrap_err_with(|| format!("Unable to read configuration file: {}", args.config_file))?;

    let config = serde_yml::from_str::<Config>(&config_content)
        .wrap_err("Failed to parse configuration file")?
        .with_defaults();

    Ok(config)
}
