use crate::config::{Args, Config, ReferenceChoice};
use crate::mp2_impl::{Mp2, Mp2Energy};
use crate::scf_impl::{DiisCapacity, Occupation, Reference, ScfDriver, ScfInput, ScfResult, ScfSettings};
use ::basis::molecule::{AoIntegrals, Molecule};
use color_eyre::eyre::{Result, WrapErr};
use tracing::info;

/// Charge, multiplicity and the occupations they imply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ElectronCount {
    pub charge: i32,
    pub multiplicity: usize,
    pub occupation: Occupation,
}

pub fn resolve_electrons(args: &Args, config: &Config, molecule: &Molecule) -> Result<ElectronCount> {
    let charge = args.charge.or(config.charge).unwrap_or(0);
    let multiplicity = args.multiplicity.or(config.multiplicity).unwrap_or(1);
    let n_electrons = molecule
        .num_electrons(charge)
        .wrap_err("Invalid molecular charge")?;
    let occupation = Occupation::from_electrons(n_electrons, multiplicity)
        .wrap_err_with(|| format!("Invalid spin state for charge {}", charge))?;
    Ok(ElectronCount {
        charge,
        multiplicity,
        occupation,
    })
}

pub fn resolve_reference(args: &Args, config: &Config, occupation: &Occupation) -> Reference {
    let choice = args.reference.or(config.reference).unwrap_or_default();
    match choice {
        ReferenceChoice::Rhf => Reference::Restricted,
        ReferenceChoice::Uhf => Reference::Unrestricted,
        ReferenceChoice::Auto if occupation.is_closed_shell() => Reference::Restricted,
        ReferenceChoice::Auto => Reference::Unrestricted,
    }
}

pub fn resolve_settings(args: &Args, config: &Config) -> ScfSettings {
    let defaults = ScfSettings::default();
    let iteration_max = args
        .max_cycle
        .or(config.scf_params.max_cycle)
        .unwrap_or(defaults.iteration_max);
    let energy_threshold = args
        .energy_threshold
        .or(config.scf_params.energy_threshold)
        .unwrap_or(defaults.energy_threshold);
    let density_threshold = args
        .density_threshold
        .or(config.scf_params.density_threshold)
        .unwrap_or(defaults.density_threshold);

    let diis_size = args
        .diis_subspace_size
        .unwrap_or_else(|| config.diis_subspace_size());
    let diis = (diis_size > 0).then_some(DiisCapacity::Bounded(diis_size));
    match diis {
        Some(DiisCapacity::Bounded(size)) => info!("Enabling DIIS acceleration with subspace size {}", size),
        _ => info!("DIIS acceleration disabled"),
    }

    ScfSettings {
        iteration_max,
        energy_threshold,
        density_threshold,
        diis,
    }
}

pub fn run_scf(
    integrals: &AoIntegrals,
    occupation: Occupation,
    reference: Reference,
    settings: ScfSettings,
) -> Result<ScfResult> {
    let input = ScfInput::from_integrals(integrals, occupation).wrap_err("Invalid SCF input")?;
    let driver = ScfDriver::new(input, settings, reference).wrap_err("Unable to start the SCF")?;

    info!("Starting SCF cycle...");
    Ok(driver.run())
}

pub fn run_mp2(scf: &ScfResult, integrals: &AoIntegrals) -> Result<Mp2Energy> {
    info!("Starting MP2 correlation energy calculation...");
    let mp2 = Mp2::from_scf(scf, &integrals.eri).wrap_err("MP2 needs a converged reference")?;
    Ok(mp2.energy())
}

pub fn mp2_requested(args: &Args, config: &Config) -> bool {
    args.mp2 || config.is_mp2_enabled()
}
