use crate::config::{Config, Units};
use ::basis::molecule::{Atom, Molecule, ANGSTROM_TO_BOHR};
use color_eyre::eyre::{Result, WrapErr};
use nalgebra::Vector3;
use tracing::info;

/// Build the molecule defined in the YAML configuration, in bohr.
pub fn build_molecule(config: &Config) -> Result<Molecule> {
    info!("Preparing geometry...");

    let scale = match config.units.unwrap_or_default() {
        Units::Bohr => 1.0,
        Units::Angstrom => ANGSTROM_TO_BOHR,
    };

    let mut atoms = Vec::with_capacity(config.geometry.len());
    for (idx, atom) in config.geometry.iter().enumerate() {
        let position = Vector3::new(atom.coords[0], atom.coords[1], atom.coords[2]) * scale;
        let atom = Atom::new(&atom.element, position)
            .wrap_err_with(|| format!("Invalid element symbol in geometry entry {}", idx + 1))?;
        info!(
            "  Atom {:>2} {:>2}: [{:+.6}, {:+.6}, {:+.6}] bohr",
            idx + 1,
            atom.symbol(),
            position.x,
            position.y,
            position.z
        );
        atoms.push(atom);
    }

    Ok(Molecule::new(atoms))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(yaml: &str) -> Config {
        serde_yml::from_str::<Config>(yaml).unwrap().with_defaults()
    }

    #[test]
    fn test_angstrom_geometry_is_converted() {
        let molecule = build_molecule(&config(
            "units: angstrom\ngeometry:\n  - element: H\n    coords: [0.0, 0.0, 0.0]\n  - element: H\n    coords: [0.0, 0.0, 0.74]\n",
        ))
        .unwrap();
        assert_eq!(molecule.atoms.len(), 2);
        let distance = (molecule.atoms[1].position - molecule.atoms[0].position).norm();
        assert!((distance - 0.74 * ANGSTROM_TO_BOHR).abs() < 1e-12);
    }

    #[test]
    fn test_unknown_element_is_an_error() {
        let result = build_molecule(&config("geometry:\n  - element: Xx\n    coords: [0.0, 0.0, 0.0]\n"));
        assert!(result.is_err());
    }
}
