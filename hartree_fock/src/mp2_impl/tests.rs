//! Tests for MP2 implementation

#[cfg(test)]
mod tests {
    use super::super::{transform_ovov, Mp2};
    use crate::error::ScfError;
    use crate::scf_impl::{Occupation, Reference, ScfDriver, ScfInput, ScfResult, ScfSettings};
    use approx::assert_abs_diff_eq;
    use basis::cgto::AtomBasis;
    use basis::molecule::{AoIntegrals, Atom, Molecule};
    use nalgebra::Vector3;
    use std::collections::HashMap;

    fn water() -> Molecule {
        Molecule::new(vec![
            Atom::new("O", Vector3::new(0.0, -0.143225816552, 0.0)).unwrap(),
            Atom::new("H", Vector3::new(1.638036840407, 1.136548822547, 0.0)).unwrap(),
            Atom::new("H", Vector3::new(-1.638036840407, 1.136548822547, 0.0)).unwrap(),
        ])
    }

    fn hydrogen_molecule() -> Molecule {
        Molecule::new(vec![
            Atom::new("H", Vector3::zeros()).unwrap(),
            Atom::new("H", Vector3::new(0.0, 0.0, 1.4)).unwrap(),
        ])
    }

    fn integrals(molecule: &Molecule) -> AoIntegrals {
        let bases: HashMap<String, AtomBasis> = molecule
            .elements()
            .into_iter()
            .map(|symbol| {
                let basis = AtomBasis::embedded("sto-3g", &symbol).unwrap();
                (symbol, basis)
            })
            .collect();
        AoIntegrals::compute(molecule, &bases).unwrap()
    }

    fn scf(
        ints: &AoIntegrals,
        occupation: Occupation,
        reference: Reference,
        settings: ScfSettings,
    ) -> ScfResult {
        let input = ScfInput::from_integrals(ints, occupation).unwrap();
        ScfDriver::new(input, settings, reference).unwrap().run()
    }

    #[test]
    fn test_water_rmp2_energy() {
        let ints = integrals(&water());
        let hf = scf(&ints, Occupation::new(5, 5), Reference::Restricted, ScfSettings::default());
        assert!(hf.is_converged());

        let energy = Mp2::from_scf(&hf, &ints.eri).unwrap().energy();
        assert_abs_diff_eq!(energy.correlation, -0.049149636120, epsilon = 1e-6);
        assert_abs_diff_eq!(
            energy.correlation,
            energy.same_spin + energy.opposite_spin,
            epsilon = 1e-14
        );
        assert!(energy.same_spin < 0.0);
        assert!(energy.opposite_spin < 0.0);
    }

    #[test]
    fn test_closed_shell_ump2_matches_rmp2() {
        let ints = integrals(&water());
        let rhf = scf(&ints, Occupation::new(5, 5), Reference::Restricted, ScfSettings::default());
        let uhf = scf(&ints, Occupation::new(5, 5), Reference::Unrestricted, ScfSettings::default());

        let rmp2 = Mp2::from_scf(&rhf, &ints.eri).unwrap().energy();
        let ump2 = Mp2::from_scf(&uhf, &ints.eri).unwrap().energy();
        assert_abs_diff_eq!(ump2.correlation, rmp2.correlation, epsilon = 1e-9);
        assert_abs_diff_eq!(ump2.same_spin, rmp2.same_spin, epsilon = 1e-9);
        assert_abs_diff_eq!(ump2.opposite_spin, rmp2.opposite_spin, epsilon = 1e-9);
    }

    #[test]
    fn test_unconverged_reference_is_rejected() {
        let ints = integrals(&water());
        let settings = ScfSettings {
            iteration_max: 1,
            ..ScfSettings::default()
        };
        let hf = scf(&ints, Occupation::new(5, 5), Reference::Restricted, settings);
        assert!(!hf.is_converged());

        let err = Mp2::from_scf(&hf, &ints.eri).unwrap_err();
        assert_eq!(err, ScfError::NotConverged { iterations: 1 });
    }

    #[test]
    fn test_mismatched_tensor_is_rejected() {
        let water_ints = integrals(&water());
        let h2_ints = integrals(&hydrogen_molecule());
        let hf = scf(&h2_ints, Occupation::new(1, 1), Reference::Restricted, ScfSettings::default());
        let err = Mp2::from_scf(&hf, &water_ints.eri).unwrap_err();
        assert!(matches!(err, ScfError::MalformedInput(_)));
    }

    #[test]
    fn test_h2_mp2_energy() {
        let ints = integrals(&hydrogen_molecule());
        let hf = scf(&ints, Occupation::new(1, 1), Reference::Restricted, ScfSettings::default());
        assert_abs_diff_eq!(hf.total_energy, -1.1167, epsilon = 1e-4);

        let energy = Mp2::from_scf(&hf, &ints.eri).unwrap().energy();
        // a single occupied pair: no same-spin double excitation survives
        assert_abs_diff_eq!(energy.same_spin, 0.0, epsilon = 1e-14);
        assert_abs_diff_eq!(energy.correlation, -0.0131, epsilon = 5e-4);
    }

    #[test]
    fn test_no_virtual_orbitals_gives_zero() {
        let helium = Molecule::new(vec![Atom::new("He", Vector3::zeros()).unwrap()]);
        let ints = integrals(&helium);
        let hf = scf(&ints, Occupation::new(1, 1), Reference::Restricted, ScfSettings::default());
        assert!(hf.is_converged());
        assert_abs_diff_eq!(hf.total_energy, -2.80778, epsilon = 1e-4);

        let energy = Mp2::from_scf(&hf, &ints.eri).unwrap().energy();
        assert_eq!(energy.correlation, 0.0);
    }

    #[test]
    fn test_transform_matches_direct_sum() {
        let ints = integrals(&water());
        let hf = scf(&ints, Occupation::new(5, 5), Reference::Restricted, ScfSettings::default());
        let mo = hf.orbitals.alpha();
        let occ = mo.occupied().into_owned();
        let vir = mo.virtual_orbitals().into_owned();
        let block = transform_ovov(&ints.eri, &occ, &vir, &occ, &vir);
        assert_eq!(block.dims(), (5, 2, 5, 2));

        let n = ints.num_basis();
        for &(i, a, j, b) in &[(0, 0, 0, 0), (4, 1, 2, 0), (3, 0, 4, 1), (1, 1, 1, 1)] {
            let mut direct = 0.0;
            for mu in 0..n {
                for nu in 0..n {
                    for lam in 0..n {
                        for sig in 0..n {
                            direct += occ[(mu, i)]
                                * vir[(nu, a)]
                                * occ[(lam, j)]
                                * vir[(sig, b)]
                                * ints.eri.get(mu, nu, lam, sig);
                        }
                    }
                }
            }
            assert_abs_diff_eq!(block.get(i, a, j, b), direct, epsilon = 1e-12);
        }
        // (ia|jb) = (jb|ia)
        assert_abs_diff_eq!(block.get(4, 1, 2, 0), block.get(2, 0, 4, 1), epsilon = 1e-12);
    }

    #[test]
    fn test_open_shell_ump2() {
        let ints = integrals(&water());
        let cation = scf(&ints, Occupation::new(5, 4), Reference::Unrestricted, ScfSettings::default());
        assert!(cation.is_converged());

        let energy = Mp2::from_scf(&cation, &ints.eri).unwrap().energy();
        assert!(energy.correlation.is_finite());
        assert!(energy.correlation < 0.0);
        assert!(energy.same_spin < 0.0);
        assert!(energy.opposite_spin < 0.0);
    }
}
