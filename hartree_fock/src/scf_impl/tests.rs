//! Tests for the SCF building blocks and the driver

use super::*;
use crate::error::ScfError;
use approx::{assert_abs_diff_eq, assert_relative_eq};
use basis::basis::AOBasis;
use basis::cgto::AtomBasis;
use basis::eri::EriTensor;
use basis::molecule::{AoIntegrals, Atom, Molecule};
use nalgebra::{DMatrix, DVector, Vector3};
use std::collections::HashMap;

const WATER_RHF_ENERGY: f64 = -74.942079928192;

fn water() -> Molecule {
    Molecule::new(vec![
        Atom::new("O", Vector3::new(0.0, -0.143225816552, 0.0)).unwrap(),
        Atom::new("H", Vector3::new(1.638036840407, 1.136548822547, 0.0)).unwrap(),
        Atom::new("H", Vector3::new(-1.638036840407, 1.136548822547, 0.0)).unwrap(),
    ])
}

fn integrals_for(molecule: &Molecule) -> AoIntegrals {
    let mut bases = HashMap::new();
    for symbol in molecule.elements() {
        let basis = AtomBasis::embedded("sto-3g", &symbol).unwrap();
        assert!(basis.basis_size() > 0);
        bases.insert(symbol, basis);
    }
    AoIntegrals::compute(molecule, &bases).unwrap()
}

fn run_water(charge: i32, multiplicity: usize, reference: Reference, settings: ScfSettings) -> ScfResult {
    let molecule = water();
    let ints = integrals_for(&molecule);
    let n_electrons = molecule.num_electrons(charge).unwrap();
    let occupation = Occupation::from_electrons(n_electrons, multiplicity).unwrap();
    let input = ScfInput::from_integrals(&ints, occupation).unwrap();
    ScfDriver::new(input, settings, reference).unwrap().run()
}

fn spd_matrix() -> DMatrix<f64> {
    DMatrix::from_row_slice(3, 3, &[1.0, 0.3, 0.1, 0.3, 1.0, 0.2, 0.1, 0.2, 1.0])
}

// ---------------------------------------------------------------------------
// orthogonalizer, density, eigensolver

#[test]
fn test_orthogonalizer_gives_identity_metric() {
    let s = spd_matrix();
    let a = orthogonalizer(&s).unwrap();
    let identity = a.transpose() * &s * &a;
    assert_abs_diff_eq!(identity, DMatrix::identity(3, 3), epsilon = 1e-12);

    let water_s = integrals_for(&water()).overlap;
    let a = orthogonalizer(&water_s).unwrap();
    assert_abs_diff_eq!(a.transpose() * &water_s * &a, DMatrix::identity(7, 7), epsilon = 1e-10);
}

#[test]
fn test_orthogonalizer_rejects_singular_overlap() {
    let s = DMatrix::from_row_slice(2, 2, &[1.0, 1.0, 1.0, 1.0]);
    assert!(matches!(orthogonalizer(&s), Err(ScfError::DegenerateExtrapolation(_))));
}

#[test]
fn test_density_is_symmetric_and_reproducible() {
    let c = DMatrix::from_row_slice(3, 3, &[0.9, -0.2, 0.4, 0.3, 0.8, -0.5, 0.1, 0.4, 0.7]);
    let p = density_matrix(&c, 2);
    assert_eq!(p, p.transpose());
    assert_eq!(p, density_matrix(&c, 2));
    assert_relative_eq!(p[(0, 1)], 0.9 * 0.3 + -0.2 * 0.8, epsilon = 1e-15);
    assert_eq!(density_matrix(&c, 0), DMatrix::zeros(3, 3));
}

#[test]
fn test_density_is_idempotent_in_overlap_metric() {
    let ints = integrals_for(&water());
    let solver = GeneralizedEigensolver::new(&ints.overlap).unwrap();
    let (_, c) = solver.solve(&ints.h_core);
    let p = density_matrix(&c, 5);
    assert_abs_diff_eq!(&p * &ints.overlap * &p, p, epsilon = 1e-10);
    assert_relative_eq!((&p * &ints.overlap).trace(), 5.0, epsilon = 1e-10);
}

#[test]
fn test_rms_change_is_frobenius_norm() {
    let a = DMatrix::from_row_slice(2, 2, &[1.0, 0.0, 0.0, 1.0]);
    let b = DMatrix::from_row_slice(2, 2, &[0.0, 0.0, 0.0, 0.0]);
    assert_relative_eq!(rms_change(&a, &b), 2.0_f64.sqrt(), epsilon = 1e-15);
}

#[test]
fn test_generalized_eigensolver() {
    let ints = integrals_for(&water());
    let s = &ints.overlap;
    let f = &ints.h_core;
    let solver = GeneralizedEigensolver::new(s).unwrap();
    let (eps, c) = solver.solve(f);

    assert_abs_diff_eq!(c.transpose() * s * &c, DMatrix::identity(7, 7), epsilon = 1e-10);
    assert_abs_diff_eq!(f * &c, s * &c * DMatrix::from_diagonal(&eps), epsilon = 1e-10);
    for k in 1..eps.len() {
        assert!(eps[k - 1] <= eps[k], "eigenvalues not ascending: {:?}", eps);
    }
    for col in c.column_iter() {
        assert!(col[col.iamax()] > 0.0);
    }
}

#[test]
fn test_eigensolver_rejects_indefinite_overlap() {
    let s = DMatrix::from_row_slice(2, 2, &[1.0, 2.0, 2.0, 1.0]);
    assert!(matches!(GeneralizedEigensolver::new(&s), Err(ScfError::MalformedInput(_))));
}

#[test]
fn test_align_eigenvectors() {
    let m = DMatrix::from_row_slice(2, 2, &[0.1, 0.6, -0.9, -0.8]);
    let aligned = align_eigenvectors(m);
    assert_eq!(aligned, DMatrix::from_row_slice(2, 2, &[-0.1, -0.6, 0.9, 0.8]));
}

// ---------------------------------------------------------------------------
// Fock builder

#[test]
fn test_restricted_fock_single_function() {
    // one basis function: G = P (2 (00|00) - (00|00)) = P (00|00)
    let eri = EriTensor::from_packed(1, vec![0.7]).unwrap();
    let h = DMatrix::from_element(1, 1, -1.0);
    let p = DMatrix::from_element(1, 1, 0.5);
    let f = restricted_fock(&h, &p, &eri);
    assert_relative_eq!(f[(0, 0)], -1.0 + 0.35, epsilon = 1e-15);
}

#[test]
fn test_unrestricted_fock_reduces_to_restricted() {
    let ints = integrals_for(&water());
    let solver = GeneralizedEigensolver::new(&ints.overlap).unwrap();
    let (_, c) = solver.solve(&ints.h_core);
    let p = density_matrix(&c, 5);

    let f = restricted_fock(&ints.h_core, &p, &ints.eri);
    let [f_alpha, f_beta] = unrestricted_fock(&ints.h_core, &p, &p, &ints.eri);
    assert_abs_diff_eq!(f_alpha, f, epsilon = 1e-12);
    assert_abs_diff_eq!(f_beta, f, epsilon = 1e-12);
    assert_eq!(f, f.transpose());
}

#[test]
fn test_unrestricted_exchange_is_same_spin_only() {
    let ints = integrals_for(&water());
    let solver = GeneralizedEigensolver::new(&ints.overlap).unwrap();
    let (_, c) = solver.solve(&ints.h_core);
    let p_alpha = density_matrix(&c, 5);
    let p_beta = DMatrix::zeros(7, 7);

    let (g_alpha, g_beta) = unrestricted_two_electron(&p_alpha, &p_beta, &ints.eri);
    // no beta electrons: G_beta = J[P_alpha], G_alpha = J - K
    let coulomb = &g_beta;
    let exchange = coulomb - &g_alpha;
    assert!(exchange.norm() > 1e-3);
    assert_abs_diff_eq!(exchange, exchange.transpose(), epsilon = 1e-14);
    let trace_j = p_alpha.dot(coulomb);
    let trace_k = p_alpha.dot(&exchange);
    assert!(trace_j >= trace_k - 1e-12);
}

// ---------------------------------------------------------------------------
// DIIS

fn diag2(a: f64, b: f64) -> DMatrix<f64> {
    DMatrix::from_diagonal(&DVector::from_vec(vec![a, b]))
}

#[test]
fn test_diis_single_entry_is_identity() {
    let mut diis = Diis::new(DiisCapacity::Unbounded);
    let fock = DMatrix::from_row_slice(2, 2, &[1.0, 0.2, 0.2, -0.5]);
    diis.push(fock.clone(), diag2(0.3, -0.1));

    let result = diis.extrapolate().unwrap();
    assert_eq!(result.coefficients.len(), 1);
    assert_relative_eq!(result.coefficients[0], 1.0, epsilon = 1e-14);
    assert_abs_diff_eq!(result.fock, fock, epsilon = 1e-14);
}

#[test]
fn test_diis_opposite_errors_average() {
    let mut diis = Diis::new(DiisCapacity::default());
    diis.push(diag2(1.0, 1.0), diag2(1.0, 0.0));
    diis.push(diag2(3.0, 3.0), diag2(-1.0, 0.0));

    let result = diis.extrapolate().unwrap();
    assert_relative_eq!(result.coefficients[0], 0.5, epsilon = 1e-12);
    assert_relative_eq!(result.coefficients[1], 0.5, epsilon = 1e-12);
    assert_abs_diff_eq!(result.fock, diag2(2.0, 2.0), epsilon = 1e-12);
    assert_relative_eq!(result.coefficients.sum(), 1.0, epsilon = 1e-12);
}

#[test]
fn test_coupled_diis_shares_coefficients() {
    // alone, alpha would pick (0.5, 0.5) and beta (0.75, 0.25)
    let mut alpha = Diis::new(DiisCapacity::default());
    alpha.push(diag2(1.0, 1.0), diag2(1.0, 0.0));
    alpha.push(diag2(3.0, 3.0), diag2(-1.0, 0.0));
    let mut beta = Diis::new(DiisCapacity::default());
    beta.push(diag2(2.0, 0.0), diag2(1.0, 0.0));
    beta.push(diag2(0.0, 2.0), diag2(-3.0, 0.0));

    let result = Diis::extrapolate_coupled(&[&alpha, &beta]).unwrap();
    assert_eq!(result.len(), 2);
    for extrapolation in &result {
        assert_relative_eq!(extrapolation.coefficients[0], 0.7, epsilon = 1e-12);
        assert_relative_eq!(extrapolation.coefficients[1], 0.3, epsilon = 1e-12);
    }
    assert_abs_diff_eq!(result[0].fock, diag2(1.6, 1.6), epsilon = 1e-12);
    assert_abs_diff_eq!(result[1].fock, diag2(1.4, 0.6), epsilon = 1e-12);
}

#[test]
fn test_coupled_diis_single_entry_and_length_mismatch() {
    let mut alpha = Diis::new(DiisCapacity::Unbounded);
    let mut beta = Diis::new(DiisCapacity::Unbounded);
    alpha.push(diag2(1.0, 2.0), diag2(0.3, 0.0));
    beta.push(diag2(-1.0, 0.5), diag2(0.0, 0.2));

    let result = Diis::extrapolate_coupled(&[&alpha, &beta]).unwrap();
    assert_abs_diff_eq!(result[0].fock, diag2(1.0, 2.0), epsilon = 1e-14);
    assert_abs_diff_eq!(result[1].fock, diag2(-1.0, 0.5), epsilon = 1e-14);

    alpha.push(diag2(0.0, 0.0), diag2(0.1, 0.0));
    assert!(matches!(
        Diis::extrapolate_coupled(&[&alpha, &beta]),
        Err(ScfError::DegenerateExtrapolation(_))
    ));
    assert!(Diis::extrapolate_coupled(&[]).is_err());
}

#[test]
fn test_diis_singular_system_is_degenerate() {
    let mut diis = Diis::new(DiisCapacity::Unbounded);
    diis.push(diag2(1.0, 1.0), diag2(0.0, 0.0));
    diis.push(diag2(2.0, 2.0), diag2(0.0, 0.0));
    assert!(matches!(diis.extrapolate(), Err(ScfError::DegenerateExtrapolation(_))));

    let mut duplicate = Diis::new(DiisCapacity::Unbounded);
    duplicate.push(diag2(1.0, 1.0), diag2(1.0, 0.0));
    duplicate.push(diag2(2.0, 2.0), diag2(1.0, 0.0));
    assert!(matches!(duplicate.extrapolate(), Err(ScfError::DegenerateExtrapolation(_))));

    let empty = Diis::new(DiisCapacity::Unbounded);
    assert!(empty.extrapolate().is_err());
}

#[test]
fn test_bounded_diis_drops_oldest() {
    let mut diis = Diis::new(DiisCapacity::Bounded(2));
    diis.push(diag2(1.0, 1.0), diag2(5.0, 0.0));
    diis.push(diag2(2.0, 2.0), diag2(1.0, 0.0));
    diis.push(diag2(4.0, 4.0), diag2(-1.0, 0.0));
    assert_eq!(diis.len(), 2);

    let result = diis.extrapolate().unwrap();
    assert_abs_diff_eq!(result.fock, diag2(3.0, 3.0), epsilon = 1e-12);
    assert_relative_eq!(diis.last_error_norm().unwrap(), 1.0, epsilon = 1e-15);

    diis.reset();
    assert!(diis.is_empty());
    assert!(diis.last_error_norm().is_none());
}

#[test]
fn test_unbounded_diis_keeps_everything() {
    let mut diis = Diis::new(DiisCapacity::Unbounded);
    for k in 0..20 {
        diis.push(diag2(k as f64, 0.0), diag2(1.0 / (k + 1) as f64, 0.5));
    }
    assert_eq!(diis.len(), 20);
    assert_eq!(diis.capacity(), DiisCapacity::Unbounded);
}

#[test]
fn test_commutator_vanishes_for_commuting_matrices() {
    let f = DMatrix::from_diagonal(&DVector::from_vec(vec![1.0, 2.0, 3.0]));
    let d = DMatrix::from_diagonal(&DVector::from_vec(vec![1.0, 0.0, 0.0]));
    let s = DMatrix::identity(3, 3);
    let a = DMatrix::identity(3, 3);
    let error = Diis::error_vector(&f, &d, &s, &a);
    assert_eq!(error, DMatrix::zeros(3, 3));

    let f_offdiag = DMatrix::from_row_slice(2, 2, &[1.0, 0.5, 0.5, 2.0]);
    let d_offdiag = diag2(1.0, 0.0);
    let error = Diis::error_vector(&f_offdiag, &d_offdiag, &DMatrix::identity(2, 2), &DMatrix::identity(2, 2));
    assert!(error.norm() > 0.1);
}

// ---------------------------------------------------------------------------
// convergence

#[test]
fn test_convergence_needs_both_criteria() {
    let thresholds = Thresholds::default();
    assert!(!is_converged(None, 0.0, &thresholds));
    assert!(!is_converged(Some(0.0), 1e-3, &thresholds));
    assert!(!is_converged(Some(1e-3), 0.0, &thresholds));
    assert!(!is_converged(Some(thresholds.energy), 0.0, &thresholds));
    assert!(!is_converged(Some(f64::NAN), 0.0, &thresholds));
    assert!(is_converged(Some(1e-10), 1e-6, &thresholds));
}

#[test]
fn test_oscillating_energy_does_not_converge() {
    let mut monitor = ConvergenceMonitor::new(Thresholds::default());
    for k in 0..10 {
        let energy = if k % 2 == 0 { -1.0 } else { -1.0 + 1e-6 };
        let check = monitor.check(energy, 1e-9);
        assert!(!check.converged, "converged on iteration {} with dE = {:?}", k, check.delta_e);
    }
    // once the energy settles the same density change is accepted
    let check = monitor.check(-1.0 + 1e-6, 1e-9);
    assert!(check.converged);
}

#[test]
fn test_first_iteration_has_no_energy_change() {
    let mut monitor = ConvergenceMonitor::new(Thresholds::default());
    let first = monitor.check(-10.0, 0.0);
    assert_eq!(first.delta_e, None);
    assert!(!first.converged);
    let second = monitor.check(-10.5, 0.0);
    assert_relative_eq!(second.delta_e.unwrap(), 0.5, epsilon = 1e-15);
}

// ---------------------------------------------------------------------------
// input validation

#[test]
fn test_occupation_from_electrons() {
    assert_eq!(Occupation::from_electrons(10, 1).unwrap(), Occupation::new(5, 5));
    assert_eq!(Occupation::from_electrons(9, 2).unwrap(), Occupation::new(5, 4));
    assert_eq!(Occupation::from_electrons(10, 3).unwrap(), Occupation::new(6, 4));
    assert_eq!(Occupation::from_electrons(1, 2).unwrap(), Occupation::new(1, 0));
    assert!(Occupation::from_electrons(10, 2).is_err());
    assert!(Occupation::from_electrons(1, 4).is_err());
    assert!(Occupation::from_electrons(4, 0).is_err());
}

#[test]
fn test_mismatched_dimensions_are_malformed() {
    let ints = integrals_for(&water());
    let occupation = Occupation::new(5, 5);

    let small_h = DMatrix::zeros(6, 6);
    let err = ScfInput::new(ints.overlap.clone(), small_h, ints.eri.clone(), occupation, 0.0).unwrap_err();
    assert!(matches!(err, ScfError::MalformedInput(_)));

    let small_eri = EriTensor::from_fn(6, |_, _, _, _| 0.0);
    let err = ScfInput::new(ints.overlap.clone(), ints.h_core.clone(), small_eri, occupation, 0.0).unwrap_err();
    assert!(matches!(err, ScfError::MalformedInput(_)));

    let rect = DMatrix::zeros(7, 6);
    let err = ScfInput::new(rect, ints.h_core.clone(), ints.eri.clone(), occupation, 0.0).unwrap_err();
    assert!(matches!(err, ScfError::MalformedInput(_)));

    let err = ScfInput::from_integrals(&ints, Occupation::new(8, 2)).unwrap_err();
    assert!(matches!(err, ScfError::MalformedInput(_)));
}

#[test]
fn test_input_exposes_only_validated_integrals() {
    let ints = integrals_for(&water());
    let tiny_eri = EriTensor::from_fn(2, |_, _, _, _| 0.1);
    let err = ScfInput::new(ints.overlap.clone(), ints.h_core.clone(), tiny_eri, Occupation::new(5, 5), 0.0)
        .unwrap_err();
    assert!(matches!(err, ScfError::MalformedInput(_)));

    let input = ScfInput::from_integrals(&ints, Occupation::new(5, 4)).unwrap();
    assert_eq!(input.num_basis(), 7);
    assert_eq!(input.overlap(), &ints.overlap);
    assert_eq!(input.h_core(), &ints.h_core);
    assert_eq!(input.eri().num_basis(), 7);
    assert_eq!(input.occupation(), Occupation::new(5, 4));
    assert_eq!(input.nuclear_repulsion(), ints.nuclear_repulsion);
}

#[test]
fn test_restricted_open_shell_is_rejected() {
    let ints = integrals_for(&water());
    let input = ScfInput::from_integrals(&ints, Occupation::new(5, 4)).unwrap();
    let err = ScfDriver::new(input, ScfSettings::default(), Reference::Restricted).err();
    assert!(matches!(err, Some(ScfError::MalformedInput(_))));
}

#[test]
fn test_zero_iteration_budget_is_rejected() {
    let ints = integrals_for(&water());
    let input = ScfInput::from_integrals(&ints, Occupation::new(5, 5)).unwrap();
    let settings = ScfSettings {
        iteration_max: 0,
        ..ScfSettings::default()
    };
    assert!(ScfDriver::new(input, settings, Reference::Restricted).is_err());
}

// ---------------------------------------------------------------------------
// driver

#[test]
fn test_water_rhf_energy() {
    let result = run_water(0, 1, Reference::Restricted, ScfSettings::default());

    assert_eq!(result.status, ScfStatus::Converged);
    assert!(result.is_converged());
    assert!(result.iterations <= 100);
    assert_relative_eq!(result.nuclear_repulsion, 8.002367061810450, epsilon = 1e-10);
    assert_abs_diff_eq!(result.total_energy, WATER_RHF_ENERGY, epsilon = 1e-6);
    assert_relative_eq!(
        result.total_energy,
        result.electronic_energy + result.nuclear_repulsion,
        epsilon = 1e-12
    );

    let mo = result.orbitals.alpha();
    assert_eq!(mo.n_occ, 5);
    assert_eq!(mo.occupied().ncols(), 5);
    assert_eq!(mo.virtual_orbitals().ncols(), 2);
    assert!(mo.homo().unwrap() < 0.0);
    assert!(mo.lumo().unwrap() > mo.homo().unwrap());
    assert_eq!(result.history.len(), result.iterations);
}

#[test]
fn test_water_rhf_is_deterministic() {
    let first = run_water(0, 1, Reference::Restricted, ScfSettings::default());
    let second = run_water(0, 1, Reference::Restricted, ScfSettings::default());
    assert_eq!(first.iterations, second.iterations);
    assert_eq!(first.total_energy, second.total_energy);
    assert_eq!(first.orbitals.alpha().coefficients, second.orbitals.alpha().coefficients);
}

#[test]
fn test_closed_shell_uhf_matches_rhf() {
    let rhf = run_water(0, 1, Reference::Restricted, ScfSettings::default());
    let uhf = run_water(0, 1, Reference::Unrestricted, ScfSettings::default());

    assert!(uhf.is_converged());
    assert_abs_diff_eq!(uhf.total_energy, rhf.total_energy, epsilon = 1e-10);
    assert_abs_diff_eq!(
        uhf.orbitals.alpha().energies,
        rhf.orbitals.alpha().energies,
        epsilon = 1e-10
    );
    assert_abs_diff_eq!(uhf.orbitals.alpha().energies, uhf.orbitals.beta().energies, epsilon = 1e-12);

    let s = integrals_for(&water()).overlap;
    assert_abs_diff_eq!(uhf.spin_contamination(&s), 0.0, epsilon = 1e-10);
    assert_abs_diff_eq!(rhf.spin_contamination(&s), 0.0, epsilon = 1e-10);
}

#[test]
fn test_single_iteration_budget_is_exceeded() {
    let settings = ScfSettings {
        iteration_max: 1,
        ..ScfSettings::default()
    };
    let result = run_water(0, 1, Reference::Restricted, settings);
    assert_eq!(result.status, ScfStatus::ExceededIterations);
    assert!(!result.is_converged());
    assert_eq!(result.iterations, 1);
    assert_eq!(result.history[0].delta_e, None);
}

#[test]
fn test_driver_steps_through_states() {
    let ints = integrals_for(&water());
    let input = ScfInput::from_integrals(&ints, Occupation::new(5, 5)).unwrap();
    let settings = ScfSettings {
        iteration_max: 3,
        ..ScfSettings::default()
    };
    let mut driver = ScfDriver::new(input, settings, Reference::Restricted).unwrap();
    assert_eq!(driver.state(), ScfState::Initialized);
    assert!(driver.diis_enabled());

    assert_eq!(driver.step(), ScfState::Iterating);
    assert_eq!(driver.step(), ScfState::Iterating);
    assert_eq!(driver.step(), ScfState::ExceededIterations);
    // terminal states are sticky
    assert_eq!(driver.step(), ScfState::ExceededIterations);
    assert_eq!(driver.iteration(), 3);
    assert_eq!(driver.history().len(), 3);
    for p in driver.densities() {
        assert_eq!(*p, p.transpose());
    }
}

#[test]
fn test_diis_error_trends_to_zero() {
    let result = run_water(0, 1, Reference::Restricted, ScfSettings::default());
    let errors: Vec<f64> = result.history.iter().filter_map(|r| r.diis_error).collect();
    assert_eq!(errors.len(), result.iterations);

    let first = errors[0];
    let last = *errors.last().unwrap();
    assert!(last < 1e-4, "final DIIS error {}", last);
    assert!(last < first * 1e-3, "DIIS error went from {} to {}", first, last);
    assert!(result.history.iter().all(|r| r.diis_vectors <= 8));
}

#[test]
fn test_diis_variants_reach_the_same_energy() {
    let reference = run_water(0, 1, Reference::Restricted, ScfSettings::default());
    let plain = run_water(
        0,
        1,
        Reference::Restricted,
        ScfSettings {
            iteration_max: 300,
            diis: None,
            ..ScfSettings::default()
        },
    );
    let unbounded = run_water(
        0,
        1,
        Reference::Restricted,
        ScfSettings {
            diis: Some(DiisCapacity::Unbounded),
            ..ScfSettings::default()
        },
    );

    assert!(plain.is_converged());
    assert!(unbounded.is_converged());
    assert!(plain.history.iter().all(|r| r.diis_error.is_none() && r.diis_vectors == 0));
    assert_abs_diff_eq!(plain.total_energy, reference.total_energy, epsilon = 1e-7);
    assert_abs_diff_eq!(unbounded.total_energy, reference.total_energy, epsilon = 1e-7);
}

fn tight_settings(diis: Option<DiisCapacity>) -> ScfSettings {
    ScfSettings {
        iteration_max: 300,
        energy_threshold: 1e-10,
        density_threshold: 1e-8,
        diis,
    }
}

fn final_diis_error(result: &ScfResult) -> f64 {
    result.history.last().and_then(|r| r.diis_error).unwrap()
}

const WATER_CATION_UHF_ENERGY: f64 = -74.6617843604;

#[test]
fn test_water_cation_uhf() {
    let neutral = run_water(0, 1, Reference::Restricted, ScfSettings::default());
    let cation = run_water(1, 2, Reference::Unrestricted, ScfSettings::default());

    assert!(cation.is_converged());
    assert!(cation.total_energy > neutral.total_energy);
    assert_abs_diff_eq!(cation.total_energy, WATER_CATION_UHF_ENERGY, epsilon = 1e-8);
    assert_eq!(cation.orbitals.alpha().n_occ, 5);
    assert_eq!(cation.orbitals.beta().n_occ, 4);

    let s = integrals_for(&water()).overlap;
    let s2 = cation.spin_contamination(&s);
    assert!(s2 >= 0.75 - 1e-10, "<S^2> = {}", s2);
    assert!(s2 < 0.8, "<S^2> = {}", s2);
}

#[test]
fn test_water_cation_uhf_is_self_consistent() {
    let bounded = run_water(1, 2, Reference::Unrestricted, tight_settings(Some(DiisCapacity::default())));
    let unbounded = run_water(1, 2, Reference::Unrestricted, tight_settings(Some(DiisCapacity::Unbounded)));
    let plain = run_water(1, 2, Reference::Unrestricted, tight_settings(None));

    for result in [&bounded, &unbounded, &plain] {
        assert!(result.is_converged());
        assert_abs_diff_eq!(result.total_energy, WATER_CATION_UHF_ENERGY, epsilon = 1e-8);
    }
    assert!(final_diis_error(&bounded) < 1e-6, "final DIIS error {}", final_diis_error(&bounded));
    assert!(final_diis_error(&unbounded) < 1e-6, "final DIIS error {}", final_diis_error(&unbounded));
    assert!(unbounded.history.iter().all(|r| r.diis_vectors == r.iteration));
}

#[test]
fn test_water_triplet_lies_above_singlet() {
    let singlet = run_water(0, 1, Reference::Restricted, ScfSettings::default());
    let triplet = run_water(0, 3, Reference::Unrestricted, ScfSettings::default());

    assert!(triplet.is_converged());
    assert!(triplet.total_energy > singlet.total_energy);
    assert!(matches!(triplet.orbitals, Orbitals::Unrestricted { .. }));

    let tight = run_water(0, 3, Reference::Unrestricted, tight_settings(Some(DiisCapacity::default())));
    assert!(tight.is_converged());
    assert!(final_diis_error(&tight) < 1e-6, "final DIIS error {}", final_diis_error(&tight));
    assert_abs_diff_eq!(triplet.total_energy, tight.total_energy, epsilon = 1e-7);
}

#[test]
fn test_h2_rhf_energy() {
    let molecule = Molecule::new(vec![
        Atom::new("H", Vector3::zeros()).unwrap(),
        Atom::new("H", Vector3::new(0.0, 0.0, 1.4)).unwrap(),
    ]);
    let ints = integrals_for(&molecule);
    let input = ScfInput::from_integrals(&ints, Occupation::new(1, 1)).unwrap();
    let result = ScfDriver::new(input, ScfSettings::default(), Reference::Restricted)
        .unwrap()
        .run();

    assert!(result.is_converged());
    assert_abs_diff_eq!(result.total_energy, -1.1167, epsilon = 1e-4);
    assert_abs_diff_eq!(result.orbitals.alpha().energies[0], -0.578, epsilon = 1e-3);
    assert_abs_diff_eq!(result.orbitals.alpha().energies[1], 0.670, epsilon = 1e-3);
}
