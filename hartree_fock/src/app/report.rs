use crate::io::write_orbital_table;
use crate::mp2_impl::Mp2Energy;
use crate::scf_impl::{MolecularOrbitals, Orbitals, Reference, ScfResult, ScfStatus};
use nalgebra::DMatrix;
use tracing::{info, warn};

pub fn report_scf_summary(scf: &ScfResult, overlap: &DMatrix<f64>) {
    match scf.status {
        ScfStatus::Converged => info!("SCF converged in {} iterations", scf.iterations),
        ScfStatus::ExceededIterations => warn!(
            "SCF exceeded the maximum of {} iterations; energies are not self-consistent",
            scf.iterations
        ),
    }

    match &scf.orbitals {
        Orbitals::Restricted(mo) => report_orbitals("Restricted", mo),
        Orbitals::Unrestricted { alpha, beta } => {
            report_orbitals("Alpha", alpha);
            report_orbitals("Beta", beta);
        }
    }

    info!("Electronic energy:    {:.10} au", scf.electronic_energy);
    info!("Nuclear repulsion:    {:.10} au", scf.nuclear_repulsion);
    info!("Hartree-Fock energy:  {:.10} au", scf.total_energy);

    if scf.reference == Reference::Unrestricted {
        let s2 = scf.spin_contamination(overlap);
        let alpha = scf.orbitals.alpha().n_occ as f64;
        let beta = scf.orbitals.beta().n_occ as f64;
        let sz = (alpha - beta) / 2.0;
        info!("<S^2> = {:.6} (exact {:.6})", s2, sz * (sz + 1.0));
    }
}

fn report_orbitals(label: &str, orbitals: &MolecularOrbitals) {
    let mut buffer = Vec::new();
    if write_orbital_table(&mut buffer, label, orbitals).is_ok() {
        for line in String::from_utf8_lossy(&buffer).lines() {
            info!("{}", line);
        }
    }
}

pub fn report_mp2_summary(hf_energy: f64, mp2: &Mp2Energy) {
    info!("===========================================");
    info!("        MP2 Calculation Summary");
    info!("===========================================");
    info!("Hartree-Fock energy:       {:.12} Eh", hf_energy);
    info!("Same-spin correlation:     {:.12} Eh", mp2.same_spin);
    info!("Opposite-spin correlation: {:.12} Eh", mp2.opposite_spin);
    info!("MP2 correlation energy:    {:.12} Eh", mp2.correlation);
    info!("Total MP2 energy:          {:.12} Eh", hf_energy + mp2.correlation);
    info!("===========================================");
}
