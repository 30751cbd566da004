use super::convergence::{ConvergenceMonitor, Thresholds};
use super::density::{density_matrix, rms_change};
use super::diis::{Diis, DiisCapacity};
use super::eigen::GeneralizedEigensolver;
use super::fock::{restricted_fock, unrestricted_fock};
use super::input::ScfInput;
use super::orthogonalizer::orthogonalizer;
use crate::error::ScfError;
use nalgebra::{DMatrix, DMatrixView, DVector};
use tracing::{info, warn};

/// Spin treatment, fixed when the driver is built.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reference {
    Restricted,
    Unrestricted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScfState {
    Initialized,
    Iterating,
    Converged,
    ExceededIterations,
}

impl ScfState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, ScfState::Converged | ScfState::ExceededIterations)
    }
}

/// Terminal outcome of a run. Energies of an `ExceededIterations` run are not
/// self-consistent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScfStatus {
    Converged,
    ExceededIterations,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScfSettings {
    pub iteration_max: usize,
    pub energy_threshold: f64,
    pub density_threshold: f64,
    /// `None` runs plain Roothaan iterations.
    pub diis: Option<DiisCapacity>,
}

impl Default for ScfSettings {
    fn default() -> Self {
        let thresholds = Thresholds::default();
        ScfSettings {
            iteration_max: 100,
            energy_threshold: thresholds.energy,
            density_threshold: thresholds.density,
            diis: Some(DiisCapacity::default()),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct IterationRecord {
    pub iteration: usize,
    /// Total energy (electronic + nuclear repulsion) of the density entering this iteration.
    pub energy: f64,
    pub delta_e: Option<f64>,
    pub rms_density: f64,
    /// Largest newest-error norm over the spin channels.
    pub diis_error: Option<f64>,
    pub diis_vectors: usize,
}

#[derive(Debug, Clone)]
pub struct MolecularOrbitals {
    pub energies: DVector<f64>,
    pub coefficients: DMatrix<f64>,
    pub n_occ: usize,
}

impl MolecularOrbitals {
    pub fn num_orbitals(&self) -> usize {
        self.energies.len()
    }

    pub fn occupied(&self) -> DMatrixView<'_, f64> {
        self.coefficients.columns(0, self.n_occ)
    }

    pub fn virtual_orbitals(&self) -> DMatrixView<'_, f64> {
        self.coefficients
            .columns(self.n_occ, self.num_orbitals() - self.n_occ)
    }

    pub fn density(&self) -> DMatrix<f64> {
        density_matrix(&self.coefficients, self.n_occ)
    }

    pub fn homo(&self) -> Option<f64> {
        self.n_occ.checked_sub(1).map(|i| self.energies[i])
    }

    pub fn lumo(&self) -> Option<f64> {
        self.energies.get(self.n_occ).copied()
    }
}

#[derive(Debug, Clone)]
pub enum Orbitals {
    Restricted(MolecularOrbitals),
    Unrestricted {
        alpha: MolecularOrbitals,
        beta: MolecularOrbitals,
    },
}

impl Orbitals {
    pub fn alpha(&self) -> &MolecularOrbitals {
        match self {
            Orbitals::Restricted(mo) => mo,
            Orbitals::Unrestricted { alpha, .. } => alpha,
        }
    }

    pub fn beta(&self) -> &MolecularOrbitals {
        match self {
            Orbitals::Restricted(mo) => mo,
            Orbitals::Unrestricted { beta, .. } => beta,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ScfResult {
    pub status: ScfStatus,
    pub reference: Reference,
    pub iterations: usize,
    pub electronic_energy: f64,
    pub nuclear_repulsion: f64,
    pub total_energy: f64,
    pub orbitals: Orbitals,
    pub history: Vec<IterationRecord>,
}

impl ScfResult {
    pub fn is_converged(&self) -> bool {
        self.status == ScfStatus::Converged
    }

    /// ⟨S²⟩ = Sz(Sz+1) + n_β - Σ_ij |<φ_i^α|φ_j^β>|² over occupied orbitals.
    pub fn spin_contamination(&self, overlap: &DMatrix<f64>) -> f64 {
        let alpha = self.orbitals.alpha();
        let beta = self.orbitals.beta();
        let sz = (alpha.n_occ as f64 - beta.n_occ as f64) / 2.0;
        let mixed = alpha.occupied().transpose() * overlap * beta.occupied();
        sz * (sz + 1.0) + beta.n_occ as f64 - mixed.norm_squared()
    }
}

/// One spin channel's density, Fock matrix, orbitals and DIIS history.
#[derive(Debug, Clone)]
struct SpinChannel {
    n_occ: usize,
    density: DMatrix<f64>,
    fock: DMatrix<f64>,
    coefficients: DMatrix<f64>,
    energies: DVector<f64>,
    diis: Option<Diis>,
}

impl SpinChannel {
    fn from_guess(
        n_occ: usize,
        h_core: &DMatrix<f64>,
        energies: &DVector<f64>,
        coefficients: &DMatrix<f64>,
        diis: Option<DiisCapacity>,
    ) -> Self {
        Self {
            n_occ,
            density: density_matrix(coefficients, n_occ),
            fock: h_core.clone(),
            coefficients: coefficients.clone(),
            energies: energies.clone(),
            diis: diis.map(Diis::new),
        }
    }

    /// Pushes the current Fock matrix and its commutator error onto the history.
    fn record_error(&mut self, overlap: &DMatrix<f64>, orthogonalizer: &DMatrix<f64>) {
        if let Some(diis) = self.diis.as_mut() {
            let error = Diis::error_vector(&self.fock, &self.density, overlap, orthogonalizer);
            diis.push(self.fock.clone(), error);
        }
    }

    /// Diagonalizes `fock` and rebuilds the density. Returns the density change.
    fn update(&mut self, fock: &DMatrix<f64>, solver: &GeneralizedEigensolver) -> f64 {
        let (energies, coefficients) = solver.solve(fock);
        let density = density_matrix(&coefficients, self.n_occ);
        let rms = rms_change(&density, &self.density);

        self.energies = energies;
        self.coefficients = coefficients;
        self.density = density;
        rms
    }

    fn orbitals(&self) -> MolecularOrbitals {
        MolecularOrbitals {
            energies: self.energies.clone(),
            coefficients: self.coefficients.clone(),
            n_occ: self.n_occ,
        }
    }
}

#[derive(Debug, Clone)]
enum Channels {
    Restricted(SpinChannel),
    Unrestricted([SpinChannel; 2]),
}

impl Channels {
    fn as_slice(&self) -> &[SpinChannel] {
        match self {
            Channels::Restricted(channel) => std::slice::from_ref(channel),
            Channels::Unrestricted(channels) => channels,
        }
    }

    fn as_mut_slice(&mut self) -> &mut [SpinChannel] {
        match self {
            Channels::Restricted(channel) => std::slice::from_mut(channel),
            Channels::Unrestricted(channels) => channels,
        }
    }
}

/// SCF fixed-point iteration: Fock build, energy, DIIS, diagonalization,
/// density rebuild and the dual ΔE / density convergence test.
pub struct ScfDriver {
    input: ScfInput,
    settings: ScfSettings,
    reference: Reference,
    orthogonalizer: Option<DMatrix<f64>>,
    eigensolver: GeneralizedEigensolver,
    channels: Channels,
    monitor: ConvergenceMonitor,
    state: ScfState,
    iteration: usize,
    electronic_energy: Option<f64>,
    history: Vec<IterationRecord>,
}

impl ScfDriver {
    /// Seeds every channel from the core-Hamiltonian guess.
    pub fn new(input: ScfInput, settings: ScfSettings, reference: Reference) -> Result<Self, ScfError> {
        let occupation = input.occupation();
        if reference == Reference::Restricted && !occupation.is_closed_shell() {
            return Err(ScfError::MalformedInput(format!(
                "restricted reference needs n_alpha = n_beta, got {} and {}",
                occupation.alpha, occupation.beta
            )));
        }
        if settings.iteration_max == 0 {
            return Err(ScfError::MalformedInput("iteration_max must be at least 1".to_string()));
        }

        let eigensolver = GeneralizedEigensolver::new(input.overlap())?;

        let orthogonalizer = match settings.diis {
            Some(_) => match orthogonalizer(input.overlap()) {
                Ok(a) => Some(a),
                Err(err) => {
                    warn!("DIIS disabled, running without extrapolation: {}", err);
                    None
                }
            },
            None => None,
        };
        let diis = if orthogonalizer.is_some() { settings.diis } else { None };

        let (energies, coefficients) = eigensolver.solve(input.h_core());
        let channel = |n_occ| SpinChannel::from_guess(n_occ, input.h_core(), &energies, &coefficients, diis);
        let channels = match reference {
            Reference::Restricted => Channels::Restricted(channel(occupation.alpha)),
            Reference::Unrestricted => {
                Channels::Unrestricted([channel(occupation.alpha), channel(occupation.beta)])
            }
        };

        let monitor = ConvergenceMonitor::new(Thresholds {
            energy: settings.energy_threshold,
            density: settings.density_threshold,
        });

        info!(
            "SCF initialized: {:?} reference, {} basis functions, n_alpha = {}, n_beta = {}",
            reference,
            input.num_basis(),
            occupation.alpha,
            occupation.beta
        );

        Ok(Self {
            input,
            settings,
            reference,
            orthogonalizer,
            eigensolver,
            channels,
            monitor,
            state: ScfState::Initialized,
            iteration: 0,
            electronic_energy: None,
            history: Vec::new(),
        })
    }

    pub fn state(&self) -> ScfState {
        self.state
    }

    pub fn iteration(&self) -> usize {
        self.iteration
    }

    pub fn reference(&self) -> Reference {
        self.reference
    }

    pub fn history(&self) -> &[IterationRecord] {
        &self.history
    }

    pub fn diis_enabled(&self) -> bool {
        self.orthogonalizer.is_some()
    }

    /// Current density of each channel (one for restricted, α and β otherwise).
    pub fn densities(&self) -> Vec<&DMatrix<f64>> {
        self.channels.as_slice().iter().map(|c| &c.density).collect()
    }

    /// Builds the Fock matrices from the current densities, stores them and
    /// returns the electronic energy of those densities.
    fn build_fock(&mut self) -> f64 {
        let h_core = self.input.h_core();
        let eri = self.input.eri();
        match &mut self.channels {
            Channels::Restricted(channel) => {
                channel.fock = restricted_fock(h_core, &channel.density, eri);
                // E = Σ P∘(H + F) with P the single-spin density
                channel.density.dot(&(h_core + &channel.fock))
            }
            Channels::Unrestricted([alpha, beta]) => {
                let [f_alpha, f_beta] = unrestricted_fock(h_core, &alpha.density, &beta.density, eri);
                alpha.fock = f_alpha;
                beta.fock = f_beta;
                let total = &alpha.density + &beta.density;
                0.5 * (total.dot(h_core) + alpha.density.dot(&alpha.fock) + beta.density.dot(&beta.fock))
            }
        }
    }

    /// Records the DIIS errors of the current Fock matrices and returns the
    /// matrices to diagonalize, one per channel. All channels share one set
    /// of coefficients; a failed solve falls back to the raw Fock matrices.
    fn extrapolated_focks(&mut self) -> Vec<DMatrix<f64>> {
        let channels = self.channels.as_mut_slice();
        let raw: Vec<DMatrix<f64>> = channels.iter().map(|c| c.fock.clone()).collect();
        let orthogonalizer = match self.orthogonalizer.as_ref() {
            Some(a) => a,
            None => return raw,
        };

        for channel in channels.iter_mut() {
            channel.record_error(self.input.overlap(), orthogonalizer);
        }
        let histories: Vec<&Diis> = channels.iter().filter_map(|c| c.diis.as_ref()).collect();
        if histories.len() != channels.len() || histories.iter().any(|d| d.len() < 2) {
            return raw;
        }

        match Diis::extrapolate_coupled(&histories) {
            Ok(extrapolations) => extrapolations.into_iter().map(|e| e.fock).collect(),
            Err(err) => {
                warn!("DIIS fell back to the raw Fock matrix: {}", err);
                raw
            }
        }
    }

    /// Runs one iteration. Terminal states are left untouched.
    pub fn step(&mut self) -> ScfState {
        if self.state.is_terminal() {
            return self.state;
        }
        self.state = ScfState::Iterating;
        self.iteration += 1;

        let electronic_energy = self.build_fock();
        let total_energy = electronic_energy + self.input.nuclear_repulsion();
        self.electronic_energy = Some(electronic_energy);

        let focks = self.extrapolated_focks();
        let eigensolver = &self.eigensolver;
        let rms_density = self
            .channels
            .as_mut_slice()
            .iter_mut()
            .zip(&focks)
            .map(|(channel, fock)| channel.update(fock, eigensolver))
            .fold(0.0_f64, f64::max);

        let channels = self.channels.as_slice();
        let diis_error = channels
            .iter()
            .filter_map(|c| c.diis.as_ref().and_then(Diis::last_error_norm))
            .reduce(f64::max);
        let diis_vectors = channels
            .iter()
            .filter_map(|c| c.diis.as_ref().map(Diis::len))
            .max()
            .unwrap_or(0);

        let check = self.monitor.check(total_energy, rms_density);
        match check.delta_e {
            Some(delta_e) => info!(
                "Cycle {}: E = {:.12} au, dE = {:.3e}, dP = {:.3e}, DIIS vectors = {}",
                self.iteration, total_energy, delta_e, rms_density, diis_vectors
            ),
            None => info!(
                "Cycle {}: E = {:.12} au, dP = {:.3e}, DIIS vectors = {}",
                self.iteration, total_energy, rms_density, diis_vectors
            ),
        }

        self.history.push(IterationRecord {
            iteration: self.iteration,
            energy: total_energy,
            delta_e: check.delta_e,
            rms_density,
            diis_error,
            diis_vectors,
        });

        self.state = if check.converged {
            info!("SCF converged in {} cycles, E = {:.12} au", self.iteration, total_energy);
            ScfState::Converged
        } else if self.iteration >= self.settings.iteration_max {
            warn!(
                "SCF did not converge in {} cycles (last dE = {:?}, dP = {:.3e})",
                self.iteration, check.delta_e, rms_density
            );
            ScfState::ExceededIterations
        } else {
            ScfState::Iterating
        };
        self.state
    }

    /// Iterates to a terminal state.
    pub fn run(mut self) -> ScfResult {
        while !self.state.is_terminal() {
            self.step();
        }
        self.into_result()
    }

    fn into_result(self) -> ScfResult {
        let status = match self.state {
            ScfState::Converged => ScfStatus::Converged,
            _ => ScfStatus::ExceededIterations,
        };
        let electronic_energy = self.electronic_energy.unwrap_or(f64::NAN);
        let orbitals = match &self.channels {
            Channels::Restricted(channel) => Orbitals::Restricted(channel.orbitals()),
            Channels::Unrestricted([alpha, beta]) => Orbitals::Unrestricted {
                alpha: alpha.orbitals(),
                beta: beta.orbitals(),
            },
        };

        ScfResult {
            status,
            reference: self.reference,
            iterations: self.iteration,
            electronic_energy,
            nuclear_repulsion: self.input.nuclear_repulsion(),
            total_energy: electronic_energy + self.input.nuclear_repulsion(),
            orbitals,
            history: self.history,
        }
    }
}
