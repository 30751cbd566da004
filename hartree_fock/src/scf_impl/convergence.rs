/// Absolute convergence thresholds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Thresholds {
    /// Hartree
    pub energy: f64,
    /// Frobenius norm of the density change
    pub density: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Thresholds {
            energy: 1e-9,
            density: 1e-5,
        }
    }
}

/// Both criteria must hold in the same iteration. Without a previous
/// energy there is no ΔE and the test fails.
pub fn is_converged(delta_e: Option<f64>, rms_density: f64, thresholds: &Thresholds) -> bool {
    match delta_e {
        Some(delta_e) => delta_e < thresholds.energy && rms_density < thresholds.density,
        None => false,
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConvergenceCheck {
    pub delta_e: Option<f64>,
    pub rms_density: f64,
    pub converged: bool,
}

/// Tracks the previous energy between iterations.
#[derive(Debug, Clone)]
pub struct ConvergenceMonitor {
    thresholds: Thresholds,
    previous_energy: Option<f64>,
}

impl ConvergenceMonitor {
    pub fn new(thresholds: Thresholds) -> Self {
        Self {
            thresholds,
            previous_energy: None,
        }
    }

    pub fn check(&mut self, energy: f64, rms_density: f64) -> ConvergenceCheck {
        let delta_e = self.previous_energy.map(|prev| (energy - prev).abs());
        self.previous_energy = Some(energy);
        ConvergenceCheck {
            delta_e,
            rms_density,
            converged: is_converged(delta_e, rms_density, &self.thresholds),
        }
    }

    pub fn thresholds(&self) -> &Thresholds {
        &self.thresholds
    }
}
