//! Output formatting and logging utilities

use crate::scf_impl::MolecularOrbitals;
use color_eyre::eyre::{Result, WrapErr};
use std::fmt;
use std::fs::File;
use std::io::Write;
use std::time::SystemTime as StdSystemTime;
use tracing::info;
use tracing_subscriber::{
    fmt::format::Writer, fmt::layer, fmt::time::FormatTime, layer::SubscriberExt,
    util::SubscriberInitExt, Registry,
};

/// Wall-clock time as HH:MM:SS
struct SecondPrecisionTimer;

impl FormatTime for SecondPrecisionTimer {
    fn format_time(&self, w: &mut Writer<'_>) -> fmt::Result {
        let duration = StdSystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap_or_default();

        let total_seconds = duration.as_secs();
        let hours = (total_seconds / 3600) % 24;
        let minutes = (total_seconds / 60) % 60;
        let seconds = total_seconds % 60;

        write!(w, "{:02}:{:02}:{:02}", hours, minutes, seconds)
    }
}

/// Setup output logging to file or stdout
pub fn setup_output(output_path: Option<&String>) -> Result<()> {
    match output_path {
        Some(path) => {
            let log = File::create(path).wrap_err_with(|| format!("Could not create output file: {}", path))?;
            let file_layer = layer()
                .with_writer(log)
                .with_timer(SecondPrecisionTimer)
                .with_ansi(false);
            Registry::default().with(file_layer).init();
            info!("Output will be written to: {}", path);
        }
        None => {
            let stdout_layer = layer()
                .with_writer(std::io::stdout)
                .with_timer(SecondPrecisionTimer)
                .with_ansi(true);
            Registry::default().with(stdout_layer).init();
            info!("Output will be printed to stdout");
        }
    }
    Ok(())
}

/// Orbital energies with occupation marks, one orbital per line.
pub fn write_orbital_table<W: Write>(writer: &mut W, label: &str, orbitals: &MolecularOrbitals) -> Result<()> {
    writeln!(writer, "{} orbital energies (au):", label)?;
    for (i, energy) in orbitals.energies.iter().enumerate() {
        let mark = if i < orbitals.n_occ { "occ" } else { "vir" };
        writeln!(writer, "  {:>4} {:>3} {:>16.8}", i + 1, mark, energy)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::{DMatrix, DVector};

    #[test]
    fn test_orbital_table() {
        let orbitals = MolecularOrbitals {
            energies: DVector::from_vec(vec![-0.578, 0.670]),
            coefficients: DMatrix::identity(2, 2),
            n_occ: 1,
        };
        let mut buffer = Vec::new();
        write_orbital_table(&mut buffer, "Restricted", &orbitals).unwrap();
        let text = String::from_utf8(buffer).unwrap();

        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "Restricted orbital energies (au):");
        assert!(lines[1].contains("occ") && lines[1].contains("-0.57800000"));
        assert!(lines[2].contains("vir") && lines[2].contains("0.67000000"));
    }
}
