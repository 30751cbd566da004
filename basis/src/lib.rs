//! Gaussian basis functions and the molecular integrals consumed by the SCF
//! solver: overlap, kinetic, nuclear attraction and electron repulsion.

pub mod basis;
pub mod cgto;
pub mod eri;
pub mod gto;
pub mod helper;
pub mod molecule;
