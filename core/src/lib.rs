pub mod atom;
pub mod basis;
pub mod config;
mod diis;
pub mod error;
pub mod hf;
pub mod integrals;
pub mod molecule;
pub mod parallel;
pub mod periodic_table;

pub use basis::{assemble, assemble_with, Basis, BasisDatabase, Shell};
pub use error::{AssemblyError, ScfError};
pub use hf::{RestrictedHartreeFock, ScfConfig, ScfDriver, Wavefunction};
pub use molecule::{Molecule, MoleculeSpec};
