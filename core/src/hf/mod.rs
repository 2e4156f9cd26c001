pub mod rhf;
pub(crate) mod utils;

use std::path::PathBuf;

use nalgebra::DMatrix;
use serde::Deserialize;

pub use rhf::RestrictedHartreeFock;

use crate::{basis::Basis, error::ScfError, molecule::Molecule};

/// Key under which the two-electron integrals are staged
pub const TEI_KEY: &str = "tei";

/// Anything that can turn an assembled basis into a converged wavefunction.
pub trait ScfDriver {
    fn run(
        &self,
        basis: &Basis,
        molecule: &Molecule,
        config: &ScfConfig,
    ) -> Result<Wavefunction, ScfError>;
}

/// Settings of an SCF run. Missing fields of a config file fall back to
/// [`ScfConfig::default`].
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct ScfConfig {
    /// Rebuild the two-electron integrals every iteration instead of staging
    /// them in [`ScfConfig::tei_store`] once
    pub direct: bool,
    /// the maximum number of iterations to try
    pub max_iterations: usize,
    /// if the rms of the density matrix changes by less than this, the system
    /// is considered converged
    pub epsilon: f64,
    /// where two-electron integrals are staged when not running direct
    pub tei_store: PathBuf,
    /// how many previous fock matrices DIIS extrapolates from. Extrapolation
    /// needs 5 of them, smaller values are raised to that
    pub diis_size: usize,
}

impl Default for ScfConfig {
    fn default() -> Self {
        Self {
            direct: false,
            max_iterations: 100,
            epsilon: 1e-8,
            tei_store: PathBuf::from("tei.json"),
            diis_size: 12,
        }
    }
}

/// The result of a converged SCF run
#[derive(Clone, Debug)]
#[non_exhaustive]
pub struct Wavefunction {
    pub fock: DMatrix<f64>,
    pub density: DMatrix<f64>,
    /// molecular orbital coefficients, one orbital per column
    pub coefficients: DMatrix<f64>,
    /// the orbital energies, sorted in ascending order
    pub orbital_energies: Vec<f64>,
    /// The electronic energy of the system
    pub electronic_energy: f64,
    /// The nuclear repulsion energy
    pub nuclear_repulsion: f64,
    /// After how many iterations did the system converge
    pub iterations: usize,
}

impl Wavefunction {
    pub fn total_energy(&self) -> f64 {
        self.electronic_energy + self.nuclear_repulsion
    }
}
