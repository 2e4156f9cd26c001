mod assembly;
pub mod database;
mod expansion;
mod functions;
mod shell_type;

use nalgebra::Vector3;

pub use assembly::{assemble, assemble_with, log_shells};
pub use database::{BasisDatabase, Coefficients, RawShellRecord};
pub use expansion::{expand_shell, ShellCounters};
pub use functions::{BasisFunction, ContractedGaussian, Gaussian};
pub use shell_type::{angular_momentum_code_of, orbital_count, ShellKind};

/// One contracted gaussian shell of fixed angular momentum.
#[derive(Clone, Debug, PartialEq)]
pub struct Shell {
    pub(crate) id: usize,
    /// index of the owning atom in its [`crate::molecule::Molecule`]
    pub(crate) atom_index: usize,
    pub(crate) exponents: Vec<f64>,
    pub(crate) coefficients: Vec<f64>,
    /// copied from the owning atom, in bohr
    pub(crate) center: Vector3<f64>,
    pub(crate) angular_momentum: u32,
    pub(crate) is_normalized: bool,
}

impl Shell {
    pub fn id(&self) -> usize {
        self.id
    }

    pub fn atom_index(&self) -> usize {
        self.atom_index
    }

    pub fn exponents(&self) -> &[f64] {
        &self.exponents
    }

    pub fn coefficients(&self) -> &[f64] {
        &self.coefficients
    }

    pub fn center(&self) -> &Vector3<f64> {
        &self.center
    }

    pub fn angular_momentum(&self) -> u32 {
        self.angular_momentum
    }

    pub fn n_primitives(&self) -> usize {
        self.exponents.len()
    }

    pub fn n_orbitals(&self) -> usize {
        orbital_count(self.angular_momentum)
    }

    pub fn is_normalized(&self) -> bool {
        self.is_normalized
    }
}

/// The assembled basis of a molecule. Shells are grouped by ascending angular
/// momentum, within one angular momentum they keep their assignment order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Basis {
    pub(crate) shells: Vec<Shell>,
    pub(crate) n_electrons: i64,
    pub(crate) n_orbitals: usize,
}

impl Basis {
    pub fn shells(&self) -> &[Shell] {
        &self.shells
    }

    pub fn len(&self) -> usize {
        self.shells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shells.is_empty()
    }

    /// Sum of atomic numbers minus the net charge of the molecule
    pub fn n_electrons(&self) -> i64 {
        self.n_electrons
    }

    /// Number of cartesian basis functions spanned by all shells
    pub fn n_orbitals(&self) -> usize {
        self.n_orbitals
    }

    /// All cartesian basis functions, in shell order
    pub fn basis_functions(&self) -> Vec<BasisFunction> {
        self.shells
            .iter()
            .flat_map(Shell::basis_functions)
            .collect()
    }
}
