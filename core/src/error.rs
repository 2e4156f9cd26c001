use std::path::PathBuf;

use thiserror::Error;

use crate::integrals::store::StoreError;

/// Errors raised while assembling a basis. Any of them aborts the whole
/// assembly; no partial basis is ever returned.
#[derive(Debug, Error)]
pub enum AssemblyError {
    #[error("unknown element symbol `{0}`")]
    UnknownElement(String),

    #[error("unknown shell type `{0}`")]
    UnknownShellType(String),

    #[error("basis `{basis_name}` not found for element {symbol}")]
    BasisNotFound { symbol: String, basis_name: String },

    #[error("basis database {} is unavailable", path.display())]
    DatabaseUnavailable {
        path: PathBuf,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("malformed shell record {key}: {reason}")]
    MalformedRecord { key: String, reason: String },

    #[error("got {coordinates} coordinates for {atoms} atoms, expected x, y, z per atom")]
    GeometryMismatch { coordinates: usize, atoms: usize },
}

/// Errors raised by an SCF driver.
#[derive(Debug, Error)]
pub enum ScfError {
    #[error("the basis contains no shells")]
    EmptyBasis,

    #[error("restricted hartree fock needs an even, non-negative number of electrons, got {0}")]
    OpenShell(i64),

    #[error("{occupied} doubly occupied orbitals do not fit into {n_basis} basis functions")]
    InsufficientOrbitals { occupied: usize, n_basis: usize },

    #[error("scf did not converge after {iterations} iterations")]
    NotConverged { iterations: usize },

    #[error("DIIS extrapolation failed, the error matrix is singular")]
    Diis,

    #[error("two-electron integral store: {0}")]
    Store(#[from] StoreError),
}
