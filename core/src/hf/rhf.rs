use nalgebra::DMatrix;

use crate::{
    basis::{Basis, BasisFunction},
    diis::Diis,
    error::ScfError,
    integrals::{
        compute_kinetic_matrix, compute_nuclear_matrix, compute_overlap_matrix,
        DefaultIntegrator, ElectronTensor, TeiStore,
    },
    molecule::Molecule,
    parallel::{ProcessGroup, SingleProcess},
};

use super::{utils, ScfConfig, ScfDriver, Wavefunction, TEI_KEY};

/// Closed shell hartree fock. Every rank of the process group runs the full
/// calculation, only the root rank evaluates staged integrals and narrates.
#[derive(Clone, Debug, Default)]
pub struct RestrictedHartreeFock<G: ProcessGroup = SingleProcess> {
    group: G,
}

impl RestrictedHartreeFock {
    /// A driver that doesn't cooperate with other processes
    pub fn single_process() -> Self {
        Self::new(SingleProcess)
    }
}

impl<G: ProcessGroup> RestrictedHartreeFock<G> {
    pub fn new(group: G) -> Self {
        Self { group }
    }

    pub fn group(&self) -> &G {
        &self.group
    }

    /// Evaluates the electron tensor on the root rank and stages it in the
    /// store. Every rank waits for the write before reading it back.
    fn staged_electron_tensor(
        &self,
        basis: &[BasisFunction],
        integrator: &DefaultIntegrator,
        store: &TeiStore,
    ) -> Result<ElectronTensor, ScfError> {
        let written = if self.group.is_root() {
            let tensor = ElectronTensor::from_basis(basis, integrator);
            store.write(TEI_KEY, &tensor)
        } else {
            Ok(())
        };

        // reached by every rank, even if the write failed
        self.group.barrier();
        written?;

        Ok(store.read(TEI_KEY)?)
    }
}

impl<G: ProcessGroup> ScfDriver for RestrictedHartreeFock<G> {
    fn run(
        &self,
        basis: &Basis,
        molecule: &Molecule,
        config: &ScfConfig,
    ) -> Result<Wavefunction, ScfError> {
        if basis.is_empty() {
            return Err(ScfError::EmptyBasis);
        }

        let n_electrons = basis.n_electrons();
        if n_electrons < 0 || n_electrons % 2 != 0 {
            return Err(ScfError::OpenShell(n_electrons));
        }
        let n_occupied = n_electrons as usize / 2;

        // exchangable integrator
        let integrator = DefaultIntegrator::default();
        let functions = basis.basis_functions();
        let n_basis = functions.len();

        if n_occupied > n_basis {
            return Err(ScfError::InsufficientOrbitals {
                occupied: n_occupied,
                n_basis,
            });
        }

        let narrate = self.group.is_root();
        let nuclear_repulsion = molecule.nuclear_repulsion();
        if narrate {
            log::debug!("nuclear repulsion energy: {nuclear_repulsion}");
        }

        let overlap = compute_overlap_matrix(&functions, &integrator);
        let kinetic = compute_kinetic_matrix(&functions, &integrator);
        let nuclear = compute_nuclear_matrix(&functions, molecule.atoms(), &integrator);

        let staged = if config.direct {
            None
        } else {
            let store = TeiStore::new(&config.tei_store);
            Some(self.staged_electron_tensor(&functions, &integrator, &store)?)
        };
        let electronic_hamiltonian = |density: &DMatrix<f64>| match &staged {
            Some(electron) => compute_electronic_hamiltonian(density, electron),
            None => {
                let electron = ElectronTensor::from_basis(&functions, &integrator);
                compute_electronic_hamiltonian(density, &electron)
            }
        };

        let core_hamiltonian = kinetic + nuclear;
        let transform = utils::symmetric_orthogonalization(&overlap);
        let mut density =
            compute_hückel_density(&core_hamiltonian, &overlap, &transform, n_occupied);

        // start of scf iteration
        let mut diis = Diis::new(config.diis_size);
        for iteration in 1..=config.max_iterations {
            let fock = &core_hamiltonian + electronic_hamiltonian(&density);
            let error = &fock * &density * &overlap - &overlap * &density * &fock;

            let fock = diis.fock(error, fock).ok_or(ScfError::Diis)?;
            let transformed_fock = transform.transpose() * (&fock * &transform);
            let (transformed_coefficients, orbital_energies) = utils::sorted_eigs(transformed_fock);
            let coefficients = &transform * transformed_coefficients;

            let new_density = compute_updated_density(&coefficients, n_occupied);
            let density_rms = (&new_density - &density).norm() / n_basis as f64;
            density = new_density;

            if narrate {
                log::info!("iteration {iteration:<4} - density rms {density_rms:1.4e}");
            }

            if density_rms < config.epsilon {
                let electron_terms = electronic_hamiltonian(&density);
                let electronic_energy =
                    0.5 * (&density * (2.0 * &core_hamiltonian + &electron_terms)).trace();
                let fock = &core_hamiltonian + electron_terms;

                if narrate {
                    log::info!(
                        "converged after {iteration} iterations - electronic energy {electronic_energy:1.8}"
                    );
                }

                return Ok(Wavefunction {
                    fock,
                    density,
                    coefficients,
                    orbital_energies: orbital_energies.as_slice().to_vec(),
                    electronic_energy,
                    nuclear_repulsion,
                    iterations: iteration,
                });
            }
        }

        Err(ScfError::NotConverged {
            iterations: config.max_iterations,
        })
    }
}

fn compute_hückel_density(
    hamiltonian: &DMatrix<f64>,
    overlap: &DMatrix<f64>,
    transform: &DMatrix<f64>,
    n_occupied: usize,
) -> DMatrix<f64> {
    const WOLFSBERG_HELMHOLTZ: f64 = 1.75;
    let hamiltonian_eht = utils::symmetric_matrix(hamiltonian.nrows(), |i, j| {
        WOLFSBERG_HELMHOLTZ * overlap[(i, j)] * (hamiltonian[(i, i)] + hamiltonian[(j, j)]) / 2.0
    });

    let transformed = transform.transpose() * (hamiltonian_eht * transform);
    let (coeffs_prime, _orbital_energies) = utils::sorted_eigs(transformed);
    let coeffs = transform * coeffs_prime;

    compute_updated_density(&coeffs, n_occupied)
}

/// Two electron part of the fock matrix: G_ij = sum_kl D_kl [(ij|kl) - 1/2 (ik|jl)]
fn compute_electronic_hamiltonian(
    density: &DMatrix<f64>,
    electron: &ElectronTensor,
) -> DMatrix<f64> {
    let n_basis = density.nrows();
    utils::symmetric_matrix(n_basis, |i, j| {
        let mut sum = 0.0;
        for (k, l) in itertools::iproduct!(0..n_basis, 0..n_basis) {
            sum += density[(k, l)] * (electron[(i, j, k, l)] - 0.5 * electron[(i, k, j, l)]);
        }
        sum
    })
}

fn compute_updated_density(coefficients: &DMatrix<f64>, n_occupied: usize) -> DMatrix<f64> {
    utils::symmetric_matrix(coefficients.nrows(), |i, j| {
        let mut sum = 0.0;
        for k in 0..n_occupied {
            sum += coefficients[(i, k)] * coefficients[(j, k)]
        }
        2.0 * sum
    })
}
