use std::{
    fs,
    path::{Path, PathBuf},
    time::Instant,
};

use anyhow::Context;
use clap::{ArgAction, Parser, Subcommand};
use rhf_core::{
    basis::log_shells, config::JobConfig, parallel::ProcessGroup, RestrictedHartreeFock,
    ScfDriver, Wavefunction,
};

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: RhfCommand,

    /// Log at debug level unless RUST_LOG says otherwise
    #[arg(long, short, action = ArgAction::SetTrue, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum RhfCommand {
    /// Run a restricted hartree fock calculation
    #[command(name = "rhf")]
    RestrictedHartreeFock {
        /// A path to the job file describing molecule, basis and scf settings
        job: PathBuf,
        /// The basis set database, unless the job file names one
        #[arg(long, short, default_value = "data/basis.json")]
        database: PathBuf,
        /// Recompute two-electron integrals every iteration instead of staging them
        #[arg(long)]
        direct: bool,
        /// The maximum number of iterations the SCF loop should attempt before the
        /// system is considered to not converge
        #[arg(long)]
        max_iterations: Option<usize>,
        /// if the rms of the density matrix drops below this, the system is considered
        /// converged
        #[arg(long)]
        epsilon: Option<f64>,
        /// Where to stage two-electron integrals
        #[arg(long)]
        tei_store: Option<PathBuf>,
    },
    /// Assemble the basis of a job and report its size
    #[command(name = "assemble")]
    Assemble {
        job: PathBuf,
        #[arg(long, short, default_value = "data/basis.json")]
        database: PathBuf,
    },
}

fn load_job(path: &Path) -> anyhow::Result<JobConfig> {
    let json = fs::read_to_string(path)
        .with_context(|| format!("could not read job file {}", path.display()))?;
    let job: JobConfig = json
        .parse()
        .with_context(|| format!("invalid job file {}", path.display()))?;

    log::debug!("loaded job {}: {} basis", path.display(), job.basis);
    Ok(job)
}

fn main() -> anyhow::Result<()> {
    let args: Args = Args::parse();

    let default_filter = if args.verbose { "debug" } else { "info" };
    pretty_env_logger::formatted_builder()
        .parse_filters(&std::env::var("RUST_LOG").unwrap_or_else(|_| default_filter.to_owned()))
        .init();

    match args.command {
        RhfCommand::RestrictedHartreeFock {
            job,
            database,
            direct,
            max_iterations,
            epsilon,
            tei_store,
        } => {
            let mut job = load_job(&job)?;
            job.scf.direct |= direct;
            if let Some(max_iterations) = max_iterations {
                job.scf.max_iterations = max_iterations;
            }
            if let Some(epsilon) = epsilon {
                job.scf.epsilon = epsilon;
            }
            if let Some(tei_store) = tei_store {
                job.scf.tei_store = tei_store;
            }

            // every rank of an mpi job assembles the same basis, only the root
            // stages integrals and reports
            #[cfg(feature = "mpi")]
            let driver = RestrictedHartreeFock::new(
                rhf_core::parallel::MpiGroup::initialize().context("mpi is already initialized")?,
            );
            #[cfg(not(feature = "mpi"))]
            let driver = RestrictedHartreeFock::single_process();
            let is_root = driver.group().is_root();

            let (molecule, basis) = job
                .assemble(&database)
                .with_context(|| format!("could not assemble {} basis", job.basis))?;
            if is_root {
                log_shells(&molecule, &basis);
            }

            let start = Instant::now();
            let output = driver
                .run(&basis, &molecule, &job.scf)
                .context("hartree fock failed")?;
            if !is_root {
                return Ok(());
            }

            let Wavefunction {
                ref orbital_energies,
                electronic_energy,
                nuclear_repulsion,
                iterations,
                ..
            } = output;

            println!(
                "hartree fock converged after {iterations} iterations and {:0.2?}",
                start.elapsed()
            );
            println!("electronic energy: {electronic_energy:3.8}");
            println!("nuclear repulsion energy: {nuclear_repulsion:3.8}");
            println!("hartree fock energy: {:3.8}", output.total_energy());
            println!("orbital energies: {orbital_energies:3.5?}");
        }

        RhfCommand::Assemble { job, database } => {
            let job = load_job(&job)?;
            let (molecule, basis) = job
                .assemble(&database)
                .with_context(|| format!("could not assemble {} basis", job.basis))?;
            log_shells(&molecule, &basis);

            println!("atoms: {}", molecule.len());
            println!("shells: {}", basis.len());
            println!("orbitals: {}", basis.n_orbitals());
            println!("electrons: {}", basis.n_electrons());
        }
    }

    Ok(())
}
