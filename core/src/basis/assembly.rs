use std::path::Path;

use crate::{
    atom::Atom,
    error::AssemblyError,
    molecule::{Molecule, MoleculeSpec},
    periodic_table::ElementType,
};

use super::{
    database::BasisDatabase,
    expansion::{expand_shell, ShellCounters},
    Basis,
};

/// Builds the molecule and its basis from a geometry given in angstrom.
///
/// The database is opened for the duration of this call only. Any error aborts
/// the whole assembly.
pub fn assemble(
    molecule_spec: &MoleculeSpec,
    basis_name: &str,
    net_charge: i32,
    database_path: impl AsRef<Path>,
) -> Result<(Molecule, Basis), AssemblyError> {
    // validate the geometry before touching the database
    molecule_spec.centers()?;

    let database = BasisDatabase::open(database_path)?;
    assemble_with(&database, molecule_spec, basis_name, net_charge)
}

/// Same as [`assemble`], reading shells from an already opened database.
pub fn assemble_with(
    database: &BasisDatabase,
    molecule_spec: &MoleculeSpec,
    basis_name: &str,
    net_charge: i32,
) -> Result<(Molecule, Basis), AssemblyError> {
    let centers = molecule_spec.centers()?;

    let mut molecule = Molecule {
        atoms: Vec::with_capacity(centers.len()),
    };
    let mut shells = Vec::new();
    let mut counters = ShellCounters::default();
    let mut n_electrons = 0_i64;

    for (atom_index, (symbol, center)) in molecule_spec.symbols.iter().zip(centers).enumerate() {
        let element_type = symbol.parse::<ElementType>()?;
        molecule.atoms.push(Atom::new(element_type, center));
        n_electrons += i64::from(element_type.atomic_number());

        let symbol = element_type.symbol();
        for record in database.read_shells(symbol, basis_name)? {
            let expanded = expand_shell(&record, atom_index, center, &mut counters).map_err(
                |err| match err {
                    AssemblyError::MalformedRecord { key, reason } => {
                        AssemblyError::MalformedRecord {
                            key: format!("{symbol}/{basis_name}/{key}"),
                            reason,
                        }
                    }
                    err => err,
                },
            )?;
            shells.extend(expanded);
        }
    }

    n_electrons -= i64::from(net_charge);

    // must be stable: integral code relies on the relative order within one
    // angular momentum
    shells.sort_by_key(|shell| shell.angular_momentum);

    let basis = Basis {
        shells,
        n_electrons,
        n_orbitals: counters.n_orbitals,
    };

    log::debug!(
        "assembled {basis_name} basis: {} atoms, {} shells, {} orbitals, {} electrons",
        molecule.len(),
        basis.len(),
        basis.n_orbitals,
        basis.n_electrons
    );

    Ok((molecule, basis))
}

/// Logs every shell of a basis as a table of primitive index, exponent and
/// contraction coefficient. Shells whose atom isn't part of `molecule` are
/// skipped.
pub fn log_shells(molecule: &Molecule, basis: &Basis) {
    for shell in basis.shells() {
        let Some(atom) = molecule.atoms().get(shell.atom_index) else {
            log::warn!(
                "shell {} belongs to atom {} outside of the molecule",
                shell.id,
                shell.atom_index + 1
            );
            continue;
        };
        log::debug!(
            "shell {:>3} on {}{:<3} l = {}",
            shell.id,
            atom.symbol(),
            shell.atom_index + 1,
            shell.angular_momentum
        );
        for (primitive, (exponent, coefficient)) in
            shell.exponents.iter().zip(&shell.coefficients).enumerate()
        {
            log::debug!("    {:>3} {exponent:>18.10} {coefficient:>14.10}", primitive + 1);
        }
    }
}
