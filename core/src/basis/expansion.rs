use nalgebra::Vector3;
use smallvec::{smallvec, SmallVec};

use crate::error::AssemblyError;

use super::{
    database::RawShellRecord,
    shell_type::{angular_momentum_code_of, orbital_count, ShellKind},
    Shell,
};

/// Running totals threaded through one basis assembly. Every assembly owns its
/// own counters, ids are never reset between atoms.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct ShellCounters {
    /// id handed to the next emitted shell
    pub next_id: usize,
    pub n_orbitals: usize,
}

impl Default for ShellCounters {
    fn default() -> Self {
        Self {
            next_id: 1,
            n_orbitals: 0,
        }
    }
}

impl ShellCounters {
    fn emit(
        &mut self,
        angular_momentum: u32,
        coefficients: Vec<f64>,
        record: &RawShellRecord,
        atom_index: usize,
        center: Vector3<f64>,
    ) -> Shell {
        let id = self.next_id;
        self.next_id += 1;
        self.n_orbitals += orbital_count(angular_momentum);

        Shell {
            id,
            atom_index,
            exponents: record.exponents.clone(),
            coefficients,
            center,
            angular_momentum,
            is_normalized: record.normalized,
        }
    }
}

/// Turns one database record into finished shells.
///
/// Combined "L" records are split into an s shell (first coefficient column)
/// followed by a p shell (second column). Both get their own id and share
/// exponents and center. Every other record yields exactly one shell.
pub fn expand_shell(
    record: &RawShellRecord,
    atom_index: usize,
    center: Vector3<f64>,
    counters: &mut ShellCounters,
) -> Result<SmallVec<[Shell; 2]>, AssemblyError> {
    let kind = angular_momentum_code_of(&record.shell_type)?;
    validate(record, kind)?;

    let column = |index: usize| {
        record
            .coefficients
            .column(index)
            .ok_or_else(|| AssemblyError::MalformedRecord {
                key: record.index.to_string(),
                reason: format!("{kind} shell has no coefficient column {index}"),
            })
    };

    let shells = match kind {
        ShellKind::Combined => {
            let (s_column, p_column) = (column(0)?, column(1)?);

            smallvec![
                counters.emit(0, s_column, record, atom_index, center),
                counters.emit(1, p_column, record, atom_index, center),
            ]
        }
        ShellKind::Pure(l) => smallvec![counters.emit(l, column(0)?, record, atom_index, center)],
    };

    Ok(shells)
}

fn validate(record: &RawShellRecord, kind: ShellKind) -> Result<(), AssemblyError> {
    let malformed = |reason: String| AssemblyError::MalformedRecord {
        key: record.index.to_string(),
        reason,
    };

    let n_primitives = record.exponents.len();
    if n_primitives == 0 {
        return Err(malformed("record has no primitives".to_owned()));
    }
    if let Some(exponent) = record.exponents.iter().find(|&&exponent| !(exponent > 0.0)) {
        return Err(malformed(format!("exponent {exponent} is not positive")));
    }

    let expected_columns = match kind {
        ShellKind::Combined => 2,
        ShellKind::Pure(_) => 1,
    };
    if record.coefficients.n_columns() != expected_columns {
        return Err(malformed(format!(
            "{kind} shell needs {expected_columns} coefficient column(s), found {}",
            record.coefficients.n_columns()
        )));
    }
    if record.coefficients.n_rows() != n_primitives {
        return Err(malformed(format!(
            "{n_primitives} exponents but {} coefficients",
            record.coefficients.n_rows()
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::basis::database::Coefficients;

    fn record(shell_type: &str, exponents: &[f64], coefficients: Coefficients) -> RawShellRecord {
        RawShellRecord {
            index: 1,
            shell_type: shell_type.to_owned(),
            exponents: exponents.to_vec(),
            coefficients,
            normalized: false,
        }
    }

    #[test]
    fn combined_shell_is_split() {
        let center = Vector3::new(1.0, 2.0, 3.0);
        let sp = record(
            "SP",
            &[2.94, 0.68, 0.22],
            Coefficients::Combined(vec![[-0.1, 0.16], [0.4, 0.61], [0.7, 0.39]]),
        );

        let mut counters = ShellCounters {
            next_id: 7,
            n_orbitals: 10,
        };
        let shells = expand_shell(&sp, 3, center, &mut counters).unwrap();

        assert_eq!(shells.len(), 2);
        let (s, p) = (&shells[0], &shells[1]);

        assert_eq!((s.id, p.id), (7, 8));
        assert_eq!((s.angular_momentum, p.angular_momentum), (0, 1));
        assert_eq!(s.exponents, p.exponents);
        assert_eq!(s.center, center);
        assert_eq!(p.center, center);
        assert_eq!(s.atom_index, 3);
        assert_eq!(s.coefficients, [-0.1, 0.4, 0.7]);
        assert_eq!(p.coefficients, [0.16, 0.61, 0.39]);

        assert_eq!(counters.next_id, 9);
        assert_eq!(counters.n_orbitals, 10 + 1 + 3);
    }

    #[test]
    fn pure_shells() {
        let mut counters = ShellCounters::default();
        let d = record("d", &[0.8], Coefficients::Single(vec![1.0]));

        let shells = expand_shell(&d, 0, Vector3::zeros(), &mut counters).unwrap();

        assert_eq!(shells.len(), 1);
        assert_eq!(shells[0].id, 1);
        assert_eq!(shells[0].angular_momentum, 2);
        assert_eq!(shells[0].n_primitives(), 1);
        assert_eq!(counters, ShellCounters { next_id: 2, n_orbitals: 6 });
    }

    #[test]
    fn unknown_shell_type() {
        let mut counters = ShellCounters::default();
        let bad = record("Q", &[1.0], Coefficients::Single(vec![1.0]));

        assert!(matches!(
            expand_shell(&bad, 0, Vector3::zeros(), &mut counters),
            Err(AssemblyError::UnknownShellType(_))
        ));
        assert_eq!(counters, ShellCounters::default());
    }

    #[test]
    fn mismatched_coefficients() {
        let mut counters = ShellCounters::default();
        let cases = [
            record("S", &[1.0, 2.0], Coefficients::Single(vec![1.0])),
            record("S", &[1.0], Coefficients::Combined(vec![[1.0, 1.0]])),
            record("SP", &[1.0], Coefficients::Single(vec![1.0])),
            record("P", &[], Coefficients::Single(vec![])),
            record("P", &[-1.0], Coefficients::Single(vec![1.0])),
        ];

        for case in cases {
            assert!(matches!(
                expand_shell(&case, 0, Vector3::zeros(), &mut counters),
                Err(AssemblyError::MalformedRecord { .. })
            ));
        }
    }
}
