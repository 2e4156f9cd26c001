mod molecule;

use std::{
    path::{Path, PathBuf},
    str::FromStr,
};

use serde::Deserialize;

pub use molecule::ConfigMolecule;

use crate::{
    basis::{assemble, Basis},
    error::AssemblyError,
    hf::ScfConfig,
    molecule::Molecule,
};

/// One calculation as described by a job file:
///
/// ```json
/// { "molecule": { "symbols": ["H", "H"], "coordinates": [0, 0, 0, 0, 0, 0.74], "charge": 0 },
///   "basis": "sto-3g",
///   "scf": { "direct": true, "max_iterations": 50 } }
/// ```
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct JobConfig {
    pub molecule: ConfigMolecule,
    pub basis: String,
    /// basis database to read shells from, overrides the caller's default
    #[serde(default)]
    pub database: Option<PathBuf>,
    #[serde(default)]
    pub scf: ScfConfig,
}

impl JobConfig {
    /// Assembles the molecule and basis of this job. `default_database` is used
    /// unless the job names its own database.
    pub fn assemble(&self, default_database: &Path) -> Result<(Molecule, Basis), AssemblyError> {
        let database = self.database.as_deref().unwrap_or(default_database);
        assemble(
            &self.molecule.geometry,
            &self.basis,
            self.molecule.charge,
            database,
        )
    }
}

impl FromStr for JobConfig {
    type Err = serde_json::Error;

    fn from_str(json: &str) -> Result<Self, Self::Err> {
        serde_json::from_str(json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scf_settings_fall_back_to_defaults() {
        let job: JobConfig = r#"{
            "molecule": { "symbols": ["H", "H"], "coordinates": [0, 0, 0, 0, 0, 0.74] },
            "basis": "sto-3g",
            "scf": { "direct": true, "max_iterations": 50 }
        }"#
        .parse()
        .unwrap();

        assert_eq!(job.molecule.geometry.symbols, ["H", "H"]);
        assert_eq!(job.molecule.charge, 0);
        assert_eq!(job.database, None);
        assert!(job.scf.direct);
        assert_eq!(job.scf.max_iterations, 50);
        assert_eq!(job.scf.epsilon, ScfConfig::default().epsilon);
    }

    #[test]
    fn missing_scf_section() {
        let job: JobConfig = r#"{
            "molecule": { "symbols": ["O", "H", "H"], "coordinates": [0, 0, 0, 0, 0.75, 0.585, 0, -0.75, 0.585], "charge": 1 },
            "basis": "6-31G",
            "database": "elsewhere.json"
        }"#
        .parse()
        .unwrap();

        assert_eq!(job.molecule.charge, 1);
        assert_eq!(job.scf, ScfConfig::default());
        assert_eq!(job.database, Some(PathBuf::from("elsewhere.json")));
    }

    #[test]
    fn job_assembles_from_bundled_database() {
        let job: JobConfig = r#"{
            "molecule": { "symbols": ["H", "H"], "coordinates": [0, 0, 0, 0, 0, 0.74] },
            "basis": "STO-3G"
        }"#
        .parse()
        .unwrap();

        let database = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../data/basis.json");
        let (molecule, basis) = job.assemble(&database).unwrap();
        assert_eq!(molecule.len(), 2);
        assert_eq!(basis.len(), 2);
        assert_eq!(basis.n_electrons(), 2);
    }

    #[test]
    fn rejects_malformed_jobs() {
        assert!("{ \"basis\": \"sto-3g\" }".parse::<JobConfig>().is_err());
        assert!("{ \"molecule\": { \"symbols\": [] }, \"basis\": \"sto-3g\" }"
            .parse::<JobConfig>()
            .is_err());
    }
}
