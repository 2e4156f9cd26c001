use serde::Deserialize;

use crate::molecule::MoleculeSpec;

/// Represents a molecule in a config file: element symbols, a flat list of
/// coordinates in angstrom and the net charge.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct ConfigMolecule {
    #[serde(flatten)]
    pub geometry: MoleculeSpec,
    #[serde(default)]
    pub charge: i32,
}
