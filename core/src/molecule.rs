use nalgebra::Vector3;
use serde::Deserialize;

use crate::{atom::Atom, error::AssemblyError};

/// One bohr, in angstrom.
pub const BOHR_IN_ANGSTROM: f64 = 0.52917724924;

/// Factor converting angstrom to atomic units of length.
pub const ANGSTROM_TO_BOHR: f64 = 1.0 / BOHR_IN_ANGSTROM;

/// The geometry of a molecule as it is handed to the basis assembly: a flat
/// list of x, y, z triples in angstrom and a parallel list of element symbols.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct MoleculeSpec {
    pub symbols: Vec<String>,
    pub coordinates: Vec<f64>,
}

impl MoleculeSpec {
    pub fn new(
        symbols: impl IntoIterator<Item = impl Into<String>>,
        coordinates: impl Into<Vec<f64>>,
    ) -> Self {
        Self {
            symbols: symbols.into_iter().map(Into::into).collect(),
            coordinates: coordinates.into(),
        }
    }

    pub fn n_atoms(&self) -> usize {
        self.symbols.len()
    }

    /// Groups the flat coordinate list into one vector per atom and converts
    /// every component to bohr. Input order is preserved.
    pub(crate) fn centers(&self) -> Result<Vec<Vector3<f64>>, AssemblyError> {
        let n_atoms = self.symbols.len();
        if self.coordinates.len() != 3 * n_atoms {
            return Err(AssemblyError::GeometryMismatch {
                coordinates: self.coordinates.len(),
                atoms: n_atoms,
            });
        }

        Ok(self
            .coordinates
            .chunks_exact(3)
            .map(|xyz| Vector3::from_column_slice(xyz) * ANGSTROM_TO_BOHR)
            .collect())
    }
}

/// Represents a molecule. Atoms keep the order they were given in, their index
/// is what shells refer back to.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Molecule {
    pub(crate) atoms: Vec<Atom>,
}

impl Molecule {
    pub fn atoms(&self) -> &[Atom] {
        &self.atoms
    }

    pub fn len(&self) -> usize {
        self.atoms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.atoms.is_empty()
    }

    /// Classical repulsion energy between all pairs of nuclei
    pub fn nuclear_repulsion(&self) -> f64 {
        let n_atoms = self.atoms.len();

        let mut potential = 0.0;
        for atom_a in 0..n_atoms {
            for atom_b in atom_a + 1..n_atoms {
                let (a, b) = (&self.atoms[atom_a], &self.atoms[atom_b]);
                potential += (a.nuclear_charge() * b.nuclear_charge()) as f64
                    / (b.center - a.center).norm()
            }
        }
        potential
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use nalgebra::Vector3;

    use super::*;
    use crate::periodic_table::ElementType;

    #[test]
    fn centers_are_converted_to_bohr() {
        let spec = MoleculeSpec::new(["H", "H"], [0.0, 0.0, 0.0, 0.0, 0.0, 1.4]);
        let centers = spec.centers().unwrap();

        assert_eq!(centers.len(), 2);
        assert_eq!(centers[0], Vector3::zeros());
        assert_relative_eq!(centers[1].z, 1.4 / 0.52917724924, max_relative = 1e-12);
    }

    #[test]
    fn conversion_round_trips() {
        let coordinates = vec![0.1, -2.5, 3.75, 1e-3, 12.0, -0.333];
        let spec = MoleculeSpec::new(["O", "H"], coordinates.clone());

        let back = spec
            .centers()
            .unwrap()
            .iter()
            .flat_map(|center| (center * BOHR_IN_ANGSTROM).iter().copied().collect::<Vec<_>>())
            .collect::<Vec<_>>();

        for (original, back) in coordinates.iter().zip(&back) {
            assert_relative_eq!(original, back, max_relative = 1e-9);
        }
    }

    #[test]
    fn mismatched_geometry() {
        let spec = MoleculeSpec::new(["H", "H"], [0.0, 0.0, 0.0, 1.0]);
        assert!(matches!(
            spec.centers(),
            Err(AssemblyError::GeometryMismatch {
                coordinates: 4,
                atoms: 2
            })
        ));
    }

    #[test]
    fn nuclear_repulsion_of_h2() {
        let molecule = Molecule {
            atoms: vec![
                Atom::new(ElementType::H, Vector3::zeros()),
                Atom::new(ElementType::H, Vector3::new(0.0, 0.0, 1.4)),
            ],
        };

        assert_relative_eq!(molecule.nuclear_repulsion(), 1.0 / 1.4, epsilon = 1e-12);
    }
}
