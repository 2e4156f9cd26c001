use nalgebra::Vector3;

use crate::periodic_table::ElementType;

/// Represents an atom in a molecule.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Atom {
    /// position of the nucleus, in bohr
    pub(crate) center: Vector3<f64>,
    pub(crate) element_type: ElementType,
}

impl Atom {
    pub(crate) fn new(element_type: ElementType, center: Vector3<f64>) -> Self {
        Self {
            center,
            element_type,
        }
    }

    /// Returns the charge of this nucleus
    pub fn nuclear_charge(&self) -> i32 {
        self.element_type as i32
    }

    pub fn atomic_number(&self) -> u32 {
        self.element_type.atomic_number()
    }

    pub fn symbol(&self) -> &'static str {
        self.element_type.symbol()
    }

    pub fn element_type(&self) -> ElementType {
        self.element_type
    }

    /// Position of the nucleus in atomic units (bohr)
    pub fn center(&self) -> &Vector3<f64> {
        &self.center
    }
}
