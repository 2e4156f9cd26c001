use std::ops::Index;

use serde::{Deserialize, Serialize};

use crate::basis::BasisFunction;

use super::Integrator;

/// Integrals whose cauchy-schwarz bound falls below this are not evaluated
const SCREENING_THRESHOLD: f64 = 1e-12;

/// An integral index used in the two-electron integrals of a basis set.
///
/// The index represents the four indices (x, y, z, w) used to calculate a two-electron integral:
///   int_{x,y,z,w} = int_{xy|zw} = <x y | z w>
///
/// Two-electron integrals are invariant under x <-> y, z <-> w and (xy) <-> (zw), so this
/// struct stores its indices in canonical order: x >= y, z >= w and xy >= zw.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub(crate) struct IntegralIndex(usize, usize, usize, usize);

impl IntegralIndex {
    /// Creates a new integral index with the given indices.
    pub(crate) const fn new(index: (usize, usize, usize, usize)) -> Self {
        let (i, j, k, l) = Self::correct_order(index);
        Self(i, j, k, l)
    }

    /// Returns the indices in canonical order
    #[inline(always)]
    const fn correct_order(
        (i, j, k, l): (usize, usize, usize, usize),
    ) -> (usize, usize, usize, usize) {
        let (i, j) = if i >= j { (i, j) } else { (j, i) };
        let (k, l) = if k >= l { (k, l) } else { (l, k) };

        if pair(i, j) >= pair(k, l) {
            (i, j, k, l)
        } else {
            (k, l, i, j)
        }
    }

    /// Position of this (canonical) index in packed storage
    #[inline(always)]
    pub(crate) const fn linear(&self) -> usize {
        let &Self(i, j, k, l) = self;
        pair(pair(i, j), pair(k, l))
    }
}

/// Packed index of the unordered pair (i, j), expects i >= j
#[inline(always)]
const fn pair(i: usize, j: usize) -> usize {
    i * (i + 1) / 2 + j
}

impl std::fmt::Display for IntegralIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let &Self(i, j, k, l) = self;
        write!(f, "({} {}|{} {})", i, j, k, l)
    }
}

/// An electron tensor representing electron-electron repulsion integrals between
/// four contracted Gaussian functions in a given basis set. Only symmetry unique
/// integrals are stored.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ElectronTensor {
    data: Vec<f64>,
    /// side length
    size: usize,
}

impl ElectronTensor {
    /// Computes all symmetry unique electron repulsion integrals of `basis`.
    ///
    /// The diagonal (xy|xy) integrals are evaluated first and used to skip every
    /// integral whose cauchy-schwarz bound is negligible. With the `rayon` feature
    /// the remaining integrals are evaluated in parallel.
    pub fn from_basis(
        basis: &[BasisFunction],
        integrator: &(impl Integrator<Item = BasisFunction> + Sync),
    ) -> Self {
        let n_basis = basis.len();
        let n_pairs = n_basis * (n_basis + 1) / 2;
        let mut data = vec![0.0; n_pairs * (n_pairs + 1) / 2];

        // compute diagonal first - we need these entries for screening
        for i in 0..n_basis {
            for j in 0..=i {
                let index = IntegralIndex(i, j, i, j);
                data[index.linear()] =
                    integrator.electron_repulsion((&basis[i], &basis[j], &basis[i], &basis[j]));
            }
        }

        let mut to_compute = Vec::with_capacity(data.len().saturating_sub(n_pairs));
        let mut n_screened = 0usize;

        for i in 0..n_basis {
            for j in 0..=i {
                for k in 0..=i {
                    let l_max = if k == i { j } else { k };
                    for l in 0..=l_max {
                        // skip diagonal
                        if (k, l) == (i, j) {
                            continue;
                        }

                        let index = IntegralIndex(i, j, k, l);
                        if cauchy_schwarz_estimate(&data, index) < SCREENING_THRESHOLD {
                            n_screened += 1;
                            continue;
                        }
                        to_compute.push(index);
                    }
                }
            }
        }

        log::debug!(
            "evaluating {} electron repulsion integrals, {n_screened} screened",
            to_compute.len() + n_pairs
        );

        #[cfg(feature = "rayon")]
        {
            use rayon::{iter::ParallelIterator, slice::ParallelSlice};

            to_compute
                .par_chunks(512)
                .map(|indices| {
                    let mut output = Vec::with_capacity(indices.len());
                    for index @ &IntegralIndex(x, y, z, w) in indices {
                        let integral = integrator
                            .electron_repulsion((&basis[x], &basis[y], &basis[z], &basis[w]));

                        log::trace!("ERI {index} = {integral:<1.8}");
                        output.push((index.linear(), integral))
                    }
                    output
                })
                .collect::<Vec<_>>() // iterators are lazy - we collect to evaluate all elements
                .into_iter()
                .flatten()
                .for_each(|(index, integral)| data[index] = integral);
        }

        #[cfg(not(feature = "rayon"))]
        to_compute
            .into_iter()
            .for_each(|index @ IntegralIndex(x, y, z, w)| {
                let integral =
                    integrator.electron_repulsion((&basis[x], &basis[y], &basis[z], &basis[w]));

                log::trace!("ERI {index} = {integral:<1.8}");
                data[index.linear()] = integral;
            });

        Self {
            data,
            size: n_basis,
        }
    }

    /// Number of basis functions along each side
    pub fn size(&self) -> usize {
        self.size
    }

    /// Number of stored, symmetry unique integrals
    pub fn n_unique(&self) -> usize {
        self.data.len()
    }
}

fn cauchy_schwarz_estimate(data: &[f64], IntegralIndex(x, y, z, w): IntegralIndex) -> f64 {
    let diagonal_xy = IntegralIndex(x, y, x, y);
    let diagonal_zw = IntegralIndex(z, w, z, w);

    f64::sqrt((data[diagonal_xy.linear()] * data[diagonal_zw.linear()]).abs())
}

impl Index<(usize, usize, usize, usize)> for ElectronTensor {
    type Output = f64;

    fn index(&self, index: (usize, usize, usize, usize)) -> &Self::Output {
        &self[IntegralIndex::new(index)]
    }
}

impl Index<IntegralIndex> for ElectronTensor {
    type Output = f64;

    fn index(&self, index: IntegralIndex) -> &Self::Output {
        &self.data[index.linear()]
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use nalgebra::Vector3;

    use super::*;
    use crate::{
        basis::{assemble_with, BasisDatabase},
        integrals::DefaultIntegrator,
        molecule::MoleculeSpec,
    };

    fn water_basis() -> Vec<BasisFunction> {
        let path = concat!(env!("CARGO_MANIFEST_DIR"), "/../data/basis.json");
        let database = BasisDatabase::open(path).unwrap();
        let spec = MoleculeSpec::new(
            ["O", "H", "H"],
            [0.0, -0.0757, 0.0, 0.866, 0.601, 0.0, -0.866, 0.601, 0.0],
        );
        let (_, basis) = assemble_with(&database, &spec, "sto-3g", 0).unwrap();
        basis.basis_functions()
    }

    #[test]
    fn canonical_order() {
        let reference = IntegralIndex::new((3, 1, 2, 0));
        assert_eq!(reference, IntegralIndex(3, 1, 2, 0));

        for permutation in [(1, 3, 2, 0), (3, 1, 0, 2), (2, 0, 3, 1), (0, 2, 1, 3)] {
            assert_eq!(IntegralIndex::new(permutation), reference);
        }
    }

    #[test]
    fn packed_indices_are_dense() {
        let n = 4;
        let mut seen = Vec::new();
        for (i, j, k, l) in itertools::iproduct!(0..n, 0..n, 0..n, 0..n) {
            seen.push(IntegralIndex::new((i, j, k, l)).linear());
        }
        seen.sort_unstable();
        seen.dedup();

        let n_pairs = n * (n + 1) / 2;
        assert_eq!(seen, (0..n_pairs * (n_pairs + 1) / 2).collect::<Vec<_>>());
    }

    #[test]
    fn tensor_matches_direct_evaluation() {
        let basis = water_basis();
        let integrator = DefaultIntegrator::default();
        let tensor = ElectronTensor::from_basis(&basis, &integrator);

        assert_eq!(tensor.size(), 7);
        assert_eq!(tensor.n_unique(), 28 * 29 / 2);

        for (i, j, k, l) in [(0, 0, 0, 0), (1, 0, 4, 2), (6, 5, 3, 3), (2, 2, 6, 5)] {
            let direct =
                integrator.electron_repulsion((&basis[i], &basis[j], &basis[k], &basis[l]));
            assert_relative_eq!(tensor[(i, j, k, l)], direct, epsilon = 1e-10);
            assert_relative_eq!(tensor[(l, k, j, i)], direct, epsilon = 1e-10);
        }
    }

    #[test]
    fn distant_pairs_are_screened() {
        let far = |x: f64| BasisFunction {
            contracted_gaussian: crate::basis::ContractedGaussian(smallvec::smallvec![
                crate::basis::Gaussian {
                    exponent: 5.0,
                    coefficient: 1.0,
                    angular: (0, 0, 0),
                }
            ]),
            position: Vector3::new(x, 0.0, 0.0),
            shell_id: 1,
        };
        let basis = [far(0.0), far(40.0)];
        let tensor = ElectronTensor::from_basis(&basis, &DefaultIntegrator::default());

        assert!(tensor[(0, 0, 0, 0)] > 0.0);
        assert_eq!(tensor[(1, 0, 1, 1)], 0.0);
    }
}
