use nalgebra::Vector3;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use super::Shell;

/// Function of the form K*x^i*y^j*z^k*exp(-alpha*x^2)
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Gaussian {
    pub exponent: f64,
    /// The coefficient of this gaussian and optionally the normalization constant
    pub coefficient: f64,
    /// (i, j, k) exponents of polynomial terms
    pub angular: (i32, i32, i32),
}

impl Gaussian {
    pub fn norm(exponent: f64, angular: (i32, i32, i32)) -> f64 {
        let (i, j, k) = angular;

        (std::f64::consts::FRAC_2_PI * exponent)
            .powi(3)
            .sqrt()
            .sqrt()
            * f64::sqrt(
                (8.0 * exponent).powi(i + j + k)
                    / ((i + 1..=2 * i).product::<i32>()
                        * (j + 1..=2 * j).product::<i32>()
                        * (k + 1..=2 * k).product::<i32>()) as f64,
            )
    }
}

/// Linear combination of many [`Gaussian`]s
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ContractedGaussian(pub SmallVec<[Gaussian; 6]>);

impl ContractedGaussian {
    /// Rescales the coefficients so that the contracted function has unit norm.
    /// Expects every primitive to already carry its own normalization constant.
    fn normalize(&mut self) {
        let ContractedGaussian(primitives) = self;
        let Some(&Gaussian { angular, .. }) = primitives.first() else {
            return;
        };
        let (i, j, k) = angular;
        let total = (i + j + k) as f64;

        let mut self_overlap = 0.0;
        for (a, b) in itertools::iproduct!(primitives.iter(), primitives.iter()) {
            // overlap of two normalized primitives with identical angular parts,
            // the coefficients carry the primitive norms already
            let ratio = 2.0 * (a.exponent * b.exponent).sqrt() / (a.exponent + b.exponent);
            let norms = Gaussian::norm(a.exponent, angular) * Gaussian::norm(b.exponent, angular);
            self_overlap += a.coefficient * b.coefficient * ratio.powf(total + 1.5) / norms;
        }

        let scale = self_overlap.sqrt().recip();
        for primitive in primitives.iter_mut() {
            primitive.coefficient *= scale;
        }
    }
}

/// A single cartesian component of a shell, placed in space
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BasisFunction {
    pub contracted_gaussian: ContractedGaussian,
    /// The position of this basis function, in natural units
    pub position: Vector3<f64>,
    /// id of the shell this function belongs to
    pub shell_id: usize,
}

impl BasisFunction {
    /// Evaluate this basis function at a given position
    pub fn evaluate(&self, at: Vector3<f64>) -> f64 {
        let diff = at - self.position;
        let ContractedGaussian(primitives) = &self.contracted_gaussian;

        primitives
            .iter()
            .map(|&Gaussian { exponent, coefficient, angular: (i, j, k) }| {
                coefficient
                    * diff.x.powi(i)
                    * diff.y.powi(j)
                    * diff.z.powi(k)
                    * (-exponent * diff.norm_squared()).exp()
            })
            .sum()
    }
}

impl Shell {
    /// Expands this shell into its cartesian basis functions.
    ///
    /// Shells that aren't flagged as normalized get normalized primitives and a
    /// normalized contraction, otherwise the stored coefficients are used as is.
    pub fn basis_functions(&self) -> impl Iterator<Item = BasisFunction> + '_ {
        generate_angular_vectors(self.angular_momentum as i32)
            .into_iter()
            .map(move |angular| {
                let primitives = self
                    .exponents
                    .iter()
                    .zip(&self.coefficients)
                    .map(|(&exponent, &coefficient)| Gaussian {
                        exponent,
                        coefficient: if self.is_normalized {
                            coefficient
                        } else {
                            coefficient * Gaussian::norm(exponent, angular)
                        },
                        angular,
                    })
                    .collect();

                let mut contracted_gaussian = ContractedGaussian(primitives);
                if !self.is_normalized {
                    contracted_gaussian.normalize();
                }

                BasisFunction {
                    contracted_gaussian,
                    position: self.center,
                    shell_id: self.id,
                }
            })
    }
}

// generate all (i, j, k) such that i + j + k = angular
fn generate_angular_vectors(angular_magnitude: i32) -> Vec<(i32, i32, i32)> {
    let mut angular_vectors = Vec::with_capacity(8);

    for (i, j, k) in itertools::iproduct!(
        (0..=angular_magnitude).rev(),
        (0..=angular_magnitude).rev(),
        0..=angular_magnitude
    ) {
        if i + j + k == angular_magnitude {
            angular_vectors.push((i, j, k));
        }
    }

    angular_vectors
}
