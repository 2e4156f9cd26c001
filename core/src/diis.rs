use nalgebra::{DMatrix, DVector};
use std::collections::VecDeque;

/// Number of samples collected before extrapolation starts
const MIN_SAMPLES: usize = 5;

struct Sample {
    error: DMatrix<f64>,
    fock: DMatrix<f64>,
}

/// Pulay's direct inversion in the iterative subspace
pub(crate) struct Diis {
    /// most recent first
    previous_samples: VecDeque<Sample>,
    max_samples: usize,
}

impl Diis {
    /// Keeps at most `max_samples` samples, but never fewer than the
    /// extrapolation needs
    pub fn new(max_samples: usize) -> Self {
        Self {
            previous_samples: VecDeque::with_capacity(max_samples.max(MIN_SAMPLES)),
            max_samples: max_samples.max(MIN_SAMPLES),
        }
    }

    /// Records a new (error, fock) pair and returns the extrapolated fock matrix.
    /// Returns `None` if the extrapolation equations are singular.
    pub fn fock(&mut self, error: DMatrix<f64>, fock: DMatrix<f64>) -> Option<DMatrix<f64>> {
        self.previous_samples.push_front(Sample { error, fock });
        self.previous_samples.truncate(self.max_samples);

        let n = self.previous_samples.len();
        let latest = || {
            self.previous_samples
                .front()
                .map(|Sample { fock, .. }| fock.to_owned())
        };

        if n < MIN_SAMPLES {
            return latest();
        }

        // errors shrink by orders of magnitude, keep the system well scaled
        let scale = self
            .previous_samples
            .iter()
            .map(|Sample { error, .. }| error.norm_squared())
            .fold(0.0, f64::max);
        if scale == 0.0 {
            return latest();
        }

        let matrix = DMatrix::from_fn(n + 1, n + 1, |i, j| match (i, j) {
            (i, j) if i == n && j == n => 0.0,
            (i, j) if i == n || j == n => 1.0,
            _ => {
                self.previous_samples[j]
                    .error
                    .dot(&self.previous_samples[i].error)
                    / scale
            }
        });

        let b = DVector::from_fn(n + 1, |i, _| if i == n { 1.0 } else { 0.0 });

        let qr = matrix.qr();
        let solution = qr.solve(&b)?;
        Some(
            solution
                .iter()
                .enumerate()
                .take(n)
                .map(|(i, &x)| x * &self.previous_samples[i].fock)
                .sum(),
        )
    }
}
