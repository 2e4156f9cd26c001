use nalgebra::Vector3;
use statrs::function::gamma::{gamma, gamma_lr};

/// Below this argument the Boys function is evaluated from its Taylor series
const BOYS_SERIES_THRESHOLD: f64 = 1e-8;

/// Boys function F_n(t) = int_0^1 x^(2n) exp(-t x^2) dx
pub(crate) fn boys(n: i32, t: f64) -> f64 {
    let n = f64::from(n);

    if t < BOYS_SERIES_THRESHOLD {
        return (2.0 * n + 1.0).recip() - t / (2.0 * n + 3.0);
    }

    let a = n + 0.5;
    gamma(a) * gamma_lr(a, t) / (2.0 * t.powf(a))
}

/// Hermite expansion coefficient E^{ij}_t of the product of two one dimensional
/// gaussians with exponents `a` and `b`. `diff` is the separation A - B along
/// the axis.
pub(crate) fn hermite_expansion([i, j, t]: [i32; 3], diff: f64, a: f64, b: f64) -> f64 {
    if i < 0 || j < 0 || t < 0 || t > i + j {
        return 0.0;
    }

    let p = a + b;
    let q = a * b / p;

    if i == 0 && j == 0 && t == 0 {
        return (-q * diff * diff).exp();
    }

    if j == 0 {
        // lower i
        (2.0 * p).recip() * hermite_expansion([i - 1, j, t - 1], diff, a, b)
            - (q * diff / a) * hermite_expansion([i - 1, j, t], diff, a, b)
            + f64::from(t + 1) * hermite_expansion([i - 1, j, t + 1], diff, a, b)
    } else {
        // lower j
        (2.0 * p).recip() * hermite_expansion([i, j - 1, t - 1], diff, a, b)
            + (q * diff / b) * hermite_expansion([i, j - 1, t], diff, a, b)
            + f64::from(t + 1) * hermite_expansion([i, j - 1, t + 1], diff, a, b)
    }
}

/// Hermite coulomb integral R^n_{tuv} for a composite exponent `p` and the
/// separation `diff` between the gaussian product center and the charge.
pub(crate) fn coulomb_auxiliary(t: i32, u: i32, v: i32, n: i32, p: f64, diff: Vector3<f64>) -> f64 {
    if t < 0 || u < 0 || v < 0 {
        return 0.0;
    }

    if t == 0 && u == 0 && v == 0 {
        return (-2.0 * p).powi(n) * boys(n, p * diff.norm_squared());
    }

    if t == 0 && u == 0 {
        f64::from(v - 1) * coulomb_auxiliary(t, u, v - 2, n + 1, p, diff)
            + diff.z * coulomb_auxiliary(t, u, v - 1, n + 1, p, diff)
    } else if t == 0 {
        f64::from(u - 1) * coulomb_auxiliary(t, u - 2, v, n + 1, p, diff)
            + diff.y * coulomb_auxiliary(t, u - 1, v, n + 1, p, diff)
    } else {
        f64::from(t - 1) * coulomb_auxiliary(t - 2, u, v, n + 1, p, diff)
            + diff.x * coulomb_auxiliary(t - 1, u, v, n + 1, p, diff)
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    #[test]
    fn boys_limits() {
        for n in 0..6 {
            assert_relative_eq!(boys(n, 0.0), 1.0 / f64::from(2 * n + 1), epsilon = 1e-14);
        }

        // F_0(t) = sqrt(pi / t) erf(sqrt t) / 2
        let t: f64 = 2.5;
        let expected = 0.5 * (std::f64::consts::PI / t).sqrt() * statrs::function::erf::erf(t.sqrt());
        assert_relative_eq!(boys(0, t), expected, epsilon = 1e-12);

        // continuous across the series threshold
        assert_relative_eq!(
            boys(2, BOYS_SERIES_THRESHOLD * 0.99),
            boys(2, BOYS_SERIES_THRESHOLD * 1.01),
            epsilon = 1e-9
        );
    }

    #[test]
    fn boys_downward_recursion() {
        // F_n(t) = (2t F_{n+1}(t) + exp(-t)) / (2n + 1)
        let t = 0.7;
        for n in 0..5 {
            let recursed = (2.0 * t * boys(n + 1, t) + (-t).exp()) / f64::from(2 * n + 1);
            assert_relative_eq!(boys(n, t), recursed, epsilon = 1e-12);
        }
    }

    #[test]
    fn hermite_expansion_base_cases() {
        let (a, b, diff) = (1.3, 0.4, 0.8);
        let q = a * b / (a + b);

        assert_relative_eq!(
            hermite_expansion([0, 0, 0], diff, a, b),
            (-q * diff * diff).exp()
        );
        assert_eq!(hermite_expansion([1, 0, 2], diff, a, b), 0.0);
        assert_eq!(hermite_expansion([-1, 0, 0], diff, a, b), 0.0);
        // same center, p_x p_x
        assert_relative_eq!(
            hermite_expansion([1, 1, 0], 0.0, a, b),
            (2.0 * (a + b)).recip(),
            epsilon = 1e-14
        );
    }

    #[test]
    fn coulomb_auxiliary_base_case() {
        let diff = Vector3::new(0.1, -0.2, 0.3);
        let p = 1.5;
        assert_relative_eq!(
            coulomb_auxiliary(0, 0, 0, 0, p, diff),
            boys(0, p * diff.norm_squared())
        );
        // R_{001} = z * R^1_{000}
        assert_relative_eq!(
            coulomb_auxiliary(0, 0, 1, 0, p, diff),
            diff.z * -2.0 * p * boys(1, p * diff.norm_squared()),
            epsilon = 1e-14
        );
    }
}
