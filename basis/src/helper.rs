//! Special functions used by the Gaussian integral recursions.

use libm::erf;
use std::f64::consts::PI;

/// Above this argument the Boys function is obtained from erf and upward
/// recursion; below it the power series converges quickly.
pub(crate) const BOYS_ASYMPTOTIC_SWITCH: f64 = 30.0;

const BOYS_SERIES_TOLERANCE: f64 = 1e-17;
const BOYS_SERIES_MAX_TERMS: usize = 1000;

/// Boys function F_n(x) = ∫_0^1 t^{2n} exp(-x t²) dt.
pub fn boys_function(n: i32, x: f64) -> f64 {
    debug_assert!(n >= 0, "Boys function order must be non-negative");
    debug_assert!(x >= 0.0, "Boys function argument must be non-negative");

    if x < 1e-14 {
        return 1.0 / (2.0 * n as f64 + 1.0);
    }
    if x > BOYS_ASYMPTOTIC_SWITCH {
        boys_upward(n, x)
    } else {
        boys_series(n, x)
    }
}

/// F_n(x) = exp(-x) Σ_k (2x)^k / ((2n+1)(2n+3)...(2n+2k+1)); every term is
/// positive so there is no cancellation.
pub(crate) fn boys_series(n: i32, x: f64) -> f64 {
    let two_n = 2.0 * n as f64;
    let mut term = 1.0 / (two_n + 1.0);
    let mut sum = term;
    for k in 1..BOYS_SERIES_MAX_TERMS {
        term *= 2.0 * x / (two_n + 2.0 * k as f64 + 1.0);
        sum += term;
        if term < sum * BOYS_SERIES_TOLERANCE {
            break;
        }
    }
    (-x).exp() * sum
}

/// F_0 from the error function, then F_{k+1} = ((2k+1) F_k - exp(-x)) / 2x.
/// Stable for large x where exp(-x) is negligible next to F_k.
pub(crate) fn boys_upward(n: i32, x: f64) -> f64 {
    let exp_x = (-x).exp();
    let mut value = 0.5 * (PI / x).sqrt() * erf(x.sqrt());
    for k in 0..n {
        value = ((2 * k + 1) as f64 * value - exp_x) / (2.0 * x);
    }
    value
}

/// Composite Simpson rule on [a, b] with `n` (rounded up to even) intervals.
#[cfg(test)]
pub(crate) fn simpson_integration<F>(f: F, a: f64, b: f64, n: usize) -> f64
where
    F: Fn(f64) -> f64,
{
    let n = if n % 2 == 0 { n } else { n + 1 };
    let h = (b - a) / n as f64;

    let mut sum = f(a) + f(b);
    for i in 1..n {
        let x = a + i as f64 * h;
        sum += if i % 2 == 0 { 2.0 * f(x) } else { 4.0 * f(x) };
    }
    sum * h / 3.0
}
