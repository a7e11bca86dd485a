//! Univariate and bivariate Poisson distributions.

use tinyrand::Rand;

use crate::factorial;
use crate::factorial::{ln_combinations, LnFactorial};

#[inline]
pub fn univariate(k: u8, lambda: f64, factorial: &impl LnFactorial) -> f64 {
    if lambda == 0.0 {
        return if k == 0 { 1.0 } else { 0.0 };
    }
    f64::exp(k as f64 * lambda.ln() - lambda - factorial.get(k))
}

/// Joint probability of `k_1` home and `k_2` away goals under a bivariate Poisson with independent
/// components `lambda_1`, `lambda_2` and a shared component `lambda_3`. Evaluated in log-space; the
/// direct form is consulted only when the log-space result is not a number. `None` if both fail.
pub fn bivariate(
    k_1: u8,
    k_2: u8,
    lambda_1: f64,
    lambda_2: f64,
    lambda_3: f64,
    factorial: &impl LnFactorial,
) -> Option<f64> {
    let ln_prob = bivariate_ln(k_1, k_2, lambda_1, lambda_2, lambda_3, factorial);
    if !ln_prob.is_nan() && ln_prob != f64::INFINITY {
        return Some(f64::exp(ln_prob));
    }

    let prob = bivariate_direct(k_1, k_2, lambda_1, lambda_2, lambda_3);
    if prob.is_finite() && prob >= 0.0 {
        Some(prob)
    } else {
        None
    }
}

/// Natural log of the bivariate pmf; the inner sum over the shared goals is reduced by log-sum-exp.
/// Returns `-∞` for cells of zero probability and `NaN` when the inputs are not valid rates.
pub fn bivariate_ln(
    k_1: u8,
    k_2: u8,
    lambda_1: f64,
    lambda_2: f64,
    lambda_3: f64,
    factorial: &impl LnFactorial,
) -> f64 {
    let terms = (0..=u8::min(k_1, k_2))
        .map(|i| {
            ln_combinations(k_1, i, factorial)
                + ln_combinations(k_2, i, factorial)
                + factorial.get(i)
                + ln_pow(lambda_1, k_1 - i)
                + ln_pow(lambda_2, k_2 - i)
                + ln_pow(lambda_3, i)
        })
        .collect::<Vec<_>>();
    let ln_sum = log_sum_exp(&terms);
    if ln_sum == f64::NEG_INFINITY {
        return ln_sum;
    }
    -(lambda_1 + lambda_2 + lambda_3) + ln_sum - factorial.get(k_1) - factorial.get(k_2)
}

/// The bivariate pmf in plain arithmetic. Overflows for large goal counts.
pub fn bivariate_direct(k_1: u8, k_2: u8, lambda_1: f64, lambda_2: f64, lambda_3: f64) -> f64 {
    let sum = (0..=u8::min(k_1, k_2))
        .map(|i| {
            factorial::factorial(k_1) / factorial::factorial(k_1 - i) / factorial::factorial(i)
                * factorial::factorial(k_2)
                / factorial::factorial(k_2 - i)
                * lambda_1.powi((k_1 - i) as i32)
                * lambda_2.powi((k_2 - i) as i32)
                * lambda_3.powi(i as i32)
        })
        .sum::<f64>();
    f64::exp(-lambda_1 - lambda_2 - lambda_3) * sum
        / (factorial::factorial(k_1) * factorial::factorial(k_2))
}

/// `exponent · ln(base)`, with `0⁰` taken as 1.
#[inline]
fn ln_pow(base: f64, exponent: u8) -> f64 {
    if exponent == 0 {
        0.0
    } else if base == 0.0 {
        f64::NEG_INFINITY
    } else {
        exponent as f64 * base.ln()
    }
}

pub fn log_sum_exp(terms: &[f64]) -> f64 {
    let max = terms.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if max == f64::NEG_INFINITY || max.is_nan() {
        return max;
    }
    let sum = terms.iter().map(|&term| f64::exp(term - max)).sum::<f64>();
    max + sum.ln()
}

/// Draws a Poisson-distributed count by inverting the cumulative distribution. Counts saturate at
/// [u8::MAX].
pub fn sample(lambda: f64, rand: &mut impl Rand) -> u8 {
    let random = random_f64(rand);
    let mut prob = f64::exp(-lambda);
    if prob == 0.0 {
        // the rate is far beyond the saturation point
        return u8::MAX;
    }
    let mut cumulative = prob;
    let mut k = 0u8;
    while random > cumulative && k < u8::MAX {
        k += 1;
        prob *= lambda / k as f64;
        cumulative += prob;
        if prob == 0.0 && cumulative < random {
            // the remaining tail is below f64 resolution
            break;
        }
    }
    k
}

#[inline]
fn random_f64(rand: &mut impl Rand) -> f64 {
    rand.next_u64() as f64 / u64::MAX as f64
}
