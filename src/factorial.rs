//! Factorials in log-space.

/// Lanczos coefficients for `g = 7`, `n = 9`.
const LANCZOS_G: f64 = 7.0;
const LANCZOS_COEFFS: [f64; 9] = [
    0.999_999_999_999_809_9,
    676.520_368_121_885_1,
    -1_259.139_216_722_402_8,
    771.323_428_777_653_1,
    -176.615_029_162_140_6,
    12.507_343_278_686_905,
    -0.138_571_095_265_720_12,
    9.984_369_578_019_572e-6,
    1.505_632_735_149_311_6e-7,
];

/// Natural logarithm of the gamma function for `x > 0`, using the Lanczos approximation. Values of
/// `x < 0.5` are handled through the reflection formula.
pub fn ln_gamma(x: f64) -> f64 {
    if x < 0.5 {
        let pi = std::f64::consts::PI;
        return (pi / (pi * x).sin()).ln() - ln_gamma(1.0 - x);
    }
    let x = x - 1.0;
    let mut sum = LANCZOS_COEFFS[0];
    for (index, &coeff) in LANCZOS_COEFFS.iter().enumerate().skip(1) {
        sum += coeff / (x + index as f64);
    }
    let t = x + LANCZOS_G + 0.5;
    0.5 * (2.0 * std::f64::consts::PI).ln() + (x + 0.5) * t.ln() - t + sum.ln()
}

pub trait LnFactorial {
    fn get(&self, n: u8) -> f64;
}

/// Computes `ln(n!)` on demand via [ln_gamma].
#[derive(Default)]
pub struct Calculator;

impl LnFactorial for Calculator {
    #[inline]
    fn get(&self, n: u8) -> f64 {
        ln_gamma(n as f64 + 1.0)
    }
}

const MAX_ENTRIES: usize = u8::MAX as usize + 1;

/// Precomputed `ln(n!)` for every `n` representable as a `u8`, accumulated exactly as a sum of logs.
pub struct Lookup {
    entries: [f64; MAX_ENTRIES],
}
impl LnFactorial for Lookup {
    #[inline]
    fn get(&self, n: u8) -> f64 {
        self.entries[n as usize]
    }
}

impl Default for Lookup {
    fn default() -> Self {
        let mut entries = [0.0; MAX_ENTRIES];
        for i in 2..MAX_ENTRIES {
            entries[i] = entries[i - 1] + (i as f64).ln();
        }
        Self { entries }
    }
}

/// `ln` of the binomial coefficient `C(n, r)`.
pub fn ln_combinations(n: u8, r: u8, factorial: &impl LnFactorial) -> f64 {
    assert!(n >= r, "n ({n}) < r ({r})");
    factorial.get(n) - factorial.get(r) - factorial.get(n - r)
}

/// Plain factorial, for the direct (non-log) arithmetic paths. Saturates to infinity past `170!`.
pub fn factorial(n: u8) -> f64 {
    (2..=n).fold(1.0, |product, i| product * i as f64)
}
