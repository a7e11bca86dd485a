//! Utilities for working with probabilities.

pub trait SliceExt {
    fn sum(&self) -> f64;
    fn mean(&self) -> f64;
    fn normalise(&mut self, target: f64) -> f64;
    fn scale(&mut self, factor: f64);
}
impl SliceExt for [f64] {
    fn sum(&self) -> f64 {
        self.iter().sum()
    }

    fn mean(&self) -> f64 {
        if self.is_empty() {
            f64::NAN
        } else {
            self.sum() / self.len() as f64
        }
    }

    fn normalise(&mut self, target: f64) -> f64 {
        let sum = self.sum();
        self.scale(target / sum);
        sum
    }

    fn scale(&mut self, factor: f64) {
        for element in self {
            *element *= factor;
        }
    }
}

/// Rescales a partition of mutually exclusive outcomes so that it sums to `mass` if the partition's
/// sum deviates from `mass` by more than `tolerance`. Returns `true` if a rescale took place.
pub fn rescale_partition(partition: &mut [f64], mass: f64, tolerance: f64) -> bool {
    let sum = partition.sum();
    if sum > 0.0 && (sum - mass).abs() > tolerance {
        partition.normalise(mass);
        true
    } else {
        false
    }
}
