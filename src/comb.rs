//! Combinatorics.

/// The number of ways of choosing `r` items from `n`, saturating at [u64::MAX].
pub fn count_combinations(n: usize, r: usize) -> u64 {
    if r > n {
        return 0;
    }
    let r = usize::min(r, n - r);
    let mut count = 1u64;
    for i in 0..r {
        // exact at every step: the running product is C(n, i + 1)
        count = match count.checked_mul((n - i) as u64) {
            Some(product) => product / (i + 1) as u64,
            None => return u64::MAX,
        };
    }
    count
}

/// Lexicographic enumeration of all `r`-element subsets of `0..n`, each yielded as an ascending
/// vector of indices.
pub struct Combinations {
    n: usize,
    indices: Vec<usize>,
    exhausted: bool,
}
impl Combinations {
    pub fn new(n: usize, r: usize) -> Self {
        Self {
            n,
            indices: (0..r).collect(),
            exhausted: r > n,
        }
    }
}

impl Iterator for Combinations {
    type Item = Vec<usize>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.exhausted {
            return None;
        }
        let current = self.indices.clone();

        let r = self.indices.len();
        let mut pivot = r;
        while pivot > 0 {
            pivot -= 1;
            if self.indices[pivot] != pivot + self.n - r {
                self.indices[pivot] += 1;
                for index in pivot + 1..r {
                    self.indices[index] = self.indices[index - 1] + 1;
                }
                return Some(current);
            }
        }
        self.exhausted = true;
        Some(current)
    }
}
