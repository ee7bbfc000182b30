//! Sample statistics over comparable listing prices.
//!
//! All math is integer-only: prices are cents, the average rounds half-up,
//! and percentiles use the ceiling-index method (sort ascending, take
//! `ceil(p/100 * n) - 1` clamped to the sample bounds).

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SampleStats {
    pub sample_size: usize,
    pub min: i64,
    pub max: i64,
    pub avg: i64,
    pub p25: i64,
    pub p75: i64,
}

impl SampleStats {
    /// Compute statistics over a non-empty sample. Returns `None` for an
    /// empty slice; the minimum-sample-size policy belongs to the caller.
    pub fn compute(prices: &[i64]) -> Option<Self> {
        if prices.is_empty() {
            return None;
        }

        let mut sorted = prices.to_vec();
        sorted.sort_unstable();

        let n = sorted.len() as i64;
        let sum: i64 = sorted.iter().sum();
        let avg = (sum + n / 2) / n;

        Some(Self {
            sample_size: sorted.len(),
            min: sorted[0],
            max: sorted[sorted.len() - 1],
            avg,
            p25: percentile(&sorted, 25),
            p75: percentile(&sorted, 75),
        })
    }
}

/// Ceiling-index percentile over an ascending-sorted, non-empty sample.
fn percentile(sorted: &[i64], p: i64) -> i64 {
    let n = sorted.len() as i64;
    let index = (p * n + 99) / 100 - 1;
    sorted[index.clamp(0, n - 1) as usize]
}
