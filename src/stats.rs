//! Distribution summaries for per-vehicle distances and wait times.

use serde::Serialize;

/// Five-number summary plus mean and total, every value rounded to two decimals.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Summary {
    pub count: usize,
    pub min: f64,
    pub max: f64,
    pub median: f64,
    /// Median of the lower half (the overall median excluded for odd counts).
    pub q1: f64,
    /// Median of the upper half.
    pub q3: f64,
    pub mean: f64,
    pub total: f64,
}

impl Summary {
    /// `None` for an empty sample.
    pub fn of(values: &[f64]) -> Option<Self> {
        if values.is_empty() {
            return None;
        }
        let mut sorted = values.to_vec();
        sorted.sort_by(f64::total_cmp);

        let n = sorted.len();
        let lower = &sorted[..n / 2];
        let upper = if n % 2 == 1 { &sorted[n / 2 + 1..] } else { &sorted[n / 2..] };
        let total: f64 = sorted.iter().sum();

        Some(Self {
            count: n,
            min: round2(sorted[0]),
            max: round2(sorted[n - 1]),
            median: median(&sorted),
            q1: median(lower),
            q3: median(upper),
            mean: round2(total / n as f64),
            total: round2(total),
        })
    }
}

/// Median of an already sorted slice; 0 for an empty one.
fn median(sorted: &[f64]) -> f64 {
    let n = sorted.len();
    let value = match n {
        0 => 0.0,
        _ if n % 2 == 1 => sorted[n / 2],
        _ => (sorted[n / 2 - 1] + sorted[n / 2]) / 2.0,
    };
    round2(value)
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
