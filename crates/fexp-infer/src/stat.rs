use serde::{Deserialize, Serialize};

/// Quantile summary of a null distribution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quantiles {
    /// 5th percentile estimate.
    pub q05: f64,
    /// Median (50th percentile) estimate.
    pub q50: f64,
    /// 95th percentile estimate.
    pub q95: f64,
}

impl Quantiles {
    /// Linear-interpolated quantiles of `values`; NaN when empty.
    pub fn from_values(values: &[f64]) -> Self {
        let mut sorted = values.to_vec();
        sorted.sort_by(f64::total_cmp);
        Self {
            q05: percentile(&sorted, 0.05),
            q50: percentile(&sorted, 0.5),
            q95: percentile(&sorted, 0.95),
        }
    }
}

fn percentile(values: &[f64], quantile: f64) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    let position = quantile * (values.len() - 1) as f64;
    let lower = position.floor() as usize;
    let upper = position.ceil() as usize;
    if lower == upper {
        values[lower]
    } else {
        let weight = position - lower as f64;
        values[lower] * (1.0 - weight) + values[upper] * weight
    }
}

/// Arithmetic mean; NaN when empty.
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    values.iter().sum::<f64>() / values.len() as f64
}
