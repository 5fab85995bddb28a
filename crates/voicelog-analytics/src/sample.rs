//! Sentinels for statistics computed from thin samples.

use serde::Serialize;

/// A statistic that is either backed by enough samples or explicitly not.
///
/// Thin data is never an error and never silently defaulted: callers get
/// the value together with the number of samples behind it, or the observed
/// count and the minimum that was required.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum Sampled<T> {
    #[serde(rename_all = "camelCase")]
    Sufficient { value: T, sample_count: usize },
    #[serde(rename_all = "camelCase")]
    InsufficientData { observed: usize, required: usize },
}

impl<T> Sampled<T> {
    /// Gate `value` on `observed >= required`.
    pub fn gate(observed: usize, required: usize, value: impl FnOnce() -> T) -> Self {
        if observed >= required {
            Sampled::Sufficient {
                value: value(),
                sample_count: observed,
            }
        } else {
            Sampled::InsufficientData { observed, required }
        }
    }

    #[must_use]
    pub fn value(&self) -> Option<&T> {
        match self {
            Sampled::Sufficient { value, .. } => Some(value),
            Sampled::InsufficientData { .. } => None,
        }
    }

    #[must_use]
    pub fn is_sufficient(&self) -> bool {
        matches!(self, Sampled::Sufficient { .. })
    }

    /// Samples observed, whether or not they met the minimum.
    #[must_use]
    pub fn observed(&self) -> usize {
        match self {
            Sampled::Sufficient { sample_count, .. } => *sample_count,
            Sampled::InsufficientData { observed, .. } => *observed,
        }
    }
}

/// Round to `places` decimal places, half away from zero.
#[must_use]
pub fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10_f64.powi(places);
    (value * factor).round() / factor
}

/// Arithmetic mean of present values, with the count that produced it.
#[must_use]
pub fn mean_of(values: impl IntoIterator<Item = f64>) -> Option<(f64, usize)> {
    let (sum, count) = values
        .into_iter()
        .fold((0.0_f64, 0_usize), |(s, c), v| (s + v, c + 1));
    if count == 0 {
        return None;
    }
    #[allow(clippy::cast_precision_loss)]
    let mean = sum / count as f64;
    Some((mean, count))
}

/// Median of present values; even-length samples average the middle pair.
#[must_use]
pub fn median_of(values: impl IntoIterator<Item = f64>) -> Option<f64> {
    let mut sorted: Vec<f64> = values.into_iter().collect();
    if sorted.is_empty() {
        return None;
    }
    sorted.sort_by(f64::total_cmp);
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        Some((sorted[mid - 1] + sorted[mid]) / 2.0)
    } else {
        Some(sorted[mid])
    }
}
