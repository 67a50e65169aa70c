//! Scoring used to decide which walkers clone.
//!
//! Rewards and companion distances are both relativized so they live on the
//! same positive scale, then combined as `reward^balance * distance`. A low
//! balance lets distance (diversity) dominate, a high balance lets reward
//! (quality) dominate.

/// Below this spread a vector is treated as constant.
const MIN_SPREAD: f64 = 1e-12;

/// Standardize `values` and squash them into `(0, inf)`.
///
/// Positive z-scores map to `1 + ln(1 + z)`, the rest to `exp(z)`, so the
/// result is strictly positive and monotonic. A constant input maps to all
/// ones, which removes that signal from the product instead of dividing by
/// zero.
pub fn relativize(values: &[f64]) -> Vec<f64> {
    if values.is_empty() {
        return Vec::new();
    }

    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    let std = variance.sqrt();

    if !std.is_finite() || std < MIN_SPREAD {
        return vec![1.0; values.len()];
    }

    values
        .iter()
        .map(|v| {
            let z = (v - mean) / std;
            if z > 0.0 { 1.0 + z.ln_1p() } else { z.exp() }
        })
        .collect()
}

/// Euclidean distance between two feature vectors.
/// Extra trailing components of the longer vector are ignored.
pub fn distance(a: &[f64], b: &[f64]) -> f64 {
    a.iter()
        .zip(b)
        .map(|(x, y)| (x - y).powi(2))
        .sum::<f64>()
        .sqrt()
}

/// Combine raw rewards and companion distances into virtual rewards.
pub fn virtual_rewards(rewards: &[f64], distances: &[f64], balance: f64) -> Vec<f64> {
    let rewards = relativize(rewards);
    let distances = relativize(distances);
    rewards
        .iter()
        .zip(&distances)
        .map(|(r, d)| r.powf(balance) * d)
        .collect()
}

/// Probability that a walker with virtual reward `own` clones from a
/// companion scoring `companion`. Clamped to `[0, 1]`.
pub fn clone_probability(own: f64, companion: f64) -> f64 {
    let own = own.max(f64::MIN_POSITIVE);
    ((companion - own) / own).clamp(0.0, 1.0)
}
