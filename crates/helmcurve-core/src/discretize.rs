//! Discretization of difficulty values into plot buckets.
//!
//! Outputs are aligned index-for-index with the input slice.

use std::fmt;
use std::str::FromStr;

use rand::Rng;
use rand_distr::{Distribution, Normal};
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result};
use crate::model::InstanceDifficulty;

/// Standard deviation of the tie-breaking jitter added before quantiles.
pub const QUANTILE_JITTER_STD: f64 = 0.001;

/// Bucket count used when difficulties feed the logistic fit.
pub const FIT_QUANTILE_BINS: usize = 100;

/// How difficulty is presented on the x-axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DifficultyAxis {
    /// Empirical quantile of difficulty, on a 0..=100 scale.
    Quantile,
    /// Raw difficulty in [0, 1].
    Raw,
}

impl fmt::Display for DifficultyAxis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DifficultyAxis::Quantile => write!(f, "quantile"),
            DifficultyAxis::Raw => write!(f, "raw"),
        }
    }
}

impl FromStr for DifficultyAxis {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "quantile" | "difficulty-quantile" => Ok(DifficultyAxis::Quantile),
            "raw" | "difficulty" => Ok(DifficultyAxis::Raw),
            other => Err(format!("unknown x-axis: {other}")),
        }
    }
}

/// `n` evenly spaced points from `start` to `stop` inclusive.
pub fn linspace(start: f64, stop: f64, n: usize) -> Vec<f64> {
    match n {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (stop - start) / (n - 1) as f64;
            (0..n)
                .map(|i| if i == n - 1 { stop } else { start + step * i as f64 })
                .collect()
        }
    }
}

/// Index `i` such that `edges[i - 1] <= x < edges[i]` (left-inclusive bins).
/// Returns 0 below the first edge and `edges.len()` at or past the last.
pub fn digitize(x: f64, edges: &[f64]) -> usize {
    edges.partition_point(|&edge| edge <= x)
}

/// Linearly interpolated quantile of already sorted data, `None` when empty.
///
/// `q` is clamped to [0, 1].
pub fn quantile_sorted(sorted: &[f64], q: f64) -> Option<f64> {
    let last = sorted.len().checked_sub(1)?;
    let h = last as f64 * q.clamp(0.0, 1.0);
    let lo = (h.floor() as usize).min(last);
    let hi = (h.ceil() as usize).min(last);
    Some(sorted[lo] + (h - lo as f64) * (sorted[hi] - sorted[lo]))
}

fn require_bins(num_bins: usize) -> Result<()> {
    if num_bins == 0 {
        return Err(CoreError::InvalidArgument("num_bins must be at least 1".into()));
    }
    Ok(())
}

/// Snap each difficulty to the left edge of its fixed-width bin over [0, 1].
///
/// Values below zero snap to the first edge; values at or above one snap to
/// the last.
pub fn quantize_difficulties(
    difficulties: &[InstanceDifficulty],
    num_bins: usize,
) -> Result<Vec<f64>> {
    require_bins(num_bins)?;
    let edges = linspace(0.0, 1.0, num_bins);
    Ok(difficulties
        .iter()
        .map(|d| {
            let bin = digitize(d.difficulty, &edges);
            edges[bin.saturating_sub(1)]
        })
        .collect())
}

/// Convert difficulties to empirical quantile buckets on a 0..=100 scale.
///
/// Gaussian jitter breaks ties between identical difficulties, so results
/// depend on `rng`; seed it for reproducible output.
pub fn difficulty_quantiles<R: Rng + ?Sized>(
    difficulties: &[InstanceDifficulty],
    num_bins: usize,
    rng: &mut R,
) -> Result<Vec<f64>> {
    require_bins(num_bins)?;
    if difficulties.is_empty() {
        return Err(CoreError::InsufficientData(
            "cannot compute quantiles of zero difficulties".into(),
        ));
    }

    let jitter = Normal::new(0.0, QUANTILE_JITTER_STD)
        .map_err(|e| CoreError::InvalidArgument(e.to_string()))?;
    let jittered: Vec<f64> = difficulties
        .iter()
        .map(|d| d.difficulty + jitter.sample(&mut *rng))
        .collect();

    let mut sorted = jittered.clone();
    sorted.sort_by(f64::total_cmp);

    let mut edges: Vec<f64> = linspace(0.0, 1.0, num_bins)
        .into_iter()
        .filter_map(|q| quantile_sorted(&sorted, q))
        .collect();
    edges.sort_by(f64::total_cmp);
    edges.dedup();

    let scale = 100.0 / num_bins as f64;
    Ok(jittered
        .iter()
        .map(|&x| digitize(x, &edges) as f64 * scale)
        .collect())
}

/// Discretize for a binned plot along the requested axis.
pub fn discretize<R: Rng + ?Sized>(
    difficulties: &[InstanceDifficulty],
    axis: DifficultyAxis,
    num_bins: usize,
    rng: &mut R,
) -> Result<Vec<f64>> {
    match axis {
        DifficultyAxis::Quantile => difficulty_quantiles(difficulties, num_bins, rng),
        DifficultyAxis::Raw => quantize_difficulties(difficulties, num_bins),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn difficulties(values: &[f64]) -> Vec<InstanceDifficulty> {
        values
            .iter()
            .enumerate()
            .map(|(i, &difficulty)| InstanceDifficulty {
                id: format!("i{i}_0"),
                difficulty,
            })
            .collect()
    }

    #[test]
    fn linspace_endpoints() {
        let xs = linspace(0.0, 1.0, 5);
        assert_eq!(xs, vec![0.0, 0.25, 0.5, 0.75, 1.0]);
        assert_eq!(linspace(0.0, 100.0, 100).len(), 100);
        assert_eq!(linspace(3.0, 7.0, 1), vec![3.0]);
    }

    #[test]
    fn digitize_is_left_inclusive() {
        let edges = [0.0, 0.5, 1.0];
        assert_eq!(digitize(-0.1, &edges), 0);
        assert_eq!(digitize(0.0, &edges), 1);
        assert_eq!(digitize(0.49, &edges), 1);
        assert_eq!(digitize(0.5, &edges), 2);
        assert_eq!(digitize(1.0, &edges), 3);
    }

    #[test]
    fn quantile_interpolates() {
        let sorted = [0.0, 1.0, 2.0, 4.0];
        assert_eq!(quantile_sorted(&sorted, 0.0), Some(0.0));
        assert_eq!(quantile_sorted(&sorted, 0.5), Some(1.5));
        assert_eq!(quantile_sorted(&sorted, 1.0), Some(4.0));
        assert_eq!(quantile_sorted(&[7.0], 0.3), Some(7.0));
        assert_eq!(quantile_sorted(&[], 0.5), None);
    }

    #[test]
    fn quantize_snaps_to_left_edges() {
        let d = difficulties(&[0.0, 0.1, 0.3, 0.5, 0.99, 1.0, -0.5]);
        let bins = quantize_difficulties(&d, 5).unwrap();
        assert_eq!(bins, vec![0.0, 0.0, 0.25, 0.5, 0.75, 1.0, 0.0]);
    }

    #[test]
    fn quantize_rejects_zero_bins() {
        assert!(quantize_difficulties(&difficulties(&[0.5]), 0).is_err());
    }

    #[test]
    fn quantiles_preserve_order() {
        let values: Vec<f64> = (0..50).map(|i| i as f64 / 50.0).collect();
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let buckets = difficulty_quantiles(&difficulties(&values), 10, &mut rng).unwrap();
        assert_eq!(buckets.len(), 50);
        assert!(buckets.windows(2).all(|w| w[0] <= w[1]), "{buckets:?}");
        assert!(buckets.iter().all(|&b| b > 0.0 && b <= 100.0));
        assert_eq!(*buckets.last().unwrap(), 100.0);
    }

    #[test]
    fn quantiles_are_reproducible_with_a_seed() {
        let d = difficulties(&[0.2, 0.2, 0.2, 0.8, 0.5]);
        let a = difficulty_quantiles(&d, 4, &mut ChaCha8Rng::seed_from_u64(1)).unwrap();
        let b = difficulty_quantiles(&d, 4, &mut ChaCha8Rng::seed_from_u64(1)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn quantiles_of_nothing_fail() {
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        assert!(matches!(
            difficulty_quantiles(&[], 10, &mut rng),
            Err(CoreError::InsufficientData(_))
        ));
    }

    #[test]
    fn axis_parse() {
        assert_eq!("quantile".parse::<DifficultyAxis>().unwrap(), DifficultyAxis::Quantile);
        assert_eq!("Raw".parse::<DifficultyAxis>().unwrap(), DifficultyAxis::Raw);
        assert!("log".parse::<DifficultyAxis>().is_err());
    }
}
