//! Agent-characteristic curves.
//!
//! An agent-characteristic curve is P(correct) as a function of instance
//! difficulty for one model, analogous to an item-response curve. It is
//! fitted as an unpenalized one-feature logistic regression and summarized by
//! the area under the curve.

use std::collections::HashMap;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::discretize::{difficulty_quantiles, linspace, DifficultyAxis, FIT_QUANTILE_BINS};
use crate::error::{CoreError, Result};
use crate::model::InstanceDifficulty;

/// Number of grid points the fitted curve is evaluated at.
pub const GRID_POINTS: usize = 100;

const MAX_ITER: usize = 100;
const TOLERANCE: f64 = 1e-8;
const MAX_STEP_HALVINGS: usize = 30;

/// Fitted `P(y = 1 | x) = sigmoid(intercept + slope * x)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LogisticFit {
    pub intercept: f64,
    pub slope: f64,
    /// Newton iterations used.
    pub iterations: usize,
}

impl LogisticFit {
    /// Probability of the positive class at `x`.
    pub fn predict_proba(&self, x: f64) -> f64 {
        sigmoid(self.intercept + self.slope * x)
    }
}

/// A fitted characteristic curve evaluated on a fixed grid.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CharacteristicCurve {
    pub axis: DifficultyAxis,
    pub xs: Vec<f64>,
    pub ys: Vec<f64>,
    pub fit: LogisticFit,
    /// Number of instances the fit used.
    pub samples: usize,
}

impl CharacteristicCurve {
    /// Area under this curve.
    pub fn auc(&self) -> Result<f64> {
        auc(&self.xs, &self.ys)
    }
}

/// Sigmoid: 1 / (1 + e^(-z)), evaluated without overflow.
fn sigmoid(z: f64) -> f64 {
    if z >= 0.0 {
        1.0 / (1.0 + (-z).exp())
    } else {
        let e = z.exp();
        e / (1.0 + e)
    }
}

/// ln(1 + e^z) without overflow.
fn softplus(z: f64) -> f64 {
    if z > 0.0 {
        z + (-z).exp().ln_1p()
    } else {
        z.exp().ln_1p()
    }
}

fn log_likelihood(x: &[f64], y: &[bool], a: f64, b: f64) -> f64 {
    x.iter()
        .zip(y)
        .map(|(&xi, &yi)| {
            let z = a + b * xi;
            if yi {
                z - softplus(z)
            } else {
                -softplus(z)
            }
        })
        .sum()
}

/// True when some threshold on `x` splits the classes, ties at the threshold
/// included. The maximum-likelihood estimate does not exist in that case.
fn is_separated(x: &[f64], y: &[bool]) -> bool {
    let (mut pos_min, mut pos_max) = (f64::INFINITY, f64::NEG_INFINITY);
    let (mut neg_min, mut neg_max) = (f64::INFINITY, f64::NEG_INFINITY);
    for (&xi, &yi) in x.iter().zip(y) {
        if yi {
            pos_min = pos_min.min(xi);
            pos_max = pos_max.max(xi);
        } else {
            neg_min = neg_min.min(xi);
            neg_max = neg_max.max(xi);
        }
    }
    pos_max <= neg_min || neg_max <= pos_min
}

/// Fit an unpenalized logistic regression of `y` on `x` by Newton-Raphson.
///
/// The predictor is standardized internally; the returned coefficients are
/// on the original scale. Constant labels, a constant predictor, completely
/// or quasi-completely separated data and non-convergence all fail with
/// [`CoreError::Convergence`].
pub fn fit_logistic(x: &[f64], y: &[bool]) -> Result<LogisticFit> {
    if x.len() != y.len() {
        return Err(CoreError::InvalidArgument(format!(
            "predictor has {} values but response has {}",
            x.len(),
            y.len()
        )));
    }
    if x.is_empty() {
        return Err(CoreError::InsufficientData(
            "cannot fit a logistic curve to zero instances".into(),
        ));
    }
    let positives = y.iter().filter(|&&v| v).count();
    if positives == 0 || positives == y.len() {
        return Err(CoreError::Convergence(format!(
            "all {} instances have the same correctness",
            y.len()
        )));
    }

    if is_separated(x, y) {
        return Err(CoreError::Convergence(
            "correctness is perfectly separated by difficulty".into(),
        ));
    }

    let n = x.len() as f64;
    let mean = x.iter().sum::<f64>() / n;
    let sd = (x.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n).sqrt();
    if sd <= f64::EPSILON {
        return Err(CoreError::Convergence(
            "difficulty is constant across instances".into(),
        ));
    }
    let xs: Vec<f64> = x.iter().map(|v| (v - mean) / sd).collect();

    let (mut a, mut b) = (0.0f64, 0.0f64);
    let mut ll = log_likelihood(&xs, y, a, b);

    for iteration in 1..=MAX_ITER {
        // Gradient and (negated) Hessian of the log-likelihood.
        let (mut g0, mut g1) = (0.0, 0.0);
        let (mut h00, mut h01, mut h11) = (0.0, 0.0, 0.0);
        for (&xi, &yi) in xs.iter().zip(y) {
            let p = sigmoid(a + b * xi);
            let r = f64::from(u8::from(yi)) - p;
            let w = p * (1.0 - p);
            g0 += r;
            g1 += r * xi;
            h00 += w;
            h01 += w * xi;
            h11 += w * xi * xi;
        }

        let det = h00 * h11 - h01 * h01;
        if !det.is_finite() || det <= 1e-12 * (h00 * h11).max(f64::MIN_POSITIVE) {
            return Err(CoreError::Convergence(format!(
                "singular information matrix at iteration {iteration}"
            )));
        }
        let mut da = (h11 * g0 - h01 * g1) / det;
        let mut db = (h00 * g1 - h01 * g0) / det;

        let mut halvings = 0;
        let mut next_ll = log_likelihood(&xs, y, a + da, b + db);
        while next_ll < ll - 1e-12 {
            halvings += 1;
            if halvings > MAX_STEP_HALVINGS {
                return Err(CoreError::Convergence(format!(
                    "line search failed at iteration {iteration}"
                )));
            }
            da *= 0.5;
            db *= 0.5;
            next_ll = log_likelihood(&xs, y, a + da, b + db);
        }

        a += da;
        b += db;
        ll = next_ll;

        if da.abs().max(db.abs()) < TOLERANCE {
            return Ok(LogisticFit {
                intercept: a - b * mean / sd,
                slope: b / sd,
                iterations: iteration,
            });
        }
    }

    Err(CoreError::Convergence(format!(
        "no convergence after {MAX_ITER} iterations"
    )))
}

/// Fit P(correct) against difficulty for one model.
///
/// `difficulties` covers the whole task; the quantile transform (if any) is
/// computed over all of it, then only instances present in `correctness`
/// enter the fit. The curve is evaluated on 100 points spanning [0, 100]
/// for the quantile axis and [0, 1] for the raw axis.
pub fn logistic_characteristic<R: Rng + ?Sized>(
    difficulties: &[InstanceDifficulty],
    correctness: &HashMap<String, bool>,
    axis: DifficultyAxis,
    rng: &mut R,
) -> Result<CharacteristicCurve> {
    let (predictor, grid) = match axis {
        DifficultyAxis::Quantile => (
            difficulty_quantiles(difficulties, FIT_QUANTILE_BINS, rng)?,
            linspace(0.0, 100.0, GRID_POINTS),
        ),
        DifficultyAxis::Raw => (
            difficulties.iter().map(|d| d.difficulty).collect(),
            linspace(0.0, 1.0, GRID_POINTS),
        ),
    };

    let (x, y): (Vec<f64>, Vec<bool>) = difficulties
        .iter()
        .zip(predictor)
        .filter_map(|(d, x)| correctness.get(&d.id).map(|&c| (x, c)))
        .unzip();

    if x.is_empty() {
        return Err(CoreError::InsufficientData(
            "no instance ids shared between difficulties and correctness".into(),
        ));
    }

    let fit = fit_logistic(&x, &y)?;
    let ys = grid.iter().map(|&g| fit.predict_proba(g)).collect();

    Ok(CharacteristicCurve {
        axis,
        xs: grid,
        ys,
        fit,
        samples: x.len(),
    })
}

/// Trapezoidal area under `ys` over `xs`.
pub fn auc(xs: &[f64], ys: &[f64]) -> Result<f64> {
    if xs.len() != ys.len() {
        return Err(CoreError::InvalidArgument(format!(
            "grid has {} points but curve has {}",
            xs.len(),
            ys.len()
        )));
    }
    Ok(xs
        .windows(2)
        .zip(ys.windows(2))
        .map(|(x, y)| (x[1] - x[0]) * (y[0] + y[1]) / 2.0)
        .sum())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    /// Mostly correct on easy instances, mostly wrong on hard ones, with
    /// enough overlap that the MLE exists.
    fn overlapping_data() -> (Vec<f64>, Vec<bool>) {
        let x: Vec<f64> = (0..50).map(|i| i as f64 / 50.0).collect();
        let y = (0..50)
            .map(|i| if i < 25 { i % 5 != 0 } else { i % 5 == 0 })
            .collect();
        (x, y)
    }

    fn difficulties(x: &[f64]) -> Vec<InstanceDifficulty> {
        x.iter()
            .enumerate()
            .map(|(i, &difficulty)| InstanceDifficulty {
                id: format!("q{i}_0"),
                difficulty,
            })
            .collect()
    }

    #[test]
    fn sigmoid_is_stable() {
        assert!((sigmoid(0.0) - 0.5).abs() < 1e-12);
        assert!(sigmoid(800.0) <= 1.0);
        assert!(sigmoid(-800.0) >= 0.0);
        assert!(softplus(800.0).is_finite());
    }

    #[test]
    fn fit_recovers_decreasing_curve() {
        let (x, y) = overlapping_data();
        let fit = fit_logistic(&x, &y).unwrap();
        assert!(fit.slope < 0.0, "slope {}", fit.slope);
        assert!(fit.predict_proba(0.0) > 0.5);
        assert!(fit.predict_proba(1.0) < 0.5);
    }

    #[test]
    fn fit_satisfies_score_equations() {
        let (x, y) = overlapping_data();
        let fit = fit_logistic(&x, &y).unwrap();
        let residual: f64 = x
            .iter()
            .zip(&y)
            .map(|(&xi, &yi)| f64::from(u8::from(yi)) - fit.predict_proba(xi))
            .sum();
        assert!(residual.abs() < 1e-6, "residual {residual}");
    }

    #[test]
    fn constant_labels_fail() {
        let x = vec![0.1, 0.2, 0.3];
        let err = fit_logistic(&x, &[true, true, true]).unwrap_err();
        assert!(matches!(err, CoreError::Convergence(_)));
    }

    #[test]
    fn separable_data_fails() {
        let x = vec![0.1, 0.2, 0.3, 0.7, 0.8, 0.9];
        let y = vec![true, true, true, false, false, false];
        assert!(matches!(fit_logistic(&x, &y), Err(CoreError::Convergence(_))));
    }

    #[test]
    fn quasi_separated_data_fails() {
        // Classes touch only at x = 0.5.
        let x = vec![0.1, 0.3, 0.5, 0.5, 0.7, 0.9];
        let y = vec![true, true, true, false, false, false];
        assert!(matches!(fit_logistic(&x, &y), Err(CoreError::Convergence(_))));
    }

    #[test]
    fn steep_but_overlapping_data_fits() {
        let x: Vec<f64> = (0..1000).map(|i| i as f64 / 1000.0).collect();
        let y: Vec<bool> = (0..1000)
            .map(|i| match i {
                470 | 485 | 495 => false,
                505 | 515 | 530 => true,
                _ => i < 500,
            })
            .collect();

        let fit = fit_logistic(&x, &y).unwrap();
        assert!(fit.slope < -100.0, "slope {}", fit.slope);
        assert!(fit.iterations < MAX_ITER);
        assert!((fit.predict_proba(0.5) - 0.5).abs() < 0.1);

        let residual: f64 = x
            .iter()
            .zip(&y)
            .map(|(&xi, &yi)| f64::from(u8::from(yi)) - fit.predict_proba(xi))
            .sum();
        assert!(residual.abs() < 1e-6, "residual {residual}");
    }

    #[test]
    fn constant_predictor_fails() {
        let err = fit_logistic(&[0.5, 0.5], &[true, false]).unwrap_err();
        assert!(matches!(err, CoreError::Convergence(_)));
    }

    #[test]
    fn raw_characteristic_on_unit_grid() {
        let (x, y) = overlapping_data();
        let d = difficulties(&x);
        let correctness: HashMap<String, bool> =
            d.iter().map(|d| d.id.clone()).zip(y).collect();
        let mut rng = ChaCha8Rng::seed_from_u64(3);

        let curve = logistic_characteristic(&d, &correctness, DifficultyAxis::Raw, &mut rng).unwrap();
        assert_eq!(curve.xs.len(), GRID_POINTS);
        assert_eq!(curve.xs[0], 0.0);
        assert_eq!(curve.xs[GRID_POINTS - 1], 1.0);
        assert!(curve.ys.windows(2).all(|w| w[0] >= w[1]));
        assert_eq!(curve.samples, 50);
        let area = curve.auc().unwrap();
        assert!(area > 0.0 && area < 1.0);
    }

    #[test]
    fn quantile_characteristic_on_percent_grid() {
        let (x, y) = overlapping_data();
        let d = difficulties(&x);
        let correctness: HashMap<String, bool> =
            d.iter().map(|d| d.id.clone()).zip(y).collect();
        let mut rng = ChaCha8Rng::seed_from_u64(3);

        let curve =
            logistic_characteristic(&d, &correctness, DifficultyAxis::Quantile, &mut rng).unwrap();
        assert_eq!(curve.xs[GRID_POINTS - 1], 100.0);
        assert!(curve.ys[0] > curve.ys[GRID_POINTS - 1]);
    }

    #[test]
    fn characteristic_joins_by_id() {
        let (x, y) = overlapping_data();
        let d = difficulties(&x);
        let mut correctness: HashMap<String, bool> =
            d.iter().map(|d| d.id.clone()).zip(y).collect();
        correctness.insert("unrelated_0".into(), true);
        correctness.remove("q0_0");
        let mut rng = ChaCha8Rng::seed_from_u64(3);

        let curve = logistic_characteristic(&d, &correctness, DifficultyAxis::Raw, &mut rng).unwrap();
        assert_eq!(curve.samples, 49);

        let none = HashMap::new();
        assert!(matches!(
            logistic_characteristic(&d, &none, DifficultyAxis::Raw, &mut rng),
            Err(CoreError::InsufficientData(_))
        ));
    }

    #[test]
    fn auc_of_constant_curve() {
        let xs = linspace(0.0, 1.0, 100);
        let ys = vec![0.5; 100];
        assert!((auc(&xs, &ys).unwrap() - 0.5).abs() < 1e-9);
    }

    #[test]
    fn auc_rejects_mismatched_lengths() {
        assert!(auc(&[0.0, 1.0], &[1.0]).is_err());
        assert_eq!(auc(&[0.0], &[1.0]).unwrap(), 0.0);
    }
}
